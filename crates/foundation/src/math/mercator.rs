use crate::geo::LatLng;
use crate::math::Vec2;

/// Sphere radius used by EPSG:3857 (meters).
pub const EARTH_RADIUS_M: f64 = 6_378_137.0;
/// Latitude limit of the square web-mercator world.
pub const MAX_LATITUDE_DEG: f64 = 85.051_128_779_806_6;
/// Pixel size of the world at zoom 0.
pub const TILE_SIZE_PX: f64 = 256.0;

/// Projects a geographic coordinate to EPSG:3857 meters.
pub fn project(at: LatLng) -> Vec2 {
    let lat = at.lat.clamp(-MAX_LATITUDE_DEG, MAX_LATITUDE_DEG).to_radians();
    let x = EARTH_RADIUS_M * at.lng.to_radians();
    let y = EARTH_RADIUS_M * ((std::f64::consts::FRAC_PI_4 + lat * 0.5).tan()).ln();
    Vec2::new(x, y)
}

/// Inverse of [`project`]: EPSG:3857 meters back to degrees.
pub fn unproject(x: f64, y: f64) -> LatLng {
    let lng = (x / EARTH_RADIUS_M).to_degrees();
    let lat = (2.0 * (y / EARTH_RADIUS_M).exp().atan() - std::f64::consts::FRAC_PI_2).to_degrees();
    LatLng::new(lat, lng)
}

/// Absolute pixel position of `at` in the world bitmap at `zoom`.
///
/// Origin is the north-west corner; y grows southwards.
pub fn world_px(at: LatLng, zoom: f64) -> Vec2 {
    let scale = TILE_SIZE_PX * 2f64.powf(zoom);
    let m = project(at);
    let half = std::f64::consts::PI * EARTH_RADIUS_M;
    Vec2::new(
        scale * (0.5 + m.x / (2.0 * half)),
        scale * (0.5 - m.y / (2.0 * half)),
    )
}

/// Inverse of [`world_px`].
pub fn from_world_px(p: Vec2, zoom: f64) -> LatLng {
    let scale = TILE_SIZE_PX * 2f64.powf(zoom);
    let half = std::f64::consts::PI * EARTH_RADIUS_M;
    let x = (p.x / scale - 0.5) * 2.0 * half;
    let y = (0.5 - p.y / scale) * 2.0 * half;
    unproject(x, y)
}

#[cfg(test)]
mod tests {
    use super::{from_world_px, project, unproject, world_px};
    use crate::geo::LatLng;

    fn assert_close(a: f64, b: f64, eps: f64) {
        let diff = (a - b).abs();
        assert!(diff <= eps, "expected {a} ~= {b} (diff {diff})");
    }

    #[test]
    fn unprojects_known_coordinate() {
        let ll = unproject(1_113_194.907_932_735_7, 6_446_275.841_017_158);
        assert_close(ll.lng, 10.0, 1e-7);
        assert_close(ll.lat, 50.0, 1e-7);
    }

    #[test]
    fn origin_maps_to_null_island() {
        let ll = unproject(0.0, 0.0);
        assert_close(ll.lat, 0.0, 1e-12);
        assert_close(ll.lng, 0.0, 1e-12);
    }

    #[test]
    fn project_then_unproject_is_stable() {
        let at = LatLng::new(47.3, 11.3);
        let m = project(at);
        let back = unproject(m.x, m.y);
        assert_close(back.lat, at.lat, 1e-9);
        assert_close(back.lng, at.lng, 1e-9);
    }

    #[test]
    fn world_px_at_zoom_zero_spans_one_tile() {
        let center = world_px(LatLng::new(0.0, 0.0), 0.0);
        assert_close(center.x, 128.0, 1e-9);
        assert_close(center.y, 128.0, 1e-9);

        let back = from_world_px(world_px(LatLng::new(-33.9, 151.2), 9.0), 9.0);
        assert_close(back.lat, -33.9, 1e-9);
        assert_close(back.lng, 151.2, 1e-9);
    }
}
