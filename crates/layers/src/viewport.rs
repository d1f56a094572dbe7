use foundation::math::{Vec2, from_world_px, world_px};
use foundation::{LatLng, LatLngBounds};
use serde::Serialize;

/// Maps geographic positions to screen pixels for collision checks.
pub trait ScreenProjector {
    fn project(&self, at: LatLng) -> Option<Vec2>;
}

/// Current map view: center, zoom and pixel size.
#[derive(Debug, Copy, Clone, PartialEq, Serialize)]
pub struct Viewport {
    pub center: LatLng,
    pub zoom: f64,
    pub size_px: [f64; 2],
}

impl Viewport {
    pub fn new(center: LatLng, zoom: f64, size_px: [f64; 2]) -> Self {
        Self {
            center,
            zoom,
            size_px,
        }
    }

    /// Screen position of `at`, origin at the top-left corner.
    pub fn to_screen(&self, at: LatLng) -> Vec2 {
        let half = Vec2::new(self.size_px[0] * 0.5, self.size_px[1] * 0.5);
        world_px(at, self.zoom) - world_px(self.center, self.zoom) + half
    }

    pub fn from_screen(&self, p: Vec2) -> LatLng {
        let half = Vec2::new(self.size_px[0] * 0.5, self.size_px[1] * 0.5);
        from_world_px(p - half + world_px(self.center, self.zoom), self.zoom)
    }

    pub fn bounds(&self) -> LatLngBounds {
        let nw = self.from_screen(Vec2::new(0.0, 0.0));
        let se = self.from_screen(Vec2::new(self.size_px[0], self.size_px[1]));
        LatLngBounds::new(nw, se)
    }

    /// Largest integer zoom at which `bounds` fits, capped at `max_zoom`.
    pub fn bounds_zoom(&self, bounds: &LatLngBounds, max_zoom: f64) -> f64 {
        let mut zoom = max_zoom.floor().max(0.0);
        while zoom > 0.0 {
            let sw = world_px(bounds.south_west, zoom);
            let ne = world_px(bounds.north_east, zoom);
            if (ne.x - sw.x).abs() <= self.size_px[0] && (sw.y - ne.y).abs() <= self.size_px[1] {
                break;
            }
            zoom -= 1.0;
        }
        zoom
    }
}

impl ScreenProjector for Viewport {
    fn project(&self, at: LatLng) -> Option<Vec2> {
        let p = self.to_screen(at);
        p.is_finite().then_some(p)
    }
}
