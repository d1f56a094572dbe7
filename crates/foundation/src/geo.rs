use serde::Serialize;

/// Geographic coordinate in degrees (WGS84 / EPSG:4326).
#[derive(Debug, Copy, Clone, PartialEq, Serialize)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

impl LatLng {
    pub const fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    pub fn is_finite(&self) -> bool {
        self.lat.is_finite() && self.lng.is_finite()
    }
}

/// Geographic rectangle, south-west to north-east.
#[derive(Debug, Copy, Clone, PartialEq, Serialize)]
pub struct LatLngBounds {
    pub south_west: LatLng,
    pub north_east: LatLng,
}

impl LatLngBounds {
    pub fn new(a: LatLng, b: LatLng) -> Self {
        Self {
            south_west: LatLng::new(a.lat.min(b.lat), a.lng.min(b.lng)),
            north_east: LatLng::new(a.lat.max(b.lat), a.lng.max(b.lng)),
        }
    }

    /// Smallest bounds containing every finite point, or `None` for an empty input.
    pub fn from_points<I>(points: I) -> Option<Self>
    where
        I: IntoIterator<Item = LatLng>,
    {
        let mut out: Option<Self> = None;
        for p in points {
            if !p.is_finite() {
                continue;
            }
            match out.as_mut() {
                Some(b) => b.extend(p),
                None => out = Some(Self::new(p, p)),
            }
        }
        out
    }

    pub fn extend(&mut self, p: LatLng) {
        self.south_west.lat = self.south_west.lat.min(p.lat);
        self.south_west.lng = self.south_west.lng.min(p.lng);
        self.north_east.lat = self.north_east.lat.max(p.lat);
        self.north_east.lng = self.north_east.lng.max(p.lng);
    }

    pub fn west(&self) -> f64 {
        self.south_west.lng
    }

    pub fn south(&self) -> f64 {
        self.south_west.lat
    }

    pub fn east(&self) -> f64 {
        self.north_east.lng
    }

    pub fn north(&self) -> f64 {
        self.north_east.lat
    }

    pub fn center(&self) -> LatLng {
        LatLng::new(
            (self.south() + self.north()) * 0.5,
            (self.west() + self.east()) * 0.5,
        )
    }

    pub fn contains(&self, p: LatLng) -> bool {
        p.lat >= self.south() && p.lat <= self.north() && p.lng >= self.west() && p.lng <= self.east()
    }

    /// `"west,south,east,north"`, the bbox query form of the marks service.
    pub fn to_bbox_string(&self) -> String {
        format!("{},{},{},{}", self.west(), self.south(), self.east(), self.north())
    }

    /// Parses the `"west,south,east,north"` form.
    pub fn from_bbox_str(s: &str) -> Option<Self> {
        let mut parts = s.split(',').map(|p| p.trim().parse::<f64>());
        let west = parts.next()?.ok()?;
        let south = parts.next()?.ok()?;
        let east = parts.next()?.ok()?;
        let north = parts.next()?.ok()?;
        if parts.next().is_some() {
            return None;
        }
        Some(Self::new(LatLng::new(south, west), LatLng::new(north, east)))
    }
}

#[cfg(test)]
mod tests {
    use super::{LatLng, LatLngBounds};

    #[test]
    fn bbox_string_round_trips() {
        let b = LatLngBounds::from_bbox_str("11,47,11.5,47.5").expect("bbox");
        assert_eq!(b.west(), 11.0);
        assert_eq!(b.south(), 47.0);
        assert_eq!(b.east(), 11.5);
        assert_eq!(b.north(), 47.5);
        assert_eq!(b.to_bbox_string(), "11,47,11.5,47.5");
    }

    #[test]
    fn rejects_short_bbox() {
        assert!(LatLngBounds::from_bbox_str("11,47,11.5").is_none());
        assert!(LatLngBounds::from_bbox_str("11,47,11.5,47.5,1").is_none());
        assert!(LatLngBounds::from_bbox_str("a,b,c,d").is_none());
    }

    #[test]
    fn from_points_skips_non_finite() {
        let b = LatLngBounds::from_points([
            LatLng::new(47.0, 11.0),
            LatLng::new(f64::NAN, 3.0),
            LatLng::new(47.5, 11.5),
        ])
        .expect("bounds");
        assert_eq!(b.south_west, LatLng::new(47.0, 11.0));
        assert_eq!(b.north_east, LatLng::new(47.5, 11.5));
        assert!(b.contains(LatLng::new(47.25, 11.25)));
        assert!(LatLngBounds::from_points(std::iter::empty()).is_none());
    }
}
