use std::collections::BTreeMap;

use foundation::{LatLng, LatLngBounds};
use serde::Serialize;

pub const TITLE: &str = "title";
pub const SOURCE_URL: &str = "sourceUrl";
pub const THUMBNAIL_URL: &str = "thumbnailUrl";
pub const THUMBNAIL_WIDTH: &str = "thumbnailWidth";
pub const CATEGORY: &str = "category";

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum PropertyValue {
    Text(String),
    Number(f64),
}

impl PropertyValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            PropertyValue::Text(s) => Some(s.as_str()),
            PropertyValue::Number(_) => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            PropertyValue::Number(n) => Some(*n),
            PropertyValue::Text(s) => s.trim().parse().ok(),
        }
    }
}

impl From<&str> for PropertyValue {
    fn from(s: &str) -> Self {
        PropertyValue::Text(s.to_string())
    }
}

impl From<String> for PropertyValue {
    fn from(s: String) -> Self {
        PropertyValue::Text(s)
    }
}

impl From<f64> for PropertyValue {
    fn from(n: f64) -> Self {
        PropertyValue::Number(n)
    }
}

pub type Properties = BTreeMap<String, PropertyValue>;

/// Geometry in geographic coordinates.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", content = "coordinates")]
pub enum Geometry {
    Point(LatLng),
    /// Ordered paths or rings. Polygon holes and multi-part members are
    /// flattened in source order.
    Shape(Vec<Vec<LatLng>>),
}

impl Geometry {
    pub fn coordinates(&self) -> Box<dyn Iterator<Item = LatLng> + '_> {
        match self {
            Geometry::Point(p) => Box::new(std::iter::once(*p)),
            Geometry::Shape(rings) => Box::new(rings.iter().flatten().copied()),
        }
    }

    pub fn as_point(&self) -> Option<LatLng> {
        match self {
            Geometry::Point(p) => Some(*p),
            Geometry::Shape(_) => None,
        }
    }
}

/// A normalized geospatial annotation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Feature {
    pub geometry: Geometry,
    pub properties: Properties,
}

impl Feature {
    pub fn new(geometry: Geometry) -> Self {
        Self {
            geometry,
            properties: Properties::new(),
        }
    }

    pub fn point(at: LatLng) -> Self {
        Self::new(Geometry::Point(at))
    }

    pub fn with_property(mut self, key: &str, value: impl Into<PropertyValue>) -> Self {
        self.properties.insert(key.to_string(), value.into());
        self
    }

    /// Non-empty text property.
    pub fn text(&self, key: &str) -> Option<&str> {
        self.properties
            .get(key)
            .and_then(PropertyValue::as_str)
            .filter(|s| !s.is_empty())
    }

    pub fn title(&self) -> Option<&str> {
        self.text(TITLE)
    }

    pub fn source_url(&self) -> Option<&str> {
        self.text(SOURCE_URL)
    }

    pub fn thumbnail_url(&self) -> Option<&str> {
        self.text(THUMBNAIL_URL)
    }

    pub fn category(&self) -> Option<&str> {
        self.text(CATEGORY)
    }

    pub fn thumbnail_width(&self) -> Option<u32> {
        self.properties
            .get(THUMBNAIL_WIDTH)
            .and_then(PropertyValue::as_f64)
            .filter(|w| w.is_finite() && *w > 0.0)
            .map(|w| w as u32)
    }

    pub fn bounds(&self) -> Option<LatLngBounds> {
        LatLngBounds::from_points(self.geometry.coordinates())
    }
}

#[cfg(test)]
mod tests {
    use super::{Feature, Geometry, PropertyValue};
    use foundation::LatLng;

    #[test]
    fn empty_text_properties_read_as_absent() {
        let f = Feature::point(LatLng::new(1.0, 2.0))
            .with_property("title", "")
            .with_property("category", "city");
        assert_eq!(f.title(), None);
        assert_eq!(f.category(), Some("city"));
    }

    #[test]
    fn thumbnail_width_accepts_numbers_and_numeric_text() {
        let f = Feature::point(LatLng::new(0.0, 0.0)).with_property("thumbnailWidth", 300.0);
        assert_eq!(f.thumbnail_width(), Some(300));
        let f = Feature::point(LatLng::new(0.0, 0.0))
            .with_property("thumbnailWidth", PropertyValue::from("120"));
        assert_eq!(f.thumbnail_width(), Some(120));
    }

    #[test]
    fn shape_bounds_cover_every_ring() {
        let f = Feature::new(Geometry::Shape(vec![
            vec![LatLng::new(47.0, 11.0), LatLng::new(47.2, 11.1)],
            vec![LatLng::new(46.9, 11.4)],
        ]));
        let b = f.bounds().expect("bounds");
        assert_eq!(b.south(), 46.9);
        assert_eq!(b.north(), 47.2);
        assert_eq!(b.west(), 11.0);
        assert_eq!(b.east(), 11.4);
    }
}
