use foundation::LatLngBounds;
use formats::{Feature, Geometry};
use serde::Serialize;

use crate::collision::Marker;
use crate::layer::{Layer, LayerId};
use crate::map::MapWidget;
use crate::symbology::{CIRCLE_RADIUS_PX, IconSpec};

/// Plain feature layer for article geometry. Points draw as circle markers;
/// nothing is collision-filtered.
#[derive(Debug, Clone, PartialEq)]
pub struct GeometryLayer {
    id: LayerId,
    on_map: bool,
    features: Vec<Feature>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct GeometryLayerSnapshot {
    pub points: Vec<Marker>,
    pub shapes: Vec<Feature>,
}

impl GeometryLayer {
    pub fn new(id: u64) -> Self {
        Self {
            id: LayerId(id),
            on_map: false,
            features: Vec::new(),
        }
    }

    pub fn features(&self) -> &[Feature] {
        &self.features
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    pub fn snapshot(&self) -> GeometryLayerSnapshot {
        let mut out = GeometryLayerSnapshot::default();
        for (index, feature) in self.features.iter().enumerate() {
            match &feature.geometry {
                Geometry::Point(position) => out.points.push(Marker {
                    feature: index,
                    position: *position,
                    icon: IconSpec::Circle {
                        radius_px: CIRCLE_RADIUS_PX,
                    },
                    z_index_offset: 0,
                    popup: None,
                }),
                Geometry::Shape(_) => out.shapes.push(feature.clone()),
            }
        }
        out
    }
}

impl Layer for GeometryLayer {
    fn id(&self) -> LayerId {
        self.id
    }

    fn add_to(&mut self, map: &mut dyn MapWidget) {
        map.add_layer(self.id);
        self.on_map = true;
    }

    fn on_map(&self) -> bool {
        self.on_map
    }

    fn clear_layers(&mut self) {
        self.features.clear();
    }

    fn add_features(&mut self, features: Vec<Feature>) {
        self.features.extend(features);
    }

    fn bounds(&self) -> Option<LatLngBounds> {
        LatLngBounds::from_points(self.features.iter().flat_map(|f| f.geometry.coordinates()))
    }
}
