use foundation::LatLngBounds;
use formats::Feature;
use serde::Serialize;

use crate::map::MapWidget;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct LayerId(pub u64);

/// Capability set every overlay exposes to the map widget.
///
/// Overlays wrap the widget's primitives instead of extending them; the widget
/// only learns layer ids.
pub trait Layer {
    fn id(&self) -> LayerId;

    /// Registers the layer with `map`.
    fn add_to(&mut self, map: &mut dyn MapWidget);

    fn on_map(&self) -> bool;

    fn clear_layers(&mut self);

    /// Appends features; placement-dependent layers need a recompute after.
    fn add_features(&mut self, features: Vec<Feature>);

    /// Bounds of all features, `None` while empty.
    fn bounds(&self) -> Option<LatLngBounds>;
}
