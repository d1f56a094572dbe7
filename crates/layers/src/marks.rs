use std::collections::BTreeMap;

use foundation::LatLngBounds;
use formats::Feature;
use serde::Serialize;

use crate::collision::{CollisionConfig, CollisionLayer, Marker};
use crate::layer::{Layer, LayerId};
use crate::map::MapWidget;
use crate::popup::{PopupAction, PopupOptions, PopupState, resolve_popup};
use crate::symbology::{IconMode, resolve_icon};
use crate::viewport::ScreenProjector;

pub const LABEL_Z_INDEX_OFFSET: i32 = 100;

/// Point marks drawn twice: category glyphs and title labels, each pass
/// collision-filtered on its own.
#[derive(Debug, Clone)]
pub struct MarksLayer {
    id: LayerId,
    on_map: bool,
    popup_options: PopupOptions,
    features: Vec<Feature>,
    icons: CollisionLayer,
    labels: CollisionLayer,
    /// Hover/click state per feature index, only for features with a popup.
    popups: BTreeMap<usize, PopupState>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MarksLayerSnapshot {
    pub icons: Vec<Marker>,
    pub labels: Vec<Marker>,
}

impl MarksLayer {
    pub fn new(id: u64, collision: CollisionConfig, popup_options: PopupOptions) -> Self {
        Self {
            id: LayerId(id),
            on_map: false,
            popup_options,
            features: Vec::new(),
            icons: CollisionLayer::new(collision),
            labels: CollisionLayer::new(collision),
            popups: BTreeMap::new(),
        }
    }

    pub fn features(&self) -> &[Feature] {
        &self.features
    }

    pub fn icons(&self) -> &CollisionLayer {
        &self.icons
    }

    pub fn labels(&self) -> &CollisionLayer {
        &self.labels
    }

    /// Clears, inserts and places in one step so no partial set is observable.
    pub fn replace_features<P: ScreenProjector + ?Sized>(
        &mut self,
        features: Vec<Feature>,
        projector: &P,
    ) {
        self.features = features;
        self.rebuild_desired();
        self.recompute(projector);
    }

    pub fn recompute<P: ScreenProjector + ?Sized>(&mut self, projector: &P) {
        self.icons.recompute(projector);
        self.labels.recompute(projector);
    }

    pub fn popup_state(&self, feature: usize) -> Option<PopupState> {
        self.popups.get(&feature).copied()
    }

    /// Pointer entered the marker of `feature`. `None` when it has no popup.
    pub fn pointer_enter(&mut self, feature: usize) -> Option<PopupAction> {
        self.popups.get_mut(&feature).map(PopupState::pointer_enter)
    }

    pub fn pointer_leave(&mut self, feature: usize) -> Option<PopupAction> {
        self.popups.get_mut(&feature).map(PopupState::pointer_leave)
    }

    pub fn click(&mut self, feature: usize) -> Option<PopupAction> {
        self.popups.get_mut(&feature).map(PopupState::click)
    }

    pub fn snapshot(&self) -> MarksLayerSnapshot {
        MarksLayerSnapshot {
            icons: self.icons.visible().cloned().collect(),
            labels: self.labels.visible().cloned().collect(),
        }
    }

    fn rebuild_desired(&mut self) {
        let icons = self.markers(IconMode::Glyph, 0);
        self.popups = icons
            .iter()
            .filter(|m| m.popup.is_some())
            .map(|m| (m.feature, PopupState::default()))
            .collect();
        self.icons.set_desired(icons);
        self.labels
            .set_desired(self.markers(IconMode::Label, LABEL_Z_INDEX_OFFSET));
    }

    fn markers(&self, mode: IconMode, z_index_offset: i32) -> Vec<Marker> {
        self.features
            .iter()
            .enumerate()
            .filter_map(|(index, feature)| {
                let position = feature.geometry.as_point()?;
                let icon = resolve_icon(feature, mode)?;
                Some(Marker {
                    feature: index,
                    position,
                    icon,
                    z_index_offset,
                    popup: resolve_popup(feature, &self.popup_options),
                })
            })
            .collect()
    }
}

impl Layer for MarksLayer {
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
        self.icons.clear();
        self.labels.clear();
        self.popups.clear();
    }

    fn add_features(&mut self, features: Vec<Feature>) {
        self.features.extend(features);
        self.rebuild_desired();
    }

    fn bounds(&self) -> Option<LatLngBounds> {
        LatLngBounds::from_points(self.features.iter().flat_map(|f| f.geometry.coordinates()))
    }
}
