use std::collections::BTreeSet;

use foundation::math::{Vec2, from_world_px, world_px};
use foundation::{LatLng, LatLngBounds};
use runtime::{EventBus, MapEvent};
use tracing::debug;

use crate::layer::LayerId;
use crate::map::MapWidget;
use crate::raster::TileLayer;
use crate::viewport::Viewport;

pub const DEFAULT_MAX_ZOOM: f64 = 19.0;

/// In-memory map widget: tracks the view, registered layers and the layer
/// switcher entries, and raises settle events the way a browser map would.
#[derive(Debug)]
pub struct HeadlessMap {
    viewport: Viewport,
    max_zoom: f64,
    layers: BTreeSet<LayerId>,
    base_layers: Vec<(String, TileLayer)>,
    overlays: Vec<(String, LayerId)>,
    events: EventBus,
}

impl HeadlessMap {
    pub fn new(viewport: Viewport) -> Self {
        Self {
            viewport,
            max_zoom: DEFAULT_MAX_ZOOM,
            layers: BTreeSet::new(),
            base_layers: Vec::new(),
            overlays: Vec::new(),
            events: EventBus::new(),
        }
    }

    pub fn with_max_zoom(mut self, max_zoom: f64) -> Self {
        self.max_zoom = max_zoom;
        self
    }

    /// Moves the view; emits `ZoomEnd` when the zoom changed, `MoveEnd` otherwise.
    pub fn set_view(&mut self, center: LatLng, zoom: f64) {
        let zoom = zoom.clamp(0.0, self.max_zoom);
        let zoomed = zoom != self.viewport.zoom;
        self.viewport.center = center;
        self.viewport.zoom = zoom;
        let bounds = self.viewport.bounds();
        debug!("view -> {center:?} @ z{zoom}");
        if zoomed {
            self.events.emit(MapEvent::ZoomEnd { zoom, bounds });
        } else {
            self.events.emit(MapEvent::MoveEnd { bounds });
        }
    }

    pub fn zoom_to(&mut self, zoom: f64) {
        let center = self.viewport.center;
        self.set_view(center, zoom);
    }

    pub fn base_layers(&self) -> &[(String, TileLayer)] {
        &self.base_layers
    }

    pub fn overlays(&self) -> &[(String, LayerId)] {
        &self.overlays
    }
}

impl MapWidget for HeadlessMap {
    fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    fn fit_bounds(&mut self, bounds: LatLngBounds) {
        let zoom = self.viewport.bounds_zoom(&bounds, self.max_zoom);
        let sw = world_px(bounds.south_west, zoom);
        let ne = world_px(bounds.north_east, zoom);
        let center = from_world_px(Vec2::new((sw.x + ne.x) * 0.5, (sw.y + ne.y) * 0.5), zoom);
        self.set_view(center, zoom);
    }

    fn add_layer(&mut self, id: LayerId) {
        self.layers.insert(id);
    }

    fn has_layer(&self, id: LayerId) -> bool {
        self.layers.contains(&id)
    }

    fn add_base_layer(&mut self, name: &str, layer: TileLayer) {
        self.base_layers.push((name.to_string(), layer));
    }

    fn add_overlay(&mut self, name: &str, id: LayerId) {
        self.overlays.push((name.to_string(), id));
    }

    fn events(&mut self) -> &mut EventBus {
        &mut self.events
    }
}

#[cfg(test)]
mod tests {
    use super::HeadlessMap;
    use crate::map::MapWidget;
    use crate::viewport::Viewport;
    use foundation::{LatLng, LatLngBounds};
    use runtime::MapEvent;

    fn map() -> HeadlessMap {
        HeadlessMap::new(Viewport::new(LatLng::new(47.3, 11.3), 9.0, [1024.0, 768.0]))
    }

    #[test]
    fn fit_bounds_zooms_in_and_reports_zoomend() {
        let mut map = map();
        let target = LatLngBounds::new(LatLng::new(47.26, 11.38), LatLng::new(47.27, 11.40));
        map.fit_bounds(target);
        assert!(map.viewport().zoom > 9.0);
        let view = map.viewport().bounds();
        assert!(view.contains(target.south_west) && view.contains(target.north_east));
        let events = map.events().drain();
        assert!(matches!(events.as_slice(), [MapEvent::ZoomEnd { .. }]));
    }

    #[test]
    fn pan_reports_moveend() {
        let mut map = map();
        map.set_view(LatLng::new(47.0, 11.0), 9.0);
        assert!(matches!(map.events().drain().as_slice(), [MapEvent::MoveEnd { .. }]));
    }

    #[test]
    fn zoom_is_clamped() {
        let mut map = map().with_max_zoom(12.0);
        map.zoom_to(20.0);
        assert_eq!(map.viewport().zoom, 12.0);
    }
}
