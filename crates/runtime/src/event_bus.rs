use std::collections::VecDeque;

use foundation::LatLngBounds;

/// Events raised by the map widget and the host application.
///
/// Overlays never observe raw pointer input; they only see settled viewport
/// changes and explicit scope assignments.
#[derive(Debug, Clone, PartialEq)]
pub enum MapEvent {
    /// A zoom animation finished.
    ZoomEnd { zoom: f64, bounds: LatLngBounds },
    /// A pan finished.
    MoveEnd { bounds: LatLngBounds },
    /// The host assigned a new article scope.
    ScopeAssigned { lang: String, articles: Vec<String> },
}

impl MapEvent {
    pub fn kind(&self) -> &'static str {
        match self {
            MapEvent::ZoomEnd { .. } => "zoomend",
            MapEvent::MoveEnd { .. } => "moveend",
            MapEvent::ScopeAssigned { .. } => "scope",
        }
    }

    /// True for events after which the viewport is stable.
    pub fn is_viewport_settle(&self) -> bool {
        matches!(self, MapEvent::ZoomEnd { .. } | MapEvent::MoveEnd { .. })
    }
}

/// FIFO of pending map events, drained by the composition root.
#[derive(Debug, Default)]
pub struct EventBus {
    events: VecDeque<MapEvent>,
    emitted: u64,
}

impl EventBus {
    pub fn new() -> Self {
        Self {
            events: VecDeque::new(),
            emitted: 0,
        }
    }

    pub fn emit(&mut self, event: MapEvent) {
        self.emitted += 1;
        self.events.push_back(event);
    }

    pub fn events(&self) -> impl Iterator<Item = &MapEvent> {
        self.events.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Total number of events emitted since creation.
    pub fn emitted(&self) -> u64 {
        self.emitted
    }

    pub fn drain(&mut self) -> Vec<MapEvent> {
        self.events.drain(..).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::{EventBus, MapEvent};
    use foundation::{LatLng, LatLngBounds};

    fn bounds() -> LatLngBounds {
        LatLngBounds::new(LatLng::new(47.0, 11.0), LatLng::new(47.5, 11.5))
    }

    #[test]
    fn drain_preserves_emission_order() {
        let mut bus = EventBus::new();
        bus.emit(MapEvent::MoveEnd { bounds: bounds() });
        bus.emit(MapEvent::ZoomEnd {
            zoom: 10.0,
            bounds: bounds(),
        });
        let drained = bus.drain();
        assert_eq!(drained.len(), 2);
        assert_eq!(drained[0].kind(), "moveend");
        assert_eq!(drained[1].kind(), "zoomend");
        assert!(bus.is_empty());
        assert_eq!(bus.emitted(), 2);
    }

    #[test]
    fn scope_assignment_is_not_a_viewport_settle() {
        let scope = MapEvent::ScopeAssigned {
            lang: "de".into(),
            articles: vec!["Innsbruck".into()],
        };
        assert!(!scope.is_viewport_settle());
        assert!(MapEvent::MoveEnd { bounds: bounds() }.is_viewport_settle());
    }
}
