use foundation::LatLngBounds;
use runtime::EventBus;

use crate::layer::LayerId;
use crate::raster::TileLayer;
use crate::viewport::Viewport;

/// Contract of the external map widget the overlays are composed into.
pub trait MapWidget {
    fn viewport(&self) -> &Viewport;

    /// Moves the view so `bounds` is fully visible. Settle events are
    /// reported through [`MapWidget::events`].
    fn fit_bounds(&mut self, bounds: LatLngBounds);

    fn add_layer(&mut self, id: LayerId);

    fn has_layer(&self, id: LayerId) -> bool;

    /// Offers a base map in the layer switcher.
    fn add_base_layer(&mut self, name: &str, layer: TileLayer);

    /// Offers a togglable overlay in the layer switcher.
    fn add_overlay(&mut self, name: &str, id: LayerId);

    /// Pending viewport events.
    fn events(&mut self) -> &mut EventBus;
}
