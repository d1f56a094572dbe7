use formats::commons::wikipedia_base;
use formats::{Feature, NormalizeContext, Schema, try_normalize};
use foundation::LatLngBounds;
use layers::collision::CollisionConfig;
use layers::marks::MarksLayer;
use layers::popup::{PopupAction, PopupOptions};
use layers::{Layer, LayerId, MapWidget, ScreenProjector};
use tracing::{debug, warn};
use url::Url;

use crate::controller::{FetchController, OverlayState};
use crate::fetch::{FetchError, FetchResponse};
use crate::request::{Completion, OverlayRequest};

pub const WP_WORLD_ENDPOINT: &str = "https://tools.wmflabs.org/wp-world/marks-geojson.php";

/// Query against the wp-world marks service.
#[derive(Debug, Clone, PartialEq)]
pub struct WpWorldQuery {
    pub endpoint: Url,
    pub lang: String,
    pub max_rows: u32,
    /// Ask for coat-of-arms marks.
    pub coats: bool,
    pub thumbs: bool,
}

/// Query against a MediaWiki `list=geosearch` API.
#[derive(Debug, Clone, PartialEq)]
pub struct GeosearchQuery {
    /// Site root, e.g. `https://de.wikipedia.org/`.
    pub wiki: Url,
    pub namespace: i32,
    pub limit: u32,
    pub thumbnail_width: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub enum MarksBackend {
    WpWorld(WpWorldQuery),
    Geosearch(GeosearchQuery),
}

impl MarksBackend {
    pub fn request_url(&self, bounds: &LatLngBounds) -> Result<Url, url::ParseError> {
        match self {
            MarksBackend::WpWorld(q) => {
                let mut url = q.endpoint.clone();
                url.query_pairs_mut()
                    .append_pair("maxRows", &q.max_rows.to_string())
                    .append_pair("LANG", &q.lang)
                    .append_pair("coats", flag(q.coats))
                    .append_pair("thumbs", flag(q.thumbs))
                    .append_pair("bbox", &bounds.to_bbox_string());
                Ok(url)
            }
            MarksBackend::Geosearch(q) => {
                let mut url = q.wiki.clone();
                url.path_segments_mut()
                    .map_err(|()| url::ParseError::RelativeUrlWithCannotBeABaseBase)?
                    .pop_if_empty()
                    .push("w")
                    .push("api.php");
                let bbox = format!(
                    "{}|{}|{}|{}",
                    bounds.north(),
                    bounds.west(),
                    bounds.south(),
                    bounds.east()
                );
                url.query_pairs_mut()
                    .append_pair("origin", "*")
                    .append_pair("format", "json")
                    .append_pair("action", "query")
                    .append_pair("list", "geosearch")
                    .append_pair("gsnamespace", &q.namespace.to_string())
                    .append_pair("gslimit", &q.limit.to_string())
                    .append_pair("gsprop", "type|name")
                    .append_pair("gsbbox", &bbox);
                Ok(url)
            }
        }
    }

    pub fn normalize_context(&self) -> NormalizeContext {
        match self {
            MarksBackend::WpWorld(q) => NormalizeContext {
                source_base: wikipedia_base(&q.lang),
                ..NormalizeContext::default()
            },
            MarksBackend::Geosearch(q) => NormalizeContext {
                source_base: Some(q.wiki.clone()),
                thumbnail_width: q.thumbnail_width,
                sized_thumbnails: true,
            },
        }
    }

    pub fn popup_options(&self) -> PopupOptions {
        PopupOptions {
            open_in_new_tab: matches!(self, MarksBackend::Geosearch(_)),
            ..PopupOptions::default()
        }
    }
}

fn flag(on: bool) -> &'static str {
    if on { "1" } else { "0" }
}

/// Point marks for the visible area, refreshed after every zoom.
#[derive(Debug)]
pub struct MarksOverlay {
    layer: MarksLayer,
    backend: MarksBackend,
    controller: FetchController<LatLngBounds>,
}

impl MarksOverlay {
    pub fn new(id: u64, backend: MarksBackend, collision: CollisionConfig) -> Self {
        Self {
            layer: MarksLayer::new(id, collision, backend.popup_options()),
            backend,
            controller: FetchController::new(),
        }
    }

    pub fn backend(&self) -> &MarksBackend {
        &self.backend
    }

    pub fn layer(&self) -> &MarksLayer {
        &self.layer
    }

    pub fn state(&self) -> &OverlayState<LatLngBounds> {
        self.controller.state()
    }

    /// Requests marks for the current viewport. `None` while the overlay is
    /// not shown on `map`.
    pub fn update_marks(&mut self, map: &dyn MapWidget) -> Option<OverlayRequest> {
        if !self.layer.on_map() || !map.has_layer(self.layer.id()) {
            debug!("marks overlay not on the map, skipping refresh");
            return None;
        }
        let bounds = map.viewport().bounds();
        let url = match self.backend.request_url(&bounds) {
            Ok(url) => url,
            Err(err) => {
                warn!("cannot build marks request: {err}");
                return None;
            }
        };
        let generation = self.controller.begin(bounds, 1);
        debug!("marks for {} (generation {})", bounds.to_bbox_string(), generation.0);
        Some(OverlayRequest {
            overlay: self.layer.id(),
            generation,
            part: bounds.to_bbox_string(),
            url,
        })
    }

    /// Replaces the marks with a fresh response and places them on `map`'s
    /// current viewport. Unusable responses leave the previous marks shown.
    pub fn complete(
        &mut self,
        request: &OverlayRequest,
        result: Result<FetchResponse, FetchError>,
        map: &dyn MapWidget,
    ) -> Completion {
        if !self.controller.is_current(request.generation) {
            debug!("dropping stale marks (generation {})", request.generation.0);
            return Completion::Stale;
        }
        match self.parse(result) {
            Ok(features) => {
                debug!("{} mark(s) for {}", features.len(), request.part);
                self.layer.replace_features(features, map.viewport());
                self.controller.succeed(request.generation)
            }
            Err(err) => {
                warn!("marks for {} unavailable: {err}", request.part);
                self.controller.fail(request.generation)
            }
        }
    }

    pub fn pointer_enter(&mut self, feature: usize) -> Option<PopupAction> {
        self.layer.pointer_enter(feature)
    }

    pub fn pointer_leave(&mut self, feature: usize) -> Option<PopupAction> {
        self.layer.pointer_leave(feature)
    }

    pub fn click(&mut self, feature: usize) -> Option<PopupAction> {
        self.layer.click(feature)
    }

    /// Re-runs collision placement after a pan or zoom; nothing is fetched.
    pub fn on_viewport_changed<P: ScreenProjector + ?Sized>(&mut self, projector: &P) {
        self.layer.recompute(projector);
    }

    fn parse(
        &self,
        result: Result<FetchResponse, FetchError>,
    ) -> Result<Vec<Feature>, FetchError> {
        let body = result?.into_body()?;
        Ok(try_normalize(
            &body,
            Schema::Marks,
            &self.backend.normalize_context(),
        )?)
    }
}

impl Layer for MarksOverlay {
    fn id(&self) -> LayerId {
        self.layer.id()
    }

    fn add_to(&mut self, map: &mut dyn MapWidget) {
        self.layer.add_to(map);
    }

    fn on_map(&self) -> bool {
        self.layer.on_map()
    }

    fn clear_layers(&mut self) {
        self.layer.clear_layers();
    }

    fn add_features(&mut self, features: Vec<Feature>) {
        self.layer.add_features(features);
    }

    fn bounds(&self) -> Option<LatLngBounds> {
        self.layer.bounds()
    }
}
