use std::sync::Arc;

use futures_util::stream::{FuturesUnordered, StreamExt};
use layers::collision::CollisionConfig;
use layers::geometry::GeometryLayerSnapshot;
use layers::marks::MarksLayerSnapshot;
use layers::raster::TileLayer;
use layers::{Layer, MapWidget, Viewport};
use overlays::{
    ArticleOverlay, BoxFuture, Completion, FetchError, FetchResponse, Fetcher, MarksOverlay,
    OverlayRequest,
};
use runtime::MapEvent;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::config::{ConfigError, ViewerConfig};

pub const ARTICLE_LAYER_ID: u64 = 1;
pub const MARKS_LAYER_ID: u64 = 2;

#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FetchStats {
    pub issued: u64,
    pub applied: u64,
    pub stale: u64,
    pub failed: u64,
}

/// What the map currently shows, as printed by the CLI.
#[derive(Debug, Serialize)]
pub struct Summary {
    pub viewport: Viewport,
    pub articles: Vec<String>,
    pub article: GeometryLayerSnapshot,
    pub marks: MarksLayerSnapshot,
    pub stats: FetchStats,
}

type InFlight = BoxFuture<'static, (OverlayRequest, Result<FetchResponse, FetchError>)>;

/// Wires both overlays into a map widget and drives their fetches.
pub struct OverlayApp {
    article: ArticleOverlay,
    marks: MarksOverlay,
    style: String,
    fetcher: Arc<dyn Fetcher>,
    queued: Vec<OverlayRequest>,
    stats: FetchStats,
}

impl OverlayApp {
    pub fn new(config: &ViewerConfig, fetcher: Arc<dyn Fetcher>) -> Result<Self, ConfigError> {
        Ok(Self {
            article: ArticleOverlay::new(ARTICLE_LAYER_ID, config.wiwosm_endpoint()?),
            marks: MarksOverlay::new(
                MARKS_LAYER_ID,
                config.marks_backend()?,
                CollisionConfig::default(),
            ),
            style: config.style.clone(),
            fetcher,
            queued: Vec::new(),
            stats: FetchStats::default(),
        })
    }

    pub fn article(&self) -> &ArticleOverlay {
        &self.article
    }

    pub fn marks(&self) -> &MarksOverlay {
        &self.marks
    }

    pub fn stats(&self) -> FetchStats {
        self.stats
    }

    /// Registers base maps, both overlays and their layer switcher entries.
    pub fn attach(&mut self, map: &mut dyn MapWidget) {
        map.add_base_layer("Wikimedia", TileLayer::wikimedia(&self.style));
        map.add_base_layer("OpenStreetMap", TileLayer::openstreetmap());
        self.article.add_to(map);
        self.marks.add_to(map);
        map.add_overlay("WIWOSM", self.article.id());
        map.add_overlay("Wikipedia World", self.marks.id());
    }

    /// Attaches the overlays and queues the configured article scope.
    pub fn start(&mut self, map: &mut dyn MapWidget, config: &ViewerConfig) {
        self.attach(map);
        self.assign_scope(map, &config.lang, config.articles.clone());
    }

    pub fn assign_scope(&mut self, map: &mut dyn MapWidget, lang: &str, articles: Vec<String>) {
        map.events().emit(MapEvent::ScopeAssigned {
            lang: lang.to_string(),
            articles,
        });
    }

    /// Turns pending map events into overlay work.
    pub fn dispatch(&mut self, map: &mut dyn MapWidget) {
        let events = map.events().drain();
        for event in events {
            debug!("map event: {}", event.kind());
            match event {
                MapEvent::ScopeAssigned { lang, articles } => {
                    self.article.set_scope(Some(lang), articles);
                    let requests = self.article.load_by_scope();
                    self.enqueue(requests);
                }
                MapEvent::ZoomEnd { .. } => {
                    self.marks.on_viewport_changed(map.viewport());
                    if let Some(request) = self.marks.update_marks(&*map) {
                        self.enqueue(vec![request]);
                    }
                }
                MapEvent::MoveEnd { .. } => self.marks.on_viewport_changed(map.viewport()),
            }
        }
    }

    fn enqueue(&mut self, requests: Vec<OverlayRequest>) {
        self.stats.issued += requests.len() as u64;
        self.queued.extend(requests);
    }

    /// Hands one finished request back to the overlay that issued it.
    pub fn apply(
        &mut self,
        request: &OverlayRequest,
        result: Result<FetchResponse, FetchError>,
        map: &mut dyn MapWidget,
    ) -> Completion {
        let completion = if request.overlay == self.article.id() {
            self.article.complete(request, result, map)
        } else if request.overlay == self.marks.id() {
            self.marks.complete(request, result, &*map)
        } else {
            warn!("no overlay with id {:?}", request.overlay);
            Completion::Stale
        };
        match completion {
            Completion::Applied => self.stats.applied += 1,
            Completion::Stale => self.stats.stale += 1,
            Completion::Failed => self.stats.failed += 1,
        }
        completion
    }

    /// Polls every in-flight request on this task and applies completions one
    /// at a time, until no events, queued requests or responses remain.
    pub async fn run_until_idle(&mut self, map: &mut dyn MapWidget) -> FetchStats {
        let mut in_flight: FuturesUnordered<InFlight> = FuturesUnordered::new();
        loop {
            self.dispatch(map);
            for request in self.queued.drain(..) {
                let fetcher = Arc::clone(&self.fetcher);
                debug!("GET {}", request.url);
                in_flight.push(Box::pin(async move {
                    let result = fetcher.get(&request.url).await;
                    (request, result)
                }));
            }
            let Some((request, result)) = in_flight.next().await else {
                break;
            };
            self.apply(&request, result, map);
        }
        info!(
            "idle: {} issued, {} applied, {} stale, {} failed",
            self.stats.issued, self.stats.applied, self.stats.stale, self.stats.failed
        );
        self.stats
    }

    pub fn summary(&self, map: &dyn MapWidget) -> Summary {
        Summary {
            viewport: *map.viewport(),
            articles: self
                .article
                .scope()
                .map(|scope| scope.articles)
                .unwrap_or_default(),
            article: self.article.layer().snapshot(),
            marks: self.marks.layer().snapshot(),
            stats: self.stats,
        }
    }
}
