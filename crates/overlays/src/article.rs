use formats::{Feature, NormalizeContext, Schema, try_normalize};
use foundation::LatLngBounds;
use layers::geometry::GeometryLayer;
use layers::{Layer, LayerId, MapWidget};
use tracing::{debug, info, warn};
use url::Url;

use crate::controller::{FetchController, OverlayState};
use crate::fetch::{FetchError, FetchResponse};
use crate::request::{Completion, OverlayRequest};

pub const WIWOSM_ENDPOINT: &str = "https://tools.wmflabs.org/wiwosm/osmjson/getGeoJSON.php";

/// Language edition plus the article titles whose geometry is shown.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArticleScope {
    pub lang: String,
    pub articles: Vec<String>,
}

/// Geometry of one or more Wikipedia articles, fetched from the WIWOSM service.
///
/// A load clears the layer once, then appends each article's geometry as its
/// response arrives and refits the map to everything shown so far.
#[derive(Debug)]
pub struct ArticleOverlay {
    layer: GeometryLayer,
    endpoint: Url,
    lang: Option<String>,
    articles: Vec<String>,
    controller: FetchController<ArticleScope>,
}

impl ArticleOverlay {
    pub fn new(id: u64, endpoint: Url) -> Self {
        Self {
            layer: GeometryLayer::new(id),
            endpoint,
            lang: None,
            articles: Vec::new(),
            controller: FetchController::new(),
        }
    }

    pub fn set_scope(&mut self, lang: Option<String>, articles: Vec<String>) {
        self.lang = lang.filter(|l| !l.trim().is_empty());
        self.articles = articles
            .into_iter()
            .map(|a| a.trim().to_string())
            .filter(|a| !a.is_empty())
            .collect();
    }

    pub fn scope(&self) -> Option<ArticleScope> {
        let lang = self.lang.clone()?;
        if self.articles.is_empty() {
            return None;
        }
        Some(ArticleScope {
            lang,
            articles: self.articles.clone(),
        })
    }

    pub fn layer(&self) -> &GeometryLayer {
        &self.layer
    }

    pub fn state(&self) -> &OverlayState<ArticleScope> {
        self.controller.state()
    }

    /// Starts a new generation for the current scope, one request per title.
    /// Does nothing while the language or the article list is missing.
    pub fn load_by_scope(&mut self) -> Vec<OverlayRequest> {
        let Some(scope) = self.scope() else {
            debug!("article overlay: no language or article, skipping load");
            return Vec::new();
        };
        self.layer.clear_layers();
        let generation = self
            .controller
            .begin_cleared(scope.clone(), scope.articles.len());
        info!(
            "loading {} article(s) from {}.wikipedia, generation {}",
            scope.articles.len(),
            scope.lang,
            generation.0
        );
        scope
            .articles
            .iter()
            .map(|article| {
                let mut url = self.endpoint.clone();
                url.query_pairs_mut()
                    .append_pair("lang", &scope.lang)
                    .append_pair("article", article);
                OverlayRequest {
                    overlay: self.layer.id(),
                    generation,
                    part: article.clone(),
                    url,
                }
            })
            .collect()
    }

    /// Applies one article response, then fits `map` to the layer.
    pub fn complete(
        &mut self,
        request: &OverlayRequest,
        result: Result<FetchResponse, FetchError>,
        map: &mut dyn MapWidget,
    ) -> Completion {
        if !self.controller.is_current(request.generation) {
            debug!(
                "dropping stale geometry for {:?} (generation {})",
                request.part, request.generation.0
            );
            return Completion::Stale;
        }
        match parse(result) {
            Ok(features) => {
                debug!("{} feature(s) for {:?}", features.len(), request.part);
                let completion = self.controller.succeed(request.generation);
                self.layer.add_features(features);
                if let Some(bounds) = self.layer.bounds() {
                    map.fit_bounds(bounds);
                }
                completion
            }
            Err(err) => {
                warn!("geometry for {:?} unavailable: {err}", request.part);
                self.controller.fail(request.generation)
            }
        }
    }
}

fn parse(result: Result<FetchResponse, FetchError>) -> Result<Vec<Feature>, FetchError> {
    let body = result?.into_body()?;
    Ok(try_normalize(
        &body,
        Schema::ProjectedGeoJson,
        &NormalizeContext::default(),
    )?)
}

impl Layer for ArticleOverlay {
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

#[cfg(test)]
mod tests {
    use super::{ArticleOverlay, ArticleScope, WIWOSM_ENDPOINT};
    use crate::controller::OverlayState;
    use crate::fetch::{FetchError, FetchResponse};
    use crate::request::Completion;
    use foundation::LatLng;
    use layers::headless::HeadlessMap;
    use layers::{Layer, MapWidget, Viewport};
    use pretty_assertions::assert_eq;
    use runtime::MapEvent;
    use url::Url;

    // EPSG:3857 for lon 10, lat 50.
    const POINT: &str = r#"{"type":"FeatureCollection","features":[
        {"type":"Feature","geometry":{"type":"Point",
         "coordinates":[1113194.9079327357,6446275.841017158]},
         "properties":{"title":"Somewhere"}}]}"#;

    const PATH: &str = r#"{"type":"FeatureCollection","features":[
        {"type":"Feature","geometry":{"type":"LineString",
         "coordinates":[[1224514.3987260093,5985284.198815076],[1280174.1441226797,6024540.797558038]]},
         "properties":{}}]}"#;

    fn map() -> HeadlessMap {
        HeadlessMap::new(Viewport::new(LatLng::new(47.3, 11.3), 9.0, [1024.0, 768.0]))
    }

    fn overlay(map: &mut HeadlessMap) -> ArticleOverlay {
        let endpoint = Url::parse(WIWOSM_ENDPOINT).expect("endpoint");
        let mut overlay = ArticleOverlay::new(1, endpoint);
        overlay.add_to(map);
        overlay
    }

    #[test]
    fn missing_language_or_article_is_a_no_op() {
        let mut map = map();
        let mut overlay = overlay(&mut map);
        overlay.set_scope(None, vec!["Innsbruck".into()]);
        assert!(overlay.load_by_scope().is_empty());
        overlay.set_scope(Some("de".into()), vec!["  ".into()]);
        assert!(overlay.load_by_scope().is_empty());
        assert_eq!(overlay.state(), &OverlayState::Idle);
    }

    #[test]
    fn one_request_per_article() {
        let mut map = map();
        let mut overlay = overlay(&mut map);
        overlay.set_scope(Some("de".into()), vec!["Innsbruck".into(), "Hall in Tirol".into()]);
        let requests = overlay.load_by_scope();
        assert_eq!(requests.len(), 2);
        assert!(requests.iter().all(|r| r.generation == requests[0].generation));
        let pairs: Vec<(String, String)> = requests[1].url.query_pairs().into_owned().collect();
        assert_eq!(
            pairs,
            vec![
                ("lang".to_string(), "de".to_string()),
                ("article".to_string(), "Hall in Tirol".to_string()),
            ]
        );
        assert_eq!(requests[1].url.path(), "/wiwosm/osmjson/getGeoJSON.php");
        assert_eq!(
            overlay.scope(),
            Some(ArticleScope {
                lang: "de".into(),
                articles: vec!["Innsbruck".into(), "Hall in Tirol".into()],
            })
        );
    }

    #[test]
    fn partial_failure_keeps_the_successful_articles() {
        let mut map = map();
        let mut overlay = overlay(&mut map);
        overlay.set_scope(
            Some("de".into()),
            vec!["A".into(), "B".into(), "C".into()],
        );
        let requests = overlay.load_by_scope();

        let first = overlay.complete(&requests[0], Ok(FetchResponse::ok(POINT)), &mut map);
        let second = overlay.complete(
            &requests[1],
            Ok(FetchResponse {
                status: 500,
                body: String::new(),
            }),
            &mut map,
        );
        let third = overlay.complete(&requests[2], Ok(FetchResponse::ok(PATH)), &mut map);

        assert_eq!(first, Completion::Applied);
        assert_eq!(second, Completion::Failed);
        assert_eq!(third, Completion::Applied);
        assert_eq!(overlay.layer().features().len(), 2);
        assert!(matches!(overlay.state(), OverlayState::Applied { .. }));

        // The map was refitted after each successful append.
        let events = map.events().drain();
        assert_eq!(events.len(), 2);
        let view = map.viewport().bounds();
        let all = overlay.bounds().expect("bounds");
        assert!(view.contains(all.south_west) && view.contains(all.north_east));
    }

    #[test]
    fn a_newer_load_makes_late_responses_stale() {
        let mut map = map();
        let mut overlay = overlay(&mut map);
        overlay.set_scope(Some("de".into()), vec!["Old".into()]);
        let old = overlay.load_by_scope();
        overlay.set_scope(Some("de".into()), vec!["New".into()]);
        let new = overlay.load_by_scope();

        assert_eq!(
            overlay.complete(&new[0], Ok(FetchResponse::ok(PATH)), &mut map),
            Completion::Applied
        );
        map.events().drain();
        assert_eq!(
            overlay.complete(&old[0], Ok(FetchResponse::ok(POINT)), &mut map),
            Completion::Stale
        );
        assert_eq!(overlay.layer().features().len(), 1);
        assert!(overlay.layer().features()[0].geometry.as_point().is_none());
        assert!(map.events().is_empty());
    }

    #[test]
    fn error_documents_do_not_move_the_map() {
        let mut map = map();
        let mut overlay = overlay(&mut map);
        overlay.set_scope(Some("de".into()), vec!["Nowhere".into()]);
        let requests = overlay.load_by_scope();
        let completion = overlay.complete(
            &requests[0],
            Ok(FetchResponse::ok(r#"{"error":"article not found"}"#)),
            &mut map,
        );
        assert_eq!(completion, Completion::Failed);
        assert!(overlay.layer().is_empty());
        assert_eq!(overlay.state(), &OverlayState::Idle);
        assert!(map.events().is_empty());
    }

    #[test]
    fn transport_errors_are_isolated() {
        let mut map = map();
        let mut overlay = overlay(&mut map);
        overlay.set_scope(Some("en".into()), vec!["Vienna".into()]);
        let requests = overlay.load_by_scope();
        let completion = overlay.complete(
            &requests[0],
            Err(FetchError::transport("connection refused")),
            &mut map,
        );
        assert_eq!(completion, Completion::Failed);
        assert!(!map.events().drain().iter().any(|e| matches!(e, MapEvent::ZoomEnd { .. })));
    }
}
