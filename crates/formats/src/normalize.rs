use serde_json::Value;
use tracing::warn;
use url::Url;

use crate::error::NormalizeError;
use crate::feature::Feature;
use crate::geojson::{features_from_collection, spherical_mercator};
use crate::marks::features_from_marks;

/// Remote response families understood by the normalizer.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Schema {
    /// Article geometry: FeatureCollection in EPSG:3857.
    ProjectedGeoJson,
    /// Point marks: flat records, geosearch envelopes or geographic
    /// FeatureCollections.
    Marks,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NormalizeContext {
    /// Wiki used to synthesize `sourceUrl` and media thumbnails.
    pub source_base: Option<Url>,
    pub thumbnail_width: u32,
    /// Record `thumbnail_width` on features so popups size their image.
    pub sized_thumbnails: bool,
}

impl Default for NormalizeContext {
    fn default() -> Self {
        Self {
            source_base: None,
            thumbnail_width: 300,
            sized_thumbnails: false,
        }
    }
}

/// Total form: failures are logged and yield no features.
pub fn normalize(raw: &str, schema: Schema, ctx: &NormalizeContext) -> Vec<Feature> {
    match try_normalize(raw, schema, ctx) {
        Ok(features) => features,
        Err(err) => {
            warn!("discarding {schema:?} response: {err}");
            Vec::new()
        }
    }
}

pub fn try_normalize(
    raw: &str,
    schema: Schema,
    ctx: &NormalizeContext,
) -> Result<Vec<Feature>, NormalizeError> {
    let value: Value = serde_json::from_str(raw)?;
    if let Some(detail) = service_error(&value) {
        return Err(NormalizeError::Service(detail));
    }
    match schema {
        Schema::ProjectedGeoJson => features_from_collection(&value, spherical_mercator),
        Schema::Marks => features_from_marks(&value, ctx),
    }
}

/// Detail of an `error` member, as MediaWiki (`{code, info}`) or as plain text.
fn service_error(value: &Value) -> Option<String> {
    let err = value.as_object()?.get("error")?;
    let detail = match err {
        Value::Null | Value::Bool(false) => return None,
        Value::String(s) => s.clone(),
        Value::Object(obj) => {
            let code = obj.get("code").and_then(Value::as_str);
            let info = obj.get("info").and_then(Value::as_str);
            match (code, info) {
                (Some(code), Some(info)) => format!("{code}: {info}"),
                (Some(one), None) | (None, Some(one)) => one.to_string(),
                (None, None) => err.to_string(),
            }
        }
        other => other.to_string(),
    };
    Some(detail)
}

#[cfg(test)]
mod tests {
    use super::{NormalizeContext, Schema, normalize, try_normalize};
    use crate::error::NormalizeError;
    use crate::feature::Geometry;
    use pretty_assertions::assert_eq;
    use url::Url;

    fn assert_close(a: f64, b: f64, eps: f64) {
        let diff = (a - b).abs();
        assert!(diff <= eps, "expected {a} ~= {b} (diff {diff})");
    }

    #[test]
    fn projected_point_normalizes_to_degrees() {
        let raw = r#"{"type":"FeatureCollection","features":[
            {"type":"Feature","properties":{"name":"Marker"},
             "geometry":{"type":"Point","coordinates":[1113194.9079327357,6446275.841017158]}}]}"#;
        let features = normalize(raw, Schema::ProjectedGeoJson, &NormalizeContext::default());
        assert_eq!(features.len(), 1);
        let Geometry::Point(p) = features[0].geometry else {
            panic!("expected point");
        };
        assert_close(p.lng, 10.0, 1e-7);
        assert_close(p.lat, 50.0, 1e-7);
        assert_eq!(features[0].text("name"), Some("Marker"));
    }

    #[test]
    fn error_documents_are_recoverable() {
        let raw = r#"{"error":{"code":"invalidbbox","info":"Invalid bounding box"}}"#;
        let err = try_normalize(raw, Schema::Marks, &NormalizeContext::default()).unwrap_err();
        match err {
            NormalizeError::Service(detail) => {
                assert_eq!(detail, "invalidbbox: Invalid bounding box")
            }
            other => panic!("unexpected error {other:?}"),
        }
        assert!(normalize(raw, Schema::Marks, &NormalizeContext::default()).is_empty());
        let plain = r#"{"error":"no article"}"#;
        assert!(normalize(plain, Schema::ProjectedGeoJson, &NormalizeContext::default()).is_empty());
    }

    #[test]
    fn malformed_json_yields_nothing() {
        let ctx = NormalizeContext::default();
        assert!(normalize("<html>502</html>", Schema::ProjectedGeoJson, &ctx).is_empty());
        assert!(matches!(
            try_normalize("", Schema::Marks, &NormalizeContext::default()),
            Err(NormalizeError::Json(_))
        ));
    }

    #[test]
    fn marks_records_pick_up_derived_urls() {
        let ctx = NormalizeContext {
            source_base: Some(Url::parse("https://de.wikipedia.org").expect("url")),
            thumbnail_width: 120,
            sized_thumbnails: false,
        };
        let raw = r#"[
            {"title":"Innsbruck","lat":47.26,"lon":11.39,"type":"city"},
            {"title":"Patscherkofel","lat":47.21,"lon":11.46,"type":"mountain"},
            {"title":"File:Goldenes Dachl.jpg","lat":47.268,"lon":11.393,"type":"landmark"}
        ]"#;
        let features = normalize(raw, Schema::Marks, &ctx);
        assert_eq!(features.len(), 3);
        let thumbs: Vec<_> = features.iter().filter_map(|f| f.thumbnail_url()).collect();
        assert_eq!(
            thumbs,
            vec!["https://de.wikipedia.org/wiki/Special:FilePath/Goldenes_Dachl.jpg?width=120"]
        );
        assert!(features.iter().all(|f| f.thumbnail_width().is_none()));
    }
}
