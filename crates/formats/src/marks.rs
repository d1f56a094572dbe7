use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use crate::commons::{article_url, thumbnail_url};
use crate::error::NormalizeError;
use crate::feature::{
    CATEGORY, Feature, PropertyValue, SOURCE_URL, THUMBNAIL_URL, THUMBNAIL_WIDTH, TITLE,
};
use crate::geojson::{features_from_collection, geographic};
use crate::normalize::NormalizeContext;

/// One flat marks/geosearch result.
#[derive(Debug, Clone, Deserialize)]
pub struct MarkRecord {
    pub title: String,
    pub lat: f64,
    pub lon: f64,
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GeosearchQuery {
    geosearch: Option<Vec<Value>>,
}

/// Builds point features from any of the marks response shapes: a bare
/// record array, a `{query: {geosearch}}` envelope, or a geographic
/// FeatureCollection with wp-world property names.
pub fn features_from_marks(
    value: &Value,
    ctx: &NormalizeContext,
) -> Result<Vec<Feature>, NormalizeError> {
    match value {
        Value::Array(records) => Ok(features_from_records(records, ctx)),
        Value::Object(obj) => {
            if obj.get("type").and_then(Value::as_str) == Some("FeatureCollection") {
                let features = features_from_collection(value, geographic)?;
                return Ok(features
                    .into_iter()
                    .map(|f| rename_wp_world_properties(f, ctx))
                    .collect());
            }
            let Some(query) = obj.get("query") else {
                return Err(NormalizeError::UnrecognizedMarks);
            };
            let query: GeosearchQuery = serde_json::from_value(query.clone())?;
            let records = query.geosearch.ok_or(NormalizeError::MissingGeosearch)?;
            Ok(features_from_records(&records, ctx))
        }
        _ => Err(NormalizeError::UnrecognizedMarks),
    }
}

fn features_from_records(records: &[Value], ctx: &NormalizeContext) -> Vec<Feature> {
    let mut out = Vec::with_capacity(records.len());
    for (index, raw) in records.iter().enumerate() {
        match MarkRecord::deserialize(raw) {
            Ok(record) => out.push(feature_from_record(&record, ctx)),
            Err(err) => debug!("skipping marks record {index}: {err}"),
        }
    }
    out
}

pub fn feature_from_record(record: &MarkRecord, ctx: &NormalizeContext) -> Feature {
    let mut feature = Feature::point(geographic(record.lon, record.lat))
        .with_property(TITLE, record.title.as_str());
    if ctx.sized_thumbnails {
        feature = feature.with_property(THUMBNAIL_WIDTH, f64::from(ctx.thumbnail_width));
    }
    if let Some(kind) = record.kind.as_deref().filter(|k| !k.is_empty()) {
        feature = feature.with_property(CATEGORY, kind);
    }
    if let Some(name) = record.name.as_deref().filter(|n| !n.is_empty()) {
        feature = feature.with_property("name", name);
    }
    if let Some(base) = &ctx.source_base {
        if let Some(url) = article_url(base, &record.title) {
            feature = feature.with_property(SOURCE_URL, url);
        }
        if let Some(url) = thumbnail_url(base, &record.title, ctx.thumbnail_width) {
            feature = feature.with_property(THUMBNAIL_URL, url);
        }
    }
    feature
}

fn rename_wp_world_properties(mut feature: Feature, ctx: &NormalizeContext) -> Feature {
    for (from, to) in [
        ("wikipediaUrl", SOURCE_URL),
        ("thumbnail", THUMBNAIL_URL),
        ("feature", CATEGORY),
    ] {
        if let Some(v) = feature.properties.remove(from) {
            feature.properties.insert(to.to_string(), v);
        }
    }
    if feature.source_url().is_none() {
        let derived = match (&ctx.source_base, feature.title()) {
            (Some(base), Some(title)) => article_url(base, title),
            _ => None,
        };
        if let Some(url) = derived {
            feature
                .properties
                .insert(SOURCE_URL.to_string(), PropertyValue::Text(url));
        }
    }
    feature
}
