use thiserror::Error;

/// Why a remote response could not be turned into features.
#[derive(Debug, Error)]
pub enum NormalizeError {
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("service reported an error: {0}")]
    Service(String),
    #[error("expected GeoJSON FeatureCollection")]
    NotAFeatureCollection,
    #[error("invalid feature at index {index}: {reason}")]
    InvalidFeature { index: usize, reason: String },
    #[error("response has no geosearch result list")]
    MissingGeosearch,
    #[error("unrecognized marks response shape")]
    UnrecognizedMarks,
}
