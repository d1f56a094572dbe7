use layers::LayerId;
use url::Url;

/// Monotonic fetch counter of one overlay. Larger is newer.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Generation(pub u64);

/// One HTTP GET issued by an overlay.
///
/// An overlay may issue several requests per generation (one per article);
/// `part` names which one this is.
#[derive(Debug, Clone, PartialEq)]
pub struct OverlayRequest {
    pub overlay: LayerId,
    pub generation: Generation,
    pub part: String,
    pub url: Url,
}

/// What a completed request did to its overlay.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Completion {
    /// Features were written to the layer.
    Applied,
    /// A newer generation started meanwhile; nothing changed.
    Stale,
    /// The response was unusable; the layer kept its contents.
    Failed,
}
