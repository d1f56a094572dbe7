//! Fetch-and-replace overlays: article geometry and viewport marks.
//!
//! Overlays build [`OverlayRequest`]s and apply completed responses; the
//! caller owns the [`Fetcher`] and decides how requests are driven.

pub mod article;
pub mod controller;
pub mod fetch;
pub mod marks;
pub mod request;

pub use article::{ArticleOverlay, ArticleScope, WIWOSM_ENDPOINT};
pub use controller::{FetchController, OverlayState};
pub use fetch::{BoxFuture, FetchError, FetchResponse, Fetcher, HttpFetcher};
pub use marks::{GeosearchQuery, MarksBackend, MarksOverlay, WP_WORLD_ENDPOINT, WpWorldQuery};
pub use request::{Completion, Generation, OverlayRequest};
