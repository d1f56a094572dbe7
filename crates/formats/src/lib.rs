pub mod commons;
pub mod error;
pub mod feature;
pub mod geojson;
pub mod marks;
pub mod normalize;

pub use error::*;
pub use feature::*;
pub use normalize::*;
