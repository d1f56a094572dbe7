pub mod collision;
pub mod geometry;
pub mod headless;
pub mod layer;
pub mod map;
pub mod marks;
pub mod popup;
pub mod raster;
pub mod symbology;
pub mod viewport;

pub use layer::*;
pub use map::*;
pub use viewport::*;
