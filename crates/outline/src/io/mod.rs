pub mod geojson;
pub mod svg;

pub use svg::*;
