pub mod merge;
pub mod nesting;
pub mod preprocessing;
pub mod simplification;
pub mod tracer;

pub use merge::*;
pub use nesting::*;
pub use preprocessing::*;
pub use simplification::*;
pub use tracer::*;
