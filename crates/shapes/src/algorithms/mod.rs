pub mod preprocessing;
pub mod extraction;
pub mod simplification;
pub mod corners;
pub mod classification;

pub use preprocessing::*;
pub use extraction::*;
pub use simplification::*;
pub use corners::*;
pub use classification::*;
