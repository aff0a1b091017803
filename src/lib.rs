pub mod angle;
pub mod bounding_box;
pub mod color;
pub mod config;
pub mod discovery;
pub mod encoder;
pub mod error;
pub mod job;
pub mod loader;
pub mod normalizer;
pub mod point;
pub mod point_cloud;
pub mod pool;
pub mod projector;
pub mod raster;
pub mod report;
pub mod rotator;

pub mod prelude {
    pub use crate::angle::*;
    pub use crate::bounding_box::*;
    pub use crate::color::*;
    pub use crate::config::*;
    pub use crate::discovery::*;
    pub use crate::encoder::*;
    pub use crate::error::ProjectionError;
    pub use crate::job::*;
    pub use crate::loader::*;
    pub use crate::normalizer::*;
    pub use crate::point::*;
    pub use crate::point_cloud::*;
    pub use crate::pool::*;
    pub use crate::projector::*;
    pub use crate::raster::*;
    pub use crate::report::*;
    pub use crate::rotator::*;
}
