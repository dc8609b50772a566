pub mod config;
pub mod error;
pub mod model;
pub mod parse;
pub mod transform;

pub use config::PojoSettings;
pub use error::{TransformError, Warning};
pub use parse::loader::SpecificationSet;
pub use transform::{MapResult, map_document, map_specification, map_specification_set};
