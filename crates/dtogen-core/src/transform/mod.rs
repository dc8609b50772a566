pub mod classifier;
pub mod composition;
pub mod inline_refs;
pub mod name_normalizer;
pub mod resolver;
pub mod spec_to_pojos;
pub mod type_mapper;

pub use spec_to_pojos::{MapResult, map_document, map_specification, map_specification_set};
