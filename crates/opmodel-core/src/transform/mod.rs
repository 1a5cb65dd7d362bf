pub mod doc_comment;
pub mod name_normalizer;
pub mod operation_builder;
pub mod parameter_resolver;
pub mod response_classifier;
pub mod spec_to_ir;
pub mod type_mapper;

pub use operation_builder::OperationBuilder;
pub use response_classifier::{ErrorPredicate, StatusThreshold};
pub use spec_to_ir::{TransformOptions, load, transform, transform_with_options};
