pub mod codec;
pub mod emitters;
pub mod generator;
pub mod templates;
pub mod type_mapper;

pub use generator::DartDioGenerator;
pub use templates::{ModelVariant, OperationVariant, TemplateSet};
