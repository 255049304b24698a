pub mod config;
pub mod error;
pub mod ir;
pub mod naming;
pub mod orchestrator;
pub mod parse;
pub mod transform;

pub use error::{GenerateError, ParseError, RenderError, ResolveError};

/// A generated file with path and content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedFile {
    pub path: String,
    pub content: String,
}

/// Trait for code generators that produce files from a resolved IR.
///
/// Implementations must be deterministic: the same IR and configuration
/// always yield byte-identical files in the same order.
pub trait CodeGenerator {
    fn target(&self) -> config::TargetLanguage;

    fn generate(
        &self,
        ir: &ir::IrSpec,
        config: &config::RunConfig,
    ) -> Result<Vec<GeneratedFile>, RenderError>;
}
