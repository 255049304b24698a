use diogen_core::config::{RunConfig, TargetLanguage};
use diogen_core::ir::IrSpec;
use diogen_core::{CodeGenerator, GeneratedFile, RenderError};

use crate::emitters::{self, Renderer};
use crate::templates::TemplateSet;

/// Dart client generator on top of `dio`.
#[derive(Debug, Clone, Default)]
pub struct DartDioGenerator {
    templates: TemplateSet,
}

impl DartDioGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Render with a custom template set.
    pub fn with_templates(templates: TemplateSet) -> Self {
        Self { templates }
    }

    pub fn templates(&self) -> &TemplateSet {
        &self.templates
    }
}

impl CodeGenerator for DartDioGenerator {
    fn target(&self) -> TargetLanguage {
        TargetLanguage::DartDio
    }

    fn generate(
        &self,
        ir: &IrSpec,
        config: &RunConfig,
    ) -> Result<Vec<GeneratedFile>, RenderError> {
        let renderer = Renderer::new(&self.templates, ir, config)?;

        let mut files = emitters::scaffold::emit_scaffold(&renderer)?;
        files.extend(emitters::auth::emit_auth(&renderer)?);
        for model in ir.models.values() {
            files.push(emitters::models::emit_model(&renderer, model)?);
        }
        for module in &ir.modules {
            files.push(emitters::api::emit_module(&renderer, module)?);
        }

        log::info!(
            "rendered {} files ({} models, {} api modules)",
            files.len(),
            ir.models.len(),
            ir.modules.len()
        );
        Ok(files)
    }
}
