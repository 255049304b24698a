pub mod api;
pub mod auth;
pub mod models;
pub mod scaffold;

use diogen_core::RenderError;
use diogen_core::config::RunConfig;
use diogen_core::ir::IrSpec;
use heck::ToSnakeCase;
use minijinja::Environment;

use crate::codec::Codec;
use crate::templates::TemplateSet;

/// Comment syntax of a generated file's header.
#[derive(Debug, Clone, Copy)]
pub enum CommentStyle {
    Slash,
    Hash,
    Html,
}

/// Everything an emitter needs for one run: the compiled templates, the IR
/// and the run configuration.
pub struct Renderer<'a> {
    env: Environment<'static>,
    templates: &'a TemplateSet,
    pub ir: &'a IrSpec,
    pub config: &'a RunConfig,
    pub codec: Codec<'a>,
}

impl<'a> Renderer<'a> {
    pub fn new(
        templates: &'a TemplateSet,
        ir: &'a IrSpec,
        config: &'a RunConfig,
    ) -> Result<Self, RenderError> {
        Ok(Self {
            env: templates.environment()?,
            templates,
            ir,
            config,
            codec: Codec::new(&ir.models),
        })
    }

    /// Render template `name` for `subject`, the model, module or file the
    /// output belongs to.
    pub fn render(
        &self,
        name: &str,
        subject: &str,
        ctx: minijinja::Value,
    ) -> Result<String, RenderError> {
        if !self.templates.contains(name) {
            return Err(RenderError::VariantMissing {
                subject: subject.to_string(),
                variant: name.to_string(),
            });
        }
        let template_error = |e: minijinja::Error| RenderError::Template {
            subject: subject.to_string(),
            template: name.to_string(),
            message: format!("{e:#}"),
        };
        self.env
            .get_template(name)
            .map_err(template_error)?
            .render(ctx)
            .map_err(template_error)
    }

    /// Dart package name.
    pub fn package(&self) -> String {
        self.config.package_name.to_snake_case()
    }

    /// The "do not edit" banner opening every generated file.
    pub fn header(&self, style: CommentStyle) -> String {
        let mut lines = vec![
            "AUTO-GENERATED FILE, DO NOT MODIFY!".to_string(),
            format!(
                "Generated by diogen {} from {} {}.",
                env!("CARGO_PKG_VERSION"),
                single_line(&self.ir.info.title),
                single_line(&self.ir.info.version)
            ),
        ];
        if !self.config.features.hide_generation_timestamp()
            && let Some(at) = &self.config.generated_at
        {
            lines.push(format!("Generated at {}.", single_line(at)));
        }
        match style {
            CommentStyle::Slash => lines
                .iter()
                .map(|l| format!("// {l}"))
                .collect::<Vec<_>>()
                .join("\n"),
            CommentStyle::Hash => lines
                .iter()
                .map(|l| format!("# {l}"))
                .collect::<Vec<_>>()
                .join("\n"),
            CommentStyle::Html => format!("<!-- {} -->", lines.join(" ")),
        }
    }
}

/// `text` with every run of whitespace, line breaks included, collapsed to
/// one space, so it fits a single comment line.
fn single_line(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Sort and dedup import paths.
pub(crate) fn sorted_imports(mut imports: Vec<String>) -> Vec<String> {
    imports.sort();
    imports.dedup();
    imports
}
