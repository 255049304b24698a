//! Template lookup and variant selection.
//!
//! Every render site picks its template through [`ModelVariant`] or
//! [`OperationVariant`], both closed enums, so a new model kind or feature
//! value cannot be rendered without a matching template.

use std::collections::BTreeMap;

use diogen_core::RenderError;
use diogen_core::config::{ResultRepresentation, SerializationStrategy};
use diogen_core::ir::ModelKind;
use minijinja::{AutoEscape, Environment};

/// How one model is rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelVariant {
    ObjectPlain,
    ObjectTagged,
    EnumPlain,
    EnumTagged,
    UnionPlain,
    UnionTagged,
    /// Primitive, array and map models become typedefs under every strategy.
    Alias,
}

impl ModelVariant {
    pub fn select(kind: &ModelKind, strategy: SerializationStrategy) -> Self {
        use SerializationStrategy::{Plain, TaggedUnionLibrary};
        match (kind, strategy) {
            (ModelKind::Object(_), Plain) => ModelVariant::ObjectPlain,
            (ModelKind::Object(_), TaggedUnionLibrary) => ModelVariant::ObjectTagged,
            (ModelKind::Enum(_), Plain) => ModelVariant::EnumPlain,
            (ModelKind::Enum(_), TaggedUnionLibrary) => ModelVariant::EnumTagged,
            (ModelKind::Union(_), Plain) => ModelVariant::UnionPlain,
            (ModelKind::Union(_), TaggedUnionLibrary) => ModelVariant::UnionTagged,
            (ModelKind::Primitive(_) | ModelKind::Array(_) | ModelKind::Map(_), _) => {
                ModelVariant::Alias
            }
        }
    }

    pub fn template(self) -> &'static str {
        match self {
            ModelVariant::ObjectPlain => "object_plain.dart.j2",
            ModelVariant::ObjectTagged => "object_freezed.dart.j2",
            ModelVariant::EnumPlain => "enum_plain.dart.j2",
            ModelVariant::EnumTagged => "enum_json.dart.j2",
            ModelVariant::UnionPlain => "union_sealed.dart.j2",
            ModelVariant::UnionTagged => "union_freezed.dart.j2",
            ModelVariant::Alias => "typedef.dart.j2",
        }
    }
}

/// How one operation reports failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationVariant {
    Throwing,
    TaggedResult,
}

impl OperationVariant {
    pub fn select(representation: ResultRepresentation) -> Self {
        match representation {
            ResultRepresentation::Throwing => OperationVariant::Throwing,
            ResultRepresentation::TaggedResult => OperationVariant::TaggedResult,
        }
    }

    pub fn template(self) -> &'static str {
        match self {
            OperationVariant::Throwing => "operation_throwing.dart.j2",
            OperationVariant::TaggedResult => "operation_result.dart.j2",
        }
    }
}

const TEMPLATES: &[(&str, &str)] = &[
    (
        "object_plain.dart.j2",
        include_str!("../templates/object_plain.dart.j2"),
    ),
    (
        "object_freezed.dart.j2",
        include_str!("../templates/object_freezed.dart.j2"),
    ),
    (
        "enum_plain.dart.j2",
        include_str!("../templates/enum_plain.dart.j2"),
    ),
    (
        "enum_json.dart.j2",
        include_str!("../templates/enum_json.dart.j2"),
    ),
    (
        "union_sealed.dart.j2",
        include_str!("../templates/union_sealed.dart.j2"),
    ),
    (
        "union_freezed.dart.j2",
        include_str!("../templates/union_freezed.dart.j2"),
    ),
    ("typedef.dart.j2", include_str!("../templates/typedef.dart.j2")),
    (
        "operation_throwing.dart.j2",
        include_str!("../templates/operation_throwing.dart.j2"),
    ),
    (
        "operation_result.dart.j2",
        include_str!("../templates/operation_result.dart.j2"),
    ),
    (
        "request_block.dart.j2",
        include_str!("../templates/request_block.dart.j2"),
    ),
    (
        "decode_block.dart.j2",
        include_str!("../templates/decode_block.dart.j2"),
    ),
    ("api.dart.j2", include_str!("../templates/api.dart.j2")),
    (
        "api_client.dart.j2",
        include_str!("../templates/api_client.dart.j2"),
    ),
    ("library.dart.j2", include_str!("../templates/library.dart.j2")),
    ("auth.dart.j2", include_str!("../templates/auth.dart.j2")),
    (
        "api_key_auth.dart.j2",
        include_str!("../templates/api_key_auth.dart.j2"),
    ),
    (
        "basic_auth.dart.j2",
        include_str!("../templates/basic_auth.dart.j2"),
    ),
    (
        "bearer_auth.dart.j2",
        include_str!("../templates/bearer_auth.dart.j2"),
    ),
    ("pubspec.yaml.j2", include_str!("../templates/pubspec.yaml.j2")),
    ("build.yaml.j2", include_str!("../templates/build.yaml.j2")),
    (
        "analysis_options.yaml.j2",
        include_str!("../templates/analysis_options.yaml.j2"),
    ),
    ("README.md.j2", include_str!("../templates/README.md.j2")),
    ("gitignore.j2", include_str!("../templates/gitignore.j2")),
];

/// The templates a generator renders with, keyed by name.
#[derive(Debug, Clone)]
pub struct TemplateSet {
    sources: BTreeMap<&'static str, &'static str>,
}

impl Default for TemplateSet {
    fn default() -> Self {
        Self::dart()
    }
}

impl TemplateSet {
    /// The embedded Dart/dio templates.
    pub fn dart() -> Self {
        Self {
            sources: TEMPLATES.iter().copied().collect(),
        }
    }

    /// This set with one template removed.
    pub fn without(mut self, name: &str) -> Self {
        self.sources.remove(name);
        self
    }

    pub fn contains(&self, name: &str) -> bool {
        self.sources.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.sources.keys().copied()
    }

    /// Compile every template into a fresh environment.
    pub fn environment(&self) -> Result<Environment<'static>, RenderError> {
        let mut env = Environment::new();
        env.set_trim_blocks(true);
        env.set_keep_trailing_newline(true);
        env.set_auto_escape_callback(|_| AutoEscape::None);
        for (&name, &source) in &self.sources {
            env.add_template(name, source)
                .map_err(|e| RenderError::Template {
                    subject: "template set".to_string(),
                    template: name.to_string(),
                    message: e.to_string(),
                })?;
        }
        Ok(env)
    }
}
