use diogen_core::config::{ResultRepresentation, SerializationStrategy};
use diogen_core::{GeneratedFile, RenderError};
use minijinja::context;
use serde::Serialize;

use super::api::{api_class_name, api_file_name};
use super::auth::{auth_files, interceptors};
use super::{CommentStyle, Renderer};
use crate::type_mapper::{doc_lines, model_file, string_literal};

#[derive(Debug, Serialize)]
struct ApiEntry {
    class_name: String,
    file: String,
    tag: String,
}

/// Package manifest, tooling files, the library entry point and the root
/// client class.
pub fn emit_scaffold(r: &Renderer<'_>) -> Result<Vec<GeneratedFile>, RenderError> {
    let features = &r.config.features;
    let freezed = features.serialization() == SerializationStrategy::TaggedUnionLibrary;
    let result_dart = features.result_representation() == ResultRepresentation::TaggedResult;
    let package = r.package();
    let client_class = &r.ir.client_name;

    let apis: Vec<ApiEntry> = r
        .ir
        .modules
        .iter()
        .map(|m| ApiEntry {
            class_name: api_class_name(m),
            file: api_file_name(m),
            tag: m.tag.clone(),
        })
        .collect();
    let models: Vec<String> = r.ir.models.keys().map(|id| model_file(id)).collect();

    let description = r
        .config
        .pubspec
        .description
        .clone()
        .or_else(|| r.ir.info.description.clone())
        .map(|d| d.lines().next().unwrap_or_default().trim().to_string())
        .filter(|d| !d.is_empty())
        .unwrap_or_else(|| format!("Dart dio client for {}", r.ir.info.title));

    let mut files = vec![
        GeneratedFile {
            path: "pubspec.yaml".to_string(),
            content: r.render(
                "pubspec.yaml.j2",
                "pubspec.yaml",
                context! {
                    header => r.header(CommentStyle::Hash),
                    package => &package,
                    version => &r.config.pubspec.version,
                    description => serde_json::Value::String(description).to_string(),
                    homepage => r.config.pubspec.homepage(),
                    freezed,
                    result_dart,
                },
            )?,
        },
        GeneratedFile {
            path: "analysis_options.yaml".to_string(),
            content: r.render(
                "analysis_options.yaml.j2",
                "analysis_options.yaml",
                context! {
                    header => r.header(CommentStyle::Hash),
                    freezed,
                },
            )?,
        },
        GeneratedFile {
            path: ".gitignore".to_string(),
            content: r.render(
                "gitignore.j2",
                ".gitignore",
                context! { header => r.header(CommentStyle::Hash) },
            )?,
        },
        GeneratedFile {
            path: "README.md".to_string(),
            content: r.render(
                "README.md.j2",
                "README.md",
                context! {
                    header => r.header(CommentStyle::Html),
                    title => &r.ir.info.title,
                    version => &r.ir.info.version,
                    doc => doc_lines(r.ir.info.description.as_deref()),
                    package => &package,
                    client_class,
                    homepage => r.config.pubspec.homepage(),
                    apis => &apis,
                    auth => interceptors(r.ir),
                    models => r.ir.models.keys().collect::<Vec<_>>(),
                    freezed,
                    result_dart,
                },
            )?,
        },
    ];

    if freezed {
        files.push(GeneratedFile {
            path: "build.yaml".to_string(),
            content: r.render(
                "build.yaml.j2",
                "build.yaml",
                context! { header => r.header(CommentStyle::Hash) },
            )?,
        });
    }

    files.push(GeneratedFile {
        path: format!("lib/{package}.dart"),
        content: r.render(
            "library.dart.j2",
            &package,
            context! {
                header => r.header(CommentStyle::Slash),
                apis => &apis,
                auth_files => auth_files(r.ir),
                models,
            },
        )?,
    });

    let base_path = r
        .ir
        .servers
        .first()
        .map(|s| s.url.trim_end_matches('/').to_string())
        .unwrap_or_else(|| "http://localhost".to_string());
    files.push(GeneratedFile {
        path: "lib/src/api.dart".to_string(),
        content: r.render(
            "api_client.dart.j2",
            client_class,
            context! {
                header => r.header(CommentStyle::Slash),
                class_name => client_class,
                base_path => string_literal(&base_path),
                apis => &apis,
                auth => interceptors(r.ir),
            },
        )?,
    });

    Ok(files)
}
