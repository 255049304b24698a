use std::fs;
use std::path::Path;

use indexmap::IndexMap;
use serde::Deserialize;

/// Which renderer a run targets.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TargetLanguage {
    #[default]
    DartDio,
}

impl TargetLanguage {
    pub fn as_str(&self) -> &'static str {
        match self {
            TargetLanguage::DartDio => "dart-dio",
        }
    }
}

/// How models (and unions in particular) are serialized by generated code.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SerializationStrategy {
    /// Hand-written `fromJson`/`toJson`, manual discriminator dispatch.
    #[default]
    Plain,
    /// A code-generating tagged-union library (freezed).
    TaggedUnionLibrary,
}

/// How generated operations report failure.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ResultRepresentation {
    /// Failures are thrown.
    #[default]
    Throwing,
    /// Failures are returned as a `Result` value.
    TaggedResult,
}

/// How container responses are decoded. Only the inline form exists: arrays
/// map over elements and maps over entries, each through the element's own
/// decoder.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ContainerDecode {
    #[default]
    Inline,
}

/// The typed, immutable feature set of one generation run.
///
/// Raw option strings are interpreted here and nowhere else.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeatureConfig {
    serialization: SerializationStrategy,
    result_representation: ResultRepresentation,
    container_decode: ContainerDecode,
    hide_generation_timestamp: bool,
}

impl Default for FeatureConfig {
    fn default() -> Self {
        Self {
            serialization: SerializationStrategy::Plain,
            result_representation: ResultRepresentation::Throwing,
            container_decode: ContainerDecode::Inline,
            hide_generation_timestamp: true,
        }
    }
}

impl FeatureConfig {
    pub fn new(serialization: SerializationStrategy, result: ResultRepresentation) -> Self {
        Self {
            serialization,
            result_representation: result,
            ..Self::default()
        }
    }

    /// Interpret raw `option → value` pairs. Unknown options are ignored and
    /// unknown values fall back to the option's default.
    pub fn from_options(options: &IndexMap<String, String>) -> Self {
        let mut features = Self::default();

        for (key, value) in options {
            let value = value.trim();
            match key.as_str() {
                "serializationStrategy" | "serializationLibrary" => {
                    match parse_serialization(value) {
                        Some(strategy) => features.serialization = strategy,
                        None => log::warn!(
                            "unknown value `{value}` for option `{key}`, keeping {:?}",
                            features.serialization
                        ),
                    }
                }
                "resultRepresentation" => match value {
                    "throwing" | "Throwing" => {
                        features.result_representation = ResultRepresentation::Throwing
                    }
                    "taggedResult" | "TaggedResult" => {
                        features.result_representation = ResultRepresentation::TaggedResult
                    }
                    other => log::warn!("unknown value `{other}` for option `{key}`, ignoring"),
                },
                "useResultDart" => match parse_bool(value) {
                    Some(true) => features.result_representation = ResultRepresentation::TaggedResult,
                    Some(false) => features.result_representation = ResultRepresentation::Throwing,
                    None => log::warn!("option `{key}` expects a boolean, got `{value}`"),
                },
                "inlineContainerDecode" => {
                    if parse_bool(value) == Some(false) {
                        log::warn!("inline container decoding is always enabled; ignoring `{key}={value}`");
                    }
                }
                "hideGenerationTimestamp" => match parse_bool(value) {
                    Some(hide) => features.hide_generation_timestamp = hide,
                    None => log::warn!("option `{key}` expects a boolean, got `{value}`"),
                },
                other => log::debug!("ignoring unrecognized option `{other}`"),
            }
        }

        features
    }

    pub fn serialization(&self) -> SerializationStrategy {
        self.serialization
    }

    pub fn result_representation(&self) -> ResultRepresentation {
        self.result_representation
    }

    pub fn container_decode(&self) -> ContainerDecode {
        self.container_decode
    }

    pub fn hide_generation_timestamp(&self) -> bool {
        self.hide_generation_timestamp
    }
}

fn parse_serialization(value: &str) -> Option<SerializationStrategy> {
    match value {
        "plain" | "Plain" | "built_value" | "json_serializable" => {
            Some(SerializationStrategy::Plain)
        }
        "taggedUnionLibrary" | "TaggedUnionLibrary" | "freezed" => {
            Some(SerializationStrategy::TaggedUnionLibrary)
        }
        _ => None,
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.to_ascii_lowercase().as_str() {
        "true" | "yes" | "on" | "1" => Some(true),
        "false" | "no" | "off" | "0" => Some(false),
        _ => None,
    }
}

/// Naming strategy and aliases.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct NamingConfig {
    pub strategy: NamingStrategy,
    /// Map from resolved operation name (operationId or route-derived) to custom alias.
    pub aliases: IndexMap<String, String>,
}

/// How operation names are derived.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NamingStrategy {
    #[default]
    UseOperationId,
    UseRouteBased,
}

/// Package metadata written into the generated manifest.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PubspecOptions {
    pub version: String,
    pub description: Option<String>,
    pub git_user_id: Option<String>,
    pub git_repo_id: Option<String>,
}

impl Default for PubspecOptions {
    fn default() -> Self {
        Self {
            version: "1.0.0".to_string(),
            description: None,
            git_user_id: None,
            git_repo_id: None,
        }
    }
}

impl PubspecOptions {
    /// `https://github.com/<user>/<repo>` when both ids are known.
    pub fn homepage(&self) -> Option<String> {
        match (&self.git_user_id, &self.git_repo_id) {
            (Some(user), Some(repo)) => Some(format!("https://github.com/{user}/{repo}")),
            _ => None,
        }
    }
}

/// Everything one generation run needs besides the spec document itself.
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub target: TargetLanguage,
    pub package_name: String,
    pub features: FeatureConfig,
    pub naming: NamingConfig,
    pub pubspec: PubspecOptions,
    /// Timestamp text for generated headers; only used when the features
    /// do not hide it.
    pub generated_at: Option<String>,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            target: TargetLanguage::DartDio,
            package_name: "openapi".to_string(),
            features: FeatureConfig::default(),
            naming: NamingConfig::default(),
            pubspec: PubspecOptions::default(),
            generated_at: None,
        }
    }
}

impl RunConfig {
    pub fn with_features(features: FeatureConfig) -> Self {
        Self {
            features,
            ..Self::default()
        }
    }
}

/// Top-level project configuration loaded from `.diogen.yaml`.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ProjectConfig {
    pub input: String,
    pub output: String,
    pub target: TargetLanguage,
    pub package_name: String,
    pub naming: NamingConfig,
    pub pubspec: PubspecOptions,
    /// Raw feature options, interpreted by [`FeatureConfig::from_options`].
    pub features: IndexMap<String, serde_json::Value>,
}

impl Default for ProjectConfig {
    fn default() -> Self {
        Self {
            input: "openapi.yaml".to_string(),
            output: "generated".to_string(),
            target: TargetLanguage::DartDio,
            package_name: "openapi".to_string(),
            naming: NamingConfig::default(),
            pubspec: PubspecOptions::default(),
            features: IndexMap::new(),
        }
    }
}

impl ProjectConfig {
    /// Raw feature options flattened to strings. `extra` entries win.
    pub fn option_strings(&self, extra: &IndexMap<String, String>) -> IndexMap<String, String> {
        let mut options: IndexMap<String, String> = self
            .features
            .iter()
            .map(|(k, v)| {
                let text = match v {
                    serde_json::Value::String(s) => s.clone(),
                    other => other.to_string(),
                };
                (k.clone(), text)
            })
            .collect();
        for (k, v) in extra {
            options.insert(k.clone(), v.clone());
        }
        options
    }

    /// Build the run configuration, applying command-line overrides.
    pub fn to_run_config(&self, extra_options: &IndexMap<String, String>) -> RunConfig {
        RunConfig {
            target: self.target,
            package_name: self.package_name.clone(),
            features: FeatureConfig::from_options(&self.option_strings(extra_options)),
            naming: self.naming.clone(),
            pubspec: self.pubspec.clone(),
            generated_at: None,
        }
    }
}

/// Default config file name.
pub const CONFIG_FILE_NAME: &str = ".diogen.yaml";

/// Load config from a YAML file. Returns `None` if the file doesn't exist.
pub fn load_config(path: &Path) -> Result<Option<ProjectConfig>, String> {
    if !path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(path)
        .map_err(|e| format!("failed to read config {}: {}", path.display(), e))?;
    let config: ProjectConfig = serde_yaml_ng::from_str(&content)
        .map_err(|e| format!("failed to parse config {}: {}", path.display(), e))?;
    Ok(Some(config))
}

/// Generate the default config file content.
pub fn default_config_content() -> &'static str {
    r#"# diogen configuration
input: openapi.yaml
output: generated
target: dart-dio
package_name: openapi

naming:
  strategy: use_operation_id  # use_operation_id | use_route_based
  aliases: {}
    # createChatCompletion: chat     # operationId -> custom name

pubspec:
  version: 1.0.0
  # description: Client for my API
  # git_user_id: my-user
  # git_repo_id: my-repo

features:
  serializationStrategy: plain      # plain | taggedUnionLibrary (freezed)
  resultRepresentation: throwing    # throwing | taggedResult (result_dart)
  hideGenerationTimestamp: true
"#
}
