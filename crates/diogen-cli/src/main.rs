use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::process::Command;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use clap_complete::Shell;
use indexmap::IndexMap;

use diogen_core::config::{self, CONFIG_FILE_NAME, ProjectConfig, RunConfig};
use diogen_core::ir::IrSpec;
use diogen_core::orchestrator::{self, OutputSink};
use diogen_core::parse::{self, spec::OpenApiSpec};
use diogen_core::{GeneratedFile, transform};
use diogen_dart::DartDioGenerator;

#[derive(Parser)]
#[command(name = "diogen", about = "OpenAPI 3.x to Dart/dio client generator", version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a Dart package from an OpenAPI spec
    Generate {
        /// Path to the OpenAPI spec file (YAML or JSON)
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Output directory
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Name of the generated Dart package
        #[arg(long)]
        package_name: Option<String>,

        /// Feature option as key=value, e.g. serializationLibrary=freezed
        #[arg(long = "option", value_name = "KEY=VALUE", value_parser = parse_option)]
        options: Vec<(String, String)>,

        /// Timestamp written into file headers when hideGenerationTimestamp=false
        #[arg(long)]
        generated_at: Option<String>,
    },

    /// Validate an OpenAPI spec
    Validate {
        /// Path to the OpenAPI spec file
        #[arg(short, long)]
        input: PathBuf,
    },

    /// Inspect the resolved models and operations of an OpenAPI spec
    Inspect {
        /// Path to the OpenAPI spec file
        #[arg(short, long)]
        input: PathBuf,

        /// Output format
        #[arg(long, default_value = "yaml")]
        format: InspectFormat,
    },

    /// Initialize a new diogen configuration
    Init {
        /// Overwrite existing files
        #[arg(long)]
        force: bool,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        shell: Shell,
    },
}

#[derive(Clone, ValueEnum)]
enum InspectFormat {
    Yaml,
    Json,
}

fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Generate {
            input,
            output,
            package_name,
            options,
            generated_at,
        } => cmd_generate(GenerateArgs {
            input,
            output,
            package_name,
            options: options.into_iter().collect(),
            generated_at,
        }),

        Commands::Validate { input } => cmd_validate(&input),

        Commands::Inspect { input, format } => cmd_inspect(&input, format),

        Commands::Init { force } => {
            let path = PathBuf::from(CONFIG_FILE_NAME);
            init_config(&path, force)?;
            eprintln!("Created {}", path.display());
            Ok(())
        }

        Commands::Completions { shell } => {
            let mut cmd = <Cli as clap::CommandFactory>::command();
            clap_complete::generate(shell, &mut cmd, "diogen", &mut io::stdout());
            Ok(())
        }
    }
}

/// Command-line values that override the project config.
struct GenerateArgs {
    input: Option<PathBuf>,
    output: Option<PathBuf>,
    package_name: Option<String>,
    options: IndexMap<String, String>,
    generated_at: Option<String>,
}

fn parse_option(raw: &str) -> Result<(String, String), String> {
    match raw.split_once('=') {
        Some((key, value)) if !key.trim().is_empty() => {
            Ok((key.trim().to_string(), value.trim().to_string()))
        }
        _ => Err(format!("expected KEY=VALUE, got `{raw}`")),
    }
}

/// Try to load the project config file from the current directory.
fn try_load_config() -> Result<Option<ProjectConfig>> {
    let config_path = PathBuf::from(CONFIG_FILE_NAME);
    config::load_config(&config_path).map_err(|e| anyhow::anyhow!(e))
}

fn read_spec(path: &Path) -> Result<OpenApiSpec> {
    let content =
        fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;

    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("yaml");

    let parsed = match ext {
        "json" => parse::from_json(&content),
        _ => parse::from_yaml(&content),
    }
    .with_context(|| format!("failed to parse {}", path.display()))?;
    Ok(parsed)
}

fn resolve_spec(path: &Path, run: &RunConfig) -> Result<IrSpec> {
    let parsed = read_spec(path)?;
    transform::resolve(&parsed, run).with_context(|| format!("failed to resolve {}", path.display()))
}

/// Writes a finished file set below `root`.
struct FsOutputSink {
    root: PathBuf,
}

impl OutputSink for FsOutputSink {
    type Error = io::Error;

    fn write(&mut self, files: &[GeneratedFile]) -> Result<(), io::Error> {
        for file in files {
            let path = self.root.join(&file.path);
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent).map_err(|e| annotate(e, parent))?;
            }
            fs::write(&path, &file.content).map_err(|e| annotate(e, &path))?;
            log::debug!("wrote {}", path.display());
        }
        Ok(())
    }
}

fn annotate(err: io::Error, path: &Path) -> io::Error {
    io::Error::new(err.kind(), format!("{}: {err}", path.display()))
}

/// Run `dart format` over the output directory if the SDK is installed.
fn try_run_formatter(output_dir: &Path) {
    match Command::new("dart")
        .args(["format", "."])
        .current_dir(output_dir)
        .output()
    {
        Ok(result) if result.status.success() => {
            eprintln!("  formatted with dart format");
        }
        Ok(_) => {
            eprintln!("  warning: dart format had issues (non-zero exit), output may need manual formatting");
        }
        Err(_) => {
            eprintln!(
                "  note: dart not found, run `dart format .` in {} to format",
                output_dir.display()
            );
        }
    }
}

fn cmd_generate(args: GenerateArgs) -> Result<()> {
    let cfg = try_load_config()?.unwrap_or_default();
    let input = args.input.unwrap_or_else(|| PathBuf::from(&cfg.input));
    let output_dir = args.output.unwrap_or_else(|| PathBuf::from(&cfg.output));

    let mut run = cfg.to_run_config(&args.options);
    if let Some(name) = args.package_name {
        run.package_name = name;
    }
    run.generated_at = args.generated_at;

    let spec = read_spec(&input)?;
    eprintln!(
        "Generating {} package `{}` → {}",
        run.target.as_str(),
        run.package_name,
        output_dir.display()
    );

    let mut sink = FsOutputSink {
        root: output_dir.clone(),
    };
    let files = orchestrator::run(&spec, &run, &DartDioGenerator::new(), &mut sink)
        .map_err(|e| {
            let phase = e.phase();
            anyhow::Error::new(e).context(format!("generation failed during {phase}"))
        })?;

    try_run_formatter(&output_dir);

    eprintln!("Generated {} files in {}", files.len(), output_dir.display());
    Ok(())
}

fn cmd_validate(input: &Path) -> Result<()> {
    let parsed = read_spec(input)?;

    eprintln!(
        "Valid OpenAPI {} spec: {}",
        parsed.openapi, parsed.info.title
    );
    eprintln!("  Version: {}", parsed.info.version);
    eprintln!("  Paths: {}", parsed.paths.len());

    if let Some(ref components) = parsed.components {
        eprintln!("  Schemas: {}", components.schemas.len());
    }

    let run = try_load_config()?
        .map(|cfg| cfg.to_run_config(&IndexMap::new()))
        .unwrap_or_default();
    let ir = transform::resolve(&parsed, &run)
        .with_context(|| format!("failed to resolve {}", input.display()))?;
    eprintln!("  Operations: {}", ir.operations.len());
    eprintln!("  Models: {}", ir.models.len());
    eprintln!("  API modules: {}", ir.modules.len());

    eprintln!("Validation successful.");
    Ok(())
}

fn cmd_inspect(input: &Path, format: InspectFormat) -> Result<()> {
    let ir = resolve_spec(input, &RunConfig::default())?;

    let summary = build_inspect_summary(&ir);

    match format {
        InspectFormat::Yaml => {
            let yaml = serde_yaml_ng::to_string(&summary)?;
            print!("{}", yaml);
        }
        InspectFormat::Json => {
            let json = serde_json::to_string_pretty(&summary)?;
            println!("{}", json);
        }
    }

    Ok(())
}

fn build_inspect_summary(ir: &IrSpec) -> serde_json::Value {
    let models: Vec<serde_json::Value> = ir
        .models
        .values()
        .map(|m| {
            serde_json::json!({
                "name": m.id,
                "schema": m.raw_name,
                "kind": m.kind.label(),
            })
        })
        .collect();

    let operations: Vec<serde_json::Value> = ir
        .operations
        .iter()
        .map(|op| {
            serde_json::json!({
                "name": op.name,
                "method": op.method.as_str(),
                "path": op.path,
                "returns_body": op.success_type().is_some(),
                "tags": op.tags,
                "security": op.security,
            })
        })
        .collect();

    serde_json::json!({
        "info": {
            "title": ir.info.title,
            "version": ir.info.version,
        },
        "models": models,
        "operations": operations,
        "modules": ir.modules.iter().map(|m| &m.tag).collect::<Vec<_>>(),
        "client": ir.client_name,
        "security_schemes": ir
            .security_schemes
            .iter()
            .map(|s| serde_json::json!({ "name": s.name, "kind": s.kind.as_str() }))
            .collect::<Vec<_>>(),
    })
}

fn init_config(path: &Path, force: bool) -> Result<()> {
    if path.exists() && !force {
        anyhow::bail!(
            "{} already exists. Use --force to overwrite.",
            path.display()
        );
    }

    fs::write(path, config::default_config_content())
        .with_context(|| format!("failed to write {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const PETSTORE: &str = include_str!("../../diogen-core/tests/fixtures/petstore.yaml");
    const SECURITY: &str = include_str!("../../diogen-core/tests/fixtures/security.yaml");

    #[test]
    fn test_parse_option() {
        assert_eq!(
            parse_option("serializationLibrary=freezed"),
            Ok(("serializationLibrary".to_string(), "freezed".to_string()))
        );
        assert_eq!(
            parse_option(" useResultDart = true "),
            Ok(("useResultDart".to_string(), "true".to_string()))
        );
        assert!(parse_option("freezed").is_err());
        assert!(parse_option("=freezed").is_err());
    }

    #[test]
    fn test_fs_sink_writes_nested_files() {
        let dir = tempfile::tempdir().unwrap();
        let mut sink = FsOutputSink {
            root: dir.path().join("out"),
        };
        let files = vec![
            GeneratedFile {
                path: "pubspec.yaml".to_string(),
                content: "name: x\n".to_string(),
            },
            GeneratedFile {
                path: "lib/src/model/pet.dart".to_string(),
                content: "class Pet {}\n".to_string(),
            },
        ];
        sink.write(&files).unwrap();

        let written = fs::read_to_string(dir.path().join("out/lib/src/model/pet.dart")).unwrap();
        assert_eq!(written, "class Pet {}\n");
        assert!(dir.path().join("out/pubspec.yaml").is_file());
    }

    #[test]
    fn test_generate_into_directory() {
        let dir = tempfile::tempdir().unwrap();
        let spec_path = dir.path().join("petstore.yaml");
        fs::write(&spec_path, PETSTORE).unwrap();

        let spec = read_spec(&spec_path).unwrap();
        let mut run = RunConfig::default();
        run.package_name = "petstore_client".to_string();
        let mut sink = FsOutputSink {
            root: dir.path().join("generated"),
        };
        let files = orchestrator::run(&spec, &run, &DartDioGenerator::new(), &mut sink).unwrap();

        for file in &files {
            let on_disk = fs::read_to_string(dir.path().join("generated").join(&file.path)).unwrap();
            assert_eq!(on_disk, file.content);
        }
        assert!(dir.path().join("generated/lib/petstore_client.dart").is_file());
    }

    #[test]
    fn test_read_spec_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("spec.json");
        fs::write(
            &path,
            r#"{"openapi": "3.0.0", "info": {"title": "Json", "version": "2"}, "paths": {}}"#,
        )
        .unwrap();
        let spec = read_spec(&path).unwrap();
        assert_eq!(spec.info.title, "Json");
    }

    #[test]
    fn test_read_spec_reports_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.yaml");
        fs::write(&path, "openapi: [").unwrap();
        let err = read_spec(&path).unwrap_err();
        assert!(format!("{err}").contains("broken.yaml"));
    }

    #[test]
    fn test_inspect_summary() {
        let spec = parse::from_yaml(PETSTORE).unwrap();
        let ir = transform::resolve(&spec, &RunConfig::default()).unwrap();
        let summary = build_inspect_summary(&ir);

        assert_eq!(summary["info"]["title"], "Petstore");
        assert_eq!(summary["models"][0]["name"], "Order");
        assert_eq!(summary["models"][0]["kind"], "object");
        assert_eq!(summary["operations"][0]["name"], "addPet");
        assert_eq!(summary["operations"][0]["method"], "post");
        assert_eq!(
            summary["modules"],
            serde_json::json!(["default", "pet", "store"])
        );
        assert_eq!(summary["client"], "Openapi");
        assert_eq!(summary["security_schemes"], serde_json::json!([]));
    }

    #[test]
    fn test_inspect_summary_security() {
        let spec = parse::from_yaml(SECURITY).unwrap();
        let ir = transform::resolve(&spec, &RunConfig::default()).unwrap();
        let summary = build_inspect_summary(&ir);

        assert_eq!(summary["security_schemes"][1]["name"], "apiKey");
        assert_eq!(summary["security_schemes"][1]["kind"], "apiKey");
        assert_eq!(
            summary["operations"][0]["security"],
            serde_json::json!(["bearerToken"])
        );
    }

    #[test]
    fn test_init_refuses_to_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);

        init_config(&path, false).unwrap();
        let written = fs::read_to_string(&path).unwrap();
        let parsed: ProjectConfig = serde_yaml_ng::from_str(&written).unwrap();
        assert_eq!(parsed.package_name, "openapi");

        assert!(init_config(&path, false).is_err());
        fs::write(&path, "stale").unwrap();
        init_config(&path, true).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), written);
    }
}
