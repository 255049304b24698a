//! Run sequencing: resolve, render, hand off.
//!
//! A run either yields the complete file set or an error naming the phase
//! that failed. The output sink never sees a partial set.

use std::collections::HashSet;

use crate::config::RunConfig;
use crate::error::{GenerateError, RenderError};
use crate::parse::spec::OpenApiSpec;
use crate::{CodeGenerator, GeneratedFile, transform};

/// Destination for a finished file set.
pub trait OutputSink {
    type Error: std::error::Error + Send + Sync + 'static;

    fn write(&mut self, files: &[GeneratedFile]) -> Result<(), Self::Error>;
}

/// Resolve and render `spec`, returning the files without writing them.
pub fn generate(
    spec: &OpenApiSpec,
    config: &RunConfig,
    generator: &dyn CodeGenerator,
) -> Result<Vec<GeneratedFile>, GenerateError> {
    log::info!(
        "generating {} client `{}` from {} {}",
        generator.target().as_str(),
        config.package_name,
        spec.info.title,
        spec.info.version
    );

    let ir = transform::resolve(spec, config)?;
    let files = generator.generate(&ir, config)?;

    let mut seen = HashSet::new();
    for file in &files {
        if !seen.insert(file.path.as_str()) {
            return Err(RenderError::DuplicatePath(file.path.clone()).into());
        }
    }

    log::info!("rendered {} files", files.len());
    Ok(files)
}

/// [`generate`], then pass the complete file set to `sink`.
pub fn run<S: OutputSink>(
    spec: &OpenApiSpec,
    config: &RunConfig,
    generator: &dyn CodeGenerator,
    sink: &mut S,
) -> Result<Vec<GeneratedFile>, GenerateError> {
    let files = generate(spec, config, generator)?;
    sink.write(&files).map_err(|e| GenerateError::Output(Box::new(e)))?;
    Ok(files)
}
