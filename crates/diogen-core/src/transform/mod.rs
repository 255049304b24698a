//! Schema resolution: turns a parsed document into the [`IrSpec`].
//!
//! Phases, in order: reference check, component id claiming, component
//! resolution (with inline promotion), security schemes, operation
//! resolution, module grouping, client naming, union reconciliation,
//! closure check.

pub mod name_normalizer;
pub(crate) mod promote_inline;
pub(crate) mod schema_resolver;
pub(crate) mod security;
pub(crate) mod spec_to_ir;
pub(crate) mod union;

use crate::config::RunConfig;
use crate::error::ResolveError;
use crate::ir::{IrInfo, IrServer, IrSpec, ModelRef};
use crate::naming::{NameRole, NamingPolicy, ReservedWords};
use crate::parse::spec::OpenApiSpec;

use schema_resolver::SchemaResolver;

/// Resolve a document with the embedded Dart reserved-word table.
pub fn resolve(spec: &OpenApiSpec, config: &RunConfig) -> Result<IrSpec, ResolveError> {
    let policy = NamingPolicy::new(ReservedWords::dart()?);
    resolve_with(spec, config, &policy)
}

/// Resolve a document with an explicit naming policy.
pub fn resolve_with(
    spec: &OpenApiSpec,
    config: &RunConfig,
    policy: &NamingPolicy,
) -> Result<IrSpec, ResolveError> {
    let mut resolver = SchemaResolver::new(spec, policy);
    resolver.index.check(spec)?;

    resolver.claim_components(spec)?;
    resolver.resolve_components(spec)?;
    let security_schemes = security::resolve_schemes(spec);
    let operations = resolver.resolve_operations(spec, &config.naming, &security_schemes)?;
    let modules = spec_to_ir::group_into_modules(&operations)?;

    // The root client shares the library namespace with every model.
    let client_name = resolver
        .model_scope
        .fresh(&policy.escape(&config.package_name, NameRole::Model))?;

    let mut models = resolver.into_models();
    union::reconcile_unions(&mut models, policy)?;

    let ir = IrSpec {
        info: IrInfo {
            title: spec.info.title.clone(),
            description: spec.info.description.clone(),
            version: spec.info.version.clone(),
        },
        servers: spec
            .servers
            .iter()
            .map(|s| IrServer {
                url: s.url.clone(),
                description: s.description.clone(),
            })
            .collect(),
        models,
        operations,
        modules,
        security_schemes,
        client_name,
    };
    check_closure(&ir)?;

    log::info!(
        "resolved {} models, {} operations in {} modules, client {}",
        ir.models.len(),
        ir.operations.len(),
        ir.modules.len(),
        ir.client_name
    );
    Ok(ir)
}

/// Every named reference in the IR must land on a model in the arena.
fn check_closure(ir: &IrSpec) -> Result<(), ResolveError> {
    let missing = |reference: &str, location: String| ResolveError::UnresolvedReference {
        reference: reference.to_string(),
        location,
    };

    for model in ir.models.values() {
        for id in model.references() {
            if !ir.models.contains_key(id) {
                return Err(missing(id, format!("model {}", model.id)));
            }
        }
    }

    for op in &ir.operations {
        let mut refs: Vec<&ModelRef> = op.parameters.iter().map(|p| &p.param_type).collect();
        refs.extend(op.request_body.as_ref().map(|b| &b.body_type));
        refs.extend(op.responses.iter().filter_map(|r| r.body.as_ref()));
        for r in refs {
            if let Some(id) = r.named_id() {
                if !ir.models.contains_key(id) {
                    return Err(missing(id, format!("operation {}", op.name)));
                }
            }
        }
    }
    Ok(())
}
