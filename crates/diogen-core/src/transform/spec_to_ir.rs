use std::collections::BTreeMap;

use heck::ToPascalCase;

use crate::config::{NamingConfig, NamingStrategy};
use crate::error::ResolveError;
use crate::ir::*;
use crate::naming::{NameRole, NameScope};
use crate::parse::media_type::{MediaType, preferred_media_type};
use crate::parse::operation::Operation;
use crate::parse::parameter::{Parameter, ParameterLocation, ParameterOrRef};
use crate::parse::request_body::RequestBodyOrRef;
use crate::parse::response::ResponseOrRef;
use crate::parse::spec::OpenApiSpec;

use super::name_normalizer::{normalize_name, route_to_name};
use super::promote_inline::{InlineContext, escape_pointer};
use super::schema_resolver::{OBJECT_MEMBERS, SchemaResolver};
use super::security;

/// Argument names the generated client methods add to every call.
pub(crate) const CALL_ARGUMENTS: &[&str] = &[
    "cancelToken",
    "headers",
    "extra",
    "onSendProgress",
    "onReceiveProgress",
];

impl<'a> SchemaResolver<'a> {
    pub(crate) fn resolve_operations(
        &mut self,
        spec: &'a OpenApiSpec,
        naming: &NamingConfig,
        schemes: &[IrSecurityScheme],
    ) -> Result<Vec<IrOperation>, ResolveError> {
        let mut scope = NameScope::with_reserved(OBJECT_MEMBERS);
        let mut operations = Vec::new();
        for (path, item) in &spec.paths {
            let path_params = self.lookup_parameters(&item.parameters)?;
            for (method, op) in item.operations() {
                let pointer = format!("#/paths/{}/{}", escape_pointer(path), method.as_str());
                let ir_op = IrOperation {
                    security: security::operation_security(spec, op, &pointer, schemes)?,
                    ..self.build_operation(method, path, op, &path_params, naming, &mut scope)?
                };
                log::debug!(
                    "resolved operation {} {} {} as {}",
                    method.as_upper(),
                    path,
                    ir_op.raw_name,
                    ir_op.name
                );
                operations.push(ir_op);
            }
        }
        Ok(operations)
    }

    fn lookup_parameters(
        &self,
        params: &'a [ParameterOrRef],
    ) -> Result<Vec<&'a Parameter>, ResolveError> {
        params
            .iter()
            .map(|p| match p {
                ParameterOrRef::Parameter(param) => Ok(param),
                ParameterOrRef::Ref { ref_path } => self.index.parameter(ref_path),
            })
            .collect()
    }

    fn build_operation(
        &mut self,
        method: HttpMethod,
        path: &str,
        op: &'a Operation,
        path_params: &[&'a Parameter],
        naming: &NamingConfig,
        scope: &mut NameScope,
    ) -> Result<IrOperation, ResolveError> {
        let derived = match naming.strategy {
            NamingStrategy::UseOperationId => op
                .operation_id
                .clone()
                .unwrap_or_else(|| route_to_name(method, path)),
            NamingStrategy::UseRouteBased => route_to_name(method, path),
        };
        let raw_name = naming.aliases.get(&derived).cloned().unwrap_or(derived);
        let name = scope.fresh(&self.policy.escape(&raw_name, NameRole::Operation))?;

        let ctx = InlineContext::new(
            format!("#/paths/{}/{}", escape_pointer(path), method.as_str()),
            name.to_pascal_case(),
        );

        // Operation-level parameters replace path-level ones with the same
        // name and location.
        let mut merged: Vec<&Parameter> = path_params.to_vec();
        for param in self.lookup_parameters(&op.parameters)? {
            match merged
                .iter_mut()
                .find(|p| p.name == param.name && p.location == param.location)
            {
                Some(slot) => *slot = param,
                None => merged.push(param),
            }
        }

        let mut arguments = NameScope::with_reserved(CALL_ARGUMENTS);
        let mut parameters = Vec::with_capacity(merged.len());
        for param in merged {
            let param_ctx = InlineContext::new(
                format!(
                    "{}/parameters/{}/{}",
                    ctx.path,
                    location_str(param.location),
                    escape_pointer(&param.name)
                ),
                format!("{}{}Parameter", ctx.name, param.name.to_pascal_case()),
            );
            let param_type = match &param.schema {
                Some(schema) => self.type_ref(schema, &param_ctx)?,
                None => ModelRef::Primitive(PrimitiveType::String),
            };
            let escaped = self.policy.escape(&param.name, NameRole::Field);
            parameters.push(IrParameter {
                name: arguments.fresh(&escaped)?,
                raw_name: param.name.clone(),
                location: match param.location {
                    ParameterLocation::Path => IrParameterLocation::Path,
                    ParameterLocation::Query => IrParameterLocation::Query,
                    ParameterLocation::Header => IrParameterLocation::Header,
                    ParameterLocation::Cookie => IrParameterLocation::Cookie,
                },
                param_type,
                required: param.required || param.location == ParameterLocation::Path,
                description: param.description.clone(),
            });
        }

        let request_body = match &op.request_body {
            Some(body) => self.build_request_body(body, &ctx, &mut arguments)?,
            None => None,
        };

        let mut responses = Vec::with_capacity(op.responses.len());
        for (status, response) in &op.responses {
            let response = match response {
                ResponseOrRef::Response(r) => r,
                ResponseOrRef::Ref { ref_path } => self.index.response(ref_path)?,
            };
            let response_ctx = InlineContext::new(
                format!("{}/responses/{}", ctx.path, escape_pointer(status)),
                format!("{}{}Response", ctx.name, status.to_pascal_case()),
            );
            let body = self.content_type_ref(&response.content, &response_ctx)?;
            responses.push(IrResponse {
                status: status.clone(),
                body: body.map(|(_, body)| body),
                description: Some(response.description.clone()).filter(|d| !d.is_empty()),
            });
        }

        Ok(IrOperation {
            name,
            raw_name,
            method,
            path: path.to_string(),
            summary: op.summary.clone(),
            description: op.description.clone(),
            tags: op.tags.clone(),
            parameters,
            request_body,
            responses,
            deprecated: op.deprecated.unwrap_or(false),
            security: Vec::new(),
        })
    }

    fn build_request_body(
        &mut self,
        body: &'a RequestBodyOrRef,
        ctx: &InlineContext,
        arguments: &mut NameScope,
    ) -> Result<Option<IrRequestBody>, ResolveError> {
        let body = match body {
            RequestBodyOrRef::RequestBody(b) => b,
            RequestBodyOrRef::Ref { ref_path } => self.index.request_body(ref_path)?,
        };
        let body_ctx = InlineContext::new(
            format!("{}/requestBody", ctx.path),
            format!("{}Request", ctx.name),
        );
        let Some((content_type, body_type)) = self.content_type_ref(&body.content, &body_ctx)?
        else {
            return Ok(None);
        };
        Ok(Some(IrRequestBody {
            name: arguments.fresh("body")?,
            body_type,
            required: body.required,
            content_type,
            description: body.description.clone(),
        }))
    }

    /// Type of the preferred media type's schema. Content without a schema
    /// is untyped; no content at all means no body.
    fn content_type_ref(
        &mut self,
        content: &indexmap::IndexMap<String, MediaType>,
        ctx: &InlineContext,
    ) -> Result<Option<(String, ModelRef)>, ResolveError> {
        let Some((content_type, media)) = preferred_media_type(content) else {
            return Ok(None);
        };
        let body_type = match &media.schema {
            Some(schema) => self.type_ref(schema, ctx)?,
            None => ModelRef::any(),
        };
        Ok(Some((content_type.clone(), body_type)))
    }
}

fn location_str(location: ParameterLocation) -> &'static str {
    match location {
        ParameterLocation::Query => "query",
        ParameterLocation::Header => "header",
        ParameterLocation::Path => "path",
        ParameterLocation::Cookie => "cookie",
    }
}

/// Group operations by tag, untagged ones under `default`. Modules come out
/// sorted by tag. Module names are only ever used with a suffix (`PetApi`,
/// `pet_api.dart`), so they need disambiguation but no reserved-word escape.
pub(crate) fn group_into_modules(
    operations: &[IrOperation],
) -> Result<Vec<IrModule>, ResolveError> {
    let mut tag_groups: BTreeMap<&str, Vec<usize>> = BTreeMap::new();

    for (i, op) in operations.iter().enumerate() {
        if op.tags.is_empty() {
            tag_groups.entry("default").or_default().push(i);
        } else {
            for tag in &op.tags {
                let ops = tag_groups.entry(tag.as_str()).or_default();
                if !ops.contains(&i) {
                    ops.push(i);
                }
            }
        }
    }

    let mut scope = NameScope::new();
    tag_groups
        .into_iter()
        .map(|(tag, ops)| {
            let ident = scope.claim(tag, &normalize_name(tag).pascal_case)?;
            Ok(IrModule {
                tag: tag.to_string(),
                name: NormalizedName {
                    original: tag.to_string(),
                    ..normalize_name(&ident)
                },
                operations: ops,
            })
        })
        .collect()
}
