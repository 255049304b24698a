use diogen_core::config::ResultRepresentation;
use diogen_core::ir::{
    IrModule, IrOperation, IrParameter, IrParameterLocation, ModelKind, ModelRef, PrimitiveType,
};
use diogen_core::{GeneratedFile, RenderError};
use minijinja::context;

use super::auth::secure_entries;
use super::{CommentStyle, Renderer, sorted_imports};
use crate::templates::OperationVariant;
use crate::type_mapper::{dart_type, doc_lines, model_file, nullable, string_literal, uses_binary};

/// Arguments every generated method accepts after its own parameters.
const CALL_ARGUMENTS: &[&str] = &[
    "CancelToken? cancelToken",
    "Map<String, dynamic>? headers",
    "Map<String, dynamic>? extra",
    "ProgressCallback? onSendProgress",
    "ProgressCallback? onReceiveProgress",
];

/// Class name of a module's API wrapper, e.g. `PetApi`.
pub fn api_class_name(module: &IrModule) -> String {
    format!("{}Api", module.name.pascal_case)
}

/// File name of a module's API wrapper, e.g. `pet_api.dart`.
pub fn api_file_name(module: &IrModule) -> String {
    format!("{}_api.dart", module.name.snake_case)
}

/// Emit `lib/src/api/<tag>_api.dart` for one module.
pub fn emit_module(r: &Renderer<'_>, module: &IrModule) -> Result<GeneratedFile, RenderError> {
    let representation = r.config.features.result_representation();
    let variant = OperationVariant::select(representation);
    let class_name = api_class_name(module);

    let mut methods = Vec::new();
    let mut imports = Vec::new();
    let mut typed_data = false;
    for op in r.ir.module_operations(module) {
        let subject = format!("{class_name}.{}", op.name);
        methods.push(r.render(variant.template(), &subject, operation_context(r, op))?);
        for model_ref in operation_types(op) {
            typed_data |= uses_binary(model_ref);
            if let Some(id) = model_ref.named_id() {
                imports.push(format!("../model/{}", model_file(id)));
            }
        }
    }

    let ctx = context! {
        header => r.header(CommentStyle::Slash),
        class_name => &class_name,
        tagged_result => representation == ResultRepresentation::TaggedResult,
        typed_data,
        imports => sorted_imports(imports),
        methods,
    };
    let content = r.render("api.dart.j2", &class_name, ctx)?;
    Ok(GeneratedFile {
        path: format!("lib/src/api/{}", api_file_name(module)),
        content,
    })
}

fn operation_types(op: &IrOperation) -> impl Iterator<Item = &ModelRef> {
    op.parameters
        .iter()
        .map(|p| &p.param_type)
        .chain(op.request_body.iter().map(|b| &b.body_type))
        .chain(op.success_type())
}

fn operation_context(r: &Renderer<'_>, op: &IrOperation) -> minijinja::Value {
    let mut doc = doc_lines(op.summary.as_deref());
    let description = doc_lines(op.description.as_deref());
    if !description.is_empty() {
        if !doc.is_empty() {
            doc.push(String::new());
        }
        doc.extend(description);
    }

    let mut args: Vec<String> = Vec::new();
    for param in op.parameters.iter().filter(|p| p.required) {
        args.push(format!("required {} {}", dart_type(&param.param_type), param.name));
    }
    if let Some(body) = op.request_body.as_ref().filter(|b| b.required) {
        args.push(format!("required {} {}", dart_type(&body.body_type), body.name));
    }
    for param in op.parameters.iter().filter(|p| !p.required) {
        args.push(format!("{} {}", nullable(&dart_type(&param.param_type)), param.name));
    }
    if let Some(body) = op.request_body.as_ref().filter(|b| !b.required) {
        args.push(format!("{} {}", nullable(&dart_type(&body.body_type)), body.name));
    }
    args.extend(CALL_ARGUMENTS.iter().map(|a| a.to_string()));

    let mut header_entries: Vec<String> = op
        .parameters_in(IrParameterLocation::Header)
        .map(|p| map_entry(r, p))
        .collect();
    if let Some(cookie) = cookie_entry(r, op) {
        header_entries.push(cookie);
    }
    let query_entries: Vec<String> = op
        .parameters_in(IrParameterLocation::Query)
        .map(|p| map_entry(r, p))
        .collect();

    let (content_type, body_expr) = match &op.request_body {
        Some(body) => {
            let encoded = body_data(r, &body.body_type, &body.name, &body.content_type);
            let expr = if body.required || encoded == body.name {
                encoded
            } else {
                format!("{} == null ? null : {encoded}", body.name)
            };
            (Some(string_literal(&body.content_type)), Some(expr))
        }
        None => (None, None),
    };

    let success = op.success_type();
    let data_type = success.map(dart_type);
    let typed_response = format!("Response<{}>", data_type.as_deref().unwrap_or("void"));

    context! {
        doc,
        name => &op.name,
        deprecated => op.deprecated,
        typed_response,
        args,
        http_method => op.method.as_upper(),
        path_expr => path_expression(r, op),
        header_entries,
        query_entries,
        secure => secure_entries(r, op),
        content_type,
        body_expr,
        bytes_response => success == Some(&ModelRef::Primitive(PrimitiveType::Binary)),
        data_type => data_type.as_deref().map(nullable),
        decode_expr => success.map(|t| r.codec.decode(t, "rawData")),
    }
}

/// A map literal entry sending `param` under its wire name. Optional
/// parameters are left out when null.
fn map_entry(r: &Renderer<'_>, param: &IrParameter) -> String {
    let key = string_literal(&param.raw_name);
    let value = r.codec.encode(&param.param_type, &param.name);
    if param.required {
        format!("{key}: {value}")
    } else {
        format!("if ({} != null) {key}: {value}", param.name)
    }
}

fn cookie_entry(r: &Renderer<'_>, op: &IrOperation) -> Option<String> {
    let parts: Vec<String> = op
        .parameters_in(IrParameterLocation::Cookie)
        .map(|p| {
            let pair = format!(
                "{} + {}.toString()",
                string_literal(&format!("{}=", p.raw_name)),
                r.codec.encode(&p.param_type, &p.name)
            );
            if p.required {
                pair
            } else {
                format!("if ({} != null) {pair}", p.name)
            }
        })
        .collect();
    if parts.is_empty() {
        return None;
    }
    Some(format!("r'Cookie': <String>[{}].join('; ')", parts.join(", ")))
}

fn body_data(r: &Renderer<'_>, body_type: &ModelRef, name: &str, content_type: &str) -> String {
    let encoded = r.codec.encode(body_type, name);
    let is_object = matches!(
        body_type,
        ModelRef::Named(id) if r.ir.model(id).is_some_and(|m| matches!(m.kind, ModelKind::Object(_)))
    );
    if content_type.starts_with("multipart/") && is_object {
        format!("FormData.fromMap({encoded})")
    } else {
        encoded
    }
}

/// Dart expression for the request path with path parameters substituted
/// and URI-encoded.
fn path_expression(r: &Renderer<'_>, op: &IrOperation) -> String {
    let mut parts: Vec<String> = Vec::new();
    let mut literal = String::new();
    let mut rest = op.path.as_str();

    while let Some(start) = rest.find('{') {
        let Some(len) = rest[start..].find('}') else {
            break;
        };
        let raw = &rest[start + 1..start + len];
        literal.push_str(&rest[..start]);
        match op
            .parameters_in(IrParameterLocation::Path)
            .find(|p| p.raw_name == raw)
        {
            Some(param) => {
                if !literal.is_empty() {
                    parts.push(string_literal(&literal));
                    literal.clear();
                }
                parts.push(format!(
                    "Uri.encodeComponent({}.toString())",
                    r.codec.encode(&param.param_type, &param.name)
                ));
            }
            None => literal.push_str(&rest[start..=start + len]),
        }
        rest = &rest[start + len + 1..];
    }
    literal.push_str(rest);
    if !literal.is_empty() || parts.is_empty() {
        parts.push(string_literal(&literal));
    }
    parts.join(" + ")
}
