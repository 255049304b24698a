use diogen_core::ir::{IrAuthKind, IrOperation, IrSpec};
use diogen_core::{GeneratedFile, RenderError};
use minijinja::context;
use serde::Serialize;

use super::{CommentStyle, Renderer};
use crate::type_mapper::string_literal;

/// One credential interceptor of the generated client.
#[derive(Debug, Clone, Copy, Serialize)]
pub(crate) struct Interceptor {
    class_name: &'static str,
    file: &'static str,
    #[serde(skip)]
    template: &'static str,
    /// Client method storing credentials for a scheme.
    setter: &'static str,
    params: &'static str,
    /// Interceptor field the setter writes to, and the value it stores.
    store: &'static str,
    value: &'static str,
    describes: &'static str,
}

const API_KEY: Interceptor = Interceptor {
    class_name: "ApiKeyAuthInterceptor",
    file: "api_key_auth.dart",
    template: "api_key_auth.dart.j2",
    setter: "setApiKey",
    params: "String apiKey",
    store: "apiKeys",
    value: "apiKey",
    describes: "API key",
};

const BASIC: Interceptor = Interceptor {
    class_name: "BasicAuthInterceptor",
    file: "basic_auth.dart",
    template: "basic_auth.dart.j2",
    setter: "setBasicAuth",
    params: "String username, String password",
    store: "authInfo",
    value: "BasicAuthInfo(username, password)",
    describes: "HTTP basic",
};

const BEARER: Interceptor = Interceptor {
    class_name: "BearerAuthInterceptor",
    file: "bearer_auth.dart",
    template: "bearer_auth.dart.j2",
    setter: "setBearerAuth",
    params: "String token",
    store: "tokens",
    value: "token",
    describes: "bearer token",
};

const BASE_FILE: &str = "auth.dart";

/// The interceptors the declared schemes need, in a fixed order.
pub(crate) fn interceptors(ir: &IrSpec) -> Vec<Interceptor> {
    let has = |want: fn(&IrAuthKind) -> bool| ir.security_schemes.iter().any(|s| want(&s.kind));
    let mut out = Vec::new();
    if has(|k| matches!(k, IrAuthKind::ApiKey { .. })) {
        out.push(API_KEY);
    }
    if has(|k| matches!(k, IrAuthKind::Basic)) {
        out.push(BASIC);
    }
    if has(|k| matches!(k, IrAuthKind::Bearer)) {
        out.push(BEARER);
    }
    out
}

/// Files under `lib/src/auth/` the library exports.
pub(crate) fn auth_files(ir: &IrSpec) -> Vec<&'static str> {
    let interceptors = interceptors(ir);
    if interceptors.is_empty() {
        return Vec::new();
    }
    std::iter::once(BASE_FILE)
        .chain(interceptors.iter().map(|i| i.file))
        .collect()
}

/// Emit `lib/src/auth/*` when the document declares usable schemes.
pub fn emit_auth(r: &Renderer<'_>) -> Result<Vec<GeneratedFile>, RenderError> {
    let interceptors = interceptors(r.ir);
    if interceptors.is_empty() {
        return Ok(Vec::new());
    }
    let header = r.header(CommentStyle::Slash);
    let mut files = vec![GeneratedFile {
        path: format!("lib/src/auth/{BASE_FILE}"),
        content: r.render("auth.dart.j2", BASE_FILE, context! { header => &header })?,
    }];
    for interceptor in interceptors {
        files.push(GeneratedFile {
            path: format!("lib/src/auth/{}", interceptor.file),
            content: r.render(
                interceptor.template,
                interceptor.class_name,
                context! { header => &header },
            )?,
        });
    }
    Ok(files)
}

/// Entries of the `extra['secure']` list an operation's request carries,
/// one map literal body per accepted scheme.
pub(crate) fn secure_entries(r: &Renderer<'_>, op: &IrOperation) -> Vec<Vec<String>> {
    op.security
        .iter()
        .filter_map(|name| r.ir.security_scheme(name))
        .map(|scheme| {
            let entry = |key: &str, value: &str| {
                format!("{}: {}", string_literal(key), string_literal(value))
            };
            let mut entries = vec![
                entry("type", scheme.kind.as_str()),
                entry("name", &scheme.name),
            ];
            if let IrAuthKind::ApiKey {
                param_name,
                location,
            } = &scheme.kind
            {
                entries.push(entry("keyName", param_name));
                entries.push(entry("where", location.as_str()));
            }
            entries
        })
        .collect()
}
