//! Security schemes and the requirements operations place on them.

use crate::error::ResolveError;
use crate::ir::{IrApiKeyLocation, IrAuthKind, IrSecurityScheme};
use crate::parse::operation::Operation;
use crate::parse::security::{ApiKeyLocation, SecurityScheme, SecuritySchemeType};
use crate::parse::spec::OpenApiSpec;

/// The declared schemes a client can apply. Mutual TLS and unknown HTTP
/// schemes are left out with a warning.
pub(crate) fn resolve_schemes(spec: &OpenApiSpec) -> Vec<IrSecurityScheme> {
    let Some(components) = &spec.components else {
        return Vec::new();
    };
    components
        .security_schemes
        .iter()
        .filter_map(|(name, scheme)| match scheme_kind(scheme) {
            Some(kind) => Some(IrSecurityScheme {
                name: name.clone(),
                kind,
                description: scheme.description.clone(),
            }),
            None => {
                log::warn!("security scheme `{name}` is not supported and will be skipped");
                None
            }
        })
        .collect()
}

fn scheme_kind(scheme: &SecurityScheme) -> Option<IrAuthKind> {
    match scheme.scheme_type {
        SecuritySchemeType::ApiKey => {
            let location = match scheme.location? {
                ApiKeyLocation::Header => IrApiKeyLocation::Header,
                ApiKeyLocation::Query => IrApiKeyLocation::Query,
                ApiKeyLocation::Cookie => IrApiKeyLocation::Cookie,
            };
            Some(IrAuthKind::ApiKey {
                param_name: scheme.name.clone()?,
                location,
            })
        }
        SecuritySchemeType::Http => match scheme.http_scheme()?.as_str() {
            "basic" => Some(IrAuthKind::Basic),
            "bearer" => Some(IrAuthKind::Bearer),
            _ => None,
        },
        SecuritySchemeType::OAuth2 | SecuritySchemeType::OpenIdConnect => Some(IrAuthKind::Bearer),
        SecuritySchemeType::MutualTls => None,
    }
}

/// Names of the supported schemes `op` may authenticate with. The
/// operation's own list wins over the document's; an empty list makes the
/// operation public.
pub(crate) fn operation_security(
    spec: &OpenApiSpec,
    op: &Operation,
    pointer: &str,
    supported: &[IrSecurityScheme],
) -> Result<Vec<String>, ResolveError> {
    let (requirements, location) = match &op.security {
        Some(own) => (own.as_slice(), format!("{pointer}/security")),
        None => (
            spec.security.as_deref().unwrap_or_default(),
            "#/security".to_string(),
        ),
    };
    let declared = spec.components.as_ref().map(|c| &c.security_schemes);

    let mut names: Vec<String> = Vec::new();
    for name in requirements.iter().flat_map(|r| r.keys()) {
        if !declared.is_some_and(|d| d.contains_key(name)) {
            return Err(ResolveError::UnresolvedReference {
                reference: format!("#/components/securitySchemes/{name}"),
                location,
            });
        }
        if supported.iter().any(|s| &s.name == name) && !names.contains(name) {
            names.push(name.clone());
        }
    }
    Ok(names)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse;

    const DOC: &str = r#"
openapi: 3.0.3
info: {title: t, version: '1'}
security:
  - token: []
paths: {}
components:
  securitySchemes:
    key: {type: apiKey, name: X-Key, in: query}
    token: {type: http, scheme: bearer}
    digest: {type: http, scheme: digest}
    oauth: {type: oauth2, flows: {}}
"#;

    fn operation(yaml: &str) -> Operation {
        serde_yaml_ng::from_str(yaml).unwrap()
    }

    #[test]
    fn unsupported_schemes_are_skipped() {
        let spec = parse::from_yaml(DOC).unwrap();
        let schemes = resolve_schemes(&spec);
        let names: Vec<&str> = schemes.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, ["key", "token", "oauth"]);
        assert_eq!(
            schemes[0].kind,
            IrAuthKind::ApiKey {
                param_name: "X-Key".into(),
                location: IrApiKeyLocation::Query
            }
        );
        assert_eq!(schemes[2].kind, IrAuthKind::Bearer);
    }

    #[test]
    fn operation_list_overrides_document_list() {
        let spec = parse::from_yaml(DOC).unwrap();
        let schemes = resolve_schemes(&spec);

        let inherited = operation("responses: {}");
        assert_eq!(
            operation_security(&spec, &inherited, "#/paths/~1a/get", &schemes).unwrap(),
            ["token"]
        );

        let public = operation("security: []\nresponses: {}");
        assert!(operation_security(&spec, &public, "#/paths/~1a/get", &schemes)
            .unwrap()
            .is_empty());

        let own = operation("security:\n  - key: []\n    digest: []\n  - key: []\nresponses: {}");
        assert_eq!(
            operation_security(&spec, &own, "#/paths/~1a/get", &schemes).unwrap(),
            ["key"]
        );
    }

    #[test]
    fn undeclared_scheme_is_an_unresolved_reference() {
        let spec = parse::from_yaml(DOC).unwrap();
        let op = operation("security:\n  - missing: []\nresponses: {}");
        let err = operation_security(&spec, &op, "#/paths/~1a/get", &[]).unwrap_err();
        assert!(matches!(
            err,
            ResolveError::UnresolvedReference { reference, location }
                if reference == "#/components/securitySchemes/missing"
                    && location == "#/paths/~1a/get/security"
        ));
    }
}
