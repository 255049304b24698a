use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// A security scheme type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SecuritySchemeType {
    ApiKey,
    Http,
    OAuth2,
    OpenIdConnect,
    #[serde(rename = "mutualTLS")]
    MutualTls,
}

/// Where an API key travels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApiKeyLocation {
    Query,
    Header,
    Cookie,
}

/// A security scheme definition under `components.securitySchemes`.
///
/// OAuth2 flow details are not modelled; a generated client only ever
/// attaches the resulting access token.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SecurityScheme {
    #[serde(rename = "type")]
    pub scheme_type: SecuritySchemeType,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Header, query or cookie name of an `apiKey` scheme.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(rename = "in", skip_serializing_if = "Option::is_none")]
    pub location: Option<ApiKeyLocation>,

    /// HTTP authorization scheme of an `http` scheme, e.g. `basic`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scheme: Option<String>,

    #[serde(rename = "bearerFormat", skip_serializing_if = "Option::is_none")]
    pub bearer_format: Option<String>,
}

impl SecurityScheme {
    /// The `http` authorization scheme, lowercased.
    pub fn http_scheme(&self) -> Option<String> {
        self.scheme.as_deref().map(str::to_ascii_lowercase)
    }
}

/// One alternative of a `security` list: scheme name to required scopes.
/// Every scheme of one requirement applies together.
pub type SecurityRequirement = IndexMap<String, Vec<String>>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_api_key_scheme() {
        let scheme: SecurityScheme =
            serde_json::from_str(r#"{"type":"apiKey","name":"X-API-Key","in":"header"}"#).unwrap();
        assert_eq!(scheme.scheme_type, SecuritySchemeType::ApiKey);
        assert_eq!(scheme.name.as_deref(), Some("X-API-Key"));
        assert_eq!(scheme.location, Some(ApiKeyLocation::Header));
    }

    #[test]
    fn http_scheme_is_case_insensitive() {
        let scheme: SecurityScheme =
            serde_json::from_str(r#"{"type":"http","scheme":"Bearer","bearerFormat":"JWT"}"#)
                .unwrap();
        assert_eq!(scheme.http_scheme().as_deref(), Some("bearer"));
    }

    #[test]
    fn ignores_oauth_flows() {
        let scheme: SecurityScheme = serde_json::from_str(
            r#"{"type":"oauth2","flows":{"implicit":{"authorizationUrl":"https://a","scopes":{}}}}"#,
        )
        .unwrap();
        assert_eq!(scheme.scheme_type, SecuritySchemeType::OAuth2);
    }

    #[test]
    fn parses_mutual_tls() {
        let scheme: SecurityScheme = serde_json::from_str(r#"{"type":"mutualTLS"}"#).unwrap();
        assert_eq!(scheme.scheme_type, SecuritySchemeType::MutualTls);
    }
}
