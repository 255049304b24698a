/// A security scheme a generated client can apply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IrSecurityScheme {
    /// Key under `components.securitySchemes`; clients look credentials up
    /// by this name.
    pub name: String,
    pub kind: IrAuthKind,
    pub description: Option<String>,
}

/// How credentials are attached to a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IrAuthKind {
    ApiKey {
        param_name: String,
        location: IrApiKeyLocation,
    },
    /// `http` with scheme `basic`.
    Basic,
    /// `http` bearer, OAuth2 and OpenID Connect: an `Authorization: Bearer`
    /// token.
    Bearer,
}

impl IrAuthKind {
    /// Tag carried in a request's security metadata.
    pub fn as_str(&self) -> &'static str {
        match self {
            IrAuthKind::ApiKey { .. } => "apiKey",
            IrAuthKind::Basic => "basic",
            IrAuthKind::Bearer => "bearer",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IrApiKeyLocation {
    Header,
    Query,
    Cookie,
}

impl IrApiKeyLocation {
    pub fn as_str(self) -> &'static str {
        match self {
            IrApiKeyLocation::Header => "header",
            IrApiKeyLocation::Query => "query",
            IrApiKeyLocation::Cookie => "cookie",
        }
    }
}
