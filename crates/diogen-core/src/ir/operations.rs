use super::models::ModelRef;

pub use crate::parse::operation::HttpMethod;

/// A fully resolved API operation.
#[derive(Debug, Clone)]
pub struct IrOperation {
    /// Escaped method name.
    pub name: String,
    /// `operationId`, or the route-derived name when there is none.
    pub raw_name: String,
    pub method: HttpMethod,
    pub path: String,
    pub summary: Option<String>,
    pub description: Option<String>,
    pub tags: Vec<String>,
    pub parameters: Vec<IrParameter>,
    pub request_body: Option<IrRequestBody>,
    pub responses: Vec<IrResponse>,
    pub deprecated: bool,
    /// Names of the security schemes a call may authenticate with, in
    /// document order. Empty when the operation is public.
    pub security: Vec<String>,
}

impl IrOperation {
    /// The response whose body a successful call returns: the first 2xx,
    /// falling back to `default`.
    pub fn success_response(&self) -> Option<&IrResponse> {
        self.responses
            .iter()
            .find(|r| r.status.starts_with('2'))
            .or_else(|| self.responses.iter().find(|r| r.status == "default"))
    }

    pub fn success_type(&self) -> Option<&ModelRef> {
        self.success_response().and_then(|r| r.body.as_ref())
    }

    pub fn parameters_in(
        &self,
        location: IrParameterLocation,
    ) -> impl Iterator<Item = &IrParameter> {
        self.parameters
            .iter()
            .filter(move |p| p.location == location)
    }
}

/// A resolved response for one status code.
#[derive(Debug, Clone)]
pub struct IrResponse {
    /// Status code as written in the document, or `default`.
    pub status: String,
    /// Decoded body type; `None` when the response carries no content.
    pub body: Option<ModelRef>,
    pub description: Option<String>,
}

/// A resolved path/query/header parameter.
#[derive(Debug, Clone)]
pub struct IrParameter {
    /// Escaped argument name, unique within the operation.
    pub name: String,
    /// Name on the wire.
    pub raw_name: String,
    pub location: IrParameterLocation,
    pub param_type: ModelRef,
    pub required: bool,
    pub description: Option<String>,
}

/// Parameter location.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IrParameterLocation {
    Path,
    Query,
    Header,
    Cookie,
}

/// A resolved request body.
#[derive(Debug, Clone)]
pub struct IrRequestBody {
    /// Escaped argument name.
    pub name: String,
    pub body_type: ModelRef,
    pub required: bool,
    pub content_type: String,
    pub description: Option<String>,
}
