use std::fmt;

use indexmap::IndexMap;

use super::models::Model;
use super::operations::IrOperation;
use super::security::IrSecurityScheme;

/// A fully resolved, generator-ready intermediate representation of an
/// OpenAPI spec. Built once per run and only borrowed afterwards.
#[derive(Debug, Clone)]
pub struct IrSpec {
    pub info: IrInfo,
    pub servers: Vec<IrServer>,
    /// Model arena keyed by escaped id. Component models come first in
    /// document order, followed by promoted inline models in the order they
    /// were discovered.
    pub models: IndexMap<String, Model>,
    pub operations: Vec<IrOperation>,
    pub modules: Vec<IrModule>,
    /// Security schemes the client supports, in document order.
    pub security_schemes: Vec<IrSecurityScheme>,
    /// Class name of the root client, unique among the model ids.
    pub client_name: String,
}

impl IrSpec {
    pub fn model(&self, id: &str) -> Option<&Model> {
        self.models.get(id)
    }

    pub fn security_scheme(&self, name: &str) -> Option<&IrSecurityScheme> {
        self.security_schemes.iter().find(|s| s.name == name)
    }

    pub fn module_operations<'a>(
        &'a self,
        module: &'a IrModule,
    ) -> impl Iterator<Item = &'a IrOperation> + 'a {
        module
            .operations
            .iter()
            .filter_map(|&i| self.operations.get(i))
    }
}

/// API metadata.
#[derive(Debug, Clone)]
pub struct IrInfo {
    pub title: String,
    pub description: Option<String>,
    pub version: String,
}

/// A server URL.
#[derive(Debug, Clone)]
pub struct IrServer {
    pub url: String,
    pub description: Option<String>,
}

/// Operations sharing a tag.
#[derive(Debug, Clone)]
pub struct IrModule {
    pub tag: String,
    pub name: NormalizedName,
    pub operations: Vec<usize>, // indices into IrSpec.operations
}

/// A name with multiple casing variants pre-computed.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NormalizedName {
    pub original: String,
    pub pascal_case: String,
    pub camel_case: String,
    pub snake_case: String,
    pub screaming_snake: String,
}

impl fmt::Display for NormalizedName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.original)
    }
}
