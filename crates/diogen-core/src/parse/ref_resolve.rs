use std::borrow::Cow;
use std::collections::HashSet;

use indexmap::IndexMap;

use super::components::Components;
use super::media_type::MediaType;
use super::operation::{Operation, PathItem};
use super::parameter::{Parameter, ParameterOrRef};
use super::request_body::{RequestBody, RequestBodyOrRef};
use super::response::{Response, ResponseOrRef};
use super::schema::{AdditionalProperties, Schema, SchemaOrRef};
use super::spec::OpenApiSpec;
use crate::error::ResolveError;

/// Index over `#/components/*` that answers `$ref` lookups without
/// inlining anything. Named schemas stay named so the resolver can keep
/// identity and handle recursive types.
pub struct RefIndex<'a> {
    components: Option<&'a Components>,
}

impl<'a> RefIndex<'a> {
    pub fn new(spec: &'a OpenApiSpec) -> Self {
        Self {
            components: spec.components.as_ref(),
        }
    }

    /// Walk every `$ref` in the document and fail on the first one that
    /// does not point at an existing component.
    pub fn check(&self, spec: &OpenApiSpec) -> Result<(), ResolveError> {
        for (path, item) in &spec.paths {
            let loc = format!("#/paths/{}", escape_pointer(path));
            self.check_path_item(item, &loc)?;
        }
        if let Some(components) = self.components {
            for (name, schema) in &components.schemas {
                let loc = format!("#/components/schemas/{}", escape_pointer(name));
                self.check_schema_or_ref(schema, &loc)?;
            }
            for (name, param) in &components.parameters {
                let loc = format!("#/components/parameters/{}", escape_pointer(name));
                self.check_parameter_or_ref(param, &loc)?;
            }
            for (name, body) in &components.request_bodies {
                let loc = format!("#/components/requestBodies/{}", escape_pointer(name));
                self.check_request_body_or_ref(body, &loc)?;
            }
            for (name, resp) in &components.responses {
                let loc = format!("#/components/responses/{}", escape_pointer(name));
                self.check_response_or_ref(resp, &loc)?;
            }
        }
        Ok(())
    }

    fn check_path_item(&self, item: &PathItem, loc: &str) -> Result<(), ResolveError> {
        for (i, p) in item.parameters.iter().enumerate() {
            self.check_parameter_or_ref(p, &format!("{loc}/parameters/{i}"))?;
        }
        for (method, op) in item.operations() {
            self.check_operation(op, &format!("{loc}/{method}"))?;
        }
        Ok(())
    }

    fn check_operation(&self, op: &Operation, loc: &str) -> Result<(), ResolveError> {
        for (i, p) in op.parameters.iter().enumerate() {
            self.check_parameter_or_ref(p, &format!("{loc}/parameters/{i}"))?;
        }
        if let Some(body) = &op.request_body {
            self.check_request_body_or_ref(body, &format!("{loc}/requestBody"))?;
        }
        for (status, resp) in &op.responses {
            self.check_response_or_ref(resp, &format!("{loc}/responses/{status}"))?;
        }
        Ok(())
    }

    fn check_parameter_or_ref(
        &self,
        param: &ParameterOrRef,
        loc: &str,
    ) -> Result<(), ResolveError> {
        match param {
            ParameterOrRef::Ref { ref_path } => {
                self.parameter(ref_path).map(|_| ()).map_err(|e| at(e, loc))
            }
            ParameterOrRef::Parameter(p) => match &p.schema {
                Some(s) => self.check_schema_or_ref(s, &format!("{loc}/schema")),
                None => Ok(()),
            },
        }
    }

    fn check_request_body_or_ref(
        &self,
        body: &RequestBodyOrRef,
        loc: &str,
    ) -> Result<(), ResolveError> {
        match body {
            RequestBodyOrRef::Ref { ref_path } => {
                self.request_body(ref_path).map(|_| ()).map_err(|e| at(e, loc))
            }
            RequestBodyOrRef::RequestBody(b) => self.check_content(&b.content, loc),
        }
    }

    fn check_response_or_ref(&self, resp: &ResponseOrRef, loc: &str) -> Result<(), ResolveError> {
        match resp {
            ResponseOrRef::Ref { ref_path } => {
                self.response(ref_path).map(|_| ()).map_err(|e| at(e, loc))
            }
            ResponseOrRef::Response(r) => self.check_content(&r.content, loc),
        }
    }

    fn check_content(
        &self,
        content: &IndexMap<String, MediaType>,
        loc: &str,
    ) -> Result<(), ResolveError> {
        for (media, mt) in content {
            if let Some(s) = &mt.schema {
                let loc = format!("{loc}/content/{}/schema", escape_pointer(media));
                self.check_schema_or_ref(s, &loc)?;
            }
        }
        Ok(())
    }

    fn check_schema_or_ref(&self, schema: &SchemaOrRef, loc: &str) -> Result<(), ResolveError> {
        match schema {
            SchemaOrRef::Ref { ref_path } => {
                self.schema(ref_path).map(|_| ()).map_err(|e| at(e, loc))
            }
            SchemaOrRef::Schema(s) => self.check_schema(s, loc),
        }
    }

    fn check_schema(&self, schema: &Schema, loc: &str) -> Result<(), ResolveError> {
        for (name, prop) in &schema.properties {
            let loc = format!("{loc}/properties/{}", escape_pointer(name));
            self.check_schema_or_ref(prop, &loc)?;
        }
        if let Some(items) = &schema.items {
            self.check_schema_or_ref(items, &format!("{loc}/items"))?;
        }
        if let Some(AdditionalProperties::Schema(extra)) = &schema.additional_properties {
            self.check_schema_or_ref(extra, &format!("{loc}/additionalProperties"))?;
        }
        let groups = [
            ("allOf", &schema.all_of),
            ("oneOf", &schema.one_of),
            ("anyOf", &schema.any_of),
        ];
        for (keyword, branches) in groups {
            for (i, branch) in branches.iter().enumerate() {
                self.check_schema_or_ref(branch, &format!("{loc}/{keyword}/{i}"))?;
            }
        }
        Ok(())
    }

    /// Follow a schema reference, through any pure-ref components, to the
    /// component that actually carries a schema. Returns that component's
    /// name with the schema.
    pub fn schema(&self, ref_path: &str) -> Result<(&'a str, &'a Schema), ResolveError> {
        let mut seen = HashSet::new();
        let mut current = ref_path.to_string();
        loop {
            if !seen.insert(current.clone()) {
                return Err(ResolveError::CircularRef(current));
            }
            let name = parse_ref_name(&current, "schemas")?;
            let (key, target) = self
                .components
                .and_then(|c| c.schemas.get_key_value(name.as_ref()))
                .ok_or_else(|| dangling(&current))?;
            match target {
                SchemaOrRef::Schema(schema) => return Ok((key.as_str(), schema)),
                SchemaOrRef::Ref { ref_path } => current = ref_path.clone(),
            }
        }
    }

    pub fn parameter(&self, ref_path: &str) -> Result<&'a Parameter, ResolveError> {
        let mut seen = HashSet::new();
        let mut current = ref_path.to_string();
        loop {
            if !seen.insert(current.clone()) {
                return Err(ResolveError::CircularRef(current));
            }
            let name = parse_ref_name(&current, "parameters")?;
            match self
                .components
                .and_then(|c| c.parameters.get(name.as_ref()))
                .ok_or_else(|| dangling(&current))?
            {
                ParameterOrRef::Parameter(p) => return Ok(p),
                ParameterOrRef::Ref { ref_path } => current = ref_path.clone(),
            }
        }
    }

    pub fn request_body(&self, ref_path: &str) -> Result<&'a RequestBody, ResolveError> {
        let mut seen = HashSet::new();
        let mut current = ref_path.to_string();
        loop {
            if !seen.insert(current.clone()) {
                return Err(ResolveError::CircularRef(current));
            }
            let name = parse_ref_name(&current, "requestBodies")?;
            match self
                .components
                .and_then(|c| c.request_bodies.get(name.as_ref()))
                .ok_or_else(|| dangling(&current))?
            {
                RequestBodyOrRef::RequestBody(b) => return Ok(b),
                RequestBodyOrRef::Ref { ref_path } => current = ref_path.clone(),
            }
        }
    }

    pub fn response(&self, ref_path: &str) -> Result<&'a Response, ResolveError> {
        let mut seen = HashSet::new();
        let mut current = ref_path.to_string();
        loop {
            if !seen.insert(current.clone()) {
                return Err(ResolveError::CircularRef(current));
            }
            let name = parse_ref_name(&current, "responses")?;
            match self
                .components
                .and_then(|c| c.responses.get(name.as_ref()))
                .ok_or_else(|| dangling(&current))?
            {
                ResponseOrRef::Response(r) => return Ok(r),
                ResponseOrRef::Ref { ref_path } => current = ref_path.clone(),
            }
        }
    }
}

fn dangling(ref_path: &str) -> ResolveError {
    ResolveError::UnresolvedReference {
        reference: ref_path.to_string(),
        location: String::new(),
    }
}

/// Attach the document location to a dangling-reference error raised by a
/// lookup that did not know where it was called from.
fn at(err: ResolveError, loc: &str) -> ResolveError {
    match err {
        ResolveError::UnresolvedReference {
            reference,
            location,
        } if location.is_empty() => ResolveError::UnresolvedReference {
            reference,
            location: loc.to_string(),
        },
        other => other,
    }
}

/// Parse a `$ref` like `#/components/schemas/Foo` into the component name,
/// undoing JSON-pointer escapes (`~1` is `/`, `~0` is `~`).
pub fn parse_ref_name<'r>(
    ref_path: &'r str,
    expected_section: &str,
) -> Result<Cow<'r, str>, ResolveError> {
    let stripped = ref_path
        .strip_prefix("#/components/")
        .ok_or_else(|| ResolveError::InvalidRefFormat(ref_path.to_string()))?;
    let (section, name) = stripped
        .split_once('/')
        .ok_or_else(|| ResolveError::InvalidRefFormat(ref_path.to_string()))?;
    if section != expected_section {
        return Err(ResolveError::InvalidRefFormat(format!(
            "expected section '{}', got '{}' in {}",
            expected_section, section, ref_path
        )));
    }
    if name.is_empty() || name.contains('/') {
        return Err(ResolveError::InvalidRefFormat(ref_path.to_string()));
    }
    if name.contains('~') {
        Ok(Cow::Owned(name.replace("~1", "/").replace("~0", "~")))
    } else {
        Ok(Cow::Borrowed(name))
    }
}

fn escape_pointer(segment: &str) -> String {
    segment.replace('~', "~0").replace('/', "~1")
}
