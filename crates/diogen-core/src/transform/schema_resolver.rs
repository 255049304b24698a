use std::collections::{HashMap, HashSet};

use indexmap::IndexMap;

use crate::error::ResolveError;
use crate::ir::{
    EnumModel, EnumValue, Field, Model, ModelKind, ModelOrigin, ModelRef, ObjectModel,
    PrimitiveType,
};
use crate::naming::{NameRole, NameScope, NamingPolicy};
use crate::parse::ref_resolve::RefIndex;
use crate::parse::schema::{AdditionalProperties, Schema, SchemaOrRef, SchemaType};
use crate::parse::spec::OpenApiSpec;

use super::promote_inline::InlineContext;

/// Members every generated class already has; a property with one of these
/// names is renamed.
pub(crate) const OBJECT_MEMBERS: &[&str] = &[
    "hashCode",
    "runtimeType",
    "toString",
    "noSuchMethod",
    "toJson",
    "fromJson",
    "copyWith",
];

/// Members every generated enum already has.
const ENUM_MEMBERS: &[&str] = &["values", "index", "name", "value", "toJson", "fromJson"];

/// The IR shape a raw schema maps to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Shape {
    Enum,
    Union,
    Map,
    Object,
    Array,
    Primitive(PrimitiveType),
}

/// Classify a schema. Precedence: `enum`, discriminated `oneOf`/`anyOf`,
/// `additionalProperties` without `properties`, object, array, primitive.
pub(crate) fn classify(schema: &Schema) -> Shape {
    if schema.enum_values.iter().any(|v| !v.is_null()) {
        return Shape::Enum;
    }
    if !schema.union_branches().is_empty() && schema.discriminator.is_some() {
        return Shape::Union;
    }
    let open_map = matches!(
        schema.additional_properties,
        Some(AdditionalProperties::Schema(_)) | Some(AdditionalProperties::Bool(true))
    );
    if open_map && schema.properties.is_empty() && schema.all_of.is_empty() {
        return Shape::Map;
    }
    if schema.has_type(SchemaType::Object)
        || !schema.properties.is_empty()
        || !schema.all_of.is_empty()
    {
        return Shape::Object;
    }
    if schema.has_type(SchemaType::Array) || schema.items.is_some() {
        return Shape::Array;
    }
    Shape::Primitive(primitive_type(schema))
}

fn primitive_type(schema: &Schema) -> PrimitiveType {
    match schema.primary_type() {
        Some(SchemaType::String) => match schema.format.as_deref() {
            Some("date") => PrimitiveType::Date,
            Some("date-time") => PrimitiveType::DateTime,
            Some("binary") => PrimitiveType::Binary,
            _ => PrimitiveType::String,
        },
        Some(SchemaType::Integer) => PrimitiveType::Integer,
        Some(SchemaType::Number) => PrimitiveType::Number,
        Some(SchemaType::Boolean) => PrimitiveType::Boolean,
        Some(SchemaType::Object | SchemaType::Array | SchemaType::Null) | None => {
            PrimitiveType::Any
        }
    }
}

/// Wire type of an enum's values. An untyped enum takes the type its
/// literals share, falling back to string when they disagree.
fn enum_value_type(schema: &Schema) -> PrimitiveType {
    match schema.primary_type() {
        Some(SchemaType::Integer) => return PrimitiveType::Integer,
        Some(SchemaType::Number) => return PrimitiveType::Number,
        Some(SchemaType::Boolean) => return PrimitiveType::Boolean,
        Some(_) => return PrimitiveType::String,
        None => {}
    }
    let mut literals = schema.enum_values.iter().filter(|v| !v.is_null()).peekable();
    if literals.peek().is_none() {
        return PrimitiveType::String;
    }
    let literals: Vec<&serde_json::Value> = literals.collect();
    if literals.iter().all(|v| v.is_boolean()) {
        PrimitiveType::Boolean
    } else if literals.iter().all(|v| v.is_i64() || v.is_u64()) {
        PrimitiveType::Integer
    } else if literals.iter().all(|v| v.is_number()) {
        PrimitiveType::Number
    } else {
        PrimitiveType::String
    }
}

pub(crate) fn is_null_branch(branch: &SchemaOrRef) -> bool {
    match branch {
        SchemaOrRef::Schema(s) => {
            s.schema_type.is_some() && s.primary_type().is_none() && s.properties.is_empty()
        }
        SchemaOrRef::Ref { .. } => false,
    }
}

/// An undiscriminated `oneOf`/`anyOf` with exactly one non-null branch is
/// that branch, possibly nullable.
pub(crate) fn single_branch(schema: &Schema) -> Option<(String, &SchemaOrRef)> {
    if schema.discriminator.is_some() || !schema.properties.is_empty() {
        return None;
    }
    let keyword = if schema.one_of.is_empty() {
        "anyOf"
    } else {
        "oneOf"
    };
    let mut live = schema
        .union_branches()
        .iter()
        .enumerate()
        .filter(|(_, b)| !is_null_branch(b));
    match (live.next(), live.next()) {
        (Some((i, branch)), None) => Some((format!("{keyword}/{i}"), branch)),
        _ => None,
    }
}

/// A container element type, marked nullable when its schema allows `null`.
fn element_ref(element: ModelRef, schema: &SchemaOrRef) -> ModelRef {
    if is_nullable_use(schema) && element != ModelRef::any() {
        ModelRef::Nullable(Box::new(element))
    } else {
        element
    }
}

/// Whether a property declared with this schema may carry `null`.
pub(crate) fn is_nullable_use(schema: &SchemaOrRef) -> bool {
    match schema {
        SchemaOrRef::Schema(s) => {
            s.is_nullable() || s.union_branches().iter().any(is_null_branch)
        }
        SchemaOrRef::Ref { .. } => false,
    }
}

/// Builds the model arena for one document.
pub(crate) struct SchemaResolver<'a> {
    pub(crate) index: RefIndex<'a>,
    pub(crate) policy: &'a NamingPolicy,
    /// Global model namespace: component ids, promoted ids and union
    /// variant class names.
    pub(crate) model_scope: NameScope,
    /// Raw component name → model id.
    component_ids: IndexMap<String, String>,
    components: IndexMap<String, Model>,
    pub(crate) synthetic: IndexMap<String, Model>,
    /// JSON pointer of an inline occurrence → promoted model id.
    pub(crate) memo: HashMap<String, String>,
    /// Components whose `allOf` chain is being expanded.
    flattening: Vec<String>,
}

impl<'a> SchemaResolver<'a> {
    pub(crate) fn new(spec: &'a OpenApiSpec, policy: &'a NamingPolicy) -> Self {
        Self {
            index: RefIndex::new(spec),
            policy,
            model_scope: NameScope::new(),
            component_ids: IndexMap::new(),
            components: IndexMap::new(),
            synthetic: IndexMap::new(),
            memo: HashMap::new(),
            flattening: Vec::new(),
        }
    }

    /// Give every component an id up front, so references between
    /// components (including recursive ones) resolve by name.
    pub(crate) fn claim_components(&mut self, spec: &OpenApiSpec) -> Result<(), ResolveError> {
        let Some(components) = &spec.components else {
            return Ok(());
        };
        for (raw, schema) in &components.schemas {
            if schema.as_ref_path().is_some() {
                continue;
            }
            let escaped = self.policy.escape(raw, NameRole::Model);
            let id = self.model_scope.claim(raw, &escaped)?;
            self.component_ids.insert(raw.clone(), id);
        }
        Ok(())
    }

    pub(crate) fn resolve_components(
        &mut self,
        spec: &'a OpenApiSpec,
    ) -> Result<(), ResolveError> {
        let Some(components) = &spec.components else {
            return Ok(());
        };
        for (raw, schema) in &components.schemas {
            let SchemaOrRef::Schema(schema) = schema else {
                continue;
            };
            let id = self.component_id(raw)?;
            let ctx = InlineContext::component(raw, &id);
            self.flattening.push(raw.clone());
            let kind = self.model_kind(schema, &ctx);
            self.flattening.pop();
            let kind = kind?;
            log::debug!("resolved component {raw} as {} {id}", kind.label());
            self.components.insert(
                id.clone(),
                Model {
                    id,
                    raw_name: raw.clone(),
                    description: schema.description.clone(),
                    origin: ModelOrigin::Component,
                    kind,
                },
            );
        }
        Ok(())
    }

    /// Component models in document order, then promoted models in the
    /// order they were discovered.
    pub(crate) fn into_models(self) -> IndexMap<String, Model> {
        let mut models = self.components;
        models.extend(self.synthetic);
        models
    }

    fn component_id(&self, raw: &str) -> Result<String, ResolveError> {
        self.component_ids
            .get(raw)
            .cloned()
            .ok_or_else(|| ResolveError::UnresolvedReference {
                reference: format!("#/components/schemas/{raw}"),
                location: "components".to_string(),
            })
    }

    /// Resolve a schema `$ref` to the named model of its target component.
    pub(crate) fn component_ref(&self, ref_path: &str) -> Result<ModelRef, ResolveError> {
        self.component_target(ref_path).map(|(_, id)| ModelRef::Named(id))
    }

    /// Raw name and model id of the component a schema `$ref` lands on.
    pub(crate) fn component_target(
        &self,
        ref_path: &str,
    ) -> Result<(&'a str, String), ResolveError> {
        let (name, _) = self.index.schema(ref_path)?;
        Ok((name, self.component_id(name)?))
    }

    /// The type of a use site: a property, an array item, a map value, a
    /// parameter or a message body. Inline objects, enums and unions are
    /// promoted; containers and primitives stay structural.
    pub(crate) fn type_ref(
        &mut self,
        schema: &SchemaOrRef,
        ctx: &InlineContext,
    ) -> Result<ModelRef, ResolveError> {
        let schema = match schema {
            SchemaOrRef::Ref { ref_path } => return self.component_ref(ref_path),
            SchemaOrRef::Schema(schema) => schema,
        };
        if let Some((segment, branch)) = single_branch(schema) {
            return self.type_ref(branch, &ctx.at(&segment));
        }
        match classify(schema) {
            Shape::Enum | Shape::Union => self.promote(schema, ctx),
            Shape::Object => {
                if schema.properties.is_empty() {
                    if let [SchemaOrRef::Ref { ref_path }] = schema.all_of.as_slice() {
                        return self.component_ref(ref_path);
                    }
                    if schema.all_of.is_empty() {
                        return Ok(ModelRef::Map(Box::new(ModelRef::any())));
                    }
                }
                self.promote(schema, ctx)
            }
            Shape::Map => Ok(ModelRef::Map(Box::new(self.map_value_ref(schema, ctx)?))),
            Shape::Array => Ok(ModelRef::Array(Box::new(self.items_ref(schema, ctx)?))),
            Shape::Primitive(p) => Ok(ModelRef::Primitive(p)),
        }
    }

    /// The kind of a model that is being named: a component or a promoted
    /// inline schema.
    pub(crate) fn model_kind(
        &mut self,
        schema: &Schema,
        ctx: &InlineContext,
    ) -> Result<ModelKind, ResolveError> {
        if let Some((segment, branch)) = single_branch(schema) {
            return match branch {
                SchemaOrRef::Schema(inner) => self.model_kind(inner, &ctx.at(&segment)),
                SchemaOrRef::Ref { ref_path } => {
                    let (name, target) = self.index.schema(ref_path)?;
                    let target_ctx = InlineContext::component(name, &ctx.name);
                    self.enter(name)?;
                    let kind = self.model_kind(target, &target_ctx);
                    self.flattening.pop();
                    kind
                }
            };
        }
        match classify(schema) {
            Shape::Enum => Ok(ModelKind::Enum(self.enum_model(schema)?)),
            Shape::Union => Ok(ModelKind::Union(self.union_model(schema, ctx)?)),
            Shape::Map => Ok(ModelKind::Map(self.map_value_ref(schema, ctx)?)),
            Shape::Object => Ok(ModelKind::Object(self.object_model(schema, ctx)?)),
            Shape::Array => Ok(ModelKind::Array(self.items_ref(schema, ctx)?)),
            Shape::Primitive(p) => Ok(ModelKind::Primitive(p)),
        }
    }

    fn items_ref(
        &mut self,
        schema: &Schema,
        ctx: &InlineContext,
    ) -> Result<ModelRef, ResolveError> {
        match &schema.items {
            Some(items) => Ok(element_ref(self.type_ref(items, &ctx.items())?, items)),
            None => Ok(ModelRef::any()),
        }
    }

    fn map_value_ref(
        &mut self,
        schema: &Schema,
        ctx: &InlineContext,
    ) -> Result<ModelRef, ResolveError> {
        match &schema.additional_properties {
            Some(AdditionalProperties::Schema(value)) => {
                Ok(element_ref(self.type_ref(value, &ctx.map_value())?, value))
            }
            _ => Ok(ModelRef::any()),
        }
    }

    fn enter(&mut self, component: &str) -> Result<(), ResolveError> {
        if self.flattening.iter().any(|c| c == component) {
            let chain = self.flattening.join(" -> ");
            return Err(ResolveError::composition(
                component,
                format!("allOf inheritance cycle ({chain} -> {component})"),
            ));
        }
        self.flattening.push(component.to_string());
        Ok(())
    }

    fn object_model(
        &mut self,
        schema: &Schema,
        ctx: &InlineContext,
    ) -> Result<ObjectModel, ResolveError> {
        let mut parents = Vec::new();
        for part in &schema.all_of {
            if let Some(ref_path) = part.as_ref_path() {
                let (_, id) = self.component_target(ref_path)?;
                if !parents.contains(&id) {
                    parents.push(id);
                }
            }
        }

        let mut fields = Vec::new();
        self.collect_fields(schema, ctx, &mut fields)?;

        let mut scope = NameScope::with_reserved(OBJECT_MEMBERS);
        for field in &mut fields {
            let escaped = self.policy.escape(&field.raw_name, NameRole::Field);
            field.name = scope.claim(&field.raw_name, &escaped)?;
        }

        let additional_properties = match &schema.additional_properties {
            Some(AdditionalProperties::Schema(value)) => {
                Some(self.type_ref(value, &ctx.map_value())?)
            }
            Some(AdditionalProperties::Bool(true)) => Some(ModelRef::any()),
            _ => None,
        };

        Ok(ObjectModel {
            fields,
            parents,
            additional_properties,
        })
    }

    /// Flatten `allOf` parts (referenced objects recursively, then inline
    /// parts) followed by the schema's own properties. A later field with
    /// the same wire name replaces the earlier one in place.
    fn collect_fields(
        &mut self,
        schema: &Schema,
        ctx: &InlineContext,
        fields: &mut Vec<Field>,
    ) -> Result<(), ResolveError> {
        for (i, part) in schema.all_of.iter().enumerate() {
            match part {
                SchemaOrRef::Ref { ref_path } => {
                    let (name, target) = self.index.schema(ref_path)?;
                    let parent_ctx = InlineContext::component(name, &self.component_id(name)?);
                    self.enter(name)?;
                    let result = self.collect_fields(target, &parent_ctx, fields);
                    self.flattening.pop();
                    result?;
                }
                SchemaOrRef::Schema(inline) => {
                    self.collect_fields(inline, &ctx.at(&format!("allOf/{i}")), fields)?;
                }
            }
        }

        for (raw, prop) in &schema.properties {
            let field_type = self.type_ref(prop, &ctx.property(raw))?;
            let (default_value, description) = match prop {
                SchemaOrRef::Schema(s) => (s.default_value.clone(), s.description.clone()),
                SchemaOrRef::Ref { .. } => (None, None),
            };
            let field = Field {
                name: String::new(),
                raw_name: raw.clone(),
                field_type,
                required: false,
                nullable: is_nullable_use(prop),
                default_value,
                description,
            };
            match fields.iter_mut().find(|f| f.raw_name == *raw) {
                Some(existing) => {
                    let required = existing.required;
                    *existing = field;
                    existing.required = required;
                }
                None => fields.push(field),
            }
        }

        for name in &schema.required {
            if let Some(field) = fields.iter_mut().find(|f| f.raw_name == *name) {
                field.required = true;
            }
        }
        Ok(())
    }

    fn enum_model(&mut self, schema: &Schema) -> Result<EnumModel, ResolveError> {
        let value_type = enum_value_type(schema);
        let numeric = matches!(value_type, PrimitiveType::Integer | PrimitiveType::Number);

        let mut scope = NameScope::with_reserved(ENUM_MEMBERS);
        let mut seen = HashSet::new();
        let mut values = Vec::new();
        for value in &schema.enum_values {
            let raw = match value {
                serde_json::Value::Null => continue,
                serde_json::Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            if !seen.insert(raw.clone()) {
                continue;
            }
            let label = if numeric {
                format!("number_{}", raw.replace('-', "minus_"))
            } else {
                raw.clone()
            };
            let member = scope.claim(&raw, &self.policy.escape(&label, NameRole::Field))?;
            values.push(EnumValue { raw, member });
        }
        Ok(EnumModel { values, value_type })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn schema(json: &str) -> Schema {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn classification_precedence() {
        assert_eq!(
            classify(&schema(r#"{"type":"string","enum":["a","b"]}"#)),
            Shape::Enum
        );
        assert_eq!(
            classify(&schema(r#"{"type":"object","additionalProperties":{"type":"string"}}"#)),
            Shape::Map
        );
        assert_eq!(
            classify(&schema(r#"{"properties":{"a":{"type":"string"}},"additionalProperties":true}"#)),
            Shape::Object
        );
        assert_eq!(classify(&schema(r#"{"items":{"type":"string"}}"#)), Shape::Array);
        assert_eq!(
            classify(&schema(r#"{"type":"string","format":"date-time"}"#)),
            Shape::Primitive(PrimitiveType::DateTime)
        );
        assert_eq!(
            classify(&schema(r#"{"oneOf":[{"type":"string"},{"type":"integer"}]}"#)),
            Shape::Primitive(PrimitiveType::Any)
        );
    }

    #[test]
    fn null_only_enum_is_primitive() {
        assert_eq!(
            classify(&schema(r#"{"type":"string","enum":[null]}"#)),
            Shape::Primitive(PrimitiveType::String)
        );
    }

    #[test]
    fn enum_value_type_follows_declared_type_or_literals() {
        let cases = [
            (r#"{"type":"boolean","enum":[true,false]}"#, PrimitiveType::Boolean),
            (r#"{"enum":[true,false,null]}"#, PrimitiveType::Boolean),
            (r#"{"enum":[1,2,3]}"#, PrimitiveType::Integer),
            (r#"{"enum":[1,2.5]}"#, PrimitiveType::Number),
            (r#"{"enum":[1,"two"]}"#, PrimitiveType::String),
            (r#"{"type":"string","enum":["1","2"]}"#, PrimitiveType::String),
            (r#"{"type":"integer","enum":[1,2]}"#, PrimitiveType::Integer),
        ];
        for (json, expected) in cases {
            assert_eq!(enum_value_type(&schema(json)), expected, "{json}");
        }
    }

    #[test]
    fn nullable_one_of_unwraps() {
        let s = schema(r##"{"oneOf":[{"$ref":"#/components/schemas/Pet"},{"type":"null"}]}"##);
        let (segment, branch) = single_branch(&s).unwrap();
        assert_eq!(segment, "oneOf/0");
        assert_eq!(branch.as_ref_path(), Some("#/components/schemas/Pet"));
        assert!(is_nullable_use(&SchemaOrRef::Schema(Box::new(s))));
    }
}
