use std::fmt;

/// Scalar types every target can express.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimitiveType {
    String,
    Integer,
    Number,
    Boolean,
    Date,
    DateTime,
    Binary,
    /// No usable type information; decodes as an untyped value.
    Any,
}

impl fmt::Display for PrimitiveType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            PrimitiveType::String => "string",
            PrimitiveType::Integer => "integer",
            PrimitiveType::Number => "number",
            PrimitiveType::Boolean => "boolean",
            PrimitiveType::Date => "date",
            PrimitiveType::DateTime => "date-time",
            PrimitiveType::Binary => "binary",
            PrimitiveType::Any => "any",
        };
        f.write_str(s)
    }
}

/// A reference to a type, either by model id or structurally.
///
/// After resolution every `Named` id exists in the model arena. Cycles in
/// the schema graph only ever pass through `Named`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ModelRef {
    Named(String),
    Primitive(PrimitiveType),
    Array(Box<ModelRef>),
    Map(Box<ModelRef>),
    /// A container element that may be `null` on the wire.
    Nullable(Box<ModelRef>),
}

impl ModelRef {
    pub fn any() -> Self {
        ModelRef::Primitive(PrimitiveType::Any)
    }

    /// The model id this reference bottoms out in, if any.
    pub fn named_id(&self) -> Option<&str> {
        match self {
            ModelRef::Named(id) => Some(id),
            ModelRef::Primitive(_) => None,
            ModelRef::Array(inner) | ModelRef::Map(inner) | ModelRef::Nullable(inner) => {
                inner.named_id()
            }
        }
    }

    pub fn collect_named<'a>(&'a self, out: &mut Vec<&'a str>) {
        if let Some(id) = self.named_id() {
            out.push(id);
        }
    }
}

impl fmt::Display for ModelRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModelRef::Named(id) => f.write_str(id),
            ModelRef::Primitive(p) => write!(f, "{p}"),
            ModelRef::Array(inner) => write!(f, "array<{inner}>"),
            ModelRef::Map(inner) => write!(f, "map<{inner}>"),
            ModelRef::Nullable(inner) => write!(f, "{inner}?"),
        }
    }
}

/// Where a model came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModelOrigin {
    /// Declared under `components.schemas`.
    Component,
    /// Hoisted from an inline schema; `context` is the JSON pointer of the
    /// place it was found.
    Inline { context: String },
}

/// A resolved, named model.
#[derive(Debug, Clone)]
pub struct Model {
    pub id: String,
    pub raw_name: String,
    pub description: Option<String>,
    pub origin: ModelOrigin,
    pub kind: ModelKind,
}

impl Model {
    /// Ids of every model this one refers to, in declaration order, with
    /// duplicates removed.
    pub fn references(&self) -> Vec<&str> {
        let mut out = Vec::new();
        match &self.kind {
            ModelKind::Primitive(_) => {}
            ModelKind::Array(inner) | ModelKind::Map(inner) => inner.collect_named(&mut out),
            ModelKind::Object(obj) => {
                for field in &obj.fields {
                    field.field_type.collect_named(&mut out);
                }
                if let Some(extra) = &obj.additional_properties {
                    extra.collect_named(&mut out);
                }
            }
            ModelKind::Enum(_) => {}
            ModelKind::Union(union) => {
                for variant in &union.variants {
                    out.push(variant.model.as_str());
                }
            }
        }
        let mut seen = std::collections::HashSet::new();
        out.retain(|id| *id != self.id && seen.insert(*id));
        out
    }
}

/// The closed set of model shapes.
#[derive(Debug, Clone)]
pub enum ModelKind {
    Primitive(PrimitiveType),
    Array(ModelRef),
    Map(ModelRef),
    Object(ObjectModel),
    Enum(EnumModel),
    Union(UnionModel),
}

impl ModelKind {
    pub fn label(&self) -> &'static str {
        match self {
            ModelKind::Primitive(_) => "primitive",
            ModelKind::Array(_) => "array",
            ModelKind::Map(_) => "map",
            ModelKind::Object(_) => "object",
            ModelKind::Enum(_) => "enum",
            ModelKind::Union(_) => "union",
        }
    }

    pub fn as_object(&self) -> Option<&ObjectModel> {
        match self {
            ModelKind::Object(obj) => Some(obj),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ObjectModel {
    /// Own and inherited fields, flattened, in declaration order.
    pub fields: Vec<Field>,
    /// Ids of the `allOf` components this object extends.
    pub parents: Vec<String>,
    pub additional_properties: Option<ModelRef>,
}

impl ObjectModel {
    pub fn field(&self, raw_name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.raw_name == raw_name)
    }
}

/// A property of an object model.
#[derive(Debug, Clone)]
pub struct Field {
    /// Escaped identifier.
    pub name: String,
    /// Wire name.
    pub raw_name: String,
    pub field_type: ModelRef,
    pub required: bool,
    pub nullable: bool,
    pub default_value: Option<serde_json::Value>,
    pub description: Option<String>,
}

#[derive(Debug, Clone)]
pub struct EnumModel {
    pub values: Vec<EnumValue>,
    /// Wire type of the values: string, integer, number or boolean.
    pub value_type: PrimitiveType,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumValue {
    /// The literal as it appears on the wire.
    pub raw: String,
    /// Escaped member identifier.
    pub member: String,
}

/// A discriminated union.
#[derive(Debug, Clone)]
pub struct UnionModel {
    /// Wire name of the discriminator property, shared by every variant.
    pub discriminator: String,
    pub variants: Vec<UnionVariant>,
}

impl UnionModel {
    pub fn variant(&self, tag: &str) -> Option<&UnionVariant> {
        self.variants.iter().find(|v| v.tag == tag)
    }
}

#[derive(Debug, Clone)]
pub struct UnionVariant {
    /// Discriminator value selecting this variant. Unique within the union.
    pub tag: String,
    /// Id of the object model carrying the payload.
    pub model: String,
    /// Escaped member identifier (used for factory constructors).
    pub member_name: String,
    /// Escaped class name for the generated variant wrapper.
    pub class_name: String,
}
