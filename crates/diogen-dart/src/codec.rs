//! Dart expressions that decode wire values into typed values and encode
//! them back.
//!
//! Decoding is polymorphic over the model kind: every named model, at any
//! depth inside lists and maps, is decoded through its own `fromJson`, and
//! typedef models decode through their target type.

use diogen_core::ir::{Model, ModelKind, ModelRef, PrimitiveType};
use indexmap::IndexMap;

pub struct Codec<'a> {
    models: &'a IndexMap<String, Model>,
}

impl<'a> Codec<'a> {
    pub fn new(models: &'a IndexMap<String, Model>) -> Self {
        Self { models }
    }

    /// Expression turning the wire value `expr` into a `model_ref`.
    pub fn decode(&self, model_ref: &ModelRef, expr: &str) -> String {
        self.decode_in(model_ref, expr, &mut Vec::new())
    }

    /// Like [`Codec::decode`], mapping a null wire value to `null`.
    pub fn decode_nullable(&self, model_ref: &ModelRef, expr: &str) -> String {
        null_guarded(expr, self.decode(model_ref, expr))
    }

    /// Expression turning the typed value `expr` into its wire form.
    pub fn encode(&self, model_ref: &ModelRef, expr: &str) -> String {
        self.encode_in(model_ref, expr, &mut Vec::new())
    }

    /// Encode a value of nullable type. Locals are promoted by the null
    /// check; fields need an explicit `!`.
    pub fn encode_nullable(&self, model_ref: &ModelRef, expr: &str, promotable: bool) -> String {
        let target = if promotable {
            expr.to_string()
        } else {
            format!("{expr}!")
        };
        let inner = self.encode(model_ref, &target);
        if inner == target {
            return expr.to_string();
        }
        format!("{expr} == null ? null : {inner}")
    }

    fn decode_in(&self, model_ref: &ModelRef, expr: &str, aliases: &mut Vec<String>) -> String {
        match model_ref {
            ModelRef::Primitive(p) => decode_primitive(*p, expr),
            ModelRef::Array(inner) => decode_list(expr, &self.decode_in(inner, "value", aliases)),
            ModelRef::Map(inner) => decode_map(expr, &self.decode_in(inner, "value", aliases)),
            ModelRef::Nullable(inner) => null_guarded(expr, self.decode_in(inner, expr, aliases)),
            ModelRef::Named(id) => {
                let Some(model) = self.models.get(id) else {
                    return expr.to_string();
                };
                match &model.kind {
                    ModelKind::Object(_) | ModelKind::Union(_) => {
                        format!("{id}.fromJson({expr} as Map<String, dynamic>)")
                    }
                    ModelKind::Enum(_) => format!("{id}.fromJson({expr})"),
                    ModelKind::Primitive(p) => decode_primitive(*p, expr),
                    ModelKind::Array(inner) | ModelKind::Map(inner) => {
                        // A typedef that contains itself cannot be expanded.
                        if aliases.contains(id) {
                            return format!("{expr} as {id}");
                        }
                        aliases.push(id.clone());
                        let element = self.decode_in(inner, "value", aliases);
                        aliases.pop();
                        match model.kind {
                            ModelKind::Map(_) => decode_map(expr, &element),
                            _ => decode_list(expr, &element),
                        }
                    }
                }
            }
        }
    }

    fn encode_in(&self, model_ref: &ModelRef, expr: &str, aliases: &mut Vec<String>) -> String {
        match model_ref {
            ModelRef::Primitive(p) => encode_primitive(*p, expr),
            ModelRef::Array(inner) => encode_list(expr, &self.encode_in(inner, "value", aliases)),
            ModelRef::Map(inner) => encode_map(expr, &self.encode_in(inner, "value", aliases)),
            ModelRef::Nullable(inner) => null_guarded(expr, self.encode_in(inner, expr, aliases)),
            ModelRef::Named(id) => {
                let Some(model) = self.models.get(id) else {
                    return expr.to_string();
                };
                match &model.kind {
                    ModelKind::Object(_) | ModelKind::Union(_) | ModelKind::Enum(_) => {
                        format!("{expr}.toJson()")
                    }
                    ModelKind::Primitive(p) => encode_primitive(*p, expr),
                    ModelKind::Array(inner) | ModelKind::Map(inner) => {
                        if aliases.contains(id) {
                            return expr.to_string();
                        }
                        aliases.push(id.clone());
                        let element = self.encode_in(inner, "value", aliases);
                        aliases.pop();
                        match model.kind {
                            ModelKind::Map(_) => encode_map(expr, &element),
                            _ => encode_list(expr, &element),
                        }
                    }
                }
            }
        }
    }
}

/// `converted`, skipped when `expr` is null. Identity conversions need no
/// guard.
fn null_guarded(expr: &str, converted: String) -> String {
    if converted == expr {
        converted
    } else {
        format!("{expr} == null ? null : {converted}")
    }
}

fn decode_primitive(primitive: PrimitiveType, expr: &str) -> String {
    match primitive {
        PrimitiveType::String => format!("{expr} as String"),
        PrimitiveType::Integer => format!("({expr} as num).toInt()"),
        PrimitiveType::Number => format!("{expr} as num"),
        PrimitiveType::Boolean => format!("{expr} as bool"),
        PrimitiveType::Date | PrimitiveType::DateTime => {
            format!("DateTime.parse({expr} as String)")
        }
        PrimitiveType::Binary => format!("{expr} as Uint8List"),
        PrimitiveType::Any => expr.to_string(),
    }
}

fn encode_primitive(primitive: PrimitiveType, expr: &str) -> String {
    match primitive {
        PrimitiveType::Date => format!("{expr}.toIso8601String().split('T').first"),
        PrimitiveType::DateTime => format!("{expr}.toIso8601String()"),
        _ => expr.to_string(),
    }
}

fn decode_list(expr: &str, element: &str) -> String {
    format!("({expr} as List<dynamic>).map((dynamic value) => {element}).toList()")
}

fn decode_map(expr: &str, element: &str) -> String {
    format!(
        "({expr} as Map<String, dynamic>).map((String key, dynamic value) => MapEntry(key, {element}))"
    )
}

fn encode_list(expr: &str, element: &str) -> String {
    if element == "value" {
        return expr.to_string();
    }
    format!("{expr}.map((value) => {element}).toList()")
}

fn encode_map(expr: &str, element: &str) -> String {
    if element == "value" {
        return expr.to_string();
    }
    format!("{expr}.map((key, value) => MapEntry(key, {element}))")
}

#[cfg(test)]
mod tests {
    use diogen_core::ir::{EnumModel, EnumValue, ModelOrigin, ObjectModel};

    use super::*;

    fn arena() -> IndexMap<String, Model> {
        let mut models = IndexMap::new();
        let mut add = |id: &str, kind: ModelKind| {
            models.insert(
                id.to_string(),
                Model {
                    id: id.to_string(),
                    raw_name: id.to_string(),
                    description: None,
                    origin: ModelOrigin::Component,
                    kind,
                },
            );
        };
        add("Pet", ModelKind::Object(ObjectModel::default()));
        add(
            "Status",
            ModelKind::Enum(EnumModel {
                values: vec![EnumValue {
                    raw: "available".into(),
                    member: "available".into(),
                }],
                value_type: PrimitiveType::String,
            }),
        );
        add(
            "Statuses",
            ModelKind::Array(ModelRef::Named("Status".into())),
        );
        add("Tree", ModelKind::Map(ModelRef::Named("Tree".into())));
        models
    }

    fn named(id: &str) -> ModelRef {
        ModelRef::Named(id.to_string())
    }

    #[test]
    fn test_decode_named() {
        let models = arena();
        let codec = Codec::new(&models);
        assert_eq!(
            codec.decode(&named("Pet"), "data"),
            "Pet.fromJson(data as Map<String, dynamic>)"
        );
        assert_eq!(codec.decode(&named("Status"), "data"), "Status.fromJson(data)");
    }

    #[test]
    fn test_decode_containers_route_through_element_decoder() {
        let models = arena();
        let codec = Codec::new(&models);
        assert_eq!(
            codec.decode(&ModelRef::Array(Box::new(named("Status"))), "data"),
            "(data as List<dynamic>).map((dynamic value) => Status.fromJson(value)).toList()"
        );
        assert_eq!(
            codec.decode(&ModelRef::Map(Box::new(named("Status"))), "data"),
            "(data as Map<String, dynamic>).map((String key, dynamic value) => MapEntry(key, Status.fromJson(value)))"
        );
    }

    #[test]
    fn test_decode_typedef_through_target() {
        let models = arena();
        let codec = Codec::new(&models);
        assert_eq!(
            codec.decode(&named("Statuses"), "data"),
            "(data as List<dynamic>).map((dynamic value) => Status.fromJson(value)).toList()"
        );
        let tree = codec.decode(&named("Tree"), "data");
        assert!(tree.ends_with("MapEntry(key, value as Tree))"), "{tree}");
    }

    #[test]
    fn test_decode_primitives() {
        let models = arena();
        let codec = Codec::new(&models);
        let int = ModelRef::Primitive(PrimitiveType::Integer);
        assert_eq!(codec.decode(&int, "v"), "(v as num).toInt()");
        assert_eq!(codec.decode(&ModelRef::any(), "v"), "v");
        assert_eq!(
            codec.decode_nullable(&int, "json[r'id']"),
            "json[r'id'] == null ? null : (json[r'id'] as num).toInt()"
        );
    }

    #[test]
    fn test_nullable_elements_are_null_guarded() {
        let models = arena();
        let codec = Codec::new(&models);
        let statuses = ModelRef::Array(Box::new(ModelRef::Nullable(Box::new(named("Status")))));
        assert_eq!(
            codec.decode(&statuses, "data"),
            "(data as List<dynamic>).map((dynamic value) => value == null ? null : Status.fromJson(value)).toList()"
        );
        assert_eq!(
            codec.encode(&statuses, "status"),
            "status.map((value) => value == null ? null : value.toJson()).toList()"
        );

        let counts = ModelRef::Map(Box::new(ModelRef::Nullable(Box::new(ModelRef::Primitive(
            PrimitiveType::Integer,
        )))));
        assert_eq!(
            codec.decode(&counts, "data"),
            "(data as Map<String, dynamic>).map((String key, dynamic value) => MapEntry(key, value == null ? null : (value as num).toInt()))"
        );
        assert_eq!(codec.encode(&counts, "counts"), "counts");
    }

    #[test]
    fn test_encode() {
        let models = arena();
        let codec = Codec::new(&models);
        assert_eq!(codec.encode(&named("Pet"), "pet"), "pet.toJson()");
        assert_eq!(
            codec.encode(&ModelRef::Array(Box::new(named("Status"))), "status"),
            "status.map((value) => value.toJson()).toList()"
        );
        let strings = ModelRef::Array(Box::new(ModelRef::Primitive(PrimitiveType::String)));
        assert_eq!(codec.encode(&strings, "tags"), "tags");
        assert_eq!(
            codec.encode_nullable(&named("Status"), "status", false),
            "status == null ? null : status!.toJson()"
        );
        assert_eq!(codec.encode_nullable(&strings, "tags", false), "tags");
    }
}
