use diogen_core::ir::{ModelRef, PrimitiveType};
use heck::ToSnakeCase;

/// Map a `ModelRef` to the Dart type it is declared as.
pub fn dart_type(model_ref: &ModelRef) -> String {
    match model_ref {
        ModelRef::Named(id) => id.clone(),
        ModelRef::Primitive(p) => primitive_type(*p).to_string(),
        ModelRef::Array(inner) => format!("List<{}>", dart_type(inner)),
        ModelRef::Map(inner) => format!("Map<String, {}>", dart_type(inner)),
        ModelRef::Nullable(inner) => nullable(&dart_type(inner)),
    }
}

pub fn primitive_type(primitive: PrimitiveType) -> &'static str {
    match primitive {
        PrimitiveType::String => "String",
        PrimitiveType::Integer => "int",
        PrimitiveType::Number => "num",
        PrimitiveType::Boolean => "bool",
        PrimitiveType::Date | PrimitiveType::DateTime => "DateTime",
        PrimitiveType::Binary => "Uint8List",
        PrimitiveType::Any => "Object?",
    }
}

/// The nullable form of a Dart type.
pub fn nullable(ty: &str) -> String {
    if ty.ends_with('?') {
        ty.to_string()
    } else {
        format!("{ty}?")
    }
}

/// Whether `dart:typed_data` is needed to name this type.
pub fn uses_binary(model_ref: &ModelRef) -> bool {
    match model_ref {
        ModelRef::Primitive(p) => *p == PrimitiveType::Binary,
        ModelRef::Named(_) => false,
        ModelRef::Array(inner) | ModelRef::Map(inner) | ModelRef::Nullable(inner) => {
            uses_binary(inner)
        }
    }
}

/// File name of the Dart library declaring model `id`.
pub fn model_file(id: &str) -> String {
    format!("{}.dart", id.to_snake_case())
}

/// A Dart string literal for `text`. Raw strings are used whenever the text
/// allows it.
pub fn string_literal(text: &str) -> String {
    if !text.contains(['\'', '\n', '\r']) {
        return format!("r'{text}'");
    }
    let mut out = String::with_capacity(text.len() + 2);
    out.push('\'');
    for ch in text.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '\'' => out.push_str("\\'"),
            '$' => out.push_str("\\$"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            other => out.push(other),
        }
    }
    out.push('\'');
    out
}

/// Split free text into lines for `///` comments.
pub fn doc_lines(text: Option<&str>) -> Vec<String> {
    text.map(|t| {
        t.trim()
            .lines()
            .map(|line| line.trim_end().replace("*/", "*\\/"))
            .collect()
    })
    .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_primitives() {
        assert_eq!(dart_type(&ModelRef::Primitive(PrimitiveType::String)), "String");
        assert_eq!(dart_type(&ModelRef::Primitive(PrimitiveType::Integer)), "int");
        assert_eq!(dart_type(&ModelRef::Primitive(PrimitiveType::Number)), "num");
        assert_eq!(dart_type(&ModelRef::Primitive(PrimitiveType::DateTime)), "DateTime");
        assert_eq!(dart_type(&ModelRef::any()), "Object?");
    }

    #[test]
    fn test_containers() {
        let pets = ModelRef::Array(Box::new(ModelRef::Named("Pet".into())));
        assert_eq!(dart_type(&pets), "List<Pet>");
        let counts = ModelRef::Map(Box::new(ModelRef::Primitive(PrimitiveType::Integer)));
        assert_eq!(dart_type(&counts), "Map<String, int>");
        assert_eq!(
            dart_type(&ModelRef::Map(Box::new(ModelRef::any()))),
            "Map<String, Object?>"
        );
    }

    #[test]
    fn test_nullable_elements() {
        let tags = ModelRef::Array(Box::new(ModelRef::Nullable(Box::new(ModelRef::Primitive(
            PrimitiveType::String,
        )))));
        assert_eq!(dart_type(&tags), "List<String?>");
        let files = ModelRef::Map(Box::new(ModelRef::Nullable(Box::new(ModelRef::Primitive(
            PrimitiveType::Binary,
        )))));
        assert_eq!(dart_type(&files), "Map<String, Uint8List?>");
        assert!(uses_binary(&files));
    }

    #[test]
    fn test_nullable() {
        assert_eq!(nullable("Pet"), "Pet?");
        assert_eq!(nullable("Object?"), "Object?");
    }

    #[test]
    fn test_string_literal() {
        assert_eq!(string_literal("@type"), "r'@type'");
        assert_eq!(string_literal("it's $5"), "'it\\'s \\$5'");
    }

    #[test]
    fn test_model_file() {
        assert_eq!(model_file("FooRefOrValue"), "foo_ref_or_value.dart");
        assert_eq!(model_file("Pet"), "pet.dart");
    }
}
