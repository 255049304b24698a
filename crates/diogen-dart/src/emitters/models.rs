use diogen_core::config::SerializationStrategy;
use diogen_core::ir::{EnumModel, Field, Model, ModelKind, ModelRef, ObjectModel, PrimitiveType, UnionModel};
use diogen_core::{GeneratedFile, RenderError};
use minijinja::context;
use serde::Serialize;

use super::{CommentStyle, Renderer, sorted_imports};
use crate::templates::ModelVariant;
use crate::type_mapper::{
    dart_type, doc_lines, model_file, nullable, primitive_type, string_literal, uses_binary,
};

#[derive(Debug, Serialize)]
struct FieldContext {
    name: String,
    /// Wire name as a Dart string literal.
    key: String,
    dart_type: String,
    required: bool,
    /// Omitted from `toJson` when null.
    skip_null: bool,
    decode: String,
    encode: String,
    /// Freezed factory parameter.
    param: String,
    doc: Vec<String>,
}

#[derive(Debug, Serialize)]
struct EnumMemberContext {
    member: String,
    literal: String,
}

#[derive(Debug, Serialize)]
struct VariantContext {
    tag: String,
    class_name: String,
    model: String,
    member_name: String,
    params: Vec<String>,
}

/// Emit `lib/src/model/<model>.dart` for one model.
pub fn emit_model(r: &Renderer<'_>, model: &Model) -> Result<GeneratedFile, RenderError> {
    let strategy = r.config.features.serialization();
    let variant = ModelVariant::select(&model.kind, strategy);
    let file = model_file(&model.id);
    let header = r.header(CommentStyle::Slash);
    let doc = doc_lines(model.description.as_deref());
    let stem = file.trim_end_matches(".dart");

    let ctx = match &model.kind {
        ModelKind::Object(object) => {
            let fields = field_contexts(r, object);
            context! {
                header,
                doc,
                stem,
                class_name => &model.id,
                imports => imports_of(model.references().into_iter(), &model.id),
                typed_data => object.fields.iter().any(|f| uses_binary(&f.field_type)),
                parents => &object.parents,
                fields,
            }
        }
        ModelKind::Enum(enumeration) => context! {
            header,
            doc,
            stem,
            class_name => &model.id,
            value_type => enum_value_type(enumeration),
            members => enum_members(enumeration),
        },
        ModelKind::Union(union) => union_context(r, model, union, &header, &doc, stem),
        ModelKind::Primitive(p) => context! {
            header,
            doc,
            class_name => &model.id,
            target => primitive_type(*p),
            imports => Vec::<String>::new(),
            typed_data => *p == PrimitiveType::Binary,
        },
        ModelKind::Array(inner) | ModelKind::Map(inner) => {
            let target = match &model.kind {
                ModelKind::Map(_) => ModelRef::Map(Box::new(inner.clone())),
                _ => ModelRef::Array(Box::new(inner.clone())),
            };
            context! {
                header,
                doc,
                class_name => &model.id,
                target => dart_type(&target),
                imports => imports_of(model.references().into_iter(), &model.id),
                typed_data => uses_binary(inner),
            }
        }
    };

    log::debug!("rendering model {} as {:?}", model.id, variant);
    let content = r.render(variant.template(), &model.id, ctx)?;
    Ok(GeneratedFile {
        path: format!("lib/src/model/{file}"),
        content,
    })
}

fn imports_of<'a>(ids: impl Iterator<Item = &'a str>, own: &str) -> Vec<String> {
    sorted_imports(ids.filter(|id| *id != own).map(model_file).collect())
}

fn field_contexts(r: &Renderer<'_>, object: &ObjectModel) -> Vec<FieldContext> {
    object
        .fields
        .iter()
        .map(|field| field_context(r, field))
        .collect()
}

fn field_context(r: &Renderer<'_>, field: &Field) -> FieldContext {
    let key = string_literal(&field.raw_name);
    let base = dart_type(&field.field_type);
    let optional = !field.required || field.nullable;
    let access = format!("json[{key}]");
    let (ty, decode, encode) = if optional {
        (
            nullable(&base),
            r.codec.decode_nullable(&field.field_type, &access),
            r.codec
                .encode_nullable(&field.field_type, &field.name, false),
        )
    } else {
        (
            base,
            r.codec.decode(&field.field_type, &access),
            r.codec.encode(&field.field_type, &field.name),
        )
    };
    let param = if field.required {
        format!("@JsonKey(name: {key}) required {ty} {}", field.name)
    } else {
        format!("@JsonKey(name: {key}) {ty} {}", field.name)
    };
    FieldContext {
        name: field.name.clone(),
        key,
        dart_type: ty,
        required: field.required,
        skip_null: !field.required,
        decode,
        encode,
        param,
        doc: doc_lines(field.description.as_deref()),
    }
}

fn enum_value_type(enumeration: &EnumModel) -> &'static str {
    match enumeration.value_type {
        PrimitiveType::Integer => "int",
        PrimitiveType::Number => "num",
        PrimitiveType::Boolean => "bool",
        _ => "String",
    }
}

fn enum_members(enumeration: &EnumModel) -> Vec<EnumMemberContext> {
    enumeration
        .values
        .iter()
        .map(|value| EnumMemberContext {
            member: value.member.clone(),
            literal: match enumeration.value_type {
                PrimitiveType::Integer | PrimitiveType::Number | PrimitiveType::Boolean => {
                    value.raw.clone()
                }
                _ => string_literal(&value.raw),
            },
        })
        .collect()
}

fn union_context(
    r: &Renderer<'_>,
    model: &Model,
    union: &UnionModel,
    header: &str,
    doc: &[String],
    stem: &str,
) -> minijinja::Value {
    let tagged = r.config.features.serialization() == SerializationStrategy::TaggedUnionLibrary;
    let mut imports = Vec::new();
    let mut typed_data = false;
    let mut variants = Vec::with_capacity(union.variants.len());

    for variant in &union.variants {
        let mut params = Vec::new();
        if tagged {
            // The library writes the tag itself, so the payload fields
            // exclude the discriminator.
            if let Some(object) = r.ir.model(&variant.model).and_then(|m| m.kind.as_object()) {
                for field in object
                    .fields
                    .iter()
                    .filter(|f| f.raw_name != union.discriminator)
                {
                    params.push(field_context(r, field).param);
                    typed_data |= uses_binary(&field.field_type);
                    if let Some(id) = field.field_type.named_id() {
                        imports.push(id);
                    }
                }
            }
        } else {
            imports.push(variant.model.as_str());
        }
        variants.push(VariantContext {
            tag: string_literal(&variant.tag),
            class_name: variant.class_name.clone(),
            model: variant.model.clone(),
            member_name: variant.member_name.clone(),
            params,
        });
    }

    context! {
        header,
        doc,
        stem,
        class_name => &model.id,
        discriminator => string_literal(&union.discriminator),
        imports => imports_of(imports.into_iter(), &model.id),
        typed_data,
        variants,
    }
}
