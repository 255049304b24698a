//! Discriminated unions: variant construction and the post-pass that puts
//! the discriminator property on every variant object.

use indexmap::IndexMap;

use crate::error::ResolveError;
use crate::ir::{
    Field, Model, ModelKind, ModelRef, ObjectModel, PrimitiveType, UnionModel, UnionVariant,
};
use crate::naming::{NameRole, NameScope, NamingPolicy};
use crate::parse::schema::{Schema, SchemaOrRef};

use super::promote_inline::InlineContext;
use super::schema_resolver::{OBJECT_MEMBERS, SchemaResolver, is_null_branch};

/// Names the tagged-union library generates on every union class.
const UNION_MEMBERS: &[&str] = &[
    "fromJson",
    "toJson",
    "when",
    "maybeWhen",
    "whenOrNull",
    "map",
    "maybeMap",
    "mapOrNull",
    "copyWith",
];

impl SchemaResolver<'_> {
    /// Build the variants of a discriminated `oneOf`/`anyOf`.
    ///
    /// With a mapping, each entry is a variant tagged by its key. Without
    /// one, each branch is a variant tagged by the component's raw name, or
    /// by the synthetic name of an inline branch.
    pub(crate) fn union_model(
        &mut self,
        schema: &Schema,
        ctx: &InlineContext,
    ) -> Result<UnionModel, ResolveError> {
        let discriminator = schema
            .discriminator
            .as_ref()
            .ok_or_else(|| ResolveError::composition(&ctx.name, "union has no discriminator"))?;

        let mut entries: Vec<(String, String)> = Vec::new();
        if discriminator.mapping.is_empty() {
            let keyword = if schema.one_of.is_empty() {
                "anyOf"
            } else {
                "oneOf"
            };
            for (i, branch) in schema.union_branches().iter().enumerate() {
                if is_null_branch(branch) {
                    continue;
                }
                match branch {
                    SchemaOrRef::Ref { ref_path } => {
                        let (name, id) = self.component_target(ref_path)?;
                        entries.push((name.to_string(), id));
                    }
                    SchemaOrRef::Schema(inline) => {
                        let id = self.promote_id(inline, &ctx.branch(keyword, i))?;
                        entries.push((id.clone(), id));
                    }
                }
            }
        } else {
            for (tag, target) in &discriminator.mapping {
                let ref_path = if target.starts_with('#') {
                    target.clone()
                } else {
                    format!("#/components/schemas/{target}")
                };
                let model = match self.component_target(&ref_path) {
                    Ok((_, id)) => id,
                    Err(ResolveError::UnresolvedReference { .. }) => {
                        return Err(ResolveError::composition(
                            &ctx.name,
                            format!("mapping `{tag}` targets missing schema `{target}`"),
                        ));
                    }
                    Err(err) => return Err(err),
                };
                entries.push((tag.clone(), model));
            }
        }

        let mut members = NameScope::with_reserved(UNION_MEMBERS);
        let mut variants: Vec<UnionVariant> = Vec::with_capacity(entries.len());
        for (tag, model) in entries {
            if variants.iter().any(|v| v.tag == tag) {
                return Err(ResolveError::composition(
                    &ctx.name,
                    format!("two variants share the tag `{tag}`"),
                ));
            }
            let member_name = members.fresh(&self.policy.escape(&tag, NameRole::Field))?;
            let class_name = self.model_scope.fresh(
                &self
                    .policy
                    .escape(&format!("{}_{}", ctx.name, tag), NameRole::Model),
            )?;
            variants.push(UnionVariant {
                tag,
                model,
                member_name,
                class_name,
            });
        }

        if variants.is_empty() {
            return Err(ResolveError::composition(&ctx.name, "union has no variants"));
        }

        Ok(UnionModel {
            discriminator: discriminator.property_name.clone(),
            variants,
        })
    }
}

/// Make every union variant an object that carries the discriminator as a
/// required, non-null string, so decoders can read the tag first.
pub(crate) fn reconcile_unions(
    models: &mut IndexMap<String, Model>,
    policy: &NamingPolicy,
) -> Result<(), ResolveError> {
    let unions: Vec<(String, String, Vec<String>)> = models
        .values()
        .filter_map(|m| match &m.kind {
            ModelKind::Union(u) => Some((
                m.id.clone(),
                u.discriminator.clone(),
                u.variants.iter().map(|v| v.model.clone()).collect(),
            )),
            _ => None,
        })
        .collect();

    for (union_id, discriminator, variant_ids) in unions {
        for variant_id in variant_ids {
            let model = models.get_mut(&variant_id).ok_or_else(|| {
                ResolveError::UnresolvedReference {
                    reference: variant_id.clone(),
                    location: format!("union {union_id}"),
                }
            })?;
            let label = model.kind.label();
            let ModelKind::Object(object) = &mut model.kind else {
                return Err(ResolveError::composition(
                    &union_id,
                    format!("variant `{variant_id}` is {label}, not an object"),
                ));
            };
            inject_discriminator(object, &discriminator, policy)?;
        }
    }
    Ok(())
}

fn inject_discriminator(
    object: &mut ObjectModel,
    discriminator: &str,
    policy: &NamingPolicy,
) -> Result<(), ResolveError> {
    if let Some(field) = object
        .fields
        .iter_mut()
        .find(|f| f.raw_name == discriminator)
    {
        field.required = true;
        field.nullable = false;
        return Ok(());
    }

    let taken = object.fields.iter().map(|f| f.name.as_str());
    let mut scope = NameScope::with_reserved(OBJECT_MEMBERS.iter().copied().chain(taken));
    let name = scope.fresh(&policy.escape(discriminator, NameRole::Field))?;
    object.fields.insert(
        0,
        Field {
            name,
            raw_name: discriminator.to_string(),
            field_type: ModelRef::Primitive(PrimitiveType::String),
            required: true,
            nullable: false,
            default_value: None,
            description: None,
        },
    );
    Ok(())
}
