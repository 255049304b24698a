//! Hoisting of inline schemas into named models.
//!
//! An inline object, enum or union gets a synthetic name derived from where
//! it was found. Nested inline schemas take their name from the innermost
//! enclosing model, so `Pet.owner.address` becomes `PetOwnerAddress`.
//! Promotion is memoized on the JSON pointer of the occurrence, which makes
//! it idempotent and lets an `allOf` child reuse the models already hoisted
//! from its parent's properties.

use heck::ToPascalCase;

use crate::error::ResolveError;
use crate::ir::{Model, ModelKind, ModelOrigin, ModelRef, PrimitiveType};
use crate::naming::NameRole;
use crate::parse::schema::Schema;

use super::schema_resolver::SchemaResolver;

/// Where an inline schema sits: its JSON pointer (the memo key) and the
/// name a model hoisted from it would get.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct InlineContext {
    pub path: String,
    pub name: String,
}

impl InlineContext {
    pub fn new(path: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            name: name.into(),
        }
    }

    pub fn component(raw_name: &str, id: &str) -> Self {
        Self::new(
            format!("#/components/schemas/{}", escape_pointer(raw_name)),
            id,
        )
    }

    /// Same naming context, deeper pointer.
    pub fn at(&self, segment: &str) -> Self {
        Self::new(format!("{}/{}", self.path, segment), self.name.clone())
    }

    pub fn property(&self, raw_name: &str) -> Self {
        Self::new(
            format!("{}/properties/{}", self.path, escape_pointer(raw_name)),
            format!("{}{}", self.name, pascal(raw_name)),
        )
    }

    pub fn items(&self) -> Self {
        Self::new(format!("{}/items", self.path), format!("{}Item", self.name))
    }

    pub fn map_value(&self) -> Self {
        Self::new(
            format!("{}/additionalProperties", self.path),
            format!("{}Value", self.name),
        )
    }

    pub fn branch(&self, keyword: &str, index: usize) -> Self {
        Self::new(
            format!("{}/{keyword}/{index}", self.path),
            format!("{}Variant{}", self.name, index + 1),
        )
    }

    /// Rename the context once the model it describes has its final id.
    pub fn named(&self, id: &str) -> Self {
        Self::new(self.path.clone(), id)
    }
}

impl SchemaResolver<'_> {
    /// Hoist `schema` into a named model, or return the model already
    /// hoisted from the same location.
    pub(crate) fn promote(
        &mut self,
        schema: &Schema,
        ctx: &InlineContext,
    ) -> Result<ModelRef, ResolveError> {
        self.promote_id(schema, ctx).map(ModelRef::Named)
    }

    pub(crate) fn promote_id(
        &mut self,
        schema: &Schema,
        ctx: &InlineContext,
    ) -> Result<String, ResolveError> {
        if let Some(id) = self.memo.get(&ctx.path) {
            return Ok(id.clone());
        }

        let escaped = self.policy.escape(&ctx.name, NameRole::Model);
        let id = self.model_scope.fresh(&escaped)?;
        self.memo.insert(ctx.path.clone(), id.clone());

        // Reserve the slot first so promotion order is discovery order even
        // when the body hoists further models.
        self.synthetic.insert(
            id.clone(),
            Model {
                id: id.clone(),
                raw_name: ctx.name.clone(),
                description: schema.description.clone(),
                origin: ModelOrigin::Inline {
                    context: ctx.path.clone(),
                },
                kind: ModelKind::Primitive(PrimitiveType::Any),
            },
        );

        let kind = self.model_kind(schema, &ctx.named(&id))?;
        log::debug!("promoted inline {} at {} as {}", kind.label(), ctx.path, id);
        if let Some(model) = self.synthetic.get_mut(&id) {
            model.kind = kind;
        }
        Ok(id)
    }
}

pub(crate) fn escape_pointer(segment: &str) -> String {
    segment.replace('~', "~0").replace('/', "~1")
}

fn pascal(raw: &str) -> String {
    super::name_normalizer::sanitize_identifier(raw).to_pascal_case()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_follow_the_innermost_context() {
        let pet = InlineContext::component("Pet", "Pet");
        let owner = pet.property("owner");
        assert_eq!(owner.name, "PetOwner");
        assert_eq!(owner.path, "#/components/schemas/Pet/properties/owner");
        let address = owner.named("PetOwner").property("home-address");
        assert_eq!(address.name, "PetOwnerHomeAddress");
    }

    #[test]
    fn container_contexts() {
        let ctx = InlineContext::new("#/paths/~1pets/get/responses/200", "ListPets200Response");
        assert_eq!(ctx.items().name, "ListPets200ResponseItem");
        assert_eq!(ctx.map_value().name, "ListPets200ResponseValue");
        assert_eq!(ctx.branch("oneOf", 0).name, "ListPets200ResponseVariant1");
        assert_eq!(
            ctx.branch("oneOf", 0).path,
            "#/paths/~1pets/get/responses/200/oneOf/0"
        );
    }

    #[test]
    fn pointer_segments_are_escaped() {
        let ctx = InlineContext::component("a/b", "AB");
        assert_eq!(ctx.path, "#/components/schemas/a~1b");
    }
}
