use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use heck::{ToLowerCamelCase, ToPascalCase, ToSnakeCase};

use super::reserved::ReservedWords;
use crate::error::ResolveError;
use crate::transform::name_normalizer::sanitize_identifier;

/// What an identifier names. Decides casing and the reserved-word suffix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NameRole {
    Model,
    Field,
    Operation,
}

impl NameRole {
    fn reserved_suffix(self) -> &'static str {
        match self {
            NameRole::Model => "Model",
            NameRole::Field | NameRole::Operation => "_",
        }
    }
}

/// Maps raw document names to safe target identifiers.
///
/// `escape` is pure: it only reads the shared reserved table, so two calls
/// with the same raw text and role always agree.
#[derive(Debug, Clone)]
pub struct NamingPolicy {
    reserved: Arc<ReservedWords>,
}

impl NamingPolicy {
    pub fn new(reserved: Arc<ReservedWords>) -> Self {
        Self { reserved }
    }

    pub fn reserved(&self) -> &ReservedWords {
        &self.reserved
    }

    pub fn escape(&self, raw: &str, role: NameRole) -> String {
        let sanitized = sanitize_identifier(raw);
        let mut ident = match role {
            NameRole::Model => sanitized.to_pascal_case(),
            NameRole::Field | NameRole::Operation => sanitized.to_lower_camel_case(),
        };
        if ident.starts_with(|c: char| c.is_ascii_digit()) {
            ident.insert(0, '$');
        }
        if self.reserved.contains(&ident) {
            ident.push_str(role.reserved_suffix());
        }
        ident
    }
}

/// One namespace of generated identifiers.
///
/// Two identifiers collide when their snake_case forms match, which keeps
/// the file names derived from them distinct as well. The loser of a
/// collision gets the next free numeric suffix starting at 2.
#[derive(Debug, Clone, Default)]
pub struct NameScope {
    taken: HashSet<String>,
    claimed: HashMap<String, String>,
}

impl NameScope {
    pub const MAX_DISAMBIGUATION: usize = 10_000;

    pub fn new() -> Self {
        Self::default()
    }

    /// A scope in which `names` are already in use.
    pub fn with_reserved<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut scope = Self::new();
        for name in names {
            scope.taken.insert(collision_key(name.as_ref()));
        }
        scope
    }

    /// Identifier for `raw`. The same raw text always gets the same answer
    /// within this scope.
    pub fn claim(&mut self, raw: &str, escaped: &str) -> Result<String, ResolveError> {
        if let Some(existing) = self.claimed.get(raw) {
            return Ok(existing.clone());
        }
        let ident = self.fresh(escaped)?;
        self.claimed.insert(raw.to_string(), ident.clone());
        Ok(ident)
    }

    /// A new identifier based on `escaped`, never shared with an earlier one.
    pub fn fresh(&mut self, escaped: &str) -> Result<String, ResolveError> {
        if self.taken.insert(collision_key(escaped)) {
            return Ok(escaped.to_string());
        }
        for n in 2..Self::MAX_DISAMBIGUATION + 2 {
            let candidate = format!("{escaped}{n}");
            if self.taken.insert(collision_key(&candidate)) {
                return Ok(candidate);
            }
        }
        Err(ResolveError::NamingCollision {
            name: escaped.to_string(),
            attempts: Self::MAX_DISAMBIGUATION,
        })
    }

    pub fn is_taken(&self, ident: &str) -> bool {
        self.taken.contains(&collision_key(ident))
    }
}

fn collision_key(ident: &str) -> String {
    ident.to_snake_case()
}
