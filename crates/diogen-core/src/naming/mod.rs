//! Identifier policy: the reserved-word table, role-based escaping and
//! per-namespace collision handling.

pub mod policy;
pub mod reserved;

pub use policy::{NameRole, NameScope, NamingPolicy};
pub use reserved::ReservedWords;
