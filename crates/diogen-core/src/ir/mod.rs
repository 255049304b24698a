pub mod models;
pub mod operations;
pub mod security;
pub mod types;

pub use models::*;
pub use operations::*;
pub use security::{IrApiKeyLocation, IrAuthKind, IrSecurityScheme};
pub use types::{IrInfo, IrModule, IrServer, IrSpec, NormalizedName};
