//! Built-in transforms shipped with the CLI.
//!
//! Each transform lives in its own module and registers under a stable
//! kebab-case name. Library users compose their own registry instead.

pub mod default_to_namespace;
pub mod strip_type_imports;

use crate::error::RemoldError;
use crate::registry::TransformRegistry;

/// A registry preloaded with every built-in transform.
pub fn builtin_registry() -> Result<TransformRegistry, RemoldError> {
    let mut registry = TransformRegistry::new();
    registry.register(
        default_to_namespace::NAME,
        default_to_namespace::run,
    )?;
    registry.register(strip_type_imports::NAME, strip_type_imports::run)?;
    Ok(registry)
}
