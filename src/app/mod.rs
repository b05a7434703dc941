// Application layer: CLI command orchestration over the core loader.

#[cfg(feature = "cli")]
pub mod commands;
