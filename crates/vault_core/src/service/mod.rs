//! Core stores and the application state that owns them.
//!
//! # Responsibility
//! - Taxonomy and material stores with their invariants.
//! - Theme resolution.
//! - `Vault`, the single writer that persists after every mutation.

pub mod material_service;
pub mod taxonomy_service;
pub mod theme_service;
pub mod vault;
