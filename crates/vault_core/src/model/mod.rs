//! Domain model for captured materials and the visual theme.
//!
//! # Responsibility
//! - Define the records persisted in vault slots.
//! - Keep wire names compatible with previously stored slot values.
//!
//! # Invariants
//! - Every material is identified by a stable, never reused `MaterialId`.
//! - Theme presets and seasonal overrides are fixed tables, not user data.

pub mod material;
pub mod theme;
