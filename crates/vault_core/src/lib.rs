//! Core of the knowledge vault: captured materials, the category/domain
//! taxonomy, theme resolution, slot persistence and AI tag suggestions.
//! This crate is the single source of truth for data invariants.

pub mod ai;
pub mod config;
pub mod db;
pub mod gesture;
pub mod logging;
pub mod model;
pub mod persist;
pub mod repo;
pub mod search;
pub mod service;

pub use ai::smart_tag::{SmartTagOutcome, SmartTagger};
pub use ai::tagger::{GeminiTagger, MaterialTagger, TagSuggestion, TaggerError};
pub use config::{AiConfig, ConfigError, VaultConfig};
pub use gesture::{DoubleTapTimer, TapAction};
pub use logging::{default_log_level, init_from_config, init_logging, logging_status, LoggingError};
pub use model::material::{Annotation, AnnotationKind, Material, MaterialError, MaterialId};
pub use model::theme::{Season, ThemeConfig, ThemeMode, ThemeOverride};
pub use persist::storage::{LoadOutcome, StorageError, VaultStorage, WritePolicy};
pub use repo::slot_repo::{RepoError, RepoResult, SlotRepository, SqliteSlotRepository};
pub use search::filter::{CategoryFilter, MaterialCard, MaterialFilter};
pub use service::material_service::{
    AppliedSuggestion, GroupField, MaterialDraft, MaterialStore, OutlineGroup,
};
pub use service::taxonomy_service::{Taxonomy, TaxonomyKind, TaxonomyList};
pub use service::theme_service::resolve as resolve_theme;
pub use service::vault::{TapEffect, Vault, VaultError, VaultResult};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
