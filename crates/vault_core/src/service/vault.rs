//! Application state: the single writer over materials, taxonomy and theme.
//!
//! # Responsibility
//! - Hold the four persisted values plus the session-only season.
//! - Route every mutation through its store and re-save all slots after it.
//!
//! # Invariants
//! - A mutation that changed state is followed by `save_all` before the
//!   call returns; no-op mutations write nothing.
//! - Saves run on the caller, in mutation order.
//! - Under `WritePolicy::Strict` a failed save is returned, but the
//!   in-memory change is kept and is written by the next successful save.

use crate::config::VaultConfig;
use crate::db::{open_db, open_db_in_memory, DbError};
use crate::gesture::TapAction;
use crate::model::material::{Material, MaterialError, MaterialId};
use crate::model::theme::{Season, ThemeConfig, ThemeMode, ThemeOverride};
use crate::persist::storage::{keys, SlotSnapshot, StorageError, VaultStorage, WritePolicy};
use crate::repo::slot_repo::{SlotRepository, SqliteSlotRepository};
use crate::search::filter::{MaterialCard, MaterialFilter};
use crate::service::material_service::{GroupField, MaterialDraft, MaterialStore, OutlineGroup};
use crate::service::taxonomy_service::{Taxonomy, TaxonomyKind, TaxonomyList};
use crate::service::theme_service;
use log::info;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type VaultResult<T> = Result<T, VaultError>;

#[derive(Debug)]
pub enum VaultError {
    Db(DbError),
    Storage(StorageError),
    Material(MaterialError),
}

impl Display for VaultError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::Storage(err) => write!(f, "{err}"),
            Self::Material(err) => write!(f, "{err}"),
        }
    }
}

impl Error for VaultError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::Storage(err) => Some(err),
            Self::Material(err) => Some(err),
        }
    }
}

impl From<DbError> for VaultError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<StorageError> for VaultError {
    fn from(value: StorageError) -> Self {
        Self::Storage(value)
    }
}

impl From<MaterialError> for VaultError {
    fn from(value: MaterialError) -> Self {
        Self::Material(value)
    }
}

/// What the create/season control resolved to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TapEffect {
    /// Open the editor with this preselected draft.
    OpenEditor(MaterialDraft),
    /// The season advanced to this value.
    SeasonChanged(Season),
}

pub struct Vault<R: SlotRepository> {
    storage: VaultStorage<R>,
    materials: MaterialStore,
    taxonomy: Taxonomy,
    theme: ThemeConfig,
    season: Season,
}

impl Vault<SqliteSlotRepository> {
    /// Opens the configured database (in memory when no path is set) and
    /// loads all slots.
    pub fn open(config: &VaultConfig) -> VaultResult<Self> {
        let conn = match config.db_path.as_deref() {
            Some(path) => open_db(path)?,
            None => open_db_in_memory()?,
        };
        let storage = VaultStorage::new(SqliteSlotRepository::new(conn), config.write_policy);
        Ok(Self::load(storage))
    }

    pub fn open_in_memory() -> VaultResult<Self> {
        let storage = VaultStorage::new(
            SqliteSlotRepository::new(open_db_in_memory()?),
            WritePolicy::BestEffort,
        );
        Ok(Self::load(storage))
    }
}

impl<R: SlotRepository> Vault<R> {
    /// Loads every slot, substituting defaults for unusable ones.
    pub fn load(storage: VaultStorage<R>) -> Self {
        let materials: Vec<Material> = storage.load(keys::MATERIALS, Vec::new());
        let categories = storage.load(keys::CATEGORIES, Taxonomy::default_categories());
        let domains = storage.load(keys::DOMAINS, Taxonomy::default_domains());
        let theme = storage.load(keys::THEME, ThemeConfig::default());

        info!(
            "event=vault_load module=vault status=ok materials={} categories={} domains={} theme={}",
            materials.len(),
            categories.len(),
            domains.len(),
            theme.mode.as_str()
        );

        Self {
            storage,
            materials: MaterialStore::from_materials(materials),
            taxonomy: Taxonomy::new(categories, domains),
            theme,
            season: Season::default(),
        }
    }

    pub fn storage(&self) -> &VaultStorage<R> {
        &self.storage
    }

    pub fn materials(&self) -> &MaterialStore {
        &self.materials
    }

    pub fn taxonomy(&self) -> &Taxonomy {
        &self.taxonomy
    }

    pub fn theme(&self) -> &ThemeConfig {
        &self.theme
    }

    pub fn season(&self) -> Season {
        self.season
    }

    /// Theme tokens after the seasonal overlay.
    pub fn effective_theme(&self) -> ThemeConfig {
        theme_service::resolve(&self.theme, self.season)
    }

    pub fn filter(&self, filter: &MaterialFilter) -> Vec<&Material> {
        self.materials.filter(filter)
    }

    pub fn cards(&self, filter: &MaterialFilter) -> Vec<MaterialCard> {
        self.materials.cards(filter)
    }

    pub fn outline(&self, field: GroupField) -> Vec<OutlineGroup<'_>> {
        self.materials.group_by(field, &self.taxonomy)
    }

    pub fn new_draft(&self) -> MaterialDraft {
        MaterialDraft::new(&self.taxonomy)
    }

    pub fn add_category(&mut self, name: impl Into<String>) -> VaultResult<bool> {
        self.add_entry(TaxonomyKind::Category, name.into())
    }

    pub fn remove_category(&mut self, name: &str) -> VaultResult<bool> {
        self.remove_entry(TaxonomyKind::Category, name)
    }

    pub fn add_domain(&mut self, name: impl Into<String>) -> VaultResult<bool> {
        self.add_entry(TaxonomyKind::Domain, name.into())
    }

    pub fn remove_domain(&mut self, name: &str) -> VaultResult<bool> {
        self.remove_entry(TaxonomyKind::Domain, name)
    }

    /// Validates and prepends a material built from `draft`.
    pub fn create_material(&mut self, draft: MaterialDraft) -> VaultResult<MaterialId> {
        let id = match self.materials.create(&self.taxonomy, draft) {
            Ok(material) => material.id.clone(),
            Err(err) => {
                info!("event=material_create module=vault status=skip reason={err}");
                return Err(err.into());
            }
        };
        info!(
            "event=material_create module=vault status=ok material_id={id} total={}",
            self.materials.len()
        );
        self.persist()?;
        Ok(id)
    }

    /// Deletes by id. Unknown ids are a no-op returning `false`.
    pub fn delete_material(&mut self, id: &MaterialId) -> VaultResult<bool> {
        let removed = self.materials.delete(id);
        self.finish("material_delete", removed)?;
        Ok(removed)
    }

    /// Flips the key-point flag. Returns the new value, `None` for unknown ids.
    pub fn toggle_key_point(&mut self, id: &MaterialId) -> VaultResult<Option<bool>> {
        let flag = self.materials.toggle_key_point(id);
        self.finish("material_toggle_key_point", flag.is_some())?;
        Ok(flag)
    }

    /// Replaces the stored theme config.
    pub fn set_theme(&mut self, theme: ThemeConfig) -> VaultResult<bool> {
        let changed = self.theme != theme;
        self.theme = theme;
        self.finish("theme_set", changed)?;
        Ok(changed)
    }

    /// Replaces the theme with a built-in preset.
    pub fn select_preset(&mut self, mode: ThemeMode) -> VaultResult<bool> {
        self.set_theme(ThemeConfig::preset(mode))
    }

    /// Applies individual token edits, switching the mode to custom.
    pub fn customize_theme(&mut self, edit: &ThemeOverride) -> VaultResult<bool> {
        let mut theme = self.theme.clone();
        theme.apply(edit);
        self.set_theme(theme)
    }

    /// Advances the session season. Not persisted.
    pub fn cycle_season(&mut self) -> Season {
        self.season = self.season.next();
        self.season
    }

    pub fn set_season(&mut self, season: Season) {
        self.season = season;
    }

    /// Maps a resolved activation of the create/season control to its effect.
    pub fn apply_tap(&mut self, action: TapAction) -> TapEffect {
        match action {
            TapAction::Primary => TapEffect::OpenEditor(self.new_draft()),
            TapAction::Secondary => TapEffect::SeasonChanged(self.cycle_season()),
        }
    }

    /// Writes all four slots now, regardless of pending changes.
    pub fn persist(&self) -> VaultResult<()> {
        let snapshot = SlotSnapshot {
            materials: self.materials.as_slice(),
            categories: self.taxonomy.categories.as_slice(),
            domains: self.taxonomy.domains.as_slice(),
            theme: &self.theme,
        };
        self.storage.save_all(&snapshot)?;
        Ok(())
    }

    fn add_entry(&mut self, kind: TaxonomyKind, name: String) -> VaultResult<bool> {
        let changed = self.taxonomy.list_mut(kind).add(name);
        self.finish_taxonomy("taxonomy_add", kind, changed)?;
        Ok(changed)
    }

    fn remove_entry(&mut self, kind: TaxonomyKind, name: &str) -> VaultResult<bool> {
        let changed = self.taxonomy.list_mut(kind).remove(name);
        self.finish_taxonomy("taxonomy_remove", kind, changed)?;
        Ok(changed)
    }

    fn finish_taxonomy(&self, event: &str, kind: TaxonomyKind, changed: bool) -> VaultResult<()> {
        let list: &TaxonomyList = self.taxonomy.list(kind);
        info!(
            "event={event} module=vault status={} kind={} count={}",
            if changed { "ok" } else { "skip" },
            kind.as_str(),
            list.len()
        );
        if changed {
            self.persist()?;
        }
        Ok(())
    }

    fn finish(&self, event: &str, changed: bool) -> VaultResult<()> {
        if !changed {
            info!("event={event} module=vault status=skip");
            return Ok(());
        }
        info!(
            "event={event} module=vault status=ok total={}",
            self.materials.len()
        );
        self.persist()
    }
}
