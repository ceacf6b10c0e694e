//! Material store.
//!
//! # Responsibility
//! - Own the material collection in newest-first order.
//! - Create, delete and toggle key points; expose filtered and grouped views.
//!
//! # Invariants
//! - New materials are prepended; position 0 is always the newest.
//! - Creation requires non-empty content and current taxonomy members.
//! - Delete/toggle on an unknown id are no-ops.
//! - Toggling a key point changes no other field.

use crate::ai::tagger::TagSuggestion;
use crate::model::material::{Material, MaterialError, MaterialId};
use crate::search::filter::{filter_materials, MaterialCard, MaterialFilter};
use crate::service::taxonomy_service::{Taxonomy, TaxonomyKind};
use std::collections::HashMap;

/// Fallback preselection when a taxonomy list is empty.
const FALLBACK_CLASSIFICATION: &str = "其他";

/// Editor state for a material that has not been created yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MaterialDraft {
    pub title: String,
    pub content: String,
    pub category: String,
    pub domain: String,
}

/// Which suggested values were applied to a draft.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AppliedSuggestion {
    pub category_applied: bool,
    pub domain_applied: bool,
}

impl MaterialDraft {
    /// Empty draft preselecting the first category and first domain.
    pub fn new(taxonomy: &Taxonomy) -> Self {
        Self {
            title: String::new(),
            content: String::new(),
            category: taxonomy
                .categories
                .first()
                .unwrap_or(FALLBACK_CLASSIFICATION)
                .to_string(),
            domain: taxonomy
                .domains
                .first()
                .unwrap_or(FALLBACK_CLASSIFICATION)
                .to_string(),
        }
    }

    pub fn with_text(mut self, title: impl Into<String>, content: impl Into<String>) -> Self {
        self.title = title.into();
        self.content = content.into();
        self
    }

    /// Copies suggested category/domain into the draft when each is a
    /// current taxonomy member. Unknown values are ignored, tags are never
    /// attached.
    pub fn apply_suggestion(
        &mut self,
        suggestion: &TagSuggestion,
        taxonomy: &Taxonomy,
    ) -> AppliedSuggestion {
        let mut applied = AppliedSuggestion::default();
        if taxonomy.categories.contains(&suggestion.category) {
            self.category = suggestion.category.clone();
            applied.category_applied = true;
        }
        if taxonomy.domains.contains(&suggestion.domain) {
            self.domain = suggestion.domain.clone();
            applied.domain_applied = true;
        }
        applied
    }
}

/// Field used to bucket materials in the outline view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupField {
    Category,
    Domain,
}

impl GroupField {
    fn value_of(self, material: &Material) -> &str {
        match self {
            Self::Category => &material.category,
            Self::Domain => &material.domain,
        }
    }

    fn taxonomy_kind(self) -> TaxonomyKind {
        match self {
            Self::Category => TaxonomyKind::Category,
            Self::Domain => TaxonomyKind::Domain,
        }
    }
}

/// One non-empty outline bucket.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutlineGroup<'a> {
    pub name: String,
    /// Members in collection order (newest first).
    pub materials: Vec<&'a Material>,
}

/// Newest-first material collection.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MaterialStore {
    materials: Vec<Material>,
}

impl MaterialStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wraps an already ordered collection (e.g. loaded from storage).
    pub fn from_materials(materials: Vec<Material>) -> Self {
        Self { materials }
    }

    /// Validates `draft` and prepends the new material.
    ///
    /// # Errors
    /// - `EmptyContent` when content is empty.
    /// - `UnknownCategory` / `UnknownDomain` when the value is not a member
    ///   of the current taxonomy.
    pub fn create(
        &mut self,
        taxonomy: &Taxonomy,
        draft: MaterialDraft,
    ) -> Result<&Material, MaterialError> {
        if draft.content.is_empty() {
            return Err(MaterialError::EmptyContent);
        }
        if !taxonomy.categories.contains(&draft.category) {
            return Err(MaterialError::UnknownCategory(draft.category));
        }
        if !taxonomy.domains.contains(&draft.domain) {
            return Err(MaterialError::UnknownDomain(draft.domain));
        }

        let material = Material::new(draft.title, draft.content, draft.category, draft.domain);
        self.materials.insert(0, material);
        Ok(&self.materials[0])
    }

    /// Removes the material with `id`. Returns whether anything was removed.
    pub fn delete(&mut self, id: &MaterialId) -> bool {
        let before = self.materials.len();
        self.materials.retain(|material| &material.id != id);
        self.materials.len() != before
    }

    /// Flips `is_key_point` on the matching material.
    ///
    /// Returns the new flag value, or `None` when no material has `id`.
    pub fn toggle_key_point(&mut self, id: &MaterialId) -> Option<bool> {
        self.materials
            .iter_mut()
            .find(|material| &material.id == id)
            .map(Material::toggle_key_point)
    }

    pub fn get(&self, id: &MaterialId) -> Option<&Material> {
        self.materials.iter().find(|material| &material.id == id)
    }

    pub fn filter(&self, filter: &MaterialFilter) -> Vec<&Material> {
        filter_materials(&self.materials, filter)
    }

    /// Buckets the full collection by `field`, following taxonomy order.
    ///
    /// Entries without members yield no bucket. Materials whose value is not
    /// in the taxonomy are not listed.
    pub fn group_by(&self, field: GroupField, taxonomy: &Taxonomy) -> Vec<OutlineGroup<'_>> {
        taxonomy
            .list(field.taxonomy_kind())
            .iter()
            .filter_map(|name| {
                let members: Vec<&Material> = self
                    .materials
                    .iter()
                    .filter(|material| field.value_of(material) == name)
                    .collect();
                (!members.is_empty()).then(|| OutlineGroup {
                    name: name.to_string(),
                    materials: members,
                })
            })
            .collect()
    }

    /// Number of materials per value of `field`, orphaned values included.
    pub fn count_by(&self, field: GroupField) -> HashMap<String, usize> {
        let mut counts = HashMap::new();
        for material in &self.materials {
            *counts
                .entry(field.value_of(material).to_string())
                .or_insert(0) += 1;
        }
        counts
    }

    pub fn cards(&self, filter: &MaterialFilter) -> Vec<MaterialCard> {
        self.filter(filter)
            .into_iter()
            .map(MaterialCard::from_material)
            .collect()
    }

    pub fn len(&self) -> usize {
        self.materials.len()
    }

    pub fn is_empty(&self) -> bool {
        self.materials.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Material> {
        self.materials.iter()
    }

    pub fn as_slice(&self) -> &[Material] {
        &self.materials
    }
}
