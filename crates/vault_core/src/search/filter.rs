//! Material filtering and list projections.
//!
//! # Invariants
//! - Filtering is pure: same collection and filter give the same output.
//! - Matches keep the relative order of the underlying collection.

use crate::model::material::{Material, MaterialId};
use once_cell::sync::Lazy;
use regex::Regex;

/// Sentinel accepted by `CategoryFilter::parse` for "every category".
pub const ALL_CATEGORIES: &str = "all";

const PREVIEW_MAX_CHARS: usize = 100;
const CARD_MAX_TAGS: usize = 3;

static WHITESPACE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("valid ws regex"));

/// Category constraint of a filter.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum CategoryFilter {
    #[default]
    All,
    Only(String),
}

impl CategoryFilter {
    /// Maps the `"all"` sentinel to `All`, any other value to an exact match.
    pub fn parse(value: &str) -> Self {
        if value == ALL_CATEGORIES {
            Self::All
        } else {
            Self::Only(value.to_string())
        }
    }

    fn matches(&self, category: &str) -> bool {
        match self {
            Self::All => true,
            Self::Only(expected) => expected == category,
        }
    }
}

/// Filter inputs of the main list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MaterialFilter {
    /// Case-insensitive substring of title+content. Empty matches everything.
    pub query: String,
    pub category: CategoryFilter,
    pub key_points_only: bool,
}

impl MaterialFilter {
    pub fn new(query: impl Into<String>, category: &str, key_points_only: bool) -> Self {
        Self {
            query: query.into(),
            category: CategoryFilter::parse(category),
            key_points_only,
        }
    }

    /// Returns whether `material` passes all three predicates.
    pub fn matches(&self, material: &Material) -> bool {
        self.matches_with_needle(material, &self.query.to_lowercase())
    }

    fn matches_with_needle(&self, material: &Material, needle: &str) -> bool {
        (!self.key_points_only || material.is_key_point)
            && self.category.matches(&material.category)
            && (needle.is_empty()
                || material
                    .searchable_text()
                    .to_lowercase()
                    .contains(needle))
    }
}

/// Applies `filter` over `materials`, preserving order.
pub fn filter_materials<'a>(materials: &'a [Material], filter: &MaterialFilter) -> Vec<&'a Material> {
    let needle = filter.query.to_lowercase();
    materials
        .iter()
        .filter(|material| filter.matches_with_needle(material, &needle))
        .collect()
}

/// Compact projection for list rendering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MaterialCard {
    pub id: MaterialId,
    pub title: String,
    /// Whitespace-collapsed content, at most 100 characters.
    pub preview: String,
    pub category: String,
    pub domain: String,
    /// First three tags.
    pub tags: Vec<String>,
    pub is_key_point: bool,
}

impl MaterialCard {
    pub fn from_material(material: &Material) -> Self {
        Self {
            id: material.id.clone(),
            title: material.title.clone(),
            preview: derive_preview(&material.content),
            category: material.category.clone(),
            domain: material.domain.clone(),
            tags: material.tags.iter().take(CARD_MAX_TAGS).cloned().collect(),
            is_key_point: material.is_key_point,
        }
    }
}

/// Collapses whitespace runs and keeps the first 100 characters.
pub fn derive_preview(content: &str) -> String {
    let collapsed = WHITESPACE_RE.replace_all(content.trim(), " ");
    collapsed.chars().take(PREVIEW_MAX_CHARS).collect()
}

#[cfg(test)]
mod tests {
    use super::{derive_preview, CategoryFilter, MaterialFilter};
    use crate::model::material::Material;

    #[test]
    fn parse_maps_sentinel() {
        assert_eq!(CategoryFilter::parse("all"), CategoryFilter::All);
        assert_eq!(
            CategoryFilter::parse("All"),
            CategoryFilter::Only("All".to_string())
        );
    }

    #[test]
    fn query_matches_across_title_content_boundary() {
        let material = Material::new("Hel", "lo there", "案例", "生态");
        assert!(MaterialFilter::new("HELLO", "all", false).matches(&material));
    }

    #[test]
    fn key_point_filter_excludes_unflagged() {
        let mut material = Material::new("t", "c", "案例", "生态");
        let filter = MaterialFilter::new("", "all", true);
        assert!(!filter.matches(&material));
        material.toggle_key_point();
        assert!(filter.matches(&material));
    }

    #[test]
    fn preview_collapses_whitespace_and_truncates() {
        let preview = derive_preview("  a\n\n b\tc  ");
        assert_eq!(preview, "a b c");
        let long = "字".repeat(150);
        assert_eq!(derive_preview(&long).chars().count(), 100);
    }
}
