//! Taxonomy store: the category and domain lists.
//!
//! # Responsibility
//! - Own two independent ordered lists of unique names.
//! - Reject empty and duplicate additions without raising errors.
//!
//! # Invariants
//! - Entries are unique (exact, case-sensitive match) and never empty.
//! - Order is append order minus removals; lists are never re-sorted.
//! - Removing an entry never touches materials that reference it.

use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashSet;

/// Starter category list used when no stored list is readable.
pub const DEFAULT_CATEGORIES: [&str; 5] = ["案例", "人物", "金句", "文件", "其他"];
/// Starter domain list used when no stored list is readable.
pub const DEFAULT_DOMAINS: [&str; 6] = ["生态", "环境", "经济", "税务", "政治", "科技"];

/// One ordered, duplicate-free list of names.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct TaxonomyList {
    entries: Vec<String>,
}

impl TaxonomyList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a list from arbitrary input, dropping empty and later duplicate entries.
    pub fn from_entries<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut list = Self::new();
        for entry in entries {
            list.add(entry);
        }
        list
    }

    /// Appends `name` unless it is empty or already present (exact match).
    ///
    /// Returns whether the list changed.
    pub fn add(&mut self, name: impl Into<String>) -> bool {
        let name = name.into();
        if name.is_empty() || self.contains(&name) {
            return false;
        }
        self.entries.push(name);
        true
    }

    /// Removes the exact match for `name`. Returns whether the list changed.
    pub fn remove(&mut self, name: &str) -> bool {
        match self.entries.iter().position(|entry| entry == name) {
            Some(index) => {
                self.entries.remove(index);
                true
            }
            None => false,
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.iter().any(|entry| entry == name)
    }

    pub fn first(&self) -> Option<&str> {
        self.entries.first().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(String::as_str)
    }

    pub fn as_slice(&self) -> &[String] {
        &self.entries
    }
}

impl<'de> Deserialize<'de> for TaxonomyList {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = Vec::<String>::deserialize(deserializer)?;
        let mut seen = HashSet::with_capacity(raw.len());
        let entries = raw
            .into_iter()
            .filter(|entry| !entry.is_empty() && seen.insert(entry.clone()))
            .collect();
        Ok(Self { entries })
    }
}

/// Which of the two taxonomy lists an operation targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TaxonomyKind {
    Category,
    Domain,
}

impl TaxonomyKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Category => "category",
            Self::Domain => "domain",
        }
    }
}

/// The pair of lists governing allowed classification values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Taxonomy {
    pub categories: TaxonomyList,
    pub domains: TaxonomyList,
}

impl Taxonomy {
    pub fn new(categories: TaxonomyList, domains: TaxonomyList) -> Self {
        Self {
            categories,
            domains,
        }
    }

    pub fn default_categories() -> TaxonomyList {
        TaxonomyList::from_entries(DEFAULT_CATEGORIES)
    }

    pub fn default_domains() -> TaxonomyList {
        TaxonomyList::from_entries(DEFAULT_DOMAINS)
    }

    pub fn list(&self, kind: TaxonomyKind) -> &TaxonomyList {
        match kind {
            TaxonomyKind::Category => &self.categories,
            TaxonomyKind::Domain => &self.domains,
        }
    }

    pub fn list_mut(&mut self, kind: TaxonomyKind) -> &mut TaxonomyList {
        match kind {
            TaxonomyKind::Category => &mut self.categories,
            TaxonomyKind::Domain => &mut self.domains,
        }
    }

    pub fn add_category(&mut self, name: impl Into<String>) -> bool {
        self.categories.add(name)
    }

    pub fn remove_category(&mut self, name: &str) -> bool {
        self.categories.remove(name)
    }

    pub fn add_domain(&mut self, name: impl Into<String>) -> bool {
        self.domains.add(name)
    }

    pub fn remove_domain(&mut self, name: &str) -> bool {
        self.domains.remove(name)
    }
}

impl Default for Taxonomy {
    fn default() -> Self {
        Self::new(Self::default_categories(), Self::default_domains())
    }
}
