//! Material domain model.
//!
//! # Responsibility
//! - Define the captured-note record and its inert annotation spans.
//! - Generate identity and creation timestamp for new materials.
//!
//! # Invariants
//! - `id` and `created_at` never change after creation.
//! - `tags` holds no duplicates; insertion order is kept.
//! - `content` of a newly created material is never empty.

use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashSet;
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Opaque material identifier.
///
/// New ids are UUID v4 strings; ids read back from older slot values may be
/// any non-empty string, so the inner value is not parsed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MaterialId(String);

impl MaterialId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for MaterialId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for MaterialId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for MaterialId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// Visual style of an annotation span.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnnotationKind {
    Highlight,
    Underline,
}

/// Span annotation over `Material::content`.
///
/// Carried through load/save untouched; no operation creates or edits these.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Annotation {
    pub id: String,
    /// Start offset into the material content.
    pub start: usize,
    /// End offset into the material content.
    pub end: usize,
    #[serde(rename = "type")]
    pub kind: AnnotationKind,
    pub color: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    /// Snapshot of the annotated text.
    #[serde(default)]
    pub text: String,
}

/// One captured note with its classification metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Material {
    pub id: MaterialId,
    #[serde(default)]
    pub title: String,
    pub content: String,
    /// Category name at creation time. May no longer be in the taxonomy.
    pub category: String,
    /// Domain name at creation time. May no longer be in the taxonomy.
    pub domain: String,
    #[serde(default, deserialize_with = "deserialize_tags")]
    pub tags: Vec<String>,
    #[serde(default)]
    pub annotations: Vec<Annotation>,
    /// RFC 3339 UTC timestamp with millisecond precision.
    pub created_at: String,
    #[serde(default)]
    pub is_key_point: bool,
}

impl Material {
    /// Creates a material with a generated id and the current timestamp.
    ///
    /// Tags and annotations start empty and the key-point flag starts unset.
    /// Callers validate content and taxonomy membership beforehand.
    pub fn new(
        title: impl Into<String>,
        content: impl Into<String>,
        category: impl Into<String>,
        domain: impl Into<String>,
    ) -> Self {
        Self {
            id: MaterialId::generate(),
            title: title.into(),
            content: content.into(),
            category: category.into(),
            domain: domain.into(),
            tags: Vec::new(),
            annotations: Vec::new(),
            created_at: now_timestamp(),
            is_key_point: false,
        }
    }

    /// Flips the key-point flag and returns the new value.
    pub fn toggle_key_point(&mut self) -> bool {
        self.is_key_point = !self.is_key_point;
        self.is_key_point
    }

    /// Text used by free-text search: title immediately followed by content.
    pub fn searchable_text(&self) -> String {
        let mut text = String::with_capacity(self.title.len() + self.content.len());
        text.push_str(&self.title);
        text.push_str(&self.content);
        text
    }
}

/// Validation failures for material creation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MaterialError {
    /// Content is empty or whitespace only.
    EmptyContent,
    /// Category is not in the current category list.
    UnknownCategory(String),
    /// Domain is not in the current domain list.
    UnknownDomain(String),
}

impl Display for MaterialError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyContent => write!(f, "material content must not be empty"),
            Self::UnknownCategory(name) => write!(f, "category `{name}` is not in the taxonomy"),
            Self::UnknownDomain(name) => write!(f, "domain `{name}` is not in the taxonomy"),
        }
    }
}

impl Error for MaterialError {}

fn now_timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

fn deserialize_tags<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Vec::<String>::deserialize(deserializer)?;
    let mut seen = HashSet::with_capacity(raw.len());
    Ok(raw.into_iter().filter(|tag| seen.insert(tag.clone())).collect())
}
