//! AI classification boundary.
//!
//! # Responsibility
//! - Ask an external model for a category/domain/tags suggestion.
//! - Turn every failure (transport, status, parse, timeout) into
//!   "no suggestion" for the core.
//!
//! # Invariants
//! - At most one suggestion request is in flight per `SmartTagger`.
//! - A suggestion never mutates vault state by itself.

pub mod smart_tag;
pub mod tagger;
