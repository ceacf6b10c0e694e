//! Read-side views over the material collection.
//!
//! # Responsibility
//! - Free-text/category/key-point filtering.
//! - List-card projection with a short plain-text preview.

pub mod filter;
