//! Persistence adapter over the slot repository.
//!
//! # Responsibility
//! - Encode values into versioned slot envelopes and decode them back.
//! - Fall back to caller-supplied defaults for absent or unreadable slots.
//! - Apply the configured write-failure policy.
//!
//! # Invariants
//! - `load` never returns an error.
//! - Every write uses the current envelope version.

pub mod envelope;
pub mod storage;
