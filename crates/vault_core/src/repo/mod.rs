//! Repository layer for durable slot storage.
//!
//! # Responsibility
//! - Define the key-value contract the persistence adapter writes through.
//! - Keep SQL details inside the storage boundary.
//!
//! # Invariants
//! - Slot keys are non-blank.
//! - Multi-slot writes are atomic.

pub mod slot_repo;
