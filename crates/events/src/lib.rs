//! # Strata Events
//!
//! This crate defines the observable events emitted by the vault after every
//! successful state change, and the append-only `EventLog` that records them.
//!
//! As a Layer 0 crate, it depends only on `core-types` and provides the definitive
//! language external indexers and monitoring tools consume.

// Declare the modules that make up this crate.
pub mod error;
pub mod messages;

// Re-export the core types to provide a clean public API.
pub use error::EventsError;
pub use messages::{EventLog, EventRecord, VaultEvent};
