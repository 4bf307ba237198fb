/// Slot records and identifiers
pub mod slot;

/// Immutable layout snapshot
pub mod tree;

/// Structural invariant checks
pub mod invariants;

/// Copy-on-write tree mutations
pub mod mutation;

/// Externally-issued structured commands
pub mod command;

/// Default page templates
pub mod template;

/// Draft and published configuration records
pub mod configuration;

/// Domain events
pub mod events;

/// Repository interfaces
pub mod repository;
