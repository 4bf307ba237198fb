use thiserror::Error;

use crate::domain::invariants::Violation;

/// Core error type for the slot layout engine
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LayoutError {
    /// Referenced slot does not exist in the current snapshot
    #[error("Slot not found: {0}")]
    SlotNotFound(String),

    /// A slot with the requested id already exists
    #[error("Slot already exists: {0}")]
    DuplicateSlot(String),

    /// Parent is missing or cannot own children
    #[error("Invalid parent: {0}")]
    InvalidParent(String),

    /// Move target is the slot itself or one of its descendants
    #[error("cannot move into own descendant")]
    MoveIntoDescendant {
        /// Slot being moved
        slot_id: String,
        /// Requested new parent
        target_id: String,
    },

    /// Reorder id list does not match the current children
    #[error("Reorder mismatch: {0}")]
    ReorderMismatch(String),

    /// Committing the result would break a tree invariant
    #[error("Invariant violation: {}", join_violations(.0))]
    InvariantViolation(Vec<Violation>),

    /// Slot limit reached
    #[error("Slot limit reached: {0}")]
    SlotLimitReached(usize),

    /// Unknown or malformed operation kind
    #[error("unsupported command: {0}")]
    UnsupportedCommand(String),

    /// Required command parameter is absent
    #[error("Missing parameter: {0}")]
    MissingParameter(String),

    /// Command parameter failed a type or range check
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// Command batch exceeds the configured maximum
    #[error("Batch too large: {size} commands (max {max})")]
    BatchTooLarge {
        /// Submitted batch size
        size: usize,
        /// Configured maximum
        max: usize,
    },

    /// No command batch is available to undo
    #[error("Nothing to undo")]
    NothingToUndo,

    /// Configuration record not found
    #[error("Configuration not found: {0}")]
    ConfigurationNotFound(String),

    /// Persistence collaborator failed
    #[error("Persistence error: {0}")]
    Persistence(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Engine configuration error
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl LayoutError {
    /// Whether the error came from the persistence collaborator
    pub fn is_persistence(&self) -> bool {
        matches!(
            self,
            LayoutError::Persistence(_) | LayoutError::ConfigurationNotFound(_)
        )
    }
}

fn join_violations(violations: &[Violation]) -> String {
    violations
        .iter()
        .map(|v| v.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

impl From<serde_json::Error> for LayoutError {
    fn from(err: serde_json::Error) -> Self {
        LayoutError::Serialization(err.to_string())
    }
}

impl From<String> for LayoutError {
    fn from(err: String) -> Self {
        LayoutError::Other(err)
    }
}

impl From<&str> for LayoutError {
    fn from(err: &str) -> Self {
        LayoutError::Other(err.to_string())
    }
}
