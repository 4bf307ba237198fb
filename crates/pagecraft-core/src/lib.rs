//!
//! Pagecraft Core - slot layout engine for storefront page builders
//!
//! This crate holds the layout tree model, its structural invariants, the
//! copy-on-write mutation operations, the command processor used by both the
//! visual editor and the AI assistant, and the draft/publish lifecycle.
//! Storage is reached only through the repository traits in
//! [`domain::repository`].

#![forbid(unsafe_code)]
#![warn(missing_docs)]

/// Domain layer - layout tree, mutations, commands and lifecycle records
pub mod domain;

/// Application services - command execution, sessions and persistence flow
pub mod application;

/// Engine configuration
pub mod config;

/// Error types
pub mod error;

/// Tracing setup
pub mod telemetry;

// Re-export key types
pub use config::EngineConfig;
pub use error::LayoutError;

// Re-export main API types for easy use
pub use application::autosave::DraftAutosaver;
pub use application::command_processor::{BatchOutcome, CommandError, CommandProcessor};
pub use application::configuration_service::ConfigurationService;
pub use application::editor_session::EditorSession;
pub use domain::command::{CommandKind, LayoutCommand};
pub use domain::configuration::{
    ConfigurationId, ConfigurationStatus, PageType, SlotConfiguration, TenantId,
};
pub use domain::events::{DomainEvent, LayoutEventHandler, NoopEventHandler};
pub use domain::invariants::Violation;
pub use domain::mutation::{CreateOptions, Mutation, SlotPatch};
pub use domain::repository::ConfigurationRepository;
pub use domain::slot::{Slot, SlotId, SlotKind, SlotType, GRID_COLUMNS};
pub use domain::template::{BuiltinTemplates, TemplateProvider};
pub use domain::tree::LayoutSnapshot;
