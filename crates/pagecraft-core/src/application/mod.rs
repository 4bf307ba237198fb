use crate::domain::events::{DomainEvent, LayoutEventHandler};
use tracing::warn;

/// Batch command execution
pub mod command_processor;

/// Debounced draft persistence
pub mod autosave;

/// Draft and publish lifecycle
pub mod configuration_service;

/// Host-owned editing session
pub mod editor_session;

/// Deliver an event; handler failures are logged, never propagated
pub(crate) async fn emit(handler: &dyn LayoutEventHandler, event: Box<dyn DomainEvent>) {
    let event_type = event.event_type();
    if let Err(err) = handler.handle_event(event).await {
        warn!(event_type, error = %err, "Event handler failed");
    }
}
