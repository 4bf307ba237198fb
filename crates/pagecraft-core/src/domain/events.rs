use crate::domain::configuration::{ConfigurationId, PageType, TenantId};
use crate::LayoutError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::fmt::Debug;

/// Domain event trait for all lifecycle events
pub trait DomainEvent: Debug + Send + Sync {
    /// Returns the type of the event as a string
    fn event_type(&self) -> &'static str;

    /// Tenant the event belongs to
    fn tenant_id(&self) -> &TenantId;

    /// Page type the event belongs to
    fn page_type(&self) -> &PageType;

    /// Returns the timestamp when the event occurred
    fn timestamp(&self) -> DateTime<Utc>;
}

macro_rules! layout_event {
    ($name:ident, $event_type:literal) => {
        impl DomainEvent for $name {
            fn event_type(&self) -> &'static str {
                $event_type
            }

            fn tenant_id(&self) -> &TenantId {
                &self.tenant_id
            }

            fn page_type(&self) -> &PageType {
                &self.page_type
            }

            fn timestamp(&self) -> DateTime<Utc> {
                self.timestamp
            }
        }
    };
}

/// Event: first load created a draft from the default template
#[derive(Debug, Clone)]
pub struct DraftCreated {
    /// Tenant
    pub tenant_id: TenantId,
    /// Page type
    pub page_type: PageType,
    /// New draft
    pub configuration_id: ConfigurationId,
    /// When it happened
    pub timestamp: DateTime<Utc>,
}

layout_event!(DraftCreated, "draft.created");

/// Event: an existing draft was loaded
#[derive(Debug, Clone)]
pub struct DraftLoaded {
    /// Tenant
    pub tenant_id: TenantId,
    /// Page type
    pub page_type: PageType,
    /// Loaded draft
    pub configuration_id: ConfigurationId,
    /// Revision at load time
    pub revision: u64,
    /// When it happened
    pub timestamp: DateTime<Utc>,
}

layout_event!(DraftLoaded, "draft.loaded");

/// Event: a stored draft was invalid and replaced by the default template
#[derive(Debug, Clone)]
pub struct DraftFallback {
    /// Tenant
    pub tenant_id: TenantId,
    /// Page type
    pub page_type: PageType,
    /// Draft that was replaced
    pub configuration_id: ConfigurationId,
    /// Why the stored tree was rejected
    pub reason: String,
    /// When it happened
    pub timestamp: DateTime<Utc>,
}

layout_event!(DraftFallback, "draft.fallback");

/// Event: a draft revision was persisted
#[derive(Debug, Clone)]
pub struct DraftSaved {
    /// Tenant
    pub tenant_id: TenantId,
    /// Page type
    pub page_type: PageType,
    /// Saved draft
    pub configuration_id: ConfigurationId,
    /// Persisted revision
    pub revision: u64,
    /// When it happened
    pub timestamp: DateTime<Utc>,
}

layout_event!(DraftSaved, "draft.saved");

/// Event: a command batch was applied in an editor session
#[derive(Debug, Clone)]
pub struct BatchApplied {
    /// Tenant
    pub tenant_id: TenantId,
    /// Page type
    pub page_type: PageType,
    /// Commands that took effect
    pub executed_count: usize,
    /// Commands that were rejected
    pub failed_count: usize,
    /// Draft revision after the batch
    pub revision: u64,
    /// When it happened
    pub timestamp: DateTime<Utc>,
}

layout_event!(BatchApplied, "batch.applied");

/// Event: the last command batch was undone
#[derive(Debug, Clone)]
pub struct BatchUndone {
    /// Tenant
    pub tenant_id: TenantId,
    /// Page type
    pub page_type: PageType,
    /// Draft revision after the undo
    pub revision: u64,
    /// When it happened
    pub timestamp: DateTime<Utc>,
}

layout_event!(BatchUndone, "batch.undone");

/// Event: a draft was published
#[derive(Debug, Clone)]
pub struct ConfigurationPublished {
    /// Tenant
    pub tenant_id: TenantId,
    /// Page type
    pub page_type: PageType,
    /// Source draft
    pub draft_id: ConfigurationId,
    /// New published record
    pub published_id: ConfigurationId,
    /// Draft revision that was published
    pub revision: u64,
    /// When it happened
    pub timestamp: DateTime<Utc>,
}

layout_event!(ConfigurationPublished, "configuration.published");

/// Handler for domain events
#[async_trait]
pub trait LayoutEventHandler: Send + Sync {
    /// Handle a domain event
    async fn handle_event(&self, event: Box<dyn DomainEvent>) -> Result<(), LayoutError>;
}

/// Handler that drops every event
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopEventHandler;

#[async_trait]
impl LayoutEventHandler for NoopEventHandler {
    async fn handle_event(&self, _event: Box<dyn DomainEvent>) -> Result<(), LayoutError> {
        Ok(())
    }
}

/// Handler that records event types, for tests
#[cfg(feature = "testing")]
#[derive(Debug, Default)]
pub struct RecordingEventHandler {
    events: std::sync::Mutex<Vec<String>>,
}

#[cfg(feature = "testing")]
impl RecordingEventHandler {
    /// Create an empty recorder
    pub fn new() -> Self {
        Self::default()
    }

    /// Event types seen so far, oldest first
    pub fn event_types(&self) -> Vec<String> {
        self.events
            .lock()
            .map(|events| events.clone())
            .unwrap_or_default()
    }
}

#[cfg(feature = "testing")]
#[async_trait]
impl LayoutEventHandler for RecordingEventHandler {
    async fn handle_event(&self, event: Box<dyn DomainEvent>) -> Result<(), LayoutError> {
        let mut events = self
            .events
            .lock()
            .map_err(|e| LayoutError::Other(format!("Failed to acquire event lock: {}", e)))?;
        events.push(event.event_type().to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_metadata() {
        let event = DraftFallback {
            tenant_id: "shop".into(),
            page_type: PageType::Checkout,
            configuration_id: ConfigurationId("c1".to_string()),
            reason: "cycle".to_string(),
            timestamp: Utc::now(),
        };

        assert_eq!(event.event_type(), "draft.fallback");
        assert_eq!(event.tenant_id(), &TenantId::from("shop"));
        assert_eq!(event.page_type(), &PageType::Checkout);
    }

    #[cfg(feature = "testing")]
    #[tokio::test]
    async fn test_recording_handler() {
        let handler = RecordingEventHandler::new();
        handler
            .handle_event(Box::new(BatchUndone {
                tenant_id: "shop".into(),
                page_type: PageType::Cart,
                revision: 4,
                timestamp: Utc::now(),
            }))
            .await
            .unwrap();

        assert_eq!(handler.event_types(), vec!["batch.undone".to_string()]);
    }
}
