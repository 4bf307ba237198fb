//! Debounced draft persistence.
//!
//! The editor session hands every committed draft to the autosaver. A
//! background task waits until no newer draft arrived for the debounce
//! window and then saves only the latest one. Saves go through a single
//! async mutex that remembers the last persisted revision, so an older
//! revision is never written after a newer one.

use crate::application::emit;
use crate::domain::configuration::SlotConfiguration;
use crate::domain::events::{DraftSaved, LayoutEventHandler};
use crate::domain::repository::ConfigurationRepository;
use crate::LayoutError;
use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{watch, Mutex};
use tokio::task::JoinHandle;
use tracing::{debug, error};

struct SaveState {
    last_saved_revision: u64,
    last_error: Option<LayoutError>,
}

struct Saver {
    repository: Arc<dyn ConfigurationRepository>,
    events: Arc<dyn LayoutEventHandler>,
    state: Mutex<SaveState>,
}

impl Saver {
    /// Persist `draft` unless an equal or newer revision is already stored.
    ///
    /// Returns whether anything was written.
    async fn save(&self, draft: &SlotConfiguration) -> Result<bool, LayoutError> {
        let mut state = self.state.lock().await;
        if draft.revision <= state.last_saved_revision {
            return Ok(false);
        }

        if let Err(err) = self.repository.save_draft(draft).await {
            error!(
                tenant = %draft.tenant_id,
                page_type = %draft.page_type,
                revision = draft.revision,
                error = %err,
                "Draft autosave failed"
            );
            state.last_error = Some(err.clone());
            return Err(err);
        }

        state.last_saved_revision = draft.revision;
        state.last_error = None;
        drop(state);

        debug!(
            tenant = %draft.tenant_id,
            page_type = %draft.page_type,
            revision = draft.revision,
            "Draft saved"
        );
        emit(
            self.events.as_ref(),
            Box::new(DraftSaved {
                tenant_id: draft.tenant_id.clone(),
                page_type: draft.page_type.clone(),
                configuration_id: draft.id.clone(),
                revision: draft.revision,
                timestamp: Utc::now(),
            }),
        )
        .await;
        Ok(true)
    }
}

/// Debounced writer for one draft
pub struct DraftAutosaver {
    latest: watch::Sender<Option<SlotConfiguration>>,
    saver: Arc<Saver>,
    task: Option<JoinHandle<()>>,
}

impl DraftAutosaver {
    /// Create an autosaver for a draft already persisted at `saved_revision`.
    ///
    /// When `enabled` is false nothing is written until [`flush`](Self::flush).
    /// Must be called inside a tokio runtime.
    pub fn new(
        repository: Arc<dyn ConfigurationRepository>,
        events: Arc<dyn LayoutEventHandler>,
        debounce: Duration,
        enabled: bool,
        saved_revision: u64,
    ) -> Self {
        let (latest, receiver) = watch::channel(None);
        let saver = Arc::new(Saver {
            repository,
            events,
            state: Mutex::new(SaveState {
                last_saved_revision: saved_revision,
                last_error: None,
            }),
        });

        let task = enabled.then(|| tokio::spawn(run(receiver, saver.clone(), debounce)));

        Self {
            latest,
            saver,
            task,
        }
    }

    /// Record a new committed draft; the debounce window restarts
    pub fn schedule(&self, draft: SlotConfiguration) {
        self.latest.send_replace(Some(draft));
    }

    /// Save the latest scheduled draft now.
    ///
    /// Returns whether anything was written.
    pub async fn flush(&self) -> Result<bool, LayoutError> {
        let latest = self.latest.borrow().clone();
        match latest {
            Some(draft) => self.saver.save(&draft).await,
            None => Ok(false),
        }
    }

    /// Revision most recently persisted
    pub async fn last_saved_revision(&self) -> u64 {
        self.saver.state.lock().await.last_saved_revision
    }

    /// Whether a scheduled draft has not been persisted yet
    pub async fn has_pending(&self) -> bool {
        let latest = self.latest.borrow().as_ref().map(|draft| draft.revision);
        match latest {
            Some(revision) => revision > self.last_saved_revision().await,
            None => false,
        }
    }

    /// Error from the most recent failed save, cleared by the next success
    pub async fn last_error(&self) -> Option<LayoutError> {
        self.saver.state.lock().await.last_error.clone()
    }

    /// Whether background saving is active
    pub fn is_enabled(&self) -> bool {
        self.task.is_some()
    }
}

async fn run(
    mut receiver: watch::Receiver<Option<SlotConfiguration>>,
    saver: Arc<Saver>,
    debounce: Duration,
) {
    loop {
        if receiver.changed().await.is_err() {
            return;
        }

        let mut closed = false;
        loop {
            tokio::select! {
                changed = receiver.changed() => {
                    if changed.is_err() {
                        closed = true;
                        break;
                    }
                }
                _ = tokio::time::sleep(debounce) => break,
            }
        }

        let latest = receiver.borrow_and_update().clone();
        if let Some(draft) = latest {
            // failures are logged and kept for last_error
            let _ = saver.save(&draft).await;
        }

        if closed {
            return;
        }
    }
}

#[cfg(all(test, feature = "testing"))]
mod tests {
    use super::*;
    use crate::domain::configuration::PageType;
    use crate::domain::events::NoopEventHandler;
    use crate::domain::repository::memory::MemoryConfigurationRepository;
    use crate::domain::slot::Slot;
    use crate::domain::tree::LayoutSnapshot;

    fn draft() -> SlotConfiguration {
        SlotConfiguration::new_draft("shop".into(), PageType::Cart, LayoutSnapshot::new())
    }

    fn with_root(draft: &SlotConfiguration, id: &str) -> SlotConfiguration {
        draft.with_snapshot(LayoutSnapshot::from_slots(vec![Slot::container(id)]).unwrap())
    }

    async fn stored_revision(repo: &MemoryConfigurationRepository) -> Option<u64> {
        repo.load_draft(&"shop".into(), &PageType::Cart)
            .await
            .unwrap()
            .map(|draft| draft.revision)
    }

    #[tokio::test(start_paused = true)]
    async fn test_debounce_saves_only_settled_value() {
        let repo = MemoryConfigurationRepository::new();
        let autosaver = DraftAutosaver::new(
            Arc::new(repo.clone()),
            Arc::new(NoopEventHandler),
            Duration::from_millis(500),
            true,
            0,
        );

        let first = with_root(&draft(), "a");
        let second = with_root(&first, "b");
        autosaver.schedule(first);
        tokio::time::sleep(Duration::from_millis(100)).await;
        autosaver.schedule(second);
        tokio::time::sleep(Duration::from_millis(300)).await;
        assert_eq!(stored_revision(&repo).await, None);

        tokio::time::sleep(Duration::from_millis(400)).await;
        assert_eq!(stored_revision(&repo).await, Some(3));
        assert!(!autosaver.has_pending().await);
    }

    #[tokio::test]
    async fn test_flush_skips_already_saved_revisions() {
        let repo = MemoryConfigurationRepository::new();
        let autosaver = DraftAutosaver::new(
            Arc::new(repo.clone()),
            Arc::new(NoopEventHandler),
            Duration::from_secs(60),
            false,
            0,
        );

        assert!(!autosaver.flush().await.unwrap());
        autosaver.schedule(draft());
        assert!(autosaver.has_pending().await);
        assert!(autosaver.flush().await.unwrap());
        assert!(!autosaver.flush().await.unwrap());
        assert_eq!(autosaver.last_saved_revision().await, 1);
        assert!(!autosaver.is_enabled());
    }
}
