//! Host-owned editing session for one draft.
//!
//! The session owns the canonical snapshot. Every successful change replaces
//! it wholesale, bumps the draft revision and hands the new draft to the
//! autosaver. Failed changes leave it untouched.

use crate::application::autosave::DraftAutosaver;
use crate::application::command_processor::{BatchOutcome, CommandProcessor};
use crate::application::configuration_service::publish_draft;
use crate::application::emit;
use crate::domain::command::LayoutCommand;
use crate::domain::configuration::SlotConfiguration;
use crate::domain::events::{BatchApplied, BatchUndone, LayoutEventHandler};
use crate::domain::mutation::Mutation;
use crate::domain::repository::ConfigurationRepository;
use crate::domain::slot::SlotId;
use crate::domain::tree::LayoutSnapshot;
use crate::LayoutError;
use chrono::Utc;
use std::sync::Arc;
use tracing::{debug, info};

/// Editing session over a single draft configuration
pub struct EditorSession {
    draft: SlotConfiguration,
    processor: CommandProcessor,
    autosaver: DraftAutosaver,
    repository: Arc<dyn ConfigurationRepository>,
    events: Arc<dyn LayoutEventHandler>,
    /// Snapshot from before the most recent batch that changed something
    undo_snapshot: Option<LayoutSnapshot>,
}

impl EditorSession {
    /// Create a session over an already persisted draft
    pub fn new(
        draft: SlotConfiguration,
        processor: CommandProcessor,
        autosaver: DraftAutosaver,
        repository: Arc<dyn ConfigurationRepository>,
        events: Arc<dyn LayoutEventHandler>,
    ) -> Self {
        Self {
            draft,
            processor,
            autosaver,
            repository,
            events,
            undo_snapshot: None,
        }
    }

    /// Current tree
    pub fn tree(&self) -> &LayoutSnapshot {
        &self.draft.snapshot
    }

    /// Current draft record
    pub fn draft(&self) -> &SlotConfiguration {
        &self.draft
    }

    /// Current draft revision
    pub fn revision(&self) -> u64 {
        self.draft.revision
    }

    /// Whether [`undo_last_batch`](Self::undo_last_batch) has something to restore
    pub fn can_undo(&self) -> bool {
        self.undo_snapshot.is_some()
    }

    /// The autosaver backing this session
    pub fn autosaver(&self) -> &DraftAutosaver {
        &self.autosaver
    }

    /// Apply one direct mutation, e.g. from a drag-and-drop gesture.
    ///
    /// Returns the id of a created slot. A direct edit clears the undo slot,
    /// since restoring the pre-batch tree would also discard it.
    pub fn apply(&mut self, mutation: &Mutation) -> Result<Option<SlotId>, LayoutError> {
        let applied = self.processor.apply(mutation, &self.draft.snapshot)?;
        self.undo_snapshot = None;
        self.commit(applied.tree);
        debug!(
            operation = mutation.name(),
            revision = self.draft.revision,
            "Mutation applied"
        );
        Ok(applied.created)
    }

    /// Run a command batch against the current tree.
    ///
    /// Commits the resulting tree when at least one command applied and keeps
    /// the previous tree for a single undo.
    pub async fn execute(&mut self, commands: &[LayoutCommand]) -> Result<BatchOutcome, LayoutError> {
        let outcome = self.processor.execute(commands, &self.draft.snapshot)?;

        if outcome.has_changes() {
            self.undo_snapshot = Some(self.draft.snapshot.clone());
            self.commit(outcome.tree.clone());
        }

        emit(
            self.events.as_ref(),
            Box::new(BatchApplied {
                tenant_id: self.draft.tenant_id.clone(),
                page_type: self.draft.page_type.clone(),
                executed_count: outcome.executed_count,
                failed_count: outcome.errors.len(),
                revision: self.draft.revision,
                timestamp: Utc::now(),
            }),
        )
        .await;

        Ok(outcome)
    }

    /// Restore the tree from before the most recent changing batch.
    ///
    /// The restore is itself a new revision; only one level is kept.
    pub async fn undo_last_batch(&mut self) -> Result<(), LayoutError> {
        let previous = self.undo_snapshot.take().ok_or(LayoutError::NothingToUndo)?;
        self.commit(previous);

        info!(
            tenant = %self.draft.tenant_id,
            page_type = %self.draft.page_type,
            revision = self.draft.revision,
            "Last command batch undone"
        );
        emit(
            self.events.as_ref(),
            Box::new(BatchUndone {
                tenant_id: self.draft.tenant_id.clone(),
                page_type: self.draft.page_type.clone(),
                revision: self.draft.revision,
                timestamp: Utc::now(),
            }),
        )
        .await;
        Ok(())
    }

    /// Persist any pending change now
    pub async fn flush(&self) -> Result<(), LayoutError> {
        self.autosaver.flush().await.map(|_| ())
    }

    /// Flush, then publish the current draft
    pub async fn publish(&self) -> Result<SlotConfiguration, LayoutError> {
        self.flush().await?;
        publish_draft(self.repository.as_ref(), self.events.as_ref(), &self.draft).await
    }

    fn commit(&mut self, tree: LayoutSnapshot) {
        self.draft = self.draft.with_snapshot(tree);
        self.autosaver.schedule(self.draft.clone());
    }
}
