use crate::config::EngineConfig;
use crate::domain::command::LayoutCommand;
use crate::domain::invariants::{check_parent, check_reparent};
use crate::domain::mutation::{Applied, Mutation};
use crate::domain::slot::SlotId;
use crate::domain::tree::LayoutSnapshot;
use crate::LayoutError;
use serde::Serialize;
use tracing::debug;

/// A command that did not take effect
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommandError {
    /// Position in the batch
    pub index: usize,
    /// Operation name as submitted
    pub operation: String,
    /// Target as submitted
    pub target: Option<SlotId>,
    /// Human-readable reason
    pub reason: String,
}

/// Result of running a command batch
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchOutcome {
    /// Tree after every successful command
    pub tree: LayoutSnapshot,
    /// Number of commands applied
    pub executed_count: usize,
    /// Rejected commands in batch order
    pub errors: Vec<CommandError>,
    /// Ids added by create and duplicate commands
    pub created: Vec<SlotId>,
}

impl BatchOutcome {
    /// Whether every command applied
    pub fn is_complete(&self) -> bool {
        self.errors.is_empty()
    }

    /// Whether anything changed
    pub fn has_changes(&self) -> bool {
        self.executed_count > 0
    }
}

/// Validates and applies structured commands against a working snapshot
#[derive(Debug, Clone)]
pub struct CommandProcessor {
    max_batch_size: usize,
    max_slots: usize,
}

impl CommandProcessor {
    /// Create a processor with the configured limits
    pub fn new(config: &EngineConfig) -> Self {
        Self::with_limits(config.max_batch_size, config.max_slots)
    }

    /// Create a processor with explicit limits
    pub fn with_limits(max_batch_size: usize, max_slots: usize) -> Self {
        Self {
            max_batch_size,
            max_slots,
        }
    }

    /// Run `commands` in order against `tree`.
    ///
    /// Rejected commands are reported and skipped; later commands still run
    /// against the latest working snapshot. Only an oversized batch fails as
    /// a whole.
    pub fn execute(
        &self,
        commands: &[LayoutCommand],
        tree: &LayoutSnapshot,
    ) -> Result<BatchOutcome, LayoutError> {
        if commands.len() > self.max_batch_size {
            return Err(LayoutError::BatchTooLarge {
                size: commands.len(),
                max: self.max_batch_size,
            });
        }

        let mut working = tree.clone();
        let mut executed_count = 0;
        let mut errors = Vec::new();
        let mut created = Vec::new();

        for (index, command) in commands.iter().enumerate() {
            let result = command
                .to_mutation()
                .and_then(|mutation| self.apply(&mutation, &working));

            match result {
                Ok(applied) => {
                    working = applied.tree;
                    created.extend(applied.created);
                    executed_count += 1;
                }
                Err(err) => {
                    debug!(
                        index,
                        operation = %command.operation,
                        target = ?command.target_slot_id,
                        reason = %err,
                        "Command rejected"
                    );
                    errors.push(CommandError {
                        index,
                        operation: command.operation.clone(),
                        target: command.target_slot_id.clone(),
                        reason: err.to_string(),
                    });
                }
            }
        }

        debug!(
            submitted = commands.len(),
            executed = executed_count,
            failed = errors.len(),
            slots = working.len(),
            "Command batch applied"
        );

        Ok(BatchOutcome {
            tree: working,
            executed_count,
            errors,
            created,
        })
    }

    /// Check `mutation` against `tree` and apply it
    pub fn apply(&self, mutation: &Mutation, tree: &LayoutSnapshot) -> Result<Applied, LayoutError> {
        self.prevalidate(mutation, tree)?;
        mutation.apply(tree)
    }

    fn prevalidate(&self, mutation: &Mutation, tree: &LayoutSnapshot) -> Result<(), LayoutError> {
        match mutation {
            Mutation::Create { parent_id, .. } => {
                if let Some(parent_id) = parent_id {
                    check_parent(tree, parent_id)?;
                }
                self.check_capacity(tree, 1)
            }
            Mutation::Move {
                slot_id,
                new_parent_id,
                ..
            } => check_reparent(tree, slot_id, new_parent_id.as_ref()),
            Mutation::Reorder { parent_id, .. } => match parent_id {
                Some(parent_id) => require_slot(tree, parent_id),
                None => Ok(()),
            },
            Mutation::Duplicate { slot_id } => {
                require_slot(tree, slot_id)?;
                self.check_capacity(tree, tree.descendants(slot_id).len() + 1)
            }
            Mutation::Delete { slot_id }
            | Mutation::Resize { slot_id, .. }
            | Mutation::Update { slot_id, .. } => require_slot(tree, slot_id),
        }
    }

    fn check_capacity(&self, tree: &LayoutSnapshot, added: usize) -> Result<(), LayoutError> {
        if tree.len() + added > self.max_slots {
            return Err(LayoutError::SlotLimitReached(self.max_slots));
        }
        Ok(())
    }
}

impl Default for CommandProcessor {
    fn default() -> Self {
        Self::new(&EngineConfig::default())
    }
}

fn require_slot(tree: &LayoutSnapshot, slot_id: &SlotId) -> Result<(), LayoutError> {
    if tree.contains(slot_id) {
        Ok(())
    } else {
        Err(LayoutError::SlotNotFound(slot_id.0.clone()))
    }
}
