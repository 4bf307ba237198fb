//! Structural checks run before any snapshot is committed.
//!
//! Everything here is a pure predicate over a [`LayoutSnapshot`].

use crate::domain::slot::{SlotId, GRID_COLUMNS, MIN_COL_SPAN};
use crate::domain::tree::LayoutSnapshot;
use crate::LayoutError;
use std::collections::{HashMap, HashSet};
use thiserror::Error;

/// A broken tree invariant
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Violation {
    /// Map key and record id disagree
    #[error("slot stored under key {key} has id {slot_id}")]
    KeyMismatch {
        /// Map key
        key: String,
        /// Id inside the record
        slot_id: String,
    },

    /// Parent reference points nowhere
    #[error("slot {slot_id} references missing parent {parent_id}")]
    MissingParent {
        /// Child slot
        slot_id: String,
        /// Missing parent
        parent_id: String,
    },

    /// Parent cannot own children
    #[error("slot {slot_id} has non-container parent {parent_id}")]
    NonContainerParent {
        /// Child slot
        slot_id: String,
        /// Offending parent
        parent_id: String,
    },

    /// Slot is its own ancestor
    #[error("slot {slot_id} is part of a parent cycle")]
    Cycle {
        /// A slot on the cycle
        slot_id: String,
    },

    /// Column span outside the grid
    #[error("slot {slot_id} has column span {span} outside 1..=12")]
    SpanOutOfRange {
        /// Slot
        slot_id: String,
        /// Stored span
        span: u8,
    },

    /// Two siblings share an ordering key
    #[error("order {order} is used twice under {}", .parent_id.as_deref().unwrap_or("root"))]
    DuplicateOrder {
        /// Parent, `None` for roots
        parent_id: Option<String>,
        /// Shared key
        order: u32,
    },

    /// Root order list disagrees with the roots' ordering keys
    #[error("root order does not list the root slots in order")]
    RootOrderMismatch,
}

/// Validate every invariant, collecting all violations
pub fn validate(tree: &LayoutSnapshot) -> Result<(), Vec<Violation>> {
    let mut violations = Vec::new();

    for (key, slot) in tree.slots() {
        if key != &slot.id {
            violations.push(Violation::KeyMismatch {
                key: key.0.clone(),
                slot_id: slot.id.0.clone(),
            });
        }

        if !is_span_valid(i64::from(slot.col_span)) {
            violations.push(Violation::SpanOutOfRange {
                slot_id: slot.id.0.clone(),
                span: slot.col_span,
            });
        }

        if let Some(parent_id) = &slot.parent_id {
            match tree.get(parent_id) {
                None => violations.push(Violation::MissingParent {
                    slot_id: slot.id.0.clone(),
                    parent_id: parent_id.0.clone(),
                }),
                Some(parent) if !parent.is_container() => {
                    violations.push(Violation::NonContainerParent {
                        slot_id: slot.id.0.clone(),
                        parent_id: parent_id.0.clone(),
                    })
                }
                Some(_) => {}
            }
        }
    }

    violations.extend(find_cycles(tree));
    violations.extend(find_duplicate_orders(tree));

    if tree.root_order() != tree.child_ids(None).as_slice() {
        violations.push(Violation::RootOrderMismatch);
    }

    if violations.is_empty() {
        Ok(())
    } else {
        Err(violations)
    }
}

/// Validate and convert failures into a [`LayoutError`]
pub fn ensure_valid(tree: &LayoutSnapshot) -> Result<(), LayoutError> {
    validate(tree).map_err(LayoutError::InvariantViolation)
}

/// Whether `slot_id` may be placed under `new_parent_id`
pub fn can_reparent(tree: &LayoutSnapshot, slot_id: &SlotId, new_parent_id: Option<&SlotId>) -> bool {
    check_reparent(tree, slot_id, new_parent_id).is_ok()
}

/// Like [`can_reparent`] but explains the rejection
pub fn check_reparent(
    tree: &LayoutSnapshot,
    slot_id: &SlotId,
    new_parent_id: Option<&SlotId>,
) -> Result<(), LayoutError> {
    if !tree.contains(slot_id) {
        return Err(LayoutError::SlotNotFound(slot_id.0.clone()));
    }

    let target_id = match new_parent_id {
        Some(target_id) => target_id,
        None => return Ok(()),
    };

    if target_id == slot_id || tree.is_descendant(slot_id, target_id) {
        return Err(LayoutError::MoveIntoDescendant {
            slot_id: slot_id.0.clone(),
            target_id: target_id.0.clone(),
        });
    }

    check_parent(tree, target_id)
}

/// Ensure `parent_id` exists and can own children
pub fn check_parent(tree: &LayoutSnapshot, parent_id: &SlotId) -> Result<(), LayoutError> {
    match tree.get(parent_id) {
        None => Err(LayoutError::InvalidParent(format!(
            "parent {} does not exist",
            parent_id
        ))),
        Some(parent) if !parent.is_container() => Err(LayoutError::InvalidParent(format!(
            "{} slot {} cannot own children",
            parent.slot_type(),
            parent_id
        ))),
        Some(_) => Ok(()),
    }
}

/// Whether `span` fits the grid
#[inline]
pub fn is_span_valid(span: i64) -> bool {
    (i64::from(MIN_COL_SPAN)..=i64::from(GRID_COLUMNS)).contains(&span)
}

/// Clamp any requested span into the grid
#[inline]
pub fn clamp_span(span: i64) -> u8 {
    span.clamp(i64::from(MIN_COL_SPAN), i64::from(GRID_COLUMNS)) as u8
}

/// Walk parent pointers once per slot, tracking the current path.
fn find_cycles(tree: &LayoutSnapshot) -> Vec<Violation> {
    let mut visited: HashSet<&SlotId> = HashSet::new();
    let mut violations = Vec::new();

    for start in tree.slots().keys() {
        if visited.contains(start) {
            continue;
        }

        let mut path: Vec<&SlotId> = Vec::new();
        let mut on_path: HashSet<&SlotId> = HashSet::new();
        let mut current = Some(start);

        while let Some(id) = current {
            if on_path.contains(id) {
                violations.push(Violation::Cycle {
                    slot_id: id.0.clone(),
                });
                break;
            }
            if visited.contains(id) {
                break;
            }
            on_path.insert(id);
            path.push(id);
            current = tree.get(id).and_then(|slot| slot.parent_id.as_ref());
        }

        visited.extend(path);
    }

    violations
}

fn find_duplicate_orders(tree: &LayoutSnapshot) -> Vec<Violation> {
    let mut seen: HashMap<(Option<&SlotId>, u32), usize> = HashMap::new();
    for slot in tree.iter() {
        *seen.entry((slot.parent_id.as_ref(), slot.order)).or_default() += 1;
    }

    let mut violations: Vec<Violation> = seen
        .into_iter()
        .filter(|(_, count)| *count > 1)
        .map(|((parent, order), _)| Violation::DuplicateOrder {
            parent_id: parent.map(|p| p.0.clone()),
            order,
        })
        .collect();
    violations.sort_by(|a, b| format!("{:?}", a).cmp(&format!("{:?}", b)));
    violations
}
