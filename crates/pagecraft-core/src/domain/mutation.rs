//! Copy-on-write mutation operations.
//!
//! Every operation borrows the current snapshot and returns a new one; the
//! input is never touched, so a rejected operation leaves the caller's tree
//! exactly as it was. Results are re-validated before they are returned.

use crate::domain::invariants::{self, check_parent, check_reparent, clamp_span};
use crate::domain::slot::{Slot, SlotId, SlotKind};
use crate::domain::tree::LayoutSnapshot;
use crate::LayoutError;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::{BTreeMap, HashMap, HashSet};

/// Optional settings for [`create_slot`]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateOptions {
    /// Explicit id; generated when absent
    #[serde(default)]
    pub id: Option<SlotId>,
    /// Requested span, clamped into the grid
    #[serde(default)]
    pub col_span: Option<i64>,
    /// Sibling index; appended when absent
    #[serde(default)]
    pub position: Option<usize>,
    /// Class names
    #[serde(default)]
    pub class_name: Option<String>,
    /// Inline styles
    #[serde(default)]
    pub styles: BTreeMap<String, String>,
    /// Metadata
    #[serde(default)]
    pub metadata: Map<String, Value>,
}

/// Field changes for [`update_slot`].
///
/// `styles` and `metadata` are merged key by key; an empty style value
/// removes the key.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SlotPatch {
    /// New content for text-like slots
    #[serde(default)]
    pub content: Option<String>,
    /// New button link
    #[serde(default)]
    pub href: Option<String>,
    /// New image alt text
    #[serde(default)]
    pub alt: Option<String>,
    /// New component name
    #[serde(default)]
    pub component: Option<String>,
    /// New component props
    #[serde(default)]
    pub props: Option<Value>,
    /// Replacement class names
    #[serde(default)]
    pub class_name: Option<String>,
    /// Style changes
    #[serde(default)]
    pub styles: BTreeMap<String, String>,
    /// Metadata changes
    #[serde(default)]
    pub metadata: Map<String, Value>,
}

impl SlotPatch {
    /// Whether the patch changes nothing
    pub fn is_empty(&self) -> bool {
        self == &SlotPatch::default()
    }
}

/// A single discrete tree operation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "camelCase")]
pub enum Mutation {
    /// Add a new slot
    #[serde(rename_all = "camelCase")]
    Create {
        /// Payload of the new slot
        kind: SlotKind,
        /// Parent container, `None` for a root
        parent_id: Option<SlotId>,
        /// Optional settings
        #[serde(default)]
        options: CreateOptions,
    },
    /// Remove a slot and its subtree
    #[serde(rename_all = "camelCase")]
    Delete {
        /// Slot to remove
        slot_id: SlotId,
    },
    /// Relocate a slot and its subtree
    #[serde(rename_all = "camelCase")]
    Move {
        /// Slot to move
        slot_id: SlotId,
        /// New parent, `None` for the root level
        new_parent_id: Option<SlotId>,
        /// Sibling index under the new parent
        position: Option<usize>,
    },
    /// Change the column span
    #[serde(rename_all = "camelCase")]
    Resize {
        /// Slot to resize
        slot_id: SlotId,
        /// Requested span before clamping
        col_span: i64,
    },
    /// Rewrite sibling order
    #[serde(rename_all = "camelCase")]
    Reorder {
        /// Parent whose children are reordered, `None` for roots
        parent_id: Option<SlotId>,
        /// Complete child list in the new order
        ordered_ids: Vec<SlotId>,
    },
    /// Change content or presentation fields
    #[serde(rename_all = "camelCase")]
    Update {
        /// Slot to update
        slot_id: SlotId,
        /// Changes
        patch: SlotPatch,
    },
    /// Deep-copy a subtree next to the original
    #[serde(rename_all = "camelCase")]
    Duplicate {
        /// Root of the subtree to copy
        slot_id: SlotId,
    },
}

/// Result of applying a [`Mutation`]
#[derive(Debug, Clone, PartialEq)]
pub struct Applied {
    /// The new snapshot
    pub tree: LayoutSnapshot,
    /// Id of the slot added by create or duplicate
    pub created: Option<SlotId>,
}

impl Applied {
    fn unchanged_shape(tree: LayoutSnapshot) -> Self {
        Self { tree, created: None }
    }
}

impl Mutation {
    /// Operation name as used by commands
    pub fn name(&self) -> &'static str {
        match self {
            Mutation::Create { .. } => "create",
            Mutation::Delete { .. } => "delete",
            Mutation::Move { .. } => "move",
            Mutation::Resize { .. } => "resize",
            Mutation::Reorder { .. } => "reorder",
            Mutation::Update { .. } => "update",
            Mutation::Duplicate { .. } => "duplicate",
        }
    }

    /// Whether the operation adds slots to the tree
    pub fn adds_slots(&self) -> bool {
        matches!(self, Mutation::Create { .. } | Mutation::Duplicate { .. })
    }

    /// Apply to `tree`, producing a new snapshot
    pub fn apply(&self, tree: &LayoutSnapshot) -> Result<Applied, LayoutError> {
        match self {
            Mutation::Create {
                kind,
                parent_id,
                options,
            } => {
                let (tree, id) = create_slot(tree, kind.clone(), parent_id.as_ref(), options.clone())?;
                Ok(Applied {
                    tree,
                    created: Some(id),
                })
            }
            Mutation::Delete { slot_id } => Ok(Applied::unchanged_shape(delete_slot(tree, slot_id))),
            Mutation::Move {
                slot_id,
                new_parent_id,
                position,
            } => move_slot(tree, slot_id, new_parent_id.as_ref(), *position)
                .map(Applied::unchanged_shape),
            Mutation::Resize { slot_id, col_span } => {
                resize_slot(tree, slot_id, *col_span).map(Applied::unchanged_shape)
            }
            Mutation::Reorder {
                parent_id,
                ordered_ids,
            } => reorder_children(tree, parent_id.as_ref(), ordered_ids).map(Applied::unchanged_shape),
            Mutation::Update { slot_id, patch } => {
                update_slot(tree, slot_id, patch).map(Applied::unchanged_shape)
            }
            Mutation::Duplicate { slot_id } => {
                let (tree, id) = duplicate_slot(tree, slot_id)?;
                Ok(Applied {
                    tree,
                    created: Some(id),
                })
            }
        }
    }
}

/// Create a slot under `parent_id` (or at the root level).
///
/// Returns the new snapshot and the id of the created slot.
pub fn create_slot(
    tree: &LayoutSnapshot,
    kind: SlotKind,
    parent_id: Option<&SlotId>,
    options: CreateOptions,
) -> Result<(LayoutSnapshot, SlotId), LayoutError> {
    if let Some(parent_id) = parent_id {
        check_parent(tree, parent_id)?;
    }

    let slot_type = kind.slot_type();
    let id = options.id.unwrap_or_else(|| SlotId::generate(slot_type));
    if tree.contains(&id) {
        return Err(LayoutError::DuplicateSlot(id.0));
    }

    let mut slot = Slot::new(id.clone(), kind);
    slot.parent_id = parent_id.cloned();
    if let Some(span) = options.col_span {
        slot.col_span = clamp_span(span);
    }
    if let Some(class_name) = options.class_name {
        slot.class_name = class_name;
    }
    slot.styles = options.styles;
    slot.metadata = options.metadata;

    let mut siblings = tree.child_ids(parent_id);
    let index = options.position.unwrap_or(siblings.len()).min(siblings.len());
    siblings.insert(index, id.clone());

    let mut next = tree.clone();
    next.slots_mut().insert(id.clone(), slot);
    next.assign_order(&siblings);
    next.refresh_root_order();

    invariants::ensure_valid(&next)?;
    Ok((next, id))
}

/// Remove `slot_id` and every descendant.
///
/// Deleting an absent slot returns an identical snapshot.
pub fn delete_slot(tree: &LayoutSnapshot, slot_id: &SlotId) -> LayoutSnapshot {
    let parent_id = match tree.get(slot_id) {
        Some(slot) => slot.parent_id.clone(),
        None => return tree.clone(),
    };

    let mut doomed: Vec<SlotId> = tree
        .descendants(slot_id)
        .into_iter()
        .map(|slot| slot.id.clone())
        .collect();
    doomed.push(slot_id.clone());

    let mut next = tree.clone();
    for id in &doomed {
        next.slots_mut().remove(id);
    }
    next.renumber_children(parent_id.as_ref());
    next.refresh_root_order();
    next
}

/// Move `slot_id` (with its subtree) under `new_parent_id` at `position`.
pub fn move_slot(
    tree: &LayoutSnapshot,
    slot_id: &SlotId,
    new_parent_id: Option<&SlotId>,
    position: Option<usize>,
) -> Result<LayoutSnapshot, LayoutError> {
    check_reparent(tree, slot_id, new_parent_id)?;

    let old_parent_id = tree.get(slot_id).and_then(|slot| slot.parent_id.clone());

    let mut siblings: Vec<SlotId> = tree
        .child_ids(new_parent_id)
        .into_iter()
        .filter(|id| id != slot_id)
        .collect();
    let index = position.unwrap_or(siblings.len()).min(siblings.len());
    siblings.insert(index, slot_id.clone());

    let mut next = tree.clone();
    if let Some(slot) = next.slots_mut().get_mut(slot_id) {
        slot.parent_id = new_parent_id.cloned();
    }
    next.assign_order(&siblings);
    if old_parent_id.as_ref() != new_parent_id {
        next.renumber_children(old_parent_id.as_ref());
    }
    next.refresh_root_order();

    invariants::ensure_valid(&next)?;
    Ok(next)
}

/// Set the column span of `slot_id`, clamping into `1..=12`.
pub fn resize_slot(
    tree: &LayoutSnapshot,
    slot_id: &SlotId,
    col_span: i64,
) -> Result<LayoutSnapshot, LayoutError> {
    if !tree.contains(slot_id) {
        return Err(LayoutError::SlotNotFound(slot_id.0.clone()));
    }

    let mut next = tree.clone();
    if let Some(slot) = next.slots_mut().get_mut(slot_id) {
        slot.col_span = clamp_span(col_span);
    }
    Ok(next)
}

/// Give the children of `parent_id` the order in `ordered_ids`.
///
/// The list must contain every current child exactly once.
pub fn reorder_children(
    tree: &LayoutSnapshot,
    parent_id: Option<&SlotId>,
    ordered_ids: &[SlotId],
) -> Result<LayoutSnapshot, LayoutError> {
    if let Some(parent_id) = parent_id {
        if !tree.contains(parent_id) {
            return Err(LayoutError::SlotNotFound(parent_id.0.clone()));
        }
    }

    let current: HashSet<SlotId> = tree.child_ids(parent_id).into_iter().collect();

    let mut seen = HashSet::new();
    for id in ordered_ids {
        if !seen.insert(id) {
            return Err(LayoutError::ReorderMismatch(format!("duplicate id {}", id)));
        }
        if !current.contains(id) {
            return Err(LayoutError::ReorderMismatch(format!(
                "{} is not a child of {}",
                id,
                parent_label(parent_id)
            )));
        }
    }

    let mut missing: Vec<&SlotId> = current.iter().filter(|id| !seen.contains(id)).collect();
    if !missing.is_empty() {
        missing.sort();
        let missing: Vec<&str> = missing.iter().map(|id| id.as_str()).collect();
        return Err(LayoutError::ReorderMismatch(format!(
            "missing children of {}: {}",
            parent_label(parent_id),
            missing.join(", ")
        )));
    }

    let mut next = tree.clone();
    next.assign_order(ordered_ids);
    next.refresh_root_order();
    Ok(next)
}

/// Apply `patch` to `slot_id`. The slot type never changes.
pub fn update_slot(
    tree: &LayoutSnapshot,
    slot_id: &SlotId,
    patch: &SlotPatch,
) -> Result<LayoutSnapshot, LayoutError> {
    let mut slot = tree
        .get(slot_id)
        .cloned()
        .ok_or_else(|| LayoutError::SlotNotFound(slot_id.0.clone()))?;

    if let Some(content) = &patch.content {
        slot.kind.set_content(content.clone())?;
    }
    if let Some(new_href) = &patch.href {
        match &mut slot.kind {
            SlotKind::Button { href, .. } => *href = Some(new_href.clone()),
            other => return Err(field_mismatch("href", other)),
        }
    }
    if let Some(new_alt) = &patch.alt {
        match &mut slot.kind {
            SlotKind::Image { alt, .. } => *alt = Some(new_alt.clone()),
            other => return Err(field_mismatch("alt", other)),
        }
    }
    if patch.component.is_some() || patch.props.is_some() {
        match &mut slot.kind {
            SlotKind::Component { component, props } => {
                if let Some(name) = &patch.component {
                    *component = name.clone();
                }
                if let Some(new_props) = &patch.props {
                    *props = new_props.clone();
                }
            }
            other => return Err(field_mismatch("component", other)),
        }
    }
    if let Some(class_name) = &patch.class_name {
        slot.class_name = class_name.clone();
    }
    for (key, value) in &patch.styles {
        if value.is_empty() {
            slot.styles.remove(key);
        } else {
            slot.styles.insert(key.clone(), value.clone());
        }
    }
    for (key, value) in &patch.metadata {
        slot.metadata.insert(key.clone(), value.clone());
    }

    let mut next = tree.clone();
    next.slots_mut().insert(slot_id.clone(), slot);
    Ok(next)
}

/// Copy `slot_id` and its subtree with fresh ids, placed right after the
/// original. Returns the new snapshot and the id of the copy's root.
pub fn duplicate_slot(
    tree: &LayoutSnapshot,
    slot_id: &SlotId,
) -> Result<(LayoutSnapshot, SlotId), LayoutError> {
    let original = tree
        .get(slot_id)
        .ok_or_else(|| LayoutError::SlotNotFound(slot_id.0.clone()))?;

    let mut subtree: Vec<&Slot> = vec![original];
    subtree.extend(tree.descendants(slot_id));

    let id_map: HashMap<&SlotId, SlotId> = subtree
        .iter()
        .map(|slot| (&slot.id, SlotId::generate(slot.slot_type())))
        .collect();

    let mut next = tree.clone();
    for slot in &subtree {
        let mut copy = (*slot).clone();
        copy.id = id_map[&slot.id].clone();
        if &slot.id != slot_id {
            copy.parent_id = slot.parent_id.as_ref().map(|p| id_map[p].clone());
        }
        next.slots_mut().insert(copy.id.clone(), copy);
    }

    let copy_id = id_map[slot_id].clone();
    let parent_id = original.parent_id.as_ref();
    let mut siblings = tree.child_ids(parent_id);
    let index = siblings
        .iter()
        .position(|id| id == slot_id)
        .map(|i| i + 1)
        .unwrap_or(siblings.len());
    siblings.insert(index, copy_id.clone());
    next.assign_order(&siblings);
    next.refresh_root_order();

    invariants::ensure_valid(&next)?;
    Ok((next, copy_id))
}

fn parent_label(parent_id: Option<&SlotId>) -> &str {
    parent_id.map(|p| p.as_str()).unwrap_or("root")
}

fn field_mismatch(field: &str, kind: &SlotKind) -> LayoutError {
    LayoutError::InvalidParameter(format!(
        "{} cannot be set on a {} slot",
        field,
        kind.slot_type()
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::invariants::validate;
    use crate::domain::slot::SlotType;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn page() -> LayoutSnapshot {
        LayoutSnapshot::from_slots(vec![
            Slot::container("root"),
            Slot::container("left").with_parent("root").with_order(0),
            Slot::container("right").with_parent("root").with_order(1),
            Slot::text("a", "A").with_parent("left").with_order(0),
            Slot::text("b", "B").with_parent("left").with_order(1),
            Slot::text("c", "C").with_parent("right").with_order(0),
        ])
        .unwrap()
    }

    fn child_ids(tree: &LayoutSnapshot, parent: &str) -> Vec<String> {
        tree.child_ids(Some(&parent.into()))
            .into_iter()
            .map(|id| id.0)
            .collect()
    }

    #[test]
    fn test_create_applies_type_defaults_and_appends() {
        let tree = page();
        let (next, id) = create_slot(
            &tree,
            SlotKind::with_content(SlotType::Button, "Buy"),
            Some(&"left".into()),
            CreateOptions::default(),
        )
        .unwrap();

        let slot = next.get(&id).unwrap();
        assert_eq!(slot.col_span, 4);
        assert_eq!(slot.order, 2);
        assert!(id.as_str().starts_with("button_"));
        assert_eq!(tree.len(), 6);
        assert_eq!(next.len(), 7);
    }

    #[test]
    fn test_create_at_position_with_explicit_id() {
        let options = CreateOptions {
            id: Some("first".into()),
            position: Some(0),
            col_span: Some(99),
            ..Default::default()
        };
        let (next, id) = create_slot(
            &page(),
            SlotKind::with_content(SlotType::Text, "x"),
            Some(&"left".into()),
            options,
        )
        .unwrap();

        assert_eq!(id, SlotId::from("first"));
        assert_eq!(child_ids(&next, "left"), vec!["first", "a", "b"]);
        assert_eq!(next.get(&id).unwrap().col_span, 12);
    }

    #[test]
    fn test_create_rejects_bad_parents_and_duplicates() {
        let tree = page();
        let text = SlotKind::with_content(SlotType::Text, "x");

        assert!(matches!(
            create_slot(&tree, text.clone(), Some(&"a".into()), CreateOptions::default()),
            Err(LayoutError::InvalidParent(_))
        ));
        assert!(matches!(
            create_slot(&tree, text.clone(), Some(&"ghost".into()), CreateOptions::default()),
            Err(LayoutError::InvalidParent(_))
        ));
        let options = CreateOptions {
            id: Some("a".into()),
            ..Default::default()
        };
        assert_eq!(
            create_slot(&tree, text, None, options),
            Err(LayoutError::DuplicateSlot("a".to_string()))
        );
    }

    #[test]
    fn test_create_root_updates_root_order() {
        let options = CreateOptions {
            id: Some("banner".into()),
            position: Some(0),
            ..Default::default()
        };
        let (next, _) = create_slot(&page(), SlotKind::Container, None, options).unwrap();
        assert_eq!(next.root_order(), &[SlotId::from("banner"), SlotId::from("root")]);
    }

    #[test]
    fn test_delete_cascades() {
        let next = delete_slot(&page(), &"left".into());
        assert!(!next.contains(&"left".into()));
        assert!(!next.contains(&"a".into()));
        assert!(!next.contains(&"b".into()));
        assert_eq!(child_ids(&next, "root"), vec!["right"]);
        assert_eq!(next.get(&"right".into()).unwrap().order, 0);
        assert!(next
            .iter()
            .all(|slot| slot.parent_id.as_ref().map_or(true, |p| next.contains(p))));
    }

    #[test]
    fn test_delete_absent_is_noop() {
        let tree = page();
        assert_eq!(delete_slot(&tree, &"ghost".into()), tree);
    }

    #[test]
    fn test_move_between_parents() {
        let next = move_slot(&page(), &"a".into(), Some(&"right".into()), Some(0)).unwrap();
        assert_eq!(child_ids(&next, "right"), vec!["a", "c"]);
        assert_eq!(child_ids(&next, "left"), vec!["b"]);
        assert_eq!(next.get(&"b".into()).unwrap().order, 0);
    }

    #[test]
    fn test_move_within_parent_and_to_root() {
        let next = move_slot(&page(), &"b".into(), Some(&"left".into()), Some(0)).unwrap();
        assert_eq!(child_ids(&next, "left"), vec!["b", "a"]);

        let next = move_slot(&page(), &"right".into(), None, None).unwrap();
        assert_eq!(next.root_order(), &[SlotId::from("root"), SlotId::from("right")]);
        assert_eq!(child_ids(&next, "right"), vec!["c"]);
    }

    #[test]
    fn test_move_into_descendant_rejected() {
        let tree = page();
        let err = move_slot(&tree, &"root".into(), Some(&"left".into()), None).unwrap_err();
        assert_eq!(err.to_string(), "cannot move into own descendant");
        assert!(move_slot(&tree, &"left".into(), Some(&"left".into()), None).is_err());
        assert_eq!(tree, page());
    }

    #[test]
    fn test_move_position_is_clamped() {
        let next = move_slot(&page(), &"c".into(), Some(&"left".into()), Some(50)).unwrap();
        assert_eq!(child_ids(&next, "left"), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_resize_clamps() {
        let tree = page();
        for (requested, expected) in [(-3, 1), (0, 1), (5, 5), (12, 12), (40, 12)] {
            let next = resize_slot(&tree, &"a".into(), requested).unwrap();
            assert_eq!(next.get(&"a".into()).unwrap().col_span, expected);
        }
        assert!(matches!(
            resize_slot(&tree, &"ghost".into(), 3),
            Err(LayoutError::SlotNotFound(_))
        ));
    }

    #[test]
    fn test_reorder_exact_set() {
        let tree = page();
        let next = reorder_children(&tree, Some(&"left".into()), &["b".into(), "a".into()]).unwrap();
        assert_eq!(child_ids(&next, "left"), vec!["b", "a"]);
    }

    #[test]
    fn test_reorder_rejects_mismatches() {
        let tree = page();
        let cases: Vec<Vec<SlotId>> = vec![
            vec!["a".into()],
            vec!["a".into(), "a".into()],
            vec!["a".into(), "b".into(), "c".into()],
            vec!["b".into(), "a".into(), "b".into()],
        ];
        for ids in cases {
            assert!(matches!(
                reorder_children(&tree, Some(&"left".into()), &ids),
                Err(LayoutError::ReorderMismatch(_))
            ));
        }
        assert!(matches!(
            reorder_children(&tree, Some(&"ghost".into()), &[]),
            Err(LayoutError::SlotNotFound(_))
        ));
    }

    #[test]
    fn test_update_fields() {
        let tree = page();
        let mut patch = SlotPatch {
            content: Some("Hello".to_string()),
            class_name: Some("lead".to_string()),
            ..Default::default()
        };
        patch.styles.insert("color".to_string(), "red".to_string());
        patch.metadata.insert("source".to_string(), json!("ai"));

        let next = update_slot(&tree, &"a".into(), &patch).unwrap();
        let slot = next.get(&"a".into()).unwrap();
        assert_eq!(slot.content(), Some("Hello"));
        assert_eq!(slot.class_name, "lead");
        assert_eq!(slot.styles.get("color").map(String::as_str), Some("red"));
        assert_eq!(slot.metadata["source"], json!("ai"));

        let clear = SlotPatch {
            styles: [("color".to_string(), String::new())].into_iter().collect(),
            ..Default::default()
        };
        let next = update_slot(&next, &"a".into(), &clear).unwrap();
        assert!(next.get(&"a".into()).unwrap().styles.is_empty());
    }

    #[test]
    fn test_update_rejects_fields_of_other_types() {
        let tree = page();
        let patch = SlotPatch {
            href: Some("/x".to_string()),
            ..Default::default()
        };
        assert!(matches!(
            update_slot(&tree, &"a".into(), &patch),
            Err(LayoutError::InvalidParameter(_))
        ));
        let patch = SlotPatch {
            content: Some("x".to_string()),
            ..Default::default()
        };
        assert!(update_slot(&tree, &"root".into(), &patch).is_err());
    }

    #[test]
    fn test_duplicate_copies_subtree_after_original() {
        let tree = page();
        let (next, copy_id) = duplicate_slot(&tree, &"left".into()).unwrap();

        assert_eq!(next.len(), tree.len() + 3);
        let roots_children = child_ids(&next, "root");
        assert_eq!(roots_children, vec!["left".to_string(), copy_id.0.clone(), "right".to_string()]);

        let copied: Vec<Option<&str>> = next
            .children(&copy_id)
            .iter()
            .map(|slot| slot.content())
            .collect();
        assert_eq!(copied, vec![Some("A"), Some("B")]);
        assert_eq!(validate(&next), Ok(()));
    }

    #[test]
    fn test_mutation_apply_reports_created_id() {
        let mutation = Mutation::Create {
            kind: SlotKind::with_content(SlotType::Text, "x"),
            parent_id: Some("right".into()),
            options: CreateOptions {
                id: Some("new".into()),
                ..Default::default()
            },
        };
        let applied = mutation.apply(&page()).unwrap();
        assert_eq!(applied.created, Some(SlotId::from("new")));
        assert_eq!(mutation.name(), "create");
        assert!(mutation.adds_slots());
    }

    #[test]
    fn test_mutation_serializes_for_audit_log() {
        let mutation = Mutation::Resize {
            slot_id: "a".into(),
            col_span: 8,
        };
        let value = serde_json::to_value(&mutation).unwrap();
        assert_eq!(value, json!({"op": "resize", "slotId": "a", "colSpan": 8}));
        let back: Mutation = serde_json::from_value(value).unwrap();
        assert_eq!(back, mutation);

        let moved = Mutation::Move {
            slot_id: "a".into(),
            new_parent_id: None,
            position: Some(1),
        };
        assert_eq!(
            serde_json::to_value(&moved).unwrap(),
            json!({"op": "move", "slotId": "a", "newParentId": null, "position": 1})
        );
    }
}
