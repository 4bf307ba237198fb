//! Immutable layout snapshot and its read queries.
//!
//! A snapshot is a flat map of slot id to slot record plus the ordered list of
//! root ids. All reads are pure; mutation happens only through
//! [`crate::domain::mutation`], which returns new snapshots.

use crate::domain::invariants;
use crate::domain::slot::{Slot, SlotId};
use crate::LayoutError;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, HashSet};

/// A complete layout tree
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutSnapshot {
    slots: BTreeMap<SlotId, Slot>,
    #[serde(default)]
    root_order: Vec<SlotId>,
}

impl LayoutSnapshot {
    /// Empty tree
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a validated snapshot from slot records.
    ///
    /// The root order is derived from the roots' ordering keys.
    pub fn from_slots(slots: impl IntoIterator<Item = Slot>) -> Result<Self, LayoutError> {
        let mut map = BTreeMap::new();
        for slot in slots {
            let id = slot.id.clone();
            if map.insert(id.clone(), slot).is_some() {
                return Err(LayoutError::DuplicateSlot(id.0));
            }
        }

        let mut snapshot = Self {
            slots: map,
            root_order: Vec::new(),
        };
        snapshot.refresh_root_order();
        invariants::validate(&snapshot).map_err(LayoutError::InvariantViolation)?;
        Ok(snapshot)
    }

    /// Assemble a snapshot without any checks
    pub(crate) fn from_parts_unchecked(
        slots: BTreeMap<SlotId, Slot>,
        root_order: Vec<SlotId>,
    ) -> Self {
        Self { slots, root_order }
    }

    /// Number of slots
    #[inline]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Whether the tree has no slots
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Look up a slot
    #[inline]
    pub fn get(&self, id: &SlotId) -> Option<&Slot> {
        self.slots.get(id)
    }

    /// Whether a slot exists
    #[inline]
    pub fn contains(&self, id: &SlotId) -> bool {
        self.slots.contains_key(id)
    }

    /// All slots keyed by id
    pub fn slots(&self) -> &BTreeMap<SlotId, Slot> {
        &self.slots
    }

    /// Root ids in render order
    pub fn root_order(&self) -> &[SlotId] {
        &self.root_order
    }

    /// Iterate over all slots in id order
    pub fn iter(&self) -> impl Iterator<Item = &Slot> {
        self.slots.values()
    }

    /// Root slots in render order
    pub fn roots(&self) -> Vec<&Slot> {
        self.children_of(None)
    }

    /// Children of `id` in render order
    pub fn children(&self, id: &SlotId) -> Vec<&Slot> {
        self.children_of(Some(id))
    }

    /// Children of `parent`, or the roots when `parent` is `None`
    pub fn children_of(&self, parent: Option<&SlotId>) -> Vec<&Slot> {
        let mut children: Vec<&Slot> = self
            .slots
            .values()
            .filter(|slot| slot.parent_id.as_ref() == parent)
            .collect();
        children.sort_by(|a, b| a.order.cmp(&b.order).then_with(|| a.id.cmp(&b.id)));
        children
    }

    /// Ids of the children of `parent` in render order
    pub fn child_ids(&self, parent: Option<&SlotId>) -> Vec<SlotId> {
        self.children_of(parent)
            .into_iter()
            .map(|slot| slot.id.clone())
            .collect()
    }

    /// Ancestors of `id`, nearest parent first.
    ///
    /// Stops at a missing parent or at the first repeated id, so it is safe
    /// to call on trees that have not been validated.
    pub fn ancestors(&self, id: &SlotId) -> Vec<&Slot> {
        let mut result = Vec::new();
        let mut seen = HashSet::new();
        seen.insert(id);

        let mut current = self.slots.get(id).and_then(|slot| slot.parent_id.as_ref());
        while let Some(parent_id) = current {
            if !seen.insert(parent_id) {
                break;
            }
            match self.slots.get(parent_id) {
                Some(parent) => {
                    result.push(parent);
                    current = parent.parent_id.as_ref();
                }
                None => break,
            }
        }
        result
    }

    /// Every descendant of `id` in pre-order, excluding `id` itself
    pub fn descendants(&self, id: &SlotId) -> Vec<&Slot> {
        let Some((id, _)) = self.slots.get_key_value(id) else {
            return Vec::new();
        };
        let index = self.children_index();

        let mut result = Vec::new();
        let mut seen = HashSet::new();
        seen.insert(id);

        let mut stack: Vec<&Slot> = Vec::new();
        if let Some(children) = index.get(&Some(id)) {
            stack.extend(children.iter().rev().copied());
        }
        while let Some(slot) = stack.pop() {
            if !seen.insert(&slot.id) {
                continue;
            }
            result.push(slot);
            if let Some(children) = index.get(&Some(&slot.id)) {
                stack.extend(children.iter().rev().copied());
            }
        }
        result
    }

    /// Parent to children map, each list in render order
    fn children_index(&self) -> HashMap<Option<&SlotId>, Vec<&Slot>> {
        let mut index: HashMap<Option<&SlotId>, Vec<&Slot>> = HashMap::new();
        for slot in self.slots.values() {
            index.entry(slot.parent_id.as_ref()).or_default().push(slot);
        }
        for children in index.values_mut() {
            children.sort_by(|a, b| a.order.cmp(&b.order).then_with(|| a.id.cmp(&b.id)));
        }
        index
    }

    /// Whether `candidate` lies strictly below `ancestor`
    pub fn is_descendant(&self, ancestor: &SlotId, candidate: &SlotId) -> bool {
        self.ancestors(candidate)
            .iter()
            .any(|slot| &slot.id == ancestor)
    }

    /// Distance from the root, `0` for roots
    pub fn depth(&self, id: &SlotId) -> Option<usize> {
        self.slots.get(id).map(|_| self.ancestors(id).len())
    }

    pub(crate) fn slots_mut(&mut self) -> &mut BTreeMap<SlotId, Slot> {
        &mut self.slots
    }

    /// Rewrite sibling keys of `parent` to `0..n`, keeping current order
    pub(crate) fn renumber_children(&mut self, parent: Option<&SlotId>) {
        let ids = self.child_ids(parent);
        self.assign_order(&ids);
        if parent.is_none() {
            self.root_order = ids;
        }
    }

    /// Give `ids` ordering keys `0..n` in sequence
    pub(crate) fn assign_order(&mut self, ids: &[SlotId]) {
        for (index, id) in ids.iter().enumerate() {
            if let Some(slot) = self.slots.get_mut(id) {
                slot.order = index as u32;
            }
        }
    }

    /// Recompute the root order from the roots' ordering keys
    pub(crate) fn refresh_root_order(&mut self) {
        self.root_order = self.child_ids(None);
    }
}
