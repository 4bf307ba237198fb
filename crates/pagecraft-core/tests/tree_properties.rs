use pagecraft_core::domain::invariants::{validate, can_reparent};
use pagecraft_core::domain::mutation::{
    create_slot, delete_slot, move_slot, reorder_children, resize_slot, CreateOptions,
};
use pagecraft_core::{
    CommandProcessor, LayoutCommand, LayoutError, LayoutSnapshot, Mutation, Slot, SlotId, SlotKind,
    SlotType,
};
use pretty_assertions::assert_eq;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde_json::json;

fn root_only() -> LayoutSnapshot {
    LayoutSnapshot::from_slots(vec![Slot::container("root_container")]).unwrap()
}

fn nested() -> LayoutSnapshot {
    LayoutSnapshot::from_slots(vec![
        Slot::container("root"),
        Slot::container("row").with_parent("root").with_order(0),
        Slot::container("cell").with_parent("row").with_order(0),
        Slot::text("label", "x").with_parent("cell").with_order(0),
        Slot::text("aside", "y").with_parent("root").with_order(1),
    ])
    .unwrap()
}

#[test]
fn example_scenario() {
    let tree = root_only();

    let (tree, text_id) = create_slot(
        &tree,
        SlotKind::with_content(SlotType::Text, "Hello"),
        Some(&"root_container".into()),
        CreateOptions::default(),
    )
    .unwrap();
    assert_eq!(tree.len(), 2);
    assert_eq!(tree.get(&text_id).unwrap().col_span, 6);

    let tree = resize_slot(&tree, &text_id, 20).unwrap();
    assert_eq!(tree.get(&text_id).unwrap().col_span, 12);

    let err = move_slot(&tree, &"root_container".into(), Some(&text_id), None).unwrap_err();
    assert_eq!(err.to_string(), "cannot move into own descendant");
    assert_eq!(tree.len(), 2);
    assert_eq!(tree.get(&text_id).unwrap().parent_id, Some("root_container".into()));
}

#[test]
fn random_mutation_sequences_stay_acyclic() {
    let mut rng = StdRng::seed_from_u64(7);
    let mut tree = nested();

    for step in 0..500 {
        let ids: Vec<SlotId> = tree.slots().keys().cloned().collect();
        let pick = |rng: &mut StdRng| -> Option<SlotId> {
            if ids.is_empty() {
                None
            } else {
                Some(ids[rng.gen_range(0..ids.len())].clone())
            }
        };

        let mutation = match rng.gen_range(0..5) {
            0 => Mutation::Create {
                kind: if rng.gen_bool(0.5) {
                    SlotKind::Container
                } else {
                    SlotKind::with_content(SlotType::Text, "t")
                },
                parent_id: pick(&mut rng),
                options: CreateOptions::default(),
            },
            1 if !ids.is_empty() && rng.gen_bool(0.3) => Mutation::Delete {
                slot_id: pick(&mut rng).unwrap(),
            },
            2 | 3 if !ids.is_empty() => Mutation::Move {
                slot_id: pick(&mut rng).unwrap(),
                new_parent_id: pick(&mut rng),
                position: Some(rng.gen_range(0..4)),
            },
            4 if !ids.is_empty() => Mutation::Resize {
                slot_id: pick(&mut rng).unwrap(),
                col_span: rng.gen_range(-20..40),
            },
            _ => Mutation::Create {
                kind: SlotKind::Container,
                parent_id: None,
                options: CreateOptions::default(),
            },
        };

        let before = tree.clone();
        match mutation.apply(&tree) {
            Ok(applied) => tree = applied.tree,
            Err(_) => assert_eq!(tree, before),
        }

        assert_eq!(validate(&tree), Ok(()), "invalid tree after step {}", step);
        for id in tree.slots().keys() {
            assert!(!tree.is_descendant(id, id));
            assert!(tree.ancestors(id).iter().all(|a| &a.id != id));
        }
    }
}

#[test]
fn cascade_delete_is_complete() {
    let tree = nested();
    let next = delete_slot(&tree, &"row".into());

    for removed in ["row", "cell", "label"] {
        assert!(!next.contains(&removed.into()));
    }
    assert!(next.iter().all(|slot| match &slot.parent_id {
        Some(parent) => next.contains(parent),
        None => true,
    }));
    assert_eq!(next.len(), 2);
}

#[test]
fn resize_always_lands_in_grid() {
    let tree = nested();
    for n in [i64::MIN, -100, -1, 0, 1, 6, 11, 12, 13, 1_000, i64::MAX] {
        let next = resize_slot(&tree, &"label".into(), n).unwrap();
        let span = next.get(&"label".into()).unwrap().col_span;
        assert!((1..=12).contains(&span), "span {} for input {}", span, n);
    }
}

#[test]
fn reparent_into_subtree_is_rejected() {
    let tree = nested();
    for target in ["root", "row", "cell"] {
        assert!(!can_reparent(&tree, &"root".into(), Some(&target.into())));
        let result = move_slot(&tree, &"root".into(), Some(&target.into()), None);
        assert!(matches!(result, Err(LayoutError::MoveIntoDescendant { .. })));
    }
    assert_eq!(tree, nested());
}

#[test]
fn reorder_requires_exact_child_set() {
    let tree = nested();
    let parent: SlotId = "root".into();

    let missing = reorder_children(&tree, Some(&parent), &["aside".into()]);
    let duplicated = reorder_children(
        &tree,
        Some(&parent),
        &["aside".into(), "row".into(), "aside".into()],
    );
    let swapped_in = reorder_children(&tree, Some(&parent), &["aside".into(), "label".into()]);

    for result in [missing, duplicated, swapped_in] {
        assert!(matches!(result, Err(LayoutError::ReorderMismatch(_))));
    }

    let ok = reorder_children(&tree, Some(&parent), &["aside".into(), "row".into()]).unwrap();
    let order: Vec<SlotId> = ok.child_ids(Some(&parent));
    assert_eq!(order, vec![SlotId::from("aside"), SlotId::from("row")]);
}

#[test]
fn batch_partial_success_after_delete() {
    let commands: Vec<LayoutCommand> = serde_json::from_value(json!([
        {"targetSlotId": "row", "operation": "delete"},
        {"targetSlotId": "label", "operation": "resize", "params": {"colSpan": 3}},
        {"targetSlotId": "aside", "operation": "resize", "params": {"colSpan": 3}}
    ]))
    .unwrap();

    let outcome = CommandProcessor::default().execute(&commands, &nested()).unwrap();

    assert_eq!(outcome.executed_count, 2);
    assert_eq!(outcome.errors.len(), 1);
    assert_eq!(outcome.errors[0].index, 1);
    assert_eq!(outcome.errors[0].reason, "Slot not found: label");
    assert_eq!(outcome.tree.get(&"aside".into()).unwrap().col_span, 3);
}

#[test]
fn commands_cover_every_operation() {
    let commands: Vec<LayoutCommand> = serde_json::from_value(json!([
        {"targetSlotId": "root", "operation": "create",
         "params": {"type": "image", "content": "/hero.png", "alt": "Hero", "id": "hero", "position": 0}},
        {"targetSlotId": "hero", "operation": "update", "params": {"className": "rounded"}},
        {"targetSlotId": "row", "operation": "duplicate"},
        {"targetSlotId": "aside", "operation": "move", "params": {"parentId": null}},
        {"operation": "reorder", "params": {"order": ["aside", "root"]}},
        {"targetSlotId": "hero", "operation": "resize", "params": {"colSpan": 8}},
        {"targetSlotId": "label", "operation": "delete"}
    ]))
    .unwrap();

    let outcome = CommandProcessor::default().execute(&commands, &nested()).unwrap();
    assert!(outcome.is_complete(), "errors: {:?}", outcome.errors);
    assert_eq!(outcome.executed_count, 7);

    let tree = &outcome.tree;
    assert_eq!(tree.root_order(), &[SlotId::from("aside"), SlotId::from("root")]);
    let hero = tree.get(&"hero".into()).unwrap();
    assert_eq!(hero.class_name, "rounded");
    assert_eq!(hero.col_span, 8);
    assert_eq!(hero.order, 0);
    assert_eq!(outcome.created.len(), 2);
    assert_eq!(validate(tree), Ok(()));
}
