use flowgraph::graph::StepKind;

use super::harness::TestHarness;

#[test]
fn test_undo_reverts_to_previous_graph() {
    let mut harness = TestHarness::new();
    let node_a = harness.add_step(StepKind::Wait);
    let node_b = harness.add_step(StepKind::Call);

    assert_eq!(harness.app.graph.node_count(), 2);

    assert!(harness.app.perform_undo());
    assert_eq!(harness.app.graph.node_count(), 1);
    assert!(harness.app.graph.get_node(node_a).is_some());
    assert!(harness.app.graph.get_node(node_b).is_none());
}

#[test]
fn test_redo_reapplies_after_undo() {
    let mut harness = TestHarness::new();
    harness.add_step(StepKind::Wait);
    harness.add_step(StepKind::Call);

    harness.app.perform_undo();
    assert_eq!(harness.app.graph.node_count(), 1);

    assert!(harness.app.perform_redo());
    assert_eq!(harness.app.graph.node_count(), 2);
}

#[test]
fn test_undo_at_baseline_fails() {
    let mut harness = TestHarness::new();
    assert!(!harness.app.perform_undo());
    assert!(!harness.app.can_undo());

    harness.add_step(StepKind::Wait);
    assert!(harness.app.perform_undo());
    // Back at the empty baseline.
    assert!(!harness.app.perform_undo());
    assert_eq!(harness.app.graph.node_count(), 0);
}

#[test]
fn test_redo_without_undo_fails() {
    let mut harness = TestHarness::new();
    harness.add_step(StepKind::Wait);
    assert!(!harness.app.can_redo());
    assert!(!harness.app.perform_redo());
}

#[test]
fn test_commit_after_undo_truncates_redo_branch() {
    // Empty -> add A -> add B, undo back to A, then add C. The B entry
    // is discarded and redo has nothing to apply.
    let mut harness = TestHarness::new();
    let node_a = harness.add_step(StepKind::Wait);
    let node_b = harness.add_step(StepKind::Call);

    harness.app.perform_undo();
    assert!(harness.app.can_redo());

    let node_c = harness.add_step(StepKind::Email);
    assert!(!harness.app.can_redo());
    assert!(!harness.app.perform_redo());

    assert!(harness.app.graph.get_node(node_a).is_some());
    assert!(harness.app.graph.get_node(node_c).is_some());
    assert!(harness.app.graph.get_node(node_b).is_none());

    // Undo now steps back through the new branch: C gone, A remains.
    harness.app.perform_undo();
    assert_eq!(harness.app.graph.node_count(), 1);
    assert!(harness.app.graph.get_node(node_a).is_some());
}

#[test]
fn test_undo_restores_removed_subgraph_with_edges() {
    let mut harness = TestHarness::new();
    let node_a = harness.add_step(StepKind::Wait);
    let node_b = harness.add_step(StepKind::Call);
    harness.connect(node_a, node_b).unwrap();
    assert_eq!(harness.app.graph.edge_count(), 1);

    harness.select_nodes(vec![node_a]);
    harness.apply(flowgraph::app::EditorIntent::RemoveSelected);
    assert_eq!(harness.app.graph.node_count(), 1);
    assert_eq!(harness.app.graph.edge_count(), 0);

    assert!(harness.app.perform_undo());
    assert_eq!(harness.app.graph.node_count(), 2);
    assert_eq!(harness.app.graph.edge_count(), 1);
}

#[test]
fn test_undo_clears_selection() {
    let mut harness = TestHarness::new();
    let node_a = harness.add_step(StepKind::Wait);
    harness.select_nodes(vec![node_a]);
    assert!(harness.app.can_delete());

    harness.app.perform_undo();
    assert!(harness.app.selection.is_empty());
    assert!(!harness.app.can_delete());
}

#[test]
fn test_history_trimmed_at_max_entries() {
    let mut harness = TestHarness::new();
    for _ in 0..140 {
        harness.add_step(StepKind::Wait);
    }
    assert!(harness.app.history_len() <= 128);

    // Undo all the way; the oldest states fell off the front.
    let mut undos = 0;
    while harness.app.perform_undo() {
        undos += 1;
    }
    assert_eq!(undos, harness.app.history_len() - 1);
    assert!(harness.app.graph.node_count() > 0);
}
