use std::time::Duration;

use euclid::default::Point2D;
use flowgraph::app::{CanvasChange, EditorIntent};
use flowgraph::graph::StepKind;

use super::harness::TestHarness;

fn drag_to(harness: &mut TestHarness, key: flowgraph::graph::NodeKey, x: f32, dragging: bool) {
    harness.apply(EditorIntent::ApplyCanvasChanges {
        changes: vec![CanvasChange::NodeMoved {
            key,
            position: Point2D::new(x, 0.0),
            dragging,
        }],
    });
}

#[test]
fn test_drag_stream_commits_one_entry_at_final_position() {
    let mut harness = TestHarness::new();
    let key = harness.add_step(StepKind::Wait);
    let history_before = harness.app.history_len();

    // Rapid intermediate positions, each within the debounce window.
    for i in 1..=10 {
        drag_to(&mut harness, key, i as f32 * 10.0, true);
        harness.advance(Duration::from_millis(5));
    }
    drag_to(&mut harness, key, 500.0, false);
    assert!(harness.app.has_pending_commit());
    assert_eq!(harness.app.history_len(), history_before);

    harness.settle();

    assert_eq!(harness.app.history_len(), history_before + 1);
    assert_eq!(
        harness.app.graph.get_node(key).unwrap().position,
        Point2D::new(500.0, 0.0)
    );

    // One undo jumps straight back past the whole gesture.
    harness.app.perform_undo();
    assert_eq!(
        harness.app.graph.get_node(key).unwrap().position,
        Point2D::new(250.0, 100.0)
    );
}

#[test]
fn test_each_change_pushes_deadline_back() {
    let mut harness = TestHarness::new();
    let key = harness.add_step(StepKind::Wait);
    let history_before = harness.app.history_len();

    harness.apply(EditorIntent::SetNodeLabel {
        key,
        label: "Pa".to_string(),
    });
    // 60ms later the timer has not fired yet; the next edit re-arms it.
    harness.advance(Duration::from_millis(60));
    harness.apply(EditorIntent::SetNodeLabel {
        key,
        label: "Pause".to_string(),
    });
    harness.advance(Duration::from_millis(60));

    // 120ms since the first edit but only 60ms since the last.
    assert_eq!(harness.app.history_len(), history_before);
    assert!(harness.app.has_pending_commit());

    harness.advance(Duration::from_millis(50));
    assert_eq!(harness.app.history_len(), history_before + 1);
}

#[test]
fn test_intermediate_drag_frames_never_arm_the_timer() {
    let mut harness = TestHarness::new();
    let key = harness.add_step(StepKind::Wait);
    let history_before = harness.app.history_len();

    drag_to(&mut harness, key, 30.0, true);
    assert!(!harness.app.has_pending_commit());

    // Even a long mid-drag pause commits nothing.
    harness.advance(Duration::from_millis(500));
    assert_eq!(harness.app.history_len(), history_before);

    drag_to(&mut harness, key, 60.0, false);
    assert!(harness.app.has_pending_commit());
}

#[test]
fn test_discrete_action_flushes_nothing_extra() {
    // A pending debounced edit followed by an immediate action yields
    // exactly one new entry for the immediate action; the pending timer
    // is cancelled rather than left to fire on stale state.
    let mut harness = TestHarness::new();
    let key = harness.add_step(StepKind::Wait);
    let history_before = harness.app.history_len();

    drag_to(&mut harness, key, 42.0, false);
    assert!(harness.app.has_pending_commit());

    harness.add_step(StepKind::Call);
    assert!(!harness.app.has_pending_commit());
    assert_eq!(harness.app.history_len(), history_before + 1);

    // Nothing else lands after the interval.
    harness.settle();
    assert_eq!(harness.app.history_len(), history_before + 1);
}

#[test]
fn test_label_edits_coalesce_per_keystroke() {
    let mut harness = TestHarness::new();
    let key = harness.add_step(StepKind::Wait);
    let history_before = harness.app.history_len();

    for label in ["P", "Pa", "Pau", "Paus", "Pause"] {
        harness.apply(EditorIntent::SetNodeLabel {
            key,
            label: label.to_string(),
        });
        harness.advance(Duration::from_millis(20));
    }
    harness.settle();

    assert_eq!(harness.app.history_len(), history_before + 1);
    assert_eq!(harness.app.graph.get_node(key).unwrap().label, "Pause");
}

#[test]
fn test_tick_without_pending_commit_is_noop() {
    let mut harness = TestHarness::new();
    harness.add_step(StepKind::Wait);
    let history_before = harness.app.history_len();

    harness.settle();
    harness.settle();
    assert_eq!(harness.app.history_len(), history_before);
}
