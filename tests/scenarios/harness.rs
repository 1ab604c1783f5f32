use std::time::{Duration, Instant};

use flowgraph::app::{CanvasChange, EditorIntent, WorkflowEditorApp};
use flowgraph::graph::{EdgeKey, NodeKey, StepKind};

/// Drives a [`WorkflowEditorApp`] with an explicit clock so debounce
/// behavior is deterministic under test.
pub(crate) struct TestHarness {
    pub(crate) app: WorkflowEditorApp,
    clock: Instant,
}

impl TestHarness {
    pub(crate) fn new() -> Self {
        Self {
            app: WorkflowEditorApp::new_for_testing(),
            clock: Instant::now(),
        }
    }

    pub(crate) fn with_app(app: WorkflowEditorApp) -> Self {
        Self {
            app,
            clock: Instant::now(),
        }
    }

    /// Advance the clock and run one tick at the new instant.
    pub(crate) fn advance(&mut self, by: Duration) {
        self.clock += by;
        self.app.tick(self.clock);
    }

    pub(crate) fn apply(&mut self, intent: EditorIntent) {
        self.app.apply_intents([intent], self.clock);
    }

    /// Add a step and return its key.
    pub(crate) fn add_step(&mut self, kind: StepKind) -> NodeKey {
        self.apply(EditorIntent::AddNode { kind });
        self.newest_node()
    }

    pub(crate) fn connect(&mut self, source: NodeKey, target: NodeKey) -> Option<EdgeKey> {
        self.apply(EditorIntent::Connect { source, target });
        self.app.graph.find_edge_key(source, target)
    }

    pub(crate) fn select_nodes(&mut self, nodes: Vec<NodeKey>) {
        self.apply(EditorIntent::ApplyCanvasChanges {
            changes: vec![CanvasChange::SelectionReplaced {
                nodes,
                edges: vec![],
            }],
        });
    }

    /// Wait out the debounce interval so any pending snapshot commits.
    pub(crate) fn settle(&mut self) {
        self.advance(flowgraph::app::DEFAULT_HISTORY_DEBOUNCE + Duration::from_millis(10));
    }

    fn newest_node(&self) -> NodeKey {
        self.app
            .graph
            .nodes()
            .map(|(key, _)| key)
            .max_by_key(|key| key.index())
            .expect("graph should have at least one node")
    }
}
