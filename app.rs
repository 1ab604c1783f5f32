/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! Application state for the workflow editor.
//!
//! `WorkflowEditorApp` owns the live graph, the snapshot history, the
//! debounce timer that batches continuous gestures into single history
//! entries, and the selection. All mutation flows through [`EditorIntent`]
//! values so every write path passes the same history bookkeeping.

use std::collections::HashSet;
use std::ops::Deref;
use std::path::Path;
use std::time::{Duration, Instant};

use euclid::default::Point2D;
use log::{debug, warn};

use crate::graph::{ConfigValue, EdgeKey, Graph, NodeKey, StepKind};
use crate::history::debounce::DebounceTimer;
use crate::history::{EditorMode, HistoryLog};
use crate::persistence::types::WorkflowDocument;
use crate::persistence::{self, StoreError, WORKFLOW_STORE_KEY, WorkflowStore};

/// Interval a continuous gesture must stay quiet before its pending
/// snapshot is committed to history.
pub const DEFAULT_HISTORY_DEBOUNCE: Duration = Duration::from_millis(100);

/// Horizontal offset for nodes spawned without an explicit position.
const SPAWN_X: f32 = 250.0;
/// Vertical spacing between successive spawned nodes.
const SPAWN_Y_STEP: f32 = 100.0;

/// Canonical selection state.
///
/// Wraps the selected node and edge sets with explicit metadata so
/// consumers can reason about selection changes deterministically.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SelectionState {
    nodes: HashSet<NodeKey>,
    edges: HashSet<EdgeKey>,
    order: Vec<NodeKey>,
    primary: Option<NodeKey>,
    revision: u64,
}

impl SelectionState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Monotonic revision incremented whenever the selection changes.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Primary selected node (last in replacement order).
    pub fn primary(&self) -> Option<NodeKey> {
        self.primary
    }

    pub fn selected_edges(&self) -> &HashSet<EdgeKey> {
        &self.edges
    }

    /// Replace the whole selection with the given sets.
    ///
    /// No-op (revision included) when the incoming selection matches the
    /// current one, so repeated identical reports from the canvas do not
    /// churn downstream consumers.
    pub fn replace(&mut self, nodes: Vec<NodeKey>, edges: Vec<EdgeKey>) {
        let incoming_nodes: HashSet<NodeKey> = nodes.iter().copied().collect();
        let incoming_edges: HashSet<EdgeKey> = edges.iter().copied().collect();
        if incoming_nodes == self.nodes && incoming_edges == self.edges {
            return;
        }

        self.nodes = incoming_nodes;
        self.edges = incoming_edges;
        self.order.clear();
        for key in nodes {
            if !self.order.contains(&key) {
                self.order.push(key);
            }
        }
        self.primary = self.order.last().copied();
        self.revision = self.revision.saturating_add(1);
    }

    pub fn clear(&mut self) {
        if self.nodes.is_empty() && self.edges.is_empty() && self.primary.is_none() {
            return;
        }
        self.nodes.clear();
        self.edges.clear();
        self.order.clear();
        self.primary = None;
        self.revision = self.revision.saturating_add(1);
    }

    /// Drop selected keys that no longer resolve in the graph.
    pub(crate) fn retain_valid(&mut self, graph: &Graph) {
        let before = (self.nodes.len(), self.edges.len());
        self.nodes.retain(|key| graph.get_node(*key).is_some());
        self.edges.retain(|key| graph.get_edge(*key).is_some());
        self.order.retain(|key| self.nodes.contains(key));
        self.primary = self.order.last().copied();
        if (self.nodes.len(), self.edges.len()) != before {
            self.revision = self.revision.saturating_add(1);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty() && self.edges.is_empty()
    }
}

impl Deref for SelectionState {
    type Target = HashSet<NodeKey>;

    fn deref(&self) -> &Self::Target {
        &self.nodes
    }
}

/// Whether a mutation commits a history entry now or after the debounce
/// interval elapses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommitTiming {
    /// Discrete action: commit a snapshot immediately.
    Immediate,
    /// Continuous gesture: arm (or re-arm) the debounce timer.
    Debounced,
}

/// A change reported by the canvas surface.
#[derive(Debug, Clone, PartialEq)]
pub enum CanvasChange {
    /// A node moved. `dragging` is true for intermediate positions while
    /// the pointer is still down.
    NodeMoved {
        key: NodeKey,
        position: Point2D<f32>,
        dragging: bool,
    },
    /// The canvas removed a node directly.
    NodeRemoved { key: NodeKey },
    /// The canvas removed an edge directly.
    EdgeRemoved { key: EdgeKey },
    /// The canvas reports a new selection wholesale.
    SelectionReplaced {
        nodes: Vec<NodeKey>,
        edges: Vec<EdgeKey>,
    },
}

/// A declarative mutation or command applied to the editor.
#[derive(Debug, Clone, PartialEq)]
pub enum EditorIntent {
    /// Add a step at the default spawn position.
    AddNode { kind: StepKind },
    /// Add a step at an explicit canvas position.
    AddNodeAt {
        kind: StepKind,
        position: Point2D<f32>,
    },
    /// Connect two existing steps.
    Connect { source: NodeKey, target: NodeKey },
    /// Rename a step from the config form.
    SetNodeLabel { key: NodeKey, label: String },
    /// Set one config field from the config form.
    SetConfigField {
        key: NodeKey,
        field: String,
        value: ConfigValue,
    },
    /// Apply a batch of changes reported by the canvas.
    ApplyCanvasChanges { changes: Vec<CanvasChange> },
    /// Remove every selected node and edge.
    RemoveSelected,
    /// Remove every node and edge.
    ClearGraph,
    Undo,
    Redo,
    /// Persist the workflow to the store.
    Save,
    /// Replace the workflow with the stored document.
    Load,
}

/// Top-level editor state.
pub struct WorkflowEditorApp {
    pub graph: Graph,
    pub selection: SelectionState,
    history: HistoryLog<Graph>,
    debounce: DebounceTimer,
    mode: EditorMode,
    store: Option<WorkflowStore>,
}

impl WorkflowEditorApp {
    /// Create an editor backed by the platform data directory, or without
    /// a store when the platform offers none.
    pub fn new() -> Self {
        let store = WorkflowStore::default_data_dir().and_then(|dir| {
            persistence::warn_on_error(WorkflowStore::open(dir), "Failed to open workflow store")
        });
        Self::with_store(store)
    }

    /// Create an editor with an explicit store.
    pub fn with_store(store: Option<WorkflowStore>) -> Self {
        let graph = Graph::new();
        let history = HistoryLog::new(graph.clone());
        Self {
            graph,
            selection: SelectionState::new(),
            history,
            debounce: DebounceTimer::new(DEFAULT_HISTORY_DEBOUNCE),
            mode: EditorMode::Editing,
            store,
        }
    }

    /// Editor with no store at all, for tests that never touch disk.
    pub fn new_for_testing() -> Self {
        Self::with_store(None)
    }

    pub fn mode(&self) -> EditorMode {
        self.mode
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    /// Delete is available whenever anything is selected.
    pub fn can_delete(&self) -> bool {
        !self.selection.is_empty()
    }

    /// The config form targets the primary selected node.
    pub fn can_configure(&self) -> bool {
        self.selection.primary().is_some()
    }

    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    /// Whether a debounced commit is still pending.
    pub fn has_pending_commit(&self) -> bool {
        self.debounce.is_armed()
    }

    /// Apply a batch of intents at the given instant.
    pub fn apply_intents<I>(&mut self, intents: I, now: Instant)
    where
        I: IntoIterator<Item = EditorIntent>,
    {
        for intent in intents {
            self.apply_intent(intent, now);
        }
    }

    fn apply_intent(&mut self, intent: EditorIntent, now: Instant) {
        match intent {
            EditorIntent::AddNode { kind } => {
                self.add_node(kind, self.next_spawn_position(), now);
            },
            EditorIntent::AddNodeAt { kind, position } => {
                self.add_node(kind, position, now);
            },
            EditorIntent::Connect { source, target } => {
                self.connect(source, target, now);
            },
            EditorIntent::SetNodeLabel { key, label } => {
                if self.graph.set_node_label(key, label) {
                    self.mark_history(CommitTiming::Debounced, now);
                }
            },
            EditorIntent::SetConfigField { key, field, value } => {
                if self.graph.set_config_value(key, &field, value) {
                    self.mark_history(CommitTiming::Debounced, now);
                }
            },
            EditorIntent::ApplyCanvasChanges { changes } => {
                self.apply_canvas_changes(changes, now);
            },
            EditorIntent::RemoveSelected => self.remove_selected(now),
            EditorIntent::ClearGraph => self.clear_graph(),
            EditorIntent::Undo => {
                let _ = self.perform_undo();
            },
            EditorIntent::Redo => {
                let _ = self.perform_redo();
            },
            EditorIntent::Save => {
                let _ = persistence::warn_on_error(self.save(), "Failed to save workflow");
            },
            EditorIntent::Load => {
                let _ = persistence::warn_on_error(self.load(), "Failed to load workflow");
            },
        }
    }

    /// Spawn position for the next node added without an explicit one.
    pub fn next_spawn_position(&self) -> Point2D<f32> {
        Point2D::new(
            SPAWN_X,
            SPAWN_Y_STEP + SPAWN_Y_STEP * self.graph.node_count() as f32,
        )
    }

    fn add_node(&mut self, kind: StepKind, position: Point2D<f32>, now: Instant) -> NodeKey {
        let key = self.graph.add_node(kind, position);
        self.mark_history(CommitTiming::Immediate, now);
        key
    }

    fn connect(&mut self, source: NodeKey, target: NodeKey, now: Instant) -> Option<EdgeKey> {
        let key = self.graph.add_edge(source, target);
        match key {
            Some(_) => self.mark_history(CommitTiming::Immediate, now),
            None => warn!("Rejected connection {source:?} -> {target:?}"),
        }
        key
    }

    fn apply_canvas_changes(&mut self, changes: Vec<CanvasChange>, now: Instant) {
        let mut removed = false;
        let mut drag_settled = false;

        for change in changes {
            match change {
                CanvasChange::NodeMoved {
                    key,
                    position,
                    dragging,
                } => {
                    // Intermediate frames update the live position but
                    // never reach history; only the settled position is
                    // history-worthy.
                    if self.graph.set_node_position(key, position) && !dragging {
                        drag_settled = true;
                    }
                },
                CanvasChange::NodeRemoved { key } => {
                    if self.graph.remove_node(key) {
                        removed = true;
                    }
                },
                CanvasChange::EdgeRemoved { key } => {
                    if self.graph.remove_edge(key) {
                        removed = true;
                    }
                },
                CanvasChange::SelectionReplaced { nodes, edges } => {
                    self.selection.replace(nodes, edges);
                },
            }
        }

        // Removals may have invalidated selected keys.
        if removed {
            self.selection.retain_valid(&self.graph);
            self.mark_history(CommitTiming::Immediate, now);
        } else if drag_settled {
            self.mark_history(CommitTiming::Debounced, now);
        }
    }

    fn remove_selected(&mut self, now: Instant) {
        if self.selection.is_empty() {
            return;
        }

        let nodes: Vec<NodeKey> = self.selection.iter().copied().collect();
        let edges: Vec<EdgeKey> = self.selection.selected_edges().iter().copied().collect();

        let mut removed = false;
        // Node removal cascades to incident edges, so nodes go first and
        // already-gone edge keys are skipped below.
        for key in nodes {
            removed |= self.graph.remove_node(key);
        }
        for key in edges {
            removed |= self.graph.remove_edge(key);
        }

        self.selection.clear();
        if removed {
            self.mark_history(CommitTiming::Immediate, now);
        }
    }

    /// Reset to an empty workflow. Clearing is a fresh baseline, not an
    /// undoable edit.
    pub fn clear_graph(&mut self) {
        self.debounce.cancel();
        self.graph = Graph::new();
        self.selection.clear();
        self.history.reset(self.graph.clone());
    }

    /// Record a mutation in history with the given timing.
    ///
    /// Suppressed while replaying a snapshot: applying history must not
    /// itself create history.
    fn mark_history(&mut self, timing: CommitTiming, now: Instant) {
        if self.mode == EditorMode::Replaying {
            return;
        }
        match timing {
            CommitTiming::Immediate => {
                self.debounce.cancel();
                self.history.commit(self.graph.clone());
            },
            CommitTiming::Debounced => self.debounce.arm(now),
        }
    }

    /// Drive the debounce timer. Commits at most one pending snapshot.
    pub fn tick(&mut self, now: Instant) {
        if self.debounce.fire(now) {
            self.history.commit(self.graph.clone());
        }
    }

    /// Step back one history entry. Returns false at the oldest entry.
    pub fn perform_undo(&mut self) -> bool {
        // A pending debounced snapshot would capture post-undo state under
        // a pre-undo label; drop it.
        self.debounce.cancel();
        let Some(snapshot) = self.history.undo() else {
            return false;
        };
        let snapshot = snapshot.clone();
        self.apply_snapshot(snapshot);
        true
    }

    /// Step forward one history entry. Returns false at the newest entry.
    pub fn perform_redo(&mut self) -> bool {
        self.debounce.cancel();
        let Some(snapshot) = self.history.redo() else {
            return false;
        };
        let snapshot = snapshot.clone();
        self.apply_snapshot(snapshot);
        true
    }

    fn apply_snapshot(&mut self, snapshot: Graph) {
        self.mode = EditorMode::Replaying;
        self.graph = snapshot;
        self.selection.clear();
        self.mode = EditorMode::Editing;
    }

    /// Persist the current workflow under the store key.
    pub fn save(&self) -> Result<(), StoreError> {
        let Some(store) = &self.store else {
            return Err(StoreError::Io("No workflow store configured".to_string()));
        };
        let document = self.graph.to_document();
        store.save(WORKFLOW_STORE_KEY, &document)?;
        debug!(
            "Saved workflow: {} nodes, {} edges",
            document.nodes.len(),
            document.edges.len()
        );
        Ok(())
    }

    /// Replace the live workflow with the stored document.
    ///
    /// On any load or parse failure the live graph, selection, and history
    /// are left untouched.
    pub fn load(&mut self) -> Result<(), StoreError> {
        let Some(store) = &self.store else {
            return Err(StoreError::Io("No workflow store configured".to_string()));
        };
        let document = store.load(WORKFLOW_STORE_KEY)?;
        self.replace_with_document(&document);
        Ok(())
    }

    /// Write the current workflow to a date-stamped export file in `dir`.
    pub fn export(&self, dir: &Path) -> Result<std::path::PathBuf, StoreError> {
        persistence::export_document(&self.graph.to_document(), dir)
    }

    /// Install a parsed document as the new workflow and history baseline.
    pub fn replace_with_document(&mut self, document: &WorkflowDocument) {
        self.debounce.cancel();
        self.graph = Graph::from_document(document);
        self.selection.clear();
        self.history.reset(self.graph.clone());
        if self.graph.node_count() < document.nodes.len() {
            warn!(
                "Dropped {} unparseable nodes while loading workflow",
                document.nodes.len() - self.graph.node_count()
            );
        }
    }
}

impl Default for WorkflowEditorApp {
    fn default() -> Self {
        Self::new()
    }
}
