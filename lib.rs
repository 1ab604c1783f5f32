/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! Editor core for a node-based workflow builder.
//!
//! The crate owns the graph of workflow steps, the undo/redo history, the
//! commit debouncer, and the selection derived from canvas events. Rendering
//! and form widgets live in the host UI; they talk to this crate through
//! [`app::EditorIntent`] and [`app::CanvasChange`].

pub mod app;
pub mod graph;
pub mod history;
pub mod input;
pub mod persistence;

pub use app::WorkflowEditorApp;
