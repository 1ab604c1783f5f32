/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! Keyboard handling for the workflow editor.
//!
//! Canvas gestures (drag, connect, marquee select) arrive through
//! [`CanvasChange`](crate::app::CanvasChange); this module covers the
//! editor-level shortcuts.

use keyboard_types::{Key, KeyState, KeyboardEvent, Modifiers, NamedKey};

use crate::app::EditorIntent;

/// Keyboard actions collected from a keyboard event.
///
/// This struct decouples input detection (requires the platform event)
/// from action application (pure state mutation), making actions testable.
#[derive(Default, Debug, PartialEq, Eq)]
pub struct KeyboardActions {
    pub undo: bool,
    pub redo: bool,
    pub delete_selected: bool,
    pub save: bool,
}

impl KeyboardActions {
    pub fn is_empty(&self) -> bool {
        !(self.undo || self.redo || self.delete_selected || self.save)
    }

    /// Whether the event that produced these actions must not also reach
    /// the platform's default handler (browser save dialog, page undo).
    pub fn suppresses_default(&self) -> bool {
        !self.is_empty()
    }
}

/// Whether the event carries the platform primary modifier (Ctrl, or
/// Command on macOS).
fn has_primary_modifier(event: &KeyboardEvent) -> bool {
    event.modifiers.contains(Modifiers::CONTROL) || event.modifiers.contains(Modifiers::META)
}

fn is_character(event: &KeyboardEvent, ch: &str) -> bool {
    match &event.key {
        Key::Character(s) => s.eq_ignore_ascii_case(ch),
        _ => false,
    }
}

/// Collect keyboard actions from one event (input detection only).
///
/// `has_selection` gates Delete/Backspace so an empty selection never
/// swallows the keystroke from a focused text field.
pub fn collect_actions(event: &KeyboardEvent, has_selection: bool) -> KeyboardActions {
    let mut actions = KeyboardActions::default();
    if event.state != KeyState::Down {
        return actions;
    }

    let primary = has_primary_modifier(event);
    let shift = event.modifiers.contains(Modifiers::SHIFT);

    // Ctrl+Z: undo, Ctrl+Shift+Z: redo. Held-key auto-repeat does not
    // replay undo; each step takes a fresh keypress.
    if primary && is_character(event, "z") {
        if shift {
            actions.redo = true;
        } else if !event.repeat {
            actions.undo = true;
        }
        return actions;
    }

    if primary && is_character(event, "y") {
        actions.redo = true;
        return actions;
    }

    if primary && is_character(event, "s") {
        actions.save = true;
        return actions;
    }

    if !primary
        && matches!(
            event.key,
            Key::Named(NamedKey::Delete) | Key::Named(NamedKey::Backspace)
        )
        && has_selection
    {
        actions.delete_selected = true;
    }

    actions
}

/// Convert keyboard actions to editor intents without applying them.
pub fn intents_from_actions(actions: &KeyboardActions) -> Vec<EditorIntent> {
    let mut intents = Vec::new();
    if actions.undo {
        intents.push(EditorIntent::Undo);
    }
    if actions.redo {
        intents.push(EditorIntent::Redo);
    }
    if actions.delete_selected {
        intents.push(EditorIntent::RemoveSelected);
    }
    if actions.save {
        intents.push(EditorIntent::Save);
    }
    intents
}
