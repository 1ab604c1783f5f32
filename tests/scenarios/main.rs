mod harness;

mod debounce;
mod undo_redo;
