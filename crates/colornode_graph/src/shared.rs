// SPDX-License-Identifier: MIT OR Apache-2.0
//! Shared access to an editor session from several threads.
//!
//! The editor itself is single-threaded. Handing it to more than one caller
//! goes through [`SharedEditor`], which holds one lock across a whole frame
//! so interaction handling and evaluation never interleave.

use crate::clock::Clock;
use crate::color::OutputColor;
use crate::editor::{ColorEditor, EditorSettings, Interaction};
use parking_lot::Mutex;
use std::sync::Arc;

/// An editor session behind a single writer lock
#[derive(Debug, Clone, Default)]
pub struct SharedEditor {
    inner: Arc<Mutex<ColorEditor>>,
}

impl SharedEditor {
    /// Wrap a new editor
    pub fn new(settings: EditorSettings) -> Self {
        Self::from_editor(ColorEditor::new(settings))
    }

    /// Wrap an existing editor
    pub fn from_editor(editor: ColorEditor) -> Self {
        Self {
            inner: Arc::new(Mutex::new(editor)),
        }
    }

    /// Run one frame: apply `interactions`, then evaluate.
    ///
    /// Returns the frame's color and the number of skipped interactions.
    pub fn frame(
        &self,
        interactions: impl IntoIterator<Item = Interaction>,
        clock: &impl Clock,
    ) -> (OutputColor, usize) {
        let mut editor = self.inner.lock();
        let failed = editor.handle(interactions);
        let color = editor.tick(clock);
        (color, failed)
    }

    /// Run `f` with exclusive access to the editor
    pub fn with<R>(&self, f: impl FnOnce(&mut ColorEditor) -> R) -> R {
        f(&mut self.inner.lock())
    }
}
