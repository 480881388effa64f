//! Thread selection

use tracing::debug;

/// What caused a selection change
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    Click,
    Hover,
    Keyboard,
}

/// Exactly one thread's frames are visible at a time.
///
/// Starts on the first thread. An empty forest has nothing selected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectionController {
    thread_count: usize,
    selected: Option<usize>,
}

impl SelectionController {
    pub fn new(thread_count: usize) -> Self {
        Self {
            thread_count,
            selected: (thread_count > 0).then_some(0),
        }
    }

    pub fn selected(&self) -> Option<usize> {
        self.selected
    }

    /// Whether frames of thread `index` are shown
    pub fn frames_visible(&self, index: usize) -> bool {
        self.selected == Some(index)
    }

    /// Select thread `index`. Every trigger has the same effect.
    ///
    /// Returns whether the selection changed; reselecting the current thread
    /// or an index past the end is a no-op.
    pub fn select(&mut self, index: usize, trigger: Trigger) -> bool {
        if index >= self.thread_count || self.selected == Some(index) {
            return false;
        }
        debug!(from = ?self.selected, to = index, ?trigger, "Thread selected");
        self.selected = Some(index);
        true
    }

    /// Select the following thread, stopping at the last one
    pub fn next(&mut self) -> bool {
        match self.selected {
            Some(current) => self.select(current + 1, Trigger::Keyboard),
            None => false,
        }
    }

    /// Select the preceding thread, stopping at the first one
    pub fn prev(&mut self) -> bool {
        match self.selected {
            Some(current) if current > 0 => self.select(current - 1, Trigger::Keyboard),
            _ => false,
        }
    }
}
