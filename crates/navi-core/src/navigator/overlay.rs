//! Stacked overlays
//!
//! Each overlay owns one rendered node. New overlays go on top of the stack
//! and are listed first; nothing is replaced or removed unless dismissed.

use tracing::debug;

use crate::visualization::NodeView;

pub type OverlayId = u64;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Overlay {
    pub id: OverlayId,
    pub view: NodeView,
}

#[derive(Debug, Default)]
pub struct OverlayStack {
    overlays: Vec<Overlay>,
    next_id: OverlayId,
}

impl OverlayStack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, view: NodeView) -> OverlayId {
        let id = self.next_id;
        self.next_id += 1;
        debug!(id, base = %view.base, "Overlay opened");
        self.overlays.push(Overlay { id, view });
        id
    }

    pub fn dismiss(&mut self, id: OverlayId) -> Option<Overlay> {
        let position = self.overlays.iter().position(|o| o.id == id)?;
        let overlay = self.overlays.remove(position);
        debug!(id, "Overlay dismissed");
        Some(overlay)
    }

    pub fn dismiss_newest(&mut self) -> Option<Overlay> {
        let overlay = self.overlays.pop()?;
        debug!(id = overlay.id, "Overlay dismissed");
        Some(overlay)
    }

    pub fn get(&self, id: OverlayId) -> Option<&Overlay> {
        self.overlays.iter().find(|o| o.id == id)
    }

    pub fn newest(&self) -> Option<&Overlay> {
        self.overlays.last()
    }

    /// Overlays in display order, newest first
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &Overlay> {
        self.overlays.iter().rev()
    }

    pub fn len(&self) -> usize {
        self.overlays.len()
    }

    pub fn is_empty(&self) -> bool {
        self.overlays.is_empty()
    }
}
