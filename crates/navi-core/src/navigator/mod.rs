//! Browsing state
//!
//! [`Navigator`] is the only state that survives between renders: the
//! rendered forest, the thread selection, the overlay stack and which link
//! has keyboard focus. Fetching is left to [`LazyExpander`]; its completions
//! are handed to [`Navigator::apply`].

mod expander;
mod overlay;
mod selection;

pub use expander::{Expansion, LazyExpander};
pub use overlay::{Overlay, OverlayId, OverlayStack};
pub use selection::{SelectionController, Trigger};

use tracing::{error, warn};

use crate::model::Forest;
use crate::path::RefPath;
use crate::visualization::{ForestView, NodeView, RenderOptions, ThreadView, ValueView};

/// A region holding interactive values
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pane {
    /// Frames of the selected thread
    Frames,
    Overlay(OverlayId),
}

/// The focused link: its pane and its position among that pane's links
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LinkFocus {
    pub pane: Pane,
    pub index: usize,
}

/// Result of applying a finished fetch
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Opened(OverlayId),
    /// The fetch failed; nothing on screen changed
    Failed { path: RefPath, reason: String },
}

#[derive(Debug)]
pub struct Navigator {
    forest: ForestView,
    selection: SelectionController,
    overlays: OverlayStack,
    focus: Option<LinkFocus>,
}

impl Navigator {
    pub fn new(forest: &Forest) -> Self {
        let forest = ForestView::render(forest);
        Self {
            selection: SelectionController::new(forest.threads.len()),
            forest,
            overlays: OverlayStack::new(),
            focus: None,
        }
    }

    pub fn forest(&self) -> &ForestView {
        &self.forest
    }

    pub fn selection(&self) -> &SelectionController {
        &self.selection
    }

    pub fn selected_thread(&self) -> Option<&ThreadView> {
        self.selection
            .selected()
            .and_then(|index| self.forest.threads.get(index))
    }

    pub fn overlays(&self) -> &OverlayStack {
        &self.overlays
    }

    /// Select a thread. Returns whether the selection changed.
    pub fn select(&mut self, index: usize, trigger: Trigger) -> bool {
        let changed = self.selection.select(index, trigger);
        if changed {
            self.clear_focus_in(Pane::Frames);
        }
        changed
    }

    pub fn select_next(&mut self) -> bool {
        let changed = self.selection.next();
        if changed {
            self.clear_focus_in(Pane::Frames);
        }
        changed
    }

    pub fn select_prev(&mut self) -> bool {
        let changed = self.selection.prev();
        if changed {
            self.clear_focus_in(Pane::Frames);
        }
        changed
    }

    /// Apply a finished fetch. A success opens a new overlay on top; a
    /// failure is logged and leaves the forest and every overlay untouched.
    pub fn apply(&mut self, expansion: Expansion) -> Outcome {
        let Expansion { path, result } = expansion;
        match result {
            Ok(node) => Outcome::Opened(self.overlays.push(NodeView::render(path, node))),
            Err(err) => {
                if err.is_fetch_failure() {
                    warn!(path = %path, code = err.code(), error = %err, "Fetch failed");
                } else {
                    error!(path = %path, code = err.code(), error = %err, "Expansion failed");
                }
                Outcome::Failed {
                    path,
                    reason: err.to_string(),
                }
            }
        }
    }

    pub fn dismiss(&mut self, id: OverlayId) -> bool {
        let dismissed = self.overlays.dismiss(id).is_some();
        if dismissed {
            self.clear_focus_in(Pane::Overlay(id));
        }
        dismissed
    }

    pub fn dismiss_newest(&mut self) -> Option<OverlayId> {
        let id = self.overlays.dismiss_newest()?.id;
        self.clear_focus_in(Pane::Overlay(id));
        Some(id)
    }

    /// Interactive values of the selected thread's frames, in display order
    pub fn frame_links(&self) -> Vec<&ValueView> {
        self.selected_thread()
            .map(|thread| {
                thread
                    .frames
                    .iter()
                    .flat_map(|frame| frame.slots.iter().map(|slot| &slot.value))
                    .filter(|value| value.is_interactive())
                    .collect()
            })
            .unwrap_or_default()
    }

    fn pane_links(&self, pane: Pane) -> Vec<&ValueView> {
        match pane {
            Pane::Frames => self.frame_links(),
            Pane::Overlay(id) => self
                .overlays
                .get(id)
                .map(|overlay| overlay.view.links())
                .unwrap_or_default(),
        }
    }

    /// Every focusable link on screen: frames first, then overlays newest first
    pub fn links(&self) -> Vec<(LinkFocus, &ValueView)> {
        let panes = std::iter::once(Pane::Frames)
            .chain(self.overlays.iter().map(|overlay| Pane::Overlay(overlay.id)));
        panes
            .flat_map(|pane| {
                self.pane_links(pane)
                    .into_iter()
                    .enumerate()
                    .map(move |(index, value)| (LinkFocus { pane, index }, value))
            })
            .collect()
    }

    pub fn focus(&self) -> Option<LinkFocus> {
        self.focus
    }

    /// Focused link index within `pane`, for highlighting
    pub fn focus_in(&self, pane: Pane) -> Option<usize> {
        self.focus
            .filter(|focus| focus.pane == pane)
            .map(|focus| focus.index)
    }

    /// Focus a specific link. Ignored if no such link is on screen.
    pub fn set_focus(&mut self, focus: LinkFocus) -> bool {
        if focus.index < self.pane_links(focus.pane).len() {
            self.focus = Some(focus);
            true
        } else {
            false
        }
    }

    pub fn focus_next(&mut self) -> Option<LinkFocus> {
        self.step_focus(true)
    }

    pub fn focus_prev(&mut self) -> Option<LinkFocus> {
        self.step_focus(false)
    }

    fn step_focus(&mut self, forward: bool) -> Option<LinkFocus> {
        let order: Vec<LinkFocus> = self.links().into_iter().map(|(focus, _)| focus).collect();
        if order.is_empty() {
            self.focus = None;
            return None;
        }

        let current = self
            .focus
            .and_then(|focus| order.iter().position(|candidate| *candidate == focus));
        let next = match (current, forward) {
            (None, true) => 0,
            (None, false) => order.len() - 1,
            (Some(i), true) => (i + 1) % order.len(),
            (Some(i), false) => (i + order.len() - 1) % order.len(),
        };
        self.focus = Some(order[next]);
        self.focus
    }

    /// Path the focused link fetches when activated
    pub fn focused_target(&self) -> Option<RefPath> {
        let focus = self.focus?;
        self.pane_links(focus.pane)
            .get(focus.index)
            .and_then(|value| value.target.clone())
    }

    fn clear_focus_in(&mut self, pane: Pane) {
        if self.focus.is_some_and(|focus| focus.pane == pane) {
            self.focus = None;
        }
    }

    /// Plain-text rendering: thread list with the selected thread's frames,
    /// then the overlays newest first
    pub fn render_text(&self, options: &RenderOptions) -> String {
        let mut output = self
            .forest
            .render_text(options, |index| self.selection.frames_visible(index));
        for overlay in self.overlays.iter() {
            output.push_str(&format!("\n[{}] {}\n", overlay.id, overlay.view.base));
            output.push_str(&overlay.view.render_text(options));
        }
        output
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::model::{Frame, Node, Slot, Thread};

    fn forest() -> Forest {
        Forest {
            threads: vec![
                Thread {
                    name: "main".to_string(),
                    frames: vec![Frame {
                        function: "com/example/Main.run()V:10".to_string(),
                        native: false,
                        slots: vec![
                            Slot::new("this", "<c.e.Main>").with_reference("/t/0/0/this"),
                            Slot::new("n", "1"),
                            Slot::new("args", "<String[]>").with_reference("/t/0/0/args"),
                        ],
                    }],
                },
                Thread {
                    name: "worker".to_string(),
                    frames: vec![Frame {
                        function: "java/lang/Thread.run()V".to_string(),
                        native: false,
                        slots: vec![Slot::new("this", "<j.l.Thread>").with_reference("/t/1/0/this")],
                    }],
                },
            ],
        }
    }

    fn object_at(path: &str) -> Expansion {
        Expansion {
            path: path.into(),
            result: Ok(Node::Object {
                jni: "Lcom/example/Main;".to_string(),
                slots: vec![Slot::new("count", "3").with_reference("count")],
            }),
        }
    }

    #[test]
    fn test_initial_state() {
        let nav = Navigator::new(&forest());
        assert_eq!(nav.selected_thread().map(|t| t.name.as_str()), Some("main"));
        assert!(nav.overlays().is_empty());
        assert!(nav.focus().is_none());
        assert_eq!(nav.frame_links().len(), 2);
    }

    #[test]
    fn test_select_shows_only_selected_frames() {
        let mut nav = Navigator::new(&forest());
        assert!(nav.select(1, Trigger::Hover));

        let text = nav.render_text(&RenderOptions::minimal());
        assert!(text.contains("Thread: main\n"));
        assert!(!text.contains("c.e.Main.run"));
        assert!(text.contains("j.l.Thread.run"));

        assert!(!nav.select(1, Trigger::Click));
        assert_eq!(nav.render_text(&RenderOptions::minimal()), text);
    }

    #[test]
    fn test_apply_success_opens_overlay() {
        let mut nav = Navigator::new(&forest());
        let Outcome::Opened(id) = nav.apply(object_at("/t/0/0/this")) else {
            panic!("expected an overlay");
        };

        let overlay = nav.overlays().get(id).unwrap();
        assert_eq!(overlay.view.base.as_str(), "/t/0/0/this");
        assert_eq!(
            overlay.view.links()[0].target.as_ref().map(RefPath::as_str),
            Some("/t/0/0/this/count")
        );
    }

    #[test]
    fn test_failure_keeps_existing_overlay() {
        let mut nav = Navigator::new(&forest());
        let Outcome::Opened(id) = nav.apply(object_at("/t/0/0/this")) else {
            panic!("expected an overlay");
        };
        nav.set_focus(LinkFocus {
            pane: Pane::Overlay(id),
            index: 0,
        });

        let outcome = nav.apply(Expansion {
            path: "/t/0/0/this/count".into(),
            result: Err(Error::HttpStatus {
                path: "/t/0/0/this/count".to_string(),
                status: 500,
            }),
        });
        assert!(matches!(outcome, Outcome::Failed { .. }));

        assert_eq!(nav.overlays().len(), 1);
        assert_eq!(nav.focus_in(Pane::Overlay(id)), Some(0));
        assert_eq!(
            nav.focused_target().as_ref().map(RefPath::as_str),
            Some("/t/0/0/this/count")
        );
    }

    #[test]
    fn test_overlays_coexist() {
        let mut nav = Navigator::new(&forest());
        nav.apply(object_at("/t/0/0/this"));
        nav.apply(object_at("/t/0/0/this/count"));

        let bases: Vec<&str> = nav.overlays().iter().map(|o| o.view.base.as_str()).collect();
        assert_eq!(bases, vec!["/t/0/0/this/count", "/t/0/0/this"]);
    }

    #[test]
    fn test_focus_cycles_frames_then_overlays() {
        let mut nav = Navigator::new(&forest());
        let Outcome::Opened(id) = nav.apply(object_at("/t/0/0/this")) else {
            panic!("expected an overlay");
        };

        let mut targets = Vec::new();
        for _ in 0..4 {
            nav.focus_next();
            targets.extend(nav.focused_target().map(|t| t.to_string()));
        }
        assert_eq!(
            targets,
            vec!["/t/0/0/this", "/t/0/0/args", "/t/0/0/this/count", "/t/0/0/this"]
        );

        nav.focus_prev();
        assert_eq!(nav.focus_in(Pane::Overlay(id)), Some(0));
    }

    #[test]
    fn test_focus_prev_from_nothing_wraps_to_last() {
        let mut nav = Navigator::new(&forest());
        nav.focus_prev();
        assert_eq!(
            nav.focused_target().as_ref().map(RefPath::as_str),
            Some("/t/0/0/args")
        );
    }

    #[test]
    fn test_dismiss_clears_focus_in_that_overlay() {
        let mut nav = Navigator::new(&forest());
        let Outcome::Opened(id) = nav.apply(object_at("/t/0/0/this")) else {
            panic!("expected an overlay");
        };
        nav.set_focus(LinkFocus {
            pane: Pane::Overlay(id),
            index: 0,
        });

        assert_eq!(nav.dismiss_newest(), Some(id));
        assert!(nav.focus().is_none());
        assert!(!nav.dismiss(id));
    }

    #[test]
    fn test_selection_change_clears_frame_focus() {
        let mut nav = Navigator::new(&forest());
        nav.focus_next();
        assert_eq!(nav.focus_in(Pane::Frames), Some(0));

        nav.select_next();
        assert!(nav.focus().is_none());
    }

    #[test]
    fn test_set_focus_rejects_missing_link() {
        let mut nav = Navigator::new(&forest());
        assert!(!nav.set_focus(LinkFocus {
            pane: Pane::Frames,
            index: 2,
        }));
        assert!(!nav.set_focus(LinkFocus {
            pane: Pane::Overlay(99),
            index: 0,
        }));
        assert!(nav.focus().is_none());
    }

    #[test]
    fn test_empty_forest() {
        let mut nav = Navigator::new(&Forest::default());
        assert!(nav.selected_thread().is_none());
        assert!(nav.frame_links().is_empty());
        assert!(nav.focus_next().is_none());
        assert_eq!(nav.render_text(&RenderOptions::default()), "");
    }
}
