//! Application state and input handling
//!
//! Input is translated into [`Action`] values first and applied second, so
//! key and mouse bindings can be tested without a terminal.

use std::sync::Arc;

use crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEvent, MouseEventKind};
use navi_core::config::Config;
use navi_core::fetch::Fetcher;
use navi_core::model::Forest;
use navi_core::navigator::{
    Expansion, LazyExpander, LinkFocus, Navigator, OverlayId, Outcome, Pane, Trigger,
};
use navi_core::visualization::{FramesWidget, NaviColors, NodeViewWidget, RenderOptions};
use ratatui::layout::{Position, Rect};
use tokio::sync::mpsc;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    SelectThread(usize, Trigger),
    NextThread,
    PrevThread,
    FocusNext,
    FocusPrev,
    /// Fetch the focused link
    Activate,
    /// Focus a link and fetch it
    ActivateLink(LinkFocus),
    Dismiss(OverlayId),
    DismissNewest,
    ScrollFrames(isize),
    ScrollThreads(isize),
    ToggleFullNames,
    Quit,
}

/// Inner areas of the panes, recorded at draw time for mouse hit tests
#[derive(Debug, Clone, Default)]
pub struct HitMap {
    pub threads: Rect,
    pub frames: Rect,
    /// Overlays as drawn, newest first
    pub overlays: Vec<(OverlayId, Rect)>,
    /// Overlays that did not fit on screen
    pub hidden: Vec<OverlayId>,
}

pub struct App {
    pub nav: Navigator,
    expander: LazyExpander,
    pub options: RenderOptions,
    pub colors: NaviColors,
    hover_select: bool,
    pub status: Option<String>,
    pub frames_scroll: usize,
    pub threads_scroll: usize,
    pub hits: HitMap,
    quit: bool,
}

impl App {
    /// Build the app and the receiver that fetch completions arrive on
    pub fn new(
        forest: &Forest,
        fetcher: Arc<dyn Fetcher>,
        config: &Config,
    ) -> anyhow::Result<(Self, mpsc::UnboundedReceiver<Expansion>)> {
        let (expander, completions) = LazyExpander::new(fetcher);
        let app = Self {
            nav: Navigator::new(forest),
            expander,
            options: config.render_options()?,
            colors: NaviColors::default(),
            hover_select: config.display.hover_select,
            status: None,
            frames_scroll: 0,
            threads_scroll: 0,
            hits: HitMap::default(),
            quit: false,
        };
        Ok((app, completions))
    }

    pub fn should_quit(&self) -> bool {
        self.quit
    }

    pub fn source(&self) -> String {
        self.expander.describe()
    }

    pub fn in_flight(&self) -> usize {
        self.expander.in_flight()
    }

    pub fn handle_event(&mut self, event: Event) {
        let action = match event {
            Event::Key(key) => self.key_action(key),
            Event::Mouse(mouse) => self.mouse_action(mouse),
            _ => None,
        };
        if let Some(action) = action {
            self.perform(action);
        }
    }

    pub fn key_action(&self, key: KeyEvent) -> Option<Action> {
        if key.kind != KeyEventKind::Press {
            return None;
        }
        match key.code {
            KeyCode::Char('q') => Some(Action::Quit),
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => Some(Action::Quit),
            KeyCode::Char('l') | KeyCode::Right => Some(Action::NextThread),
            KeyCode::Char('h') | KeyCode::Left => Some(Action::PrevThread),
            KeyCode::Char('j') | KeyCode::Tab | KeyCode::Down => Some(Action::FocusNext),
            KeyCode::Char('k') | KeyCode::BackTab | KeyCode::Up => Some(Action::FocusPrev),
            KeyCode::Enter => Some(Action::Activate),
            KeyCode::Esc | KeyCode::Char('x') => Some(Action::DismissNewest),
            KeyCode::PageDown => Some(Action::ScrollFrames(10)),
            KeyCode::PageUp => Some(Action::ScrollFrames(-10)),
            KeyCode::Char('o') => Some(Action::ToggleFullNames),
            _ => None,
        }
    }

    pub fn mouse_action(&self, mouse: MouseEvent) -> Option<Action> {
        let position = Position::new(mouse.column, mouse.row);
        match mouse.kind {
            MouseEventKind::Moved if self.hover_select => self
                .thread_at(position)
                .map(|index| Action::SelectThread(index, Trigger::Hover)),
            MouseEventKind::Down(MouseButton::Left) => {
                if let Some(index) = self.thread_at(position) {
                    return Some(Action::SelectThread(index, Trigger::Click));
                }
                self.link_at(position).map(Action::ActivateLink)
            }
            MouseEventKind::Down(MouseButton::Right) => self
                .overlay_at(position)
                .map(|(id, _)| Action::Dismiss(id)),
            MouseEventKind::ScrollDown if self.hits.frames.contains(position) => {
                Some(Action::ScrollFrames(3))
            }
            MouseEventKind::ScrollUp if self.hits.frames.contains(position) => {
                Some(Action::ScrollFrames(-3))
            }
            MouseEventKind::ScrollDown if self.hits.threads.contains(position) => {
                Some(Action::ScrollThreads(3))
            }
            MouseEventKind::ScrollUp if self.hits.threads.contains(position) => {
                Some(Action::ScrollThreads(-3))
            }
            _ => None,
        }
    }

    fn thread_at(&self, position: Position) -> Option<usize> {
        let area = self.hits.threads;
        if !area.contains(position) {
            return None;
        }
        let index = usize::from(position.y - area.y) + self.threads_scroll;
        (index < self.nav.forest().threads.len()).then_some(index)
    }

    /// Keep the thread scroll within bounds and the selected heading on screen
    pub fn clamp_threads_scroll(&mut self) {
        let rows = usize::from(self.hits.threads.height);
        if rows == 0 {
            return;
        }
        let max = self.nav.forest().threads.len().saturating_sub(rows);
        self.threads_scroll = self.threads_scroll.min(max);
    }

    fn reveal_selected_thread(&mut self) {
        self.frames_scroll = 0;
        let rows = usize::from(self.hits.threads.height);
        let Some(selected) = self.nav.selection().selected() else {
            return;
        };
        if rows == 0 {
            return;
        }
        if selected < self.threads_scroll {
            self.threads_scroll = selected;
        } else if selected >= self.threads_scroll + rows {
            self.threads_scroll = selected + 1 - rows;
        }
    }

    /// Move link focus, passing over overlays that are not on screen
    fn step_focus(&mut self, forward: bool) {
        for _ in 0..self.nav.links().len() {
            let focus = if forward {
                self.nav.focus_next()
            } else {
                self.nav.focus_prev()
            };
            match focus {
                Some(LinkFocus {
                    pane: Pane::Overlay(id),
                    ..
                }) if self.hits.hidden.contains(&id) => continue,
                _ => return,
            }
        }
    }

    fn overlay_at(&self, position: Position) -> Option<(OverlayId, Rect)> {
        self.hits
            .overlays
            .iter()
            .copied()
            .find(|(_, area)| area.contains(position))
    }

    fn link_at(&self, position: Position) -> Option<LinkFocus> {
        if self.hits.frames.contains(position) {
            let row = usize::from(position.y - self.hits.frames.y);
            let index = FramesWidget::new(self.nav.selected_thread())
                .options(self.options.clone())
                .scroll(self.frames_scroll)
                .link_at(row, self.hits.frames.width)?;
            return Some(LinkFocus {
                pane: Pane::Frames,
                index,
            });
        }

        let (id, area) = self.overlay_at(position)?;
        let overlay = self.nav.overlays().get(id)?;
        let index = NodeViewWidget::new(&overlay.view)
            .options(self.options.clone())
            .link_at(
                usize::from(position.y - area.y),
                usize::from(position.x - area.x),
                area.width,
            )?;
        Some(LinkFocus {
            pane: Pane::Overlay(id),
            index,
        })
    }

    pub fn perform(&mut self, action: Action) {
        debug!(?action, "Action");
        match action {
            Action::SelectThread(index, trigger) => {
                if self.nav.select(index, trigger) {
                    self.reveal_selected_thread();
                }
            }
            Action::NextThread => {
                if self.nav.select_next() {
                    self.reveal_selected_thread();
                }
            }
            Action::PrevThread => {
                if self.nav.select_prev() {
                    self.reveal_selected_thread();
                }
            }
            Action::FocusNext => self.step_focus(true),
            Action::FocusPrev => self.step_focus(false),
            Action::Activate => self.activate_focused(),
            Action::ActivateLink(focus) => {
                if self.nav.set_focus(focus) {
                    self.activate_focused();
                }
            }
            Action::Dismiss(id) => {
                self.nav.dismiss(id);
            }
            Action::DismissNewest => {
                self.nav.dismiss_newest();
            }
            Action::ScrollFrames(delta) => {
                self.frames_scroll = self.frames_scroll.saturating_add_signed(delta);
            }
            Action::ScrollThreads(delta) => {
                self.threads_scroll = self.threads_scroll.saturating_add_signed(delta);
                self.clamp_threads_scroll();
            }
            Action::ToggleFullNames => {
                let full_names = !self.options.full_names;
                self.options = self.options.clone().with_full_names(full_names);
            }
            Action::Quit => self.quit = true,
        }
    }

    fn activate_focused(&mut self) {
        if let Some(path) = self.nav.focused_target() {
            self.status = Some(format!("Fetching {}", path));
            self.expander.activate(path);
        }
    }

    /// Apply a finished fetch
    pub fn on_expansion(&mut self, expansion: Expansion) {
        self.status = match self.nav.apply(expansion) {
            Outcome::Opened(_) => None,
            Outcome::Failed { path, reason } => Some(format!("Could not open {}: {}", path, reason)),
        };
    }
}
