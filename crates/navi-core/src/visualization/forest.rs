//! Thread forest rendering
//!
//! This module provides:
//! - RenderOptions / NodeStyle: display settings shared by all renderers
//! - ForestView: threads, their frames and frame-local slots, ready to display
//! - ForestView::render_text: formatted text for CLI output

use serde::Serialize;

use crate::abbrev::Abbreviated;
use crate::model::{Forest, Frame, Thread};
use crate::path::RefPath;

use super::view::{SlotView, render_slots};

/// Style configuration for tree rendering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NodeStyle {
    /// ASCII characters only (works everywhere)
    Ascii,
    /// Unicode box-drawing characters
    #[default]
    Unicode,
}

impl NodeStyle {
    /// Branch and continuation glyphs for a child
    pub fn branch(self, is_last: bool) -> &'static str {
        match (self, is_last) {
            (NodeStyle::Ascii, true) => "`-- ",
            (NodeStyle::Ascii, false) => "+-- ",
            (NodeStyle::Unicode, true) => "└── ",
            (NodeStyle::Unicode, false) => "├── ",
        }
    }

    pub fn vertical(self, is_last: bool) -> &'static str {
        match (self, is_last) {
            (_, true) => "    ",
            (NodeStyle::Ascii, false) => "|   ",
            (NodeStyle::Unicode, false) => "│   ",
        }
    }

    /// Marker appended to native frames
    pub fn native_marker(self) -> &'static str {
        match self {
            NodeStyle::Ascii => "[native]",
            NodeStyle::Unicode => "⚙ native",
        }
    }
}

impl std::str::FromStr for NodeStyle {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ascii" => Ok(NodeStyle::Ascii),
            "unicode" => Ok(NodeStyle::Unicode),
            other => Err(format!("Invalid style: {}. Valid options: ascii, unicode", other)),
        }
    }
}

/// Options for rendering
#[derive(Debug, Clone)]
pub struct RenderOptions {
    /// Visual style for tree characters
    pub style: NodeStyle,
    /// Show unabridged names instead of cropped ones
    pub full_names: bool,
    /// Show the fetch path next to expandable values (text output)
    pub show_paths: bool,
    /// Indentation width per level
    pub indent_width: usize,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            style: NodeStyle::Unicode,
            full_names: false,
            show_paths: true,
            indent_width: 4,
        }
    }
}

impl RenderOptions {
    /// Create ASCII-only options for basic terminals
    pub fn ascii() -> Self {
        Self {
            style: NodeStyle::Ascii,
            ..Default::default()
        }
    }

    /// Create minimal options (no paths)
    pub fn minimal() -> Self {
        Self {
            show_paths: false,
            ..Default::default()
        }
    }

    /// Builder: set style
    pub fn with_style(mut self, style: NodeStyle) -> Self {
        self.style = style;
        self
    }

    /// Builder: enable/disable full-name disclosure
    pub fn with_full_names(mut self, full_names: bool) -> Self {
        self.full_names = full_names;
        self
    }

    /// Builder: enable/disable fetch paths
    pub fn with_paths(mut self, show_paths: bool) -> Self {
        self.show_paths = show_paths;
        self
    }
}

/// A rendered stack frame
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FrameView {
    pub function: Abbreviated,
    pub native: bool,
    pub slots: Vec<SlotView>,
}

impl FrameView {
    /// Frame-local slots resolve against the empty root, so their
    /// references are used as absolute paths.
    pub fn render(frame: &Frame) -> Self {
        Self {
            function: Abbreviated::function(frame.function.as_str()),
            native: frame.native,
            slots: render_slots(&RefPath::root(), &frame.slots),
        }
    }

    pub fn heading(&self, options: &RenderOptions) -> String {
        let name = self.function.text(options.full_names);
        if self.native {
            format!("{} {}", name, options.style.native_marker())
        } else {
            name.to_string()
        }
    }
}

/// A rendered thread
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ThreadView {
    pub name: String,
    pub frames: Vec<FrameView>,
}

impl ThreadView {
    pub fn render(thread: &Thread) -> Self {
        Self {
            name: thread.name.clone(),
            frames: thread.frames.iter().map(FrameView::render).collect(),
        }
    }

    pub fn heading(&self) -> String {
        format!("Thread: {}", self.name)
    }
}

/// The whole forest, rendered once at load
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ForestView {
    pub threads: Vec<ThreadView>,
}

impl ForestView {
    pub fn render(forest: &Forest) -> Self {
        Self {
            threads: forest.threads.iter().map(ThreadView::render).collect(),
        }
    }

    /// Render as text. Frames are listed only for threads where
    /// `show_frames` holds; every thread heading is always listed.
    pub fn render_text(&self, options: &RenderOptions, show_frames: impl Fn(usize) -> bool) -> String {
        let mut output = String::new();

        for (index, thread) in self.threads.iter().enumerate() {
            output.push_str(&thread.heading());
            output.push('\n');
            if !show_frames(index) {
                continue;
            }

            let frame_count = thread.frames.len();
            for (i, frame) in thread.frames.iter().enumerate() {
                let is_last = i + 1 == frame_count;
                output.push_str(options.style.branch(is_last));
                output.push_str(&frame.heading(options));
                output.push('\n');

                let prefix = options.style.vertical(is_last);
                let slot_count = frame.slots.len();
                for (j, slot) in frame.slots.iter().enumerate() {
                    output.push_str(prefix);
                    output.push_str(options.style.branch(j + 1 == slot_count));
                    output.push_str(&slot.name);
                    output.push_str(" = ");
                    output.push_str(&slot.value.text);
                    if let (true, Some(target)) = (options.show_paths, &slot.value.target) {
                        output.push_str(&format!(" -> {}", target));
                    }
                    output.push('\n');
                }
            }
        }

        output
    }
}
