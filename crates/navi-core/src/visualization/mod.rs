//! Runtime-state visualization
//!
//! Renders the thread forest and fetched nodes, either as text for CLI output
//! or as ratatui widgets for the TUI.
//!
//! # Features
//!
//! - **Forest Rendering**: threads, frames and frame-local slots (`ForestView`)
//! - **Node Rendering**: objects, sequences and scalars with collapsed,
//!   path-carrying children (`NodeView`)
//! - **Ratatui Widgets**: `ThreadListWidget`, `FramesWidget`, `NodeViewWidget`
//! - **Flexible Styling**: ASCII or Unicode glyphs, cropped or full names
//!
//! # Example
//!
//! ```ignore
//! use navi_core::visualization::{ForestView, RenderOptions};
//!
//! let view = ForestView::render(&forest);
//! println!("{}", view.render_text(&RenderOptions::default(), |i| i == 0));
//!
//! // Or use with ratatui (in TUI context)
//! let widget = FramesWidget::new(view.threads.first())
//!     .block(Block::default().title("Frames").borders(Borders::ALL));
//! ```

mod forest;
mod view;
mod widget;

pub use forest::{ForestView, FrameView, NodeStyle, RenderOptions, ThreadView};
pub use view::{NodeBody, NodeView, SlotView, ValueView, render_items, render_slots};
pub use widget::{FramesWidget, NaviColors, NodeViewWidget, ThreadListWidget};
