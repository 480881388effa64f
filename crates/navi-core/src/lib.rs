//! Navi Core Library
//!
//! Browses captured runtime state: threads, stack frames and their slots,
//! with objects and sequences fetched lazily by path. This crate provides:
//! - Name abbreviation for JNI types and frame descriptors
//! - Reference paths and their resolution
//! - The data model and its strict wire decoding
//! - Rendering into views, plain text and ratatui widgets
//! - Fetchers (HTTP and offline snapshot) and the lazy expander
//! - Browsing state: thread selection and stacked overlays

pub mod abbrev;
pub mod config;
pub mod error;
pub mod fetch;
pub mod model;
pub mod navigator;
pub mod path;
pub mod visualization;

pub use error::{Error, Result};

/// Re-export commonly used types
pub mod prelude {
    pub use crate::config::Config;
    pub use crate::error::{Error, Result};
    pub use crate::fetch::{Fetcher, Source};
    pub use crate::model::{Forest, Node};
    pub use crate::navigator::{Expansion, LazyExpander, Navigator, Outcome, Trigger};
    pub use crate::path::RefPath;
    pub use crate::visualization::{ForestView, NodeView, RenderOptions};
}
