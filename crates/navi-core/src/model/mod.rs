//! Captured runtime state
//!
//! - Forest / Thread / Frame / Slot: the thread stacks captured at load time
//! - Node: one lazily fetched value (object, sequence or scalar)
//!
//! Both arrive in a positional JSON format; see [`wire`] for the decoders.

mod wire;

pub use wire::{display_value, extract_embedded_forest};

/// All captured threads, in capture order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Forest {
    pub threads: Vec<Thread>,
}

impl Forest {
    pub fn is_empty(&self) -> bool {
        self.threads.is_empty()
    }

    pub fn len(&self) -> usize {
        self.threads.len()
    }

    /// Total number of frames across all threads
    pub fn frame_count(&self) -> usize {
        self.threads.iter().map(|t| t.frames.len()).sum()
    }
}

/// A thread and its stack, innermost frame first
#[derive(Debug, Clone, PartialEq)]
pub struct Thread {
    pub name: String,
    pub frames: Vec<Frame>,
}

/// One stack entry
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    /// Qualified method descriptor, optionally suffixed with `:<line>`
    pub function: String,
    pub native: bool,
    pub slots: Vec<Slot>,
}

/// A named value, expandable when it carries a reference fragment
#[derive(Debug, Clone, PartialEq)]
pub struct Slot {
    pub name: String,
    pub value: String,
    pub reference: Option<String>,
}

impl Slot {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            reference: None,
        }
    }

    /// Builder: attach a reference fragment
    pub fn with_reference(mut self, reference: impl Into<String>) -> Self {
        self.reference = Some(reference.into());
        self
    }

    pub fn is_expandable(&self) -> bool {
        self.reference.is_some()
    }
}

/// The result of resolving one fetch
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    /// An object with named fields
    Object { jni: String, slots: Vec<Slot> },
    /// An array; items are addressed by position
    Sequence { jni: String, items: Vec<String> },
    /// Anything else, including unrecognized tags
    Scalar(String),
}

impl Node {
    /// Type descriptor, if the node has one
    pub fn jni(&self) -> Option<&str> {
        match self {
            Node::Object { jni, .. } | Node::Sequence { jni, .. } => Some(jni),
            Node::Scalar(_) => None,
        }
    }

    /// Number of direct children
    pub fn child_count(&self) -> usize {
        match self {
            Node::Object { slots, .. } => slots.len(),
            Node::Sequence { items, .. } => items.len(),
            Node::Scalar(_) => 0,
        }
    }
}
