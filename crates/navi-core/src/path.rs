//! Reference paths for lazy fetches
//!
//! Paths are built append-only: a slot's reference fragment is always
//! resolved against the base path of the node that owns it. Frame-local slots
//! are owned by the empty root, so their fragments are used as-is.

use serde::{Deserialize, Serialize};

/// Resolve a local reference fragment against a base path.
///
/// - empty base: the fragment itself
/// - base ending in `/`: plain concatenation
/// - otherwise: joined with a single `/`
pub fn resolve(base: &str, fragment: &str) -> String {
    if base.is_empty() {
        fragment.to_string()
    } else if base.ends_with('/') {
        format!("{}{}", base, fragment)
    } else {
        format!("{}/{}", base, fragment)
    }
}

/// A resolved fetch path (e.g. "/t/0/3/this/mTable/2")
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RefPath(String);

impl RefPath {
    /// The empty base path owning frame-local slots
    pub fn root() -> Self {
        Self(String::new())
    }

    /// Wrap an already resolved path
    pub fn new(path: impl Into<String>) -> Self {
        Self(path.into())
    }

    /// Resolve a named fragment relative to this path
    pub fn child(&self, fragment: &str) -> Self {
        Self(resolve(&self.0, fragment))
    }

    /// Resolve a positional fragment relative to this path
    pub fn index(&self, index: usize) -> Self {
        self.child(&index.to_string())
    }

    /// Check if this is the empty root
    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    /// Non-empty `/`-separated segments
    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.0.split('/').filter(|s| !s.is_empty())
    }

    /// Get the leaf segment (None if root)
    pub fn leaf(&self) -> Option<&str> {
        self.segments().last()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for RefPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RefPath {
    fn from(path: &str) -> Self {
        Self::new(path)
    }
}
