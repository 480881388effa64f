//! Offline captures
//!
//! A snapshot holds a forest plus the node payloads reachable from it, keyed
//! by path:
//!
//! ```json
//! {
//!   "forest": [["<1> main", ["com/example/Main.run()V:42", false, ["this", "<c.e.Main>", "/t/0/0/this"]]]],
//!   "nodes": { "/t/0/0/this": ["obj", "Lcom/example/Main;", ["count", 3, "count"]] }
//! }
//! ```

use std::collections::HashMap;
use std::path::Path;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;

use crate::error::{Error, Result};
use crate::model::{Forest, Node};
use crate::path::RefPath;

use super::Fetcher;

#[derive(Deserialize)]
struct SnapshotFile {
    forest: Value,
    #[serde(default)]
    nodes: HashMap<String, Value>,
}

/// A forest and its node payloads, loaded from one file
#[derive(Debug, Clone)]
pub struct Snapshot {
    forest: Forest,
    nodes: HashMap<String, Value>,
}

impl Snapshot {
    pub fn from_json(text: &str) -> Result<Self> {
        let file: SnapshotFile = serde_json::from_str(text)
            .map_err(|e| Error::MalformedForest(format!("invalid snapshot: {}", e)))?;
        Ok(Self {
            forest: Forest::from_value(&file.forest)?,
            nodes: file.nodes,
        })
    }

    pub async fn load(path: &Path) -> Result<Self> {
        let text = tokio::fs::read_to_string(path).await?;
        Self::from_json(&text)
    }

    pub fn forest(&self) -> &Forest {
        &self.forest
    }

    /// Number of captured node payloads
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Split into the forest and a fetcher over the node payloads
    pub fn into_parts(self) -> (Forest, SnapshotFetcher) {
        (self.forest, SnapshotFetcher { nodes: self.nodes })
    }
}

/// Serves node payloads from a snapshot
#[derive(Debug, Clone, Default)]
pub struct SnapshotFetcher {
    nodes: HashMap<String, Value>,
}

impl SnapshotFetcher {
    pub fn new(nodes: HashMap<String, Value>) -> Self {
        Self { nodes }
    }

    /// Builder: add one payload
    pub fn with_node(mut self, path: impl Into<String>, payload: Value) -> Self {
        self.nodes.insert(path.into(), payload);
        self
    }

    fn lookup(&self, path: &str) -> Option<&Value> {
        self.nodes
            .get(path)
            .or_else(|| self.nodes.get(path.trim_end_matches('/')))
    }
}

#[async_trait]
impl Fetcher for SnapshotFetcher {
    async fn fetch(&self, path: &RefPath) -> Result<Node> {
        let payload = self
            .lookup(path.as_str())
            .ok_or_else(|| Error::PathNotFound(path.to_string()))?;
        Node::from_value(payload)
    }

    fn describe(&self) -> String {
        format!("snapshot ({} nodes)", self.nodes.len())
    }
}
