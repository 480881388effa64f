//! Where the forest is loaded from, and which fetcher goes with it

use std::path::PathBuf;
use std::sync::Arc;

use tracing::info;

use crate::config::SourceConfig;
use crate::error::Result;
use crate::model::Forest;

use super::{Fetcher, HttpFetcher, Snapshot};

/// Load-time input
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Source {
    /// A saved page or JSON file holding the forest; nodes come over HTTP
    Page(PathBuf),
    /// An offline capture holding both the forest and its nodes
    Snapshot(PathBuf),
    /// The live data source's forest endpoint
    Remote,
}

impl Source {
    /// Pick a source from optional file arguments; a snapshot wins over a page
    pub fn from_args(page: Option<PathBuf>, snapshot: Option<PathBuf>) -> Self {
        match (snapshot, page) {
            (Some(path), _) => Source::Snapshot(path),
            (None, Some(path)) => Source::Page(path),
            (None, None) => Source::Remote,
        }
    }

    /// Parse the forest once and build the matching fetcher
    pub async fn open(&self, config: &SourceConfig) -> Result<(Forest, Arc<dyn Fetcher>)> {
        match self {
            Source::Page(path) => {
                let text = tokio::fs::read_to_string(path).await?;
                let forest = Forest::from_page(&text)?;
                let fetcher = HttpFetcher::builder().config(config).build()?;
                info!(path = %path.display(), threads = forest.len(), "Loaded forest from page");
                Ok((forest, Arc::new(fetcher)))
            }
            Source::Snapshot(path) => {
                let (forest, fetcher) = Snapshot::load(path).await?.into_parts();
                info!(path = %path.display(), threads = forest.len(), "Loaded snapshot");
                Ok((forest, Arc::new(fetcher)))
            }
            Source::Remote => {
                let fetcher = HttpFetcher::builder().config(config).build()?;
                let forest = fetcher.fetch_forest().await?;
                info!(url = %fetcher.base_url(), threads = forest.len(), "Loaded forest from data source");
                Ok((forest, Arc::new(fetcher)))
            }
        }
    }
}
