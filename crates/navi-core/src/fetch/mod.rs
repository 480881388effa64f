//! Fetch-by-path
//!
//! The transport that resolves a path into a [`Node`] lives outside Navi; this
//! module is the seam to it. Two implementations are provided:
//! - [`HttpFetcher`]: `GET <base_url><path>` against a live data source
//! - [`SnapshotFetcher`]: lookups in an offline capture
//!
//! Results are never cached: every call performs a fresh fetch.

mod http;
mod snapshot;
mod source;

pub use http::{HttpFetcher, HttpFetcherBuilder};
pub use snapshot::{Snapshot, SnapshotFetcher};
pub use source::Source;

use async_trait::async_trait;

use crate::error::Result;
use crate::model::Node;
use crate::path::RefPath;

/// Resolves a path into a freshly fetched node
#[async_trait]
pub trait Fetcher: Send + Sync {
    async fn fetch(&self, path: &RefPath) -> Result<Node>;

    /// Short description of where nodes come from, for logs and status bars
    fn describe(&self) -> String;
}
