//! Fetch-on-activation
//!
//! Each activation spawns its own task. Completions are delivered on a
//! channel in whatever order they finish; the receiver applies them to the
//! [`Navigator`](super::Navigator). There is no cancellation.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::error::Result;
use crate::fetch::Fetcher;
use crate::model::Node;
use crate::path::RefPath;

/// A finished fetch
#[derive(Debug)]
pub struct Expansion {
    pub path: RefPath,
    pub result: Result<Node>,
}

#[derive(Clone)]
pub struct LazyExpander {
    fetcher: Arc<dyn Fetcher>,
    tx: mpsc::UnboundedSender<Expansion>,
    in_flight: Arc<AtomicUsize>,
}

impl std::fmt::Debug for LazyExpander {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LazyExpander")
            .field("fetcher", &self.fetcher.describe())
            .field("in_flight", &self.in_flight())
            .finish()
    }
}

impl LazyExpander {
    /// Create an expander and the receiver its completions arrive on
    pub fn new(fetcher: Arc<dyn Fetcher>) -> (Self, mpsc::UnboundedReceiver<Expansion>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let expander = Self {
            fetcher,
            tx,
            in_flight: Arc::new(AtomicUsize::new(0)),
        };
        (expander, rx)
    }

    /// Fetch `path` in the background. Must be called inside a tokio runtime.
    pub fn activate(&self, path: RefPath) -> JoinHandle<()> {
        info!(path = %path, "Fetching");
        self.in_flight.fetch_add(1, Ordering::SeqCst);

        let fetcher = Arc::clone(&self.fetcher);
        let tx = self.tx.clone();
        let in_flight = Arc::clone(&self.in_flight);
        tokio::spawn(async move {
            let result = fetcher.fetch(&path).await;
            in_flight.fetch_sub(1, Ordering::SeqCst);
            if tx.send(Expansion { path, result }).is_err() {
                debug!("Expansion receiver closed; dropping result");
            }
        })
    }

    /// Fetch `path` and wait for it, bypassing the channel
    pub async fn expand(&self, path: RefPath) -> Expansion {
        let result = self.fetcher.fetch(&path).await;
        Expansion { path, result }
    }

    /// Number of fetches started but not yet finished
    pub fn in_flight(&self) -> usize {
        self.in_flight.load(Ordering::SeqCst)
    }

    pub fn describe(&self) -> String {
        self.fetcher.describe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::fetch::SnapshotFetcher;
    use async_trait::async_trait;
    use serde_json::json;
    use std::time::Duration;

    /// Answers after a per-path delay so completions can be reordered
    struct DelayedFetcher;

    #[async_trait]
    impl Fetcher for DelayedFetcher {
        async fn fetch(&self, path: &RefPath) -> Result<Node> {
            let leaf = path.leaf().unwrap_or_default();
            let millis: u64 = leaf.parse().unwrap_or(0);
            tokio::time::sleep(Duration::from_millis(millis)).await;
            Ok(Node::Scalar(leaf.to_string()))
        }

        fn describe(&self) -> String {
            "delayed".to_string()
        }
    }

    #[tokio::test]
    async fn test_activate_delivers_result() {
        let fetcher = SnapshotFetcher::default().with_node("/t/0/0/x", json!(["val", 7]));
        let (expander, mut rx) = LazyExpander::new(Arc::new(fetcher));

        expander.activate("/t/0/0/x".into()).await.unwrap();
        let expansion = rx.recv().await.unwrap();
        assert_eq!(expansion.path.as_str(), "/t/0/0/x");
        assert_eq!(expansion.result.unwrap(), Node::Scalar("7".into()));
        assert_eq!(expander.in_flight(), 0);
    }

    #[tokio::test]
    async fn test_failure_delivered_as_expansion() {
        let (expander, mut rx) = LazyExpander::new(Arc::new(SnapshotFetcher::default()));

        expander.activate("/missing".into());
        let expansion = rx.recv().await.unwrap();
        assert!(matches!(expansion.result, Err(Error::PathNotFound(_))));
    }

    #[tokio::test(start_paused = true)]
    async fn test_completion_order_follows_fetch_time() {
        let (expander, mut rx) = LazyExpander::new(Arc::new(DelayedFetcher));

        expander.activate("/slow/50".into());
        expander.activate("/fast/10".into());
        assert_eq!(expander.in_flight(), 2);

        let first = rx.recv().await.unwrap();
        let second = rx.recv().await.unwrap();
        assert_eq!(first.path.as_str(), "/fast/10");
        assert_eq!(second.path.as_str(), "/slow/50");
        assert_eq!(expander.in_flight(), 0);
    }

    #[tokio::test]
    async fn test_expand_direct() {
        let fetcher = SnapshotFetcher::default().with_node("/a", json!(["seq", "[I", 1]));
        let (expander, _rx) = LazyExpander::new(Arc::new(fetcher));

        let expansion = expander.expand("/a".into()).await;
        assert_eq!(expansion.result.unwrap().child_count(), 1);
        assert!(expander.describe().starts_with("snapshot"));
    }
}
