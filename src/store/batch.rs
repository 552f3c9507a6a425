// src/store/batch.rs
// =============================================================================
// This module runs the bulk, fault-tolerant retrieval over a locator set.
//
// Key guarantees:
// - Every locator is attempted exactly once (no retries)
// - One item's failure never stops or skips the others
// - succeeded + failed always equals the number of locators in the set
// - Only the creation of the output directory itself is fatal; everything
//   after that is tallied per item
//
// Downloads run concurrently with a bounded fan-out (buffer_unordered),
// sharing one HTTP client and one Namer so filenames can't collide.
// =============================================================================

use std::path::{Path, PathBuf};

use futures::stream::{self, StreamExt}; // StreamExt gives us .buffer_unordered()
use reqwest::Client;
use serde::Serialize;
use thiserror::Error;

use crate::extract::LocatorSet;
use crate::store::materialize::{materialize, MaterializeResult};
use crate::store::namer::Namer;

// How many downloads run at once. Images are small and independent, so a
// modest fan-out gets most of the win without hammering any one server.
const MAX_CONCURRENT_DOWNLOADS: usize = 8;

/// The output directory could not be created. This is the one fatal error
/// of the retrieval stage - without the directory nothing can be stored.
#[derive(Debug, Error)]
#[error("could not create output directory {path}: {source}")]
pub struct OutputDirError {
    pub path: PathBuf,
    #[source]
    pub source: std::io::Error,
}

/// Aggregate counts over one batch. Never mutated after return.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct RetrievalOutcome {
    pub succeeded: usize,
    pub failed: usize,
}

/// Everything the caller needs to report on a finished batch: the final
/// counts plus the per-item records behind them.
#[derive(Debug, Serialize)]
pub struct BatchReport {
    pub outcome: RetrievalOutcome,
    pub results: Vec<MaterializeResult>,
}

/// Downloads (or decodes) every locator in the set into `directory`.
///
/// The directory is created on demand; failure to create it propagates.
/// After that, per-item failures only show up in the tally.
pub async fn retrieve_all(
    client: &Client,
    locators: &LocatorSet,
    directory: &Path,
) -> Result<BatchReport, OutputDirError> {
    std::fs::create_dir_all(directory).map_err(|source| OutputDirError {
        path: directory.to_path_buf(),
        source,
    })?;

    // One namer per batch: reservations are linearized inside it, so
    // concurrent downloads can never be handed the same filename.
    let namer = Namer::new();

    let futures = locators
        .iter()
        .map(|locator| materialize(client, &namer, locator, directory));

    // Run up to MAX_CONCURRENT_DOWNLOADS at once, collecting results as
    // they complete. Collecting first and counting after keeps the tally
    // trivially exact - no shared counters to race on.
    let results: Vec<MaterializeResult> = stream::iter(futures)
        .buffer_unordered(MAX_CONCURRENT_DOWNLOADS)
        .collect()
        .await;

    let failed = results.iter().filter(|r| !r.ok).count();
    let outcome = RetrievalOutcome {
        succeeded: locators.len() - failed,
        failed,
    };

    Ok(BatchReport { outcome, results })
}

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. What is buffer_unordered?
//    - Takes a stream of futures and polls up to N of them concurrently
//    - Results come back in completion order, not submission order
//    - Order doesn't matter here: the outcome is just counts
//
// 2. Why count failures from the collected Vec instead of incrementing a
//    shared counter inside each task?
//    - A shared counter would need an AtomicUsize or a Mutex
//    - Collecting then counting is simpler and can't be wrong: the Vec has
//      exactly one entry per attempted locator
//
// 3. Why is only create_dir_all fatal?
//    - If the base directory can't exist, every single download is doomed,
//      so failing fast is honest
//    - Any later error affects one item only and is isolated there
// -----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::CanonicalLocator;
    use tempfile::tempdir;

    fn inline(payload: &str) -> CanonicalLocator {
        CanonicalLocator::Inline {
            subtype: "png".to_string(),
            payload: payload.to_string(),
        }
    }

    #[tokio::test]
    async fn test_failures_are_tallied_not_fatal() {
        // Three locators: two decode fine, one has broken base64.
        // No network involved, so this runs anywhere.
        let dir = tempdir().unwrap();
        let mut set = LocatorSet::new();
        set.insert(inline("aGVsbG8=")); // "hello"
        set.insert(inline("d29ybGQ=")); // "world"
        set.insert(inline("%%broken%%"));

        let client = Client::new();
        let report = retrieve_all(&client, &set, dir.path()).await.unwrap();

        assert_eq!(report.outcome.succeeded, 2);
        assert_eq!(report.outcome.failed, 1);
        assert_eq!(report.results.len(), 3);
        // Exactly the successful downloads exist on disk
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 2);
    }

    #[tokio::test]
    async fn test_unreachable_remote_mixed_with_inline() {
        let dir = tempdir().unwrap();
        let mut set = LocatorSet::new();
        set.insert(inline("aGVsbG8="));
        set.insert(CanonicalLocator::Remote {
            url: "http://127.0.0.1:9/x.jpg".to_string(),
        });

        let client = Client::new();
        let report = retrieve_all(&client, &set, dir.path()).await.unwrap();

        assert_eq!(report.outcome.succeeded, 1);
        assert_eq!(report.outcome.failed, 1);
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[tokio::test]
    async fn test_empty_set_yields_zero_counts() {
        let dir = tempdir().unwrap();
        let client = Client::new();
        let report = retrieve_all(&client, &LocatorSet::new(), dir.path())
            .await
            .unwrap();
        assert_eq!(report.outcome.succeeded, 0);
        assert_eq!(report.outcome.failed, 0);
        assert!(report.results.is_empty());
    }

    #[tokio::test]
    async fn test_output_directory_is_created_on_demand() {
        let dir = tempdir().unwrap();
        let nested = dir.path().join("site.com").join("images");
        let mut set = LocatorSet::new();
        set.insert(inline("aGVsbG8="));

        let client = Client::new();
        let report = retrieve_all(&client, &set, &nested).await.unwrap();

        assert_eq!(report.outcome.succeeded, 1);
        assert!(nested.join("uri-image.png").exists());
    }
}
