// src/store/namer.rs
// =============================================================================
// This module picks collision-safe file names.
//
// Re-running a scrape (or scraping two pages that both have a "logo.png")
// must never overwrite files from an earlier run. Instead of clobbering,
// we probe for a free name by appending an incrementing disambiguator:
//
//   logo.png  ->  logo (1).png  ->  logo (2).png  ->  ...
//
// The namer only CHOOSES names, it never creates files. Because downloads
// run concurrently and the file may not hit the disk until well after its
// name was chosen, the namer also remembers every name it has handed out:
// a disk probe alone would let two in-flight downloads claim the same path.
//
// Rust concepts:
// - Mutex: Serializes reservations so concurrent tasks can share one Namer
// - HashSet: O(1) membership checks for already-claimed names
// - PathBuf vs &Path: owned vs borrowed filesystem paths
// =============================================================================

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// Hands out file paths that are guaranteed not to collide - neither with
/// files already on disk nor with names given out earlier by this namer.
///
/// One Namer is shared per batch; reservations are linearized internally.
#[derive(Debug, Default)]
pub struct Namer {
    claimed: Mutex<HashSet<PathBuf>>,
}

impl Namer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reserves a free path for the desired name.
    ///
    /// Returns `desired` unchanged when it is unused; otherwise the first
    /// free `stem (N).extension` variant. The file itself is NOT created -
    /// the caller writes it (or doesn't, if the download fails, in which
    /// case the name simply stays unused for this batch).
    pub fn reserve(&self, desired: &Path) -> PathBuf {
        // Lock held for the whole probe so two concurrent reservations
        // can never both see the same name as free.
        let mut claimed = self
            .claimed
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        if !desired.exists() && !claimed.contains(desired) {
            claimed.insert(desired.to_path_buf());
            return desired.to_path_buf();
        }

        let directory = desired.parent().unwrap_or_else(|| Path::new(""));
        let stem = desired
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        let extension = desired.extension().map(|e| e.to_string_lossy().into_owned());

        for counter in 1.. {
            let filename = match &extension {
                Some(ext) => format!("{} ({}).{}", stem, counter, ext),
                None => format!("{} ({})", stem, counter),
            };
            let candidate = directory.join(filename);
            if !candidate.exists() && !claimed.contains(&candidate) {
                claimed.insert(candidate.clone());
                return candidate;
            }
        }

        unreachable!("the counter loop always finds a free name")
    }
}

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. Why Mutex<HashSet> instead of just HashSet?
//    - The batch retriever runs downloads concurrently, and each one asks
//      the shared Namer for a name
//    - Mutex makes "probe + claim" one atomic step; without it two tasks
//      could interleave and claim the same path
//
// 2. What is unwrap_or_else(|poisoned| poisoned.into_inner())?
//    - A Mutex gets "poisoned" if a thread panics while holding it
//    - Our set of claimed names is still perfectly usable after a panic
//      elsewhere, so we just take the inner value and continue
//
// 3. What does `for counter in 1..` mean?
//    - An unbounded range: 1, 2, 3, ...
//    - We always return from inside the loop once a free name turns up,
//      which must happen because the claimed set is finite
// -----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_unused_path_returned_unchanged() {
        let dir = tempdir().unwrap();
        let namer = Namer::new();
        let desired = dir.path().join("logo.png");
        assert_eq!(namer.reserve(&desired), desired);
    }

    #[test]
    fn test_repeated_reservations_increment() {
        // Clean directory: first call gets the plain name, then (1), then (2),
        // even though no files were ever written.
        let dir = tempdir().unwrap();
        let namer = Namer::new();
        let desired = dir.path().join("logo.png");

        assert_eq!(namer.reserve(&desired), dir.path().join("logo.png"));
        assert_eq!(namer.reserve(&desired), dir.path().join("logo (1).png"));
        assert_eq!(namer.reserve(&desired), dir.path().join("logo (2).png"));
    }

    #[test]
    fn test_existing_file_forces_increment() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("logo.png"), b"old run").unwrap();

        let namer = Namer::new();
        let reserved = namer.reserve(&dir.path().join("logo.png"));
        assert_eq!(reserved, dir.path().join("logo (1).png"));
    }

    #[test]
    fn test_gap_after_existing_files_is_skipped() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("a.jpg"), b"x").unwrap();
        std::fs::write(dir.path().join("a (1).jpg"), b"x").unwrap();

        let namer = Namer::new();
        assert_eq!(
            namer.reserve(&dir.path().join("a.jpg")),
            dir.path().join("a (2).jpg")
        );
    }

    #[test]
    fn test_name_without_extension() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("README"), b"x").unwrap();

        let namer = Namer::new();
        assert_eq!(
            namer.reserve(&dir.path().join("README")),
            dir.path().join("README (1)")
        );
    }

    #[test]
    fn test_fresh_namer_reuses_disk_free_names() {
        // A new Namer has no memory of earlier batches; only files actually
        // on disk block a name.
        let dir = tempdir().unwrap();
        let first = Namer::new();
        let reserved = first.reserve(&dir.path().join("b.png"));
        assert_eq!(reserved, dir.path().join("b.png"));
        // The first batch never wrote the file, so a second batch may claim it
        let second = Namer::new();
        assert_eq!(second.reserve(&dir.path().join("b.png")), dir.path().join("b.png"));
    }
}
