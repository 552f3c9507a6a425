// src/store/materialize.rs
// =============================================================================
// This module turns one canonical locator into bytes on disk.
//
// Two paths, depending on the locator variant:
// - Inline: base64-decode the embedded payload, no network involved
// - Remote: HTTP GET and write the response body verbatim (no content-type
//   checking - whatever the server sends is what lands on disk)
//
// Failure isolation is the whole point of this module's interface: every
// error (bad base64, unreachable host, non-2xx status, write failure) is
// caught HERE and reported as a per-item failure record. Nothing escapes
// to abort a batch.
// =============================================================================

use std::path::{Path, PathBuf};

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use reqwest::{Client, StatusCode};
use serde::Serialize;
use thiserror::Error;

use crate::extract::CanonicalLocator;
use crate::store::namer::Namer;

/// Filename used when a remote URL has no usable final path segment.
const FALLBACK_FILENAME: &str = "unknown.jpg";

/// What went wrong while materializing a single locator.
///
/// These never propagate past `materialize` - they exist so the failure
/// message shown to the user names the actual cause.
#[derive(Debug, Error)]
pub enum MaterializeError {
    #[error("failed to fetch {url}: {source}")]
    Fetch {
        url: String,
        source: reqwest::Error,
    },

    #[error("{url} returned HTTP {status}")]
    Status { url: String, status: StatusCode },

    #[error("invalid base64 payload: {0}")]
    Decode(#[from] base64::DecodeError),

    #[error("could not write {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Outcome of materializing one locator.
#[derive(Debug, Clone, Serialize)]
pub struct MaterializeResult {
    /// Canonical form of the locator that was attempted.
    pub locator: String,
    /// Whether bytes made it to disk.
    pub ok: bool,
    /// Where the file was written (present only on success).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
    /// Human-readable cause (present only on failure).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Decodes or downloads one locator and writes it into `directory`.
///
/// Never returns an error: failures come back as `ok: false` records with
/// the cause attached, so callers can keep iterating.
pub async fn materialize(
    client: &Client,
    namer: &Namer,
    locator: &CanonicalLocator,
    directory: &Path,
) -> MaterializeResult {
    let canonical = locator.canonical_string();
    match try_materialize(client, namer, locator, directory).await {
        Ok(path) => MaterializeResult {
            locator: canonical,
            ok: true,
            path: Some(path),
            error: None,
        },
        Err(e) => MaterializeResult {
            locator: canonical,
            ok: false,
            path: None,
            error: Some(e.to_string()),
        },
    }
}

/// The fallible inner half, so the happy path can use `?` freely.
async fn try_materialize(
    client: &Client,
    namer: &Namer,
    locator: &CanonicalLocator,
    directory: &Path,
) -> Result<PathBuf, MaterializeError> {
    match locator {
        CanonicalLocator::Inline { subtype, payload } => {
            // Decode first: an invalid payload must not burn a name
            let bytes = BASE64.decode(payload.as_bytes())?;
            let path = namer.reserve(&directory.join(format!("uri-image.{}", subtype)));
            write_bytes(&path, &bytes).await?;
            Ok(path)
        }
        CanonicalLocator::Remote { url } => {
            let path = namer.reserve(&directory.join(filename_for(url)));

            let response = client
                .get(url)
                .send()
                .await
                .map_err(|source| MaterializeError::Fetch {
                    url: url.clone(),
                    source,
                })?;

            // Non-2xx: fail without creating a file
            if !response.status().is_success() {
                return Err(MaterializeError::Status {
                    url: url.clone(),
                    status: response.status(),
                });
            }

            let bytes = response
                .bytes()
                .await
                .map_err(|source| MaterializeError::Fetch {
                    url: url.clone(),
                    source,
                })?;

            write_bytes(&path, &bytes).await?;
            Ok(path)
        }
    }
}

/// Default filename for a remote locator: its final path segment, with any
/// leftover query cut off, falling back to unknown.jpg for URLs that end
/// in a slash.
fn filename_for(url: &str) -> String {
    let last_segment = url.rsplit('/').next().unwrap_or("");
    let name = last_segment.split('?').next().unwrap_or("");
    if name.is_empty() {
        FALLBACK_FILENAME.to_string()
    } else {
        name.to_string()
    }
}

async fn write_bytes(path: &Path, bytes: &[u8]) -> Result<(), MaterializeError> {
    tokio::fs::write(path, bytes)
        .await
        .map_err(|source| MaterializeError::Write {
            path: path.to_path_buf(),
            source,
        })
}

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. Why split materialize / try_materialize?
//    - try_materialize returns Result so every fallible step can use `?`
//    - materialize is the public boundary that converts ANY error into a
//      plain failure record - the isolation contract in one place
//
// 2. What is the Engine trait import (`Engine as _`)?
//    - base64 0.22 exposes decode() through the Engine trait
//    - `as _` brings the trait's methods into scope without naming it
//
// 3. Why tokio::fs instead of std::fs?
//    - We're inside async code; std::fs::write would block the executor
//      thread while the disk write completes
//    - tokio::fs offloads it so other downloads keep making progress
// -----------------------------------------------------------------------------
