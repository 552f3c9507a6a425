// src/store/mod.rs
// =============================================================================
// This module contains the retrieval stage of the pipeline: getting the
// bytes behind each locator safely onto disk.
//
// Submodules:
// - namer: collision-safe filename assignment (never overwrites)
// - materialize: decode-or-download one locator, failures isolated
// - batch: bulk retrieval over a whole locator set with aggregate counts
// =============================================================================

mod batch;
mod materialize;
mod namer;

// Re-export public items from submodules
pub use batch::{retrieve_all, BatchReport, OutputDirError, RetrievalOutcome};
pub use materialize::MaterializeResult;
pub use namer::Namer;
