// src/cli.rs
// =============================================================================
// This file defines our command-line interface using the `clap` crate.
//
// clap is a popular Rust library for parsing command-line arguments.
// We use the "derive" API which lets us define the CLI structure using
// Rust structs and attributes (the #[...] things).
//
// Two subcommands map onto the two pipeline stages:
// - list: discovery only (print the locators a page references)
// - fetch: discovery + retrieval (download everything to disk)
// =============================================================================

use clap::{Parser, Subcommand};
use std::path::PathBuf;

// This struct represents our entire CLI application
//
// #[derive(Parser)] tells clap to automatically generate parsing code
// The #[command(...)] attributes configure how the CLI behaves
#[derive(Parser, Debug)]
#[command(
    name = "image-harvester",
    version = "0.1.0",
    about = "Extract and download every image referenced by a web page",
    long_about = "image-harvester scans a web page for image references (img tags, \
                  lazy-load attributes, and hyperlinks to image files), normalizes \
                  them into unique URLs, and can download them all to disk with \
                  collision-safe filenames."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

// Each variant is one subcommand; its fields become that subcommand's
// arguments and flags
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List the image locators found on a page without downloading anything
    ///
    /// Example: image-harvester list https://example.com
    List {
        /// URL of the page to scan
        page_url: String,

        /// Output results in JSON format instead of plain lines
        #[arg(long)]
        json: bool,

        /// Skip inline data:image/... references
        #[arg(long)]
        no_inline: bool,

        /// Also write the locator list to <out>/<host>/<host>.txt
        #[arg(long)]
        save: bool,

        /// Base output directory for the listing file
        #[arg(long, default_value = "files")]
        out: PathBuf,
    },

    /// Download every image referenced by a page
    ///
    /// Images land in <out>/<host>/ alongside a <host>.txt listing file.
    ///
    /// Example: image-harvester fetch https://example.com --out files
    Fetch {
        /// URL of the page to scan
        page_url: String,

        /// Output results in JSON format instead of a table
        #[arg(long)]
        json: bool,

        /// Skip inline data:image/... references
        #[arg(long)]
        no_inline: bool,

        /// Base output directory; a per-host subdirectory is created inside
        #[arg(long, default_value = "files")]
        out: PathBuf,
    },
}

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. Why do the doc comments matter?
//    - clap turns /// comments into the --help text automatically
//    - The first line becomes the short help, the rest the long help
//
// 2. What does default_value = "files" do?
//    - Makes --out optional; when omitted, output goes under ./files/
//    - Mirrors the classic "downloads folder next to where you ran it"
//
// 3. Why PathBuf for --out?
//    - clap parses the argument straight into an owned filesystem path
//    - Saves us from converting strings to paths by hand later
// -----------------------------------------------------------------------------
