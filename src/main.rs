// src/main.rs
// =============================================================================
// This is the entry point of our CLI application.
//
// What happens here:
// 1. Parse command-line arguments using clap
// 2. Run the pipeline: extract image locators, then (for fetch) download
// 3. Print results as a table or JSON
// 4. Exit with proper code (0 = all ok, 1 = some downloads failed, 2 = error)
//
// The pipeline stages live in extract/ and store/; this file is only the
// wiring between them: it builds the HTTP client and the config, derives
// the per-host output directory, and writes the listing file.
// =============================================================================

// Module declarations - tells Rust about our other source files
mod cli; // src/cli.rs - command-line parsing
mod config; // src/config.rs - scraping policy value object
mod extract; // src/extract/ - locator discovery and normalization
mod store; // src/store/ - collision-safe storage and batch retrieval

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use clap::Parser;
use url::Url;

use cli::{Cli, Commands};
use config::ScrapeConfig;
use extract::{extract_image_locators, LocatorSet};
use store::{retrieve_all, BatchReport, MaterializeResult, Namer};

// The #[tokio::main] attribute transforms our async main into a real main
// function: it creates a tokio runtime and runs our async code inside it
#[tokio::main]
async fn main() {
    let exit_code = match run().await {
        Ok(code) => code,
        Err(e) => {
            // Unexpected error: print the whole context chain and exit 2
            eprintln!("Error: {:#}", e);
            2
        }
    };

    std::process::exit(exit_code);
}

async fn run() -> Result<i32> {
    let cli = Cli::parse();

    match cli.command {
        Commands::List {
            page_url,
            json,
            no_inline,
            save,
            out,
        } => handle_list(&page_url, json, no_inline, save, &out).await,
        Commands::Fetch {
            page_url,
            json,
            no_inline,
            out,
        } => handle_fetch(&page_url, json, no_inline, &out).await,
    }
}

// Handles the 'list' subcommand: discovery only, nothing is downloaded
async fn handle_list(
    page_url: &str,
    json: bool,
    no_inline: bool,
    save: bool,
    out: &Path,
) -> Result<i32> {
    let client = build_client()?;
    let config = scrape_config(no_inline);

    if !json {
        println!("🔍 Scanning page: {}", page_url);
    }

    let locators = extract_image_locators(&client, page_url, &config).await?;

    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&locators.canonical_strings())?
        );
    } else if locators.is_empty() {
        println!("✅ No image references found on page");
    } else {
        println!("🖼️  Found {} unique image locator(s):\n", locators.len());
        for line in locators.canonical_strings() {
            println!("{}", line);
        }
    }

    if save && !locators.is_empty() {
        let host = page_host(page_url)?;
        let path = write_listing_file(&out.join(&host), &host, &locators)?;
        if !json {
            println!("\n📝 Listing saved to {}", path.display());
        }
    }

    Ok(0)
}

// Handles the 'fetch' subcommand: discovery, listing file, then the batch
// download into a per-host subdirectory
async fn handle_fetch(page_url: &str, json: bool, no_inline: bool, out: &Path) -> Result<i32> {
    let client = build_client()?;
    let config = scrape_config(no_inline);

    if !json {
        println!("🔍 Scanning page: {}", page_url);
    }

    let locators = extract_image_locators(&client, page_url, &config).await?;

    if locators.is_empty() {
        if json {
            println!(
                "{}",
                serde_json::json!({ "succeeded": 0, "failed": 0, "results": [] })
            );
        } else {
            println!("✅ No image references found on page");
        }
        return Ok(0);
    }

    if !json {
        println!("🖼️  Found {} unique image locator(s)", locators.len());
    }

    // Downloads for host h land in <out>/<h>/, next to the listing file
    let host = page_host(page_url)?;
    let host_dir = out.join(&host);

    let listing = write_listing_file(&host_dir, &host, &locators)?;
    if !json {
        println!("📝 Listing saved to {}", listing.display());
        println!("\n🌐 Downloading {} image(s)...\n", locators.len());
    }

    let report = retrieve_all(&client, &locators, &host_dir).await?;

    print_report(&report, json)?;

    if report.outcome.failed > 0 {
        Ok(1) // Exit code 1 = some downloads failed
    } else {
        Ok(0) // Exit code 0 = everything saved
    }
}

// Builds the shared HTTP client used for both the page fetch and every
// image download. The 10 second timeout is a deliberate hardening choice:
// one hung server must not stall a whole batch forever.
fn build_client() -> Result<reqwest::Client> {
    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(10))
        .redirect(reqwest::redirect::Policy::limited(5))
        .build()
        .context("failed to build HTTP client")?;
    Ok(client)
}

fn scrape_config(no_inline: bool) -> ScrapeConfig {
    let mut config = ScrapeConfig::default();
    config.include_inline = !no_inline;
    config
}

// Extracts the host part of the page URL; it names the output subdirectory
// and the listing file. A URL without a host can't be scraped anyway, so
// this fails early instead of producing a directory called "".
fn page_host(page_url: &str) -> Result<String> {
    let parsed =
        Url::parse(page_url).with_context(|| format!("invalid page URL: {}", page_url))?;
    parsed
        .host_str()
        .map(str::to_string)
        .ok_or_else(|| anyhow!("page URL has no host: {}", page_url))
}

// Writes the de-duplicated locator list to a <host>.txt file inside the
// host directory, one canonical locator per line, newline-terminated.
// The name goes through a Namer so an earlier run's listing survives.
fn write_listing_file(host_dir: &Path, host: &str, locators: &LocatorSet) -> Result<PathBuf> {
    std::fs::create_dir_all(host_dir)
        .with_context(|| format!("could not create output directory {}", host_dir.display()))?;

    let namer = Namer::new();
    let path = namer.reserve(&host_dir.join(format!("{}.txt", host)));

    let mut contents = String::new();
    for line in locators.canonical_strings() {
        contents.push_str(&line);
        contents.push('\n');
    }
    std::fs::write(&path, contents)
        .with_context(|| format!("could not write listing file {}", path.display()))?;

    Ok(path)
}

// Prints the batch report either as a table or JSON
fn print_report(report: &BatchReport, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(report)?);
    } else {
        print_table(&report.results);
    }
    Ok(())
}

// Prints per-item results as a human-readable table in the terminal
fn print_table(results: &[MaterializeResult]) {
    println!("{:<60} {:<10} {:<40}", "LOCATOR", "RESULT", "DETAIL");
    println!("{}", "=".repeat(110));

    for result in results {
        // Truncate long locators (data URIs especially) for display
        let locator_display = if result.locator.chars().count() > 57 {
            let head: String = result.locator.chars().take(57).collect();
            format!("{}...", head)
        } else {
            result.locator.clone()
        };

        let (status, detail) = if result.ok {
            let saved = result
                .path
                .as_ref()
                .map(|p| p.display().to_string())
                .unwrap_or_default();
            ("✅ OK", saved)
        } else {
            ("❌ FAIL", result.error.clone().unwrap_or_default())
        };

        println!("{:<60} {:<10} {:<40}", locator_display, status, detail);
    }

    println!();

    // Print summary
    let saved = results.iter().filter(|r| r.ok).count();
    println!("📊 Summary:");
    println!("   ✅ Saved: {}", saved);
    println!("   ❌ Failed: {}", results.len() - saved);
    println!("   📋 Total: {}", results.len());
}
