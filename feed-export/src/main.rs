//! feed-export: stream a catalog snapshot as a search feed
//!
//! Reads a JSON catalog snapshot, builds the feed request from flags,
//! environment and `.env`, and writes the feed (or the discovery document)
//! to stdout or a file. Logs go to stderr.
//!
//! Exit codes: 0 on success, 2 when the request is rejected (the error
//! payload is written instead of the feed), 1 on any other failure.

mod cli;
mod logger;
mod snapshot;

use anyhow::Context;
use clap::Parser;
use cli::Cli;
use feed_core::{DiscoveryDocument, FeedConfig, FeedDefaults, FeedOutcome, FeedRun, StoreLinks};
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::process::ExitCode;

/// Request rejected before any feed output
const EXIT_REJECTED: u8 = 2;

fn main() -> ExitCode {
    // Load .env file
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    logger::init_logger(&cli.log_level, cli.log_json, cli.log_dir.as_deref());

    match run(&cli) {
        Ok(code) => code,
        Err(e) => {
            tracing::error!("Feed export failed: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn open_output(cli: &Cli) -> anyhow::Result<Box<dyn Write>> {
    Ok(match &cli.output {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("Failed to create output {}", path.display()))?;
            Box::new(BufWriter::new(file))
        }
        None => Box::new(io::stdout().lock()),
    })
}

fn run(cli: &Cli) -> anyhow::Result<ExitCode> {
    let defaults = FeedDefaults::default();

    let request = match FeedConfig::from_params(cli.request_params(), &defaults) {
        Ok(request) => request,
        Err(e) if e.is_preflight() => {
            tracing::warn!(error = %e, "Feed request rejected");
            let mut out = open_output(cli)?;
            writeln!(out, "{}", e.payload().to_json())?;
            out.flush()?;
            return Ok(ExitCode::from(EXIT_REJECTED));
        }
        Err(e) => return Err(e.into()),
    };

    // An existing output file is only replaced once the snapshot is readable
    let snapshot = snapshot::load(&cli.snapshot)?;
    let mut out = open_output(cli)?;

    if request.discovery {
        let document = DiscoveryDocument::build(&snapshot.catalog, &snapshot.store, &defaults)?;
        writeln!(out, "{}", document.to_json()?)?;
        out.flush()?;
        return Ok(ExitCode::SUCCESS);
    }

    let links = match &cli.store_url {
        Some(url) => StoreLinks {
            catalog_url: url.clone(),
            ..snapshot.links
        },
        None => snapshot.links,
    };
    let config = request.config.with_links(links);
    tracing::info!(content_type = %config.charset.content_type(), "Streaming feed");

    match FeedRun::new(&snapshot.catalog, config).execute(&mut out)? {
        FeedOutcome::Completed(summary) => {
            tracing::info!(records = summary.records_written, "Feed export complete");
            Ok(ExitCode::SUCCESS)
        }
        FeedOutcome::Rejected(payload) => {
            tracing::warn!(code = %payload.error, "Feed export rejected");
            Ok(ExitCode::from(EXIT_REJECTED))
        }
    }
}
