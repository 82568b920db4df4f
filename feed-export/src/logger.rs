//! Logging Infrastructure
//!
//! stdout carries the feed, so log lines go to stderr or to daily rolling
//! files under the log directory.

use std::io;
use std::path::Path;
use tracing_subscriber::EnvFilter;

/// Initialize the logger
///
/// `RUST_LOG` wins over `log_level` when set. A log directory that does
/// not exist is ignored.
pub fn init_logger(log_level: &str, json: bool, log_dir: Option<&Path>) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_file(false)
        .with_line_number(false)
        .with_thread_ids(false)
        .with_target(false);

    let file_appender = log_dir
        .filter(|dir| dir.is_dir())
        .map(|dir| tracing_appender::rolling::daily(dir, "feed-export"));

    match (file_appender, json) {
        (Some(appender), true) => subscriber.json().with_writer(appender).init(),
        (Some(appender), false) => subscriber.with_ansi(false).with_writer(appender).init(),
        (None, true) => subscriber.json().with_writer(io::stderr).init(),
        (None, false) => subscriber.with_writer(io::stderr).init(),
    }
}
