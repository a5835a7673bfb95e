// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Logging initialization
//!
//! Console output is always installed. With the `file-logging` feature each
//! run also gets its own folder of JSON log files:
//!
//! ```text
//! ./logs/
//!   └── run_20250101_120000/
//!       ├── memristor_array.log
//!       ├── memristor_device.log
//!       └── memristor.log (combined)
//! ```

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer, Registry};

use crate::cli::CrateDebugFlags;
use crate::config::{LogFormat, LogSettings};

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync>;

/// Keeps file writers alive; logs are flushed when this is dropped
pub struct LoggingGuard {
    #[cfg(feature = "file-logging")]
    _file_guards: Vec<tracing_appender::non_blocking::WorkerGuard>,
    log_dir: Option<PathBuf>,
}

impl LoggingGuard {
    /// Run folder receiving log files, if file logging is active
    pub fn log_dir(&self) -> Option<&Path> {
        self.log_dir.as_deref()
    }
}

/// Install the global subscriber
///
/// The filter is built from `debug_flags` on top of `settings.level`.
/// `RUST_LOG`, when set, replaces the whole filter.
///
/// # Errors
///
/// Fails if the filter does not parse, the run folder cannot be created, or
/// a global subscriber is already installed.
pub fn init_logging(debug_flags: &CrateDebugFlags, settings: &LogSettings) -> Result<LoggingGuard> {
    let filter = match std::env::var("RUST_LOG") {
        Ok(value) if !value.trim().is_empty() => value,
        _ => debug_flags.to_filter_string(&settings.level),
    };
    let env_filter = EnvFilter::try_new(&filter)
        .with_context(|| format!("Invalid log filter: {}", filter))?;

    let mut layers: Vec<BoxedLayer> = Vec::new();

    let console_layer = match settings.format {
        LogFormat::Text => tracing_subscriber::fmt::layer()
            .with_target(false)
            .with_file(false)
            .with_line_number(false)
            .with_writer(std::io::stderr)
            .with_filter(env_filter)
            .boxed(),
        LogFormat::Json => tracing_subscriber::fmt::layer()
            .json()
            .with_writer(std::io::stderr)
            .with_filter(env_filter)
            .boxed(),
    };
    layers.push(console_layer);

    #[cfg(feature = "file-logging")]
    let (file_guards, log_dir) = {
        let (file_layers, guards, run_folder) = file_layers(&filter, settings)?;
        layers.extend(file_layers);
        (guards, Some(run_folder))
    };
    #[cfg(not(feature = "file-logging"))]
    let log_dir = None;

    Registry::default()
        .with(layers)
        .try_init()
        .context("A global tracing subscriber is already installed")?;

    Ok(LoggingGuard {
        #[cfg(feature = "file-logging")]
        _file_guards: file_guards,
        log_dir,
    })
}

#[cfg(feature = "file-logging")]
fn file_layers(
    filter: &str,
    settings: &LogSettings,
) -> Result<(
    Vec<BoxedLayer>,
    Vec<tracing_appender::non_blocking::WorkerGuard>,
    PathBuf,
)> {
    use tracing_appender::rolling;

    let timestamp = chrono::Utc::now().format("%Y%m%d_%H%M%S");
    let run_folder = settings.log_dir.join(format!("run_{}", timestamp));
    std::fs::create_dir_all(&run_folder)
        .with_context(|| format!("Failed to create log directory: {}", run_folder.display()))?;

    cleanup_old_logs(&settings.log_dir, settings.retention_days, settings.retention_runs)?;

    let mut layers: Vec<BoxedLayer> = Vec::new();
    let mut guards = Vec::new();

    for crate_name in crate::KNOWN_CRATES {
        let target = crate::crate_target(crate_name);
        let appender = rolling::never(&run_folder, format!("{}.log", target));
        let (writer, guard) = tracing_appender::non_blocking(appender);
        guards.push(guard);

        layers.push(
            tracing_subscriber::fmt::layer()
                .with_writer(writer)
                .with_target(true)
                .with_file(true)
                .with_line_number(true)
                .json()
                .with_filter(EnvFilter::try_new(format!("{}=debug,off", target))?)
                .boxed(),
        );
    }

    let combined = rolling::never(&run_folder, "memristor.log");
    let (writer, guard) = tracing_appender::non_blocking(combined);
    guards.push(guard);
    layers.push(
        tracing_subscriber::fmt::layer()
            .with_writer(writer)
            .with_target(true)
            .with_file(true)
            .with_line_number(true)
            .json()
            .with_filter(EnvFilter::try_new(filter)?)
            .boxed(),
    );

    Ok((layers, guards, run_folder))
}

/// Remove run folders older than `retention_days`, then all but the newest
/// `retention_runs`. Returns the number of folders removed.
#[cfg(feature = "file-logging")]
pub fn cleanup_old_logs(
    base_log_dir: &Path,
    retention_days: u64,
    retention_runs: usize,
) -> Result<usize> {
    use chrono::{DateTime, NaiveDateTime, Utc};

    if !base_log_dir.exists() {
        return Ok(0);
    }

    let cutoff = Utc::now() - chrono::Duration::days(retention_days as i64);
    let mut runs: Vec<(PathBuf, DateTime<Utc>)> = Vec::new();

    for entry in std::fs::read_dir(base_log_dir)? {
        let path = entry?.path();
        if !path.is_dir() {
            continue;
        }
        let stamp = path
            .file_name()
            .and_then(|n| n.to_str())
            .and_then(|n| n.strip_prefix("run_"))
            .and_then(|s| NaiveDateTime::parse_from_str(s, "%Y%m%d_%H%M%S").ok());
        if let Some(stamp) = stamp {
            runs.push((path, stamp.and_utc()));
        }
    }

    // Oldest first
    runs.sort_by_key(|(_, dt)| *dt);

    let excess = runs.len().saturating_sub(retention_runs);
    let mut removed = 0;
    for (index, (path, dt)) in runs.iter().enumerate() {
        if *dt < cutoff || index < excess {
            match std::fs::remove_dir_all(path) {
                Ok(()) => removed += 1,
                Err(e) => eprintln!(
                    "Warning: Failed to remove old log directory {}: {}",
                    path.display(),
                    e
                ),
            }
        }
    }

    Ok(removed)
}

#[cfg(all(test, feature = "file-logging"))]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_cleanup_keeps_newest_runs() {
        let dir = tempdir().unwrap();
        let now = chrono::Utc::now();
        for minutes in 0..5 {
            let stamp = (now - chrono::Duration::minutes(minutes)).format("%Y%m%d_%H%M%S");
            std::fs::create_dir(dir.path().join(format!("run_{}", stamp))).unwrap();
        }
        std::fs::create_dir(dir.path().join("not_a_run")).unwrap();

        let removed = cleanup_old_logs(dir.path(), 30, 2).unwrap();

        assert_eq!(removed, 3);
        assert!(dir.path().join("not_a_run").exists());
        let newest = format!("run_{}", now.format("%Y%m%d_%H%M%S"));
        assert!(dir.path().join(newest).exists());
    }

    #[test]
    fn test_cleanup_removes_expired_runs() {
        let dir = tempdir().unwrap();
        std::fs::create_dir(dir.path().join("run_20200101_000000")).unwrap();

        let removed = cleanup_old_logs(dir.path(), 30, 10).unwrap();

        assert_eq!(removed, 1);
    }
}
