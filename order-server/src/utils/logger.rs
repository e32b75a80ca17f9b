//! Logging Infrastructure
//!
//! Structured logging setup with support for both development and production environments
//! Features:
//! - Daily rotating application logs (deleted after 14 days)
//! - Daily rotating access logs (target `access`, deleted after 14 days)

use std::fs;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{EnvFilter, Layer, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Target used by the HTTP access log middleware
pub const ACCESS_TARGET: &str = "access";

/// Days a rotated log file is kept before cleanup
pub const LOG_RETENTION_DAYS: i64 = 14;

/// Initialize the logging system with daily rotating logs
///
/// # Arguments
/// * `level` - Log level (e.g., "info", "debug", "warn"); `RUST_LOG` wins when set
/// * `json_format` - Whether to use JSON format (true for production, false for development)
/// * `log_dir` - Optional directory for file logging (e.g., Some("./work_dir/logs"))
///
/// # Examples
/// ```no_run
/// use std::path::Path;
/// use order_server::init_logger_with_file;
///
/// // Development setup (console only)
/// init_logger_with_file("debug", false, None)?;
///
/// // Production setup (console + file)
/// init_logger_with_file("info", true, Some(Path::new("./work_dir/logs")))?;
/// # Ok::<(), anyhow::Error>(())
/// ```
pub fn init_logger_with_file(
    level: &str,
    json_format: bool,
    log_dir: Option<&Path>,
) -> anyhow::Result<()> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    // Console layer: JSON for production, pretty for development
    let (pretty_console, json_console) = if json_format {
        let layer = fmt::layer()
            .json()
            .with_target(true)
            .with_current_span(true)
            .with_thread_ids(true)
            .with_file(true)
            .with_line_number(true);
        (None, Some(layer))
    } else {
        let layer = fmt::layer()
            .with_target(true)
            .with_thread_ids(false)
            .with_file(true)
            .with_line_number(true);
        (Some(layer), None)
    };

    let (app_file, access_file) = match log_dir {
        Some(dir) => {
            let app_log_dir = dir.join("app");
            let access_log_dir = dir.join("access");
            fs::create_dir_all(&app_log_dir)?;
            fs::create_dir_all(&access_log_dir)?;

            // Only log to app file if target is NOT "access"
            let app_log = RollingFileAppender::new(Rotation::DAILY, app_log_dir, "app");
            let app_layer = fmt::layer()
                .json()
                .with_target(true)
                .with_current_span(true)
                .with_file(true)
                .with_line_number(true)
                .with_writer(std::sync::Mutex::new(app_log))
                .with_filter(tracing_subscriber::filter::filter_fn(|meta| {
                    meta.target() != ACCESS_TARGET
                }));

            let access_log = RollingFileAppender::new(Rotation::DAILY, access_log_dir, "access");
            let access_layer = fmt::layer()
                .json()
                .with_target(false)
                .with_writer(std::sync::Mutex::new(access_log))
                .with_filter(tracing_subscriber::filter::filter_fn(|meta| {
                    meta.target() == ACCESS_TARGET
                }));

            (Some(app_layer), Some(access_layer))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(pretty_console)
        .with(json_console)
        .with(app_file)
        .with(access_file)
        .try_init()?;

    Ok(())
}

/// Initialize the logging system (console only)
pub fn init_logger(level: &str, json_format: bool) -> anyhow::Result<()> {
    init_logger_with_file(level, json_format, None)
}

/// Clean up rotated log files older than [`LOG_RETENTION_DAYS`]
///
/// Rotated files are named `<prefix>.YYYY-MM-DD`; anything else is left alone.
/// Returns the number of deleted files.
pub fn cleanup_old_logs(log_dir: &Path, today: NaiveDate) -> anyhow::Result<usize> {
    let cutoff = today - chrono::Duration::days(LOG_RETENTION_DAYS);
    let mut removed = 0;

    for sub in ["app", "access"] {
        let dir = log_dir.join(sub);
        if !dir.exists() {
            continue;
        }

        for entry in fs::read_dir(&dir)? {
            let path = entry?.path();
            let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
                continue;
            };

            let file_date = name
                .strip_prefix(sub)
                .and_then(|rest| rest.strip_prefix('.'))
                .and_then(|d| NaiveDate::parse_from_str(d, "%Y-%m-%d").ok());

            if let Some(date) = file_date
                && date < cutoff
            {
                fs::remove_file(&path)?;
                removed += 1;
                tracing::info!(file = %name, "Deleted old log file");
            }
        }
    }

    Ok(removed)
}

/// Periodic cleanup task - runs every hour to clean old logs
pub async fn periodic_cleanup(log_dir: PathBuf) {
    use tokio::time::{Duration, sleep};

    loop {
        sleep(Duration::from_secs(3600)).await;

        let today = chrono::Local::now().date_naive();
        if let Err(e) = cleanup_old_logs(&log_dir, today) {
            tracing::error!(error = %e, "Failed to cleanup old logs");
        }
    }
}
