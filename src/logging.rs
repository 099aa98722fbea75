//! Logging setup.
//!
//! Log records go to stderr (compact, warnings and above unless `--verbose`)
//! and to a persistent sink: systemd-journald on Linux when available, a
//! daily rolling file otherwise.
//!
//! The level of the persistent sink is controlled via `INTO_FOLDERS_LOG`
//! (`debug` records every single move/copy; default `info`).

use anyhow::Result;
use std::path::PathBuf;
use tracing_subscriber::{
    filter::LevelFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer,
};

pub fn init(log_dir: Option<PathBuf>, verbose: bool) -> Result<()> {
    let env_filter = EnvFilter::try_from_env("INTO_FOLDERS_LOG")
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let console_level = if verbose {
        LevelFilter::DEBUG
    } else {
        LevelFilter::WARN
    };
    let console = fmt::layer()
        .compact()
        .without_time()
        .with_target(false)
        .with_writer(std::io::stderr)
        .with_filter(console_level);

    #[cfg(target_os = "linux")]
    {
        if let Ok(journald_layer) = tracing_journald::layer() {
            tracing_subscriber::registry()
                .with(console)
                .with(journald_layer.with_filter(env_filter))
                .init();

            tracing::debug!("Logging initialized with journald backend");
            return Ok(());
        }
    }

    let log_dir = log_dir.unwrap_or_else(|| {
        dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("into-folders")
            .join("logs")
    });

    std::fs::create_dir_all(&log_dir)?;

    let file_appender = tracing_appender::rolling::daily(&log_dir, "into-folders.log");
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    // Dropping the guard stops the background writer; keep it for the
    // lifetime of the process.
    static GUARD: std::sync::OnceLock<tracing_appender::non_blocking::WorkerGuard> =
        std::sync::OnceLock::new();
    let _ = GUARD.set(guard);

    tracing_subscriber::registry()
        .with(console)
        .with(
            fmt::layer()
                .with_writer(non_blocking)
                .with_ansi(false)
                .with_filter(env_filter),
        )
        .init();

    tracing::debug!("Logging initialized with file backend at {:?}", log_dir);
    Ok(())
}
