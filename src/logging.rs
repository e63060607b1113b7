use std::path::Path;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Log to stdout and to a daily-rotated `shiori.log` under `log_dir`.
/// `RUST_LOG` overrides the default `shiori=info` filter.
pub fn setup_logging(log_dir: &Path) -> anyhow::Result<()> {
    std::fs::create_dir_all(log_dir)?;
    let file_appender = tracing_appender::rolling::daily(log_dir, "shiori.log");

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("warn,shiori=info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer())
        .with(fmt::layer().with_writer(file_appender).with_ansi(false))
        .try_init()?;

    Ok(())
}
