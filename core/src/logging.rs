use anyhow::{Context, Result};
use std::fs::File;
use std::path::Path;
use std::sync::Mutex;
use tracing_subscriber::{fmt, EnvFilter};

/// Install the global subscriber. `level` is the default filter, overridden
/// by `RUST_LOG` when set; `json` switches to JSON lines; `file` redirects
/// output from stdout to the given path.
pub fn init(level: &str, json: bool, file: Option<&Path>) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .context("invalid log level")?;

    match (json, file) {
        (false, None) => fmt().with_env_filter(filter).init(),
        (true, None) => fmt().with_env_filter(filter).json().init(),
        (false, Some(path)) => {
            let file = File::create(path)
                .with_context(|| format!("creating log file {}", path.display()))?;
            fmt()
                .with_env_filter(filter)
                .with_writer(Mutex::new(file))
                .with_ansi(false)
                .init();
        }
        (true, Some(path)) => {
            let file = File::create(path)
                .with_context(|| format!("creating log file {}", path.display()))?;
            fmt()
                .with_env_filter(filter)
                .json()
                .with_writer(Mutex::new(file))
                .with_ansi(false)
                .init();
        }
    }
    Ok(())
}
