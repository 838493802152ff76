// src/telemetry.rs
//! Log setup, owned by the binary. Library code only emits through `tracing`.

use anyhow::{anyhow, Context, Result};
use std::fs::{self, OpenOptions};
use std::path::Path;
use std::sync::Mutex;
use tracing_subscriber::{filter::LevelFilter, fmt, prelude::*, EnvFilter};

pub const DEBUG_LOG_FILE: &str = "debug.log";

/// Console at INFO (or `RUST_LOG`), JSON when `LOG_FORMAT=json`; everything at
/// DEBUG and above also goes to `<log_dir>/debug.log`.
pub fn init(log_dir: &Path) -> Result<()> {
    fs::create_dir_all(log_dir)
        .with_context(|| format!("creating log dir {}", log_dir.display()))?;
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_dir.join(DEBUG_LOG_FILE))
        .with_context(|| format!("opening {}", log_dir.join(DEBUG_LOG_FILE).display()))?;

    let json = std::env::var("LOG_FORMAT")
        .ok()
        .is_some_and(|v| v.eq_ignore_ascii_case("json"));
    let console_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let console = if json {
        fmt::layer().json().with_filter(console_filter).boxed()
    } else {
        fmt::layer().compact().with_filter(console_filter).boxed()
    };
    let file_layer = fmt::layer()
        .with_ansi(false)
        .with_writer(Mutex::new(file))
        .with_filter(LevelFilter::DEBUG);

    tracing_subscriber::registry()
        .with(console)
        .with(file_layer)
        .try_init()
        .map_err(|e| anyhow!("installing tracing subscriber: {e}"))
}
