//! Tracing subscriber setup.
//!
//! Logs go to stderr so stdout stays clean for `guide ask` and `guide index`
//! output. The filter comes from `--log-level`, then `RUST_LOG`, then
//! `info`.

use anyhow::{anyhow, Result};
use std::io::IsTerminal;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

pub fn init_logging(log_level: Option<&str>, no_color: bool) -> Result<()> {
    let default_level = std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());
    let filter_str = log_level.unwrap_or(&default_level);

    let env_filter =
        EnvFilter::try_new(filter_str).map_err(|e| anyhow!("Invalid log filter: {}", e))?;

    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_level(true)
        .with_ansi(!no_color && supports_color());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .try_init()
        .map_err(|e| anyhow!("Failed to init logging: {}", e))?;

    Ok(())
}

fn supports_color() -> bool {
    std::env::var_os("NO_COLOR").is_none() && std::io::stderr().is_terminal()
}
