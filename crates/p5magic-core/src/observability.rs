//! Observability: tracing init.
//!
//! Uses config::ObservabilityConfig for P5MAGIC_QUIET, P5MAGIC_LOG_LEVEL and
//! P5MAGIC_LOG_JSON. Output goes to stderr; stdout is the display channel.

use tracing_subscriber::{prelude::*, EnvFilter};

/// Initialize tracing. Call once at process startup.
/// When P5MAGIC_QUIET=1, only WARN and above are logged.
pub fn init_tracing() {
    let cfg = crate::config::ObservabilityConfig::from_env();
    let level = filter_directive(&cfg);

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&level));

    let _ = if cfg.log_json {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr)
                    .with_target(true)
                    .with_thread_ids(false),
            )
            .try_init()
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_target(true)
                    .with_thread_ids(false),
            )
            .try_init()
    };
}

fn filter_directive(cfg: &crate::config::ObservabilityConfig) -> String {
    if cfg.quiet {
        "p5magic=warn".to_string()
    } else {
        cfg.log_level.clone()
    }
}
