//! Structured logging setup for embedders and tests.
//!
//! The pipeline itself only emits `tracing` events (`debug!` for
//! intermediate numbers, `info!` for verdicts); it never installs a
//! subscriber. This module is the opt-in helper for binaries and tests
//! that want one:
//!
//! - human-readable console output on stderr, or
//! - machine-parseable JSONL for agent workflows.
//!
//! stdout stays reserved for payload output. The filter honors `RUST_LOG`
//! and defaults to `rt_core=info`.

use std::io::IsTerminal;

use tracing_subscriber::{fmt, EnvFilter};

/// Output format for the logging subscriber.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Human,
    Jsonl,
}

/// Install a global subscriber. Returns false when one was already set
/// (fine in tests, where the first caller wins).
pub fn init_logging(format: LogFormat) -> bool {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("rt_core=info"));

    let result = match format {
        LogFormat::Human => {
            let use_ansi = std::io::stderr().is_terminal();
            tracing::subscriber::set_global_default(
                fmt()
                    .with_env_filter(filter)
                    .with_writer(std::io::stderr)
                    .with_ansi(use_ansi)
                    .with_target(true)
                    .finish(),
            )
        }
        LogFormat::Jsonl => tracing::subscriber::set_global_default(
            fmt()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .with_ansi(false)
                .json()
                .finish(),
        ),
    };
    result.is_ok()
}
