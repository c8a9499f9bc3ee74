//! Log subscriber installation for binaries and tests.

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Environment variable holding an `EnvFilter` directive string,
/// e.g. `MAD_LOG=mad_engine::scanner=debug,mad_storage=warn`.
pub const LOG_ENV: &str = "MAD_LOG";

/// Directives used when `MAD_LOG` is unset or unparsable.
pub const DEFAULT_DIRECTIVES: &str = "warn,mad_core=info,mad_storage=info,mad_engine=info";

/// Install a compact stderr logger filtered by `MAD_LOG`.
///
/// A scan emits one line per phase, so records carry the target and the
/// worker thread name rather than source locations. If a global
/// subscriber is already installed (by a test harness or a host
/// application) this does nothing.
pub fn init_tracing() {
    let filter =
        EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(DEFAULT_DIRECTIVES));
    let layer = fmt::layer()
        .compact()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_thread_names(true);

    let _ = tracing_subscriber::registry().with(filter).with(layer).try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_directives_parse() {
        assert!(EnvFilter::try_new(DEFAULT_DIRECTIVES).is_ok());
    }

    #[test]
    fn repeated_init_is_harmless() {
        init_tracing();
        init_tracing();
        tracing::info!(target: "mad_core", "logger installed");
    }
}
