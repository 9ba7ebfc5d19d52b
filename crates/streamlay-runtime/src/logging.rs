use std::env;

use tracing_subscriber::EnvFilter;

/// Installs the global subscriber. `RUST_LOG` wins when set; otherwise the
/// level is `info`, or `debug` with `STREAMLAY_DEBUG=1`.
pub fn init() {
    let debug = env::var("STREAMLAY_DEBUG").is_ok_and(|value| value == "1");
    let level = if debug { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}
