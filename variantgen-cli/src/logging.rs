//! Tracing subscriber setup

use tracing_subscriber::EnvFilter;

/// Install a stderr subscriber; `--debug` wins over `RUST_LOG`
pub fn init(debug: bool) {
    let filter = if debug {
        EnvFilter::new("vgen=debug,variantgen=debug,variantgen_config=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_ansi(false)
        .with_writer(std::io::stderr)
        .init();
}
