use tracing_subscriber::EnvFilter;

/// Initialize structured logging to stderr.
///
/// The filter comes from `RUST_LOG`; without it, the relay logs at debug
/// and everything else at info.
pub fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,icsrelay=debug,icsrelay_core=debug"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .compact()
        .init();
}
