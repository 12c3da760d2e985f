use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

/// Installs the global tracing subscriber. Directives passed on the command
/// line win over `RUST_LOG`; with neither present the daemon logs at INFO.
pub(crate) fn init_tracing(directives: Option<&str>) {
    let env_filter = match directives {
        Some(directives) => EnvFilter::new(directives),
        None => EnvFilter::builder()
            .with_default_directive(LevelFilter::INFO.into())
            .from_env_lossy(),
    };

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .compact()
        .init();
}
