use tracing_subscriber::EnvFilter;

/// Installs the stderr subscriber. `RUST_LOG` wins; otherwise
/// `RESEARCH_DESK_DEBUG` switches the crate to debug output.
pub fn init() {
    let default = if std::env::var("RESEARCH_DESK_DEBUG").is_ok() {
        "research_desk=debug"
    } else {
        "research_desk=info"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}
