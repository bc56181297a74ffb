use tracing_subscriber::prelude::*;

const DEFAULT_FILTER: &str = "notepad=debug,notepad_server=debug,keep_alive=debug,tower_http=debug,axum::rejection=trace";

/// Installs the global subscriber. `RUST_LOG` overrides the default filter.
pub fn setup_tracing(json: bool) {
    let tracing = tracing_subscriber::registry().with(
        tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| DEFAULT_FILTER.into()),
    );

    let result = if json {
        tracing.with(tracing_subscriber::fmt::layer().json()).try_init()
    } else {
        tracing.with(tracing_subscriber::fmt::layer()).try_init()
    };

    if let Err(error) = result {
        eprintln!("tracing already initialized: {error}");
    }
}
