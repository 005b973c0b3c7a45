use tracing_subscriber::{EnvFilter, Layer, layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize console logging.
///
/// `RUST_LOG` takes precedence; otherwise the filter is `info,courier=debug`,
/// or `debug` everywhere when `verbose` is set. `json_logs` switches the
/// output to one JSON object per event.
pub fn init_console_telemetry(verbose: bool, json_logs: bool) {
    let default_filter = if verbose { "debug" } else { "info,courier=debug" };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    let fmt_layer = if json_logs {
        tracing_subscriber::fmt::layer()
            .json()
            .with_target(true)
            .with_level(true)
            .boxed()
    } else {
        tracing_subscriber::fmt::layer().with_target(verbose).boxed()
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .init();
}
