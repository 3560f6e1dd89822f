use crate::config::LogFormat;
use tracing_subscriber::EnvFilter;

/// Initializes the tracing subscriber. Defaults to `info` with noisy HTTP
/// internals turned down; `RUST_LOG` overrides everything.
pub fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info".into())
        .add_directive("hyper=warn".parse().expect("valid directive"))
        .add_directive("tower=warn".parse().expect("valid directive"))
        .add_directive("reqwest=warn".parse().expect("valid directive"))
        .add_directive("rustls=warn".parse().expect("valid directive"));

    match format {
        LogFormat::Text => tracing_subscriber::fmt().with_env_filter(filter).init(),
        LogFormat::Json => tracing_subscriber::fmt().json().with_env_filter(filter).init(),
    }
}
