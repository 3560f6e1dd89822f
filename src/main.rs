#![forbid(unsafe_code)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::todo)]
#![warn(clippy::panic)]
#![warn(clippy::dbg_macro)]
#![warn(clippy::print_stdout)]
#![warn(clippy::print_stderr)]
#![warn(clippy::clone_on_ref_ptr)]
#![warn(unreachable_pub)]
#![warn(missing_debug_implementations)]
#![warn(unused_qualifications)]
#![deny(unused_must_use)]

use postbox_server::adapters::audit::AuditLog;
use postbox_server::adapters::captcha::{CaptchaVerifier, RecaptchaVerifier};
use postbox_server::adapters::mail;
use postbox_server::api::{AppState, app_router};
use postbox_server::config::Config;
use postbox_server::services::contact::ContactService;
use postbox_server::telemetry;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::load();
    telemetry::init_tracing(config.server.log_format);

    // Component wiring: everything below is read-only after startup.
    let transports = mail::build_transports(&config.mail)?;

    let captcha: Option<Arc<dyn CaptchaVerifier>> = match config.captcha.secret() {
        Some(secret) => {
            tracing::info!("CAPTCHA verification enabled");
            Some(Arc::new(RecaptchaVerifier::new(
                secret.to_owned(),
                config.captcha.siteverify_url.clone(),
                Duration::from_secs(config.captcha.timeout_secs),
            )?))
        }
        None => None,
    };

    let audit = config.audit.enabled.then(|| {
        tracing::info!(path = %config.audit.path.display(), "Audit logging enabled");
        AuditLog::new(config.audit.path.clone())
    });

    let contact_service = ContactService::new(config.contact.clone(), transports, captcha, audit);
    let app = app_router(AppState { contact_service });

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(address = %addr, "listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(error) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %error, "Failed to install Ctrl+C handler");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(error) => tracing::error!(error = %error, "Failed to install SIGTERM handler"),
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {}
        () = terminate => {}
    }

    tracing::info!("Shutdown signal received");
}
