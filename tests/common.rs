#![allow(dead_code, clippy::unwrap_used, clippy::panic, clippy::missing_panics_doc, clippy::must_use_candidate, missing_debug_implementations, unreachable_pub)]

use async_trait::async_trait;
use axum::{Json, Router, routing::post};
use postbox_server::adapters::audit::AuditLog;
use postbox_server::adapters::captcha::{CaptchaVerifier, RecaptchaVerifier};
use postbox_server::adapters::mail::MailTransport;
use postbox_server::api::{AppState, app_router};
use postbox_server::config::ContactConfig;
use postbox_server::domain::outbound::OutboundMessage;
use postbox_server::services::contact::ContactService;
use serde_json::json;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, Once};
use std::time::Duration;

static INIT: Once = Once::new();

pub fn setup_tracing() {
    INIT.call_once(|| {
        let filter = tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| "warn".into())
            .add_directive("postbox_server=debug".parse().unwrap())
            .add_directive("tower=warn".parse().unwrap())
            .add_directive("hyper=warn".parse().unwrap())
            .add_directive("reqwest=warn".parse().unwrap());

        tracing_subscriber::fmt().with_env_filter(filter).init();
    });
}

/// Test double for a mail transport: records what it was asked to send,
/// or fails every attempt when `fail` is set.
#[derive(Debug, Clone)]
pub struct RecordingTransport {
    label: &'static str,
    fail: bool,
    pub attempts: Arc<AtomicUsize>,
    pub sent: Arc<Mutex<Vec<OutboundMessage>>>,
}

impl RecordingTransport {
    pub fn delivering(label: &'static str) -> Self {
        Self {
            label,
            fail: false,
            attempts: Arc::new(AtomicUsize::new(0)),
            sent: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn failing(label: &'static str) -> Self {
        Self {
            fail: true,
            ..Self::delivering(label)
        }
    }

    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }

    pub fn sent(&self) -> Vec<OutboundMessage> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl MailTransport for RecordingTransport {
    fn name(&self) -> &'static str {
        self.label
    }

    async fn send(&self, message: &OutboundMessage) -> anyhow::Result<()> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        anyhow::ensure!(!self.fail, "simulated transport failure");
        self.sent.lock().unwrap().push(message.clone());
        Ok(())
    }
}

pub fn contact_config() -> ContactConfig {
    ContactConfig {
        to_email: "owner@example.com".into(),
        to_name: "Site Contact".into(),
        from_email: "no-reply@example.com".into(),
        from_name: "Website Contact".into(),
    }
}

pub struct TestApp {
    pub url: String,
    pub client: reqwest::Client,
}

impl TestApp {
    pub async fn spawn(service: ContactService) -> Self {
        setup_tracing();
        let app = app_router(AppState { contact_service: service });

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            url: format!("http://{addr}"),
            client: reqwest::Client::new(),
        }
    }

    /// Single delivering transport, no CAPTCHA, no audit log.
    pub async fn spawn_default() -> (Self, RecordingTransport) {
        let transport = RecordingTransport::delivering("primary");
        let service = ContactService::new(contact_config(), vec![Arc::new(transport.clone())], None, None);
        (Self::spawn(service).await, transport)
    }

    pub async fn spawn_with_transports(transports: Vec<Arc<dyn MailTransport>>) -> Self {
        let service = ContactService::new(contact_config(), transports, None, None);
        Self::spawn(service).await
    }

    pub async fn spawn_with_audit(audit_path: PathBuf) -> (Self, RecordingTransport) {
        let transport = RecordingTransport::delivering("primary");
        let service = ContactService::new(
            contact_config(),
            vec![Arc::new(transport.clone())],
            None,
            Some(AuditLog::new(audit_path)),
        );
        (Self::spawn(service).await, transport)
    }

    pub async fn spawn_with_captcha(verifier: RecaptchaVerifier) -> (Self, RecordingTransport) {
        let transport = RecordingTransport::delivering("primary");
        let service = ContactService::new(
            contact_config(),
            vec![Arc::new(transport.clone())],
            Some(Arc::new(verifier) as Arc<dyn CaptchaVerifier>),
            None,
        );
        (Self::spawn(service).await, transport)
    }

    /// Posts the form over a simulated confidential channel.
    pub async fn post_contact(&self, form: &[(&str, &str)]) -> reqwest::Response {
        self.client
            .post(format!("{}/contact", self.url))
            .header("x-forwarded-proto", "https")
            .form(form)
            .send()
            .await
            .unwrap()
    }
}

pub fn valid_form() -> Vec<(&'static str, &'static str)> {
    vec![
        ("name", "Jane Doe"),
        ("email", "jane@example.com"),
        ("subject", "Hello"),
        ("message", "This is a ten-plus character message."),
        ("phone", ""),
        ("honeypot", ""),
    ]
}

/// Stub siteverify endpoint. Records every request body and answers with
/// the configured verdict after an optional delay.
pub struct SiteverifyStub {
    pub url: url::Url,
    pub requests: Arc<Mutex<Vec<String>>>,
}

impl SiteverifyStub {
    pub async fn spawn(verdict: bool, delay: Duration) -> Self {
        let requests = Arc::new(Mutex::new(Vec::new()));
        let recorded = Arc::clone(&requests);

        let app = Router::new().route(
            "/siteverify",
            post(move |body: String| {
                let recorded = Arc::clone(&recorded);
                async move {
                    recorded.lock().unwrap().push(body);
                    tokio::time::sleep(delay).await;
                    Json(json!({ "success": verdict }))
                }
            }),
        );

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            url: format!("http://{addr}/siteverify").parse().unwrap(),
            requests,
        }
    }

    pub fn verifier(&self, secret: &str, timeout: Duration) -> RecaptchaVerifier {
        RecaptchaVerifier::new(secret.into(), self.url.clone(), timeout).unwrap()
    }

    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }
}
