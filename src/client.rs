//! Client-side gate for the contact form. Mirrors the server's validation
//! rules for instant feedback, guards against re-entrant submits, and maps
//! the server's response onto form events. The mirror is advisory only;
//! the server re-validates everything.

use crate::api::schemas::contact::SubmissionResponse;
use crate::domain::submission::{ContactSubmission, validate, validate_field};
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use url::Url;

pub use crate::domain::submission::FormField;

/// Action name bound into every CAPTCHA token request.
pub const CAPTCHA_ACTION: &str = "contact_submit";

const FAILURE_MESSAGE: &str = "Could not send your message. Please try again later.";

/// Supplies a fresh CAPTCHA assertion token right before sending. When no
/// provider is configured (or it fails), the form is sent without a token
/// and the server decides whether one was required.
#[async_trait]
pub trait TokenProvider: Send + Sync + std::fmt::Debug {
    async fn acquire(&self, action: &str) -> anyhow::Result<String>;
}

/// Observable submission phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitState {
    Idle,
    Validating,
    Submitting,
}

/// Terminal result of one submit action, telling the embedder what to do
/// with the form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// A submission was already in flight; this one was dropped.
    Ignored,
    /// The local validation mirror failed; nothing was sent.
    Invalid(BTreeMap<String, String>),
    /// Delivered. Clear the form and every field annotation.
    Success { message: String },
    /// The server rejected named fields. Annotate each and show the
    /// generic review message.
    Rejected {
        message: String,
        errors: BTreeMap<String, String>,
    },
    /// Network error, non-JSON body, or a server-side failure.
    Failed { message: String },
}

/// What the visitor typed. Consent is a checkbox, everything else text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormFields {
    pub name: String,
    pub email: String,
    pub subject: String,
    pub message: String,
    pub phone: String,
    pub consent: bool,
}

impl FormFields {
    fn to_submission(&self) -> ContactSubmission {
        ContactSubmission {
            name: self.name.clone(),
            email: self.email.clone(),
            subject: self.subject.clone(),
            message: self.message.clone(),
            phone: self.phone.clone(),
            consent: if self.consent { "yes".into() } else { String::new() },
            ..ContactSubmission::default()
        }
    }
}

/// Field-level UI event. On blur a field is always revalidated; on input
/// only if it is already marked invalid, so the visitor is not shouted at
/// while still typing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldEvent {
    Blur,
    Input,
}

#[must_use]
pub const fn should_revalidate(event: FieldEvent, currently_invalid: bool) -> bool {
    match event {
        FieldEvent::Blur => true,
        FieldEvent::Input => currently_invalid,
    }
}

/// Validates a single field with the exact server rule, for blur/input
/// handlers.
#[must_use]
pub fn field_error(field: FormField, value: &str) -> Option<&'static str> {
    validate_field(field, value)
}

#[derive(Debug)]
pub struct ContactFormClient {
    endpoint: Url,
    http: reqwest::Client,
    token_provider: Option<Arc<dyn TokenProvider>>,
    state: Mutex<SubmitState>,
    in_flight: AtomicBool,
}

impl ContactFormClient {
    #[must_use]
    pub fn new(endpoint: Url) -> Self {
        Self {
            endpoint,
            http: reqwest::Client::new(),
            token_provider: None,
            state: Mutex::new(SubmitState::Idle),
            in_flight: AtomicBool::new(false),
        }
    }

    #[must_use]
    pub fn with_token_provider(mut self, provider: Arc<dyn TokenProvider>) -> Self {
        self.token_provider = Some(provider);
        self
    }

    #[must_use]
    pub fn state(&self) -> SubmitState {
        self.state.lock().map_or(SubmitState::Idle, |state| *state)
    }

    /// Runs one submit action to a terminal outcome. A second call while a
    /// submission is in flight returns [`SubmitOutcome::Ignored`] without
    /// queueing or cancelling anything.
    pub async fn submit(&self, fields: &FormFields) -> SubmitOutcome {
        // Guard goes up before the first await and comes down only on the
        // terminal branches below.
        if self.in_flight.swap(true, Ordering::AcqRel) {
            return SubmitOutcome::Ignored;
        }

        let outcome = self.run(fields).await;

        self.set_state(SubmitState::Idle);
        self.in_flight.store(false, Ordering::Release);
        outcome
    }

    async fn run(&self, fields: &FormFields) -> SubmitOutcome {
        self.set_state(SubmitState::Validating);

        // Fail fast without a round trip when the page cannot possibly be
        // served confidentially; the server enforces the same rule.
        if !self.endpoint_is_confidential() {
            tracing::warn!(endpoint = %self.endpoint, "Refusing to submit over an insecure endpoint");
            return SubmitOutcome::Failed {
                message: FAILURE_MESSAGE.to_owned(),
            };
        }

        let submission = fields.to_submission();
        let errors = validate(&submission);
        if !errors.is_empty() {
            return SubmitOutcome::Invalid(
                errors.iter().map(|(k, v)| ((*k).to_owned(), (*v).to_owned())).collect(),
            );
        }

        self.set_state(SubmitState::Submitting);

        let token = match &self.token_provider {
            Some(provider) => match provider.acquire(CAPTCHA_ACTION).await {
                Ok(token) => token,
                Err(error) => {
                    tracing::warn!(error = %error, "Token provider unavailable, sending without a token");
                    String::new()
                }
            },
            None => String::new(),
        };

        let params = [
            ("name", submission.name.as_str()),
            ("email", submission.email.as_str()),
            ("subject", submission.subject.as_str()),
            ("message", submission.message.as_str()),
            ("phone", submission.phone.as_str()),
            ("consent", submission.consent.as_str()),
            ("honeypot", ""),
            ("captchaToken", token.as_str()),
        ];

        let response = match self.http.post(self.endpoint.clone()).form(&params).send().await {
            Ok(response) => response,
            Err(error) => {
                tracing::warn!(error = %error, "Contact submission request failed");
                return SubmitOutcome::Failed {
                    message: FAILURE_MESSAGE.to_owned(),
                };
            }
        };

        match response.json::<SubmissionResponse>().await {
            Ok(body) if body.ok => SubmitOutcome::Success { message: body.message },
            Ok(body) => match body.errors {
                Some(errors) if !errors.is_empty() => SubmitOutcome::Rejected {
                    message: body.message,
                    errors,
                },
                _ => SubmitOutcome::Failed { message: body.message },
            },
            Err(error) => {
                tracing::warn!(error = %error, "Contact submission returned an unreadable body");
                SubmitOutcome::Failed {
                    message: FAILURE_MESSAGE.to_owned(),
                }
            }
        }
    }

    fn endpoint_is_confidential(&self) -> bool {
        if self.endpoint.scheme() == "https" {
            return true;
        }
        matches!(self.endpoint.host_str(), Some(host) if host == "localhost" || host == "127.0.0.1")
    }

    fn set_state(&self, state: SubmitState) {
        if let Ok(mut guard) = self.state.lock() {
            *guard = state;
        }
    }
}
