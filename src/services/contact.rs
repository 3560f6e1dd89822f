use crate::adapters::audit::AuditLog;
use crate::adapters::captcha::CaptchaVerifier;
use crate::adapters::mail::MailTransport;
use crate::config::ContactConfig;
use crate::domain::outbound::{DeliveryOutcome, OutboundMessage, render_body};
use crate::domain::submission::{ContactSubmission, sanitize_header, validate};
use crate::error::{AppError, Result};
use std::sync::Arc;

pub const SUCCESS_MESSAGE: &str = "Thanks! Your message has been sent.";
const CAPTCHA_ERROR: &str = "CAPTCHA validation failed.";

/// The submission pipeline. Stateless per invocation; safe to call
/// concurrently. The only shared mutable resource is the audit log file,
/// which serializes its own appends.
#[derive(Debug, Clone)]
pub struct ContactService {
    contact: Arc<ContactConfig>,
    transports: Arc<[Arc<dyn MailTransport>]>,
    captcha: Option<Arc<dyn CaptchaVerifier>>,
    audit: Option<AuditLog>,
}

impl ContactService {
    #[must_use]
    pub fn new(
        contact: ContactConfig,
        transports: Vec<Arc<dyn MailTransport>>,
        captcha: Option<Arc<dyn CaptchaVerifier>>,
        audit: Option<AuditLog>,
    ) -> Self {
        Self {
            contact: Arc::new(contact),
            transports: transports.into(),
            captcha,
            audit,
        }
    }

    /// Runs the full pipeline for one submission and returns the success
    /// message, or the error describing why it was rejected.
    ///
    /// # Errors
    /// `Spam` for a tripped honeypot, `Validation` for field or CAPTCHA
    /// failures, `Delivery` when every transport failed.
    #[tracing::instrument(skip_all, err(level = "debug"))]
    pub async fn submit(&self, submission: ContactSubmission) -> Result<&'static str> {
        if submission.honeypot_tripped() {
            return Err(AppError::Spam);
        }

        let mut errors = validate(&submission);

        // CAPTCHA failures join the same error map as field failures so
        // the client receives everything in one round trip.
        if let Some(verifier) = &self.captcha {
            let token = submission.captcha_token.trim();
            if token.is_empty() || !verifier.verify(token).await {
                errors.insert("captcha", CAPTCHA_ERROR);
            }
        }

        if !errors.is_empty() {
            return Err(AppError::Validation(errors));
        }

        let message = self.assemble(&submission);
        let outcome = self.deliver(&message).await;

        if let Some(audit) = &self.audit {
            audit
                .record(outcome.is_delivered(), &message.reply_to_email, outcome.diagnostic())
                .await;
        }

        match outcome {
            DeliveryOutcome::Delivered => Ok(SUCCESS_MESSAGE),
            DeliveryOutcome::Failed(diagnostic) => {
                tracing::error!(diagnostic = %diagnostic, "Failed to deliver contact message");
                Err(AppError::Delivery)
            }
        }
    }

    fn assemble(&self, submission: &ContactSubmission) -> OutboundMessage {
        OutboundMessage {
            recipient_email: self.contact.to_email.clone(),
            recipient_name: self.contact.to_name.clone(),
            sender_email: self.contact.from_email.clone(),
            sender_name: self.contact.from_name.clone(),
            reply_to_email: sanitize_header(submission.email.trim()),
            reply_to_name: sanitize_header(&submission.name),
            subject: sanitize_header(&submission.subject),
            body: render_body(submission),
        }
    }

    /// Tries each transport once, in rank order. No transport is retried;
    /// fallback is between transports, not repeated attempts on one.
    async fn deliver(&self, message: &OutboundMessage) -> DeliveryOutcome {
        let mut diagnostics = Vec::new();

        for transport in self.transports.iter() {
            match transport.send(message).await {
                Ok(()) => {
                    tracing::info!(transport = transport.name(), "Contact message delivered");
                    return DeliveryOutcome::Delivered;
                }
                Err(error) => {
                    tracing::warn!(transport = transport.name(), error = %error, "Mail transport failed");
                    diagnostics.push(format!("{}: {error:#}", transport.name()));
                }
            }
        }

        if diagnostics.is_empty() {
            diagnostics.push("no mail transport configured".to_owned());
        }
        DeliveryOutcome::Failed(diagnostics.join("; "))
    }
}
