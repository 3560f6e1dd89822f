use crate::domain::submission::{ContactSubmission, sanitize_header};

/// A fully assembled mail, ready to hand to any transport. Header-bound
/// fields (subject, reply-to, display names) are already sanitized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundMessage {
    pub recipient_email: String,
    pub recipient_name: String,
    pub sender_email: String,
    pub sender_name: String,
    pub reply_to_email: String,
    pub reply_to_name: String,
    pub subject: String,
    pub body: String,
}

/// Result of a single delivery attempt. The diagnostic is for the audit
/// log only and must never reach the client verbatim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeliveryOutcome {
    Delivered,
    Failed(String),
}

impl DeliveryOutcome {
    #[must_use]
    pub const fn is_delivered(&self) -> bool {
        matches!(self, Self::Delivered)
    }

    #[must_use]
    pub fn diagnostic(&self) -> &str {
        match self {
            Self::Delivered => "",
            Self::Failed(diagnostic) => diagnostic,
        }
    }
}

/// Renders the plain-text body. The message itself stays verbatim; it is
/// body content, not a header.
#[must_use]
pub fn render_body(submission: &ContactSubmission) -> String {
    let phone = if submission.phone.is_empty() {
        "Not provided"
    } else {
        &submission.phone
    };
    let consent = if submission.consent_given() { "Yes" } else { "No" };

    [
        "New contact form submission:".to_owned(),
        format!("Name: {}", submission.name),
        format!("Email: {}", sanitize_header(&submission.email)),
        format!("Phone: {phone}"),
        format!("Consent: {consent}"),
        "---".to_owned(),
        submission.message.clone(),
    ]
    .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn body_labels_every_field() {
        let submission = ContactSubmission {
            name: "Jane Doe".into(),
            email: "jane@example.com".into(),
            subject: "Hello".into(),
            message: "This is a ten-plus character message.".into(),
            phone: "+1 555 0100".into(),
            consent: "yes".into(),
            ..ContactSubmission::default()
        };

        let body = render_body(&submission);
        assert_eq!(
            body,
            "New contact form submission:\n\
             Name: Jane Doe\n\
             Email: jane@example.com\n\
             Phone: +1 555 0100\n\
             Consent: Yes\n\
             ---\n\
             This is a ten-plus character message."
        );
    }

    #[test]
    fn missing_phone_and_consent_render_placeholders() {
        let submission = ContactSubmission {
            name: "Jane Doe".into(),
            email: "jane@example.com".into(),
            message: "A long enough message.".into(),
            ..ContactSubmission::default()
        };

        let body = render_body(&submission);
        assert!(body.contains("Phone: Not provided"));
        assert!(body.contains("Consent: No"));
    }

    #[test]
    fn crlf_in_email_cannot_reach_the_body_header_block() {
        let submission = ContactSubmission {
            email: "jane@example.com\r\nBcc: evil@x.com".into(),
            ..ContactSubmission::default()
        };

        let body = render_body(&submission);
        assert!(body.contains("Email: jane@example.com Bcc: evil@x.com"));
    }
}
