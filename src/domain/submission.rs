use email_address::EmailAddress;
use regex::Regex;
use std::collections::BTreeMap;
use std::sync::LazyLock;

/// One error message per offending field. `BTreeMap` keeps iteration
/// deterministic so repeated validation of the same input produces
/// identical output.
pub type FieldErrors = BTreeMap<&'static str, &'static str>;

/// A contact form submission as received over the wire. Every field is
/// untrusted until it passes the corresponding validation rule.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ContactSubmission {
    pub name: String,
    pub email: String,
    pub subject: String,
    pub message: String,
    pub phone: String,
    pub consent: String,
    pub honeypot: String,
    pub captcha_token: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormField {
    Name,
    Email,
    Subject,
    Message,
    Phone,
}

impl FormField {
    pub const ALL: [Self; 5] = [Self::Name, Self::Email, Self::Subject, Self::Message, Self::Phone];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::Email => "email",
            Self::Subject => "subject",
            Self::Message => "message",
            Self::Phone => "phone",
        }
    }
}

/// Digits plus common separators, 7 to 20 characters.
static PHONE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[0-9\s\-+().]{7,20}$").expect("phone pattern is valid")
});

static HEADER_BREAK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[\r\n]+").expect("header break pattern is valid"));

/// Validates a single field, returning the user-facing message on failure.
///
/// The client gate runs this per field on blur; the service runs it for
/// every field via [`validate`]. Both sides therefore enforce the exact
/// same rules.
#[must_use]
pub fn validate_field(field: FormField, value: &str) -> Option<&'static str> {
    match field {
        FormField::Name => {
            (value.trim().chars().count() < 3).then_some("Please enter your full name.")
        }
        FormField::Email => value
            .parse::<EmailAddress>()
            .is_err()
            .then_some("Please enter a valid email address."),
        FormField::Subject => {
            (value.trim().chars().count() < 3).then_some("Please enter a subject.")
        }
        FormField::Message => {
            (value.trim().chars().count() < 10).then_some("Please write at least 10 characters.")
        }
        FormField::Phone => (!value.is_empty() && !PHONE_PATTERN.is_match(value))
            .then_some("Please enter a valid phone number."),
    }
}

/// Runs every field rule and accumulates failures. Rules are independent;
/// no rule short-circuits another, so the caller sees every problem at once.
#[must_use]
pub fn validate(submission: &ContactSubmission) -> FieldErrors {
    let mut errors = FieldErrors::new();
    for field in FormField::ALL {
        let value = match field {
            FormField::Name => &submission.name,
            FormField::Email => &submission.email,
            FormField::Subject => &submission.subject,
            FormField::Message => &submission.message,
            FormField::Phone => &submission.phone,
        };
        if let Some(message) = validate_field(field, value) {
            errors.insert(field.as_str(), message);
        }
    }
    errors
}

impl ContactSubmission {
    /// The honeypot field is invisible to humans; any non-whitespace
    /// content is a bot signal.
    #[must_use]
    pub fn honeypot_tripped(&self) -> bool {
        !self.honeypot.trim().is_empty()
    }

    /// Checkbox-style truthy values. HTML checkboxes submit "on" by
    /// default, explicit forms often send "yes".
    #[must_use]
    pub fn consent_given(&self) -> bool {
        ["yes", "on", "true", "1"]
            .iter()
            .any(|v| self.consent.eq_ignore_ascii_case(v))
    }
}

/// Collapses CR/LF runs to a single space so a value can never smuggle
/// extra headers into the outbound message.
#[must_use]
pub fn sanitize_header(value: &str) -> String {
    HEADER_BREAK.replace_all(value, " ").into_owned()
}
