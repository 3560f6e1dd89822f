use crate::domain::submission::ContactSubmission;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Wire form for `POST /contact`. Every field defaults to empty; missing
/// fields are validation failures, not deserialization failures.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct ContactForm {
    pub name: String,
    pub email: String,
    pub subject: String,
    pub message: String,
    pub phone: String,
    pub consent: String,
    pub honeypot: String,
    pub captcha_token: String,
}

impl From<ContactForm> for ContactSubmission {
    fn from(form: ContactForm) -> Self {
        Self {
            name: form.name,
            email: form.email,
            subject: form.subject,
            message: form.message,
            phone: form.phone,
            consent: form.consent,
            honeypot: form.honeypot,
            captcha_token: form.captcha_token,
        }
    }
}

/// Wire response. `ok=true` implies `errors` is absent; `ok=false` with
/// errors means the failure is client-fixable; `ok=false` without errors
/// means a server-side failure.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SubmissionResponse {
    pub ok: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<BTreeMap<String, String>>,
}
