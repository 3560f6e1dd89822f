use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use url::Url;

/// Verdict source for CAPTCHA assertion tokens. Implementations must map
/// every failure mode (network, timeout, malformed body) to `false`; the
/// pipeline never distinguishes why a token did not verify.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CaptchaVerifier: Send + Sync + std::fmt::Debug {
    async fn verify(&self, token: &str) -> bool;
}

#[derive(Serialize)]
struct SiteverifyRequest<'a> {
    secret: &'a str,
    response: &'a str,
}

#[derive(Deserialize)]
struct SiteverifyResponse {
    success: bool,
}

/// reCAPTCHA siteverify client. The endpoint is overridable so tests can
/// point it at a stub server.
#[derive(Debug, Clone)]
pub struct RecaptchaVerifier {
    client: reqwest::Client,
    endpoint: Url,
    secret: String,
}

impl RecaptchaVerifier {
    /// # Errors
    /// Fails only when the underlying HTTP client cannot be constructed.
    pub fn new(secret: String, endpoint: Url, timeout: Duration) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { client, endpoint, secret })
    }
}

#[async_trait]
impl CaptchaVerifier for RecaptchaVerifier {
    async fn verify(&self, token: &str) -> bool {
        let request = SiteverifyRequest {
            secret: &self.secret,
            response: token,
        };

        let result = async {
            self.client
                .post(self.endpoint.clone())
                .form(&request)
                .send()
                .await?
                .error_for_status()?
                .json::<SiteverifyResponse>()
                .await
        }
        .await;

        match result {
            Ok(response) => response.success,
            Err(error) => {
                tracing::warn!(error = %error, "CAPTCHA verification call failed");
                false
            }
        }
    }
}
