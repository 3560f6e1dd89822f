use crate::config::MailConfig;
use crate::domain::outbound::OutboundMessage;
use anyhow::{Context, ensure};
use async_trait::async_trait;
use lettre::message::{Mailbox, header};
use lettre::{Address, AsyncSendmailTransport, AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use std::sync::Arc;

/// One way of getting a message out the door. Transports are ranked; the
/// submission pipeline tries each at most once, in order.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MailTransport: Send + Sync + std::fmt::Debug {
    fn name(&self) -> &'static str;

    /// Attempts exactly one transmission of the message.
    ///
    /// # Errors
    /// Returns the transport's diagnostic on failure; callers treat it as
    /// audit-only detail.
    async fn send(&self, message: &OutboundMessage) -> anyhow::Result<()>;
}

/// Builds the ranked transport list from configuration: SMTP relay first
/// when configured, local sendmail as the minimal fallback.
pub fn build_transports(config: &MailConfig) -> anyhow::Result<Vec<Arc<dyn MailTransport>>> {
    let mut transports: Vec<Arc<dyn MailTransport>> = Vec::new();

    if let Some(url) = &config.smtp_url {
        transports.push(Arc::new(SmtpMailer::from_url(url)?));
    }
    if config.sendmail {
        transports.push(Arc::new(SendmailMailer::new()));
    }

    ensure!(!transports.is_empty(), "no mail transport configured; set POSTBOX_SMTP_URL or enable sendmail");
    Ok(transports)
}

fn to_lettre(message: &OutboundMessage) -> anyhow::Result<Message> {
    let recipient = Mailbox::new(
        Some(message.recipient_name.clone()),
        message.recipient_email.parse::<Address>().context("invalid recipient address")?,
    );
    let sender = Mailbox::new(
        Some(message.sender_name.clone()),
        message.sender_email.parse::<Address>().context("invalid sender address")?,
    );
    let reply_to = Mailbox::new(
        Some(message.reply_to_name.clone()),
        message.reply_to_email.parse::<Address>().context("invalid reply-to address")?,
    );

    Message::builder()
        .from(sender)
        .to(recipient)
        .reply_to(reply_to)
        .subject(message.subject.clone())
        .header(header::ContentType::TEXT_PLAIN)
        .body(message.body.clone())
        .context("failed to assemble message")
}

/// Full-featured transport: an SMTP relay driven by lettre.
#[derive(Debug, Clone)]
pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
}

impl SmtpMailer {
    /// # Errors
    /// Fails when the URL is not a valid SMTP connection string.
    pub fn from_url(url: &str) -> anyhow::Result<Self> {
        let transport = AsyncSmtpTransport::<Tokio1Executor>::from_url(url)
            .context("invalid SMTP URL")?
            .build();
        Ok(Self { transport })
    }
}

#[async_trait]
impl MailTransport for SmtpMailer {
    fn name(&self) -> &'static str {
        "smtp"
    }

    async fn send(&self, message: &OutboundMessage) -> anyhow::Result<()> {
        let response = self.transport.send(to_lettre(message)?).await?;
        ensure!(response.is_positive(), "SMTP server rejected the message: {}", response.code());
        Ok(())
    }
}

/// Minimal fallback transport: hand the message to the local sendmail
/// binary, like the classic `mail()` call.
#[derive(Debug)]
pub struct SendmailMailer {
    transport: AsyncSendmailTransport<Tokio1Executor>,
}

impl SendmailMailer {
    #[must_use]
    pub fn new() -> Self {
        Self {
            transport: AsyncSendmailTransport::new(),
        }
    }
}

impl Default for SendmailMailer {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MailTransport for SendmailMailer {
    fn name(&self) -> &'static str {
        "sendmail"
    }

    async fn send(&self, message: &OutboundMessage) -> anyhow::Result<()> {
        self.transport.send(to_lettre(message)?).await?;
        Ok(())
    }
}
