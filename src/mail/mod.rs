//! Outbound mail
//!
//! Delivery is best-effort: callers log failures and move on.

use crate::config::MailConfig;
use crate::notifications::Notification;
use async_trait::async_trait;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

/// Sender identity shown in the From header
#[derive(Debug, Clone, Serialize)]
pub struct Sender {
    pub email: String,
    pub name: String,
}

/// One message to deliver
#[derive(Debug, Clone, Serialize)]
pub struct OutgoingMail {
    pub to: String,
    pub subject: String,
    pub html: String,
    pub from: Sender,
    pub reply_to: String,
}

impl OutgoingMail {
    pub fn new(to: &str, notification: Notification, config: &MailConfig) -> Self {
        Self {
            to: to.to_string(),
            subject: notification.subject,
            html: notification.html,
            from: Sender {
                email: config.from_email.clone(),
                name: config.from_name.clone(),
            },
            reply_to: config.from_email.clone(),
        }
    }
}

#[derive(Debug, Error)]
pub enum MailError {
    #[error("mail relay request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("mail relay rejected message with status {0}")]
    Rejected(u16),
}

#[async_trait]
pub trait MailSender: Send + Sync {
    async fn send(&self, mail: &OutgoingMail) -> Result<(), MailError>;
}

pub type DynMailSender = Arc<dyn MailSender>;

/// Writes mails to the application log instead of delivering them.
/// Used when no relay is configured.
#[derive(Clone, Default)]
pub struct LogMailSender;

#[async_trait]
impl MailSender for LogMailSender {
    async fn send(&self, mail: &OutgoingMail) -> Result<(), MailError> {
        tracing::info!(
            to = %mail.to,
            subject = %mail.subject,
            bytes = mail.html.len(),
            "Mail relay not configured, mail logged only"
        );
        Ok(())
    }
}

/// Posts mails as JSON to an HTTP mail relay
#[derive(Clone)]
pub struct HttpMailSender {
    client: reqwest::Client,
    url: String,
    token: Option<String>,
}

impl HttpMailSender {
    pub fn new(url: String, token: Option<String>) -> Result<Self, MailError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()?;
        Ok(Self { client, url, token })
    }
}

#[async_trait]
impl MailSender for HttpMailSender {
    async fn send(&self, mail: &OutgoingMail) -> Result<(), MailError> {
        let mut request = self.client.post(&self.url).json(mail);
        if let Some(ref token) = self.token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        if !response.status().is_success() {
            return Err(MailError::Rejected(response.status().as_u16()));
        }
        Ok(())
    }
}

/// Build the mail sender from config: HTTP relay when configured, log-only otherwise.
pub fn mail_sender_from_config(config: &MailConfig) -> Result<DynMailSender, MailError> {
    match config.relay_url {
        Some(ref url) => {
            tracing::info!("Mail relay: {}", url);
            Ok(Arc::new(HttpMailSender::new(
                url.clone(),
                config.relay_token.clone(),
            )?))
        }
        None => {
            tracing::warn!("MAIL_RELAY_URL not set, notifications will only be logged");
            Ok(Arc::new(LogMailSender))
        }
    }
}
