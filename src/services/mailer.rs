use std::sync::Arc;

use color_eyre::eyre::{Context, Result, eyre};
use reqwest::Client;
use serde::Serialize;
use url::Url;

use crate::config::{MailConfig, MailMode};
use crate::ports::mailer::Mailer;

/// Writes verification links to the log instead of sending mail.
pub struct LogMailer;

#[async_trait::async_trait]
impl Mailer for LogMailer {
    async fn send_verification(&self, to: &str, username: &str, link: &str) -> Result<()> {
        tracing::info!(to, username, link, "Verification email (not sent, log mailer)");
        Ok(())
    }
}

#[derive(Debug, Serialize)]
struct RelayMessage<'a> {
    from: &'a str,
    to: &'a str,
    subject: String,
    text: String,
}

/// Posts messages as JSON to a mail relay endpoint.
pub struct HttpMailer {
    client: Client,
    relay_url: Url,
    api_key: Option<String>,
    from: String,
}

impl HttpMailer {
    pub fn new(relay_url: Url, api_key: Option<String>, from: String) -> Self {
        Self {
            client: Client::new(),
            relay_url,
            api_key,
            from,
        }
    }
}

#[async_trait::async_trait]
impl Mailer for HttpMailer {
    async fn send_verification(&self, to: &str, username: &str, link: &str) -> Result<()> {
        let message = RelayMessage {
            from: &self.from,
            to,
            subject: "Verify your tunehub email".to_string(),
            text: format!(
                "Hi {username},\n\nConfirm your email address by opening this link:\n{link}\n"
            ),
        };

        let mut request = self.client.post(self.relay_url.clone()).json(&message);
        if let Some(api_key) = &self.api_key {
            request = request.bearer_auth(api_key);
        }

        let response = request
            .send()
            .await
            .wrap_err("Failed to reach mail relay")?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(eyre!("Mail relay returned {status}: {body}"));
        }

        tracing::debug!(to, "Verification email sent");
        Ok(())
    }
}

pub fn build_mailer(config: &MailConfig) -> Result<Arc<dyn Mailer>> {
    match config.mode {
        MailMode::Log => Ok(Arc::new(LogMailer)),
        MailMode::Http => {
            let relay_url = config
                .relay_url
                .as_deref()
                .ok_or(eyre!("mail.relay_url is required for the http mailer"))?;
            let relay_url = Url::parse(relay_url)
                .wrap_err(format!("Invalid mail.relay_url: {relay_url}"))?;
            Ok(Arc::new(HttpMailer::new(
                relay_url,
                config.api_key(),
                config.from.clone(),
            )))
        }
    }
}
