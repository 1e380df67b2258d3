use std::time::Duration;

use async_trait::async_trait;

use super::Notifier;
use crate::errors::NotifyError;
use crate::models::reply::SlackReply;

/// Posts outcome messages to Slack `response_url`s.
///
/// One attempt per message. A failed delivery is reported to the caller
/// and not retried: Slack response URLs are short-lived and the slash
/// command has already been acknowledged.
#[derive(Clone)]
pub struct SlackResponder {
    client: reqwest::Client,
}

impl SlackResponder {
    pub fn new(request_timeout: Duration) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(request_timeout)
            .user_agent(concat!("gate-relay/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { client })
    }

    async fn post(&self, address: &str, body: &SlackReply) -> Result<(), NotifyError> {
        let url = parse_callback(address)?;

        let resp = self.client.post(url).json(body).send().await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(NotifyError::Rejected { status, body });
        }

        tracing::info!(url = address, %status, "replied to slack");
        Ok(())
    }
}

#[async_trait]
impl Notifier for SlackResponder {
    async fn notify(&self, address: &str, body: &SlackReply) -> Result<(), NotifyError> {
        self.post(address, body).await
    }
}

/// Only absolute http(s) URLs are accepted as callback addresses.
fn parse_callback(address: &str) -> Result<url::Url, NotifyError> {
    match url::Url::parse(address) {
        Ok(url) if matches!(url.scheme(), "http" | "https") => Ok(url),
        _ => Err(NotifyError::InvalidAddress(address.to_string())),
    }
}
