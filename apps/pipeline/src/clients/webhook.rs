use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use thiserror::Error;
use tracing::debug;

use super::{WebhookResponse, WebhookSender};

pub const CANDIDATE_EMAIL_HEADER: &str = "X-Candidate-Email";

#[derive(Debug, Error)]
pub enum WebhookError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("malformed notify payload: {0}")]
    Payload(String),
}

/// POSTs JSON to the configured webhook with the identifying header attached.
#[derive(Clone)]
pub struct HttpWebhook {
    client: Client,
    url: String,
    candidate_email: String,
}

impl HttpWebhook {
    pub fn new(client: Client, url: String, candidate_email: String) -> Self {
        Self {
            client,
            url,
            candidate_email,
        }
    }
}

#[async_trait]
impl WebhookSender for HttpWebhook {
    async fn post(&self, payload: &Value) -> Result<WebhookResponse, WebhookError> {
        let response = self
            .client
            .post(&self.url)
            .header(CANDIDATE_EMAIL_HEADER, &self.candidate_email)
            .json(payload)
            .send()
            .await?;

        let status = response.status().as_u16();
        let body = response.text().await?;
        debug!("Webhook responded {status}: {body}");
        Ok(WebhookResponse { status, body })
    }
}
