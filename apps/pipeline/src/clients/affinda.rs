/// Resume parser client — uploads the CV file to the Affinda resumes endpoint
/// and returns the structured document untouched.
///
/// No retries: any non-200 answer fails the whole intake invocation.
use async_trait::async_trait;
use bytes::Bytes;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, StatusCode};
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, warn};

use super::ResumeParser;

pub const DEFAULT_AFFINDA_URL: &str = "https://api.affinda.com/v1/resumes";

#[derive(Debug, Error)]
pub enum ParserError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("parser returned status {status}: {message}")]
    Api { status: u16, message: String },

    #[error("parser returned invalid JSON: {0}")]
    Parse(#[from] serde_json::Error),
}

#[derive(Clone)]
pub struct AffindaClient {
    client: Client,
    api_url: String,
    api_key: String,
}

impl AffindaClient {
    pub fn new(client: Client, api_url: String, api_key: String) -> Self {
        Self {
            client,
            api_url,
            api_key,
        }
    }
}

#[async_trait]
impl ResumeParser for AffindaClient {
    async fn parse(&self, file_name: &str, contents: Bytes) -> Result<Value, ParserError> {
        let part = Part::stream(contents).file_name(file_name.to_string());
        let form = Form::new().part("file", part);

        let response = self
            .client
            .post(&self.api_url)
            .bearer_auth(&self.api_key)
            .multipart(form)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if status != StatusCode::OK {
            warn!("Resume parser returned {status}: {body}");
            return Err(ParserError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        debug!("Resume parser returned {} bytes for {file_name}", body.len());
        Ok(serde_json::from_str(&body)?)
    }
}
