//! Google Sheets append client authorised with a service account.
//!
//! Every append mints a fresh OAuth token from a signed JWT; nothing is cached
//! between invocations.

use async_trait::async_trait;
use chrono::Utc;
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use reqwest::{Client, Url};
use serde::{Deserialize, Serialize};
use serde_json::json;
use thiserror::Error;
use tracing::debug;

use super::SpreadsheetSink;

const SHEETS_API_BASE: &str = "https://sheets.googleapis.com";
const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";
const SCOPES: &str =
    "https://www.googleapis.com/auth/spreadsheets https://www.googleapis.com/auth/drive";
const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";
const TOKEN_LIFETIME_SECS: i64 = 3600;

#[derive(Debug, Error)]
pub enum SheetsError {
    #[error("invalid service account credentials: {0}")]
    Credentials(String),

    #[error("failed to sign token request: {0}")]
    Signing(#[from] jsonwebtoken::errors::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("token exchange failed (status {status}): {message}")]
    Auth { status: u16, message: String },

    #[error("append failed (status {status}): {message}")]
    Api { status: u16, message: String },
}

/// Subset of the service account key file the token exchange needs.
#[derive(Debug, Clone, Deserialize)]
pub struct ServiceAccount {
    pub client_email: String,
    pub private_key: String,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
}

fn default_token_uri() -> String {
    DEFAULT_TOKEN_URI.to_string()
}

impl ServiceAccount {
    pub fn from_json(raw: &str) -> Result<Self, SheetsError> {
        serde_json::from_str(raw).map_err(|e| SheetsError::Credentials(e.to_string()))
    }
}

#[derive(Debug, Serialize)]
struct Claims<'a> {
    iss: &'a str,
    scope: &'a str,
    aud: &'a str,
    iat: i64,
    exp: i64,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

#[derive(Clone)]
pub struct GoogleSheetsClient {
    client: Client,
    account: ServiceAccount,
    spreadsheet_id: String,
    range: String,
}

impl GoogleSheetsClient {
    pub fn new(
        client: Client,
        account: ServiceAccount,
        spreadsheet_id: String,
        range: String,
    ) -> Self {
        Self {
            client,
            account,
            spreadsheet_id,
            range,
        }
    }

    async fn access_token(&self) -> Result<String, SheetsError> {
        let now = Utc::now().timestamp();
        let claims = Claims {
            iss: &self.account.client_email,
            scope: SCOPES,
            aud: &self.account.token_uri,
            iat: now,
            exp: now + TOKEN_LIFETIME_SECS,
        };
        let key = EncodingKey::from_rsa_pem(self.account.private_key.as_bytes())?;
        let assertion = jsonwebtoken::encode(&Header::new(Algorithm::RS256), &claims, &key)?;

        let response = self
            .client
            .post(&self.account.token_uri)
            .form(&[("grant_type", JWT_BEARER_GRANT), ("assertion", assertion.as_str())])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(SheetsError::Auth {
                status: status.as_u16(),
                message: response.text().await.unwrap_or_default(),
            });
        }
        Ok(response.json::<TokenResponse>().await?.access_token)
    }
}

/// `.../v4/spreadsheets/{id}/values/{range}:append?valueInputOption=RAW&insertDataOption=INSERT_ROWS`
fn append_url(spreadsheet_id: &str, range: &str) -> Result<Url, SheetsError> {
    let mut url =
        Url::parse(SHEETS_API_BASE).map_err(|e| SheetsError::Credentials(e.to_string()))?;
    url.path_segments_mut()
        .map_err(|_| SheetsError::Credentials("sheets base URL cannot be a base".to_string()))?
        .extend(["v4", "spreadsheets", spreadsheet_id, "values"])
        .push(&format!("{range}:append"));
    url.query_pairs_mut()
        .append_pair("valueInputOption", "RAW")
        .append_pair("insertDataOption", "INSERT_ROWS");
    Ok(url)
}

#[async_trait]
impl SpreadsheetSink for GoogleSheetsClient {
    async fn append_row(&self, row: Vec<String>) -> Result<(), SheetsError> {
        let token = self.access_token().await?;
        let url = append_url(&self.spreadsheet_id, &self.range)?;

        let response = self
            .client
            .post(url)
            .bearer_auth(token)
            .json(&json!({ "values": [row] }))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(SheetsError::Api {
                status: status.as_u16(),
                message: response.text().await.unwrap_or_default(),
            });
        }
        debug!("Appended row to spreadsheet {}", self.spreadsheet_id);
        Ok(())
    }
}
