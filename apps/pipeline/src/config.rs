use anyhow::{bail, Context, Result};
use chrono::Duration;

use crate::clients::affinda::DEFAULT_AFFINDA_URL;

/// Pipeline configuration loaded from environment variables.
/// Fails at startup if required variables are missing.
#[derive(Debug, Clone)]
pub struct Config {
    pub affinda_api_url: String,
    pub affinda_api_key: String,
    /// Service account key file contents (JSON).
    pub google_sheets_credentials: String,
    pub spreadsheet_id: String,
    pub sheet_range: String,
    pub notify_function_name: String,
    pub email_function_arn: String,
    pub email_delay_hours: i64,
    /// Validated `email_delay_hours`; always positive.
    pub email_delay: Duration,
    pub pipeline_status: String,
    pub webhook_url: String,
    pub webhook_candidate_email: String,
    pub smtp_server: String,
    pub smtp_port: u16,
    pub smtp_user: String,
    pub smtp_password: String,
    pub mail_from: String,
    pub upload_bucket: String,
    pub aws_region: String,
    /// Overrides the S3 endpoint (MinIO/localstack); AWS when unset.
    pub s3_endpoint: Option<String>,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from any variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let require = |key: &str| {
            lookup(key)
                .with_context(|| format!("Required environment variable '{key}' is not set"))
        };
        let or = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        let smtp_user = require("SMTP_USER")?;
        let email_delay_hours = or("EMAIL_DELAY_HOURS", "22")
            .parse::<i64>()
            .context("EMAIL_DELAY_HOURS must be a whole number of hours")?;
        let email_delay = parse_email_delay(email_delay_hours)?;

        Ok(Config {
            affinda_api_url: or("AFFINDA_API_URL", DEFAULT_AFFINDA_URL),
            affinda_api_key: require("AFFINDA_API_KEY")?,
            google_sheets_credentials: require("GOOGLE_SHEETS_CREDENTIALS")?,
            spreadsheet_id: require("SPREADSHEET_ID")?,
            sheet_range: or("SHEET_RANGE", "Sheet1"),
            notify_function_name: or("NOTIFY_FUNCTION_NAME", "send-webhook"),
            email_function_arn: require("EMAIL_FUNCTION_ARN")?,
            email_delay_hours,
            email_delay,
            pipeline_status: or("PIPELINE_STATUS", "prod"),
            webhook_url: require("WEBHOOK_URL")?,
            webhook_candidate_email: require("WEBHOOK_CANDIDATE_EMAIL")?,
            smtp_server: or("SMTP_SERVER", "smtp.gmail.com"),
            smtp_port: or("SMTP_PORT", "465")
                .parse::<u16>()
                .context("SMTP_PORT must be a valid port number")?,
            mail_from: lookup("MAIL_FROM").unwrap_or_else(|| smtp_user.clone()),
            smtp_user,
            smtp_password: require("SMTP_PASSWORD")?,
            upload_bucket: require("UPLOAD_BUCKET")?,
            aws_region: or("AWS_REGION", "eu-north-1"),
            s3_endpoint: lookup("S3_ENDPOINT"),
            port: or("PORT", "8080")
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: or("RUST_LOG", "info"),
        })
    }
}

/// A schedule in the past is accepted by EventBridge but never fires.
fn parse_email_delay(hours: i64) -> Result<Duration> {
    if hours <= 0 {
        bail!("EMAIL_DELAY_HOURS must be positive, got {hours}");
    }
    Duration::try_hours(hours)
        .with_context(|| format!("EMAIL_DELAY_HOURS={hours} is out of range"))
}
