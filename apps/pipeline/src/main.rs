mod clients;
mod config;
mod email;
mod errors;
mod intake;
mod models;
mod notify;
mod routes;
mod state;
mod uploads;

#[cfg(test)]
mod test_support;

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use aws_config::{BehaviorVersion, Region, SdkConfig};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::clients::affinda::AffindaClient;
use crate::clients::eventbridge::EventBridgeScheduler;
use crate::clients::lambda::LambdaInvoker;
use crate::clients::s3::S3ObjectStore;
use crate::clients::sheets::{GoogleSheetsClient, ServiceAccount};
use crate::clients::smtp::SmtpMailer;
use crate::clients::webhook::HttpWebhook;
use crate::config::Config;
use crate::routes::build_router;
use crate::state::{AppState, Services};

const HTTP_TIMEOUT: Duration = Duration::from_secs(120);

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("cv_pipeline={}", &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting CV pipeline v{}", env!("CARGO_PKG_VERSION"));

    let aws = aws_config::defaults(BehaviorVersion::latest())
        .region(Region::new(config.aws_region.clone()))
        .load()
        .await;
    info!("AWS config loaded (region: {})", config.aws_region);

    let services = build_services(&config, &aws)?;
    info!(
        "Services initialized (notify: {}, email delay: {}h)",
        config.notify_function_name, config.email_delay_hours
    );

    let state = AppState {
        services,
        config: config.clone(),
    };

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Constructs every external service handle once for the process.
fn build_services(config: &Config, aws: &SdkConfig) -> Result<Services> {
    let http = reqwest::Client::builder().timeout(HTTP_TIMEOUT).build()?;

    let account = ServiceAccount::from_json(&config.google_sheets_credentials)?;
    info!("Spreadsheet service account: {}", account.client_email);

    let mailer = SmtpMailer::new(
        config.smtp_server.clone(),
        config.smtp_port,
        config.smtp_user.clone(),
        config.smtp_password.clone(),
        &config.mail_from,
    )?;

    Ok(Services {
        store: Arc::new(S3ObjectStore::new(build_s3_client(config, aws))),
        parser: Arc::new(AffindaClient::new(
            http.clone(),
            config.affinda_api_url.clone(),
            config.affinda_api_key.clone(),
        )),
        sheet: Arc::new(GoogleSheetsClient::new(
            http.clone(),
            account,
            config.spreadsheet_id.clone(),
            config.sheet_range.clone(),
        )),
        invoker: Arc::new(LambdaInvoker::new(aws_sdk_lambda::Client::new(aws))),
        scheduler: Arc::new(EventBridgeScheduler::new(aws_sdk_eventbridge::Client::new(
            aws,
        ))),
        webhook: Arc::new(HttpWebhook::new(
            http,
            config.webhook_url.clone(),
            config.webhook_candidate_email.clone(),
        )),
        mailer: Arc::new(mailer),
    })
}

/// S3 client for AWS, or for an S3-compatible endpoint (MinIO) when configured.
fn build_s3_client(config: &Config, aws: &SdkConfig) -> aws_sdk_s3::Client {
    match &config.s3_endpoint {
        Some(endpoint) => {
            let s3_config = aws_sdk_s3::config::Builder::from(aws)
                .endpoint_url(endpoint)
                .force_path_style(true)
                .build();
            aws_sdk_s3::Client::from_conf(s3_config)
        }
        None => aws_sdk_s3::Client::new(aws),
    }
}
