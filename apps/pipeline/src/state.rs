use std::sync::Arc;

use crate::clients::{
    EmailScheduler, FunctionInvoker, Mailer, ObjectStore, ResumeParser, SpreadsheetSink,
    WebhookSender,
};
use crate::config::Config;

/// External service handles, built once in `main` and injected into handlers.
#[derive(Clone)]
pub struct Services {
    pub store: Arc<dyn ObjectStore>,
    pub parser: Arc<dyn ResumeParser>,
    pub sheet: Arc<dyn SpreadsheetSink>,
    pub invoker: Arc<dyn FunctionInvoker>,
    pub scheduler: Arc<dyn EmailScheduler>,
    pub webhook: Arc<dyn WebhookSender>,
    pub mailer: Arc<dyn Mailer>,
}

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub services: Services,
    pub config: Config,
}
