//! Seams to the external services the pipeline talks to.
//!
//! Handlers only see these traits; `main` wires the real clients and tests
//! substitute in-memory fakes.

use std::collections::HashMap;

use async_trait::async_trait;
use bytes::Bytes;
use serde_json::Value;

use crate::intake::schedule::ScheduleEntry;
use crate::models::events::InvocationEvent;

pub mod affinda;
pub mod eventbridge;
pub mod lambda;
pub mod s3;
pub mod sheets;
pub mod smtp;
pub mod webhook;

pub use affinda::ParserError;
pub use eventbridge::SchedulerError;
pub use lambda::InvokeError;
pub use s3::StorageError;
pub use sheets::SheetsError;
pub use smtp::MailError;
pub use webhook::WebhookError;

/// Object body plus its user metadata tags.
#[derive(Debug, Clone, Default)]
pub struct StoredObject {
    pub body: Bytes,
    pub metadata: HashMap<String, String>,
}

#[async_trait]
pub trait ObjectStore: Send + Sync {
    async fn fetch(&self, bucket: &str, key: &str) -> Result<StoredObject, StorageError>;

    async fn put(
        &self,
        bucket: &str,
        key: &str,
        body: Bytes,
        content_type: Option<String>,
        metadata: HashMap<String, String>,
    ) -> Result<(), StorageError>;
}

#[async_trait]
pub trait ResumeParser: Send + Sync {
    /// Returns the parser's raw JSON document.
    async fn parse(&self, file_name: &str, contents: Bytes) -> Result<Value, ParserError>;
}

#[async_trait]
pub trait SpreadsheetSink: Send + Sync {
    async fn append_row(&self, row: Vec<String>) -> Result<(), SheetsError>;
}

#[async_trait]
pub trait FunctionInvoker: Send + Sync {
    /// Fire-and-forget invocation; returns once the call has been accepted.
    async fn invoke_async(&self, function: &str, event: &InvocationEvent)
        -> Result<(), InvokeError>;
}

#[async_trait]
pub trait EmailScheduler: Send + Sync {
    /// Registers a one-time rule that delivers `input` to `target_arn`.
    async fn register(
        &self,
        entry: &ScheduleEntry,
        target_arn: &str,
        input: &InvocationEvent,
    ) -> Result<(), SchedulerError>;

    /// Detaches the target and deletes a rule that has already fired.
    async fn remove(&self, id: &str) -> Result<(), SchedulerError>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WebhookResponse {
    pub status: u16,
    pub body: String,
}

#[async_trait]
pub trait WebhookSender: Send + Sync {
    async fn post(&self, payload: &Value) -> Result<WebhookResponse, WebhookError>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingMail {
    pub to_name: String,
    pub to_address: String,
    pub subject: String,
    pub body: String,
}

#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, mail: OutgoingMail) -> Result<(), MailError>;
}
