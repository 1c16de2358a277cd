//! In-memory fakes for the service traits.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use bytes::Bytes;
use serde_json::{json, Value};

use crate::clients::{
    EmailScheduler, FunctionInvoker, InvokeError, MailError, Mailer, ObjectStore, OutgoingMail,
    ParserError, ResumeParser, SchedulerError, SheetsError, SpreadsheetSink, StorageError,
    StoredObject, WebhookError, WebhookResponse, WebhookSender,
};
use crate::config::Config;
use crate::intake::schedule::ScheduleEntry;
use crate::models::events::InvocationEvent;
use crate::state::{AppState, Services};

pub fn test_config() -> Config {
    Config {
        affinda_api_url: "http://parser.test/v1/resumes".to_string(),
        affinda_api_key: "test-key".to_string(),
        google_sheets_credentials: "{}".to_string(),
        spreadsheet_id: "sheet-id".to_string(),
        sheet_range: "Sheet1".to_string(),
        notify_function_name: "send-webhook".to_string(),
        email_function_arn: "arn:aws:lambda:eu-north-1:000000000000:function:send-email"
            .to_string(),
        email_delay_hours: 22,
        email_delay: chrono::Duration::hours(22),
        pipeline_status: "prod".to_string(),
        webhook_url: "http://webhook.test/".to_string(),
        webhook_candidate_email: "reviewer@example.com".to_string(),
        smtp_server: "smtp.test".to_string(),
        smtp_port: 465,
        smtp_user: "team@example.com".to_string(),
        smtp_password: "secret".to_string(),
        mail_from: "team@example.com".to_string(),
        upload_bucket: "cvs".to_string(),
        aws_region: "eu-north-1".to_string(),
        s3_endpoint: None,
        port: 0,
        rust_log: "debug".to_string(),
    }
}

/// A parser document with one graded education entry and one project.
pub fn sample_document() -> Value {
    json!({
        "data": {
            "name": {"raw": "Ada Lovelace"},
            "emails": ["ada@example.com"],
            "phoneNumbers": ["+44 20 7946 0000"],
            "websites": ["https://ada.dev"],
            "education": [{
                "organization": "University of London",
                "accreditation": {"education": "BSc Mathematics"},
                "dates": {"completionDate": "1835-06-01", "rawText": "1832 - 1835"},
                "grade": "First"
            }],
            "sections": [
                {"sectionType": "Projects", "text": "Analytical Engine\nNotes on the engine\n\nBernoulli numbers"}
            ]
        }
    })
}

#[derive(Default)]
pub struct FakeStore {
    pub objects: Mutex<HashMap<(String, String), StoredObject>>,
    pub puts: Mutex<Vec<(String, String, HashMap<String, String>)>>,
}

impl FakeStore {
    pub fn insert(&self, bucket: &str, key: &str, metadata: &[(&str, &str)]) {
        let object = StoredObject {
            body: Bytes::from_static(b"%PDF-1.4 fake"),
            metadata: metadata
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        };
        self.objects
            .lock()
            .unwrap()
            .insert((bucket.to_string(), key.to_string()), object);
    }
}

#[async_trait]
impl ObjectStore for FakeStore {
    async fn fetch(&self, bucket: &str, key: &str) -> Result<StoredObject, StorageError> {
        self.objects
            .lock()
            .unwrap()
            .get(&(bucket.to_string(), key.to_string()))
            .cloned()
            .ok_or_else(|| StorageError::Fetch {
                bucket: bucket.to_string(),
                key: key.to_string(),
                message: "NoSuchKey".to_string(),
            })
    }

    async fn put(
        &self,
        bucket: &str,
        key: &str,
        _body: Bytes,
        _content_type: Option<String>,
        metadata: HashMap<String, String>,
    ) -> Result<(), StorageError> {
        self.puts
            .lock()
            .unwrap()
            .push((bucket.to_string(), key.to_string(), metadata));
        Ok(())
    }
}

/// Returns `document`, or a 401 when it is `None`.
pub struct FakeParser {
    pub document: Option<Value>,
    pub calls: Mutex<Vec<String>>,
}

impl FakeParser {
    pub fn returning(document: Value) -> Self {
        Self {
            document: Some(document),
            calls: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl ResumeParser for FakeParser {
    async fn parse(&self, file_name: &str, _contents: Bytes) -> Result<Value, ParserError> {
        self.calls.lock().unwrap().push(file_name.to_string());
        self.document.clone().ok_or(ParserError::Api {
            status: 401,
            message: "invalid api key".to_string(),
        })
    }
}

#[derive(Default)]
pub struct FakeSheet {
    pub fail: bool,
    pub rows: Mutex<Vec<Vec<String>>>,
}

#[async_trait]
impl SpreadsheetSink for FakeSheet {
    async fn append_row(&self, row: Vec<String>) -> Result<(), SheetsError> {
        if self.fail {
            return Err(SheetsError::Auth {
                status: 403,
                message: "forbidden".to_string(),
            });
        }
        self.rows.lock().unwrap().push(row);
        Ok(())
    }
}

#[derive(Default)]
pub struct FakeInvoker {
    pub fail: bool,
    pub calls: Mutex<Vec<(String, InvocationEvent)>>,
}

#[async_trait]
impl FunctionInvoker for FakeInvoker {
    async fn invoke_async(
        &self,
        function: &str,
        event: &InvocationEvent,
    ) -> Result<(), InvokeError> {
        if self.fail {
            return Err(InvokeError::Rejected {
                function: function.to_string(),
                status: 500,
            });
        }
        self.calls
            .lock()
            .unwrap()
            .push((function.to_string(), event.clone()));
        Ok(())
    }
}

#[derive(Default)]
pub struct FakeScheduler {
    pub fail: bool,
    pub registered: Mutex<Vec<(ScheduleEntry, String, InvocationEvent)>>,
    pub removed: Mutex<Vec<String>>,
}

#[async_trait]
impl EmailScheduler for FakeScheduler {
    async fn register(
        &self,
        entry: &ScheduleEntry,
        target_arn: &str,
        input: &InvocationEvent,
    ) -> Result<(), SchedulerError> {
        if self.fail {
            return Err(SchedulerError::PutRule {
                rule: entry.id.clone(),
                message: "AccessDenied".to_string(),
            });
        }
        self.registered
            .lock()
            .unwrap()
            .push((entry.clone(), target_arn.to_string(), input.clone()));
        Ok(())
    }

    async fn remove(&self, id: &str) -> Result<(), SchedulerError> {
        if self.fail {
            return Err(SchedulerError::Remove {
                rule: id.to_string(),
                message: "ResourceNotFoundException".to_string(),
            });
        }
        self.removed.lock().unwrap().push(id.to_string());
        Ok(())
    }
}

pub struct FakeWebhook {
    pub response: WebhookResponse,
    pub posted: Mutex<Vec<Value>>,
}

impl Default for FakeWebhook {
    fn default() -> Self {
        Self {
            response: WebhookResponse {
                status: 200,
                body: "accepted".to_string(),
            },
            posted: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl WebhookSender for FakeWebhook {
    async fn post(&self, payload: &Value) -> Result<WebhookResponse, WebhookError> {
        self.posted.lock().unwrap().push(payload.clone());
        Ok(self.response.clone())
    }
}

#[derive(Default)]
pub struct FakeMailer {
    pub fail: bool,
    pub sent: Mutex<Vec<OutgoingMail>>,
}

#[async_trait]
impl Mailer for FakeMailer {
    async fn send(&self, mail: OutgoingMail) -> Result<(), MailError> {
        if self.fail {
            let err = "relay-down".parse::<lettre::Address>().unwrap_err();
            return Err(MailError::Address(err));
        }
        self.sent.lock().unwrap().push(mail);
        Ok(())
    }
}

/// Concrete handles to every fake so tests can inspect recorded calls.
pub struct Fakes {
    pub store: Arc<FakeStore>,
    pub parser: Arc<FakeParser>,
    pub sheet: Arc<FakeSheet>,
    pub invoker: Arc<FakeInvoker>,
    pub scheduler: Arc<FakeScheduler>,
    pub webhook: Arc<FakeWebhook>,
    pub mailer: Arc<FakeMailer>,
}

impl Default for Fakes {
    fn default() -> Self {
        Self {
            store: Arc::new(FakeStore::default()),
            parser: Arc::new(FakeParser::returning(sample_document())),
            sheet: Arc::new(FakeSheet::default()),
            invoker: Arc::new(FakeInvoker::default()),
            scheduler: Arc::new(FakeScheduler::default()),
            webhook: Arc::new(FakeWebhook::default()),
            mailer: Arc::new(FakeMailer::default()),
        }
    }
}

impl Fakes {
    pub fn state(&self) -> AppState {
        AppState {
            services: Services {
                store: self.store.clone(),
                parser: self.parser.clone(),
                sheet: self.sheet.clone(),
                invoker: self.invoker.clone(),
                scheduler: self.scheduler.clone(),
                webhook: self.webhook.clone(),
                mailer: self.mailer.clone(),
            },
            config: test_config(),
        }
    }
}
