use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Object-created notification delivered by the storage bucket.
#[derive(Debug, Clone, Deserialize)]
pub struct UploadEvent {
    #[serde(rename = "Records")]
    pub records: Vec<UploadRecord>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UploadRecord {
    pub s3: S3Entity,
}

#[derive(Debug, Clone, Deserialize)]
pub struct S3Entity {
    pub bucket: S3Bucket,
    pub object: S3Object,
}

#[derive(Debug, Clone, Deserialize)]
pub struct S3Bucket {
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct S3Object {
    pub key: String,
}

/// Bucket and decoded key of the uploaded CV.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadLocation {
    pub bucket: String,
    pub key: String,
}

impl UploadLocation {
    pub fn public_url(&self) -> String {
        format!("https://{}.s3.amazonaws.com/{}", self.bucket, self.key)
    }

    /// File name handed to the resume parser (last path segment of the key).
    pub fn file_name(&self) -> &str {
        self.key.rsplit('/').next().unwrap_or(&self.key)
    }
}

impl UploadEvent {
    /// Only the first record is processed.
    pub fn first_location(&self) -> Option<UploadLocation> {
        self.records.first().map(|record| UploadLocation {
            bucket: record.s3.bucket.name.clone(),
            key: decode_object_key(&record.s3.object.key),
        })
    }
}

/// Object keys arrive form-encoded; only `+` and `%20` are mapped back to spaces.
pub fn decode_object_key(raw: &str) -> String {
    raw.replace('+', " ").replace("%20", " ")
}

/// Payload shape used for function-to-function invocations: `{ "body": ... }`
/// where `body` is either a JSON string or an already-decoded object.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InvocationEvent {
    #[serde(default)]
    pub body: Value,
}

impl InvocationEvent {
    /// Wraps `payload` with its JSON encoding as a string body.
    pub fn wrap<T: Serialize>(payload: &T) -> serde_json::Result<Self> {
        Ok(Self {
            body: Value::String(serde_json::to_string(payload)?),
        })
    }

    /// Returns the body as a JSON value, decoding it first when it is a string.
    pub fn body_value(&self) -> serde_json::Result<Value> {
        match &self.body {
            Value::String(raw) => serde_json::from_str(raw),
            other => Ok(other.clone()),
        }
    }
}

/// Uniform `{statusCode, body}` envelope returned by every function handler.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HandlerResponse {
    pub status_code: u16,
    pub body: String,
}

impl HandlerResponse {
    pub fn json(status_code: u16, body: &Value) -> Self {
        Self {
            status_code,
            body: body.to_string(),
        }
    }
}

/// The envelope's `statusCode` doubles as the HTTP status.
impl IntoResponse for HandlerResponse {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.status_code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(self)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn event_with_key(key: &str) -> UploadEvent {
        serde_json::from_value(json!({
            "Records": [{"s3": {"bucket": {"name": "cvs"}, "object": {"key": key}}}]
        }))
        .unwrap()
    }

    #[test]
    fn test_plain_key_with_spaces_is_preserved() {
        let loc = event_with_key("cv (1).pdf").first_location().unwrap();
        assert_eq!(loc.key, "cv (1).pdf");
    }

    #[test]
    fn test_plus_and_percent20_become_spaces() {
        assert_eq!(decode_object_key("cv+(1).pdf"), "cv (1).pdf");
        assert_eq!(decode_object_key("my%20cv%20final.pdf"), "my cv final.pdf");
        assert!(!decode_object_key("a+b%20c").contains(['+', '%']));
    }

    #[test]
    fn test_public_url_and_file_name() {
        let loc = event_with_key("2024/cv.pdf").first_location().unwrap();
        assert_eq!(loc.public_url(), "https://cvs.s3.amazonaws.com/2024/cv.pdf");
        assert_eq!(loc.file_name(), "cv.pdf");
    }

    #[test]
    fn test_event_without_records_fails_to_parse() {
        assert!(serde_json::from_value::<UploadEvent>(json!({"detail": {}})).is_err());
    }

    #[test]
    fn test_empty_records_has_no_location() {
        let event: UploadEvent = serde_json::from_value(json!({"Records": []})).unwrap();
        assert!(event.first_location().is_none());
    }

    #[test]
    fn test_invocation_body_accepts_string_or_object() {
        let as_string = InvocationEvent {
            body: Value::String(r#"{"a":1}"#.to_string()),
        };
        let as_object = InvocationEvent { body: json!({"a": 1}) };
        assert_eq!(as_string.body_value().unwrap(), json!({"a": 1}));
        assert_eq!(as_object.body_value().unwrap(), json!({"a": 1}));
    }

    #[test]
    fn test_handler_response_envelope_keys() {
        let resp = HandlerResponse::json(200, &json!({"message": "ok"}));
        let value = serde_json::to_value(&resp).unwrap();
        assert_eq!(value["statusCode"], 200);
        assert_eq!(value["body"], r#"{"message":"ok"}"#);
    }
}
