use base64::{engine::general_purpose, Engine as _};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Sentinel used when the parsed document carries no phone number or email.
pub const NOT_FOUND: &str = "Not Found";

/// Canonical record produced from a parsed resume document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CvRecord {
    pub personal_info: PersonalInfo,
    pub education: Vec<EducationEntry>,
    pub qualifications: Vec<Qualification>,
    pub projects: Vec<Project>,
    /// Emails followed by websites, in source order. Not deduplicated against
    /// `personal_info.email`.
    #[serde(rename = "otherContact")]
    pub other_contact: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersonalInfo {
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "phoneNumber")]
    pub phone: String,
    pub email: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EducationEntry {
    pub organization: Option<String>,
    pub degree: Option<String>,
    pub completion_date: Option<String>,
    pub raw_text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub grade: Option<Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Qualification {
    pub qualification: Option<String>,
    pub grade: Value,
    pub year: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub title: String,
    pub details: Vec<String>,
}

/// Tags attached to the uploaded object by the upload form.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UploadMetadata {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
}

impl UploadMetadata {
    pub fn from_object_metadata(map: &std::collections::HashMap<String, String>) -> Self {
        let tag = |key: &str| map.get(key).map(|v| decode_metadata_value(v));
        Self {
            name: tag("name"),
            email: tag("email"),
            phone: tag("phone"),
        }
    }
}

const ENCODED_WORD_PREFIX: &str = "=?UTF-8?B?";
const ENCODED_WORD_SUFFIX: &str = "?=";

/// S3 user metadata must be ASCII; anything else is stored as an RFC 2047
/// encoded word, the same form S3 itself returns for non-ASCII values.
pub fn encode_metadata_value(value: &str) -> String {
    if value.is_ascii() {
        return value.to_string();
    }
    format!(
        "{ENCODED_WORD_PREFIX}{}{ENCODED_WORD_SUFFIX}",
        general_purpose::STANDARD.encode(value)
    )
}

/// Values that are not a valid encoded word are returned unchanged.
pub fn decode_metadata_value(value: &str) -> String {
    value
        .strip_prefix(ENCODED_WORD_PREFIX)
        .and_then(|rest| rest.strip_suffix(ENCODED_WORD_SUFFIX))
        .and_then(|b64| general_purpose::STANDARD.decode(b64).ok())
        .and_then(|bytes| String::from_utf8(bytes).ok())
        .unwrap_or_else(|| value.to_string())
}
