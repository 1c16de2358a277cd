use serde::{Deserialize, Serialize};

use crate::models::cv::{CvRecord, EducationEntry, PersonalInfo, Project, Qualification};

/// Substituted for upload metadata tags that were never set.
pub const METADATA_NOT_FOUND: &str = "Not found";

/// Body of the notify invocation and of the outbound webhook request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotifyPayload {
    pub cv_data: CvData,
    pub metadata: NotifyMetadata,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CvData {
    pub personal_info: PersonalInfo,
    pub education: Vec<EducationEntry>,
    pub qualifications: Vec<Qualification>,
    pub projects: Vec<Project>,
    pub cv_public_link: String,
}

impl CvData {
    pub fn from_record(cv: &CvRecord, public_url: &str) -> Self {
        Self {
            personal_info: cv.personal_info.clone(),
            education: cv.education.clone(),
            qualifications: cv.qualifications.clone(),
            projects: cv.projects.clone(),
            cv_public_link: public_url.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotifyMetadata {
    pub applicant_name: String,
    pub email: String,
    pub status: String,
    pub cv_processed: bool,
    pub processed_timestamp: String,
}

/// Body of the scheduled email invocation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmailPayload {
    pub metadata: ApplicantContact,
    /// Rule that delivered this payload; removed once the email is sent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schedule_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApplicantContact {
    pub applicant_name: String,
    pub email: String,
}
