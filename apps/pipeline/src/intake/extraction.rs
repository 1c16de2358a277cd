//! Normalization of the resume parser's JSON document into a [`CvRecord`].
//!
//! Pure and deterministic: no I/O, no clock, no randomness.

use serde_json::Value;
use thiserror::Error;

use crate::models::cv::{
    CvRecord, EducationEntry, PersonalInfo, Project, Qualification, NOT_FOUND,
};

const PROJECTS_SECTION: &str = "Projects";

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ExtractionError {
    #[error("missing required field `{0}`")]
    MissingField(String),

    #[error("field `{field}` has an unexpected type (expected {expected})")]
    InvalidField { field: String, expected: &'static str },
}

/// Maps a parsed resume document onto the normalized record.
pub fn extract_cv_data(document: &Value) -> Result<CvRecord, ExtractionError> {
    let data = require_object(document, "data", "data")?;

    let education = extract_education(require_array(data, "education", "data.education")?)?;
    let qualifications = derive_qualifications(&education);
    let projects = extract_projects(require_array(data, "sections", "data.sections")?)?;

    let emails = string_list(require_array(data, "emails", "data.emails")?, "data.emails")?;
    let websites = string_list(
        require_array(data, "websites", "data.websites")?,
        "data.websites",
    )?;
    let phones = match data.get("phoneNumbers") {
        None | Some(Value::Null) => Vec::new(),
        Some(value) => string_list(as_array(value, "data.phoneNumbers")?, "data.phoneNumbers")?,
    };

    let name = require(require_object(data, "name", "data.name")?, "raw", "data.name.raw")?;
    let name = name
        .as_str()
        .ok_or_else(|| invalid("data.name.raw", "string"))?
        .to_string();

    let personal_info = PersonalInfo {
        name,
        phone: first_or_sentinel(&phones),
        email: first_or_sentinel(&emails),
    };

    let mut other_contact = emails;
    other_contact.extend(websites);

    Ok(CvRecord {
        personal_info,
        education,
        qualifications,
        projects,
        other_contact,
    })
}

fn extract_education(entries: &[Value]) -> Result<Vec<EducationEntry>, ExtractionError> {
    entries
        .iter()
        .enumerate()
        .map(|(i, entry)| {
            let path = format!("data.education[{i}]");
            let accreditation =
                require_object(entry, "accreditation", &format!("{path}.accreditation"))?;
            let dates = require_object(entry, "dates", &format!("{path}.dates"))?;

            Ok(EducationEntry {
                organization: optional_string(entry, "organization", &path)?,
                degree: optional_string(
                    accreditation,
                    "education",
                    &format!("{path}.accreditation"),
                )?,
                completion_date: optional_string(
                    dates,
                    "completionDate",
                    &format!("{path}.dates"),
                )?,
                raw_text: optional_string(dates, "rawText", &format!("{path}.dates"))?,
                grade: entry.get("grade").filter(|g| is_truthy(g)).cloned(),
            })
        })
        .collect()
}

/// Qualifications are a view over the graded education entries.
pub fn derive_qualifications(education: &[EducationEntry]) -> Vec<Qualification> {
    education
        .iter()
        .filter_map(|entry| {
            entry.grade.as_ref().map(|grade| Qualification {
                qualification: entry.degree.clone(),
                grade: grade.clone(),
                year: entry.completion_date.clone(),
            })
        })
        .collect()
}

fn extract_projects(sections: &[Value]) -> Result<Vec<Project>, ExtractionError> {
    let mut projects = Vec::new();
    for (i, section) in sections.iter().enumerate() {
        let path = format!("data.sections[{i}]");
        let section_type = require(section, "sectionType", &format!("{path}.sectionType"))?;
        if section_type.as_str() != Some(PROJECTS_SECTION) {
            continue;
        }
        let text = require(section, "text", &format!("{path}.text"))?
            .as_str()
            .ok_or_else(|| invalid(&format!("{path}.text"), "string"))?;
        projects.push(parse_project_text(text));
    }
    Ok(projects)
}

/// First line is the title (kept as-is); every later non-blank line becomes a
/// trimmed detail. One section always yields one project.
pub fn parse_project_text(text: &str) -> Project {
    let mut lines = text.split('\n');
    let title = lines.next().unwrap_or_default().to_string();
    let details = lines
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(String::from)
        .collect();
    Project { title, details }
}

fn first_or_sentinel(values: &[String]) -> String {
    values
        .first()
        .cloned()
        .unwrap_or_else(|| NOT_FOUND.to_string())
}

fn require<'a>(value: &'a Value, key: &str, path: &str) -> Result<&'a Value, ExtractionError> {
    value
        .get(key)
        .ok_or_else(|| ExtractionError::MissingField(path.to_string()))
}

/// Like [`require`], but a `null` object we need to index into counts as missing.
fn require_object<'a>(
    value: &'a Value,
    key: &str,
    path: &str,
) -> Result<&'a Value, ExtractionError> {
    match require(value, key, path)? {
        Value::Null => Err(ExtractionError::MissingField(path.to_string())),
        v => Ok(v),
    }
}

fn require_array<'a>(
    value: &'a Value,
    key: &str,
    path: &str,
) -> Result<&'a [Value], ExtractionError> {
    as_array(require(value, key, path)?, path)
}

fn as_array<'a>(value: &'a Value, path: &str) -> Result<&'a [Value], ExtractionError> {
    value
        .as_array()
        .map(Vec::as_slice)
        .ok_or_else(|| invalid(path, "array"))
}

fn string_list(values: &[Value], path: &str) -> Result<Vec<String>, ExtractionError> {
    values
        .iter()
        .enumerate()
        .map(|(i, v)| {
            v.as_str()
                .map(String::from)
                .ok_or_else(|| invalid(&format!("{path}[{i}]"), "string"))
        })
        .collect()
}

fn optional_string(
    parent: &Value,
    key: &str,
    parent_path: &str,
) -> Result<Option<String>, ExtractionError> {
    let path = format!("{parent_path}.{key}");
    match require(parent, key, &path)? {
        Value::Null => Ok(None),
        Value::String(s) => Ok(Some(s.clone())),
        _ => Err(invalid(&path, "string or null")),
    }
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map_or(true, |f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    }
}

fn invalid(field: &str, expected: &'static str) -> ExtractionError {
    ExtractionError::InvalidField {
        field: field.to_string(),
        expected,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn education(org: &str, degree: &str, year: &str, grade: Option<Value>) -> Value {
        let mut entry = json!({
            "organization": org,
            "accreditation": {"education": degree},
            "dates": {"completionDate": year, "rawText": format!("Graduated {year}")}
        });
        if let Some(g) = grade {
            entry["grade"] = g;
        }
        entry
    }

    fn document(education: Vec<Value>, sections: Vec<Value>) -> Value {
        json!({
            "data": {
                "name": {"raw": "Ada Lovelace"},
                "emails": ["ada@example.com", "ada@work.example"],
                "phoneNumbers": ["+44 20 7946 0000"],
                "websites": ["https://ada.dev"],
                "education": education,
                "sections": sections
            }
        })
    }

    #[test]
    fn test_qualifications_count_matches_graded_entries() {
        let doc = document(
            vec![
                education("Oxford", "BSc Maths", "2018-06-01", Some(json!("First"))),
                education("Cambridge", "MPhil", "2019-06-01", None),
                education("UCL", "PhD", "2023-06-01", Some(json!("Pass"))),
            ],
            vec![],
        );
        let cv = extract_cv_data(&doc).unwrap();
        assert_eq!(cv.education.len(), 3);
        assert_eq!(cv.qualifications.len(), 2);

        let graded: Vec<_> = cv.education.iter().filter(|e| e.grade.is_some()).collect();
        for (q, e) in cv.qualifications.iter().zip(graded) {
            assert_eq!(q.qualification, e.degree);
            assert_eq!(Some(&q.grade), e.grade.as_ref());
            assert_eq!(q.year, e.completion_date);
        }
    }

    #[test]
    fn test_falsy_grade_is_dropped() {
        let doc = document(
            vec![
                education("A", "BA", "2010", Some(json!(""))),
                education("B", "MA", "2012", Some(Value::Null)),
            ],
            vec![],
        );
        let cv = extract_cv_data(&doc).unwrap();
        assert!(cv.education.iter().all(|e| e.grade.is_none()));
        assert!(cv.qualifications.is_empty());
    }

    #[test]
    fn test_project_blank_lines_are_dropped_not_split() {
        let doc = document(
            vec![],
            vec![json!({"sectionType": "Projects", "text": "Title\nline1\n\nline2"})],
        );
        let cv = extract_cv_data(&doc).unwrap();
        assert_eq!(
            cv.projects,
            vec![Project {
                title: "Title".to_string(),
                details: vec!["line1".to_string(), "line2".to_string()],
            }]
        );
    }

    #[test]
    fn test_single_line_project_has_no_details() {
        let project = parse_project_text("Compiler");
        assert_eq!(project.title, "Compiler");
        assert!(project.details.is_empty());
    }

    #[test]
    fn test_project_title_untrimmed_details_trimmed() {
        let project = parse_project_text("  Raytracer \n   built in Rust  \n\t\n");
        assert_eq!(project.title, "  Raytracer ");
        assert_eq!(project.details, vec!["built in Rust"]);
    }

    #[test]
    fn test_only_projects_sections_are_selected() {
        let doc = document(
            vec![],
            vec![
                json!({"sectionType": "Skills", "text": "Rust\nGo"}),
                json!({"sectionType": "Projects", "text": "One"}),
                json!({"sectionType": "Projects", "text": "Two\ndetail"}),
            ],
        );
        let cv = extract_cv_data(&doc).unwrap();
        let titles: Vec<_> = cv.projects.iter().map(|p| p.title.as_str()).collect();
        assert_eq!(titles, vec!["One", "Two"]);
    }

    #[test]
    fn test_missing_phone_and_email_use_sentinel() {
        let mut doc = document(vec![], vec![]);
        doc["data"]["phoneNumbers"] = json!([]);
        doc["data"]["emails"] = json!([]);
        let cv = extract_cv_data(&doc).unwrap();
        assert_eq!(cv.personal_info.phone, NOT_FOUND);
        assert_eq!(cv.personal_info.email, NOT_FOUND);
        assert_eq!(cv.other_contact, vec!["https://ada.dev"]);
    }

    #[test]
    fn test_absent_phone_numbers_key_uses_sentinel() {
        let mut doc = document(vec![], vec![]);
        doc["data"].as_object_mut().unwrap().remove("phoneNumbers");
        let cv = extract_cv_data(&doc).unwrap();
        assert_eq!(cv.personal_info.phone, NOT_FOUND);
    }

    #[test]
    fn test_other_contact_is_emails_then_websites() {
        let mut doc = document(vec![], vec![]);
        doc["data"]["emails"] = json!(["a", "b"]);
        doc["data"]["websites"] = json!(["c"]);
        let cv = extract_cv_data(&doc).unwrap();
        assert_eq!(cv.other_contact, vec!["a", "b", "c"]);
        assert_eq!(cv.personal_info.email, "a");
    }

    #[test]
    fn test_extraction_is_byte_identical_across_calls() {
        let doc = document(
            vec![education("Oxford", "BSc", "2018", Some(json!("2:1")))],
            vec![json!({"sectionType": "Projects", "text": "P\nd"})],
        );
        let first = serde_json::to_string(&extract_cv_data(&doc).unwrap()).unwrap();
        let second = serde_json::to_string(&extract_cv_data(&doc).unwrap()).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_missing_name_is_named_error() {
        let mut doc = document(vec![], vec![]);
        doc["data"].as_object_mut().unwrap().remove("name");
        assert_eq!(
            extract_cv_data(&doc).unwrap_err(),
            ExtractionError::MissingField("data.name".to_string())
        );
    }

    #[test]
    fn test_missing_required_lists_are_named() {
        for key in ["education", "sections", "emails", "websites"] {
            let mut doc = document(vec![], vec![]);
            doc["data"].as_object_mut().unwrap().remove(key);
            assert_eq!(
                extract_cv_data(&doc).unwrap_err(),
                ExtractionError::MissingField(format!("data.{key}"))
            );
        }
    }

    #[test]
    fn test_missing_nested_education_key_reports_path() {
        let mut entry = education("Oxford", "BSc", "2018", None);
        entry["dates"].as_object_mut().unwrap().remove("rawText");
        let doc = document(vec![entry], vec![]);
        assert_eq!(
            extract_cv_data(&doc).unwrap_err(),
            ExtractionError::MissingField("data.education[0].dates.rawText".to_string())
        );
    }

    #[test]
    fn test_null_leaf_values_are_carried_as_none() {
        let entry = json!({
            "organization": null,
            "accreditation": {"education": "BSc"},
            "dates": {"completionDate": null, "rawText": "2018"}
        });
        let cv = extract_cv_data(&document(vec![entry], vec![])).unwrap();
        assert_eq!(cv.education[0].organization, None);
        assert_eq!(cv.education[0].completion_date, None);
    }

    #[test]
    fn test_wrong_type_is_reported() {
        let mut doc = document(vec![], vec![]);
        doc["data"]["emails"] = json!("ada@example.com");
        assert_eq!(
            extract_cv_data(&doc).unwrap_err(),
            ExtractionError::InvalidField {
                field: "data.emails".to_string(),
                expected: "array"
            }
        );
    }
}
