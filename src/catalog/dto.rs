use serde::Deserialize;

use crate::models::UniversityType;

/// A course record as supplied by a catalog source, before reconciliation.
///
/// Sources are allowed to send two structurally different shapes: the
/// canonical API shape (structured `university`/`faculty`, `durationMonths`)
/// and the loosely-typed authored shape (bare name strings, a human
/// `duration` like "4 years", `url` instead of `courseUrl`). This union never
/// escapes the normalizer.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawCourseRecord {
    pub id: Option<i64>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub university: Option<RawUniversity>,
    pub faculty: Option<RawFaculty>,
    #[serde(default, alias = "specialisation")]
    pub specialisations: Vec<String>,
    pub course_code: Option<String>,
    pub course_url: Option<String>,
    pub url: Option<String>,
    pub duration: Option<String>,
    pub duration_months: Option<i64>,
    pub study_mode: Option<String>,
    pub course_type: Option<String>,
    pub fee_type: Option<String>,
    pub fee_amount: Option<f64>,
}

/// The three accepted university shapes. Variant order matters: serde tries
/// the fully-typed object first, then the id+name object, then a bare name.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum RawUniversity {
    Full {
        id: i64,
        name: String,
        #[serde(rename = "type")]
        kind: UniversityType,
    },
    Partial { id: i64, name: String },
    Name(String),
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum RawFaculty {
    Full { id: i64, name: String },
    Name(String),
}
