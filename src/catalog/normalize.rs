use std::env;

use tracing::warn;

use crate::catalog::dto::{RawCourseRecord, RawFaculty, RawUniversity};
use crate::error::{AppError, NormalizeReason};
use crate::models::{Course, Faculty, University, UniversityType};

/// What to do when a source supplies a university as a bare name string with
/// no identity attached.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UniversityFallback {
    /// Reject the record. Default: a bare name carries no identity and
    /// guessing one would leak past the normalizer.
    Strict,
    /// Synthesize `{id: -1, name, type: <default>}`.
    Placeholder,
}

#[derive(Debug, Clone)]
pub struct NormalizeOptions {
    pub university_fallback: UniversityFallback,
    pub default_university_type: UniversityType,
}

impl Default for NormalizeOptions {
    fn default() -> Self {
        Self {
            university_fallback: UniversityFallback::Strict,
            default_university_type: UniversityType::Government,
        }
    }
}

impl NormalizeOptions {
    pub fn new_from_env() -> Self {
        let university_fallback = match env::var("CATALOG_UNIVERSITY_FALLBACK").as_deref() {
            Ok("placeholder") => UniversityFallback::Placeholder,
            _ => UniversityFallback::Strict,
        };
        let default_university_type = match env::var("CATALOG_DEFAULT_UNIVERSITY_TYPE").as_deref() {
            Ok("private") => UniversityType::Private,
            Ok("semi_government") => UniversityType::SemiGovernment,
            _ => UniversityType::Government,
        };
        Self {
            university_fallback,
            default_university_type,
        }
    }
}

/// Reconcile one raw record into the canonical course shape.
///
/// Pure and deterministic; normalizing an already-canonical record returns it
/// unchanged. Fails only on missing identity (`id`, `name`, `description`,
/// `university`); everything else degrades to an absent field with a warning.
pub fn normalize(raw: RawCourseRecord, options: &NormalizeOptions) -> Result<Course, AppError> {
    let id = raw.id.ok_or(AppError::Normalization {
        reason: NormalizeReason::MissingRequiredField,
        field: "id",
    })?;
    let name = required_text(raw.name, "name")?;
    let description = required_text(raw.description, "description")?;

    let university = match raw.university {
        Some(RawUniversity::Full { id, name, kind }) => University { id, name, kind },
        Some(RawUniversity::Partial { id, name }) => University {
            id,
            name,
            kind: options.default_university_type,
        },
        Some(RawUniversity::Name(name)) => match options.university_fallback {
            UniversityFallback::Placeholder => University {
                id: -1,
                name,
                kind: options.default_university_type,
            },
            UniversityFallback::Strict => {
                return Err(AppError::Normalization {
                    reason: NormalizeReason::UnknownUniversity,
                    field: "university",
                });
            }
        },
        None => {
            return Err(AppError::Normalization {
                reason: NormalizeReason::MissingRequiredField,
                field: "university",
            });
        }
    };

    let faculty = raw.faculty.map(|f| match f {
        RawFaculty::Full { id, name } => Faculty { id, name },
        RawFaculty::Name(name) => Faculty { id: -1, name },
    });

    // durationMonths wins over the human string when both are present.
    let duration_months = match raw.duration_months {
        Some(m) if m >= 0 => Some(m as u32),
        Some(m) => {
            warn!("course {}: negative durationMonths {}, dropping", id, m);
            None
        }
        None => raw.duration.as_deref().and_then(|text| {
            let parsed = parse_duration_months(text);
            if parsed.is_none() {
                warn!("course {}: unparsable duration '{}', dropping", id, text);
            }
            parsed
        }),
    };

    let fee_amount = match raw.fee_amount {
        Some(a) if a < 0.0 => {
            warn!("course {}: negative feeAmount {}, dropping", id, a);
            None
        }
        other => other,
    };

    Ok(Course {
        id,
        name,
        description,
        university,
        faculty,
        specialisations: raw.specialisations,
        course_code: raw.course_code,
        course_url: raw.course_url.or(raw.url),
        duration_months,
        study_mode: raw.study_mode,
        course_type: raw.course_type,
        fee_type: raw.fee_type,
        fee_amount,
    })
}

/// Normalize a fetched batch, skipping records that fail reconciliation.
/// One malformed record never poisons a whole catalog fetch.
pub fn normalize_catalog(raws: Vec<RawCourseRecord>, options: &NormalizeOptions) -> Vec<Course> {
    let mut courses = Vec::with_capacity(raws.len());
    for raw in raws {
        match normalize(raw, options) {
            Ok(course) => courses.push(course),
            Err(e) => {
                warn!("skipping catalog record: {}", e);
            }
        }
    }
    courses
}

fn required_text(value: Option<String>, field: &'static str) -> Result<String, AppError> {
    match value {
        Some(s) if !s.trim().is_empty() => Ok(s),
        _ => Err(AppError::Normalization {
            reason: NormalizeReason::MissingRequiredField,
            field,
        }),
    }
}

/// Parse a human duration of the form "<N> year(s)" into months.
fn parse_duration_months(text: &str) -> Option<u32> {
    let lowered = text.trim().to_ascii_lowercase();
    let count = lowered
        .strip_suffix("years")
        .or_else(|| lowered.strip_suffix("year"))?;
    let years = count.trim().parse::<u32>().ok()?;
    Some(years * 12)
}
