pub mod dto;
pub mod normalize;

use std::env;

use async_trait::async_trait;
use reqwest::Client;

use crate::error::AppError;

pub use dto::{RawCourseRecord, RawFaculty, RawUniversity};
pub use normalize::{NormalizeOptions, UniversityFallback, normalize, normalize_catalog};

#[derive(Clone, Debug)]
pub struct CatalogConfig {
    pub catalog_url: String,
}

impl CatalogConfig {
    pub fn new_from_env() -> Result<Self, AppError> {
        let catalog_url = env::var("CATALOG_URL")
            .map_err(|_| AppError::BadRequest("CATALOG_URL is not set".to_string()))?;
        Ok(Self { catalog_url })
    }
}

/// Pull-based source of raw course records. Callers re-fetch per operation
/// rather than caching; snapshot reuse is the caller's decision.
#[async_trait]
pub trait CatalogSource: Send + Sync {
    async fn fetch_courses(&self) -> Result<Vec<RawCourseRecord>, AppError>;
}

pub struct HttpCatalogSource {
    client: Client,
    config: CatalogConfig,
}

impl HttpCatalogSource {
    pub fn new(config: CatalogConfig) -> Result<Self, AppError> {
        let client = Client::builder()
            .build()
            .map_err(|e| AppError::BadRequest(format!("Failed to build http client: {}", e)))?;
        Ok(Self { client, config })
    }
}

#[async_trait]
impl CatalogSource for HttpCatalogSource {
    async fn fetch_courses(&self) -> Result<Vec<RawCourseRecord>, AppError> {
        let response = self
            .client
            .get(&self.config.catalog_url)
            .send()
            .await
            .map_err(|e| AppError::AdapterUnavailable(format!("catalog fetch failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::AdapterUnavailable(format!(
                "catalog source returned {}: {}",
                status, body
            )));
        }

        let body_text = response.text().await.unwrap_or_default();
        serde_json::from_str::<Vec<RawCourseRecord>>(&body_text).map_err(|e| {
            tracing::error!("Failed to parse catalog response: {}", e);
            AppError::BadRequest(format!("Failed to parse catalog response: {}", e))
        })
    }
}

/// Built-in catalog used when no CATALOG_URL is configured. Carries the
/// bundled seed records so search and bookmarking work offline.
pub struct StaticCatalogSource {
    records: Vec<RawCourseRecord>,
}

impl StaticCatalogSource {
    pub fn new(records: Vec<RawCourseRecord>) -> Self {
        Self { records }
    }

    pub fn seeded() -> Self {
        Self::new(seed_records())
    }
}

#[async_trait]
impl CatalogSource for StaticCatalogSource {
    async fn fetch_courses(&self) -> Result<Vec<RawCourseRecord>, AppError> {
        Ok(self.records.clone())
    }
}

fn seed_records() -> Vec<RawCourseRecord> {
    let seed = serde_json::json!([
        {
            "id": 1,
            "name": "Computer Science",
            "specialisation": ["Software Engineering", "Data Science"],
            "courseCode": "CS-001",
            "courseUrl": "https://cmb.ac.lk/faculty-of-science/computer-science",
            "durationMonths": 48,
            "description": "Comprehensive computer science program covering programming, algorithms, and software development",
            "studyMode": "fulltime",
            "courseType": "internal",
            "feeType": "free",
            "feeAmount": 0,
            "university": { "id": 1, "name": "University of Colombo", "type": "government" },
            "faculty": { "id": 1, "name": "Faculty of Science" }
        },
        {
            "id": 2,
            "name": "Business Administration",
            "specialisation": ["Management", "Marketing", "Finance"],
            "courseCode": "BBA-001",
            "courseUrl": "https://pdn.ac.lk/management/bba",
            "durationMonths": 48,
            "description": "Bachelor of Business Administration with focus on modern business practices",
            "studyMode": "fulltime",
            "courseType": "internal",
            "feeType": "free",
            "feeAmount": 0,
            "university": { "id": 2, "name": "University of Peradeniya", "type": "government" },
            "faculty": { "id": 2, "name": "Faculty of Management" }
        },
        {
            "id": 3,
            "name": "Engineering - Electrical",
            "specialisation": ["Power Systems", "Electronics", "Telecommunications"],
            "courseCode": "EE-001",
            "courseUrl": "https://mrt.ac.lk/engineering/electrical",
            "durationMonths": 48,
            "description": "Bachelor of Engineering in Electrical Engineering",
            "studyMode": "fulltime",
            "courseType": "internal",
            "feeType": "free",
            "feeAmount": 0,
            "university": { "id": 3, "name": "University of Moratuwa", "type": "government" },
            "faculty": { "id": 3, "name": "Faculty of Engineering" }
        },
        {
            "id": 4,
            "name": "Medicine",
            "specialisation": ["General Medicine"],
            "courseCode": "MBBS-001",
            "courseUrl": "https://med.cmb.ac.lk/medicine",
            "durationMonths": 60,
            "description": "Bachelor of Medicine and Bachelor of Surgery",
            "studyMode": "fulltime",
            "courseType": "internal",
            "feeType": "free",
            "feeAmount": 0,
            "university": { "id": 1, "name": "University of Colombo", "type": "government" },
            "faculty": { "id": 4, "name": "Faculty of Medicine" }
        }
    ]);

    serde_json::from_value(seed).unwrap_or_else(|e| {
        // The seed is a compile-time constant; a parse failure is a bug.
        tracing::error!("seed catalog failed to deserialize: {}", e);
        Vec::new()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn static_source_serves_seed_records() {
        let source = StaticCatalogSource::seeded();
        let records = source.fetch_courses().await.unwrap();
        assert_eq!(records.len(), 4);
        assert_eq!(records[0].id, Some(1));
        assert_eq!(records[1].name.as_deref(), Some("Business Administration"));
    }

    #[tokio::test]
    async fn seed_records_all_normalize_strictly() {
        let source = StaticCatalogSource::seeded();
        let records = source.fetch_courses().await.unwrap();
        let opts = NormalizeOptions::default();
        let courses = normalize_catalog(records, &opts);
        assert_eq!(courses.len(), 4);
        assert!(courses.iter().all(|c| c.duration_months.is_some()));
    }
}
