//! Substring course matching over a canonical catalog.
//!
//! Matching is deliberately simple: case-folded substring, OR across fields,
//! catalog order preserved. Callers that need an index can build one in front
//! of this without changing the contract.

use crate::models::Course;

/// Return the courses matching `query`, in catalog order.
///
/// An empty or whitespace-only query returns the whole catalog unchanged.
/// A course matches when the folded query appears in its name, description,
/// university name, faculty name, or any specialisation label.
pub fn search_catalog(catalog: &[Course], query: &str) -> Vec<Course> {
    let term = query.trim().to_lowercase();
    if term.is_empty() {
        return catalog.to_vec();
    }

    catalog
        .iter()
        .filter(|course| matches_course(course, &term))
        .cloned()
        .collect()
}

fn matches_course(course: &Course, folded_term: &str) -> bool {
    contains_folded(&course.name, folded_term)
        || contains_folded(&course.description, folded_term)
        || contains_folded(&course.university.name, folded_term)
        || course
            .faculty
            .as_ref()
            .is_some_and(|f| contains_folded(&f.name, folded_term))
        || course
            .specialisations
            .iter()
            .any(|s| contains_folded(s, folded_term))
}

fn contains_folded(haystack: &str, folded_term: &str) -> bool {
    haystack.to_lowercase().contains(folded_term)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Faculty, University, UniversityType};

    fn course(id: i64, name: &str, description: &str, specialisations: &[&str]) -> Course {
        Course {
            id,
            name: name.to_string(),
            description: description.to_string(),
            university: University {
                id,
                name: format!("University {}", id),
                kind: UniversityType::Government,
            },
            faculty: Some(Faculty {
                id,
                name: format!("Faculty {}", id),
            }),
            specialisations: specialisations.iter().map(|s| s.to_string()).collect(),
            course_code: None,
            course_url: None,
            duration_months: None,
            study_mode: None,
            course_type: None,
            fee_type: None,
            fee_amount: None,
        }
    }

    fn sample_catalog() -> Vec<Course> {
        vec![
            course(1, "Computer Science", "Programming and algorithms", &["Data Science"]),
            course(2, "Business Administration", "Modern business practices", &["Finance"]),
            course(3, "Medicine", "Bachelor of Medicine and Surgery", &[]),
        ]
    }

    #[test]
    fn empty_query_returns_catalog_in_order() {
        let catalog = sample_catalog();
        assert_eq!(search_catalog(&catalog, ""), catalog);
        assert_eq!(search_catalog(&catalog, "   "), catalog);
    }

    #[test]
    fn matches_are_case_insensitive() {
        let catalog = sample_catalog();
        let hits = search_catalog(&catalog, "BUSINESS");
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].id, 2);
    }

    #[test]
    fn no_match_returns_empty() {
        let catalog = sample_catalog();
        assert!(search_catalog(&catalog, "engineering").is_empty());
    }

    #[test]
    fn any_field_can_match() {
        let catalog = sample_catalog();
        // description
        assert_eq!(search_catalog(&catalog, "algorithms")[0].id, 1);
        // university name
        assert_eq!(search_catalog(&catalog, "university 3")[0].id, 3);
        // faculty name
        assert_eq!(search_catalog(&catalog, "faculty 2")[0].id, 2);
        // specialisation
        assert_eq!(search_catalog(&catalog, "finance")[0].id, 2);
    }

    #[test]
    fn result_order_follows_catalog_order() {
        let catalog = sample_catalog();
        // "medicine" hits both the name of id 3 and nothing else; "a" hits all.
        let hits = search_catalog(&catalog, "a");
        let ids: Vec<i64> = hits.iter().map(|c| c.id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }

    #[test]
    fn inputs_are_not_mutated() {
        let catalog = sample_catalog();
        let before = catalog.clone();
        let _ = search_catalog(&catalog, "medicine");
        assert_eq!(catalog, before);
    }
}
