use serde_json::Value;

use super::ApiError;
use crate::constants::limits::MAX_PAGE;
use crate::domain::{MovieId, Page, RecommendationId};

pub fn validate_page(page: Option<i64>) -> Result<Page, ApiError> {
    let Some(page) = page else {
        return Ok(Page::FIRST);
    };

    u32::try_from(page).ok().and_then(Page::new).ok_or_else(|| {
        ApiError::validation(format!(
            "Invalid page: {page}. Page must be between 1 and {MAX_PAGE}"
        ))
    })
}

pub fn validate_search_query(query: Option<&str>) -> Result<&str, ApiError> {
    let trimmed = query.map(str::trim).unwrap_or_default();

    if trimmed.is_empty() {
        return Err(ApiError::validation("Query parameter is required"));
    }

    if trimmed.len() > 200 {
        return Err(ApiError::validation(
            "Search query must be 200 characters or less",
        ));
    }

    Ok(trimmed)
}

/// Accepts the movie id as a JSON number or a numeric string.
pub fn validate_movie_id(raw: Option<&Value>) -> Result<MovieId, ApiError> {
    let id = match raw {
        Some(Value::Number(n)) => n.as_i64(),
        Some(Value::String(s)) => s.trim().parse::<i64>().ok(),
        _ => None,
    };

    id.and_then(|id| i32::try_from(id).ok())
        .filter(|id| *id > 0)
        .map(MovieId::new)
        .ok_or_else(|| ApiError::validation("Movie ID is required"))
}

pub fn validate_recommendation_id(id: i32) -> Result<RecommendationId, ApiError> {
    if id <= 0 {
        return Err(ApiError::validation(format!(
            "Invalid recommendation ID: {id}. ID must be a positive integer"
        )));
    }
    Ok(RecommendationId::new(id))
}

pub fn validate_tmdb_id(id: i32) -> Result<MovieId, ApiError> {
    if id <= 0 {
        return Err(ApiError::validation(format!(
            "Invalid movie ID: {id}. ID must be a positive integer"
        )));
    }
    Ok(MovieId::new(id))
}

/// Trims an optional free-text field; blank becomes `None`.
pub fn optional_text(
    value: Option<String>,
    field: &str,
    max_len: usize,
) -> Result<Option<String>, ApiError> {
    let Some(value) = value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
    else {
        return Ok(None);
    };

    if value.chars().count() > max_len {
        return Err(ApiError::validation(format!(
            "{field} must be {max_len} characters or less"
        )));
    }

    Ok(Some(value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn page_defaults_and_bounds() {
        assert_eq!(validate_page(None).unwrap().value(), 1);
        assert_eq!(validate_page(Some(3)).unwrap().value(), 3);
        assert!(validate_page(Some(0)).is_err());
        assert!(validate_page(Some(-2)).is_err());
        assert!(validate_page(Some(501)).is_err());
    }

    #[test]
    fn search_query_must_not_be_blank() {
        assert!(validate_search_query(None).is_err());
        assert!(validate_search_query(Some("   ")).is_err());
        assert_eq!(validate_search_query(Some(" heat ")).unwrap(), "heat");
    }

    #[test]
    fn movie_id_accepts_numbers_and_numeric_strings() {
        assert_eq!(validate_movie_id(Some(&json!(550))).unwrap().value(), 550);
        assert_eq!(validate_movie_id(Some(&json!("550"))).unwrap().value(), 550);
        assert!(validate_movie_id(None).is_err());
        assert!(validate_movie_id(Some(&json!(0))).is_err());
        assert!(validate_movie_id(Some(&json!("abc"))).is_err());
        assert!(validate_movie_id(Some(&json!(null))).is_err());
    }

    #[test]
    fn optional_text_trims_and_limits() {
        assert_eq!(optional_text(Some("  ".into()), "Category", 10).unwrap(), None);
        assert_eq!(
            optional_text(Some(" Noir ".into()), "Category", 10).unwrap(),
            Some("Noir".to_string())
        );
        assert!(optional_text(Some("x".repeat(11)), "Category", 10).is_err());
    }
}
