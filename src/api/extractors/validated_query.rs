//! Validated query string extractor.

use axum::{
    async_trait,
    extract::{FromRequestParts, Query},
    http::request::Parts,
};
use serde::de::DeserializeOwned;
use validator::Validate;

use super::validated_json::format_validation_errors;
use crate::errors::AppError;

/// Query parameters that deserialized and passed their `validator` rules.
pub struct ValidatedQuery<T>(pub T);

#[async_trait]
impl<S, T> FromRequestParts<S> for ValidatedQuery<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Validate,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(value) = Query::<T>::from_request_parts(parts, state)
            .await
            .map_err(|e| AppError::validation(e.body_text()))?;

        value
            .validate()
            .map_err(|e| AppError::validation(format_validation_errors(&e)))?;

        Ok(ValidatedQuery(value))
    }
}

#[cfg(test)]
mod tests {
    use axum::http::Request;

    use super::*;
    use crate::types::PaginationParams;

    async fn extract(uri: &str) -> Result<PaginationParams, AppError> {
        let (mut parts, _) = Request::builder().uri(uri).body(()).unwrap().into_parts();
        ValidatedQuery::<PaginationParams>::from_request_parts(&mut parts, &())
            .await
            .map(|ValidatedQuery(params)| params)
    }

    #[tokio::test]
    async fn test_defaults_apply_without_query() {
        let params = extract("/games").await.unwrap();
        assert_eq!(params, PaginationParams::default());
    }

    #[tokio::test]
    async fn test_non_numeric_page_is_validation_error() {
        assert!(matches!(extract("/games?page=abc").await, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_huge_page_is_validation_error() {
        let uri = format!("/games?page={}", u64::MAX);
        match extract(&uri).await {
            Err(AppError::Validation(msg)) => assert!(msg.starts_with("Page must be at most")),
            _ => panic!("expected a validation error"),
        }
    }
}
