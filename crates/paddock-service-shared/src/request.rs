//! Query types and extractors for HTTP endpoints.
//!
//! Every endpoint declares its query as a [`QueryParams`] type. The
//! [`ValidatedQuery`] extractor runs the raw query string through the type's
//! [`QuerySpec`] and rejects with the standard error envelope, so handlers
//! only ever see validated, typed input.

use std::collections::HashMap;

use axum::extract::{FromRequestParts, Path, Query};
use axum::http::request::Parts;
use once_cell::sync::Lazy;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::error::ApiError;
use crate::metrics::record_query_rejected;
use crate::middleware::route_label;
use crate::params::{validate, ParamSpec, QuerySpec, Rule, Transform, ValidatedParams};

/// Typed query for one endpoint.
pub trait QueryParams: Sized {
    /// Parameters the endpoint accepts.
    fn spec() -> &'static QuerySpec;

    /// Build the typed query from validated parameters.
    fn from_validated(params: ValidatedParams) -> Self;

    /// Validate a raw query and convert it.
    fn parse(raw: &HashMap<String, String>) -> Result<Self, ApiError> {
        validate(raw, Self::spec()).map(Self::from_validated)
    }
}

/// Query of endpoints that accept no parameters at all.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NoParams;

static NO_PARAMS: Lazy<QuerySpec> = Lazy::new(QuerySpec::new);

impl QueryParams for NoParams {
    fn spec() -> &'static QuerySpec {
        &NO_PARAMS
    }

    fn from_validated(_: ValidatedParams) -> Self {
        NoParams
    }
}

/// Query of the track map endpoint.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TrackQuery {
    /// Upper-cased three-letter driver code.
    pub driver: Option<String>,
}

static TRACK_QUERY: Lazy<QuerySpec> = Lazy::new(|| {
    QuerySpec::new().param(
        ParamSpec::string("driver")
            .rule(Rule::Alphabetic { len: 3 })
            .message("Driver must be a 3-letter code")
            .transform(Transform::Uppercase),
    )
});

impl QueryParams for TrackQuery {
    fn spec() -> &'static QuerySpec {
        &TRACK_QUERY
    }

    fn from_validated(params: ValidatedParams) -> Self {
        Self {
            driver: params.get_str("driver").map(String::from),
        }
    }
}

/// Extractor yielding a validated [`QueryParams`] type.
#[derive(Debug, Clone)]
pub struct ValidatedQuery<T>(pub T);

impl<S, T> FromRequestParts<S> for ValidatedQuery<T>
where
    S: Send + Sync,
    T: QueryParams,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let endpoint = route_label(&parts.extensions);
        let raw = match Query::<Vec<(String, String)>>::try_from_uri(&parts.uri) {
            Ok(Query(pairs)) => first_occurrences(pairs),
            Err(rejection) => {
                record_query_rejected(&endpoint);
                let mut details = Map::new();
                details.insert("query".to_string(), Value::from(rejection.body_text()));
                return Err(ApiError::invalid_query_params(details));
            }
        };

        T::parse(&raw).map(ValidatedQuery).map_err(|error| {
            record_query_rejected(&endpoint);
            tracing::debug!(details = ?error.details, "rejected query parameters");
            error
        })
    }
}

/// Collapse repeated keys, keeping the first value given.
fn first_occurrences(pairs: Vec<(String, String)>) -> HashMap<String, String> {
    let mut raw = HashMap::with_capacity(pairs.len());
    for (key, value) in pairs {
        raw.entry(key).or_insert(value);
    }
    raw
}

/// Path extractor that rejects with a 404 envelope instead of plain text.
#[derive(Debug, Clone)]
pub struct ApiPath<T>(pub T);

impl<S, T> FromRequestParts<S> for ApiPath<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Send,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        match Path::<T>::from_request_parts(parts, state).await {
            Ok(Path(value)) => Ok(ApiPath(value)),
            Err(rejection) => {
                tracing::debug!(error = %rejection.body_text(), "path did not match");
                Err(ApiError::new(
                    axum::http::StatusCode::NOT_FOUND,
                    "Resource not found",
                ))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::UNEXPECTED_KEY;
    use axum::http::Request;

    fn raw(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_track_query_upper_cases_driver() {
        let query = TrackQuery::parse(&raw(&[("driver", "ver")])).unwrap();
        assert_eq!(query.driver.as_deref(), Some("VER"));
    }

    #[test]
    fn test_track_query_driver_optional() {
        let query = TrackQuery::parse(&HashMap::new()).unwrap();
        assert_eq!(query.driver, None);
    }

    #[test]
    fn test_track_query_rejects_bad_driver() {
        for bad in ["VE", "VERS", "V3R", ""] {
            let err = TrackQuery::parse(&raw(&[("driver", bad)])).unwrap_err();
            assert_eq!(err.code, "invalid_query_params", "driver={bad}");
            assert!(err.details.contains_key("driver"));
        }
    }

    #[test]
    fn test_no_params_rejects_everything() {
        let err = NoParams::parse(&raw(&[("foo", "bar")])).unwrap_err();
        assert_eq!(err.details[UNEXPECTED_KEY], serde_json::json!(["foo"]));
    }

    #[test]
    fn test_track_query_reports_driver_and_unexpected_together() {
        let err = TrackQuery::parse(&raw(&[("driver", "1"), ("lap", "2")])).unwrap_err();
        assert!(err.details.contains_key("driver"));
        assert_eq!(err.details[UNEXPECTED_KEY], serde_json::json!(["lap"]));
    }

    #[tokio::test]
    async fn test_validated_query_extractor() {
        let (mut parts, _) = Request::builder()
            .uri("/api/v1/sessions/2024/1/R/track?driver=lec")
            .body(())
            .unwrap()
            .into_parts();
        let ValidatedQuery(query) =
            ValidatedQuery::<TrackQuery>::from_request_parts(&mut parts, &())
                .await
                .unwrap();
        assert_eq!(query.driver.as_deref(), Some("LEC"));
    }

    #[tokio::test]
    async fn test_validated_query_repeated_key_keeps_first() {
        let (mut parts, _) = Request::builder()
            .uri("/api/v1/sessions/2024/1/R/track?driver=ver&driver=ham")
            .body(())
            .unwrap()
            .into_parts();
        let ValidatedQuery(query) =
            ValidatedQuery::<TrackQuery>::from_request_parts(&mut parts, &())
                .await
                .unwrap();
        assert_eq!(query.driver.as_deref(), Some("VER"));
    }

    #[test]
    fn test_first_occurrences() {
        let pairs = vec![
            ("driver".to_string(), "ver".to_string()),
            ("lap".to_string(), "3".to_string()),
            ("driver".to_string(), "1".to_string()),
        ];
        assert_eq!(
            first_occurrences(pairs),
            raw(&[("driver", "ver"), ("lap", "3")])
        );
    }

    #[tokio::test]
    async fn test_validated_query_extractor_rejects_unknown() {
        let (mut parts, _) = Request::builder()
            .uri("/api/v1/events/seasons?year=2024")
            .body(())
            .unwrap()
            .into_parts();
        let err = ValidatedQuery::<NoParams>::from_request_parts(&mut parts, &())
            .await
            .unwrap_err();
        assert_eq!(err.status, 400);
        assert_eq!(err.details[UNEXPECTED_KEY], serde_json::json!(["year"]));
    }
}
