//! Maps service errors onto HTTP status codes and JSON bodies.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;

use crate::core::{NewsError, SearchError};

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ApiError {
    /// 400
    #[error("{0}")]
    BadRequest(String),

    /// 404
    #[error("Not found")]
    NotFound,

    /// 502. The body carries an empty `items` list so clients can render an
    /// empty feed.
    #[error("Unable to fetch news for this ticker.")]
    NewsUnavailable,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let message = self.to_string();
        match self {
            ApiError::BadRequest(_) => {
                (StatusCode::BAD_REQUEST, Json(json!({ "error": message }))).into_response()
            }
            ApiError::NotFound => {
                (StatusCode::NOT_FOUND, Json(json!({ "error": message }))).into_response()
            }
            ApiError::NewsUnavailable => (
                StatusCode::BAD_GATEWAY,
                Json(json!({ "error": message, "items": [] })),
            )
                .into_response(),
        }
    }
}

impl From<SearchError> for ApiError {
    fn from(err: SearchError) -> Self {
        match err {
            SearchError::EmptyQuery => {
                ApiError::BadRequest("Query parameter 'q' is required.".to_string())
            }
        }
    }
}

impl From<NewsError> for ApiError {
    fn from(err: NewsError) -> Self {
        match err {
            NewsError::EmptyTicker => ApiError::BadRequest(
                "Query parameter 'ticker' is required (e.g. AAPL).".to_string(),
            ),
            // The cause is logged by the news service; clients get a fixed message.
            NewsError::Unavailable { .. } => ApiError::NewsUnavailable,
        }
    }
}
