use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

/// Error taxonomy for the gateway. Client-input problems map to 4xx,
/// anything a third party did wrong maps to 5xx with the upstream detail
/// preserved in the body for diagnosis. Authentication-exchange failures
/// never surface here; they resolve to a login route instead.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("{0}")]
    BadRequest(String),

    /// A feature whose upstream provider was not configured at startup.
    #[error("{0} is not configured")]
    Unconfigured(&'static str),

    /// Upstream replied, but with nothing usable.
    #[error("{0}")]
    NoData(String),

    #[error("upstream request failed: {detail}")]
    Upstream {
        status: Option<u16>,
        detail: String,
    },

    #[error("internal error: {0}")]
    Internal(#[from] Box<dyn std::error::Error + Send + Sync>),
}

impl AppError {
    pub fn upstream(status: Option<u16>, detail: impl Into<String>) -> Self {
        AppError::Upstream {
            status,
            detail: detail.into(),
        }
    }
}

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        AppError::Upstream {
            status: err.status().map(|s| s.as_u16()),
            detail: err.to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, body) = match &self {
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, json!({ "error": msg })),
            AppError::Unconfigured(_) => {
                (StatusCode::SERVICE_UNAVAILABLE, json!({ "error": self.to_string() }))
            }
            AppError::NoData(msg) => (StatusCode::BAD_GATEWAY, json!({ "error": msg })),
            AppError::Upstream { status, detail } => (
                StatusCode::BAD_GATEWAY,
                json!({
                    "error": "upstream request failed",
                    "upstream_status": status,
                    "details": detail,
                }),
            ),
            AppError::Internal(e) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                json!({ "error": e.to_string() }),
            ),
        };

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bad_request_maps_to_400() {
        let resp = AppError::BadRequest("messages must be array".into()).into_response();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn upstream_and_no_data_map_to_502() {
        let resp = AppError::upstream(Some(503), "classifier down").into_response();
        assert_eq!(resp.status(), StatusCode::BAD_GATEWAY);

        let resp = AppError::NoData("no prediction data received".into()).into_response();
        assert_eq!(resp.status(), StatusCode::BAD_GATEWAY);
    }

    #[test]
    fn unconfigured_maps_to_503() {
        let resp = AppError::Unconfigured("weather lookup").into_response();
        assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);
    }
}
