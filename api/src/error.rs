use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use shared::MarketDataError;
use thiserror::Error;
use tracing::error;

/// Errors returned by the JSON endpoints as `{"error": ...}`
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    NotFound(String),

    #[error("market data provider failed: {0}")]
    BadGateway(String),

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::BadGateway(_) => StatusCode::BAD_GATEWAY,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<MarketDataError> for ApiError {
    fn from(err: MarketDataError) -> Self {
        match err {
            MarketDataError::InvalidSymbol(_) => ApiError::BadRequest(err.to_string()),
            MarketDataError::NoData(_) => ApiError::NotFound(err.to_string()),
            MarketDataError::Http { .. } | MarketDataError::Provider { .. } => {
                ApiError::BadGateway(err.to_string())
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!("{}: {:#}", status, self);
        }
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_market_data_error_status() {
        let cases = [
            (MarketDataError::InvalidSymbol("B/TC".into()), StatusCode::BAD_REQUEST),
            (MarketDataError::NoData("NOPE-USD".into()), StatusCode::NOT_FOUND),
            (
                MarketDataError::Provider {
                    code: "Bad Request".into(),
                    description: "Invalid input".into(),
                },
                StatusCode::BAD_GATEWAY,
            ),
        ];
        for (err, status) in cases {
            assert_eq!(ApiError::from(err).status(), status);
        }
    }
}
