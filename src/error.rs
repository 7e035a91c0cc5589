use axum::{
    extract::rejection::{JsonRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum GatewayError {
    /// Gateway disabled or API key missing. Blocks outbound calls entirely.
    #[error("Gateway not configured: {0}")]
    Configuration(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Unauthorized")]
    Unauthorized,

    /// Network-level failure talking to the Grateful API, including timeouts.
    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The Grateful API answered with a non-success HTTP status.
    #[error("Grateful API returned HTTP {0}")]
    RemoteStatus(u16),

    /// The Grateful API answered 200 but the body was unusable.
    #[error("Malformed Grateful response: {0}")]
    MalformedResponse(String),

    /// Refund requested for an order that was never handed to Grateful.
    #[error("No payment reference stored for order {0}")]
    MissingPaymentReference(u64),

    /// The host platform's order store failed.
    #[error("Order store error: {0}")]
    Store(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<String>,
}

impl From<JsonRejection> for GatewayError {
    fn from(rejection: JsonRejection) -> Self {
        GatewayError::BadRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for GatewayError {
    fn from(rejection: QueryRejection) -> Self {
        GatewayError::BadRequest(rejection.body_text())
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let (status, error, details) = match &self {
            GatewayError::Configuration(msg) => {
                tracing::error!("Configuration error: {}", msg);
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    "Gateway not configured",
                    Some(msg.clone()),
                )
            }
            GatewayError::NotFound(msg) => (StatusCode::NOT_FOUND, "Not found", Some(msg.clone())),
            GatewayError::BadRequest(msg) => {
                (StatusCode::BAD_REQUEST, "Bad request", Some(msg.clone()))
            }
            GatewayError::Unauthorized => (StatusCode::UNAUTHORIZED, "Unauthorized", None),
            GatewayError::Transport(e) => {
                tracing::error!("Grateful API transport error: {}", e);
                (StatusCode::BAD_GATEWAY, "Payment processor unreachable", None)
            }
            GatewayError::RemoteStatus(code) => {
                tracing::error!("Grateful API returned HTTP {}", code);
                (StatusCode::BAD_GATEWAY, "Payment processor error", None)
            }
            GatewayError::MalformedResponse(msg) => {
                tracing::error!("Malformed Grateful response: {}", msg);
                (StatusCode::BAD_GATEWAY, "Payment processor error", None)
            }
            GatewayError::MissingPaymentReference(order_id) => (
                StatusCode::CONFLICT,
                "No payment reference",
                Some(format!("Order {} has no stored payment id", order_id)),
            ),
            GatewayError::Store(msg) => {
                tracing::error!("Order store error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error", None)
            }
            GatewayError::Json(e) => {
                tracing::error!("JSON error: {}", e);
                (StatusCode::BAD_REQUEST, "Invalid JSON", Some(e.to_string()))
            }
        };

        let body = ErrorResponse {
            error: error.to_string(),
            details,
        };

        (status, Json(body)).into_response()
    }
}

pub type Result<T> = std::result::Result<T, GatewayError>;
