//! Push-path reconciliation: the processor's server-to-server webhook.

use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
};
use serde::Deserialize;

use crate::host::PAYMENT_ID_META;
use crate::reconcile;
use crate::signature::{self, SIGNATURE_HEADER};
use crate::state::AppState;

/// Status + message pair returned straight to the processor.
///
/// Business no-ops answer 200 so the processor only retries on genuine
/// delivery failure.
pub type WebhookReply = (StatusCode, &'static str);

#[derive(Debug, Deserialize)]
struct WebhookPayload {
    #[serde(rename = "externalReferenceId", alias = "external_reference_id")]
    external_reference_id: Option<String>,
    status: Option<String>,
}

pub async fn handle_grateful_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> WebhookReply {
    let payload: WebhookPayload = match serde_json::from_slice(&body) {
        Ok(payload) => payload,
        Err(e) => {
            tracing::debug!("Rejected webhook with malformed body: {}", e);
            return (StatusCode::BAD_REQUEST, "Invalid JSON");
        }
    };

    // Verify against the exact raw bytes before trusting anything in them.
    let provided = headers.get(SIGNATURE_HEADER).and_then(|v| v.to_str().ok());
    if !signature::verify(&body, provided, state.settings.secret()) {
        tracing::warn!("Rejected Grateful webhook with invalid signature");
        return (StatusCode::UNAUTHORIZED, "Invalid signature");
    }

    let Some(reference) = payload.external_reference_id else {
        return (StatusCode::BAD_REQUEST, "Missing external reference");
    };
    let Ok(order_id) = reference.parse::<u64>() else {
        return (StatusCode::BAD_REQUEST, "Malformed external reference");
    };

    let order = match state.store.load_order(order_id) {
        Ok(Some(order)) => order,
        Ok(None) => return (StatusCode::NOT_FOUND, "Unknown order"),
        Err(e) => {
            tracing::error!("Order lookup failed for webhook: {}", e);
            return (StatusCode::INTERNAL_SERVER_ERROR, "Order store error");
        }
    };

    let payment_id = order.metadata.get(PAYMENT_ID_META).cloned();
    let status = payload.status.unwrap_or_default();

    match reconcile::reconcile(state.store.as_ref(), &order, payment_id.as_deref(), &status) {
        Ok(outcome) => {
            tracing::info!(
                "Grateful webhook for order {}: status {:?} -> {:?}",
                order_id,
                status,
                outcome
            );
            (StatusCode::OK, "OK")
        }
        Err(e) => {
            tracing::error!("Failed to reconcile webhook for order {}: {}", order_id, e);
            (StatusCode::INTERNAL_SERVER_ERROR, "Order store error")
        }
    }
}
