//! Payment initiation: create the remote session and hand the shopper the
//! processor-hosted redirect URL.

use axum::extract::State;
use serde::{Deserialize, Serialize};

use crate::client::CreatePaymentRequest;
use crate::error::{GatewayError, Result};
use crate::extractors::Json;
use crate::host::PAYMENT_ID_META;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CheckoutRequest {
    pub order_id: u64,
}

#[derive(Debug, Serialize)]
pub struct CheckoutResponse {
    /// Processor-hosted payment page the shopper must be sent to.
    pub redirect_url: String,
    pub payment_id: Option<String>,
}

pub async fn initiate_checkout(
    State(state): State<AppState>,
    Json(request): Json<CheckoutRequest>,
) -> Result<Json<CheckoutResponse>> {
    if !state.settings.enabled {
        return Err(GatewayError::Configuration(
            "Grateful gateway is disabled".into(),
        ));
    }

    let order = state
        .store
        .load_order(request.order_id)?
        .ok_or_else(|| GatewayError::NotFound(format!("Order {} not found", request.order_id)))?;

    let create = CreatePaymentRequest {
        fiat_amount: order.total_minor as f64 / 100.0,
        fiat_currency: order.currency.clone(),
        external_reference_id: order.id.to_string(),
        callback_url: format!(
            "{}/return?order_id={}",
            state.settings.public_base_url, order.id
        ),
    };

    let session = match state.api.create_payment(&create).await {
        Ok(session) => session,
        Err(e) => {
            tracing::error!("Failed to create Grateful payment for order {}: {}", order.id, e);
            // Non-fatal to the order record; this attempt failed and the
            // shopper can retry from checkout.
            state.store.mark_failed(
                order.id,
                "Failed to create payment in Grateful. Please check the API key and try again.",
            )?;
            return Err(e);
        }
    };

    // Park the order until a webhook or the return path settles it.
    let note = match &session.payment_id {
        Some(payment_id) => format!(
            "Payment created in Grateful. Redirecting shopper to complete payment. Payment ID: {}.",
            payment_id
        ),
        None => "Payment created in Grateful. Redirecting shopper to complete payment.".to_string(),
    };
    state.store.mark_pending(order.id, &note)?;

    // A re-attempt supersedes any previously stored payment id.
    if let Some(ref payment_id) = session.payment_id {
        state
            .store
            .set_metadata(order.id, PAYMENT_ID_META, payment_id)?;
    }

    tracing::info!(
        "Created Grateful payment for order {}: redirecting to {}",
        order.id,
        session.redirect_url
    );

    Ok(Json(CheckoutResponse {
        redirect_url: session.redirect_url,
        payment_id: session.payment_id,
    }))
}
