//! Pull-path reconciliation: the shopper's browser returning from the
//! processor-hosted payment page.
//!
//! Order mutation only ever uses the live status fetched from the processor.
//! The query-string hint is untrusted; it decides where the browser bounces
//! when the processor cannot be reached, and nothing else.

use axum::{extract::State, response::Redirect};
use serde::Deserialize;

use crate::extractors::Query;
use crate::host::{Order, PAYMENT_ID_META};
use crate::reconcile::{self, CanonicalStatus};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ReturnQuery {
    #[serde(default)]
    pub order_id: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
}

pub async fn handle_return(
    State(state): State<AppState>,
    Query(query): Query<ReturnQuery>,
) -> Redirect {
    let checkout = state.pages.checkout_url();

    let Some(order_id) = query.order_id.as_deref().and_then(|v| v.parse::<u64>().ok()) else {
        return Redirect::temporary(&checkout);
    };

    let order = match state.store.load_order(order_id) {
        Ok(Some(order)) => order,
        Ok(None) => return Redirect::temporary(&checkout),
        Err(e) => {
            tracing::error!("Order lookup failed on return path: {}", e);
            return Redirect::temporary(&checkout);
        }
    };

    // Only orders that were actually handed to Grateful carry a payment id.
    let payment_id = match order.metadata.get(PAYMENT_ID_META) {
        Some(payment_id) => payment_id.clone(),
        None => return Redirect::temporary(&checkout),
    };

    match state.api.fetch_payment_status(&payment_id).await {
        Ok(result) => {
            if let Err(e) =
                reconcile::reconcile(state.store.as_ref(), &order, Some(&payment_id), &result.status)
            {
                tracing::error!(
                    "Reconciliation failed on return path for order {}: {}",
                    order_id,
                    e
                );
            }
            Redirect::temporary(&live_destination(&state, &order, &result.status))
        }
        Err(e) => {
            tracing::warn!(
                "Live status fetch failed for payment {} (order {}): {}; falling back to URL hint",
                payment_id,
                order_id,
                e
            );
            Redirect::temporary(&hint_destination(&state, &order, query.status.as_deref()))
        }
    }
}

/// Routing on the authoritative status. Any money movement already happened
/// in the reconciler; this only decides where the browser goes.
fn live_destination(state: &AppState, order: &Order, raw_status: &str) -> String {
    match reconcile::canonicalize(raw_status) {
        CanonicalStatus::Paid | CanonicalStatus::Pending => state.pages.receipt_url(order),
        CanonicalStatus::Failed => state.pages.checkout_url(),
        CanonicalStatus::Unknown if raw_status.eq_ignore_ascii_case("expired") => {
            state.pages.checkout_url()
        }
        // The webhook stays the source of truth for the order itself; send
        // the shopper to the receipt.
        CanonicalStatus::Unknown => state.pages.receipt_url(order),
    }
}

/// Routing on the untrusted query hint alone. Never mutates the order.
fn hint_destination(state: &AppState, order: &Order, hint: Option<&str>) -> String {
    match hint.unwrap_or("").to_ascii_lowercase().as_str() {
        "success" => state.pages.receipt_url(order),
        "failed" | "expired" => state.pages.checkout_url(),
        _ => state.pages.receipt_url(order),
    }
}
