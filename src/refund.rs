//! Refund pass-through surfaced to the host platform.

use crate::error::{GatewayError, Result};
use crate::host::{OrderStore, PAYMENT_ID_META};

/// Request a refund for an order paid through Grateful.
///
/// An order that was never handed to Grateful has no stored payment id and
/// surfaces a typed [`GatewayError::MissingPaymentReference`] to the host.
/// Processor-side refund settlement is not yet available upstream; the
/// request is recorded on the order so the trail stays complete.
pub fn request_refund(
    store: &dyn OrderStore,
    order_id: u64,
    amount_minor: i64,
    reason: &str,
) -> Result<()> {
    let order = store
        .load_order(order_id)?
        .ok_or_else(|| GatewayError::NotFound(format!("Order {} not found", order_id)))?;

    let payment_id = store
        .get_metadata(order_id, PAYMENT_ID_META)?
        .ok_or(GatewayError::MissingPaymentReference(order_id))?;

    let note = if reason.is_empty() {
        format!(
            "Refund of {:.2} {} requested via Grateful. Payment ID: {}.",
            amount_minor as f64 / 100.0,
            order.currency,
            payment_id
        )
    } else {
        format!(
            "Refund of {:.2} {} requested via Grateful ({}). Payment ID: {}.",
            amount_minor as f64 / 100.0,
            order.currency,
            reason,
            payment_id
        )
    };
    store.append_note(order_id, &note)?;

    tracing::info!(
        "Refund requested for order {} (payment {}): {} minor units",
        order_id,
        payment_id,
        amount_minor
    );

    Ok(())
}
