//! The payment-status reconciliation state machine.
//!
//! Two uncorrelated signal sources feed this module: the processor's webhook
//! and the live status fetch on browser return. They may arrive in either
//! order, concurrently, or repeatedly, so every transition is an idempotent
//! merge: terminal states stick, duplicates are no-ops, and unrecognized
//! vocabulary changes nothing.

use crate::error::Result;
use crate::host::{Order, OrderStatus, OrderStore};

/// Normalized three-way payment status derived from the processor's raw
/// vocabulary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CanonicalStatus {
    Paid,
    Failed,
    Pending,
    Unknown,
}

pub fn canonicalize(raw: &str) -> CanonicalStatus {
    match raw.to_ascii_lowercase().as_str() {
        "completed" | "success" => CanonicalStatus::Paid,
        "failed" | "error" => CanonicalStatus::Failed,
        "pending" | "processing" => CanonicalStatus::Pending,
        _ => CanonicalStatus::Unknown,
    }
}

/// What a reconciliation attempt did to the order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReconcileOutcome {
    /// The order moved to the canonical target status.
    Applied(CanonicalStatus),
    /// Duplicate of a signal already applied; nothing changed.
    AlreadyApplied,
    /// A pending signal arrived after a terminal status; ignored.
    StaleSignal,
    /// paid-after-failed or failed-after-paid; ignored and noted.
    ConflictingTerminal,
    /// Vocabulary we do not recognize; order untouched, anomaly noted.
    UnknownStatus,
}

fn payment_ref(payment_id: Option<&str>) -> String {
    match payment_id {
        Some(id) => format!(" Payment ID: {}.", id),
        None => String::new(),
    }
}

/// Apply a processor-sourced status to the order.
///
/// `remote_status` must come from the processor itself (webhook payload or
/// live status query) - never from the shopper's query string.
pub fn reconcile(
    store: &dyn OrderStore,
    order: &Order,
    payment_id: Option<&str>,
    remote_status: &str,
) -> Result<ReconcileOutcome> {
    match canonicalize(remote_status) {
        CanonicalStatus::Paid => {
            if order.status == OrderStatus::Completed {
                return Ok(ReconcileOutcome::AlreadyApplied);
            }
            if order.status == OrderStatus::Failed {
                return conflicting_terminal(store, order, payment_id, remote_status);
            }
            store.mark_paid(order.id, payment_id)?;
            store.append_note(
                order.id,
                &format!("Payment completed via Grateful.{}", payment_ref(payment_id)),
            )?;
            Ok(ReconcileOutcome::Applied(CanonicalStatus::Paid))
        }
        CanonicalStatus::Failed => {
            if order.status == OrderStatus::Failed {
                return Ok(ReconcileOutcome::AlreadyApplied);
            }
            if order.status == OrderStatus::Completed {
                return conflicting_terminal(store, order, payment_id, remote_status);
            }
            store.mark_failed(
                order.id,
                &format!("Payment failed in Grateful.{}", payment_ref(payment_id)),
            )?;
            Ok(ReconcileOutcome::Applied(CanonicalStatus::Failed))
        }
        CanonicalStatus::Pending => {
            if order.status.is_terminal() {
                tracing::warn!(
                    "Late pending signal for settled order {} ({}); ignoring",
                    order.id,
                    order.status
                );
                return Ok(ReconcileOutcome::StaleSignal);
            }
            store.mark_pending(
                order.id,
                &format!("Payment is pending in Grateful.{}", payment_ref(payment_id)),
            )?;
            Ok(ReconcileOutcome::Applied(CanonicalStatus::Pending))
        }
        CanonicalStatus::Unknown => {
            tracing::warn!(
                "Unrecognized Grateful status {:?} for order {}",
                remote_status,
                order.id
            );
            store.append_note(
                order.id,
                &format!(
                    "Unrecognized Grateful payment status \"{}\"; order status left unchanged.{}",
                    remote_status,
                    payment_ref(payment_id)
                ),
            )?;
            Ok(ReconcileOutcome::UnknownStatus)
        }
    }
}

fn conflicting_terminal(
    store: &dyn OrderStore,
    order: &Order,
    payment_id: Option<&str>,
    remote_status: &str,
) -> Result<ReconcileOutcome> {
    tracing::warn!(
        "Conflicting Grateful signal {:?} for order {} already {}; ignoring",
        remote_status,
        order.id,
        order.status
    );
    store.append_note(
        order.id,
        &format!(
            "Conflicting Grateful signal \"{}\" ignored; order is already {}.{}",
            remote_status,
            order.status,
            payment_ref(payment_id)
        ),
    )?;
    Ok(ReconcileOutcome::ConflictingTerminal)
}
