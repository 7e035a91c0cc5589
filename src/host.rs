//! Host-platform collaborator seams.
//!
//! The commerce platform owns order storage and storefront URLs; this module
//! defines the traits the gateway consumes and an in-memory reference
//! implementation used by the demo binary and the test suite.

use std::collections::HashMap;
use std::fmt;
use std::sync::Mutex;

use serde::Serialize;

use crate::error::{GatewayError, Result};

/// Order metadata key holding the processor-assigned payment id.
pub const PAYMENT_ID_META: &str = "grateful_payment_id";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    Pending,
    Processing,
    Completed,
    Failed,
    Cancelled,
}

impl OrderStatus {
    /// Terminal for this integration: later signals must not silently revert.
    pub fn is_terminal(self) -> bool {
        matches!(self, OrderStatus::Completed | OrderStatus::Failed)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Processing => "processing",
            OrderStatus::Completed => "completed",
            OrderStatus::Failed => "failed",
            OrderStatus::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct OrderNote {
    /// Unix timestamp the note was recorded at.
    pub at: i64,
    pub text: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct Order {
    pub id: u64,
    /// Order total in minor currency units (e.g. cents).
    pub total_minor: i64,
    pub currency: String,
    pub status: OrderStatus,
    /// Settlement reference recorded when the order was marked paid.
    pub settlement_reference: Option<String>,
    pub metadata: HashMap<String, String>,
    pub notes: Vec<OrderNote>,
}

impl Order {
    pub fn new(id: u64, total_minor: i64, currency: &str) -> Self {
        Self {
            id,
            total_minor,
            currency: currency.to_string(),
            status: OrderStatus::Pending,
            settlement_reference: None,
            metadata: HashMap::new(),
            notes: Vec::new(),
        }
    }
}

/// Order storage owned by the host platform. The host serializes access;
/// the gateway introduces no locking of its own beyond what an
/// implementation needs internally.
pub trait OrderStore: Send + Sync {
    fn load_order(&self, id: u64) -> Result<Option<Order>>;
    /// Mark the order paid, recording the settlement reference.
    fn mark_paid(&self, id: u64, reference: Option<&str>) -> Result<()>;
    fn mark_failed(&self, id: u64, note: &str) -> Result<()>;
    fn mark_pending(&self, id: u64, note: &str) -> Result<()>;
    fn append_note(&self, id: u64, note: &str) -> Result<()>;
    fn set_metadata(&self, id: u64, key: &str, value: &str) -> Result<()>;
    fn get_metadata(&self, id: u64, key: &str) -> Result<Option<String>>;
}

/// Storefront destinations built by the host platform.
pub trait StorePages: Send + Sync {
    /// Checkout/cart page the shopper lands on after a failed or abandoned
    /// payment.
    fn checkout_url(&self) -> String;
    /// Thank-you/receipt page for the given order.
    fn receipt_url(&self, order: &Order) -> String;
}

/// Storefront destinations resolved from configuration.
#[derive(Debug, Clone)]
pub struct ConfiguredPages {
    checkout: String,
    receipt_base: String,
}

impl ConfiguredPages {
    pub fn new(checkout: impl Into<String>, receipt_base: impl Into<String>) -> Self {
        Self {
            checkout: checkout.into(),
            receipt_base: receipt_base.into(),
        }
    }
}

impl StorePages for ConfiguredPages {
    fn checkout_url(&self) -> String {
        self.checkout.clone()
    }

    fn receipt_url(&self, order: &Order) -> String {
        format!("{}?order_id={}", self.receipt_base, order.id)
    }
}

/// In-memory order store. Stands in for the host platform's storage in the
/// demo binary and the test suite.
#[derive(Default)]
pub struct MemoryOrderStore {
    orders: Mutex<HashMap<u64, Order>>,
}

impl MemoryOrderStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, order: Order) -> Result<()> {
        let mut orders = self.lock()?;
        orders.insert(order.id, order);
        Ok(())
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, HashMap<u64, Order>>> {
        self.orders
            .lock()
            .map_err(|_| GatewayError::Store("order store lock poisoned".into()))
    }

    fn with_order<T>(&self, id: u64, f: impl FnOnce(&mut Order) -> T) -> Result<T> {
        let mut orders = self.lock()?;
        let order = orders
            .get_mut(&id)
            .ok_or_else(|| GatewayError::NotFound(format!("Order {} not found", id)))?;
        Ok(f(order))
    }
}

fn push_note(order: &mut Order, text: &str) {
    order.notes.push(OrderNote {
        at: chrono::Utc::now().timestamp(),
        text: text.to_string(),
    });
}

impl OrderStore for MemoryOrderStore {
    fn load_order(&self, id: u64) -> Result<Option<Order>> {
        Ok(self.lock()?.get(&id).cloned())
    }

    fn mark_paid(&self, id: u64, reference: Option<&str>) -> Result<()> {
        self.with_order(id, |order| {
            order.status = OrderStatus::Completed;
            order.settlement_reference = reference.map(String::from);
        })
    }

    fn mark_failed(&self, id: u64, note: &str) -> Result<()> {
        self.with_order(id, |order| {
            order.status = OrderStatus::Failed;
            push_note(order, note);
        })
    }

    fn mark_pending(&self, id: u64, note: &str) -> Result<()> {
        self.with_order(id, |order| {
            order.status = OrderStatus::Pending;
            push_note(order, note);
        })
    }

    fn append_note(&self, id: u64, note: &str) -> Result<()> {
        self.with_order(id, |order| push_note(order, note))
    }

    fn set_metadata(&self, id: u64, key: &str, value: &str) -> Result<()> {
        self.with_order(id, |order| {
            order.metadata.insert(key.to_string(), value.to_string());
        })
    }

    fn get_metadata(&self, id: u64, key: &str) -> Result<Option<String>> {
        self.with_order(id, |order| order.metadata.get(key).cloned())
    }
}
