//! Test utilities and fixtures for gateway integration tests

#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::Router;

pub use grateful_gateway::client::{
    CreatePaymentRequest, PaymentApi, PaymentSession, StatusQueryResult,
};
pub use grateful_gateway::error::{GatewayError, Result};
pub use grateful_gateway::handlers;
pub use grateful_gateway::host::{
    ConfiguredPages, MemoryOrderStore, Order, OrderStatus, OrderStore, PAYMENT_ID_META,
};
pub use grateful_gateway::reconcile::{canonicalize, reconcile, CanonicalStatus, ReconcileOutcome};
pub use grateful_gateway::signature;
pub use grateful_gateway::state::{AppState, GatewaySettings};

pub const TEST_SECRET: &str = "whsec_test_secret";
pub const CHECKOUT_URL: &str = "https://shop.example/checkout";
pub const RECEIPT_BASE: &str = "https://shop.example/order-received";
pub const PUBLIC_BASE: &str = "https://shop.example/gateway";

/// Payment API stub with scripted responses, drained in call order.
#[derive(Default)]
pub struct StubPaymentApi {
    create_responses: Mutex<Vec<Result<PaymentSession>>>,
    status_responses: Mutex<Vec<Result<StatusQueryResult>>>,
    pub create_requests: Mutex<Vec<CreatePaymentRequest>>,
    pub status_requests: Mutex<Vec<String>>,
}

impl StubPaymentApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_create(&self, response: Result<PaymentSession>) {
        self.create_responses.lock().unwrap().push(response);
    }

    pub fn push_status(&self, response: Result<StatusQueryResult>) {
        self.status_responses.lock().unwrap().push(response);
    }

    /// An error the stub hands out when no response is scripted; stands in
    /// for an unreachable processor.
    pub fn remote_down() -> GatewayError {
        GatewayError::RemoteStatus(503)
    }
}

#[async_trait]
impl PaymentApi for StubPaymentApi {
    async fn create_payment(&self, request: &CreatePaymentRequest) -> Result<PaymentSession> {
        self.create_requests.lock().unwrap().push(request.clone());
        self.create_responses
            .lock()
            .unwrap()
            .pop()
            .unwrap_or_else(|| Err(Self::remote_down()))
    }

    async fn fetch_payment_status(&self, payment_id: &str) -> Result<StatusQueryResult> {
        self.status_requests.lock().unwrap().push(payment_id.to_string());
        self.status_responses
            .lock()
            .unwrap()
            .pop()
            .unwrap_or_else(|| Err(Self::remote_down()))
    }
}

pub fn session(payment_id: &str, redirect_url: &str) -> PaymentSession {
    PaymentSession {
        payment_id: Some(payment_id.to_string()),
        external_reference_id: "501".to_string(),
        redirect_url: redirect_url.to_string(),
        fiat_amount: 42.0,
        fiat_currency: "USD".to_string(),
        callback_url: String::new(),
    }
}

pub fn status_result(status: &str) -> StatusQueryResult {
    StatusQueryResult {
        status: status.to_string(),
        extra: serde_json::Map::new(),
    }
}

pub struct TestHarness {
    pub state: AppState,
    pub store: Arc<MemoryOrderStore>,
    pub api: Arc<StubPaymentApi>,
}

pub fn harness(api: StubPaymentApi) -> TestHarness {
    harness_with_secret(api, TEST_SECRET)
}

pub fn harness_with_secret(api: StubPaymentApi, secret: &str) -> TestHarness {
    let store = Arc::new(MemoryOrderStore::new());
    let api = Arc::new(api);
    let state = AppState {
        store: store.clone(),
        pages: Arc::new(ConfiguredPages::new(CHECKOUT_URL, RECEIPT_BASE)),
        api: api.clone(),
        settings: GatewaySettings {
            enabled: true,
            secret_key: secret.to_string(),
            public_base_url: PUBLIC_BASE.to_string(),
        },
    };
    TestHarness { state, store, api }
}

pub fn gateway_app(state: AppState) -> Router {
    handlers::router(true).with_state(state)
}

pub fn seed_order(store: &MemoryOrderStore, id: u64, total_minor: i64, currency: &str) {
    store
        .insert(Order::new(id, total_minor, currency))
        .expect("Failed to seed order");
}

/// Seed an order that already went through checkout: pending with a stored
/// payment id.
pub fn seed_initiated_order(store: &MemoryOrderStore, id: u64, payment_id: &str) {
    seed_order(store, id, 42_00, "USD");
    store
        .set_metadata(id, PAYMENT_ID_META, payment_id)
        .expect("Failed to store payment id");
}

pub fn load_order(store: &MemoryOrderStore, id: u64) -> Order {
    store
        .load_order(id)
        .expect("Failed to load order")
        .expect("Order should exist")
}

/// Compute the webhook signature the way the processor does: HMAC-SHA256
/// over the raw body, hex-encoded.
pub fn sign_body(body: &[u8], secret: &str) -> String {
    use hmac::{Hmac, Mac};
    use sha2::Sha256;

    type HmacSha256 = Hmac<Sha256>;

    let mut mac =
        HmacSha256::new_from_slice(secret.as_bytes()).expect("HMAC can take key of any size");
    mac.update(body);
    hex::encode(mac.finalize().into_bytes())
}

/// Count the notes on an order containing the given fragment.
pub fn notes_containing(order: &Order, fragment: &str) -> usize {
    order.notes.iter().filter(|n| n.text.contains(fragment)).count()
}
