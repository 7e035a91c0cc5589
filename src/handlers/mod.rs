pub mod checkout;
pub mod return_path;
pub mod webhook;

pub use checkout::initiate_checkout;
pub use return_path::handle_return;
pub use webhook::handle_grateful_webhook;

use axum::{
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;

use crate::state::AppState;

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// Build the gateway router.
///
/// The `enabled` capability flag is resolved once at startup; a disabled
/// gateway still answers health checks but registers no payment routes.
pub fn router(enabled: bool) -> Router<AppState> {
    let mut router = Router::new().route("/health", get(health));
    if enabled {
        router = router
            .route("/checkout", post(initiate_checkout))
            .route("/return", get(handle_return))
            .route("/webhook/grateful", post(handle_grateful_webhook));
    }
    router
}
