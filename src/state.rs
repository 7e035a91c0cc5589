use std::sync::Arc;

use crate::client::PaymentApi;
use crate::host::{OrderStore, StorePages};

/// Gateway configuration snapshot resolved once at startup.
#[derive(Debug, Clone)]
pub struct GatewaySettings {
    /// Capability flag for the whole integration.
    pub enabled: bool,
    /// Shared secret for webhook signatures. Empty means signing is not
    /// configured.
    pub secret_key: String,
    /// Public base URL this service is reachable at; callback and return
    /// URLs are built from it.
    pub public_base_url: String,
}

impl GatewaySettings {
    pub fn secret(&self) -> Option<&str> {
        if self.secret_key.is_empty() {
            None
        } else {
            Some(&self.secret_key)
        }
    }
}

/// Application state shared by all handlers. Constructed explicitly in the
/// binary's startup sequence; there is no ambient global.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn OrderStore>,
    pub pages: Arc<dyn StorePages>,
    pub api: Arc<dyn PaymentApi>,
    pub settings: GatewaySettings,
}
