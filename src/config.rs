use std::env;

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    /// Public base URL of this service. Callback and return URLs handed to
    /// the processor are built from it.
    pub public_base_url: String,
    /// Base URL of the Grateful API.
    pub api_url: String,
    /// API key for outbound Grateful calls. Empty means not configured.
    pub api_key: String,
    /// Shared secret for webhook signature verification. Empty means signing
    /// is not configured.
    pub secret_key: String,
    /// Capability flag: when false, only /health is served.
    pub enabled: bool,
    /// Storefront checkout/cart page for failed-payment redirects.
    pub checkout_url: String,
    /// Storefront receipt page base; the order id is appended as a query param.
    pub receipt_url: String,
    pub dev_mode: bool,
}

impl Config {
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        let dev_mode = env::var("GRATEFUL_ENV")
            .map(|v| v == "dev" || v == "development")
            .unwrap_or(false);

        let host = env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port: u16 = env::var("PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(8080);

        let public_base_url = env::var("PUBLIC_BASE_URL")
            .unwrap_or_else(|_| format!("http://{}:{}", host, port));

        Self {
            host,
            port,
            public_base_url,
            api_url: env::var("GRATEFUL_API_URL")
                .unwrap_or_else(|_| "http://localhost:3000".to_string()),
            api_key: env::var("GRATEFUL_API_KEY").unwrap_or_default(),
            secret_key: env::var("GRATEFUL_SECRET_KEY").unwrap_or_default(),
            enabled: env::var("GRATEFUL_ENABLED")
                .map(|v| !matches!(v.to_lowercase().as_str(), "0" | "false" | "no"))
                .unwrap_or(true),
            checkout_url: env::var("STORE_CHECKOUT_URL")
                .unwrap_or_else(|_| "/checkout".to_string()),
            receipt_url: env::var("STORE_RECEIPT_URL")
                .unwrap_or_else(|_| "/order-received".to_string()),
            dev_mode,
        }
    }

    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
