use std::sync::Arc;

use clap::Parser;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use grateful_gateway::client::GratefulClient;
use grateful_gateway::config::Config;
use grateful_gateway::handlers;
use grateful_gateway::host::{ConfiguredPages, MemoryOrderStore, Order};
use grateful_gateway::state::{AppState, GatewaySettings};

#[derive(Parser, Debug)]
#[command(name = "grateful-gateway")]
#[command(about = "Stablecoin payment gateway integration for commerce storefronts")]
struct Cli {
    /// Seed the in-memory order store with demo orders (dev mode only)
    #[arg(long)]
    seed: bool,
}

fn seed_demo_orders(store: &MemoryOrderStore) {
    tracing::info!("============================================");
    tracing::info!("SEEDING DEMO ORDERS");
    for (id, total_minor, currency) in [(501, 42_00, "USD"), (502, 19_99, "EUR"), (503, 125_00, "USD")] {
        store
            .insert(Order::new(id, total_minor, currency))
            .expect("Failed to seed demo order");
        tracing::info!("Order #{}: {:.2} {}", id, total_minor as f64 / 100.0, currency);
    }
    tracing::info!("============================================");
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "grateful_gateway=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env();

    if config.dev_mode {
        tracing::info!("Running in DEVELOPMENT mode");
    }

    // Operator notice: an enabled gateway with no API key cannot create payments.
    if config.enabled && config.api_key.is_empty() {
        tracing::warn!(
            "Grateful gateway is enabled but no API key has been set; payment creation will fail until GRATEFUL_API_KEY is configured"
        );
    }
    if !config.enabled {
        tracing::warn!("Grateful gateway is disabled; only /health is served");
    }

    let store = Arc::new(MemoryOrderStore::new());
    if cli.seed {
        if !config.dev_mode {
            tracing::warn!("--seed flag ignored: not in dev mode (set GRATEFUL_ENV=dev)");
        } else {
            seed_demo_orders(&store);
        }
    }

    // Explicit startup sequence: config -> client -> state -> routes.
    let state = AppState {
        store,
        pages: Arc::new(ConfiguredPages::new(
            config.checkout_url.clone(),
            config.receipt_url.clone(),
        )),
        api: Arc::new(GratefulClient::new(
            config.api_url.clone(),
            config.api_key.clone(),
        )),
        settings: GatewaySettings {
            enabled: config.enabled,
            secret_key: config.secret_key.clone(),
            public_base_url: config.public_base_url.clone(),
        },
    };

    let app = handlers::router(config.enabled)
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    let addr = config.addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("Failed to bind to address");

    tracing::info!("Grateful gateway listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Failed to start server");
}

async fn shutdown_signal() {
    tokio::signal::ctrl_c()
        .await
        .expect("Failed to install Ctrl+C handler");
    tracing::info!("Shutdown signal received, stopping server...");
}
