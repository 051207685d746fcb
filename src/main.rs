use anyhow::{Context, Result};
use fedex_shipper::{
    auth::LoginGate,
    carrier::FedexClient,
    config::Config,
    server::{self, AppState},
    workflow::ShipmentWorkflow,
};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::from_path("config/fedex/.env").ok();
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = match Config::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("{}", e);
            std::process::exit(1);
        }
    };

    let client = FedexClient::new(&config)?;

    // Fail fast on a bad address file or an origin set that does not match it.
    if let Err(e) = client.addresses().ensure_origins(&config.valid_origins) {
        eprintln!("{}", e);
        std::process::exit(1);
    }

    let state = AppState::new(
        ShipmentWorkflow::new(Arc::new(client)),
        config.valid_origins.clone(),
        config.auth.as_ref().map(LoginGate::new),
    );

    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .with_context(|| format!("Failed to bind {}", config.bind_addr))?;

    tracing::info!(
        addr = %config.bind_addr,
        origins = %config.valid_origins.join(", "),
        login_gate = config.auth.is_some(),
        "Listening"
    );

    axum::serve(listener, server::router(state))
        .await
        .context("Server error")?;

    Ok(())
}
