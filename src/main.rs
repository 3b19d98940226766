use anyhow::Result;
use drive_gateway::{
    config, routes,
    services::{drive, gateway_service::GatewayService},
};
use std::io::ErrorKind;
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // --- Logging setup ---
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // --- Parse config ---
    let cfg = config::AppConfig::from_env_and_args()?;

    tracing::info!("Starting drive-gateway with config: {:?}", cfg);

    // --- Initialize core service ---
    let backend = drive::build_backend(&cfg)?;
    let service = GatewayService::new(backend, cfg.folder_id.clone(), cfg.thumbnails.clone());
    tracing::info!(
        folder_id = %cfg.folder_id,
        thumbnails = cfg.thumbnails.as_str(),
        "Serving Drive folder"
    );

    // --- Build router ---
    let app = routes::routes::app(service, &cfg);

    // --- Start server ---
    let addr = cfg.addr();
    let listener = match TcpListener::bind(&addr).await {
        Ok(listener) => listener,
        Err(err)
            if err.kind() == ErrorKind::PermissionDenied
                && matches!(cfg.host.as_str(), "0.0.0.0" | "::") =>
        {
            let fallback_addr = format!("127.0.0.1:{}", cfg.port);
            tracing::warn!(
                "Permission denied binding to {} ({}). Falling back to {}",
                addr,
                err,
                fallback_addr
            );
            TcpListener::bind(&fallback_addr).await?
        }
        Err(err) => return Err(err.into()),
    };

    tracing::info!("Server listening on http://{}", listener.local_addr()?);
    axum::serve(listener, app).await?;

    Ok(())
}
