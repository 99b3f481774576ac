use phishguard::{config, model, observability, server};
use tokio::net::TcpListener;
use tokio::signal;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. Init
    observability::init_tracing();
    let metrics_handle = observability::init_metrics()?;

    // 2. Load Config
    let config_path = std::env::var(config::CONFIG_PATH_ENV)
        .unwrap_or_else(|_| config::DEFAULT_CONFIG_PATH.to_string());
    let config = config::AppConfig::load(&config_path)?;

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        model_path = %config.model.path,
        remote_id_configured = config.model.remote_id.is_some(),
        "Starting phishing detection service"
    );

    // 3. Provision and load the model before accepting traffic
    let model = model::bootstrap(&config.model).await;
    if model.is_none() {
        tracing::warn!("No model bound; /predict will answer 503 until restart");
    }
    let state = server::types::AppState::new(model);

    // 4. Create Router
    let app = server::routes::create_router(state, metrics_handle);

    // 5. Bind & Serve
    let listener = TcpListener::bind(config.bind_addr()).await?;
    tracing::info!(addr = %listener.local_addr()?, "Server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server shut down");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
