use std::{net::SocketAddr, sync::Arc};

use anyhow::Context;
use maizic_chatbot::{
    config::{AppConfig, LogFormat},
    routes,
    services::openai::OpenAiClient,
    state::AppState,
};
use tracing::info;
use tracing_subscriber::EnvFilter;

fn init_logging(config: &AppConfig) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt().with_env_filter(filter).with_target(false);

    match config.log_format {
        LogFormat::Json => builder.json().init(),
        LogFormat::Pretty => builder.pretty().init(),
        LogFormat::Compact => builder.compact().init(),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // Refuse to start without a usable configuration. Errors go to stderr through anyhow.
    let config = AppConfig::from_env().context("invalid configuration")?;
    init_logging(&config);
    info!(
        environment = config.environment.as_str(),
        models = ?config.models,
        debug_endpoint = config.debug_endpoint,
        "configuration loaded"
    );

    let client = OpenAiClient::new(
        config.api_base_url.clone(),
        config.api_key.clone(),
        config.request_timeout,
    )
    .context("failed to build completion client")?;

    let port = config.port;
    let state = Arc::new(AppState::new(config, Arc::new(client)));

    spawn_limiter_purge(&state);

    let app = routes::create_router(state);

    let listener = tokio::net::TcpListener::bind(("0.0.0.0", port))
        .await
        .with_context(|| format!("failed to bind port {port}"))?;

    info!("Maizic chatbot running at http://localhost:{port}");
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await
    .context("server terminated unexpectedly")?;

    info!("server stopped");
    Ok(())
}

fn spawn_limiter_purge(state: &Arc<AppState>) {
    if !state.limiter.is_enabled() {
        return;
    }

    let limiter = state.limiter.clone();
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(limiter.window());
        loop {
            ticker.tick().await;
            let removed = limiter.purge_expired().await;
            if removed > 0 {
                tracing::debug!(removed, "purged expired rate limit windows");
            }
        }
    });
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %err, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(err) => {
                tracing::error!(error = %err, "failed to listen for SIGTERM");
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

    info!("shutdown signal received");
}
