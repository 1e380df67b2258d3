use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;

use gate_relay::api::{self, AppState};
use gate_relay::cli;
use gate_relay::config::{self, Config};
use gate_relay::gate::GateCoordinator;
use gate_relay::notification::slack::SlackResponder;
use gate_relay::telemetry;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let mut cfg = config::load()?;
    let args = cli::Cli::parse();

    telemetry::init(cfg.log_json)?;

    if let Some(cli::Commands::Serve { port, timeout_secs }) = args.command {
        if let Some(port) = port {
            cfg.port = port;
        }
        if let Some(secs) = timeout_secs {
            cfg.confirm_timeout = Duration::from_secs(secs);
        }
    }

    let result = run_server(cfg).await;

    if let Err(ref e) = result {
        tracing::error!("server exited with error: {:?}", e);
    }
    telemetry::shutdown();
    result
}

async fn run_server(cfg: Config) -> anyhow::Result<()> {
    if cfg.slack_token.is_none() {
        tracing::warn!("SLACK_TOKEN is not set; every slash command will be rejected");
    }
    if cfg.api_token.is_none() {
        tracing::warn!("API_TOKEN is not set; gate confirmations will be rejected");
    }

    let responder = SlackResponder::new(cfg.notify_timeout)
        .context("failed to build Slack HTTP client")?;
    let coordinator = GateCoordinator::new(Arc::new(responder), cfg.confirm_timeout);

    let addr = SocketAddr::from(([0, 0, 0, 0], cfg.port));
    let confirm_timeout = cfg.confirm_timeout;
    let state = Arc::new(AppState {
        coordinator,
        config: cfg,
    });
    let app = api::router(state);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    tracing::info!(
        %addr,
        confirm_timeout_secs = confirm_timeout.as_secs_f64(),
        "gate relay listening"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("shutting down server");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("failed to listen for ctrl-c: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!("failed to listen for SIGTERM: {}", e);
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
}
