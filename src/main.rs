use clap::Parser;
use tokio::net::TcpListener;
use tracing::{error, info};

use herald_gateway::{config::Config, llm::Summarizer, utils::init_logger, AppState};

#[derive(Parser, Debug)]
#[command(name = "herald-gateway", version, about = "SALLTO Herald document summarization gateway")]
struct Cli {
    /// Bind host (overrides API_HOST)
    #[arg(long)]
    host: Option<String>,

    /// Bind port (overrides API_PORT)
    #[arg(long)]
    port: Option<u16>,

    /// Verbose logging (overrides DEBUG)
    #[arg(long)]
    debug: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Load configuration
    let mut config = Config::from_env()?;
    if let Some(host) = cli.host {
        config.server.host = host;
    }
    if let Some(port) = cli.port {
        config.server.port = port;
    }
    config.debug |= cli.debug;

    init_logger(config.debug, config.log_file.as_deref());
    info!("Loaded settings for {}", config.app_name);
    info!("Server configuration: {:?}", config.server);
    info!("LLM configuration: {:?}", config.llm);

    // Resolve the LLM backend once; missing credentials stop startup here
    let summarizer = Summarizer::from_config(&config.llm).map_err(|e| {
        error!("Failed to configure LLM backend: {}", e);
        anyhow::anyhow!("Configuration error: {}", e)
    })?;

    let addr = config.bind_address();
    let state = AppState::new(config, summarizer);
    let app = herald_gateway::create_router(state);

    let listener = TcpListener::bind(&addr).await?;
    info!("Server listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| anyhow::anyhow!("Server error: {}", e))?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to listen for Ctrl-C: {}", e);
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!("Failed to listen for SIGTERM: {}", e);
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

    info!("Shutdown signal received");
}
