use std::{net::SocketAddr, path::PathBuf, sync::Arc};

use clap::Parser;
use eyre::WrapErr;
use spot_game_core::{GameConfig, GameController};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod error;
mod http_detector;
mod module_config;
mod routes;

use module_config::ModuleConfig;
use routes::{AppState, create_router};

#[derive(Parser, Debug)]
#[command(
    name = "game-server",
    version,
    about = "Runs the spot-the-object game and exposes it as a button resource over HTTP"
)]
struct Args {
    /// Module config file (JSON) with the game attributes and detector endpoints
    #[arg(short, long)]
    config: PathBuf,

    /// Address the HTTP API listens on
    #[arg(short, long, default_value = "127.0.0.1:8080")]
    listen: SocketAddr,

    /// Verbose output (show debug messages)
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> eyre::Result<()> {
    let args = Args::parse();

    let default_filter = if args.verbose {
        "game_server=debug,spot_game_core=debug,tower_http=debug"
    } else {
        "game_server=info,spot_game_core=info"
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("starting game-server v{}", env!("CARGO_PKG_VERSION"));

    let module = ModuleConfig::load(&args.config).await?;
    let game_config = GameConfig::from_attributes(&module.attributes)?;
    tracing::info!(
        resource = %module.name,
        required = ?game_config.required_dependencies(),
        "configuration validated"
    );

    let dependencies = module.dependencies(&reqwest::Client::new());
    let controller = Arc::new(GameController::new(&game_config, &dependencies)?);
    controller.start().await;

    let app = create_router(AppState {
        controller: controller.clone(),
        dependencies,
    });

    let listener = tokio::net::TcpListener::bind(args.listen)
        .await
        .wrap_err_with(|| format!("failed to bind {}", args.listen))?;
    tracing::info!(addr = %args.listen, "listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            if let Err(error) = tokio::signal::ctrl_c().await {
                tracing::error!(%error, "failed to listen for shutdown signal");
            }
        })
        .await
        .wrap_err("server error")?;

    controller.close().await;
    tracing::info!("game-server stopped");
    Ok(())
}
