use clap::Parser;
use sqlx::postgres::PgPoolOptions;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use withdrawal_gateway::api::{app_router, AppState};
use withdrawal_gateway::config::load_config;
use withdrawal_gateway::db::{PgWithdrawalStore, WithdrawalStore};
use withdrawal_gateway::notifier::telegram::{TelegramNotifier, TelegramNotifierConfig};
use withdrawal_gateway::notifier::Notifier;
use withdrawal_gateway::service::command::CommandProcessor;
use withdrawal_gateway::service::intake::IntakeService;
use withdrawal_gateway::service::listing::ListingService;

#[derive(Parser, Debug)]
#[command(about = "Payout withdrawal gateway")]
struct Args {
    /// Optional TOML config file; environment variables override it.
    #[arg(long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting withdrawal gateway");

    let args = Args::parse();
    let config = load_config(args.config.as_deref())?;

    // Secrets come from the environment, read once at startup.
    let database_url = config.database.get_db_url();
    let bot_token = config.telegram.get_bot_token();
    let admin_chat_id = config.telegram.get_admin_chat_id();
    let admin_key = config.admin.get_api_key();

    let pool = PgPoolOptions::new()
        .max_connections(config.database.max_connections)
        .connect(&database_url)
        .await?;

    info!("Running database migrations");
    sqlx::migrate!("./migrations").run(&pool).await?;

    let store: Arc<dyn WithdrawalStore> = Arc::new(PgWithdrawalStore::new(pool));
    let notifier: Arc<dyn Notifier> = Arc::new(TelegramNotifier::new(TelegramNotifierConfig {
        api_base: config.telegram.api_base.clone(),
        bot_token,
        request_timeout: Duration::from_millis(config.telegram.request_timeout_ms),
    })?);

    let state = Arc::new(AppState {
        intake: IntakeService::new(store.clone(), notifier.clone(), admin_chat_id),
        commands: CommandProcessor::new(store.clone(), notifier.clone(), admin_chat_id),
        listing: ListingService::new(store, admin_key),
    });

    let app = app_router(state);
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!(%addr, "Listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Shutting down withdrawal gateway");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to install ctrl-c handler");
    }
}
