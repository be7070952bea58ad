use std::net::SocketAddr;
use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use approval_gateway::notification::fcm::{FcmClient, ServiceAccount};
use approval_gateway::odoo::OdooClient;
use approval_gateway::store::postgres::PgStore;
use approval_gateway::{api, config, AppState};

#[derive(Parser)]
#[command(name = "approval-gateway", about = "Product approval webhook gateway")]
struct Cli {
    /// Override the configured listen port.
    #[arg(long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG")
                .unwrap_or_else(|_| "approval_gateway=debug,tower_http=info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cfg = config::load()?;
    let args = Cli::parse();
    let port = args.port.unwrap_or(cfg.port);

    tracing::info!("Connecting to database...");
    let db = PgStore::connect(&cfg.database_url).await?;

    tracing::info!("Running migrations...");
    db.migrate().await?;

    let odoo = OdooClient::new(cfg.odoo.clone());

    let fcm = match &cfg.firebase_service_account {
        Some(raw) => match ServiceAccount::from_json(raw) {
            Ok(account) => Some(FcmClient::new(account)),
            Err(e) => {
                tracing::warn!(error = %e, "invalid FIREBASE_SERVICE_ACCOUNT, push disabled");
                None
            }
        },
        None => {
            tracing::warn!("FIREBASE_SERVICE_ACCOUNT not set, push notifications disabled");
            None
        }
    };

    let state = Arc::new(AppState {
        db,
        odoo,
        fcm,
        config: cfg,
    });

    let app = axum::Router::new()
        .route("/healthz", axum::routing::get(|| async { "ok" }))
        .merge(api::router(state.clone()))
        .with_state(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("approval gateway listening on {}", addr);
    axum::serve(listener, app).await?;

    Ok(())
}
