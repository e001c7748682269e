use std::{future::Future, net::SocketAddr, sync::Arc};

use axum::Router;
use configs::AppConfig;
use migration::MigratorTrait;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tracing::info;

use crate::errors::StartupError;
use crate::routes::{self, auth::ServerState};
use service::auth::{repo::seaorm::SeaOrmUserRepository, AuthConfig, AuthService, StoreAuthService};

fn build_cors() -> CorsLayer {
    CorsLayer::very_permissive()
}

fn bind_addr(cfg: &AppConfig) -> Result<SocketAddr, StartupError> {
    format!("{}:{}", cfg.server.host, cfg.server.port)
        .parse()
        .map_err(|e| StartupError::InvalidConfig(format!("bind address: {e}")))
}

/// Connect the store, run migrations and wire the store-backed auth service.
pub async fn build_state(cfg: &AppConfig) -> Result<ServerState, StartupError> {
    let secret = cfg
        .auth
        .secret()
        .ok_or_else(|| StartupError::InvalidConfig("auth.api_secret is not set".into()))?;

    let db = models::db::connect_with_config(&(&cfg.database).into()).await?;
    migration::Migrator::up(&db, None)
        .await
        .map_err(|e| StartupError::Any(e.into()))?;

    let repo = Arc::new(SeaOrmUserRepository::new(db));
    let auth: Arc<dyn AuthService> = Arc::new(StoreAuthService::new(repo, AuthConfig::with_secret(secret)));
    Ok(ServerState::new(auth)?)
}

/// Serve `app` on `listener` until `shutdown` resolves.
pub async fn serve(
    listener: TcpListener,
    app: Router,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> anyhow::Result<()> {
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await?;
    Ok(())
}

/// Public entry: build the app and run the HTTP server until Ctrl+C
pub async fn run(cfg: AppConfig) -> anyhow::Result<()> {
    let state = build_state(&cfg).await?;
    let app = routes::build_router(state, build_cors());

    let addr = bind_addr(&cfg)?;
    let listener = TcpListener::bind(addr).await?;
    info!(%addr, "auth server listening");
    serve(listener, app, async {
        let _ = tokio::signal::ctrl_c().await;
        info!("received Ctrl+C, shutting down");
    })
    .await
}
