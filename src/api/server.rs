//! API Server
//!
//! Wires the flip engine into the HTTP/WebSocket stack and runs it until
//! shutdown. Pending flips are aborted on shutdown; their resolutions are
//! lost along with the rest of the in-memory state.

use super::{
    handlers::AppState,
    middleware::{create_cors_layer, request_id_middleware},
    routes::create_router,
};
use crate::config::SkinflipConfig;
use crate::games::FlipEngine;
use crate::notify::Notifier;
use std::{net::SocketAddr, sync::Arc, time::Duration};
use tokio::signal;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};
use tracing::info;

/// Broadcast channel capacity for outbound events.
const EVENT_BUFFER: usize = 1024;

pub struct ApiServer {
    config: SkinflipConfig,
}

impl ApiServer {
    pub fn new(config: SkinflipConfig) -> Self {
        Self { config }
    }

    /// Start the server and run until a shutdown signal arrives.
    pub async fn run(self) -> Result<(), Box<dyn std::error::Error>> {
        tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| "skinflip=info,tower_http=info".into()),
            )
            .init();

        let notifier = Notifier::new(EVENT_BUFFER);
        let engine = Arc::new(FlipEngine::new(self.config.game.clone(), notifier));
        let state = Arc::new(AppState::new(engine.clone()));

        let app = create_router(state)
            .layer(axum::middleware::from_fn(request_id_middleware))
            .layer(create_cors_layer(self.config.server.cors_origins.clone()))
            .layer(TimeoutLayer::new(Duration::from_secs(
                self.config.server.request_timeout_secs,
            )))
            .layer(TraceLayer::new_for_http());

        let addr = SocketAddr::from((
            self.config.server.listen_address.parse::<std::net::IpAddr>()?,
            self.config.server.port,
        ));

        info!("🎲 Starting skinflip server");
        info!("   Listen: http://{}", addr);
        info!("   Flip delay: {}ms", self.config.game.flip_delay_ms);
        info!("   Starting balance: {}", self.config.game.starting_balance);
        info!("📊 Available endpoints:");
        info!("   POST /register  - Create account");
        info!("   POST /login     - Log in");
        info!("   POST /logout    - End session");
        info!("   GET  /games     - Waiting-game list");
        info!("   GET  /ws        - Real-time game protocol");
        info!("   GET  /health    - Health check");

        let listener = tokio::net::TcpListener::bind(addr).await?;
        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        engine.scheduler().abort_all();
        info!("🛑 Server stopped gracefully");
        Ok(())
    }
}

/// Wait for shutdown signal
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C signal");
        },
        _ = terminate => {
            info!("Received terminate signal");
        },
    }
}
