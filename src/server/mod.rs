pub mod config;
pub mod request_logging;

use crate::{
    config::Config,
    database::{DatabaseHealthChecker, DatabaseManager, DatabaseManagerImpl},
    error::AppError,
    health::HealthService,
    ingestion::IngestionService,
    leaderboard::LeaderboardService,
    routes::{api_info, create_health_routes, create_sales_routes, not_found},
    server::request_logging::request_response_logger,
    shutdown::ShutdownCoordinator,
};
use axum::{
    Router,
    extract::DefaultBodyLimit,
    middleware::{self},
    routing::get,
};
use std::{future::IntoFuture, net::SocketAddr, sync::Arc, time::Duration};
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tracing::{error, info, warn};

#[derive(Clone)]
pub struct Server {
    pub config: Arc<Config>,
    pub database: Arc<dyn DatabaseManager>,
    pub ingestion: Arc<IngestionService>,
    pub leaderboard: Arc<LeaderboardService>,
    pub health_service: Arc<HealthService>,
    pub shutdown_coordinator: Arc<ShutdownCoordinator>,
}

impl Server {
    pub async fn new(config: Config) -> Result<Self, AppError> {
        let database: Arc<dyn DatabaseManager> = Arc::new(
            DatabaseManagerImpl::new_from_config(&config)
                .await
                .map_err(AppError::storage("Failed to connect to database"))?,
        );

        Ok(Self::with_database(config, database).await)
    }

    /// Assemble the server around an already constructed store
    pub async fn with_database(config: Config, database: Arc<dyn DatabaseManager>) -> Self {
        let ingestion = Arc::new(IngestionService::new(database.clone()));
        let leaderboard = Arc::new(LeaderboardService::new(database.clone()));

        let health_service = Arc::new(HealthService::new());
        health_service
            .register(Arc::new(DatabaseHealthChecker::new(database.clone())))
            .await;

        Self {
            config: Arc::new(config),
            database,
            ingestion,
            leaderboard,
            health_service,
            shutdown_coordinator: Arc::new(ShutdownCoordinator::new()),
        }
    }

    pub async fn run(&self) -> Result<(), AppError> {
        if self.config.database.migration_on_startup {
            self.database
                .migrate()
                .await
                .map_err(AppError::storage("Failed to run database migrations"))?;
        }

        let app = self.create_app();

        let addr = self.config.bind_address();
        let listener = TcpListener::bind(&addr)
            .await
            .map_err(|e| AppError::Internal(format!("Failed to bind to {}: {}", addr, e)))?;

        info!("Server listening on http://{}", addr);

        let signal_coordinator = self.shutdown_coordinator.clone();
        tokio::spawn(async move {
            signal_coordinator.wait_for_shutdown_signal().await;
        });

        let graceful_coordinator = self.shutdown_coordinator.clone();
        let serve_future = axum::serve(
            listener,
            app.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .with_graceful_shutdown(async move {
            graceful_coordinator.wait_for_shutdown().await;
            info!("Graceful shutdown initiated");
        })
        .into_future();

        // In-flight requests get a bounded window to finish once shutdown starts
        let drain_timeout = Duration::from_secs(self.config.server.shutdown_timeout_secs);
        let drain_coordinator = self.shutdown_coordinator.clone();
        let drain_deadline = async move {
            drain_coordinator.wait_for_shutdown().await;
            tokio::time::sleep(drain_timeout).await;
        };

        tokio::select! {
            result = serve_future => {
                if let Err(e) = result {
                    error!("Server error: {}", e);
                    return Err(AppError::Internal(format!("Server error: {}", e)));
                }
            }
            _ = drain_deadline => {
                warn!(
                    timeout_secs = drain_timeout.as_secs(),
                    "Timed out waiting for in-flight requests"
                );
            }
        }

        info!("Server shutdown complete");
        Ok(())
    }

    // Creates an application router
    pub fn create_app(&self) -> Router {
        let app = Router::new()
            .route("/", get(api_info))
            .nest("/api/sales", self.sales_routes())
            .nest("/health", create_health_routes())
            .fallback(not_found)
            .with_state(self.clone())
            .layer(CorsLayer::permissive());

        self.add_conditional_middleware(app)
    }

    fn sales_routes(&self) -> Router<Server> {
        create_sales_routes().layer(DefaultBodyLimit::max(self.config.server.max_body_size))
    }

    fn add_conditional_middleware(&self, mut app: Router) -> Router {
        if self.config.logging.log_request {
            app = app.layer(middleware::from_fn(request_response_logger));
        }
        app
    }
}
