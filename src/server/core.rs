use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::{Router, middleware};
use log::{error, info, warn};
use std::sync::Arc;
use tokio::net::TcpListener;

use crate::config::ServerConfig;
use crate::locations::LocationStore;
use crate::manager::FileManager;
use crate::middleware::log_request;
use crate::server::routes::{self, AppState};

pub struct Server {
    listener: TcpListener,
    app: Router,
    config: ServerConfig,
}

impl Server {
    pub async fn new(config: ServerConfig) -> std::io::Result<Self> {
        let locations = Arc::new(LocationStore::new(
            config.config_file_path(),
            config.default_root_path(),
        ));
        let manager = FileManager::new(locations);

        let root = manager.active_root().await;
        if let Err(e) = tokio::fs::create_dir_all(&root).await {
            warn!("Failed to create active root {}: {}", root.display(), e);
        } else {
            info!("Active root directory: {}", root.display());
        }

        let socket = config.socket_addr();
        let listener = match TcpListener::bind(&socket).await {
            Ok(listener) => {
                info!("Server bound to {}", socket);
                listener
            }
            Err(e) => {
                error!("Failed to bind to {}: {}", socket, e);
                return Err(e);
            }
        };

        let app = build_router(manager, config.max_upload_size_bytes());

        Ok(Self {
            listener,
            app,
            config,
        })
    }

    pub async fn start(self) -> std::io::Result<()> {
        info!(
            "Starting RAX file manager on {} (uploads up to {} MB)",
            self.config.socket_addr(),
            self.config.max_upload_size_mb
        );

        axum::serve(self.listener, self.app)
            .with_graceful_shutdown(shutdown_signal())
            .await
    }
}

/// Build the API router around a file manager.
pub fn build_router(manager: FileManager, max_upload_bytes: usize) -> Router {
    let state = AppState { manager };

    Router::new()
        .route(
            "/api/files",
            get(routes::list_files).delete(routes::delete_file),
        )
        .route(
            "/api/files/upload",
            post(routes::upload_files).layer(DefaultBodyLimit::max(max_upload_bytes)),
        )
        .route("/api/files/download", get(routes::download_file))
        .route("/api/files/move", post(routes::move_file))
        .route("/api/folders", post(routes::create_folder))
        .route(
            "/api/config",
            get(routes::get_config).put(routes::update_config),
        )
        .layer(middleware::from_fn(log_request))
        .with_state(state)
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {}", e);
        return;
    }
    info!("Shutdown signal received");
}
