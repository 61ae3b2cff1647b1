//! Modelhub app: the HTTP surface over the engine orchestrators.
pub mod api;
pub mod config;
pub mod error;

use std::path::Path;

use axum::extract::DefaultBodyLimit;
use axum::routing::get;
use axum::Router;
use hub_logging::hub_info;
use tower_http::services::ServeDir;

use modelhub_engine::{AuthClient, DerivativeClient, OssClient, Workflow};

pub use config::{Config, ConfigError};

/// Upper bound for uploaded model payloads.
const UPLOAD_LIMIT_BYTES: usize = 200 * 1024 * 1024;

/// Per-process handles shared by every request handler. Read-only after
/// startup apart from the token cache inside [`AuthClient`].
#[derive(Clone)]
pub struct AppState {
    pub auth: AuthClient,
    pub derivative: DerivativeClient,
    pub workflow: Workflow,
}

impl AppState {
    pub fn from_config(config: &Config) -> Self {
        let http = reqwest::Client::new();
        let auth = AuthClient::new(
            http.clone(),
            config.base_url.clone(),
            config.client_id.clone(),
            config.client_secret.clone(),
        );
        let oss = OssClient::new(http.clone(), config.base_url.clone(), auth.clone());
        let derivative = DerivativeClient::new(http, config.base_url.clone(), auth.clone());
        let workflow = Workflow::new(oss, derivative.clone(), config.bucket.clone());
        Self {
            auth,
            derivative,
            workflow,
        }
    }
}

/// Builds the full application router: the `/api` surface plus static
/// viewer assets from `wwwroot` as the fallback.
pub fn router(state: AppState, wwwroot: &Path) -> Router {
    Router::new()
        .route(
            "/api/models",
            get(api::list_models).post(api::upload_model),
        )
        .route("/api/models/:urn/status", get(api::model_status))
        .route(
            "/api/buckets",
            get(api::list_buckets)
                .post(api::create_bucket)
                .delete(api::delete_bucket),
        )
        .route("/api/auth/token", get(api::auth_token))
        .fallback_service(ServeDir::new(wwwroot))
        .layer(DefaultBodyLimit::max(UPLOAD_LIMIT_BYTES))
        .with_state(state)
}

/// Binds the configured address and serves until the process is stopped.
pub async fn serve(config: Config) -> std::io::Result<()> {
    let state = AppState::from_config(&config);
    let app = router(state, &config.wwwroot);
    let listener = tokio::net::TcpListener::bind(config.bind).await?;
    hub_info!("Listening on {} (default bucket {})", config.bind, config.bucket);
    axum::serve(listener, app).await
}
