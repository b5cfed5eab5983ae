pub mod api;
pub mod config;
pub mod models;
pub mod services;

use crate::config::AppConfig;
use crate::services::email::{EmailError, EmailSender, ResendClient};
use crate::services::order_service::OrderService;
use axum::{
    Json, Router,
    extract::DefaultBodyLimit,
    http::{Method, header},
    middleware::from_fn,
    routing::{get, post},
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::{ServeDir, ServeFile};
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    paths(
        api::handlers::orders::send_order,
        api::handlers::health::health_check,
    ),
    components(
        schemas(
            api::handlers::orders::OrderResponse,
            api::handlers::orders::OrderUpload,
            api::handlers::health::HealthResponse,
            api::error::ErrorResponse,
        )
    ),
    tags(
        (name = "orders", description = "Order submission"),
        (name = "system", description = "Service status")
    )
)]
pub struct ApiDoc;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub order_service: Arc<OrderService>,
}

impl AppState {
    pub fn new(config: AppConfig, sender: Arc<dyn EmailSender>) -> Self {
        let order_service = Arc::new(OrderService::new(sender, &config));
        Self {
            config: Arc::new(config),
            order_service,
        }
    }

    /// State backed by the real email API
    pub fn from_config(config: AppConfig) -> Result<Self, EmailError> {
        let sender = Arc::new(ResendClient::from_config(&config)?);
        Ok(Self::new(config, sender))
    }
}

pub fn create_app(state: AppState) -> Router {
    let static_dir = state.config.static_dir.clone();
    let site = ServeDir::new(&static_dir).fallback(ServeFile::new(static_dir.join("index.html")));

    let body_limit = match state.config.max_upload_size {
        Some(max) => DefaultBodyLimit::max(max),
        None => DefaultBodyLimit::disable(),
    };

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE]);

    Router::new()
        .route(
            "/send-order",
            post(api::handlers::orders::send_order).layer(body_limit),
        )
        .route("/health", get(api::handlers::health::health_check))
        .route(
            "/api-docs/openapi.json",
            get(|| async { Json(ApiDoc::openapi()) }),
        )
        .with_state(state)
        .fallback_service(site)
        .layer(from_fn(api::middleware::hidden_files::hide_dotfiles))
        .layer(cors)
        .layer(from_fn(api::middleware::request_id::request_id_middleware))
}
