//! HTTP API Layer
//!
//! REST API for the rating engine using Axum.
//!
//! # Architecture
//!
//! - **Handlers**: health, rating and table snapshot endpoints
//! - **Middleware**: request ids, tracing, audit logging
//! - **DTOs**: Request/Response data transfer objects
//! - **Error Handling**: Consistent error responses
//!
//! # Example
//!
//! ```rust,ignore
//! use interface_api::{create_router, AppState};
//!
//! let state = AppState::load(config)?;
//! let app = create_router(state);
//! axum::serve(listener, app).await?;
//! ```

pub mod config;
pub mod error;
pub mod middleware;
pub mod handlers;
pub mod dto;

use std::sync::Arc;

use axum::{
    http::HeaderName,
    middleware as axum_middleware,
    routing::{get, post},
    Router,
};
use domain_rating::{RatingEngine, ReferenceTables, TableStore};
use tower_http::cors::{Any, CorsLayer};
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::TraceLayer;

use crate::config::ApiConfig;
use crate::error::ApiError;
use crate::handlers::{health, ratings, tables};
use crate::middleware::{audit_middleware, REQUEST_ID_HEADER};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub tables: Arc<TableStore>,
    pub engine: Arc<RatingEngine>,
    pub config: ApiConfig,
}

impl AppState {
    /// State over an already loaded snapshot
    pub fn new(config: ApiConfig, tables: ReferenceTables) -> Result<Self, ApiError> {
        let engine = config.engine()?;
        Ok(Self {
            tables: Arc::new(TableStore::new(tables)),
            engine: Arc::new(engine),
            config,
        })
    }

    /// Loads the tables from the configured directory
    pub fn load(config: ApiConfig) -> Result<Self, ApiError> {
        let tables = config.table_loader().load()?;
        Self::new(config, tables)
    }
}

/// Creates the main API router
pub fn create_router(state: AppState) -> Router {
    let request_id = HeaderName::from_static(REQUEST_ID_HEADER);

    // Public routes
    let public_routes = Router::new()
        .route("/health", get(health::health_check))
        .route("/health/ready", get(health::readiness_check));

    let rating_routes = Router::new().route("/", post(ratings::rate_claim));

    let table_routes = Router::new()
        .route("/", get(tables::get_tables))
        .route("/reload", post(tables::reload_tables));

    let api_routes = Router::new()
        .nest("/ratings", rating_routes)
        .nest("/tables", table_routes)
        .layer(axum_middleware::from_fn(audit_middleware));

    // Combine all routes
    Router::new()
        .merge(public_routes)
        .nest("/api/v1", api_routes)
        .layer(TraceLayer::new_for_http())
        .layer(PropagateRequestIdLayer::new(request_id.clone()))
        .layer(SetRequestIdLayer::new(request_id, MakeRequestUuid))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
