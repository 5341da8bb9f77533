//! HTTP API Layer
//!
//! REST API for the library circulation system using Axum.
//!
//! # Architecture
//!
//! - **Handlers**: catalog, membership, and circulation endpoints
//! - **Middleware**: request ids, tracing, audit logging
//! - **DTOs**: request/response bodies with `validator` checks
//! - **Error Handling**: domain errors mapped to status codes with a
//!   `{ "error", "message" }` body
//!
//! # Example
//!
//! ```rust,ignore
//! use interface_api::create_router;
//!
//! let app = create_router(service, config);
//! axum::serve(listener, app).await?;
//! ```

pub mod config;
pub mod error;
pub mod extract;
pub mod middleware;
pub mod handlers;
pub mod dto;

use axum::{
    http::HeaderName,
    middleware as axum_middleware,
    routing::{get, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::TraceLayer;

use domain_circulation::CirculationService;

use crate::config::ApiConfig;
use crate::handlers::{books, health, loans, members};
use crate::middleware::{audit_middleware, REQUEST_ID_HEADER};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub service: CirculationService,
    pub config: ApiConfig,
}

/// Creates the main API router
pub fn create_router(service: CirculationService, config: ApiConfig) -> Router {
    let state = AppState { service, config };
    let request_id = HeaderName::from_static(REQUEST_ID_HEADER);

    let public_routes = Router::new()
        .route("/health", get(health::health_check))
        .route("/health/ready", get(health::readiness_check));

    let book_routes = Router::new()
        .route("/", get(books::list_books).post(books::create_book))
        .route(
            "/:id",
            get(books::get_book)
                .patch(books::update_book)
                .delete(books::delete_book),
        )
        .route("/:id/borrow", post(books::borrow_book));

    let member_routes = Router::new()
        .route("/", get(members::list_members).post(members::create_member))
        .route(
            "/:id",
            get(members::get_member)
                .patch(members::update_member)
                .delete(members::delete_member),
        );

    let loan_routes = Router::new()
        .route("/", get(loans::list_loans))
        .route("/:id", get(loans::get_loan))
        .route("/:id/return", post(loans::return_book));

    let api_routes = Router::new()
        .nest("/books", book_routes)
        .nest("/members", member_routes)
        .nest("/loans", loan_routes)
        .layer(axum_middleware::from_fn(audit_middleware));

    // Outermost first: the request id exists before tracing and audit see the request
    // CORS is applied as a separate (outer) router layer so its response body is
    // axum's `Body` (which implements `Default`, as `Cors` requires).
    let cors_layer = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);
    let http_layers = ServiceBuilder::new()
        .layer(SetRequestIdLayer::new(request_id.clone(), MakeRequestUuid))
        .layer(TraceLayer::new_for_http())
        .layer(PropagateRequestIdLayer::new(request_id));

    Router::new()
        .merge(public_routes)
        .nest("/api/v1", api_routes)
        .layer(http_layers)
        .layer(cors_layer)
        .with_state(state)
}
