//! Beehive Lodge form pipeline
//!
//! Server and client glue for the website's contact and demo booking forms.
//!
//! ## Features
//!
//! - **Form API**: `POST /contact`, `/demo` and `/newsletter`, validated and
//!   sanitized server-side
//! - **Notifications**: operator notification and requester confirmation
//!   mails for every accepted submission
//! - **Append logs**: one JSON line per accepted submission or signup
//! - **Client controller**: inline validation and pluggable submission
//!   transports for the browser side

pub mod client;
pub mod config;
pub mod handlers;
pub mod mail;
pub mod models;
pub mod notifications;
pub mod storage;
pub mod validation;

use axum::{http::Method, Router};
use config::Config;
use handlers::AppState;
use tower_http::{
    cors::{Any, CorsLayer},
    limit::RequestBodyLimitLayer,
    trace::TraceLayer,
};

/// Assemble the application: form routes at the root and under `/api`,
/// plus security headers, body limit, CORS and request tracing.
pub fn build_app(state: AppState, config: &Config) -> Router {
    let cors = if config.is_production() {
        CorsLayer::new()
            .allow_origin(
                config
                    .cors_origins
                    .iter()
                    .filter_map(|o| o.parse().ok())
                    .collect::<Vec<_>>(),
            )
            .allow_methods([Method::POST, Method::OPTIONS])
            .allow_headers(Any)
    } else {
        CorsLayer::permissive()
    };

    Router::new()
        .merge(handlers::form_routes())
        .nest("/api", handlers::form_routes())
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            handlers::security_headers,
        ))
        .layer(TraceLayer::new_for_http())
        .layer(RequestBodyLimitLayer::new(config.max_body_size))
        .layer(cors)
        .with_state(state)
}
