use axum::http::header::CONTENT_TYPE;
use axum::http::{HeaderName, Method};
use axum::routing::{get, post};
use axum::Router;
use std::sync::Arc;
use std::time::Duration;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use super::handlers;
use crate::service::command::CommandProcessor;
use crate::service::intake::IntakeService;
use crate::service::listing::ListingService;

pub struct AppState {
    pub intake: IntakeService,
    pub commands: CommandProcessor,
    pub listing: ListingService,
}

pub fn app_router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE, HeaderName::from_static("x-admin-key")])
        .max_age(Duration::from_secs(86400));

    Router::new()
        .route(
            "/withdrawals",
            post(handlers::create_withdrawal).get(handlers::list_withdrawals),
        )
        .route(
            "/telegram-webhook",
            // The bot only POSTs, but any other verb still gets the ack: the
            // webhook contract is to acknowledge, never to error.
            post(handlers::telegram_webhook).fallback(handlers::webhook_ack),
        )
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
