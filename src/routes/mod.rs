// src/routes/mod.rs
pub mod chat;
pub mod debug;

use std::net::SocketAddr;

use crate::{
    error::AppError,
    services::rate_limiter::RateDecision,
    state::SharedState,
};
use axum::{
    Router,
    extract::{ConnectInfo, Request, State},
    http::{HeaderValue, Method, header},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use chat::chat_handler;
use debug::debug_handler;
use tower::ServiceBuilder;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::warn;

pub const ROOT_ACK: &str = "Maizic Chatbot API is running.";

pub fn create_router(state: SharedState) -> Router {
    let chat_routes = Router::new()
        .route("/chat", post(chat_handler))
        // route_layer keeps the limiter off the fallback, so unknown paths stay 404.
        .route_layer(middleware::from_fn_with_state(state.clone(), rate_limit_middleware));

    let mut router = Router::new()
        .route("/", get(|| async { ROOT_ACK }))
        .route("/health", get(|| async { "OK" }))
        .merge(chat_routes);

    if state.config.debug_endpoint {
        router = router.route("/debug", get(debug_handler));
    }

    router.with_state(state.clone()).layer(
        ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(cors_layer(&state)),
    )
}

fn cors_layer(state: &SharedState) -> CorsLayer {
    if !state.config.environment.is_production() {
        return CorsLayer::very_permissive();
    }

    let origins: Vec<HeaderValue> = state
        .config
        .allowed_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                warn!(origin = %origin, "ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE])
}

async fn rate_limit_middleware(
    State(state): State<SharedState>,
    req: Request,
    next: Next,
) -> Response {
    if !state.limiter.is_enabled() {
        return next.run(req).await;
    }

    let client = client_key(&req, state.config.trust_proxy);
    match state.limiter.check(&client).await {
        RateDecision::Allowed { .. } => next.run(req).await,
        RateDecision::Limited { retry_after } => {
            warn!(client = %client, "rate limit exceeded");
            AppError::TooManyRequests { retry_after }.into_response()
        }
    }
}

fn client_key(req: &Request, trust_proxy: bool) -> String {
    if trust_proxy {
        let forwarded = req
            .headers()
            .get("x-forwarded-for")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.split(',').next())
            .map(str::trim)
            .filter(|v| !v.is_empty());
        if let Some(ip) = forwarded {
            return ip.to_string();
        }
    }

    req.extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip().to_string())
        .unwrap_or_else(|| "unknown".to_string())
}
