//! HTTP API gateway for wordsplit.
//!
//! Serves the word segmentation API under the configured prefix, with CORS,
//! a request body limit, HTTP tracing, and optional bearer-token auth on the
//! segmentation routes.
//!
//! Built on Axum.

pub mod api_v1;
#[cfg(test)]
mod testing;

use axum::extract::DefaultBodyLimit;
use axum::{
    Router,
    extract::State,
    http::{HeaderValue, Method, StatusCode, header},
    middleware::{self, Next},
    response::Json,
    routing::get,
};
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tracing::{debug, info, warn};

use api_v1::{ApiV1State, ErrorResponse, SharedApiState};
use wordsplit_config::{AppConfig, ServerConfig};
use wordsplit_models::WordSegmenter;
use wordsplit_security::{AuthError, AuthService};

/// Build the full router.
///
/// Layers applied:
/// - Bearer token authentication on the segment routes (when enabled)
/// - CORS from `server.cors_origins`
/// - Request body size limit
/// - HTTP trace logging
pub fn build_router(state: SharedApiState) -> Router {
    let mut segment = api_v1::segment_router(state.clone());
    if state.config.auth.require_token {
        segment = segment.layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));
    }
    let api = api_v1::v1_router(state.clone()).merge(segment);

    let prefix = state.config.api_prefix.as_str();
    // `nest` maps the inner "/" to the bare prefix only.
    let router = if prefix == "/" {
        api
    } else {
        Router::new()
            .route(&format!("{prefix}/"), get(api_v1::root_handler))
            .with_state(state.clone())
            .nest(prefix, api)
    };

    router
        .layer(DefaultBodyLimit::max(state.config.server.max_body_bytes))
        .layer(cors_layer(&state.config.server))
        .layer(tower_http::trace::TraceLayer::new_for_http())
}

/// CORS policy. `"*"` allows everything; otherwise only the listed origins,
/// with credentials.
fn cors_layer(server: &ServerConfig) -> CorsLayer {
    if server.allows_any_origin() {
        return CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);
    }

    let origins: Vec<HeaderValue> = server
        .cors_origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
        .allow_credentials(true)
        .max_age(std::time::Duration::from_secs(3600))
}

/// Start the gateway HTTP server.
///
/// Resolves the token signing key, optionally preloads every model, then
/// serves until Ctrl-C.
pub async fn start(config: AppConfig) -> Result<(), Box<dyn std::error::Error>> {
    let addr = format!("{}:{}", config.server.host, config.server.port);

    let segmenter = Arc::new(WordSegmenter::from_config(&config));
    if config.models.eager_load {
        let registry = segmenter.registry().clone();
        tokio::task::spawn_blocking(move || registry.preload()).await??;
        info!("Segmentation models preloaded");
    }

    let signing_key =
        wordsplit_security::resolve_signing_key(&config.auth, &config.key_vault).await;
    let auth = AuthService::new(signing_key, config.auth.access_token_expire_minutes);

    let prefix = config.api_prefix.clone();
    let require_token = config.auth.require_token;
    let state = Arc::new(ApiV1State {
        config,
        segmenter,
        auth,
    });
    let app = build_router(state);

    info!(addr = %addr, prefix = %prefix, require_token, "Gateway starting");
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Gateway stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Failed to listen for Ctrl-C");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}

/// Authentication middleware for the segment routes.
///
/// Requires `Authorization: Bearer <token>` with a token issued by
/// `/auth/login` that has not expired.
async fn auth_middleware(
    State(state): State<SharedApiState>,
    req: axum::extract::Request,
    next: Next,
) -> Result<axum::response::Response, (StatusCode, Json<ErrorResponse>)> {
    let token = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(bearer_token);

    let outcome = match token {
        Some(token) => state.auth.verify_token(token),
        None => Err(AuthError::MissingToken),
    };

    match outcome {
        Ok(claims) => {
            debug!(sub = %claims.sub, "Bearer token accepted");
            Ok(next.run(req).await)
        }
        Err(e) => {
            warn!(error = %e, path = %req.uri().path(), "Unauthorized request");
            Err(ErrorResponse::new(StatusCode::UNAUTHORIZED, e.to_string()))
        }
    }
}

/// Extract the credentials of a `Bearer` authorization value. The scheme
/// is case-insensitive.
fn bearer_token(value: &str) -> Option<&str> {
    let (scheme, token) = value.trim().split_once(' ')?;
    let token = token.trim();
    (scheme.eq_ignore_ascii_case("bearer") && !token.is_empty()).then_some(token)
}
