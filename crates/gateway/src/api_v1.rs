//! HTTP API v1.
//!
//! Endpoints (relative to the configured `api_prefix`):
//!
//! - `GET  /`: Welcome message
//! - `GET  /status`: Liveness with timestamp and version
//! - `GET  /health`: Health of the API and its dependencies
//! - `POST /segment`: Segment and format a run-on string
//! - `GET  /segment/status`: Per-language model status
//! - `POST /auth/login`: Exchange credentials for a bearer token
//! - `GET  /auth/status`: Auth subsystem status

use axum::{
    Router,
    extract::State,
    http::StatusCode,
    response::Json,
    routing::{get, post},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info};

use wordsplit_config::AppConfig;
use wordsplit_models::{ServiceStatus, WordSegmenter};
use wordsplit_security::{AuthService, Credentials, Token};

// ── State ─────────────────────────────────────────────────────────────────

/// Shared state for the v1 API.
pub struct ApiV1State {
    pub config: AppConfig,
    pub segmenter: Arc<WordSegmenter>,
    pub auth: AuthService,
}

pub type SharedApiState = Arc<ApiV1State>;

// ── Routers ───────────────────────────────────────────────────────────────

/// Public routes: info, health, and auth.
pub fn v1_router(state: SharedApiState) -> Router {
    Router::new()
        .route("/", get(root_handler))
        .route("/status", get(status_handler))
        .route("/health", get(health_handler))
        .route("/auth/login", post(login_handler))
        .route("/auth/status", get(auth_status_handler))
        .with_state(state)
}

/// Segmentation routes. The caller decides whether to put them behind auth.
pub fn segment_router(state: SharedApiState) -> Router {
    Router::new()
        .route("/segment", post(segment_handler))
        .route("/segment/", post(segment_handler))
        .route("/segment/status", get(segment_status_handler))
        .with_state(state)
}

// ── Request / Response types ──────────────────────────────────────────────

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub detail: String,
}

impl ErrorResponse {
    pub fn new(status: StatusCode, detail: impl Into<String>) -> (StatusCode, Json<Self>) {
        (
            status,
            Json(Self {
                detail: detail.into(),
            }),
        )
    }
}

#[derive(Serialize, Deserialize)]
pub struct WelcomeResponse {
    message: String,
    version: String,
    docs: String,
}

#[derive(Serialize, Deserialize)]
struct StatusResponse {
    status: String,
    timestamp: DateTime<Utc>,
    version: String,
}

#[derive(Serialize, Deserialize)]
struct HealthResponse {
    status: String,
    timestamp: DateTime<Utc>,
    services: HealthServices,
}

#[derive(Serialize, Deserialize)]
struct HealthServices {
    api: String,
    azure_vault: String,
    segmentation: String,
}

fn default_language() -> String {
    "pt".into()
}

#[derive(Deserialize)]
struct SegmentRequest {
    text: String,
    #[serde(default = "default_language")]
    language: String,
}

#[derive(Serialize, Deserialize)]
struct SegmentResponse {
    original: String,
    formatted: String,
}

#[derive(Serialize, Deserialize)]
struct ApiResponse {
    message: String,
    success: bool,
    data: Option<serde_json::Value>,
}

// ── Handlers ──────────────────────────────────────────────────────────────

pub async fn root_handler(State(state): State<SharedApiState>) -> Json<WelcomeResponse> {
    Json(WelcomeResponse {
        message: format!("Bem-vindo ao {}", state.config.project_name),
        version: state.config.version.clone(),
        docs: "/docs".into(),
    })
}

async fn status_handler(State(state): State<SharedApiState>) -> Json<StatusResponse> {
    Json(StatusResponse {
        status: "API funcionando".into(),
        timestamp: Utc::now(),
        version: state.config.version.clone(),
    })
}

async fn health_handler(State(state): State<SharedApiState>) -> Json<HealthResponse> {
    let azure_vault = if state.config.key_vault.is_configured() {
        "configured"
    } else {
        "not_configured"
    };

    let segmentation = match run_status(&state).await {
        Some(status) if status.is_active() => "active",
        _ => "error",
    };

    Json(HealthResponse {
        status: "healthy".into(),
        timestamp: Utc::now(),
        services: HealthServices {
            api: "running".into(),
            azure_vault: azure_vault.into(),
            segmentation: segmentation.into(),
        },
    })
}

async fn segment_handler(
    State(state): State<SharedApiState>,
    Json(payload): Json<SegmentRequest>,
) -> Result<Json<SegmentResponse>, (StatusCode, Json<ErrorResponse>)> {
    info!(
        language = %payload.language,
        text_len = payload.text.len(),
        "segment request"
    );

    // Model loading and tokenization are blocking work.
    let segmenter = state.segmenter.clone();
    let text = payload.text.clone();
    let language = payload.language.clone();
    let outcome = tokio::task::spawn_blocking(move || segmenter.segment_and_format(&text, &language))
        .await
        .map_err(|e| e.to_string())
        .and_then(|result| result.map_err(|e| e.to_string()));

    match outcome {
        Ok(formatted) => Ok(Json(SegmentResponse {
            original: payload.text,
            formatted,
        })),
        Err(message) => {
            error!(language = %payload.language, error = %message, "Segmentation failed");
            Err(ErrorResponse::new(
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Erro ao processar texto: {message}"),
            ))
        }
    }
}

async fn segment_status_handler(
    State(state): State<SharedApiState>,
) -> Result<Json<ServiceStatus>, (StatusCode, Json<ErrorResponse>)> {
    run_status(&state).await.map(Json).ok_or_else(|| {
        ErrorResponse::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            "Erro ao verificar o status da segmentação",
        )
    })
}

async fn login_handler(
    State(state): State<SharedApiState>,
    Json(credentials): Json<Credentials>,
) -> Result<Json<Token>, (StatusCode, Json<ErrorResponse>)> {
    state
        .auth
        .login(&credentials)
        .map(Json)
        .map_err(|e| ErrorResponse::new(StatusCode::UNAUTHORIZED, e.to_string()))
}

async fn auth_status_handler() -> Json<ApiResponse> {
    Json(ApiResponse {
        message: "Sistema de autenticação ativo".into(),
        success: true,
        data: Some(serde_json::json!({ "status": "active" })),
    })
}

/// Probe the models off the async runtime.
async fn run_status(state: &SharedApiState) -> Option<ServiceStatus> {
    let segmenter = state.segmenter.clone();
    match tokio::task::spawn_blocking(move || segmenter.check_status()).await {
        Ok(status) => Some(status),
        Err(e) => {
            error!(error = %e, "Status probe panicked");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{test_state, test_state_with};
    use axum::body::Body;
    use axum::http::Request;
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    async fn body_json<T: serde::de::DeserializeOwned>(response: axum::response::Response) -> T {
        let body = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&body).unwrap()
    }

    fn post_json(uri: &str, body: serde_json::Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn welcome_message() {
        let app = v1_router(test_state());
        let req = Request::builder().uri("/").body(Body::empty()).unwrap();

        let response = app.oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let json: WelcomeResponse = body_json(response).await;
        assert_eq!(json.message, "Bem-vindo ao Word Segmentation API");
        assert_eq!(json.version, "1.0.0");
        assert_eq!(json.docs, "/docs");
    }

    #[tokio::test]
    async fn status_reports_version() {
        let app = v1_router(test_state());
        let req = Request::builder().uri("/status").body(Body::empty()).unwrap();

        let response = app.oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let json: StatusResponse = body_json(response).await;
        assert_eq!(json.status, "API funcionando");
        assert_eq!(json.version, "1.0.0");
    }

    #[tokio::test]
    async fn health_with_models_loaded() {
        let app = v1_router(test_state());
        let req = Request::builder().uri("/health").body(Body::empty()).unwrap();

        let response = app.oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let json: HealthResponse = body_json(response).await;
        assert_eq!(json.status, "healthy");
        assert_eq!(json.services.api, "running");
        assert_eq!(json.services.azure_vault, "not_configured");
        assert_eq!(json.services.segmentation, "active");
    }

    #[tokio::test]
    async fn health_reports_vault_and_missing_models() {
        let mut config = AppConfig::default();
        config.key_vault.dns = Some("https://v.vault.azure.net".into());
        let app = v1_router(test_state_with(config, false));
        let req = Request::builder().uri("/health").body(Body::empty()).unwrap();

        let json: HealthResponse = body_json(app.oneshot(req).await.unwrap()).await;
        // Still healthy: a missing model degrades segmentation only.
        assert_eq!(json.status, "healthy");
        assert_eq!(json.services.azure_vault, "configured");
        assert_eq!(json.services.segmentation, "error");
    }

    #[tokio::test]
    async fn segment_portuguese() {
        let app = segment_router(test_state());
        let req = post_json(
            "/segment/",
            serde_json::json!({ "text": "minhacasatemsp", "language": "pt" }),
        );

        let response = app.oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let json: SegmentResponse = body_json(response).await;
        assert_eq!(json.original, "minhacasatemsp");
        assert_eq!(json.formatted, "MinhaCasaTemSP");
    }

    #[tokio::test]
    async fn segment_defaults_to_portuguese() {
        let app = segment_router(test_state());
        let req = post_json("/segment", serde_json::json!({ "text": "casasp" }));

        let response = app.oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let json: SegmentResponse = body_json(response).await;
        assert_eq!(json.formatted, "CasaSP");
    }

    #[tokio::test]
    async fn segment_english_acronyms() {
        let app = segment_router(test_state());
        let req = post_json(
            "/segment/",
            serde_json::json!({ "text": "myhouseusa", "language": "en" }),
        );

        let json: SegmentResponse = body_json(app.oneshot(req).await.unwrap()).await;
        assert_eq!(json.formatted, "MyHouseUSA");
    }

    #[tokio::test]
    async fn segment_empty_text() {
        let app = segment_router(test_state());
        let req = post_json("/segment/", serde_json::json!({ "text": "" }));

        let response = app.oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let json: SegmentResponse = body_json(response).await;
        assert_eq!(json.formatted, "");
    }

    #[tokio::test]
    async fn segment_unsupported_language_is_500() {
        let app = segment_router(test_state());
        let req = post_json(
            "/segment/",
            serde_json::json!({ "text": "test", "language": "fr" }),
        );

        let response = app.oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let json: ErrorResponse = body_json(response).await;
        assert!(json.detail.starts_with("Erro ao processar texto: "));
        assert!(json.detail.contains("não suportado"));
    }

    #[tokio::test]
    async fn segment_missing_model_is_500() {
        let app = segment_router(test_state_with(AppConfig::default(), false));
        let req = post_json("/segment/", serde_json::json!({ "text": "casa" }));

        let response = app.oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let json: ErrorResponse = body_json(response).await;
        assert!(json.detail.contains("pt_core_news_sm"));
    }

    #[tokio::test]
    async fn segment_requires_text_field() {
        let app = segment_router(test_state());
        let req = post_json("/segment/", serde_json::json!({ "language": "pt" }));

        let response = app.oneshot(req).await.unwrap();
        assert!(response.status().is_client_error());
    }

    #[tokio::test]
    async fn segment_status_lists_models() {
        let app = segment_router(test_state());
        let req = Request::builder()
            .uri("/segment/status")
            .body(Body::empty())
            .unwrap();

        let response = app.oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let json: ServiceStatus = body_json(response).await;
        assert_eq!(json.service, "word_segmentation");
        assert_eq!(json.status, "active");
        assert!(json.model_loaded);
        assert!(json.models.contains_key("pt"));
        assert!(json.models.contains_key("en"));
    }

    #[tokio::test]
    async fn login_success() {
        let state = test_state();
        let app = v1_router(state.clone());
        let req = post_json(
            "/auth/login",
            serde_json::json!({ "username": "admin", "password": "admin" }),
        );

        let response = app.oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let token: Token = body_json(response).await;
        assert_eq!(token.token_type, "bearer");
        assert_eq!(state.auth.verify_token(&token.access_token).unwrap().sub, "admin");
    }

    #[tokio::test]
    async fn login_failure_is_401() {
        let app = v1_router(test_state());
        let req = post_json(
            "/auth/login",
            serde_json::json!({ "username": "admin", "password": "x" }),
        );

        let response = app.oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        let json: ErrorResponse = body_json(response).await;
        assert_eq!(json.detail, "Credenciais inválidas");
    }

    #[tokio::test]
    async fn auth_status() {
        let app = v1_router(test_state());
        let req = Request::builder()
            .uri("/auth/status")
            .body(Body::empty())
            .unwrap();

        let json: ApiResponse = body_json(app.oneshot(req).await.unwrap()).await;
        assert_eq!(json.message, "Sistema de autenticação ativo");
        assert!(json.success);
        assert_eq!(json.data.unwrap()["status"], "active");
    }
}
