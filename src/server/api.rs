use crate::advisor::Advisor;
use crate::analysis::Analyzer;
use crate::auth::cognito::{hosted_logout_url, CognitoConfig};
use crate::auth::{Route, SessionResolver, SessionStore};
use crate::cli::Args;
use crate::error::AppError;
use crate::models::chat::ChatMessage;
use crate::models::classify::{ClassificationResult, PredictRequest};
use crate::models::weather::{ForecastSketch, WeatherReport};
use crate::upstream::WeatherClient;
use axum::extract::{Query, RawQuery, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Redirect};
use axum::routing::{get, post};
use axum::{Json, Router};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use log::{error, info};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::error::Error;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use url::Url;

#[derive(Clone)]
pub struct AuthContext {
    pub resolver: Arc<SessionResolver>,
    pub store: Arc<dyn SessionStore>,
    pub config: CognitoConfig,
}

#[derive(Clone)]
pub struct AppState {
    pub advisor: Arc<Advisor>,
    pub analyzer: Arc<Analyzer>,
    pub weather: Option<Arc<dyn WeatherClient>>,
    pub auth: Option<AuthContext>,
}

#[derive(Deserialize)]
pub struct ChatRequest {
    // Raw value so a non-array body gets the contract's bad-request reply
    // instead of a serde rejection.
    messages: Option<serde_json::Value>,
}

#[derive(Serialize)]
struct ChatResponse {
    bullets: Vec<String>,
}

#[derive(Deserialize)]
pub struct WeatherQuery {
    city: Option<String>,
}

#[derive(Serialize)]
struct CallbackResponse {
    route: Route,
    authenticated: bool,
    url: String,
}

pub async fn start_http_server(
    addr: &str,
    state: AppState,
    args: &Args,
) -> Result<(), Box<dyn Error + Send + Sync>> {
    let addr = addr.parse::<SocketAddr>()?;
    info!("Starting HTTP API server on: http://{}", addr);

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = Router::new()
        .route("/api/chat", post(chat_handler))
        .route("/predict", post(predict_handler))
        .route("/api/weather", get(weather_handler))
        .route("/auth/callback", get(callback_handler))
        .route("/auth/logout", get(logout_handler))
        .route("/api/health", get(health_handler))
        .layer(cors)
        .with_state(state);

    if args.enable_tls && args.tls_cert_path.is_some() && args.tls_key_path.is_some() {
        let cert_path = args.tls_cert_path.as_ref().unwrap();
        let key_path = args.tls_key_path.as_ref().unwrap();

        let tls_config =
            axum_server::tls_rustls::RustlsConfig::from_pem_file(cert_path, key_path).await?;

        info!("TLS enabled, serving HTTPS");
        axum_server::bind_rustls(addr, tls_config)
            .serve(app.into_make_service())
            .await?;
    } else {
        let listener = tokio::net::TcpListener::bind(addr).await.map_err(|e| {
            error!("Failed to bind HTTP server to {}: {}. Try a different port.", addr, e);
            e
        })?;
        axum::serve(listener, app.into_make_service()).await?;
    }

    Ok(())
}

async fn chat_handler(
    State(state): State<AppState>,
    Json(req): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, AppError> {
    let messages = match req.messages {
        Some(value) if value.is_array() => value,
        _ => return Err(AppError::BadRequest("messages must be array".to_string())),
    };
    let messages: Vec<ChatMessage> = serde_json::from_value(messages)
        .map_err(|e| AppError::BadRequest(format!("malformed message: {}", e)))?;

    let bullets = state.advisor.relay(&messages).await?;
    Ok(Json(ChatResponse { bullets }))
}

async fn predict_handler(
    State(state): State<AppState>,
    Json(req): Json<PredictRequest>,
) -> Result<Json<ClassificationResult>, AppError> {
    let image = req
        .image_url
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| AppError::BadRequest("no image provided".to_string()))?;

    validate_inline_payload(image)?;

    let result = state.analyzer.analyze(image).await?;
    Ok(Json(result))
}

/// Inline captures arrive as base64 data URLs; reject garbage before it is
/// forwarded upstream. Plain http(s) references pass through untouched.
fn validate_inline_payload(image: &str) -> Result<(), AppError> {
    if !image.starts_with("data:") {
        return Ok(());
    }
    let Some((header, payload)) = image.split_once(',') else {
        return Err(AppError::BadRequest("invalid image payload".to_string()));
    };
    if header.ends_with(";base64") && BASE64.decode(payload).is_err() {
        return Err(AppError::BadRequest("invalid image payload".to_string()));
    }
    Ok(())
}

async fn weather_handler(
    State(state): State<AppState>,
    Query(query): Query<WeatherQuery>,
) -> Result<Json<WeatherReport>, AppError> {
    let weather = state
        .weather
        .as_ref()
        .ok_or(AppError::Unconfigured("weather lookup"))?;

    let city = query
        .city
        .as_deref()
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .ok_or_else(|| AppError::BadRequest("city is required".to_string()))?;

    let conditions = weather.current(city).await?;
    let forecast = ForecastSketch::from_current(conditions.temp);

    Ok(Json(WeatherReport {
        name: conditions.name,
        country: conditions.country,
        temp: conditions.temp.round() as i64,
        feels_like: conditions.feels_like.round() as i64,
        humidity: conditions.humidity,
        wind_speed: conditions.wind_speed,
        description: conditions.description,
        icon: conditions.icon,
        forecast,
    }))
}

async fn callback_handler(
    State(state): State<AppState>,
    RawQuery(query): RawQuery,
) -> Result<Json<CallbackResponse>, AppError> {
    let auth = state
        .auth
        .as_ref()
        .ok_or(AppError::Unconfigured("authentication"))?;

    // The callback lands on the registered sign-in redirect; reattach the
    // query so the resolver sees the URL the browser actually hit.
    let mut url = Url::parse(&auth.config.redirect_sign_in)
        .map_err(|e| AppError::Internal(Box::new(e)))?;
    url.set_query(query.as_deref());

    let resolution = auth.resolver.resolve(&url).await;
    Ok(Json(CallbackResponse {
        route: resolution.route,
        authenticated: resolution.session.authenticated,
        url: resolution.cleaned_url.to_string(),
    }))
}

async fn logout_handler(State(state): State<AppState>) -> Result<Redirect, AppError> {
    let auth = state
        .auth
        .as_ref()
        .ok_or(AppError::Unconfigured("authentication"))?;

    // Local tokens first, then the hosted-UI logout endpoint; only the
    // latter invalidates the provider-side session cookie.
    auth.store.clear().await;
    let url = hosted_logout_url(&auth.config)?;
    info!("redirecting to hosted-UI logout");
    Ok(Redirect::temporary(url.as_str()))
}

async fn health_handler() -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(json!({
            "status": "Server is running",
            "service": env!("CARGO_PKG_NAME"),
            "version": env!("CARGO_PKG_VERSION"),
            "timestamp": chrono::Utc::now().to_rfc3339(),
        })),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inline_base64_payloads_are_validated() {
        assert!(validate_inline_payload("data:image/jpeg;base64,Zm9vYmFy").is_ok());
        assert!(validate_inline_payload("data:image/jpeg;base64,!!!not-base64!!!").is_err());
        assert!(validate_inline_payload("data:missing-comma").is_err());
    }

    #[test]
    fn plain_urls_skip_validation() {
        assert!(validate_inline_payload("https://example.com/leaf.jpg").is_ok());
    }
}
