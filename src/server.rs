use crate::config::ServiceConfig;
use crate::gateway::Dispatcher;
use crate::platform::RestPlatform;
use crate::service::TitleService;
use crate::title::Title;
use crate::transport::gateway_session::handle_socket;
use axum::{
    extract::{State, WebSocketUpgrade},
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use serde::Serialize;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

#[derive(Clone)]
struct ServerState {
    dispatcher: Arc<Dispatcher>,
    gateway_secret: Option<String>,
}

#[derive(Debug, Serialize)]
struct OkResponse {
    ok: bool,
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    ok: bool,
    error: String,
}

#[derive(Debug, Serialize)]
struct TitleView {
    #[serde(flatten)]
    title: Title,
    #[serde(rename = "titledName")]
    titled_name: String,
}

#[derive(Debug, Serialize)]
struct TitlesResponse {
    titles: Vec<TitleView>,
}

pub async fn run(config: ServiceConfig) -> anyhow::Result<()> {
    let platform = Arc::new(RestPlatform::new(
        config.platform_api_url.clone(),
        config.platform_token.clone(),
        config.confirm_emoji.clone(),
        config.deny_emoji.clone(),
    ));
    let service = Arc::new(TitleService::new(
        platform.clone(),
        platform,
        config.max_room_name_length,
    ));
    let state = Arc::new(ServerState {
        dispatcher: Arc::new(Dispatcher::new(service)),
        gateway_secret: config.gateway_secret.clone(),
    });
    if state.gateway_secret.is_none() {
        tracing::warn!("GATEWAY_SECRET is not set, gateway and internal endpoints are open");
    }

    let app = router(state);
    let address = format!("0.0.0.0:{}", config.port);
    tracing::info!("title service listening on {address}");
    let listener = tokio::net::TcpListener::bind(&address).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    tracing::info!("title service stopped");
    Ok(())
}

fn router(state: Arc<ServerState>) -> Router {
    Router::new()
        .route("/api/health", get(health))
        .route("/api/gateway", get(gateway_ws_handler))
        .route("/internal/titles", get(list_titles))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn shutdown_signal() {
    if let Err(error) = tokio::signal::ctrl_c().await {
        tracing::warn!(?error, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}

async fn health() -> impl IntoResponse {
    Json(OkResponse { ok: true })
}

async fn gateway_ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<ServerState>>,
    headers: HeaderMap,
) -> impl IntoResponse {
    if !state.is_authorized(&headers) {
        return unauthorized();
    }
    let dispatcher = Arc::clone(&state.dispatcher);
    ws.on_upgrade(move |socket| handle_socket(socket, dispatcher))
        .into_response()
}

async fn list_titles(
    State(state): State<Arc<ServerState>>,
    headers: HeaderMap,
) -> impl IntoResponse {
    if !state.is_authorized(&headers) {
        return unauthorized();
    }
    let titles = state
        .dispatcher
        .service()
        .registry()
        .titles()
        .await
        .into_iter()
        .map(|title| TitleView {
            titled_name: title.titled_name(),
            title,
        })
        .collect::<Vec<_>>();
    (StatusCode::OK, Json(TitlesResponse { titles })).into_response()
}

impl ServerState {
    fn is_authorized(&self, headers: &HeaderMap) -> bool {
        match &self.gateway_secret {
            Some(secret) => bearer_token(headers) == Some(secret.as_str()),
            None => true,
        }
    }
}

fn unauthorized() -> axum::response::Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(ErrorResponse {
            ok: false,
            error: "Unauthorized".to_string(),
        }),
    )
        .into_response()
}

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let authorization = headers.get("authorization")?;
    let value = authorization.to_str().ok()?;
    value.strip_prefix("Bearer ").map(str::trim)
}
