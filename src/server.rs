use crate::config::MailConfig;
use crate::contact::ContactMessage;
use crate::gesture::Handle;
use crate::mail::{self, MailError, MailProvider};
use crate::registry::Catalog;
use crate::session::{Action, Reply, SessionHandle};
use crate::window_manager::OpenOutcome;
use crate::Result;
use axum::{
    extract::{rejection::JsonRejection, FromRequest, Path, Request, State},
    http::{header, StatusCode},
    response::{Html, IntoResponse, Response},
    routing::{get, post},
    Form, Json, Router,
};
use log::{debug, error, info, warn};
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;
use tokio::net::TcpListener;

#[derive(Clone)]
pub struct AppState {
    pub session: SessionHandle,
    pub catalog: Catalog,
    pub mail: MailConfig,
    /// Provider credential, resolved from the environment at startup.
    pub api_key: Option<String>,
    pub provider: Arc<dyn MailProvider>,
}

impl AppState {
    pub fn new(
        session: SessionHandle,
        catalog: Catalog,
        mail: MailConfig,
        api_key: Option<String>,
        provider: Arc<dyn MailProvider>,
    ) -> Self {
        if api_key.is_none() {
            warn!(
                "{} is not set; contact submissions will fail until it is configured",
                mail.api_key_env
            );
        }
        Self {
            session,
            catalog,
            mail,
            api_key,
            provider,
        }
    }
}

#[derive(Debug)]
pub enum ApiError {
    NotConfigured(String),
    InvalidRequest(String),
    ProviderRejected(String),
    SendFailed,
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::NotConfigured(env) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!(
                    "API key not configured. Please add {} to your environment variables.",
                    env
                ),
            ),
            ApiError::InvalidRequest(message) => (StatusCode::BAD_REQUEST, message),
            ApiError::ProviderRejected(message) => (StatusCode::BAD_REQUEST, message),
            ApiError::SendFailed => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to send email".to_string(),
            ),
            ApiError::Internal(message) => (StatusCode::INTERNAL_SERVER_ERROR, message),
        };
        (status, Json(json!({ "error": message }))).into_response()
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        ApiError::Internal(err.to_string())
    }
}

type ApiResult<T> = std::result::Result<T, ApiError>;

#[derive(Debug, Deserialize)]
struct PointerBody {
    x: f64,
    y: f64,
}

#[derive(Debug, Deserialize)]
struct SizeBody {
    width: f64,
    height: f64,
}

#[derive(Debug, Deserialize)]
struct PressBody {
    handle: Handle,
    x: f64,
    y: f64,
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(desktop_page))
        .route("/healthz", get(health))
        .route("/api/panels", get(list_panels))
        .route("/api/windows", get(list_windows))
        .route("/api/windows/{id}/open", post(open_window))
        .route("/api/windows/{id}/close", post(close_window))
        .route("/api/windows/{id}/focus", post(focus_window))
        .route("/api/windows/{id}/move", post(move_window))
        .route("/api/windows/{id}/resize", post(resize_window))
        .route("/api/windows/{id}/press", post(press_window))
        .route("/api/pointer/move", post(pointer_move))
        .route("/api/pointer/release", post(pointer_release))
        .route("/api/send-email", post(send_email))
        .with_state(state)
}

pub async fn serve(listener: TcpListener, state: AppState) -> Result<()> {
    info!("HTTP server listening on {}", listener.local_addr()?);
    axum::serve(listener, build_router(state)).await?;
    Ok(())
}

async fn health() -> &'static str {
    "ok"
}

async fn desktop_page(State(state): State<AppState>) -> ApiResult<Html<String>> {
    Ok(Html(state.session.render_page().await?))
}

async fn list_panels(State(state): State<AppState>) -> Json<Value> {
    Json(json!({ "panels": state.catalog.iter().collect::<Vec<_>>() }))
}

async fn list_windows(State(state): State<AppState>) -> ApiResult<Json<Value>> {
    let windows = state.session.windows().await?;
    Ok(Json(json!({ "windows": windows })))
}

async fn open_window(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Value>> {
    window_action(&state, Action::Open(id)).await
}

async fn close_window(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Value>> {
    window_action(&state, Action::Close(id)).await
}

async fn focus_window(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Value>> {
    window_action(&state, Action::Focus(id)).await
}

async fn move_window(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: std::result::Result<Json<PointerBody>, JsonRejection>,
) -> ApiResult<Json<Value>> {
    let PointerBody { x, y } = json_body(payload)?;
    window_action(&state, Action::Move { id, x, y }).await
}

async fn resize_window(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: std::result::Result<Json<SizeBody>, JsonRejection>,
) -> ApiResult<Json<Value>> {
    let SizeBody { width, height } = json_body(payload)?;
    window_action(&state, Action::Resize { id, width, height }).await
}

async fn press_window(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: std::result::Result<Json<PressBody>, JsonRejection>,
) -> ApiResult<Json<Value>> {
    let PressBody { handle, x, y } = json_body(payload)?;
    window_action(&state, Action::Press { id, handle, x, y }).await
}

async fn pointer_move(
    State(state): State<AppState>,
    payload: std::result::Result<Json<PointerBody>, JsonRejection>,
) -> ApiResult<Json<Value>> {
    let PointerBody { x, y } = json_body(payload)?;
    match state.session.request(Action::PointerMove { x, y }).await? {
        Reply::Provisional(provisional) => Ok(Json(json!({ "provisional": provisional }))),
        other => Err(unexpected(other)),
    }
}

async fn pointer_release(
    State(state): State<AppState>,
    payload: std::result::Result<Json<PointerBody>, JsonRejection>,
) -> ApiResult<Json<Value>> {
    let PointerBody { x, y } = json_body(payload)?;
    window_action(&state, Action::Release { x, y }).await
}

/// Applies one window action and answers with its outcome plus the resulting
/// stack, so the page can restyle every window from a single response.
async fn window_action(state: &AppState, action: Action) -> ApiResult<Json<Value>> {
    let mut body = match state.session.request(action).await? {
        Reply::Opened(outcome) => json!({
            "applied": outcome != OpenOutcome::Unknown,
            "outcome": outcome,
        }),
        Reply::Applied(applied) => json!({ "applied": applied }),
        Reply::Committed(committed) => json!({
            "applied": committed.is_some(),
            "committed": committed,
        }),
        other => return Err(unexpected(other)),
    };
    body["windows"] = json!(state.session.windows().await?);
    Ok(Json(body))
}

fn json_body<T>(payload: std::result::Result<Json<T>, JsonRejection>) -> ApiResult<T> {
    payload.map(|Json(body)| body).map_err(|rejection| {
        warn!("Rejected request body: {}", rejection.body_text());
        ApiError::InvalidRequest(rejection.body_text())
    })
}

fn unexpected(reply: Reply) -> ApiError {
    ApiError::Internal(format!("Unexpected session reply: {:?}", reply))
}

/// Reads a contact submission sent either as JSON or as a plain HTML form post.
async fn contact_payload(request: Request) -> ApiResult<ContactMessage> {
    let form_encoded = request
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value.starts_with("application/x-www-form-urlencoded"));

    let parsed = if form_encoded {
        Form::<ContactMessage>::from_request(request, &())
            .await
            .map(|Form(message)| message)
            .map_err(|rejection| rejection.body_text())
    } else {
        Json::<ContactMessage>::from_request(request, &())
            .await
            .map(|Json(message)| message)
            .map_err(|rejection| rejection.body_text())
    };

    parsed.map_err(|reason| {
        warn!("Rejected contact payload: {}", reason);
        ApiError::InvalidRequest(reason)
    })
}

async fn send_email(State(state): State<AppState>, request: Request) -> ApiResult<Json<Value>> {
    let Some(api_key) = state.api_key.as_deref() else {
        debug!("{} not found", state.mail.api_key_env);
        return Err(ApiError::NotConfigured(state.mail.api_key_env.clone()));
    };

    let message = contact_payload(request).await?;
    message
        .validate()
        .map_err(|e| ApiError::InvalidRequest(e.to_string()))?;

    let email = mail::compose(&state.mail, &message);
    match state.provider.send(api_key, &email).await {
        Ok(data) => {
            info!("Contact email sent for subject '{}'", message.subject);
            Ok(Json(json!({ "success": true, "data": data })))
        }
        Err(MailError::Rejected { status, message: reason }) => {
            error!("Mail provider rejected request ({}): {}", status, reason);
            Err(ApiError::ProviderRejected(reason))
        }
        Err(e) => {
            error!("Mail provider error: {}", e);
            Err(ApiError::SendFailed)
        }
    }
}
