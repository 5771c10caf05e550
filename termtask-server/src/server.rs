//! Server core: shared state, router, and request handlers.
//!
//! Implements the external interface the client depends on:
//!
//! - identity endpoints under `/auth` authenticated by a session
//!   cookie (`termtask_sid`), including token issuance;
//! - the task store under `/tasks`, authenticated by a bearer token on
//!   every request.
//!
//! Every non-2xx response carries the structured error envelope
//! `{"error": {"code", "message", "details?"}}`.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use termtask_proto::auth::{Credentials, TokenResponse};
use termtask_proto::error::{ErrorCode, ErrorEnvelope};
use termtask_proto::task::{NewTask, Task, TaskId, TaskPatch, validate_title};
use uuid::Uuid;

use crate::sessions::{SessionRegistry, SignupError};
use crate::store::TaskTable;
use crate::token::TokenSigner;

/// Name of the session cookie.
pub const SESSION_COOKIE: &str = "termtask_sid";

/// Shared server state.
pub struct AppState {
    /// Accounts and live sessions.
    pub sessions: SessionRegistry,
    /// Task storage.
    pub tasks: TaskTable,
    /// Bearer token signer/verifier.
    pub signer: TokenSigner,
}

impl AppState {
    /// Creates a state with empty storage and the given token secret.
    #[must_use]
    pub fn new(token_secret: &str) -> Self {
        Self {
            sessions: SessionRegistry::new(),
            tasks: TaskTable::new(),
            signer: TokenSigner::new(token_secret),
        }
    }
}

/// A failed request: status plus error envelope.
#[derive(Debug)]
struct Failure {
    status: StatusCode,
    envelope: ErrorEnvelope,
}

impl Failure {
    fn new(status: StatusCode, code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            status,
            envelope: ErrorEnvelope::new(code, message),
        }
    }

    fn unauthorized() -> Self {
        Self::new(
            StatusCode::UNAUTHORIZED,
            ErrorCode::Unauthorized,
            "not authenticated",
        )
    }

    fn not_found(id: TaskId) -> Self {
        Self::new(
            StatusCode::NOT_FOUND,
            ErrorCode::NotFound,
            format!("no task {id}"),
        )
    }
}

impl IntoResponse for Failure {
    fn into_response(self) -> Response {
        (self.status, Json(self.envelope)).into_response()
    }
}

/// Extracts the session id from the Cookie header, if present.
fn session_id(headers: &HeaderMap) -> Option<String> {
    let cookie_str = headers.get(header::COOKIE)?.to_str().ok()?;
    for part in cookie_str.split(';') {
        let part = part.trim();
        if let Some(value) = part.strip_prefix(SESSION_COOKIE)
            && let Some(value) = value.strip_prefix('=')
        {
            return Some(value.to_string());
        }
    }
    None
}

/// Resolves the session cookie to a user, or fails with 401.
async fn cookie_user(
    state: &AppState,
    headers: &HeaderMap,
) -> Result<termtask_proto::auth::SessionUser, Failure> {
    let sid = session_id(headers).ok_or_else(Failure::unauthorized)?;
    state
        .sessions
        .lookup_user(&sid)
        .await
        .ok_or_else(Failure::unauthorized)
}

/// Resolves the bearer credential to a user, or fails with 401.
fn bearer_user(state: &AppState, headers: &HeaderMap) -> Result<termtask_proto::auth::UserId, Failure> {
    let value = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(Failure::unauthorized)?;
    let token = value.strip_prefix("Bearer ").ok_or_else(Failure::unauthorized)?;
    state
        .signer
        .verify(token)
        .map_err(|_| Failure::unauthorized())
}

fn session_cookie(sid: &str) -> String {
    format!("{SESSION_COOKIE}={sid}; Path=/; HttpOnly; SameSite=Lax")
}

fn expired_session_cookie() -> String {
    format!("{SESSION_COOKIE}=; Path=/; HttpOnly; Max-Age=0")
}

// ---------------------------------------------------------------------------
// Identity handlers
// ---------------------------------------------------------------------------

async fn signup(
    State(state): State<Arc<AppState>>,
    Json(credentials): Json<Credentials>,
) -> Result<Response, Failure> {
    let user = state
        .sessions
        .sign_up(&credentials.email, &credentials.password)
        .await
        .map_err(|e| match e {
            SignupError::EmailTaken => {
                Failure::new(StatusCode::CONFLICT, ErrorCode::Conflict, e.to_string())
            }
            SignupError::MissingFields => {
                Failure::new(StatusCode::BAD_REQUEST, ErrorCode::Validation, e.to_string())
            }
        })?;
    let sid = state.sessions.create_session(user.id).await;
    tracing::info!(user = %user.email, "account created");
    Ok((
        StatusCode::CREATED,
        [(header::SET_COOKIE, session_cookie(&sid))],
        Json(user),
    )
        .into_response())
}

async fn login(
    State(state): State<Arc<AppState>>,
    Json(credentials): Json<Credentials>,
) -> Result<Response, Failure> {
    let user = state
        .sessions
        .verify(&credentials.email, &credentials.password)
        .await
        .ok_or_else(|| {
            // One message for wrong password and unknown email alike.
            Failure::new(
                StatusCode::UNAUTHORIZED,
                ErrorCode::Unauthorized,
                "invalid credentials",
            )
        })?;
    let sid = state.sessions.create_session(user.id).await;
    tracing::info!(user = %user.email, "signed in");
    Ok((
        StatusCode::OK,
        [(header::SET_COOKIE, session_cookie(&sid))],
        Json(user),
    )
        .into_response())
}

async fn logout(State(state): State<Arc<AppState>>, headers: HeaderMap) -> Response {
    if let Some(sid) = session_id(&headers) {
        state.sessions.destroy(&sid).await;
    }
    (
        StatusCode::NO_CONTENT,
        [(header::SET_COOKIE, expired_session_cookie())],
    )
        .into_response()
}

async fn current_session(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Response, Failure> {
    let user = cookie_user(&state, &headers).await?;
    Ok(Json(user).into_response())
}

async fn issue_token(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Response, Failure> {
    let user = cookie_user(&state, &headers).await?;
    let token = state.signer.issue(user.id).map_err(|e| {
        tracing::error!(error = %e, "token signing failed");
        Failure::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            ErrorCode::Unknown,
            "could not issue token",
        )
    })?;
    Ok(Json(TokenResponse { token }).into_response())
}

// ---------------------------------------------------------------------------
// Task handlers
// ---------------------------------------------------------------------------

async fn list_tasks(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<Vec<Task>>, Failure> {
    let user = bearer_user(&state, &headers)?;
    Ok(Json(state.tasks.list(user).await))
}

async fn create_task(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(draft): Json<NewTask>,
) -> Result<Response, Failure> {
    let user = bearer_user(&state, &headers)?;
    validate_title(&draft.title).map_err(|e| {
        Failure::new(StatusCode::BAD_REQUEST, ErrorCode::Validation, e.to_string())
    })?;
    let task = state.tasks.create(user, &draft).await;
    tracing::info!(task_id = %task.id, "task created");
    Ok((StatusCode::CREATED, Json(task)).into_response())
}

async fn update_task(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    headers: HeaderMap,
    Json(patch): Json<TaskPatch>,
) -> Result<Json<Task>, Failure> {
    let user = bearer_user(&state, &headers)?;
    patch.validate().map_err(|e| {
        Failure::new(StatusCode::BAD_REQUEST, ErrorCode::Validation, e.to_string())
    })?;
    let id = TaskId::from_uuid(id);
    state
        .tasks
        .update(user, id, &patch)
        .await
        .map(Json)
        .ok_or_else(|| Failure::not_found(id))
}

async fn delete_task(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    headers: HeaderMap,
) -> Result<StatusCode, Failure> {
    let user = bearer_user(&state, &headers)?;
    let id = TaskId::from_uuid(id);
    if state.tasks.delete(user, id).await {
        tracing::info!(task_id = %id, "task deleted");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(Failure::not_found(id))
    }
}

async fn complete_task(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    headers: HeaderMap,
) -> Result<Json<Task>, Failure> {
    set_completed(&state, &headers, id, true).await
}

async fn uncomplete_task(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    headers: HeaderMap,
) -> Result<Json<Task>, Failure> {
    set_completed(&state, &headers, id, false).await
}

async fn set_completed(
    state: &AppState,
    headers: &HeaderMap,
    id: Uuid,
    completed: bool,
) -> Result<Json<Task>, Failure> {
    let user = bearer_user(state, headers)?;
    let id = TaskId::from_uuid(id);
    state
        .tasks
        .set_completed(user, id, completed)
        .await
        .map(Json)
        .ok_or_else(|| Failure::not_found(id))
}

// ---------------------------------------------------------------------------
// Server startup
// ---------------------------------------------------------------------------

/// Builds the router over the given state.
pub fn router(state: Arc<AppState>) -> axum::Router {
    axum::Router::new()
        .route("/auth/signup", post(signup))
        .route("/auth/login", post(login))
        .route("/auth/logout", post(logout))
        .route("/auth/session", get(current_session))
        .route("/auth/token", post(issue_token))
        .route("/tasks", get(list_tasks).post(create_task))
        .route(
            "/tasks/{id}",
            axum::routing::patch(update_task).delete(delete_task),
        )
        .route(
            "/tasks/{id}/complete",
            post(complete_task).delete(uncomplete_task),
        )
        .with_state(state)
}

/// Starts the server with a fresh state and the given token secret.
///
/// This is the primary entry point used by both `main.rs` and test
/// code. Bind to port 0 to get an OS-assigned port.
///
/// # Errors
///
/// Returns an error if the TCP listener cannot bind to the given
/// address.
pub async fn start_server(
    addr: &str,
    token_secret: &str,
) -> Result<(SocketAddr, tokio::task::JoinHandle<()>), Box<dyn std::error::Error + Send + Sync>> {
    start_server_with_state(addr, Arc::new(AppState::new(token_secret))).await
}

/// Starts the server with a pre-configured [`AppState`].
///
/// Tests use this to keep a handle on the state and observe it (e.g.
/// the task table's list-call counter) while the server runs.
///
/// # Errors
///
/// Returns an error if the TCP listener cannot bind to the given
/// address.
pub async fn start_server_with_state(
    addr: &str,
    state: Arc<AppState>,
) -> Result<(SocketAddr, tokio::task::JoinHandle<()>), Box<dyn std::error::Error + Send + Sync>> {
    let app = router(state);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    let bound_addr = listener.local_addr()?;

    let handle = tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app).await {
            tracing::error!(error = %e, "server error");
        }
    });

    Ok((bound_addr, handle))
}
