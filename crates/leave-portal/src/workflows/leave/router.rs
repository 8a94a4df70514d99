use std::sync::Arc;

use axum::{
    async_trait,
    extract::{FromRequestParts, Path, Query, State},
    http::{request::Parts, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::json;

use super::approval::ApprovalAction;
use super::domain::{ActorContext, LeaveId, LeaveRequestDraft, Role, UserId};
use super::queue::StatusSummary;
use super::repository::{Directory, LeaveRepository, RepositoryError};
use super::service::{LeaveService, LeaveServiceError};

pub const USER_ID_HEADER: &str = "x-user-id";
pub const ROLE_HEADER: &str = "x-user-role";
pub const DEPARTMENT_HEADER: &str = "x-user-department";

/// Router builder exposing the leave lifecycle over HTTP.
pub fn leave_router<R, D>(service: Arc<LeaveService<R, D>>) -> Router
where
    R: LeaveRepository + 'static,
    D: Directory + 'static,
{
    Router::new()
        .route("/api/v1/leaves", post(submit_handler::<R, D>))
        .route(
            "/api/v1/leaves/:leave_id",
            get(get_handler::<R, D>).put(edit_handler::<R, D>),
        )
        .route(
            "/api/v1/leaves/:leave_id/recommend",
            post(recommend_handler::<R, D>),
        )
        .route(
            "/api/v1/leaves/:leave_id/approve",
            post(approve_handler::<R, D>),
        )
        .route(
            "/api/v1/leaves/:leave_id/reject",
            post(reject_handler::<R, D>),
        )
        .route("/api/v1/queue", get(queue_handler::<R, D>))
        .route("/api/v1/summary", get(summary_handler::<R, D>))
        .route("/api/v1/submission-window", get(window_handler::<R, D>))
        .route(
            "/api/v1/users/:user_id/leaves",
            get(history_handler::<R, D>),
        )
        .route(
            "/api/v1/users/:user_id/balances",
            get(balances_handler::<R, D>),
        )
        .with_state(service)
}

/// Caller identity forwarded by the upstream identity provider.
#[async_trait]
impl<S> FromRequestParts<S> for ActorContext
where
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        actor_from_headers(&parts.headers).map_err(|message| {
            let payload = json!({ "error": message });
            (StatusCode::UNAUTHORIZED, Json(payload)).into_response()
        })
    }
}

pub(crate) fn actor_from_headers(headers: &HeaderMap) -> Result<ActorContext, String> {
    let header = |name: &str| {
        headers
            .get(name)
            .and_then(|value| value.to_str().ok())
            .map(str::trim)
            .filter(|value| !value.is_empty())
    };

    let user_id =
        header(USER_ID_HEADER).ok_or_else(|| format!("missing {USER_ID_HEADER} header"))?;
    let role: Role = header(ROLE_HEADER)
        .ok_or_else(|| format!("missing {ROLE_HEADER} header"))?
        .parse()
        .map_err(|error: super::domain::UnknownVariant| error.to_string())?;

    Ok(ActorContext::new(user_id, role, header(DEPARTMENT_HEADER)))
}

pub(crate) fn error_response(error: LeaveServiceError) -> Response {
    let status = match &error {
        LeaveServiceError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
        LeaveServiceError::Authorization(_) => StatusCode::FORBIDDEN,
        LeaveServiceError::Transition(_) => StatusCode::CONFLICT,
        LeaveServiceError::Repository(RepositoryError::NotFound) => StatusCode::NOT_FOUND,
        LeaveServiceError::Repository(RepositoryError::Conflict) => StatusCode::CONFLICT,
        LeaveServiceError::Repository(RepositoryError::Unavailable(_))
        | LeaveServiceError::Directory(_) => StatusCode::SERVICE_UNAVAILABLE,
    };

    let payload = json!({
        "error": error.to_string(),
    });
    (status, Json(payload)).into_response()
}

pub(crate) async fn submit_handler<R, D>(
    State(service): State<Arc<LeaveService<R, D>>>,
    actor: ActorContext,
    Json(draft): Json<LeaveRequestDraft>,
) -> Response
where
    R: LeaveRepository + 'static,
    D: Directory + 'static,
{
    match service.submit(&actor, draft) {
        Ok(record) => (StatusCode::CREATED, Json(record)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn edit_handler<R, D>(
    State(service): State<Arc<LeaveService<R, D>>>,
    actor: ActorContext,
    Path(leave_id): Path<String>,
    Json(draft): Json<LeaveRequestDraft>,
) -> Response
where
    R: LeaveRepository + 'static,
    D: Directory + 'static,
{
    match service.edit(&actor, &LeaveId(leave_id), draft) {
        Ok(record) => (StatusCode::OK, Json(record)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn get_handler<R, D>(
    State(service): State<Arc<LeaveService<R, D>>>,
    Path(leave_id): Path<String>,
) -> Response
where
    R: LeaveRepository + 'static,
    D: Directory + 'static,
{
    match service.get(&LeaveId(leave_id)) {
        Ok(record) => (StatusCode::OK, Json(record)).into_response(),
        Err(error) => error_response(error),
    }
}

async fn recommend_handler<R, D>(
    State(service): State<Arc<LeaveService<R, D>>>,
    actor: ActorContext,
    Path(leave_id): Path<String>,
) -> Response
where
    R: LeaveRepository + 'static,
    D: Directory + 'static,
{
    action_response(&service, &actor, leave_id, ApprovalAction::Recommend)
}

async fn approve_handler<R, D>(
    State(service): State<Arc<LeaveService<R, D>>>,
    actor: ActorContext,
    Path(leave_id): Path<String>,
) -> Response
where
    R: LeaveRepository + 'static,
    D: Directory + 'static,
{
    action_response(&service, &actor, leave_id, ApprovalAction::Approve)
}

async fn reject_handler<R, D>(
    State(service): State<Arc<LeaveService<R, D>>>,
    actor: ActorContext,
    Path(leave_id): Path<String>,
) -> Response
where
    R: LeaveRepository + 'static,
    D: Directory + 'static,
{
    action_response(&service, &actor, leave_id, ApprovalAction::Reject)
}

fn action_response<R, D>(
    service: &LeaveService<R, D>,
    actor: &ActorContext,
    leave_id: String,
    action: ApprovalAction,
) -> Response
where
    R: LeaveRepository + 'static,
    D: Directory + 'static,
{
    match service.act(actor, &LeaveId(leave_id), action) {
        Ok(record) => (StatusCode::OK, Json(record)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn queue_handler<R, D>(
    State(service): State<Arc<LeaveService<R, D>>>,
    actor: ActorContext,
) -> Response
where
    R: LeaveRepository + 'static,
    D: Directory + 'static,
{
    match service.queue(&actor) {
        Ok(records) => (StatusCode::OK, Json(records)).into_response(),
        Err(error) => error_response(error),
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct SummaryPayload {
    #[serde(flatten)]
    pub(crate) counts: StatusSummary,
    pub(crate) in_flight: usize,
}

pub(crate) async fn summary_handler<R, D>(
    State(service): State<Arc<LeaveService<R, D>>>,
    actor: ActorContext,
) -> Response
where
    R: LeaveRepository + 'static,
    D: Directory + 'static,
{
    match service.summary(&actor) {
        Ok(counts) => {
            let payload = SummaryPayload {
                in_flight: counts.in_flight(),
                counts,
            };
            (StatusCode::OK, Json(payload)).into_response()
        }
        Err(error) => error_response(error),
    }
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct WindowQuery {
    #[serde(default)]
    pub(crate) date: Option<NaiveDate>,
}

pub(crate) async fn window_handler<R, D>(
    State(service): State<Arc<LeaveService<R, D>>>,
    Query(query): Query<WindowQuery>,
) -> Response
where
    R: LeaveRepository + 'static,
    D: Directory + 'static,
{
    let window = service.submission_window(query.date);
    (StatusCode::OK, Json(window)).into_response()
}

async fn history_handler<R, D>(
    State(service): State<Arc<LeaveService<R, D>>>,
    Path(user_id): Path<String>,
) -> Response
where
    R: LeaveRepository + 'static,
    D: Directory + 'static,
{
    match service.history(&UserId(user_id)) {
        Ok(records) => (StatusCode::OK, Json(records)).into_response(),
        Err(error) => error_response(error),
    }
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct BalanceQuery {
    #[serde(default)]
    pub(crate) year: Option<i32>,
}

pub(crate) async fn balances_handler<R, D>(
    State(service): State<Arc<LeaveService<R, D>>>,
    Path(user_id): Path<String>,
    Query(query): Query<BalanceQuery>,
) -> Response
where
    R: LeaveRepository + 'static,
    D: Directory + 'static,
{
    let year = query.year.unwrap_or_else(|| service.current_year());
    match service.balances(&UserId(user_id.clone()), year) {
        Ok(balances) => {
            let entries: Vec<_> = balances
                .into_iter()
                .map(|(leave_type, balance)| {
                    json!({
                        "leave_type": leave_type,
                        "limit": balance.limit,
                        "used": balance.used,
                        "remaining": balance.remaining,
                    })
                })
                .collect();
            let payload = json!({
                "user_id": user_id,
                "year": year,
                "balances": entries,
            });
            (StatusCode::OK, Json(payload)).into_response()
        }
        Err(error) => error_response(error),
    }
}
