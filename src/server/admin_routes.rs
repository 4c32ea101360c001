use super::auth::{AdminSession, Permission};
use super::state::*;
use crate::scheduler::jobs::CANCELLATION_SWEEP_JOB_ID;
use crate::scheduler::{CancellationSettings, JobError, TargetDate};
use crate::work_queue::QueueStatus;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::{error, info};

#[derive(Debug, Deserialize)]
pub(super) struct CancellationDateBody {
    pub month: u32,
    pub day: u32,
}

#[derive(Serialize)]
struct CancellationDateResponse {
    month: u32,
    day: u32,
}

fn internal_error(err: anyhow::Error) -> Response {
    error!("Admin request failed: {:#}", err);
    StatusCode::INTERNAL_SERVER_ERROR.into_response()
}

pub(super) async fn get_cancellation_date(
    session: AdminSession,
    State(server_store): State<GuardedServerStore>,
) -> Result<Response, StatusCode> {
    session.require(Permission::ManageClubSettings)?;
    let settings = CancellationSettings::new(server_store);
    Ok(match settings.target_date() {
        Ok(Some(target)) => Json(CancellationDateResponse {
            month: target.month,
            day: target.day,
        })
        .into_response(),
        Ok(None) => StatusCode::NOT_FOUND.into_response(),
        Err(e) => internal_error(e),
    })
}

pub(super) async fn put_cancellation_date(
    session: AdminSession,
    State(server_store): State<GuardedServerStore>,
    Json(body): Json<CancellationDateBody>,
) -> Result<Response, StatusCode> {
    session.require(Permission::ManageClubSettings)?;

    let target = TargetDate {
        month: body.month,
        day: body.day,
    };
    if !target.is_valid() {
        return Ok((
            StatusCode::BAD_REQUEST,
            format!("{:02}-{:02} is not a valid month-day pair", body.month, body.day),
        )
            .into_response());
    }

    let settings = CancellationSettings::new(server_store);
    let previous = match settings.target_date() {
        Ok(previous) => previous,
        Err(e) => return Ok(internal_error(e)),
    };

    if let Err(e) = settings.set_target_date(&target) {
        return Ok(internal_error(e));
    }

    // Moving the date re-arms the trigger: the old firing record refers to the
    // old date and must not suppress the new one.
    if previous != Some(target) {
        if let Err(e) = settings.clear_last_run() {
            return Ok(internal_error(e));
        }
    }

    info!("Cancellation date set to {}", target);
    Ok(StatusCode::OK.into_response())
}

pub(super) async fn delete_cancellation_date(
    session: AdminSession,
    State(server_store): State<GuardedServerStore>,
) -> Result<Response, StatusCode> {
    session.require(Permission::ManageClubSettings)?;
    let settings = CancellationSettings::new(server_store);
    if let Err(e) = settings.clear_target_date() {
        return Ok(internal_error(e));
    }
    if let Err(e) = settings.clear_last_run() {
        return Ok(internal_error(e));
    }
    info!("Cancellation date cleared");
    Ok(StatusCode::OK.into_response())
}

pub(super) async fn run_cancellation_sweep(
    session: AdminSession,
    State(scheduler_handle): State<OptionalSchedulerHandle>,
) -> Result<Response, StatusCode> {
    session.require(Permission::ManageClubSettings)?;
    let handle = match scheduler_handle {
        Some(handle) => handle,
        None => return Ok(StatusCode::SERVICE_UNAVAILABLE.into_response()),
    };

    Ok(match handle.trigger_job(CANCELLATION_SWEEP_JOB_ID).await {
        Ok(()) => StatusCode::ACCEPTED.into_response(),
        Err(JobError::AlreadyRunning) => StatusCode::CONFLICT.into_response(),
        Err(JobError::NotFound) => StatusCode::NOT_FOUND.into_response(),
        Err(e) => {
            error!("Failed to trigger cancellation sweep: {}", e);
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    })
}

#[derive(Debug, Deserialize)]
pub(super) struct HistoryQuery {
    #[serde(default = "default_history_limit")]
    limit: usize,
}

fn default_history_limit() -> usize {
    20
}

pub(super) async fn get_sweep_history(
    session: AdminSession,
    State(scheduler_handle): State<OptionalSchedulerHandle>,
    Query(query): Query<HistoryQuery>,
) -> Result<Response, StatusCode> {
    session.require(Permission::ManageClubSettings)?;
    let handle = match scheduler_handle {
        Some(handle) => handle,
        None => return Ok(StatusCode::SERVICE_UNAVAILABLE.into_response()),
    };

    Ok(
        match handle.get_job_history(CANCELLATION_SWEEP_JOB_ID, query.limit) {
            Ok(history) => Json(history).into_response(),
            Err(e) => internal_error(e),
        },
    )
}

#[derive(Debug, Deserialize)]
pub(super) struct QueueQuery {
    status: Option<QueueStatus>,
    #[serde(default = "default_queue_limit")]
    limit: usize,
    #[serde(default)]
    offset: usize,
}

fn default_queue_limit() -> usize {
    50
}

#[derive(Serialize)]
struct QueueResponse {
    counts: crate::work_queue::QueueCounts,
    items: Vec<crate::work_queue::QueueItem>,
}

pub(super) async fn get_queue(
    session: AdminSession,
    State(work_queue): State<GuardedWorkQueueStore>,
    Query(query): Query<QueueQuery>,
) -> Result<Response, StatusCode> {
    session.require(Permission::ManageClubSettings)?;

    let counts = match work_queue.counts() {
        Ok(counts) => counts,
        Err(e) => return Ok(internal_error(e)),
    };
    let items = match work_queue.list(query.status, query.limit, query.offset) {
        Ok(items) => items,
        Err(e) => return Ok(internal_error(e)),
    };

    Ok(Json(QueueResponse { counts, items }).into_response())
}

pub(super) async fn send_contract(
    session: AdminSession,
    State(state): State<super::state::ServerState>,
    Path(id): Path<String>,
) -> Result<Response, StatusCode> {
    session.require(Permission::ManageClubSettings)?;

    let mailer = match &state.contract_mailer {
        Some(mailer) => mailer.clone(),
        None => {
            return Ok((
                StatusCode::SERVICE_UNAVAILABLE,
                "Mail delivery is not configured",
            )
                .into_response())
        }
    };

    let registration = match state.registrations.get(&id) {
        Ok(Some(registration)) => registration,
        Ok(None) => return Ok(StatusCode::NOT_FOUND.into_response()),
        Err(e) => return Ok(internal_error(e)),
    };

    Ok(match mailer.send_contract(&registration).await {
        Ok(()) => StatusCode::OK.into_response(),
        Err(e) => {
            error!("Failed to send contract for {}: {}", id, e);
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    })
}
