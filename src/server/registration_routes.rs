use super::state::GuardedRegistrationStore;
use crate::registry_store::NewClubRegistration;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Deserialize;
use tracing::error;

#[derive(Debug, Deserialize)]
pub(super) struct ListQuery {
    #[serde(default = "default_limit")]
    limit: usize,
    #[serde(default)]
    offset: usize,
}

fn default_limit() -> usize {
    50
}

pub(super) async fn list_registrations(
    State(registrations): State<GuardedRegistrationStore>,
    Query(query): Query<ListQuery>,
) -> Response {
    match registrations.list(query.limit, query.offset) {
        Ok(items) => Json(items).into_response(),
        Err(e) => {
            error!("Failed to list registrations: {:#}", e);
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

pub(super) async fn get_registration(
    State(registrations): State<GuardedRegistrationStore>,
    Path(id): Path<String>,
) -> Response {
    match registrations.get(&id) {
        Ok(Some(registration)) => Json(registration).into_response(),
        Ok(None) => StatusCode::NOT_FOUND.into_response(),
        Err(e) => {
            error!("Failed to get registration {}: {:#}", id, e);
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

pub(super) async fn create_registration(
    State(registrations): State<GuardedRegistrationStore>,
    Json(body): Json<NewClubRegistration>,
) -> Response {
    if let Err(reason) = body.validate() {
        return (StatusCode::BAD_REQUEST, reason).into_response();
    }

    match registrations.insert(body) {
        Ok(registration) => (StatusCode::CREATED, Json(registration)).into_response(),
        Err(e) => {
            error!("Failed to create registration: {:#}", e);
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}
