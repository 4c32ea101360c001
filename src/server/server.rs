use anyhow::Result;
use std::time::{Duration, Instant};

use axum::{
    extract::State,
    middleware,
    response::IntoResponse,
    routing::{delete, get, post, put},
    Json, Router,
};
use serde::Serialize;
use tokio_util::sync::CancellationToken;
use tracing::info;

use super::admin_routes::*;
use super::registration_routes::*;
use super::state::*;
use super::{log_requests, ServerConfig};

#[derive(Serialize)]
struct HealthResponse {
    uptime: String,
    hash: String,
}

fn format_uptime(duration: Duration) -> String {
    let total_seconds = duration.as_secs();

    let days = total_seconds / 86_400;
    let hours = (total_seconds % 86_400) / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;

    format!("{}d {:02}:{:02}:{:02}", days, hours, minutes, seconds)
}

async fn health(State(state): State<ServerState>) -> impl IntoResponse {
    Json(HealthResponse {
        uptime: format_uptime(state.start_time.elapsed()),
        hash: state.hash.clone(),
    })
}

pub fn make_app(state: ServerState) -> Router {
    let registration_routes: Router = Router::new()
        .route("/registrations", get(list_registrations))
        .route("/registrations", post(create_registration))
        .route("/registrations/{id}", get(get_registration))
        .with_state(state.clone());

    let admin_routes: Router = Router::new()
        .route("/settings/cancellation-date", get(get_cancellation_date))
        .route("/settings/cancellation-date", put(put_cancellation_date))
        .route(
            "/settings/cancellation-date",
            delete(delete_cancellation_date),
        )
        .route("/jobs/cancellation-sweep/run", post(run_cancellation_sweep))
        .route("/jobs/cancellation-sweep/history", get(get_sweep_history))
        .route("/queue", get(get_queue))
        .route("/registrations/{id}/send-contract", post(send_contract))
        .with_state(state.clone());

    Router::new()
        .route("/health", get(health))
        .with_state(state.clone())
        .merge(registration_routes)
        .nest("/admin", admin_routes)
        .layer(middleware::from_fn_with_state(state, log_requests))
}

pub async fn run_server(
    state: ServerState,
    shutdown_token: CancellationToken,
) -> Result<()> {
    let config: ServerConfig = state.config.clone();
    let app = make_app(state);

    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", config.port)).await?;
    info!("Listening on port {}", config.port);

    axum::serve(listener, app)
        .with_graceful_shutdown(async move { shutdown_token.cancelled().await })
        .await?;
    Ok(())
}
