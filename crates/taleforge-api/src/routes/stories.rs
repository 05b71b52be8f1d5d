//! Routes for story creation, job polling, and story retrieval.

use axum::extract::{Path, State};
use axum::http::{HeaderMap, header};
use axum::response::IntoResponse;
use axum::{Json, Router, routing::get, routing::post};
use serde::Deserialize;
use tracing::{info, instrument};
use uuid::Uuid;

use taleforge_core::model::StoryJob;
use taleforge_stories::query;

use crate::error::ApiError;
use crate::state::AppState;

/// Name of the session cookie.
pub const SESSION_COOKIE: &str = "session_id";

/// Request body for POST /create.
#[derive(Debug, Deserialize)]
pub struct CreateStoryRequest {
    /// Theme for the requested story.
    pub theme: String,
}

/// Extracts the session id from the request's cookie header. Unparseable or
/// absent values mean a fresh session.
fn session_id_from_headers(headers: &HeaderMap) -> Option<Uuid> {
    let cookies = headers.get(header::COOKIE)?.to_str().ok()?;
    cookies.split(';').find_map(|pair| {
        let (name, value) = pair.trim().split_once('=')?;
        if name == SESSION_COOKIE {
            Uuid::parse_str(value).ok()
        } else {
            None
        }
    })
}

/// POST /create
///
/// Persists a pending job and schedules generation in the background. The
/// response carries the job handle and echoes the session id as an HttpOnly
/// cookie; generation problems never fail this call.
#[instrument(skip(state, headers, request))]
async fn create_story(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(request): Json<CreateStoryRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let session_id = session_id_from_headers(&headers).unwrap_or_else(Uuid::new_v4);

    info!(%session_id, theme = %request.theme, "handling create_story request");

    let job = state
        .orchestrator
        .create_job(session_id, &request.theme)
        .await?;

    let cookie = format!("{SESSION_COOKIE}={session_id}; Path=/; HttpOnly");
    Ok(([(header::SET_COOKIE, cookie)], Json(job)))
}

/// GET /{job_id}/status
#[instrument(skip(state))]
async fn job_status(
    State(state): State<AppState>,
    Path(job_id): Path<Uuid>,
) -> Result<Json<StoryJob>, ApiError> {
    let job = state.orchestrator.find_job(job_id).await?;
    Ok(Json(job))
}

/// GET /{story_id}/complete
#[instrument(skip(state))]
async fn complete_story(
    State(state): State<AppState>,
    Path(story_id): Path<Uuid>,
) -> Result<Json<query::CompleteStoryView>, ApiError> {
    let view = query::get_complete_story(story_id, state.store.as_ref()).await?;
    Ok(Json(view))
}

/// Returns the router for the stories endpoints.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/create", post(create_story))
        .route("/{job_id}/status", get(job_status))
        .route("/{story_id}/complete", get(complete_story))
}
