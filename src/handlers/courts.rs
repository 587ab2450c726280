use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;

use crate::db::{self, queries};
use crate::errors::AppError;
use crate::models::{Court, NewCourt};
use crate::state::AppState;

// GET /api/courts
pub async fn list_courts(State(state): State<Arc<AppState>>) -> Result<Json<Vec<Court>>, AppError> {
    let conn = db::lock(&state.db)?;
    Ok(Json(queries::list_courts(&conn)?))
}

// GET /api/courts/:id
pub async fn get_court(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<Court>, AppError> {
    let conn = db::lock(&state.db)?;
    queries::get_court(&conn, id)?
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("court {id}")))
}

// POST /api/courts
pub async fn create_court(
    State(state): State<Arc<AppState>>,
    Json(body): Json<NewCourt>,
) -> Result<(StatusCode, Json<Court>), AppError> {
    let name = body.name.trim();
    if name.is_empty() {
        return Err(AppError::Validation("name is required".to_string()));
    }
    if !body.hourly_rate.is_finite() || body.hourly_rate < 0.0 {
        return Err(AppError::Validation(
            "hourly_rate must be a non-negative number".to_string(),
        ));
    }

    let court = NewCourt {
        name: name.to_string(),
        ..body
    };

    let created = {
        let conn = db::lock(&state.db)?;
        queries::create_court(&conn, &court)?
    };
    tracing::info!(court_id = created.id, name = %created.name, "court created");

    Ok((StatusCode::CREATED, Json(created)))
}
