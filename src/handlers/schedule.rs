use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::Json;
use chrono::Local;
use serde::{Deserialize, Serialize};

use super::parse_date_param;
use crate::db::{self, queries};
use crate::errors::AppError;
use crate::models::{OccupancySummary, ViewState, WeekGrid};
use crate::services::schedule::load_week_grid;
use crate::state::AppState;

#[derive(Deserialize)]
pub struct ScheduleQuery {
    /// Any day of the wanted week; defaults to today.
    pub week: Option<String>,
}

#[derive(Serialize)]
pub struct ScheduleResponse {
    #[serde(flatten)]
    pub grid: WeekGrid,
    pub summary: OccupancySummary,
}

// GET /api/courts/:id/schedule
pub async fn get_schedule(
    State(state): State<Arc<AppState>>,
    Path(court_id): Path<i64>,
    Query(query): Query<ScheduleQuery>,
) -> Result<Json<ScheduleResponse>, AppError> {
    let anchor = match query.week.as_deref() {
        Some(s) => parse_date_param("week", s)?,
        None => Local::now().date_naive(),
    };
    let view = ViewState::new(court_id, anchor);

    // Remote backends own their courts; only the local store can tell.
    if state.config.uses_local_bookings() {
        let conn = db::lock(&state.db)?;
        if queries::get_court(&conn, court_id)?.is_none() {
            return Err(AppError::NotFound(format!("court {court_id}")));
        }
    }

    let grid = load_week_grid(state.bookings.as_ref(), &view, state.config.slot_range())
        .await
        .map_err(|e| {
            tracing::error!(error = %e, court_id, "failed to load bookings for schedule");
            AppError::Upstream(e.to_string())
        })?;
    let summary = grid.summary();

    Ok(Json(ScheduleResponse { grid, summary }))
}
