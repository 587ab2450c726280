use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::Local;
use serde::Deserialize;

use super::parse_date_param;
use crate::db::{self, queries};
use crate::errors::AppError;
use crate::models::{Booking, BookingStatus, PaymentStatus, ViewState};
use crate::services::booking::{self, NewBooking};
use crate::state::AppState;

// GET /api/courts/:id/bookings
#[derive(Deserialize)]
pub struct RangeQuery {
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

/// Raw booking listing in the shape the remote booking source consumes.
/// Without a range it covers the current week.
pub async fn list_court_bookings(
    State(state): State<Arc<AppState>>,
    Path(court_id): Path<i64>,
    Query(query): Query<RangeQuery>,
) -> Result<Json<Vec<Booking>>, AppError> {
    let this_week = ViewState::new(court_id, Local::now().date_naive());
    let start = match query.start_date.as_deref() {
        Some(s) => parse_date_param("start_date", s)?,
        None => this_week.week_start(),
    };
    let end = match query.end_date.as_deref() {
        Some(s) => parse_date_param("end_date", s)?,
        None => this_week.week_end().max(start),
    };
    if end < start {
        return Err(AppError::Validation(
            "end_date must not be before start_date".to_string(),
        ));
    }

    let conn = db::lock(&state.db)?;
    Ok(Json(queries::get_bookings_in_range(&conn, court_id, start, end)?))
}

// GET /api/bookings/:id
pub async fn get_booking(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<Booking>, AppError> {
    let conn = db::lock(&state.db)?;
    queries::get_booking_by_id(&conn, id)?
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("booking {id}")))
}

// POST /api/bookings
pub async fn create_booking(
    State(state): State<Arc<AppState>>,
    Json(body): Json<NewBooking>,
) -> Result<(StatusCode, Json<Booking>), AppError> {
    let conn = db::lock(&state.db)?;
    let created = booking::create_booking(&conn, body)?;
    Ok((StatusCode::CREATED, Json(created)))
}

// PATCH /api/bookings/:id/status
#[derive(Deserialize)]
pub struct StatusUpdate {
    pub status: Option<String>,
    pub payment_status: Option<String>,
}

pub async fn update_booking_status(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Json(body): Json<StatusUpdate>,
) -> Result<Json<Booking>, AppError> {
    let status = body.status.as_deref().map(BookingStatus::parse);
    let payment_status = body.payment_status.as_deref().map(PaymentStatus::parse);

    let updated = {
        let conn = db::lock(&state.db)?;
        booking::update_status(&conn, id, status, payment_status)?
    };
    tracing::info!(
        booking_id = id,
        status = updated.status.as_str(),
        payment_status = updated.payment_status.as_str(),
        "booking status updated"
    );

    Ok(Json(updated))
}
