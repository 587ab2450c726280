use chrono::NaiveDate;
use rusqlite::Connection;
use serde::Deserialize;

use crate::db::queries;
use crate::models::booking::parse_booking_date;
use crate::models::{Booking, BookingStatus, ClockTime, PaymentStatus, Renter, TimeSlot};
use crate::services::matcher::overlaps;

#[derive(Debug, thiserror::Error)]
pub enum BookingError {
    #[error("{0}")]
    Invalid(String),

    #[error("court {0} not found")]
    CourtNotFound(i64),

    #[error("booking {0} not found")]
    NotFound(i64),

    #[error("court {court_id} is already booked on {date} from {start} to {end}")]
    Conflict {
        court_id: i64,
        date: NaiveDate,
        start: ClockTime,
        end: ClockTime,
    },

    #[error(transparent)]
    Database(#[from] anyhow::Error),
}

/// Request body of the booking-creation flow.
#[derive(Debug, Clone, Deserialize)]
pub struct NewBooking {
    pub court_id: i64,
    pub date: String,
    pub start_time: String,
    pub end_time: String,
    pub notes: Option<String>,
    pub renter: Option<Renter>,
}

/// Creates a pending booking after checking that no other booking still
/// holding the court overlaps it. The price is the court's hourly rate times
/// the booked duration.
pub fn create_booking(conn: &Connection, req: NewBooking) -> Result<Booking, BookingError> {
    let date = parse_booking_date(&req.date).map_err(|e| BookingError::Invalid(e.to_string()))?;
    let start_time = ClockTime::parse(&req.start_time)
        .map_err(|e| BookingError::Invalid(format!("start_time: {e}")))?;
    let end_time = ClockTime::parse(&req.end_time)
        .map_err(|e| BookingError::Invalid(format!("end_time: {e}")))?;

    if start_time >= end_time {
        return Err(BookingError::Invalid(format!(
            "start_time {start_time} must be before end_time {end_time}"
        )));
    }

    let court =
        queries::get_court(conn, req.court_id)?.ok_or(BookingError::CourtNotFound(req.court_id))?;

    let same_day = queries::get_bookings_in_range(conn, court.id, date, date)?;
    if let Some(existing) = same_day.iter().find(|b| {
        b.status.occupies_court() && overlaps(start_time, end_time, b.start_time, b.end_time)
    }) {
        return Err(BookingError::Conflict {
            court_id: court.id,
            date,
            start: existing.start_time,
            end: existing.end_time,
        });
    }

    let minutes = TimeSlot::new(start_time, end_time).duration_minutes();
    let mut booking = Booking {
        id: 0,
        court_id: court.id,
        date,
        start_time,
        end_time,
        status: BookingStatus::Pending,
        payment_status: PaymentStatus::Pending,
        total_price: court.hourly_rate * f64::from(minutes) / 60.0,
        notes: req.notes.filter(|n| !n.trim().is_empty()),
        renter: req.renter.filter(|r| !r.is_empty()),
    };
    booking.id = queries::insert_booking(conn, &booking)?;

    tracing::info!(
        booking_id = booking.id,
        court_id = court.id,
        date = %date,
        start = %start_time,
        end = %end_time,
        "booking created"
    );

    Ok(booking)
}

/// Changes the lifecycle and/or payment status of a booking. `unknown` is
/// only ever a read-side fallback and cannot be written.
pub fn update_status(
    conn: &Connection,
    id: i64,
    status: Option<BookingStatus>,
    payment_status: Option<PaymentStatus>,
) -> Result<Booking, BookingError> {
    if status.is_none() && payment_status.is_none() {
        return Err(BookingError::Invalid(
            "status or payment_status is required".to_string(),
        ));
    }
    if status == Some(BookingStatus::Unknown) || payment_status == Some(PaymentStatus::Unknown) {
        return Err(BookingError::Invalid("unrecognised status value".to_string()));
    }

    if !queries::update_booking_status(conn, id, status, payment_status)? {
        return Err(BookingError::NotFound(id));
    }

    queries::get_booking_by_id(conn, id)?.ok_or(BookingError::NotFound(id))
}
