pub mod bookings;
pub mod courts;
pub mod health;
pub mod schedule;

use chrono::NaiveDate;

use crate::errors::AppError;
use crate::models::booking::parse_booking_date;

fn parse_date_param(name: &str, value: &str) -> Result<NaiveDate, AppError> {
    parse_booking_date(value).map_err(|_| AppError::Validation(format!("{name} must be YYYY-MM-DD")))
}
