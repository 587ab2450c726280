use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::time_slot::{ClockParseError, ClockTime};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Booking {
    pub id: i64,
    pub court_id: i64,
    pub date: NaiveDate,
    pub start_time: ClockTime,
    pub end_time: ClockTime,
    pub status: BookingStatus,
    pub payment_status: PaymentStatus,
    pub total_price: f64,
    pub notes: Option<String>,
    pub renter: Option<Renter>,
}

/// Contact details of the renter, copied onto the booking when it was made.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Renter {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
}

impl Renter {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.phone.is_none() && self.email.is_none()
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum BookingStatus {
    Pending,
    Confirmed,
    Completed,
    Cancelled,
    #[serde(other)]
    Unknown,
}

impl BookingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::Pending => "pending",
            BookingStatus::Confirmed => "confirmed",
            BookingStatus::Completed => "completed",
            BookingStatus::Cancelled => "cancelled",
            BookingStatus::Unknown => "unknown",
        }
    }

    /// Unrecognised values become `Unknown` instead of failing.
    pub fn parse(s: &str) -> Self {
        match s.trim().to_ascii_lowercase().as_str() {
            "pending" => BookingStatus::Pending,
            "confirmed" => BookingStatus::Confirmed,
            "completed" => BookingStatus::Completed,
            "cancelled" | "canceled" => BookingStatus::Cancelled,
            _ => BookingStatus::Unknown,
        }
    }

    /// Whether the booking still holds its time on the court.
    pub fn occupies_court(&self) -> bool {
        !matches!(self, BookingStatus::Cancelled)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    Pending,
    Paid,
    Refunded,
    #[serde(other)]
    Unknown,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Pending => "pending",
            PaymentStatus::Paid => "paid",
            PaymentStatus::Refunded => "refunded",
            PaymentStatus::Unknown => "unknown",
        }
    }

    pub fn parse(s: &str) -> Self {
        match s.trim().to_ascii_lowercase().as_str() {
            "pending" => PaymentStatus::Pending,
            "paid" => PaymentStatus::Paid,
            "refunded" => PaymentStatus::Refunded,
            _ => PaymentStatus::Unknown,
        }
    }
}

/// A booking record as it arrives from an untyped HTTP boundary. Every field
/// is optional; `Booking::try_from` decides what is usable.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawBooking {
    pub id: Option<i64>,
    #[serde(alias = "resource_id")]
    pub court_id: Option<i64>,
    #[serde(alias = "booking_date")]
    pub date: Option<String>,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    pub status: Option<String>,
    pub payment_status: Option<String>,
    #[serde(alias = "total_amount")]
    pub total_price: Option<serde_json::Value>,
    #[serde(alias = "note")]
    pub notes: Option<String>,
    #[serde(alias = "user")]
    pub renter: Option<Renter>,
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RecordError {
    #[error("missing field: {0}")]
    Missing(&'static str),
    #[error("invalid date: {0}")]
    Date(String),
    #[error("invalid {field}: {source}")]
    Time {
        field: &'static str,
        source: ClockParseError,
    },
    #[error("invalid total price: {0}")]
    Price(String),
}

/// Accepts `YYYY-MM-DD` as well as timestamps such as
/// `2024-06-01T00:00:00.000000Z`; only the date component is kept.
pub fn parse_booking_date(s: &str) -> Result<NaiveDate, RecordError> {
    let s = s.trim();
    let head = s.get(..10).unwrap_or(s);
    NaiveDate::parse_from_str(head, "%Y-%m-%d").map_err(|_| RecordError::Date(s.to_string()))
}

fn parse_price(value: Option<serde_json::Value>) -> Result<f64, RecordError> {
    match value {
        None | Some(serde_json::Value::Null) => Ok(0.0),
        Some(serde_json::Value::Number(n)) => n
            .as_f64()
            .ok_or_else(|| RecordError::Price(n.to_string())),
        Some(serde_json::Value::String(s)) => s
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|p| p.is_finite())
            .ok_or(RecordError::Price(s)),
        Some(other) => Err(RecordError::Price(other.to_string())),
    }
}

impl TryFrom<RawBooking> for Booking {
    type Error = RecordError;

    fn try_from(raw: RawBooking) -> Result<Self, Self::Error> {
        let id = raw.id.ok_or(RecordError::Missing("id"))?;
        let court_id = raw.court_id.ok_or(RecordError::Missing("court_id"))?;
        let date = parse_booking_date(raw.date.as_deref().ok_or(RecordError::Missing("date"))?)?;
        let start_time = ClockTime::parse(
            raw.start_time
                .as_deref()
                .ok_or(RecordError::Missing("start_time"))?,
        )
        .map_err(|source| RecordError::Time {
            field: "start_time",
            source,
        })?;
        let end_time = ClockTime::parse(
            raw.end_time
                .as_deref()
                .ok_or(RecordError::Missing("end_time"))?,
        )
        .map_err(|source| RecordError::Time {
            field: "end_time",
            source,
        })?;

        let status = raw
            .status
            .as_deref()
            .map(BookingStatus::parse)
            .unwrap_or(BookingStatus::Unknown);
        let payment_status = raw
            .payment_status
            .as_deref()
            .map(PaymentStatus::parse)
            .unwrap_or(PaymentStatus::Unknown);

        Ok(Booking {
            id,
            court_id,
            date,
            start_time,
            end_time,
            status,
            payment_status,
            total_price: parse_price(raw.total_price)?,
            notes: raw.notes.filter(|n| !n.trim().is_empty()),
            renter: raw.renter.filter(|r| !r.is_empty()),
        })
    }
}
