use anyhow::Context;
use async_trait::async_trait;
use chrono::NaiveDate;

use crate::db::{self, queries, SharedConnection};
use crate::models::{Booking, RawBooking};

/// Where the schedule reads bookings from. Implementations hand back records
/// that are already validated.
#[async_trait]
pub trait BookingSource: Send + Sync {
    async fn fetch(
        &self,
        court_id: i64,
        start: NaiveDate,
        end: NaiveDate,
    ) -> anyhow::Result<Vec<Booking>>;
}

/// Bookings from the local SQLite store.
pub struct SqliteBookingSource {
    db: SharedConnection,
}

impl SqliteBookingSource {
    pub fn new(db: SharedConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl BookingSource for SqliteBookingSource {
    async fn fetch(
        &self,
        court_id: i64,
        start: NaiveDate,
        end: NaiveDate,
    ) -> anyhow::Result<Vec<Booking>> {
        let conn = db::lock(&self.db)?;
        queries::get_bookings_in_range(&conn, court_id, start, end)
    }
}

/// Bookings from a remote REST backend exposing
/// `GET {base}/courts/{id}/bookings?start_date=..&end_date=..`.
pub struct HttpBookingSource {
    base_url: String,
    client: reqwest::Client,
}

impl HttpBookingSource {
    pub fn new(base_url: String) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl BookingSource for HttpBookingSource {
    async fn fetch(
        &self,
        court_id: i64,
        start: NaiveDate,
        end: NaiveDate,
    ) -> anyhow::Result<Vec<Booking>> {
        let url = format!("{}/courts/{court_id}/bookings", self.base_url);

        let body: serde_json::Value = self
            .client
            .get(&url)
            .query(&[
                ("start_date", start.format("%Y-%m-%d").to_string()),
                ("end_date", end.format("%Y-%m-%d").to_string()),
            ])
            .send()
            .await
            .context("failed to call booking API")?
            .error_for_status()
            .context("booking API returned error")?
            .json()
            .await
            .context("failed to parse booking API response")?;

        let raw = parse_records(body)?;
        Ok(retain_requested(normalize_records(raw), court_id, start, end))
    }
}

/// Keeps the bookings of `court_id` dated inside `start..=end`. Remote
/// backends may return more than the requested court and week.
pub fn retain_requested(
    bookings: Vec<Booking>,
    court_id: i64,
    start: NaiveDate,
    end: NaiveDate,
) -> Vec<Booking> {
    let total = bookings.len();
    let kept: Vec<Booking> = bookings
        .into_iter()
        .filter(|b| b.court_id == court_id && start <= b.date && b.date <= end)
        .collect();

    if kept.len() < total {
        tracing::debug!(
            court_id,
            %start,
            %end,
            dropped = total - kept.len(),
            "ignoring bookings outside the requested court and range"
        );
    }
    kept
}

/// Accepts a bare JSON array or the `{"data": [...]}` envelope.
pub fn parse_records(body: serde_json::Value) -> anyhow::Result<Vec<RawBooking>> {
    let list = match body {
        serde_json::Value::Object(mut map) => map
            .remove("data")
            .ok_or_else(|| anyhow::anyhow!("missing data in booking API response"))?,
        other => other,
    };

    let items = match list {
        serde_json::Value::Array(items) => items,
        other => anyhow::bail!("unexpected booking API response: {other}"),
    };

    Ok(items
        .into_iter()
        .filter_map(|item| match serde_json::from_value::<RawBooking>(item) {
            Ok(raw) => Some(raw),
            Err(e) => {
                tracing::warn!(error = %e, "dropping unreadable booking record");
                None
            }
        })
        .collect())
}

/// Converts boundary records into `Booking`s, dropping the ones that cannot
/// be matched reliably.
pub fn normalize_records(raw: Vec<RawBooking>) -> Vec<Booking> {
    raw.into_iter()
        .filter_map(|r| {
            let id = r.id;
            match Booking::try_from(r) {
                Ok(b) => Some(b),
                Err(e) => {
                    tracing::warn!(booking_id = ?id, error = %e, "dropping malformed booking record");
                    None
                }
            }
        })
        .collect()
}
