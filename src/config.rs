use std::env;

use crate::services::slots::SlotRange;

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub port: u16,
    pub database_url: String,
    /// Remote booking API; empty means bookings are read from the local store.
    pub booking_api_url: String,
    pub slot_start_hour: u8,
    pub slot_end_hour: u8,
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self {
            port: env::var("PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(3000),
            database_url: env::var("DATABASE_URL").unwrap_or_else(|_| "courtbook.db".to_string()),
            booking_api_url: env::var("BOOKING_API_URL").unwrap_or_default(),
            slot_start_hour: env::var("SLOT_START_HOUR")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(6),
            slot_end_hour: env::var("SLOT_END_HOUR")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(22),
        }
    }

    /// Bookings are read from the local SQLite store, which also owns the
    /// courts they belong to.
    pub fn uses_local_bookings(&self) -> bool {
        self.booking_api_url.trim().is_empty()
    }

    pub fn slot_range(&self) -> SlotRange {
        let end = self.slot_end_hour.min(24);
        SlotRange::new(self.slot_start_hour.min(end), end)
    }
}
