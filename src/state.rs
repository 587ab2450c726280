use std::sync::Arc;

use crate::config::AppConfig;
use crate::db::SharedConnection;
use crate::services::source::BookingSource;

pub struct AppState {
    pub db: SharedConnection,
    pub config: AppConfig,
    /// Feeds the schedule grid: the local store or a remote booking API.
    pub bookings: Arc<dyn BookingSource>,
}
