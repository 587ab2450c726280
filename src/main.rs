use std::sync::Arc;

use axum::routing::{get, patch, post};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use courtbook::config::AppConfig;
use courtbook::db;
use courtbook::handlers;
use courtbook::services::source::{BookingSource, HttpBookingSource, SqliteBookingSource};
use courtbook::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = AppConfig::from_env();

    let conn = db::shared(db::init_db(&config.database_url)?);

    let bookings: Arc<dyn BookingSource> = if config.uses_local_bookings() {
        tracing::info!("reading bookings from local store ({})", config.database_url);
        Arc::new(SqliteBookingSource::new(Arc::clone(&conn)))
    } else {
        tracing::info!("reading bookings from remote API ({})", config.booking_api_url);
        Arc::new(HttpBookingSource::new(config.booking_api_url.clone()))
    };

    let slots = config.slot_range();
    tracing::info!(
        start_hour = slots.start_hour,
        end_hour = slots.end_hour,
        "schedule grid hours"
    );

    let state = Arc::new(AppState {
        db: conn,
        config: config.clone(),
        bookings,
    });

    let app = Router::new()
        .route("/health", get(handlers::health::health))
        .route(
            "/api/courts",
            get(handlers::courts::list_courts).post(handlers::courts::create_court),
        )
        .route("/api/courts/:id", get(handlers::courts::get_court))
        .route(
            "/api/courts/:id/bookings",
            get(handlers::bookings::list_court_bookings),
        )
        .route(
            "/api/courts/:id/schedule",
            get(handlers::schedule::get_schedule),
        )
        .route("/api/bookings", post(handlers::bookings::create_booking))
        .route("/api/bookings/:id", get(handlers::bookings::get_booking))
        .route(
            "/api/bookings/:id/status",
            patch(handlers::bookings::update_booking_status),
        )
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state);

    let addr = format!("0.0.0.0:{}", config.port);
    tracing::info!("starting server on {addr}");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
