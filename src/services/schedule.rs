use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

use crate::models::{Booking, ViewState, WeekGrid};
use crate::services::grid::build_week_grid;
use crate::services::slots::SlotRange;
use crate::services::source::BookingSource;

/// Bookings fetched for one view, replaced wholesale on every successful load.
#[derive(Debug, Clone)]
pub struct WeekSnapshot {
    pub view: ViewState,
    pub ticket: u64,
    pub bookings: Vec<Booking>,
}

#[derive(Debug, Clone)]
pub enum LoadOutcome {
    /// The fetch was the newest one issued and its snapshot is now current.
    Current(Arc<WeekSnapshot>),
    /// A later load was issued while this one was in flight; its result was
    /// discarded.
    Superseded,
}

/// Fetches bookings for the visible week and keeps the latest snapshot.
///
/// Meant for long-lived clients that hold one view at a time, such as a
/// schedule screen; the HTTP handlers are stateless and use
/// [`load_week_grid`] instead.
///
/// Every `load` takes a ticket before it awaits the source. When the fetch
/// resolves, the snapshot is installed only if no newer ticket has been
/// issued in the meantime, so a slow earlier request cannot overwrite the
/// data of a later one. The previous snapshot stays readable while a load
/// is outstanding and after a failed one.
pub struct ScheduleLoader {
    source: Arc<dyn BookingSource>,
    slots: SlotRange,
    latest_ticket: AtomicU64,
    current: RwLock<Option<Arc<WeekSnapshot>>>,
}

impl ScheduleLoader {
    pub fn new(source: Arc<dyn BookingSource>, slots: SlotRange) -> Self {
        Self {
            source,
            slots,
            latest_ticket: AtomicU64::new(0),
            current: RwLock::new(None),
        }
    }

    pub async fn load(&self, view: ViewState) -> anyhow::Result<LoadOutcome> {
        let ticket = self.latest_ticket.fetch_add(1, Ordering::SeqCst) + 1;

        let bookings = self
            .source
            .fetch(view.court_id, view.week_start(), view.week_end())
            .await?;

        let mut current = self
            .current
            .write()
            .unwrap_or_else(PoisonError::into_inner);

        // Checked under the write lock so two resolutions cannot interleave.
        if ticket != self.latest_ticket.load(Ordering::SeqCst) {
            tracing::debug!(
                ticket,
                court_id = view.court_id,
                week_start = %view.week_start(),
                "discarding superseded schedule fetch"
            );
            return Ok(LoadOutcome::Superseded);
        }

        let snapshot = Arc::new(WeekSnapshot {
            view,
            ticket,
            bookings,
        });
        *current = Some(Arc::clone(&snapshot));
        Ok(LoadOutcome::Current(snapshot))
    }

    pub fn current(&self) -> Option<Arc<WeekSnapshot>> {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// The current snapshot, only if it covers the same court and week as
    /// `view`. A screen that navigated away must not render the old week.
    pub fn current_for(&self, view: &ViewState) -> Option<Arc<WeekSnapshot>> {
        self.current().filter(|s| s.view.same_week(view))
    }

    /// Whether a load newer than the current snapshot has been issued and
    /// is still in flight or has failed.
    pub fn is_stale(&self) -> bool {
        let latest = self.latest_ticket.load(Ordering::SeqCst);
        self.current().map(|s| s.ticket) != Some(latest) && latest != 0
    }

    pub fn grid(&self) -> Option<WeekGrid> {
        self.current()
            .map(|s| build_week_grid(&s.view, self.slots.slots(), &s.bookings))
    }
}

/// One-shot fetch and grid build for callers that do not keep a snapshot,
/// such as a single HTTP request.
pub async fn load_week_grid(
    source: &dyn BookingSource,
    view: &ViewState,
    slots: SlotRange,
) -> anyhow::Result<WeekGrid> {
    let bookings = source
        .fetch(view.court_id, view.week_start(), view.week_end())
        .await?;
    Ok(build_week_grid(view, slots.slots(), &bookings))
}
