use std::collections::BTreeMap;

use chrono::{Datelike, Duration, NaiveDate};
use serde::{Deserialize, Serialize};

use super::booking::{Booking, BookingStatus};
use super::time_slot::TimeSlot;

/// What the schedule screen is looking at. Navigation returns a new value
/// instead of mutating shared state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewState {
    pub court_id: i64,
    pub week_anchor: NaiveDate,
}

impl ViewState {
    pub fn new(court_id: i64, week_anchor: NaiveDate) -> Self {
        Self {
            court_id,
            week_anchor,
        }
    }

    /// Monday of the anchor's week.
    pub fn week_start(&self) -> NaiveDate {
        let offset = i64::from(self.week_anchor.weekday().num_days_from_monday());
        self.week_anchor - Duration::days(offset)
    }

    /// Sunday of the anchor's week.
    pub fn week_end(&self) -> NaiveDate {
        self.week_start() + Duration::days(6)
    }

    pub fn days(&self) -> impl Iterator<Item = NaiveDate> {
        let start = self.week_start();
        (0..7).map(move |i| start + Duration::days(i))
    }

    pub fn next_week(&self) -> Self {
        Self::new(self.court_id, self.week_anchor + Duration::days(7))
    }

    pub fn previous_week(&self) -> Self {
        Self::new(self.court_id, self.week_anchor - Duration::days(7))
    }

    /// Whether two views cover the same court and week, regardless of which
    /// day inside the week anchors them.
    pub fn same_week(&self, other: &ViewState) -> bool {
        self.court_id == other.court_id && self.week_start() == other.week_start()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CellCategory {
    Empty,
    Pending,
    Confirmed,
    Completed,
    Cancelled,
    Unknown,
}

impl CellCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            CellCategory::Empty => "empty",
            CellCategory::Pending => "pending",
            CellCategory::Confirmed => "confirmed",
            CellCategory::Completed => "completed",
            CellCategory::Cancelled => "cancelled",
            CellCategory::Unknown => "unknown",
        }
    }

    pub fn from_status(status: BookingStatus) -> Self {
        match status {
            BookingStatus::Pending => CellCategory::Pending,
            BookingStatus::Confirmed => CellCategory::Confirmed,
            BookingStatus::Completed => CellCategory::Completed,
            BookingStatus::Cancelled => CellCategory::Cancelled,
            BookingStatus::Unknown => CellCategory::Unknown,
        }
    }

    pub fn is_occupied(&self) -> bool {
        !matches!(self, CellCategory::Empty | CellCategory::Cancelled)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GridCell {
    pub slot: TimeSlot,
    pub category: CellCategory,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub booking: Option<Booking>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DayColumn {
    pub date: NaiveDate,
    pub weekday: String,
    pub cells: Vec<GridCell>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeekGrid {
    pub court_id: i64,
    pub week_start: NaiveDate,
    pub week_end: NaiveDate,
    pub slots: Vec<TimeSlot>,
    pub days: Vec<DayColumn>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OccupancySummary {
    pub total_cells: usize,
    pub occupied_cells: usize,
    pub by_category: BTreeMap<CellCategory, usize>,
    pub occupancy_rate: f64,
}

impl WeekGrid {
    pub fn cell(&self, date: NaiveDate, slot_index: usize) -> Option<&GridCell> {
        self.days
            .iter()
            .find(|d| d.date == date)
            .and_then(|d| d.cells.get(slot_index))
    }

    pub fn summary(&self) -> OccupancySummary {
        let mut by_category = BTreeMap::new();
        let mut total_cells = 0;
        let mut occupied_cells = 0;

        for cell in self.days.iter().flat_map(|d| d.cells.iter()) {
            total_cells += 1;
            if cell.category.is_occupied() {
                occupied_cells += 1;
            }
            *by_category.entry(cell.category).or_insert(0) += 1;
        }

        let occupancy_rate = if total_cells == 0 {
            0.0
        } else {
            occupied_cells as f64 / total_cells as f64
        };

        OccupancySummary {
            total_cells,
            occupied_cells,
            by_category,
            occupancy_rate,
        }
    }
}
