use crate::models::{Booking, CellCategory, DayColumn, GridCell, TimeSlot, ViewState, WeekGrid};
use crate::services::matcher::find_booking;
use crate::services::slots::Slots;

/// Display category for a schedule cell. Statuses the backend invents
/// later land in `Unknown` rather than failing the render.
pub fn classify(booking: Option<&Booking>) -> CellCategory {
    match booking {
        None => CellCategory::Empty,
        Some(b) => CellCategory::from_status(b.status),
    }
}

pub fn build_week_grid(view: &ViewState, slots: Slots, bookings: &[Booking]) -> WeekGrid {
    let slots: Vec<TimeSlot> = slots.collect();

    let days = view
        .days()
        .map(|date| {
            let cells = slots
                .iter()
                .map(|slot| {
                    let booking = find_booking(bookings, date, slot);
                    GridCell {
                        slot: *slot,
                        category: classify(booking),
                        booking: booking.cloned(),
                    }
                })
                .collect();

            DayColumn {
                date,
                weekday: date.format("%a").to_string().to_lowercase(),
                cells,
            }
        })
        .collect();

    WeekGrid {
        court_id: view.court_id,
        week_start: view.week_start(),
        week_end: view.week_end(),
        slots,
        days,
    }
}
