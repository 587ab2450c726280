use chrono::NaiveDate;

use crate::models::{Booking, ClockTime, TimeSlot};

/// Half-open interval intersection: `[a_start, a_end)` and `[b_start, b_end)`
/// share at least one instant. Empty or inverted intervals never intersect.
pub fn overlaps(a_start: ClockTime, a_end: ClockTime, b_start: ClockTime, b_end: ClockTime) -> bool {
    a_start < a_end && b_start < b_end && a_start < b_end && a_end > b_start
}

pub fn booking_overlaps_slot(booking: &Booking, date: NaiveDate, slot: &TimeSlot) -> bool {
    booking.date == date && overlaps(slot.start, slot.end, booking.start_time, booking.end_time)
}

/// First booking, in list order, that occupies `slot` on `date`.
///
/// The list is scanned linearly. Bookings per court and day are bounded by
/// the number of hourly slots, so no index is kept. If the upstream store
/// ever returns two overlapping bookings, the first one wins.
pub fn find_booking<'a>(
    bookings: &'a [Booking],
    date: NaiveDate,
    slot: &TimeSlot,
) -> Option<&'a Booking> {
    bookings
        .iter()
        .find(|b| booking_overlaps_slot(b, date, slot))
}
