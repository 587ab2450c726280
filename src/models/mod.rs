pub mod booking;
pub mod court;
pub mod schedule;
pub mod time_slot;

pub use booking::{Booking, BookingStatus, PaymentStatus, RawBooking, RecordError, Renter};
pub use court::{Court, NewCourt};
pub use schedule::{CellCategory, DayColumn, GridCell, OccupancySummary, ViewState, WeekGrid};
pub use time_slot::{ClockParseError, ClockTime, TimeSlot};
