pub mod booking;
pub mod grid;
pub mod matcher;
pub mod schedule;
pub mod slots;
pub mod source;
