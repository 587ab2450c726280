use serde::{Deserialize, Serialize};

use crate::models::{ClockTime, TimeSlot};

const LAST_HOUR: u8 = 24;

/// Daily hours covered by the schedule grid, e.g. 06:00 to 22:00.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotRange {
    pub start_hour: u8,
    pub end_hour: u8,
}

impl SlotRange {
    pub fn new(start_hour: u8, end_hour: u8) -> Self {
        Self {
            start_hour,
            end_hour,
        }
    }

    pub fn slots(&self) -> Slots {
        generate_slots(self.start_hour, self.end_hour)
    }
}

impl Default for SlotRange {
    fn default() -> Self {
        Self::new(6, 22)
    }
}

/// Lazy sequence of one-hour slots. Cloning it restarts from the current
/// position, so a fresh `SlotRange::slots()` always yields the full day.
#[derive(Debug, Clone)]
pub struct Slots {
    next_hour: u8,
    end_hour: u8,
}

impl Iterator for Slots {
    type Item = TimeSlot;

    fn next(&mut self) -> Option<TimeSlot> {
        if self.next_hour >= self.end_hour {
            return None;
        }
        let start = ClockTime::from_hm(self.next_hour, 0)?;
        let end = ClockTime::from_hm(self.next_hour + 1, 0)?;
        self.next_hour += 1;
        Some(TimeSlot::new(start, end))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let n = usize::from(self.end_hour.saturating_sub(self.next_hour));
        (n, Some(n))
    }
}

impl ExactSizeIterator for Slots {}

/// One-hour slots from `start_hour:00` to `end_hour:00`. An empty range
/// (`start_hour >= end_hour`) yields nothing; `end_hour` is capped at 24.
pub fn generate_slots(start_hour: u8, end_hour: u8) -> Slots {
    Slots {
        next_hour: start_hour,
        end_hour: end_hour.min(LAST_HOUR),
    }
}
