// libs/doctor-cell/src/services/slots.rs
//
// Free-slot generation for one doctor, one hospital, one date. Pure: the
// availability service fetches the rows and hands them in.

use chrono::{Duration, NaiveTime};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SlotError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

/// A doctor's working window for one day, with an optional break.
///
/// `break_start` and `break_end` come straight from the store, so the pair is
/// checked by [`WorkingHours::validate`] rather than by the type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkingHours {
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub break_start: Option<NaiveTime>,
    pub break_end: Option<NaiveTime>,
}

impl WorkingHours {
    pub fn new(start_time: NaiveTime, end_time: NaiveTime) -> Self {
        Self {
            start_time,
            end_time,
            break_start: None,
            break_end: None,
        }
    }

    pub fn with_break(mut self, break_start: NaiveTime, break_end: NaiveTime) -> Self {
        self.break_start = Some(break_start);
        self.break_end = Some(break_end);
        self
    }

    pub fn validate(&self) -> Result<(), SlotError> {
        if self.start_time >= self.end_time {
            return Err(SlotError::InvalidArgument(format!(
                "working hours start {} must be before end {}",
                self.start_time, self.end_time
            )));
        }

        match (self.break_start, self.break_end) {
            (None, None) => Ok(()),
            (Some(_), None) | (None, Some(_)) => Err(SlotError::InvalidArgument(
                "break start and break end must both be set or both be absent".to_string(),
            )),
            (Some(start), Some(end)) if end <= start => Err(SlotError::InvalidArgument(format!(
                "break end {} must be after break start {}",
                end, start
            ))),
            (Some(start), Some(end)) if start < self.start_time || end > self.end_time => {
                Err(SlotError::InvalidArgument(format!(
                    "break {}-{} lies outside working hours {}-{}",
                    start, end, self.start_time, self.end_time
                )))
            }
            (Some(_), Some(_)) => Ok(()),
        }
    }

    fn break_window(&self) -> Option<(NaiveTime, NaiveTime)> {
        self.break_start.zip(self.break_end)
    }
}

/// An existing appointment, half-open `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookedInterval {
    pub start: NaiveTime,
    pub end: NaiveTime,
}

impl BookedInterval {
    pub fn new(start: NaiveTime, end: NaiveTime) -> Self {
        Self { start, end }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateSlot {
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub available: bool,
}

impl CandidateSlot {
    pub fn duration_minutes(&self) -> i64 {
        (self.end_time - self.start_time).num_minutes()
    }
}

/// Half-open overlap: touching intervals do not overlap.
pub fn overlaps(a_start: NaiveTime, a_end: NaiveTime, b_start: NaiveTime, b_end: NaiveTime) -> bool {
    a_start < b_end && b_start < a_end
}

/// Slices the working window into back-to-back slots of `duration_minutes`,
/// dropping those that touch the break or any booking.
///
/// The duration is checked first. A day off or a missing schedule then
/// yields no slots; otherwise the schedule and bookings are validated before
/// anything is generated.
pub fn generate_slots(
    working_hours: Option<&WorkingHours>,
    booked: &[BookedInterval],
    duration_minutes: i32,
    is_day_off: bool,
) -> Result<Vec<CandidateSlot>, SlotError> {
    if duration_minutes <= 0 {
        return Err(SlotError::InvalidArgument(format!(
            "slot duration must be positive, got {} minutes",
            duration_minutes
        )));
    }

    // a day off or no schedule is empty whatever the stored rows look like
    let hours = match working_hours {
        Some(hours) if !is_day_off => hours,
        _ => return Ok(Vec::new()),
    };

    hours.validate()?;
    if let Some(bad) = booked.iter().find(|b| b.end <= b.start) {
        return Err(SlotError::InvalidArgument(format!(
            "booked interval {}-{} is empty or reversed",
            bad.start, bad.end
        )));
    }

    let step = Duration::minutes(i64::from(duration_minutes));
    let break_window = hours.break_window();
    let mut slots = Vec::new();
    let mut cursor = hours.start_time;

    loop {
        // NaiveTime wraps at midnight; a wrapped end means the slot never fits
        let (slot_end, wrapped) = cursor.overflowing_add_signed(step);
        if wrapped != 0 || slot_end > hours.end_time {
            break;
        }

        let in_break = break_window
            .map(|(start, end)| overlaps(cursor, slot_end, start, end))
            .unwrap_or(false);
        let is_booked = booked
            .iter()
            .any(|b| overlaps(cursor, slot_end, b.start, b.end));

        if !in_break && !is_booked {
            slots.push(CandidateSlot {
                start_time: cursor,
                end_time: slot_end,
                available: true,
            });
        }

        cursor = slot_end;
    }

    Ok(slots)
}
