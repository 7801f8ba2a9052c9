use std::fmt::Debug;
use std::sync::Arc;

use async_trait::async_trait;
use mockall::automock;
use serde::Serialize;
use time::{Date, Time};
use trimly_utils::TimeRange;
use uuid::Uuid;

use crate::catalog::OfferingRef;
use crate::permission::Authentication;
use crate::work_schedule::WorkingDay;
use crate::ServiceError;

/// Candidate start times are generated on this fixed grid.
pub const SLOT_STEP_MINUTES: u16 = 15;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BlockReason {
    Past,
    Break,
    Occupied,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Slot {
    pub start: Time,
    pub blocked: Option<BlockReason>,
}
impl Slot {
    pub fn is_open(&self) -> bool {
        self.blocked.is_none()
    }
}

/// Who should perform the booking: a concrete employee, or whichever
/// qualified professional is free.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmployeeChoice {
    Specific(Uuid),
    Any,
}

/// Candidate intervals within the working window. The last candidate is
/// the one whose end coincides with the window end; a zero duration
/// yields no candidates at all (combos with no timed members).
pub fn candidate_intervals(day: &WorkingDay, duration_minutes: u16) -> Vec<TimeRange> {
    if duration_minutes == 0 {
        return Vec::new();
    }
    let mut candidates = Vec::new();
    let mut start = day.work.start_minutes();
    while start + duration_minutes <= day.work.end_minutes() {
        if let Ok(candidate) = TimeRange::from_minutes(start, start + duration_minutes) {
            candidates.push(candidate);
        }
        start += SLOT_STEP_MINUTES;
    }
    candidates
}

/// Classifies one candidate interval. Checks are ordered: past days first,
/// then the break window, then existing occupancy. Times earlier on the
/// current day stay nominally open; only whole days in the past block.
pub fn classify_candidate(
    candidate: &TimeRange,
    date: Date,
    today: Date,
    day: &WorkingDay,
    occupied: &[TimeRange],
) -> Option<BlockReason> {
    if date < today {
        return Some(BlockReason::Past);
    }
    if let Some(break_time) = &day.break_time {
        if candidate.overlaps(break_time) {
            return Some(BlockReason::Break);
        }
    }
    if occupied.iter().any(|blocked| candidate.overlaps(blocked)) {
        return Some(BlockReason::Occupied);
    }
    None
}

#[automock(type Context=();)]
#[async_trait]
pub trait AvailabilityService {
    type Context: Clone + PartialEq + Eq + Debug + Send + Sync + 'static;

    /// The ordered slot list for one date and offering.
    /// `exclude_appointment` keeps a rescheduled appointment from blocking
    /// itself.
    async fn slots_for_day(
        &self,
        date: Date,
        offering: OfferingRef,
        employee: EmployeeChoice,
        exclude_appointment: Option<Uuid>,
        context: Authentication<Self::Context>,
    ) -> Result<Arc<[Slot]>, ServiceError>;
}
