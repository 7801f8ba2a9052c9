use thiserror::Error;
use time::Time;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TimeRangeError {
    #[error("Time range start {0} must lie before end {1}")]
    OrderWrong(Time, Time),
    #[error("Invalid time: {0}")]
    TimeError(#[from] time::error::ComponentRange),
}

/// Half-open time interval `[start, end)` within a single day.
///
/// Two ranges conflict iff they truly share time; touching boundaries
/// (`[10:00, 10:30)` and `[10:30, 11:00)`) do not overlap.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeRange {
    start: Time,
    end: Time,
}

impl TimeRange {
    pub fn new(start: Time, end: Time) -> Result<Self, TimeRangeError> {
        if start >= end {
            return Err(TimeRangeError::OrderWrong(start, end));
        }
        Ok(Self { start, end })
    }

    /// Builds a range from minutes since midnight. The end may be at most
    /// 23:59 since `time::Time` cannot express the end of day.
    pub fn from_minutes(start: u16, end: u16) -> Result<Self, TimeRangeError> {
        let start = Time::from_hms((start / 60) as u8, (start % 60) as u8, 0)?;
        let end = Time::from_hms((end / 60) as u8, (end % 60) as u8, 0)?;
        Self::new(start, end)
    }

    pub fn start(&self) -> Time {
        self.start
    }

    pub fn end(&self) -> Time {
        self.end
    }

    /// Minutes since midnight of the range start. Seconds are ignored;
    /// schedules and slots operate on whole minutes.
    pub fn start_minutes(&self) -> u16 {
        self.start.hour() as u16 * 60 + self.start.minute() as u16
    }

    pub fn end_minutes(&self) -> u16 {
        self.end.hour() as u16 * 60 + self.end.minute() as u16
    }

    pub fn duration_minutes(&self) -> u16 {
        self.end_minutes() - self.start_minutes()
    }

    pub fn overlaps(&self, other: &TimeRange) -> bool {
        self.start < other.end && self.end > other.start
    }

    pub fn contains(&self, time: Time) -> bool {
        self.start <= time && time < self.end
    }
}

impl std::fmt::Display for TimeRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{:02}:{:02}-{:02}:{:02}",
            self.start.hour(),
            self.start.minute(),
            self.end.hour(),
            self.end.minute()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::time;

    fn range(start: Time, end: Time) -> TimeRange {
        TimeRange::new(start, end).unwrap()
    }

    #[test]
    fn test_order_is_validated() {
        let err = TimeRange::new(time!(12:00), time!(11:00));
        assert_eq!(
            err,
            Err(TimeRangeError::OrderWrong(time!(12:00), time!(11:00)))
        );
        assert!(TimeRange::new(time!(12:00), time!(12:00)).is_err());
    }

    #[test]
    fn test_overlap_is_half_open() {
        let morning = range(time!(10:00), time!(10:30));
        let next = range(time!(10:30), time!(11:00));
        assert!(!morning.overlaps(&next));
        assert!(!next.overlaps(&morning));

        let crossing = range(time!(10:15), time!(10:45));
        assert!(morning.overlaps(&crossing));
        assert!(crossing.overlaps(&next));
    }

    #[test]
    fn test_containment_overlaps() {
        let outer = range(time!(08:00), time!(18:00));
        let inner = range(time!(12:00), time!(13:00));
        assert!(outer.overlaps(&inner));
        assert!(inner.overlaps(&outer));
    }

    #[test]
    fn test_minute_arithmetic() {
        let work = TimeRange::from_minutes(8 * 60, 18 * 60).unwrap();
        assert_eq!(work.start(), time!(08:00));
        assert_eq!(work.end(), time!(18:00));
        assert_eq!(work.start_minutes(), 480);
        assert_eq!(work.end_minutes(), 1080);
        assert_eq!(work.duration_minutes(), 600);
    }

    #[test]
    fn test_contains_excludes_end() {
        let work = range(time!(08:00), time!(18:00));
        assert!(work.contains(time!(08:00)));
        assert!(work.contains(time!(17:59)));
        assert!(!work.contains(time!(18:00)));
    }
}
