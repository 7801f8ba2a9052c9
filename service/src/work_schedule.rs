use time::Date;
use trimly_utils::TimeRange;

use crate::employee::Employee;

/// The applicable working window of one employee on one concrete date.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkingDay {
    pub work: TimeRange,
    pub break_time: Option<TimeRange>,
}

/// Resolves the date's weekday against the employee's weekly schedule.
/// An absent or inactive weekday means no availability, as does a
/// malformed window (end not after start) - the conservative reading.
pub fn working_day(employee: &Employee, date: Date) -> Option<WorkingDay> {
    let day = employee
        .schedule
        .iter()
        .find(|day| day.weekday == date.weekday())?;
    if !day.active {
        return None;
    }
    let work = TimeRange::new(day.start, day.end).ok()?;
    let break_time = match (day.break_start, day.break_end) {
        (Some(start), Some(end)) => Some(TimeRange::new(start, end).ok()?),
        _ => None,
    };
    Some(WorkingDay { work, break_time })
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use time::macros::{date, time};
    use time::Weekday;
    use uuid::Uuid;

    use super::*;
    use crate::employee::DaySchedule;

    fn employee_with(schedule: Vec<DaySchedule>) -> Employee {
        Employee {
            id: Uuid::nil(),
            name: "Marta".into(),
            specialties: Arc::new([]),
            schedule: schedule.into(),
            deleted: None,
            version: Uuid::nil(),
        }
    }

    fn monday_schedule(active: bool) -> DaySchedule {
        DaySchedule {
            weekday: Weekday::Monday,
            active,
            start: time!(08:00),
            end: time!(18:00),
            break_start: Some(time!(12:00)),
            break_end: Some(time!(13:00)),
        }
    }

    #[test]
    fn test_resolves_matching_weekday() {
        let employee = employee_with(vec![monday_schedule(true)]);
        // 2024-07-01 is a Monday.
        let day = working_day(&employee, date!(2024 - 07 - 01)).unwrap();
        assert_eq!(day.work.start(), time!(08:00));
        assert_eq!(day.work.end(), time!(18:00));
        let break_time = day.break_time.unwrap();
        assert_eq!(break_time.start(), time!(12:00));
        assert_eq!(break_time.end(), time!(13:00));
    }

    #[test]
    fn test_inactive_day_has_no_window() {
        let employee = employee_with(vec![monday_schedule(false)]);
        assert_eq!(working_day(&employee, date!(2024 - 07 - 01)), None);
    }

    #[test]
    fn test_absent_weekday_has_no_window() {
        let employee = employee_with(vec![monday_schedule(true)]);
        // 2024-07-02 is a Tuesday with no schedule entry.
        assert_eq!(working_day(&employee, date!(2024 - 07 - 02)), None);
    }

    #[test]
    fn test_missing_break_end_means_no_break() {
        let mut schedule = monday_schedule(true);
        schedule.break_end = None;
        let employee = employee_with(vec![schedule]);
        let day = working_day(&employee, date!(2024 - 07 - 01)).unwrap();
        assert_eq!(day.break_time, None);
    }

    #[test]
    fn test_malformed_window_has_no_availability() {
        let mut schedule = monday_schedule(true);
        schedule.end = time!(07:00);
        let employee = employee_with(vec![schedule]);
        assert_eq!(working_day(&employee, date!(2024 - 07 - 01)), None);
    }
}
