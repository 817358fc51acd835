use std::collections::{BTreeMap, HashSet};

use chrono::{Datelike, Duration, NaiveDate};
use derive_more::Display;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::model::time_entry::TimeEntry;

#[derive(Debug, PartialEq, Display)]
pub enum DurationError {
    #[display(fmt = "End time must be after start time")]
    EndNotAfterStart,
    #[display(fmt = "Please enter a valid time duration greater than 0 minutes")]
    NonPositive,
    #[display(fmt = "Time duration is too large")]
    TooLarge,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Serialize, Deserialize, ToSchema)]
pub enum Meridiem {
    AM,
    PM,
}

/// A 12-hour wall-clock time as the form submits it. Hours and minutes come
/// through as raw text; non-numeric input degrades to zero rather than
/// failing, the positivity check downstream catches the nonsense.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct ClockTime {
    #[schema(example = "09")]
    pub hour: String,
    #[schema(example = "00")]
    pub minute: String,
    pub period: Meridiem,
}

fn clock_minutes(t: &ClockTime) -> i64 {
    let mut hour = t.hour.trim().parse::<i64>().unwrap_or(0);
    let minute = t.minute.trim().parse::<i64>().unwrap_or(0);

    // 12 AM is midnight, 12 PM is noon
    if t.period == Meridiem::PM && hour != 12 {
        hour += 12;
    }
    if t.period == Meridiem::AM && hour == 12 {
        hour = 0;
    }
    hour * 60 + minute
}

/// Duration from a direct hours + minutes form.
pub fn duration_from_parts(hours: &str, minutes: &str) -> Result<u32, DurationError> {
    let h = hours.trim().parse::<i64>().unwrap_or(0);
    let m = minutes.trim().parse::<i64>().unwrap_or(0);
    let total = h
        .checked_mul(60)
        .and_then(|x| x.checked_add(m))
        .ok_or(DurationError::TooLarge)?;
    if total <= 0 {
        return Err(DurationError::NonPositive);
    }
    u32::try_from(total).map_err(|_| DurationError::TooLarge)
}

/// Duration from a start/end wall-clock range within one day.
pub fn duration_from_range(start: &ClockTime, end: &ClockTime) -> Result<u32, DurationError> {
    let start = clock_minutes(start);
    let end = clock_minutes(end);
    if end <= start {
        return Err(DurationError::EndNotAfterStart);
    }
    Ok((end - start) as u32)
}

/// Per-project minute totals over whatever slice the caller filtered.
/// Pure and order-independent; `None` is the "no project" bucket.
pub fn summarize_by_project(entries: &[TimeEntry]) -> BTreeMap<Option<u64>, u64> {
    let mut summary = BTreeMap::new();
    for entry in entries {
        *summary.entry(entry.project_id).or_insert(0) += u64::from(entry.duration_minutes);
    }
    summary
}

/// Monday of the week containing `date`.
pub fn week_monday(date: NaiveDate) -> NaiveDate {
    date - Duration::days(i64::from(date.weekday().num_days_from_monday()))
}

/// One row of the Mon-Fri weekly report.
#[derive(Debug, PartialEq, Serialize, ToSchema)]
pub struct WeekRow {
    #[schema(example = 1, nullable = true)]
    pub project_id: Option<u64>,
    /// Minutes per weekday, Monday first.
    #[schema(value_type = Vec<u64>)]
    pub days: [u64; 5],
    pub total: u64,
}

/// Mon-Fri matrix for the week starting at `monday`: one row per project
/// seen in the window, weekday minute totals plus a row total. Saturday and
/// Sunday entries fall outside the 5-day work matrix and are dropped here
/// (they still count in the overall summaries).
pub fn weekly_matrix(entries: &[TimeEntry], monday: NaiveDate) -> Vec<WeekRow> {
    let friday = monday + Duration::days(4);

    let mut rows: BTreeMap<Option<u64>, [u64; 5]> = BTreeMap::new();
    for entry in entries {
        if entry.date < monday || entry.date > friday {
            continue;
        }
        let idx = (entry.date - monday).num_days() as usize;
        rows.entry(entry.project_id).or_insert([0; 5])[idx] +=
            u64::from(entry.duration_minutes);
    }

    rows.into_iter()
        .map(|(project_id, days)| WeekRow {
            project_id,
            total: days.iter().sum(),
            days,
        })
        .collect()
}

/// Removes the given entries and reports how many were actually present.
pub fn bulk_delete(entries: &mut Vec<TimeEntry>, ids: &HashSet<u64>) -> usize {
    let before = entries.len();
    entries.retain(|e| !ids.contains(&e.id));
    before - entries.len()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::time_entry::TimeEntryStatus;

    fn entry(id: u64, project_id: Option<u64>, date: &str, minutes: u32) -> TimeEntry {
        TimeEntry {
            id,
            user_id: 1,
            project_id,
            task: "Development".into(),
            date: date.parse().unwrap(),
            duration_minutes: minutes,
            description: String::new(),
            status: TimeEntryStatus::Pending,
            is_billable: true,
        }
    }

    fn clock(hour: &str, minute: &str, period: Meridiem) -> ClockTime {
        ClockTime {
            hour: hour.into(),
            minute: minute.into(),
            period,
        }
    }

    #[test]
    fn hours_and_minutes_resolve_to_minutes() {
        assert_eq!(duration_from_parts("2", "30"), Ok(150));
        assert_eq!(duration_from_parts("0", "45"), Ok(45));
    }

    #[test]
    fn non_numeric_input_degrades_to_zero_and_is_rejected() {
        assert_eq!(duration_from_parts("abc", "xyz"), Err(DurationError::NonPositive));
        assert_eq!(duration_from_parts("abc", "30"), Ok(30));
        assert_eq!(duration_from_parts("0", "0"), Err(DurationError::NonPositive));
    }

    #[test]
    fn absurdly_large_input_is_rejected_not_truncated() {
        // would overflow u32 minutes
        assert_eq!(
            duration_from_parts("100000000", "0"),
            Err(DurationError::TooLarge)
        );
        // would overflow i64 during the multiply
        assert_eq!(
            duration_from_parts("9223372036854775807", "0"),
            Err(DurationError::TooLarge)
        );
        // largest representable value still resolves
        assert_eq!(duration_from_parts("0", "4294967295"), Ok(u32::MAX));
    }

    #[test]
    fn range_end_must_be_after_start() {
        let nine = clock("09", "00", Meridiem::AM);
        let earlier = clock("08", "30", Meridiem::AM);
        assert_eq!(
            duration_from_range(&nine, &earlier),
            Err(DurationError::EndNotAfterStart)
        );
        assert_eq!(
            duration_from_range(&nine, &clock("09", "00", Meridiem::AM)),
            Err(DurationError::EndNotAfterStart)
        );
    }

    #[test]
    fn range_converts_twelve_hour_clock() {
        // 09:00 AM -> 05:00 PM is a full 8h day
        let start = clock("09", "00", Meridiem::AM);
        let end = clock("05", "00", Meridiem::PM);
        assert_eq!(duration_from_range(&start, &end), Ok(480));

        // 12 AM is midnight
        let midnight = clock("12", "00", Meridiem::AM);
        let one_am = clock("01", "00", Meridiem::AM);
        assert_eq!(duration_from_range(&midnight, &one_am), Ok(60));

        // 12 PM is noon
        let noon = clock("12", "00", Meridiem::PM);
        let one_pm = clock("01", "00", Meridiem::PM);
        assert_eq!(duration_from_range(&noon, &one_pm), Ok(60));
    }

    #[test]
    fn summary_groups_by_project_with_general_bucket() {
        let entries = vec![
            entry(1, Some(1), "2026-01-05", 480),
            entry(2, Some(1), "2026-01-06", 240),
            entry(3, None, "2026-01-06", 60),
        ];
        let summary = summarize_by_project(&entries);
        assert_eq!(summary.get(&Some(1)), Some(&720));
        assert_eq!(summary.get(&None), Some(&60));
    }

    #[test]
    fn summary_is_order_independent() {
        let mut entries = vec![
            entry(1, Some(1), "2026-01-05", 480),
            entry(2, Some(2), "2026-01-06", 240),
            entry(3, None, "2026-01-06", 60),
        ];
        let forward = summarize_by_project(&entries);
        entries.reverse();
        assert_eq!(forward, summarize_by_project(&entries));
    }

    #[test]
    fn week_monday_snaps_any_weekday() {
        let monday: NaiveDate = "2026-01-05".parse().unwrap();
        assert_eq!(week_monday(monday), monday);
        assert_eq!(week_monday("2026-01-07".parse().unwrap()), monday);
        assert_eq!(week_monday("2026-01-11".parse().unwrap()), monday); // Sunday
    }

    #[test]
    fn matrix_row_totals_cover_weekdays_only() {
        // week of Mon 2026-01-05 .. Fri 2026-01-09
        let entries = vec![
            entry(1, Some(1), "2026-01-05", 480), // Mon
            entry(2, Some(1), "2026-01-07", 120), // Wed
            entry(3, Some(1), "2026-01-10", 300), // Sat, excluded
            entry(4, None, "2026-01-09", 60),     // Fri, general bucket
            entry(5, Some(2), "2025-12-31", 90),  // previous week, excluded
        ];

        let matrix = weekly_matrix(&entries, "2026-01-05".parse().unwrap());
        assert_eq!(matrix.len(), 2);

        let general = &matrix[0];
        assert_eq!(general.project_id, None);
        assert_eq!(general.days, [0, 0, 0, 0, 60]);
        assert_eq!(general.total, 60);

        let project = &matrix[1];
        assert_eq!(project.project_id, Some(1));
        assert_eq!(project.days, [480, 0, 120, 0, 0]);
        assert_eq!(project.total, 600);
    }

    #[test]
    fn bulk_delete_reports_removed_count() {
        let mut entries = vec![
            entry(1, Some(1), "2026-01-05", 480),
            entry(2, Some(1), "2026-01-06", 240),
            entry(3, None, "2026-01-07", 60),
        ];
        let ids: HashSet<u64> = [1, 3, 99].into_iter().collect();
        assert_eq!(bulk_delete(&mut entries, &ids), 2);
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].id, 2);
    }
}
