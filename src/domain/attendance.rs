use chrono::{DateTime, Duration, NaiveDate, NaiveTime, Utc};
use derive_more::Display;

use crate::model::attendance::AttendanceRecord;
use crate::model::role::Role;

/// Minimum worked time before a checkout no longer needs a reason.
pub const MIN_WORK_MINUTES: i64 = 9 * 60;

#[derive(Debug, PartialEq, Display)]
pub enum AttendanceError {
    #[display(fmt = "Already checked in today")]
    AlreadyCheckedIn,
    #[display(fmt = "No active check-in found for today")]
    NotCheckedIn,
    #[display(fmt = "Checking out before {} hours requires a reason", "MIN_WORK_MINUTES / 60")]
    EarlyLogoutReasonRequired,
    #[display(fmt = "Attendance date cannot be in the future")]
    FutureDate,
}

/// Opens today's session for the user. At most one record may exist per
/// (user, date), so a second check-in the same day is refused.
pub fn check_in(
    records: &mut Vec<AttendanceRecord>,
    id: u64,
    user_id: u64,
    now: DateTime<Utc>,
) -> Result<(), AttendanceError> {
    let today = now.date_naive();
    if records
        .iter()
        .any(|r| r.user_id == user_id && r.date == today)
    {
        return Err(AttendanceError::AlreadyCheckedIn);
    }

    records.push(AttendanceRecord {
        id,
        user_id,
        date: today,
        check_in: now,
        check_out: None,
        early_logout_reason: None,
    });
    Ok(())
}

/// Closes today's open session. Under [`MIN_WORK_MINUTES`] the record stays
/// open unless a non-empty reason is supplied; the reason is stored verbatim
/// on the closed record whenever one was given.
///
/// Returns whether the checkout was early.
pub fn check_out(
    records: &mut [AttendanceRecord],
    user_id: u64,
    now: DateTime<Utc>,
    reason: Option<&str>,
) -> Result<bool, AttendanceError> {
    let today = now.date_naive();
    let record = records
        .iter_mut()
        .find(|r| r.user_id == user_id && r.date == today && r.is_open())
        .ok_or(AttendanceError::NotCheckedIn)?;

    let early = now - record.check_in < Duration::minutes(MIN_WORK_MINUTES);
    let reason = reason.map(str::trim).filter(|r| !r.is_empty());

    if early && reason.is_none() {
        return Err(AttendanceError::EarlyLogoutReasonRequired);
    }

    record.check_out = Some(now);
    if let Some(r) = reason {
        record.early_logout_reason = Some(r.to_string());
    }
    Ok(early)
}

/// Direct correction of a past record: HR always, everyone else only while
/// the record is from today or yesterday. Older records must go through a
/// correction request to HR instead.
pub fn is_direct_edit_allowed(role: Role, record_date: NaiveDate, today: NaiveDate) -> bool {
    if role == Role::Hr {
        return true;
    }
    (today - record_date).num_days() < 2
}

/// Builds a record for a missed day from explicit times. Only the input-layer
/// "not in the future" bound is enforced.
pub fn manual_record(
    id: u64,
    user_id: u64,
    date: NaiveDate,
    check_in: NaiveTime,
    check_out: NaiveTime,
    today: NaiveDate,
) -> Result<AttendanceRecord, AttendanceError> {
    if date > today {
        return Err(AttendanceError::FutureDate);
    }
    Ok(AttendanceRecord {
        id,
        user_id,
        date,
        check_in: date.and_time(check_in).and_utc(),
        check_out: Some(date.and_time(check_out).and_utc()),
        early_logout_reason: None,
    })
}

/// Worked minutes for display. Missing checkout or a malformed (negative)
/// span renders as unmeasured, never negative.
pub fn duration_minutes(record: &AttendanceRecord) -> Option<i64> {
    let out = record.check_out?;
    let minutes = (out - record.check_in).num_minutes();
    if minutes < 0 {
        return None;
    }
    Some(minutes)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(date: &str, time: &str) -> DateTime<Utc> {
        format!("{date}T{time}:00Z").parse().unwrap()
    }

    #[test]
    fn check_in_creates_one_record_per_day() {
        let mut records = Vec::new();
        check_in(&mut records, 1, 7, at("2026-01-05", "09:00")).unwrap();

        let second = check_in(&mut records, 2, 7, at("2026-01-05", "09:30"));
        assert_eq!(second, Err(AttendanceError::AlreadyCheckedIn));
        assert_eq!(records.len(), 1);
    }

    #[test]
    fn same_day_check_in_allowed_for_other_users() {
        let mut records = Vec::new();
        check_in(&mut records, 1, 7, at("2026-01-05", "09:00")).unwrap();
        check_in(&mut records, 2, 8, at("2026-01-05", "09:00")).unwrap();
        assert_eq!(records.len(), 2);
    }

    #[test]
    fn early_checkout_without_reason_keeps_record_open() {
        let mut records = Vec::new();
        check_in(&mut records, 1, 7, at("2026-01-05", "09:00")).unwrap();

        // 16:30 is 7.5h after 09:00, under the 9h bar
        let result = check_out(&mut records, 7, at("2026-01-05", "16:30"), None);
        assert_eq!(result, Err(AttendanceError::EarlyLogoutReasonRequired));
        assert!(records[0].is_open());

        let blank = check_out(&mut records, 7, at("2026-01-05", "16:30"), Some("   "));
        assert_eq!(blank, Err(AttendanceError::EarlyLogoutReasonRequired));
        assert!(records[0].is_open());
    }

    #[test]
    fn early_checkout_with_reason_stores_it_verbatim() {
        let mut records = Vec::new();
        check_in(&mut records, 1, 7, at("2026-01-05", "09:00")).unwrap();

        let early = check_out(
            &mut records,
            7,
            at("2026-01-05", "16:30"),
            Some("half-day approved"),
        )
        .unwrap();

        assert!(early);
        assert!(!records[0].is_open());
        assert_eq!(
            records[0].early_logout_reason.as_deref(),
            Some("half-day approved")
        );
    }

    #[test]
    fn full_day_checkout_needs_no_reason() {
        let mut records = Vec::new();
        check_in(&mut records, 1, 7, at("2026-01-05", "09:00")).unwrap();

        let early = check_out(&mut records, 7, at("2026-01-05", "18:10"), None).unwrap();
        assert!(!early);
        assert_eq!(duration_minutes(&records[0]), Some(550));
    }

    #[test]
    fn double_checkout_is_refused() {
        let mut records = Vec::new();
        check_in(&mut records, 1, 7, at("2026-01-05", "08:00")).unwrap();
        check_out(&mut records, 7, at("2026-01-05", "17:30"), None).unwrap();

        let again = check_out(&mut records, 7, at("2026-01-05", "18:00"), None);
        assert_eq!(again, Err(AttendanceError::NotCheckedIn));
    }

    #[test]
    fn checkout_without_check_in_is_refused() {
        let mut records = Vec::new();
        let result = check_out(&mut records, 7, at("2026-01-05", "17:00"), None);
        assert_eq!(result, Err(AttendanceError::NotCheckedIn));
    }

    #[test]
    fn edit_window_is_today_or_yesterday_for_non_hr() {
        let today = NaiveDate::from_ymd_opt(2026, 1, 7).unwrap();
        let yesterday = NaiveDate::from_ymd_opt(2026, 1, 6).unwrap();
        let older = NaiveDate::from_ymd_opt(2026, 1, 5).unwrap();

        assert!(is_direct_edit_allowed(Role::Employee, today, today));
        assert!(is_direct_edit_allowed(Role::Employee, yesterday, today));
        assert!(!is_direct_edit_allowed(Role::Employee, older, today));

        // HR edits anything
        assert!(is_direct_edit_allowed(Role::Hr, older, today));
    }

    #[test]
    fn manual_record_rejects_future_dates() {
        let today = NaiveDate::from_ymd_opt(2026, 1, 7).unwrap();
        let tomorrow = NaiveDate::from_ymd_opt(2026, 1, 8).unwrap();
        let nine = NaiveTime::from_hms_opt(9, 0, 0).unwrap();
        let five = NaiveTime::from_hms_opt(17, 0, 0).unwrap();

        let result = manual_record(1, 7, tomorrow, nine, five, today);
        assert_eq!(result.unwrap_err(), AttendanceError::FutureDate);
    }

    #[test]
    fn negative_span_renders_unmeasured() {
        let today = NaiveDate::from_ymd_opt(2026, 1, 7).unwrap();
        let nine = NaiveTime::from_hms_opt(9, 0, 0).unwrap();
        let eight = NaiveTime::from_hms_opt(8, 0, 0).unwrap();

        let record = manual_record(1, 7, today, nine, eight, today).unwrap();
        assert_eq!(duration_minutes(&record), None);
    }
}
