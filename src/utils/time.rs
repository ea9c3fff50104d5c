use crate::error::{invalid_slot, SkillResult};
use chrono::{
    DateTime, Duration, LocalResult, NaiveDate, NaiveDateTime, NaiveTime, Offset, TimeZone, Utc,
};
use chrono_tz::Tz;

/// Length of every event booked through the skill
pub const EVENT_DURATION_MINUTES: i64 = 60;

/// Parse a date slot in YYYY-MM-DD format
pub fn parse_slot_date(value: &str) -> SkillResult<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").map_err(|_| invalid_slot("date", value))
}

/// Parse a time slot in 24-hour HH:MM format
pub fn parse_slot_time(value: &str) -> SkillResult<NaiveTime> {
    NaiveTime::parse_from_str(value.trim(), "%H:%M").map_err(|_| invalid_slot("time", value))
}

/// Resolve a wall-clock time in the reference timezone.
///
/// Ambiguous times (the repeated hour when clocks go back) resolve to the
/// earlier instant. Times skipped by a DST jump do not exist and are reported
/// against the `time` slot.
pub fn localize(tz: Tz, naive: NaiveDateTime) -> SkillResult<DateTime<Tz>> {
    match tz.from_local_datetime(&naive) {
        LocalResult::Single(dt) => Ok(dt),
        LocalResult::Ambiguous(earliest, _) => Ok(earliest),
        LocalResult::None => Err(invalid_slot("time", &naive.format("%H:%M").to_string())),
    }
}

/// A booking window of the fixed event duration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EventWindow {
    pub start: DateTime<Tz>,
    pub end: DateTime<Tz>,
}

impl EventWindow {
    /// Window starting at a local wall-clock time, the end is exactly
    /// [`EVENT_DURATION_MINUTES`] later even across a DST change
    pub fn starting_at(tz: Tz, start: NaiveDateTime) -> SkillResult<Self> {
        let start = localize(tz, start)?;
        Ok(Self {
            start,
            end: start + Duration::minutes(EVENT_DURATION_MINUTES),
        })
    }

    /// Absolute instants of the window
    pub fn to_utc(&self) -> (DateTime<Utc>, DateTime<Utc>) {
        (self.start.with_timezone(&Utc), self.end.with_timezone(&Utc))
    }
}

/// Local day boundaries [00:00, 23:59] as absolute instants.
///
/// A boundary skipped by a DST jump moves to the first instant after the gap.
pub fn day_bounds(tz: Tz, date: NaiveDate) -> SkillResult<(DateTime<Utc>, DateTime<Utc>)> {
    let first = date
        .and_hms_opt(0, 0, 0)
        .ok_or_else(|| invalid_slot("date", &date.to_string()))?;
    let last = date
        .and_hms_opt(23, 59, 0)
        .ok_or_else(|| invalid_slot("date", &date.to_string()))?;

    let start = day_edge(tz, first).with_timezone(&Utc);
    let end = day_edge(tz, last).with_timezone(&Utc);
    Ok((start, end))
}

fn day_edge(tz: Tz, naive: NaiveDateTime) -> DateTime<Tz> {
    match tz.from_local_datetime(&naive) {
        LocalResult::Single(dt) => dt,
        LocalResult::Ambiguous(earliest, _) => earliest,
        LocalResult::None => {
            // Read the wall clock with the offset in force before the gap,
            // which lands on the instant the gap ends
            let before = tz
                .offset_from_utc_datetime(&(naive - Duration::days(1)))
                .fix()
                .local_minus_utc();
            let utc = naive - Duration::seconds(i64::from(before));
            tz.from_utc_datetime(&utc)
        }
    }
}

/// Format a time the way it is read out for bookings, e.g. "02:00 PM"
pub fn spoken_clock(time: &NaiveDateTime) -> String {
    time.format("%I:%M %p").to_string()
}

/// Format a time in 24-hour form, e.g. "09:30"
pub fn clock_24(time: &DateTime<Tz>) -> String {
    time.format("%H:%M").to_string()
}
