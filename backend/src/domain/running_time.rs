//! Timestamps and elapsed-time helpers used by ledger operators.

use chrono::{Duration, Local, NaiveDate, NaiveDateTime};

use crate::error::{Result, ZenithError};

/// Current local time rendered with `format`
pub fn timestamp_now(format: &str) -> String {
    Local::now().format(format).to_string()
}

/// Parse a date or date-time cell (`YYYY-MM-DD HH:MM:SS`, `YYYY-MM-DDTHH:MM:SS` or `YYYY-MM-DD`)
pub fn parse_datetime(value: &str) -> Result<NaiveDateTime> {
    let value = value.trim();
    for format in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(value, format) {
            return Ok(dt);
        }
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .ok_or_else(|| ZenithError::Parse(format!("Invalid date: {}", value)))
}

/// Calendar-ish breakdown of a duration. Years are 365 days and months 30 days.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TimeParts {
    pub years: i64,
    pub months: i64,
    pub days: i64,
    pub hours: i64,
    pub minutes: i64,
    pub seconds: i64,
}

/// Component of a [`TimeParts`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimePart {
    Years,
    Months,
    Days,
    Hours,
    Minutes,
    Seconds,
}

impl TimeParts {
    pub fn get(&self, part: TimePart) -> i64 {
        match part {
            TimePart::Years => self.years,
            TimePart::Months => self.months,
            TimePart::Days => self.days,
            TimePart::Hours => self.hours,
            TimePart::Minutes => self.minutes,
            TimePart::Seconds => self.seconds,
        }
    }
}

/// Split a duration into years, months, days, hours, minutes and seconds.
///
/// Whole days are floored, so a negative duration yields negative days and a
/// non-negative time of day.
pub fn timedelta_disagg(delta: Duration) -> TimeParts {
    let total_seconds = delta.num_seconds();
    let whole_days = total_seconds.div_euclid(86_400);
    let day_seconds = total_seconds.rem_euclid(86_400);

    let (years, days) = (whole_days.div_euclid(365), whole_days.rem_euclid(365));
    let (months, days) = (days / 30, days % 30);
    let (hours, remainder) = (day_seconds / 3600, day_seconds % 3600);
    let (minutes, seconds) = (remainder / 60, remainder % 60);

    TimeParts {
        years,
        months,
        days,
        hours,
        minutes,
        seconds,
    }
}

/// Render selected parts of a duration, e.g. `yr: 2, mth: 3`
pub fn timedelta_to_str(delta: Duration, parts: &[(TimePart, &str)]) -> String {
    let disagg = timedelta_disagg(delta);
    parts
        .iter()
        .map(|(part, label)| format!("{}: {}", label, disagg.get(*part)))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Output flavour of [`running_time`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunningTimeKind {
    /// The elapsed duration itself
    Raw,
    /// Years and months, e.g. `yr: 1, mth: 4`
    Human,
    /// Whole years
    Age,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunningTime {
    Raw(Duration),
    Human(String),
    Age(i64),
}

/// Elapsed time between each start and `now`
pub fn running_time(
    starts: &[NaiveDateTime],
    kind: RunningTimeKind,
    now: NaiveDateTime,
) -> Vec<RunningTime> {
    starts
        .iter()
        .map(|start| {
            let elapsed = now - *start;
            match kind {
                RunningTimeKind::Raw => RunningTime::Raw(elapsed),
                RunningTimeKind::Human => RunningTime::Human(timedelta_to_str(
                    elapsed,
                    &[(TimePart::Years, "yr"), (TimePart::Months, "mth")],
                )),
                RunningTimeKind::Age => RunningTime::Age(elapsed.num_days() / 365),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_datetime_formats() {
        let full = parse_datetime("2024-02-03 04:05:06").unwrap();
        assert_eq!(full.to_string(), "2024-02-03 04:05:06");
        let date_only = parse_datetime("2024-02-03").unwrap();
        assert_eq!(date_only.to_string(), "2024-02-03 00:00:00");
        assert!(parse_datetime("03/02/2024").is_err());
    }

    #[test]
    fn test_timedelta_disagg() {
        let delta = Duration::days(365 + 2 * 30 + 4) + Duration::seconds(3 * 3600 + 25 * 60 + 9);
        let parts = timedelta_disagg(delta);
        assert_eq!(
            parts,
            TimeParts {
                years: 1,
                months: 2,
                days: 4,
                hours: 3,
                minutes: 25,
                seconds: 9,
            }
        );
    }

    #[test]
    fn test_timedelta_to_str() {
        let delta = Duration::days(2 * 365 + 95);
        let text = timedelta_to_str(delta, &[(TimePart::Years, "yr"), (TimePart::Months, "mth")]);
        assert_eq!(text, "yr: 2, mth: 3");
    }

    #[test]
    fn test_running_time_kinds() {
        let now = parse_datetime("2024-01-01").unwrap();
        let starts = vec![parse_datetime("2014-01-01").unwrap()];

        let age = running_time(&starts, RunningTimeKind::Age, now);
        assert_eq!(age, vec![RunningTime::Age(10)]);

        let human = running_time(&starts, RunningTimeKind::Human, now);
        assert_eq!(human, vec![RunningTime::Human("yr: 10, mth: 0".to_string())]);

        let raw = running_time(&starts, RunningTimeKind::Raw, now);
        assert_eq!(raw, vec![RunningTime::Raw(now - starts[0])]);
    }
}
