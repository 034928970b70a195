//! Meeting windows and business-hour rules.

use crate::config::MeetingConfig;
use crate::error::MeetingError;
use chrono::{DateTime, Duration, NaiveDateTime, NaiveTime, TimeZone};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

/// Time window proposed by the model, as ISO 8601 strings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleWindow {
    #[serde(rename = "startTime")]
    pub start_time: String,
    /// Missing end means "start plus the default duration".
    #[serde(rename = "endTime", default)]
    pub end_time: Option<String>,
    #[serde(default = "default_true")]
    pub is_valid: bool,
    #[serde(default)]
    pub error_message: Option<String>,
}

fn default_true() -> bool {
    true
}

/// Business hours, time zone and default length for new meetings.
#[derive(Debug, Clone, PartialEq)]
pub struct MeetingRules {
    pub open: NaiveTime,
    pub close: NaiveTime,
    pub timezone: Tz,
    pub default_duration_minutes: u32,
}

impl MeetingRules {
    pub fn from_config(config: &MeetingConfig) -> Result<Self, MeetingError> {
        let open = parse_clock(&config.business_hours_start)?;
        let close = parse_clock(&config.business_hours_end)?;
        if close <= open {
            return Err(MeetingError::InvalidRules(format!(
                "business hours end {} is not after start {}",
                config.business_hours_end, config.business_hours_start
            )));
        }
        let timezone: Tz = config
            .timezone
            .parse()
            .map_err(|_| MeetingError::InvalidRules(format!("unknown time zone '{}'", config.timezone)))?;
        if config.default_duration_minutes == 0 {
            return Err(MeetingError::InvalidRules("default duration must be positive".to_string()));
        }
        Ok(Self { open, close, timezone, default_duration_minutes: config.default_duration_minutes })
    }
}

/// A checked window in the rules' time zone.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CheckedWindow {
    pub start: DateTime<Tz>,
    pub end: DateTime<Tz>,
}

impl CheckedWindow {
    pub fn duration_minutes(&self) -> i64 {
        (self.end - self.start).num_minutes()
    }
}

/// Validate a proposed window against the rules.
pub fn check_window(window: &ScheduleWindow, rules: &MeetingRules) -> Result<CheckedWindow, MeetingError> {
    if !window.is_valid {
        return Err(MeetingError::InvalidSchedule(
            window
                .error_message
                .clone()
                .unwrap_or_else(|| "the proposed time could not be understood".to_string()),
        ));
    }

    let start = parse_instant(&window.start_time, rules.timezone)?;
    let end = match window.end_time.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        Some(raw) => parse_instant(raw, rules.timezone)?,
        None => start + Duration::minutes(i64::from(rules.default_duration_minutes)),
    };
    if end <= start {
        return Err(MeetingError::InvalidSchedule(format!(
            "end {} is not after start {}",
            end.to_rfc3339(),
            start.to_rfc3339()
        )));
    }

    let outside = start.date_naive() != end.date_naive()
        || start.time() < rules.open
        || end.time() > rules.close;
    if outside {
        return Err(MeetingError::OutsideBusinessHours {
            start: start.format("%Y-%m-%d %H:%M").to_string(),
            end: end.format("%Y-%m-%d %H:%M").to_string(),
            open: rules.open.format("%H:%M").to_string(),
            close: rules.close.format("%H:%M").to_string(),
        });
    }

    Ok(CheckedWindow { start, end })
}

fn parse_clock(raw: &str) -> Result<NaiveTime, MeetingError> {
    NaiveTime::parse_from_str(raw.trim(), "%H:%M")
        .map_err(|_| MeetingError::InvalidRules(format!("'{}' is not an HH:MM time", raw)))
}

/// RFC 3339 with offset, or a naive local time read in `tz`.
fn parse_instant(raw: &str, tz: Tz) -> Result<DateTime<Tz>, MeetingError> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Ok(dt.with_timezone(&tz));
    }
    let naive = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S")
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M"))
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M"))
        .map_err(|_| MeetingError::InvalidSchedule(format!("'{}' is not an ISO 8601 time", raw)))?;
    tz.from_local_datetime(&naive)
        .single()
        .ok_or_else(|| MeetingError::InvalidSchedule(format!("'{}' is ambiguous or skipped in {}", raw, tz)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use test_case::test_case;

    fn rules() -> MeetingRules {
        MeetingRules::from_config(&MeetingConfig::default()).unwrap()
    }

    fn window(start: &str, end: Option<&str>) -> ScheduleWindow {
        ScheduleWindow {
            start_time: start.to_string(),
            end_time: end.map(str::to_string),
            is_valid: true,
            error_message: None,
        }
    }

    #[test]
    fn test_rules_from_config() {
        let rules = rules();
        assert_eq!(rules.open, NaiveTime::from_hms_opt(9, 0, 0).unwrap());
        assert_eq!(rules.timezone, chrono_tz::Europe::Istanbul);

        let mut config = MeetingConfig::default();
        config.timezone = "Mars/Olympus".to_string();
        assert!(matches!(MeetingRules::from_config(&config), Err(MeetingError::InvalidRules(_))));

        let mut config = MeetingConfig::default();
        config.business_hours_end = "08:00".to_string();
        assert!(MeetingRules::from_config(&config).is_err());
    }

    #[test]
    fn test_naive_window() {
        let checked = check_window(&window("2025-03-20T14:00:00", Some("2025-03-20T15:30:00")), &rules()).unwrap();
        assert_eq!(checked.duration_minutes(), 90);
        assert_eq!(checked.start.to_rfc3339(), "2025-03-20T14:00:00+03:00");
    }

    #[test]
    fn test_offset_window_is_converted() {
        // 11:00 UTC is 14:00 in Istanbul
        let checked = check_window(&window("2025-03-20T11:00:00Z", Some("2025-03-20T11:45:00Z")), &rules()).unwrap();
        assert_eq!(checked.start.format("%H:%M").to_string(), "14:00");
        assert_eq!(checked.duration_minutes(), 45);
    }

    #[test]
    fn test_missing_end_uses_default_duration() {
        let checked = check_window(&window("2025-03-20T10:00", None), &rules()).unwrap();
        assert_eq!(checked.duration_minutes(), 30);
    }

    #[test_case("2025-03-20T08:30:00", "2025-03-20T09:30:00" ; "starts before open")]
    #[test_case("2025-03-20T16:30:00", "2025-03-20T17:30:00" ; "ends after close")]
    #[test_case("2025-03-20T16:00:00", "2025-03-21T10:00:00" ; "spans days")]
    fn test_outside_business_hours(start: &str, end: &str) {
        let result = check_window(&window(start, Some(end)), &rules());
        assert!(matches!(result, Err(MeetingError::OutsideBusinessHours { .. })));
    }

    #[test]
    fn test_invalid_windows() {
        let backwards = window("2025-03-20T15:00:00", Some("2025-03-20T14:00:00"));
        assert!(matches!(check_window(&backwards, &rules()), Err(MeetingError::InvalidSchedule(_))));

        let garbage = window("next tuesday", None);
        assert!(matches!(check_window(&garbage, &rules()), Err(MeetingError::InvalidSchedule(_))));

        let mut flagged = window("2025-03-20T10:00:00", None);
        flagged.is_valid = false;
        flagged.error_message = Some("date is in the past".to_string());
        match check_window(&flagged, &rules()) {
            Err(MeetingError::InvalidSchedule(msg)) => assert_eq!(msg, "date is in the past"),
            other => panic!("unexpected {:?}", other),
        }
    }
}
