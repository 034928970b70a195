//! Meeting request extraction results and the final meeting record.

pub mod model_output;
pub mod schedule;

pub use model_output::extract_json;
pub use schedule::{check_window, CheckedWindow, MeetingRules, ScheduleWindow};

use crate::directory::Person;
use crate::error::MeetingError;
use log::info;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// What the model extracted from the user's meeting request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MeetingRequest {
    pub attendees: Vec<String>,
    pub duration_minutes: Option<u32>,
    pub date_description: Option<String>,
    pub time_description: Option<String>,
    pub subject: Option<String>,
    pub purpose: Option<String>,
    pub confidence: Option<f32>,
}

impl MeetingRequest {
    /// Attendee names with blanks and surrounding whitespace removed.
    pub fn attendee_names(&self) -> Vec<String> {
        self.attendees
            .iter()
            .map(|name| name.trim())
            .filter(|name| !name.is_empty())
            .map(str::to_string)
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserDetails {
    pub email_address: String,
    pub full_name: String,
    pub id: i64,
}

impl From<&Person> for UserDetails {
    fn from(person: &Person) -> Self {
        Self {
            email_address: person.email_address.clone(),
            full_name: person.full_name.clone(),
            id: person.id,
        }
    }
}

/// The meeting as handed to the calendar backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeetingRecord {
    pub body: String,
    #[serde(rename = "endTime")]
    pub end_time: String,
    /// Minutes.
    pub meeting_duration: i64,
    #[serde(rename = "startTime")]
    pub start_time: String,
    pub subject: String,
    pub user_details: Vec<UserDetails>,
}

impl MeetingRecord {
    /// Check the window and attendees and build the record.
    ///
    /// Attendees are deduplicated by id, keeping first occurrence order.
    pub fn assemble(
        subject: &str,
        window: &ScheduleWindow,
        body: &str,
        attendees: &[Person],
        rules: &MeetingRules,
    ) -> Result<Self, MeetingError> {
        let mut seen = HashSet::new();
        let user_details: Vec<UserDetails> = attendees
            .iter()
            .filter(|person| seen.insert(person.id))
            .map(UserDetails::from)
            .collect();
        if user_details.is_empty() {
            return Err(MeetingError::NoAttendees);
        }

        let checked = check_window(window, rules)?;
        let subject = match subject.trim() {
            "" => "Meeting".to_string(),
            s => s.to_string(),
        };

        info!(
            "Assembled meeting '{}' at {} with {} attendee(s)",
            subject,
            checked.start.to_rfc3339(),
            user_details.len()
        );
        Ok(Self {
            body: body.trim().to_string(),
            end_time: checked.end.to_rfc3339(),
            meeting_duration: checked.duration_minutes(),
            start_time: checked.start.to_rfc3339(),
            subject,
            user_details,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MeetingConfig;
    use pretty_assertions::assert_eq;

    fn rules() -> MeetingRules {
        MeetingRules::from_config(&MeetingConfig::default()).unwrap()
    }

    fn window() -> ScheduleWindow {
        ScheduleWindow {
            start_time: "2025-03-20T14:00:00".to_string(),
            end_time: Some("2025-03-20T15:00:00".to_string()),
            is_valid: true,
            error_message: None,
        }
    }

    #[test]
    fn test_request_from_model_output() {
        let text = r#"```json
{"attendees": ["Ali", " ", "Arda Orçun"], "duration_minutes": 45, "subject": "Roadmap", "confidence": 0.9}
```"#;
        let request: MeetingRequest = extract_json(text).unwrap();
        assert_eq!(request.attendee_names(), vec!["Ali".to_string(), "Arda Orçun".to_string()]);
        assert_eq!(request.duration_minutes, Some(45));
        assert_eq!(request.purpose, None);
    }

    #[test]
    fn test_assemble() {
        let ali = Person::new(4, "Ali Şahin", "ali.sahin@company.com.tr");
        let arda = Person::new(10, "Arda Orçun", "arda.orcun@company.com.tr");
        let record = MeetingRecord::assemble(
            "Roadmap",
            &window(),
            "  Quarterly roadmap review. ",
            &[ali.clone(), arda, ali],
            &rules(),
        )
        .unwrap();

        assert_eq!(record.meeting_duration, 60);
        assert_eq!(record.start_time, "2025-03-20T14:00:00+03:00");
        assert_eq!(record.body, "Quarterly roadmap review.");
        let ids: Vec<i64> = record.user_details.iter().map(|u| u.id).collect();
        assert_eq!(ids, vec![4, 10]);

        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["endTime"], "2025-03-20T15:00:00+03:00");
        assert_eq!(json["user_details"][0]["full_name"], "Ali Şahin");
    }

    #[test]
    fn test_assemble_errors() {
        assert!(matches!(
            MeetingRecord::assemble("x", &window(), "", &[], &rules()),
            Err(MeetingError::NoAttendees)
        ));

        let person = Person::new(1, "Ali Demir", "ali.demir@company.com.tr");
        let mut late = window();
        late.start_time = "2025-03-20T18:00:00".to_string();
        late.end_time = Some("2025-03-20T19:00:00".to_string());
        assert!(matches!(
            MeetingRecord::assemble("x", &late, "", &[person], &rules()),
            Err(MeetingError::OutsideBusinessHours { .. })
        ));
    }

    #[test]
    fn test_blank_subject() {
        let person = Person::new(1, "Ali Demir", "ali.demir@company.com.tr");
        let record = MeetingRecord::assemble(" ", &window(), "", &[person], &rules()).unwrap();
        assert_eq!(record.subject, "Meeting");
    }
}
