use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use thiserror::Error;

use crate::utils::error::AppError;

pub const TITLE_MIN_LEN: usize = 3;
pub const TITLE_MAX_LEN: usize = 100;
pub const LONG_DESCRIPTION_MIN_LEN: usize = 10;
pub const SHORT_DESCRIPTION_MAX_LEN: usize = 200;

/// Visibility state of an event. Drafts are only visible to administrators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventStatus {
    Draft,
    Published,
}

impl EventStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventStatus::Draft => "draft",
            EventStatus::Published => "published",
        }
    }
}

impl fmt::Display for EventStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error)]
#[error("unknown event status '{0}'")]
pub struct UnknownStatus(pub String);

impl FromStr for EventStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "draft" => Ok(EventStatus::Draft),
            "published" => Ok(EventStatus::Published),
            other => Err(UnknownStatus(other.to_string())),
        }
    }
}

impl TryFrom<String> for EventStatus {
    type Error = UnknownStatus;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Event {
    pub id: i64,
    pub title: String,
    pub long_description: String,
    pub short_description: String,
    pub date_and_time: DateTime<Utc>,
    pub organizer: String,
    pub location: String,
    #[sqlx(try_from = "String")]
    pub status: EventStatus,
}

/// Body of an event creation request.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct NewEvent {
    pub title: String,
    pub long_description: String,
    pub short_description: String,
    pub date_and_time: DateTime<Utc>,
    pub organizer: String,
    pub location: String,
    pub status: EventStatus,
}

/// Partial update of an event. Absent fields leave the stored value untouched.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct EventPatch {
    pub title: Option<String>,
    pub long_description: Option<String>,
    pub short_description: Option<String>,
    pub date_and_time: Option<DateTime<Utc>>,
    pub organizer: Option<String>,
    pub location: Option<String>,
    pub status: Option<EventStatus>,
}

/// Lowercases searchable text. Idempotent.
pub fn normalize_text(value: &str) -> String {
    value.to_lowercase()
}

impl NewEvent {
    pub fn normalize(&mut self) {
        self.title = normalize_text(&self.title);
        self.organizer = normalize_text(&self.organizer);
        self.location = normalize_text(&self.location);
    }

    pub fn validate(&self, now: DateTime<Utc>) -> Result<(), AppError> {
        validate_fields(
            FieldsRef {
                title: &self.title,
                long_description: &self.long_description,
                short_description: &self.short_description,
                date_and_time: self.date_and_time,
                organizer: &self.organizer,
                location: &self.location,
            },
            now,
        )
    }

    pub fn into_event(self, id: i64) -> Event {
        Event {
            id,
            title: self.title,
            long_description: self.long_description,
            short_description: self.short_description,
            date_and_time: self.date_and_time,
            organizer: self.organizer,
            location: self.location,
            status: self.status,
        }
    }
}

impl Event {
    pub fn normalize(&mut self) {
        self.title = normalize_text(&self.title);
        self.organizer = normalize_text(&self.organizer);
        self.location = normalize_text(&self.location);
    }

    pub fn validate(&self, now: DateTime<Utc>) -> Result<(), AppError> {
        validate_fields(
            FieldsRef {
                title: &self.title,
                long_description: &self.long_description,
                short_description: &self.short_description,
                date_and_time: self.date_and_time,
                organizer: &self.organizer,
                location: &self.location,
            },
            now,
        )
    }

    pub fn is_draft(&self) -> bool {
        self.status == EventStatus::Draft
    }
}

impl EventPatch {
    /// Merges the patch onto a loaded event.
    pub fn apply(self, mut event: Event) -> Event {
        if let Some(title) = self.title {
            event.title = title;
        }
        if let Some(long_description) = self.long_description {
            event.long_description = long_description;
        }
        if let Some(short_description) = self.short_description {
            event.short_description = short_description;
        }
        if let Some(date_and_time) = self.date_and_time {
            event.date_and_time = date_and_time;
        }
        if let Some(organizer) = self.organizer {
            event.organizer = organizer;
        }
        if let Some(location) = self.location {
            event.location = location;
        }
        if let Some(status) = self.status {
            event.status = status;
        }
        event
    }
}

struct FieldsRef<'a> {
    title: &'a str,
    long_description: &'a str,
    short_description: &'a str,
    date_and_time: DateTime<Utc>,
    organizer: &'a str,
    location: &'a str,
}

fn validate_fields(fields: FieldsRef<'_>, now: DateTime<Utc>) -> Result<(), AppError> {
    let mut problems = Vec::new();

    // Minimums ignore padding; maximums count what is stored, after lowercasing.
    let title_min = fields.title.trim().chars().count();
    let title_stored = normalize_text(fields.title).chars().count();
    if title_min < TITLE_MIN_LEN || title_stored > TITLE_MAX_LEN {
        problems.push(format!(
            "title must be between {TITLE_MIN_LEN} and {TITLE_MAX_LEN} characters"
        ));
    }
    if fields.long_description.trim().chars().count() < LONG_DESCRIPTION_MIN_LEN {
        problems.push(format!(
            "long_description must be at least {LONG_DESCRIPTION_MIN_LEN} characters"
        ));
    }
    let short_min = fields.short_description.trim().chars().count();
    let short_stored = fields.short_description.chars().count();
    if short_min == 0 || short_stored > SHORT_DESCRIPTION_MAX_LEN {
        problems.push(format!(
            "short_description must be between 1 and {SHORT_DESCRIPTION_MAX_LEN} characters"
        ));
    }
    if fields.organizer.trim().is_empty() {
        problems.push("organizer is required".to_string());
    }
    if fields.location.trim().is_empty() {
        problems.push("location is required".to_string());
    }
    if fields.date_and_time <= now {
        problems.push("date_and_time must be in the future".to_string());
    }

    if problems.is_empty() {
        Ok(())
    } else {
        Err(AppError::ValidationError(problems.join("; ")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn sample(now: DateTime<Utc>) -> NewEvent {
        NewEvent {
            title: "My Event".to_string(),
            long_description: "A long enough description".to_string(),
            short_description: "Short".to_string(),
            date_and_time: now + Duration::days(7),
            organizer: "Test Org".to_string(),
            location: "Main Hall".to_string(),
            status: EventStatus::Published,
        }
    }

    #[test]
    fn test_normalize_lowercases_searchable_fields() {
        let now = Utc::now();
        let mut event = sample(now);
        event.normalize();
        assert_eq!(event.title, "my event");
        assert_eq!(event.organizer, "test org");
        assert_eq!(event.location, "main hall");
        assert_eq!(event.short_description, "Short");
    }

    #[test]
    fn test_normalize_is_idempotent() {
        let once = normalize_text("My ÉVENT");
        assert_eq!(normalize_text(&once), once);
    }

    #[test]
    fn test_valid_event_passes() {
        let now = Utc::now();
        assert!(sample(now).validate(now).is_ok());
    }

    #[test]
    fn test_past_date_is_rejected() {
        let now = Utc::now();
        let mut event = sample(now);
        event.date_and_time = now - Duration::hours(1);
        let err = event.validate(now).unwrap_err();
        assert!(err.to_string().contains("date_and_time"));
    }

    #[test]
    fn test_length_limits_are_enforced() {
        let now = Utc::now();
        let mut event = sample(now);
        event.title = "ab".to_string();
        event.long_description = "short".to_string();
        event.short_description = "x".repeat(SHORT_DESCRIPTION_MAX_LEN + 1);
        event.organizer = "  ".to_string();

        let message = event.validate(now).unwrap_err().to_string();
        assert!(message.contains("title"));
        assert!(message.contains("long_description"));
        assert!(message.contains("short_description"));
        assert!(message.contains("organizer"));
        assert!(!message.contains("location"));
    }

    #[test]
    fn test_padded_title_counts_stored_length() {
        let now = Utc::now();
        let mut event = sample(now);
        event.title = format!("     {}", "x".repeat(TITLE_MAX_LEN));
        let message = event.validate(now).unwrap_err().to_string();
        assert!(message.contains("title"));

        event.title = "x".repeat(TITLE_MAX_LEN);
        assert!(event.validate(now).is_ok());
    }

    #[test]
    fn test_padded_short_description_counts_stored_length() {
        let now = Utc::now();
        let mut event = sample(now);
        event.short_description = format!(" {}", "x".repeat(SHORT_DESCRIPTION_MAX_LEN));
        assert!(event.validate(now).is_err());
    }

    #[test]
    fn test_title_length_is_measured_after_lowercasing() {
        let now = Utc::now();
        let mut event = sample(now);
        // 'İ' lowercases to two chars.
        event.title = "İ".repeat(TITLE_MAX_LEN);
        assert!(normalize_text(&event.title).chars().count() > TITLE_MAX_LEN);
        assert!(event.validate(now).is_err());
    }

    #[test]
    fn test_patch_only_overwrites_present_fields() {
        let now = Utc::now();
        let event = sample(now).into_event(4);
        let patch = EventPatch {
            title: Some("Renamed".to_string()),
            status: Some(EventStatus::Draft),
            ..EventPatch::default()
        };

        let patched = patch.apply(event.clone());
        assert_eq!(patched.id, 4);
        assert_eq!(patched.title, "Renamed");
        assert_eq!(patched.status, EventStatus::Draft);
        assert_eq!(patched.long_description, event.long_description);
        assert_eq!(patched.date_and_time, event.date_and_time);
    }

    #[test]
    fn test_empty_patch_is_identity() {
        let now = Utc::now();
        let event = sample(now).into_event(1);
        assert_eq!(EventPatch::default().apply(event.clone()), event);
    }

    #[test]
    fn test_status_parses_known_values_only() {
        assert_eq!("draft".parse::<EventStatus>().unwrap(), EventStatus::Draft);
        assert_eq!(
            "published".parse::<EventStatus>().unwrap(),
            EventStatus::Published
        );
        assert!("archived".parse::<EventStatus>().is_err());
    }

    #[test]
    fn test_status_serializes_lowercase() {
        let json = serde_json::to_string(&EventStatus::Published).unwrap();
        assert_eq!(json, "\"published\"");
    }
}
