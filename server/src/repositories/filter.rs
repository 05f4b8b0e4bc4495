use std::str::FromStr;

use chrono::{DateTime, Utc};

use super::query::{Bind, Predicates};
use crate::models::event::normalize_text;
use crate::models::EventStatus;

/// Optional, conjunctive filters for the event listing. `None` means no predicate.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EventFilter {
    pub status: Option<EventStatus>,
    pub title: Option<String>,
    pub date_start: Option<DateTime<Utc>>,
    pub date_end: Option<DateTime<Utc>>,
}

impl EventFilter {
    pub fn predicates(&self) -> Predicates {
        let mut predicates = Predicates::new();
        if let Some(status) = self.status {
            predicates.bound("status = ", Bind::Text(status.as_str().to_string()));
        }
        if let Some(title) = self.title.as_deref().filter(|t| !t.is_empty()) {
            predicates.bound("title LIKE ", Bind::Text(contains_pattern(title)));
        }
        if let Some(start) = self.date_start {
            predicates.bound("date_and_time >= ", Bind::Instant(start));
        }
        if let Some(end) = self.date_end {
            predicates.bound("date_and_time <= ", Bind::Instant(end));
        }
        predicates
    }
}

/// `%needle%` with LIKE metacharacters escaped so the match is literal.
fn contains_pattern(needle: &str) -> String {
    let mut pattern = String::with_capacity(needle.len() + 2);
    pattern.push('%');
    for c in normalize_text(needle).chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

/// Temporal filter for a user's signed-up events.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SignupFilter {
    #[default]
    All,
    Upcoming,
    Past,
}

impl FromStr for SignupFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "" => Ok(SignupFilter::All),
            "upcoming" => Ok(SignupFilter::Upcoming),
            "past" => Ok(SignupFilter::Past),
            other => Err(other.to_string()),
        }
    }
}

impl SignupFilter {
    pub fn predicates(&self, user_id: i64) -> Predicates {
        let mut predicates = Predicates::new();
        predicates.bound("ue.user_id = ", Bind::BigInt(user_id));
        match self {
            SignupFilter::All => {}
            SignupFilter::Upcoming => {
                predicates.raw("e.date_and_time > NOW()");
            }
            SignupFilter::Past => {
                predicates.raw("e.date_and_time <= NOW()");
            }
        }
        predicates
    }
}
