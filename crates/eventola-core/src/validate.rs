// Boundary validation for form input
//
// The event creation and RSVP forms are validated once, here, before anything
// touches storage. Failures come back as field-level errors so the UI can
// render them inline next to the offending input.

use chrono::{DateTime, NaiveDate, NaiveTime, TimeZone, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::event::{EventStatus, Theme};

#[cfg(feature = "openapi")]
use utoipa::ToSchema;

const TIME_PATTERN: &str = r"^([0-1]?[0-9]|2[0-3]):[0-5][0-9]$";

/// A validation failure attached to one form field
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    fn new(field: &str, message: &str) -> Self {
        Self {
            field: field.to_string(),
            message: message.to_string(),
        }
    }
}

/// Event creation form input
#[derive(Debug, Clone, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct EventForm {
    pub title: String,
    pub description: String,
    pub location: String,
    /// Calendar date of the event (both times fall on this date)
    pub date: NaiveDate,
    /// Start time of day, HH:MM
    pub start_time: String,
    /// End time of day, HH:MM
    pub end_time: String,
    pub status: EventStatus,
    pub theme: Theme,
    #[serde(default)]
    pub is_public: bool,
    /// Previously uploaded cover image, referenced by id
    #[serde(default)]
    pub cover_file_id: Option<Uuid>,
    /// Previously uploaded logo image, referenced by id
    #[serde(default)]
    pub logo_file_id: Option<Uuid>,
}

impl EventForm {
    /// Validate the form, returning every field-level failure at once
    pub fn validate(&self) -> Vec<FieldError> {
        let mut errors = Vec::new();
        let time_re = Regex::new(TIME_PATTERN).expect("valid time pattern");

        if self.title.trim().chars().count() < 3 {
            errors.push(FieldError::new(
                "title",
                "Title must be at least 3 characters.",
            ));
        }
        if self.description.trim().chars().count() < 10 {
            errors.push(FieldError::new(
                "description",
                "Description must be at least 10 characters.",
            ));
        }
        if self.location.trim().chars().count() < 3 {
            errors.push(FieldError::new("location", "Location is required."));
        }
        if !time_re.is_match(&self.start_time) {
            errors.push(FieldError::new("start_time", "Invalid time format."));
        }
        if !time_re.is_match(&self.end_time) {
            errors.push(FieldError::new("end_time", "Invalid time format."));
        }

        errors
    }

    /// Combine the date with both time-of-day fields into UTC timestamps.
    /// Only meaningful after `validate` passed.
    pub fn timestamps(&self) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
        let start = parse_time(&self.start_time)?;
        let end = parse_time(&self.end_time)?;
        let start_at = Utc.from_utc_datetime(&self.date.and_time(start));
        let end_at = Utc.from_utc_datetime(&self.date.and_time(end));
        Some((start_at, end_at))
    }
}

fn parse_time(s: &str) -> Option<NaiveTime> {
    let (hour, minute) = s.split_once(':')?;
    NaiveTime::from_hms_opt(hour.parse().ok()?, minute.parse().ok()?, 0)
}

/// RSVP form input
#[derive(Debug, Clone, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct RsvpForm {
    pub name: String,
    pub email: String,
}

impl RsvpForm {
    pub fn validate(&self) -> Vec<FieldError> {
        let mut errors = Vec::new();
        if self.name.trim().is_empty() {
            errors.push(FieldError::new("name", "Name is required."));
        }
        if !is_valid_email(&self.email) {
            errors.push(FieldError::new("email", "Enter a valid email address."));
        }
        errors
    }
}

/// Syntactic email check: one `@`, non-empty local part, domain with a dot
pub fn is_valid_email(email: &str) -> bool {
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.is_empty() {
        return false;
    }
    if email.chars().any(char::is_whitespace) {
        return false;
    }
    match domain.rsplit_once('.') {
        Some((host, tld)) => !host.is_empty() && tld.len() >= 2,
        None => false,
    }
}
