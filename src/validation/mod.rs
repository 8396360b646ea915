//! Server-side validation and sanitation of form submissions
//!
//! Nothing sent by the browser is trusted: every text field is trimmed and
//! HTML-encoded before it is stored or embedded in an email.

pub mod spam;

use crate::models::{
    format_timestamp, ContactSubmission, DemoBookingRequest, NewsletterSignup, RawPayload,
    TimeSlot,
};
use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime, Utc, Weekday};
use thiserror::Error;

pub use spam::SpamFilter;

/// Validation failures, displayed to the visitor as-is
#[derive(Debug, Error, PartialEq)]
pub enum ValidationError {
    #[error("Données invalides")]
    InvalidInput,

    #[error("Le champ {field} est obligatoire")]
    MissingField { field: String },

    #[error("Adresse email invalide")]
    InvalidEmail,

    #[error("La date de démonstration doit être dans le futur")]
    InvalidDate,

    #[error("Ce créneau n'est pas disponible. Veuillez choisir une autre date/heure.")]
    SlotUnavailable,

    #[error("Message rejeté par le filtre anti-spam")]
    RejectedAsSpam,
}

pub const CONTACT_REQUIRED_FIELDS: &[&str] =
    &["firstName", "lastName", "email", "subject", "message"];

pub const DEMO_REQUIRED_FIELDS: &[&str] = &[
    "firstName",
    "lastName",
    "email",
    "phone",
    "preferredDate",
    "timeSlot",
    "guests",
];

// =============================================================================
// Availability
// =============================================================================

/// Decides whether a demo can be scheduled on a given day and slot.
///
/// Only a weekday rule exists today; checking existing bookings would be a
/// second implementation of this trait.
pub trait SlotAvailability: Send + Sync {
    fn is_available(&self, day: NaiveDate, slot: &TimeSlot) -> bool;
}

/// Every slot is open except on the excluded weekday
#[derive(Debug, Clone)]
pub struct WeekdayAvailability {
    pub closed_on: Weekday,
}

impl Default for WeekdayAvailability {
    fn default() -> Self {
        Self {
            closed_on: Weekday::Sun,
        }
    }
}

impl SlotAvailability for WeekdayAvailability {
    fn is_available(&self, day: NaiveDate, _slot: &TimeSlot) -> bool {
        day.weekday() != self.closed_on
    }
}

// =============================================================================
// Submission validation
// =============================================================================

/// Validate and sanitize a contact form payload
pub fn validate_contact(
    payload: &RawPayload,
    spam: &SpamFilter,
    now: DateTime<Utc>,
) -> Result<ContactSubmission, ValidationError> {
    require_all(payload, CONTACT_REQUIRED_FIELDS)?;

    let raw_email = payload.require("email")?;
    let submission = ContactSubmission {
        first_name: sanitize(&payload.require("firstName")?),
        last_name: sanitize(&payload.require("lastName")?),
        email: sanitize(&raw_email),
        phone: sanitize(&payload.text("phone").unwrap_or_default()),
        subject: sanitize(&payload.require("subject")?),
        message: sanitize(&payload.require("message")?),
        newsletter: payload.flag("newsletter"),
        timestamp: format_timestamp(now),
        mail_address: raw_email.trim().to_string(),
    };

    if !is_valid_email(&raw_email) {
        return Err(ValidationError::InvalidEmail);
    }

    if spam.is_spam(&submission.message) || spam.is_spam(&submission.first_name) {
        return Err(ValidationError::RejectedAsSpam);
    }

    Ok(submission)
}

/// Validate and sanitize a demo booking payload
pub fn validate_demo(
    payload: &RawPayload,
    spam: &SpamFilter,
    availability: &dyn SlotAvailability,
    now: DateTime<Utc>,
) -> Result<DemoBookingRequest, ValidationError> {
    require_all(payload, DEMO_REQUIRED_FIELDS)?;

    let raw_email = payload.require("email")?;
    let guests = payload
        .count("guests")
        .ok_or(ValidationError::InvalidInput)?;

    let mut request = DemoBookingRequest {
        first_name: sanitize(&payload.require("firstName")?),
        last_name: sanitize(&payload.require("lastName")?),
        email: sanitize(&raw_email),
        phone: sanitize(&payload.require("phone")?),
        company: sanitize(&payload.text("company").unwrap_or_default()),
        preferred_date: sanitize(&payload.require("preferredDate")?),
        time_slot: TimeSlot::from(sanitize(&payload.require("timeSlot")?)),
        guests,
        interests: payload.list("interests").iter().map(|i| sanitize(i)).collect(),
        message: sanitize(&payload.text("message").unwrap_or_default()),
        timestamp: format_timestamp(now),
        preferred_day: None,
        mail_address: raw_email.trim().to_string(),
    };

    if !is_valid_email(&raw_email) {
        return Err(ValidationError::InvalidEmail);
    }

    if spam.is_spam(&request.message) || spam.is_spam(&request.first_name) {
        return Err(ValidationError::RejectedAsSpam);
    }

    let (starts_at, day) =
        parse_preferred_date(&request.preferred_date).ok_or(ValidationError::InvalidDate)?;
    if starts_at <= now {
        return Err(ValidationError::InvalidDate);
    }

    if !availability.is_available(day, &request.time_slot) {
        return Err(ValidationError::SlotUnavailable);
    }

    request.preferred_day = Some(day);
    Ok(request)
}

/// Validate a standalone newsletter signup
pub fn validate_newsletter(
    payload: &RawPayload,
    now: DateTime<Utc>,
) -> Result<NewsletterSignup, ValidationError> {
    let raw_email = payload.require("email")?;
    if !is_valid_email(&raw_email) {
        return Err(ValidationError::InvalidEmail);
    }

    Ok(NewsletterSignup {
        email: sanitize(&raw_email),
        name: sanitize(&payload.text("name").unwrap_or_default()),
        timestamp: format_timestamp(now),
    })
}

fn require_all(payload: &RawPayload, fields: &[&str]) -> Result<(), ValidationError> {
    for field in fields {
        payload.require(field)?;
    }
    Ok(())
}

// =============================================================================
// Field helpers
// =============================================================================

/// Trim and HTML-encode a value so it can be embedded verbatim in a document.
///
/// Entities already present are left alone, so sanitizing twice is a no-op.
pub fn sanitize(input: &str) -> String {
    let trimmed = input.trim();
    let mut out = String::with_capacity(trimmed.len());

    for (i, c) in trimmed.char_indices() {
        match c {
            '&' if starts_with_entity(&trimmed[i..]) => out.push('&'),
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#039;"),
            _ => out.push(c),
        }
    }

    out
}

/// Whether `s` (starting at an `&`) begins with a named or numeric entity
fn starts_with_entity(s: &str) -> bool {
    let Some(end) = s.find(';') else {
        return false;
    };
    let body = &s[1..end];

    if let Some(num) = body.strip_prefix('#') {
        if let Some(hex) = num.strip_prefix('x').or_else(|| num.strip_prefix('X')) {
            return !hex.is_empty() && hex.len() <= 6 && hex.chars().all(|c| c.is_ascii_hexdigit());
        }
        return !num.is_empty() && num.len() <= 7 && num.chars().all(|c| c.is_ascii_digit());
    }

    !body.is_empty() && body.len() <= 32 && body.chars().all(|c| c.is_ascii_alphanumeric())
}

/// Syntactic email check
pub fn is_valid_email(email: &str) -> bool {
    let email = email.trim();
    // Require a dotted domain on top of the RFC syntax check
    validator::validate_email(email)
        && email
            .rsplit_once('@')
            .map(|(_, domain)| domain.contains('.') && !domain.ends_with('.'))
            .unwrap_or(false)
}

/// Parse a preferred demo date.
///
/// Accepts `YYYY-MM-DD` (midnight UTC), RFC 3339 timestamps and the
/// `YYYY-MM-DDTHH:MM` form of `datetime-local` inputs. Returns the instant
/// and the calendar day it falls on.
pub fn parse_preferred_date(value: &str) -> Option<(DateTime<Utc>, NaiveDate)> {
    let value = value.trim();

    if let Ok(day) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        let at = day.and_hms_opt(0, 0, 0)?.and_utc();
        return Some((at, day));
    }

    if let Ok(at) = DateTime::parse_from_rfc3339(value) {
        return Some((at.with_timezone(&Utc), at.date_naive()));
    }

    NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M")
        .ok()
        .map(|at| (at.and_utc(), at.date()))
}
