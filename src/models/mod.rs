//! Data models for the application

use crate::validation::ValidationError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Timestamp layout used in responses, log records and emails
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

pub fn format_timestamp(at: DateTime<Utc>) -> String {
    at.format(TIMESTAMP_FORMAT).to_string()
}

// =============================================================================
// Enums
// =============================================================================

/// The forms served by this application
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FormKind {
    Contact,
    Demo,
    Newsletter,
}

impl FormKind {
    /// Endpoint path segment for this form
    pub fn path(&self) -> &'static str {
        match self {
            FormKind::Contact => "contact",
            FormKind::Demo => "demo",
            FormKind::Newsletter => "newsletter",
        }
    }
}

/// Requested demo time slot. Known keys map to fixed time ranges; anything
/// else is kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum TimeSlot {
    Morning,
    Afternoon,
    Evening,
    Other(String),
}

impl TimeSlot {
    pub fn as_str(&self) -> &str {
        match self {
            TimeSlot::Morning => "morning",
            TimeSlot::Afternoon => "afternoon",
            TimeSlot::Evening => "evening",
            TimeSlot::Other(raw) => raw,
        }
    }

    /// Human-readable time range, or the raw value for unknown slots
    pub fn label(&self) -> &str {
        match self {
            TimeSlot::Morning => "10h00 - 12h00",
            TimeSlot::Afternoon => "14h00 - 16h00",
            TimeSlot::Evening => "18h00 - 20h00",
            TimeSlot::Other(raw) => raw,
        }
    }
}

impl From<String> for TimeSlot {
    fn from(value: String) -> Self {
        match value.as_str() {
            "morning" => TimeSlot::Morning,
            "afternoon" => TimeSlot::Afternoon,
            "evening" => TimeSlot::Evening,
            _ => TimeSlot::Other(value),
        }
    }
}

impl From<TimeSlot> for String {
    fn from(slot: TimeSlot) -> Self {
        match slot {
            TimeSlot::Other(raw) => raw,
            known => known.as_str().to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BookingStatus {
    Pending,
}

// =============================================================================
// Raw payload
// =============================================================================

/// Untyped JSON object as received from the browser. Every accessor is
/// lenient about the JSON type the way HTML forms are: numbers and booleans
/// are read as their text form.
#[derive(Debug, Clone)]
pub struct RawPayload {
    fields: Map<String, Value>,
}

impl RawPayload {
    /// Decode a request body; anything but a non-empty JSON object is rejected.
    pub fn parse(body: &[u8]) -> Result<Self, ValidationError> {
        match serde_json::from_slice::<Value>(body) {
            Ok(Value::Object(fields)) if !fields.is_empty() => Ok(Self { fields }),
            Ok(_) => Err(ValidationError::InvalidInput),
            Err(e) => {
                tracing::debug!("Rejecting unparseable payload: {}", e);
                Err(ValidationError::InvalidInput)
            }
        }
    }

    /// Field as text, if present and scalar
    pub fn text(&self, field: &str) -> Option<String> {
        match self.fields.get(field)? {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            Value::Bool(b) => Some(b.to_string()),
            _ => None,
        }
    }

    /// Field as text, failing with `MissingField` when absent or blank
    pub fn require(&self, field: &str) -> Result<String, ValidationError> {
        match self.text(field) {
            Some(value) if !value.trim().is_empty() => Ok(value),
            _ => Err(ValidationError::MissingField {
                field: field.to_string(),
            }),
        }
    }

    /// Checkbox-style flag: `true`, `1`, `"on"`, `"true"`, `"1"`
    pub fn flag(&self, field: &str) -> bool {
        match self.fields.get(field) {
            Some(Value::Bool(b)) => *b,
            Some(Value::Number(n)) => n.as_i64() == Some(1),
            Some(Value::String(s)) => matches!(s.trim(), "on" | "true" | "1"),
            _ => false,
        }
    }

    /// List of strings; a single string counts as a one-item list
    pub fn list(&self, field: &str) -> Vec<String> {
        match self.fields.get(field) {
            Some(Value::Array(items)) => items
                .iter()
                .filter_map(|v| v.as_str())
                .filter(|s| !s.trim().is_empty())
                .map(str::to_string)
                .collect(),
            Some(Value::String(s)) if !s.trim().is_empty() => vec![s.clone()],
            _ => Vec::new(),
        }
    }

    /// Non-negative integer from a JSON number or numeric string
    pub fn count(&self, field: &str) -> Option<u32> {
        match self.fields.get(field)? {
            Value::Number(n) => n.as_u64().and_then(|v| u32::try_from(v).ok()),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }
}

// =============================================================================
// Submissions
// =============================================================================

/// Sanitized contact form submission, as stored and emailed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactSubmission {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub subject: String,
    pub message: String,
    pub newsletter: bool,
    pub timestamp: String,
    /// Validated address used as mail recipient; `email` is the encoded form
    #[serde(skip)]
    pub mail_address: String,
}

impl ContactSubmission {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// Sanitized demo booking request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DemoBookingRequest {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub company: String,
    pub preferred_date: String,
    pub time_slot: TimeSlot,
    pub guests: u32,
    pub interests: Vec<String>,
    pub message: String,
    pub timestamp: String,
    /// Parsed form of `preferred_date`
    #[serde(skip)]
    pub preferred_day: Option<chrono::NaiveDate>,
    #[serde(skip)]
    pub mail_address: String,
}

/// Booking as persisted in the bookings log
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingRecord<'a> {
    #[serde(flatten)]
    pub request: &'a DemoBookingRequest,
    pub booking_id: &'a str,
    pub status: BookingStatus,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewsletterSignup {
    pub email: String,
    pub name: String,
    pub timestamp: String,
}

// =============================================================================
// API Responses
// =============================================================================

/// Outcome of a form submission, returned across the HTTP boundary
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionResult {
    pub success: bool,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub booking_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
}

impl SubmissionResult {
    pub fn accepted(message: impl Into<String>, timestamp: String) -> Self {
        Self {
            success: true,
            message: message.into(),
            booking_id: None,
            timestamp: Some(timestamp),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            booking_id: None,
            timestamp: None,
        }
    }

    pub fn with_booking_id(mut self, booking_id: impl Into<String>) -> Self {
        self.booking_id = Some(booking_id.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_time_slot_labels() {
        assert_eq!(TimeSlot::from("morning".to_string()).label(), "10h00 - 12h00");
        assert_eq!(TimeSlot::from("afternoon".to_string()).label(), "14h00 - 16h00");
        assert_eq!(TimeSlot::from("evening".to_string()).label(), "18h00 - 20h00");
        assert_eq!(TimeSlot::from("vers 15h".to_string()).label(), "vers 15h");
    }

    #[test]
    fn test_time_slot_serializes_as_key() {
        assert_eq!(json!(TimeSlot::Evening), json!("evening"));
        assert_eq!(json!(TimeSlot::Other("midi".to_string())), json!("midi"));
    }

    #[test]
    fn test_payload_rejects_non_objects() {
        assert!(RawPayload::parse(b"").is_err());
        assert!(RawPayload::parse(b"not json").is_err());
        assert!(RawPayload::parse(b"[1, 2]").is_err());
        assert!(RawPayload::parse(b"{}").is_err());
        assert!(RawPayload::parse(br#"{"a": 1}"#).is_ok());
    }

    #[test]
    fn test_payload_require() {
        let payload =
            RawPayload::parse(br#"{"name": "  ", "guests": 3, "email": "a@b.fr", "x": null}"#)
                .unwrap();
        assert!(matches!(
            payload.require("name"),
            Err(ValidationError::MissingField { ref field }) if field == "name"
        ));
        assert!(payload.require("x").is_err());
        assert!(payload.require("absent").is_err());
        assert_eq!(payload.require("guests").unwrap(), "3");
        assert_eq!(payload.require("email").unwrap(), "a@b.fr");
    }

    #[test]
    fn test_payload_flag_list_count() {
        let payload = RawPayload::parse(
            br#"{"a": true, "b": "on", "c": "off", "tags": ["x", "", "y", 4], "one": "z", "n": "12", "neg": -1}"#,
        )
        .unwrap();
        assert!(payload.flag("a"));
        assert!(payload.flag("b"));
        assert!(!payload.flag("c"));
        assert!(!payload.flag("missing"));
        assert_eq!(payload.list("tags"), vec!["x", "y"]);
        assert_eq!(payload.list("one"), vec!["z"]);
        assert!(payload.list("missing").is_empty());
        assert_eq!(payload.count("n"), Some(12));
        assert_eq!(payload.count("neg"), None);
    }

    #[test]
    fn test_submission_result_shape() {
        let ok = SubmissionResult::accepted("ok", "2026-01-01 10:00:00".to_string())
            .with_booking_id("DEMO-20260101-abcdef");
        assert_eq!(
            json!(ok),
            json!({
                "success": true,
                "message": "ok",
                "bookingId": "DEMO-20260101-abcdef",
                "timestamp": "2026-01-01 10:00:00"
            })
        );
        assert_eq!(
            json!(SubmissionResult::error("nope")),
            json!({"success": false, "message": "nope"})
        );
    }

    #[test]
    fn test_booking_record_is_flat() {
        let request = DemoBookingRequest {
            first_name: "Jean".to_string(),
            last_name: "Dupont".to_string(),
            email: "jean@example.com".to_string(),
            phone: "0612345678".to_string(),
            company: String::new(),
            preferred_date: "2030-01-02".to_string(),
            time_slot: TimeSlot::Morning,
            guests: 2,
            interests: vec![],
            message: String::new(),
            timestamp: "2026-01-01 10:00:00".to_string(),
            preferred_day: None,
            mail_address: "jean@example.com".to_string(),
        };
        let record = BookingRecord {
            request: &request,
            booking_id: "DEMO-20260101-abcdef",
            status: BookingStatus::Pending,
        };
        let value = json!(record);
        assert_eq!(value["firstName"], "Jean");
        assert_eq!(value["timeSlot"], "morning");
        assert_eq!(value["bookingId"], "DEMO-20260101-abcdef");
        assert_eq!(value["status"], "pending");
    }
}
