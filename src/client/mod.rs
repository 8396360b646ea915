//! Client-side form controller
//!
//! Mirrors what the browser does with the contact and demo forms: inline
//! validation on blur, error clearing on input, whole-form validation before
//! submit, and a busy submit control while the transport is in flight. The
//! page itself is abstracted behind [`FormView`].

pub mod transport;

use crate::models::{FormKind, SubmissionResult};
use chrono::{SecondsFormat, Utc};
use regex::Regex;
use serde_json::{Map, Value};
use transport::{DynSubmissionTransport, TransportError};

pub const MSG_REQUIRED: &str = "Ce champ est obligatoire.";
pub const MSG_INVALID_EMAIL: &str = "Veuillez entrer une adresse email valide.";
pub const MSG_INVALID_PHONE: &str = "Veuillez entrer un numéro de téléphone valide.";
pub const MSG_MESSAGE_TOO_SHORT: &str = "Le message doit contenir au moins 10 caractères.";
pub const MSG_FIX_ERRORS: &str = "Veuillez corriger les erreurs dans le formulaire.";
pub const MSG_SENDING: &str = "Envoi en cours...";
pub const MSG_SEND_FAILED: &str =
    "Une erreur est survenue lors de l'envoi. Veuillez réessayer ou nous contacter directement.";
pub const MSG_CONTACT_SENT: &str =
    "Merci ! Votre message a été envoyé avec succès. Nous vous répondrons dans les plus brefs délais.";
pub const MSG_DEMO_SENT: &str = "Merci ! Votre demande de démonstration a été envoyée avec succès.";

const MIN_MESSAGE_CHARS: usize = 10;

// =============================================================================
// Form model
// =============================================================================

/// Current input of a form control
#[derive(Debug, Clone, PartialEq)]
pub enum FieldInput {
    Text(String),
    Checkbox(bool),
    Choices(Vec<String>),
}

#[derive(Debug, Clone)]
pub struct FormField {
    pub name: &'static str,
    pub required: bool,
    pub input: FieldInput,
    pub error: Option<&'static str>,
}

impl FormField {
    fn text(name: &'static str, required: bool) -> Self {
        Self {
            name,
            required,
            input: FieldInput::Text(String::new()),
            error: None,
        }
    }

    fn checkbox(name: &'static str) -> Self {
        Self {
            name,
            required: false,
            input: FieldInput::Checkbox(false),
            error: None,
        }
    }

    fn choices(name: &'static str) -> Self {
        Self {
            name,
            required: false,
            input: FieldInput::Choices(Vec::new()),
            error: None,
        }
    }

    fn clear(&mut self) {
        self.input = match self.input {
            FieldInput::Text(_) => FieldInput::Text(String::new()),
            FieldInput::Checkbox(_) => FieldInput::Checkbox(false),
            FieldInput::Choices(_) => FieldInput::Choices(Vec::new()),
        };
        self.error = None;
    }
}

/// Field layout and values of one form
#[derive(Debug, Clone)]
pub struct Form {
    pub kind: FormKind,
    pub fields: Vec<FormField>,
}

impl Form {
    pub fn contact() -> Self {
        Self {
            kind: FormKind::Contact,
            fields: vec![
                FormField::text("firstName", true),
                FormField::text("lastName", true),
                FormField::text("email", true),
                FormField::text("phone", false),
                FormField::text("subject", true),
                FormField::text("message", true),
                FormField::checkbox("newsletter"),
            ],
        }
    }

    pub fn demo() -> Self {
        Self {
            kind: FormKind::Demo,
            fields: vec![
                FormField::text("firstName", true),
                FormField::text("lastName", true),
                FormField::text("email", true),
                FormField::text("phone", true),
                FormField::text("company", false),
                FormField::text("preferredDate", true),
                FormField::text("timeSlot", true),
                FormField::text("guests", true),
                FormField::choices("interests"),
                FormField::text("message", false),
            ],
        }
    }

    pub fn field(&self, name: &str) -> Option<&FormField> {
        self.fields.iter().find(|f| f.name == name)
    }

    fn field_mut(&mut self, name: &str) -> Option<&mut FormField> {
        self.fields.iter_mut().find(|f| f.name == name)
    }

    /// Serialize the form into the JSON record sent to the server
    pub fn to_record(&self) -> Value {
        let mut record = Map::new();
        for field in &self.fields {
            let value = match field.input {
                FieldInput::Text(ref text) => Value::String(text.clone()),
                FieldInput::Checkbox(checked) => Value::Bool(checked),
                FieldInput::Choices(ref items) => {
                    Value::Array(items.iter().cloned().map(Value::String).collect())
                }
            };
            record.insert(field.name.to_string(), value);
        }
        record.insert(
            "timestamp".to_string(),
            Value::String(Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)),
        );
        Value::Object(record)
    }

    fn reset(&mut self) {
        self.fields.iter_mut().for_each(FormField::clear);
    }
}

// =============================================================================
// Field rules
// =============================================================================

/// Client-side field checks
#[derive(Debug, Clone)]
pub struct FieldRules {
    email: Regex,
    phone: Regex,
}

impl FieldRules {
    pub fn new() -> Result<Self, regex::Error> {
        Ok(Self {
            email: Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$")?,
            phone: Regex::new(r"^\+?\d{1,16}$")?,
        })
    }

    /// First rule the field breaks, if any
    pub fn check(&self, field: &FormField) -> Option<&'static str> {
        let value = match field.input {
            FieldInput::Text(ref text) => text.trim(),
            FieldInput::Checkbox(checked) => {
                return (field.required && !checked).then_some(MSG_REQUIRED);
            }
            FieldInput::Choices(ref items) => {
                return (field.required && items.is_empty()).then_some(MSG_REQUIRED);
            }
        };

        if value.is_empty() {
            return field.required.then_some(MSG_REQUIRED);
        }

        match field.name {
            "email" if !self.email.is_match(value) => Some(MSG_INVALID_EMAIL),
            "phone" => {
                let compact: String = value.chars().filter(|c| !c.is_whitespace()).collect();
                (!self.phone.is_match(&compact)).then_some(MSG_INVALID_PHONE)
            }
            "message" if value.chars().count() < MIN_MESSAGE_CHARS => Some(MSG_MESSAGE_TOO_SHORT),
            _ => None,
        }
    }
}

/// Normalize a phone number as it is typed: digits only, French numbers
/// rewritten to `+33` form.
pub fn format_phone_input(value: &str) -> String {
    let digits: String = value.chars().filter(char::is_ascii_digit).collect();
    if digits.starts_with("33") {
        format!("+{}", digits)
    } else if let Some(rest) = digits.strip_prefix('0') {
        format!("+33{}", rest)
    } else {
        digits
    }
}

// =============================================================================
// View and controller
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BannerKind {
    Success,
    Error,
}

/// Page-side effects of the controller
pub trait FormView {
    /// Attach an inline error right after the field
    fn show_field_error(&mut self, field: &str, message: &str);
    fn clear_field_error(&mut self, field: &str);
    /// Disable the submit control and swap in the busy label
    fn disable_submit(&mut self, busy_label: &str);
    /// Re-enable the submit control with its original label
    fn restore_submit(&mut self);
    fn show_banner(&mut self, kind: BannerKind, message: &str);
    fn reset_form(&mut self);
}

#[derive(Debug)]
pub enum SubmitOutcome {
    /// Client validation failed; nothing was sent
    Invalid,
    Accepted(SubmissionResult),
    Failed(TransportError),
}

/// Drives one form. `submit` takes `&mut self`, so a second submission
/// cannot start while one is in flight.
pub struct FormController<V: FormView> {
    form: Form,
    rules: FieldRules,
    view: V,
    transport: DynSubmissionTransport,
}

impl<V: FormView> FormController<V> {
    pub fn new(form: Form, rules: FieldRules, view: V, transport: DynSubmissionTransport) -> Self {
        Self {
            form,
            rules,
            view,
            transport,
        }
    }

    pub fn form(&self) -> &Form {
        &self.form
    }

    pub fn view(&self) -> &V {
        &self.view
    }

    /// Text typed into a field. Clears the field's error without re-validating.
    /// Ignored for checkbox and choice fields.
    pub fn on_input(&mut self, name: &str, value: &str) {
        let Some(field) = self.form.field_mut(name) else {
            return;
        };
        let FieldInput::Text(current) = &mut field.input else {
            tracing::debug!(field = name, "Ignoring text input on non-text field");
            return;
        };
        *current = if name == "phone" {
            format_phone_input(value)
        } else {
            value.to_string()
        };
        if field.error.take().is_some() {
            self.view.clear_field_error(name);
        }
    }

    pub fn on_toggle(&mut self, name: &str, checked: bool) {
        let Some(field) = self.form.field_mut(name) else {
            return;
        };
        let FieldInput::Checkbox(current) = &mut field.input else {
            tracing::debug!(field = name, "Ignoring toggle on non-checkbox field");
            return;
        };
        *current = checked;
        if field.error.take().is_some() {
            self.view.clear_field_error(name);
        }
    }

    pub fn on_choices(&mut self, name: &str, choices: Vec<String>) {
        let Some(field) = self.form.field_mut(name) else {
            return;
        };
        let FieldInput::Choices(current) = &mut field.input else {
            tracing::debug!(field = name, "Ignoring choices on non-choice field");
            return;
        };
        *current = choices;
        if field.error.take().is_some() {
            self.view.clear_field_error(name);
        }
    }

    /// Validate a single field, as on blur
    pub fn on_blur(&mut self, name: &str) -> bool {
        self.validate_field(name)
    }

    /// Validate every field; all of them get their inline state updated.
    pub fn validate_form(&mut self) -> bool {
        let names: Vec<&'static str> = self.form.fields.iter().map(|f| f.name).collect();
        names
            .into_iter()
            .fold(true, |valid, name| self.validate_field(name) && valid)
    }

    fn validate_field(&mut self, name: &str) -> bool {
        let Some(field) = self.form.field_mut(name) else {
            return true;
        };
        if field.error.take().is_some() {
            self.view.clear_field_error(name);
        }

        match self.rules.check(field) {
            Some(message) => {
                field.error = Some(message);
                self.view.show_field_error(name, message);
                false
            }
            None => true,
        }
    }

    /// Validate and send the form.
    ///
    /// The submit control is disabled before the transport is called and
    /// restored exactly once, after its outcome is known.
    pub async fn submit(&mut self) -> SubmitOutcome {
        if !self.validate_form() {
            self.view.show_banner(BannerKind::Error, MSG_FIX_ERRORS);
            return SubmitOutcome::Invalid;
        }

        let record = self.form.to_record();
        self.view.disable_submit(MSG_SENDING);

        let outcome = self.transport.submit(self.form.kind, &record).await;

        match outcome {
            Ok(receipt) => {
                self.view
                    .show_banner(BannerKind::Success, &success_message(self.form.kind, &receipt.result));
                self.form.reset();
                self.view.reset_form();
                self.view.restore_submit();
                SubmitOutcome::Accepted(receipt.result)
            }
            Err(e) => {
                tracing::error!(form = self.form.kind.path(), "Form submission failed: {}", e);
                self.view.show_banner(BannerKind::Error, MSG_SEND_FAILED);
                self.view.restore_submit();
                SubmitOutcome::Failed(e)
            }
        }
    }
}

fn success_message(kind: FormKind, result: &SubmissionResult) -> String {
    match (kind, result.booking_id.as_deref()) {
        (FormKind::Demo, Some(id)) => format!("{} Référence : {}", MSG_DEMO_SENT, id),
        (FormKind::Demo, None) => MSG_DEMO_SENT.to_string(),
        _ => MSG_CONTACT_SENT.to_string(),
    }
}
