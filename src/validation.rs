use once_cell::sync::Lazy;
use regex::Regex;
use strum::{AsRefStr, Display, EnumString};

static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid email pattern"));
static PHONE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[0-9]{10,11}$").expect("valid phone pattern"));

pub const REQUIRED_MESSAGE: &str = "This field is required.";
pub const EMAIL_MESSAGE: &str = "Please enter a valid email address.";
pub const PHONE_MESSAGE: &str = "Please enter a valid phone number.";

#[derive(AsRefStr, EnumString, Debug, Display, PartialEq, Eq, Copy, Clone)]
#[strum(serialize_all = "lowercase")]
pub enum FieldKind {
    Text,
    Email,
    Tel,
    Select,
    Textarea,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormField {
    pub name: String,
    pub kind: FieldKind,
    pub required: bool,
    pub value: String,
}

impl FormField {
    pub fn new(name: &str, kind: FieldKind, required: bool, value: &str) -> Self {
        Self {
            name: name.to_string(),
            kind,
            required,
            value: value.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: String,
    pub message: &'static str,
}

/// Checks one field. Optional fields are never checked. A blank required
/// field reports only that it is required.
pub fn validate_field(field: &FormField) -> Option<FieldError> {
    let error = |message| {
        Some(FieldError {
            field: field.name.clone(),
            message,
        })
    };

    if !field.required {
        return None;
    }
    if field.value.trim().is_empty() {
        return error(REQUIRED_MESSAGE);
    }

    match field.kind {
        FieldKind::Email if !EMAIL_RE.is_match(&field.value) => error(EMAIL_MESSAGE),
        FieldKind::Tel => {
            let digits: String = field.value.chars().filter(|c| !c.is_whitespace()).collect();
            if PHONE_RE.is_match(&digits) {
                None
            } else {
                error(PHONE_MESSAGE)
            }
        }
        _ => None,
    }
}

/// All field errors of a form, in field order. Empty means the form is valid.
pub fn validate_form(fields: &[FormField]) -> Vec<FieldError> {
    fields.iter().filter_map(validate_field).collect()
}
