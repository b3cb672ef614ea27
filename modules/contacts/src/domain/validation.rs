//! Field rules shared by the contract models and the REST DTOs.
//!
//! The rules themselves are declared with `#[validate(...)]` attributes on the
//! input types; this module holds the pieces those attributes reference and
//! flattens `validator` output into an ordered list of field errors.

use once_cell::sync::Lazy;
use regex::Regex;
use validator::{Validate, ValidationErrors};

/// Exactly ten ASCII digits. `\d` would also accept non-ASCII digits.
pub static PHONE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[0-9]{10}$").expect("phone pattern is valid"));

pub const NAME_REQUIRED: &str = "Name is required";
pub const NAME_EMPTY: &str = "Name cannot be empty";
pub const NAME_NOT_STRING: &str = "Name must be a string";
pub const EMAIL_INVALID: &str = "Invalid email format";
pub const PHONE_INVALID: &str = "Phone must be a 10-digit number";
pub const ADDRESS_INVALID: &str = "Address must be a string";

/// Order in which errors are reported; unknown fields go last, alphabetically.
const FIELD_ORDER: [&str; 4] = ["name", "email", "phone", "address"];

/// A single violated rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub param: String,
    pub msg: String,
    /// Offending input, when there was one.
    pub value: Option<String>,
}

impl FieldError {
    pub fn new(param: impl Into<String>, msg: impl Into<String>, value: Option<String>) -> Self {
        Self {
            param: param.into(),
            msg: msg.into(),
            value,
        }
    }
}

/// Run the declared rules and collect every violation.
pub fn check<T: Validate>(input: &T) -> Result<(), Vec<FieldError>> {
    input.validate().map_err(|e| field_errors(&e))
}

pub fn field_errors(errors: &ValidationErrors) -> Vec<FieldError> {
    let mut out: Vec<FieldError> = Vec::new();
    for (field, list) in errors.field_errors() {
        let param = field.to_string();
        for e in list.iter() {
            let msg = e
                .message
                .as_ref()
                .map(|m| m.to_string())
                .unwrap_or_else(|| e.code.to_string());
            let value = e.params.get("value").and_then(render_value);
            out.push(FieldError::new(param.clone(), msg, value));
        }
    }
    sort_by_field(&mut out);
    out
}

/// Put errors in reporting order. Stable, so rule order within a field is kept.
pub fn sort_by_field(errors: &mut [FieldError]) {
    errors.sort_by(|a, b| rank(&a.param).cmp(&rank(&b.param)).then(a.param.cmp(&b.param)));
}

fn rank(param: &str) -> usize {
    FIELD_ORDER
        .iter()
        .position(|f| *f == param)
        .unwrap_or(FIELD_ORDER.len())
}

fn render_value(v: &serde_json::Value) -> Option<String> {
    match v {
        serde_json::Value::Null => None,
        serde_json::Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}
