use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::{IntoParams, ToSchema};
use validator::{Validate, ValidateEmail, ValidationError};

use crate::contract::model::{Contact, ContactPatch, NewContact};
use crate::domain::validation::{
    FieldError, ADDRESS_INVALID, EMAIL_INVALID, NAME_EMPTY, NAME_NOT_STRING, NAME_REQUIRED,
    PHONE_INVALID, PHONE_RE,
};

/// Contact as returned over the wire.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ContactDto {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub address: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Body of `POST /contacts`.
///
/// Fields are kept as raw JSON so a missing or mistyped one is reported as a
/// field error instead of failing deserialization.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema, Validate)]
pub struct CreateContactReq {
    #[validate(
        required(message = "Name is required"),
        custom(function = "name_for_create")
    )]
    #[schema(value_type = Option<String>)]
    pub name: Option<Value>,
    #[validate(
        required(message = "Invalid email format"),
        custom(function = "email_format")
    )]
    #[schema(value_type = Option<String>)]
    pub email: Option<Value>,
    #[validate(
        required(message = "Phone must be a 10-digit number"),
        custom(function = "phone_format")
    )]
    #[schema(value_type = Option<String>)]
    pub phone: Option<Value>,
    #[validate(custom(function = "address_is_string"))]
    #[schema(value_type = Option<String>)]
    pub address: Option<Value>,
}

impl CreateContactReq {
    pub fn name(&self) -> Option<&str> {
        self.name.as_ref().and_then(Value::as_str)
    }
}

/// Body of `PUT /contacts/{id}`. Absent fields are left untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema, Validate)]
pub struct UpdateContactReq {
    #[validate(custom(function = "name_for_update"))]
    #[schema(value_type = Option<String>)]
    pub name: Option<Value>,
    #[validate(custom(function = "email_format"))]
    #[schema(value_type = Option<String>)]
    pub email: Option<Value>,
    #[validate(custom(function = "phone_format"))]
    #[schema(value_type = Option<String>)]
    pub phone: Option<Value>,
    #[validate(custom(function = "address_is_string"))]
    #[schema(value_type = Option<String>)]
    pub address: Option<Value>,
}

impl UpdateContactReq {
    pub fn name(&self) -> Option<&str> {
        self.name.as_ref().and_then(Value::as_str)
    }
}

#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListContactsQuery {
    /// Substring matched against name and email; empty matches everything.
    #[serde(default)]
    pub search_q: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            id: None,
        }
    }

    pub fn with_id(mut self, id: i64) -> Self {
        self.id = Some(id);
        self
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ErrorBody {
    pub error: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct FieldErrorDto {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    pub msg: String,
    pub param: String,
    pub location: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ValidationErrorBody {
    pub errors: Vec<FieldErrorDto>,
}

fn violation(code: &'static str, message: &'static str, value: &Value) -> ValidationError {
    let mut err = ValidationError::new(code);
    err.message = Some(message.into());
    err.add_param("value".into(), value);
    err
}

fn name_for_create(value: &Value) -> Result<(), ValidationError> {
    match value.as_str() {
        None => Err(violation("string", NAME_NOT_STRING, value)),
        Some("") => Err(violation("length", NAME_REQUIRED, value)),
        Some(_) => Ok(()),
    }
}

fn name_for_update(value: &Value) -> Result<(), ValidationError> {
    match value.as_str() {
        None => Err(violation("string", NAME_NOT_STRING, value)),
        Some("") => Err(violation("length", NAME_EMPTY, value)),
        Some(_) => Ok(()),
    }
}

fn email_format(value: &Value) -> Result<(), ValidationError> {
    match value.as_str() {
        Some(s) if s.validate_email() => Ok(()),
        _ => Err(violation("email", EMAIL_INVALID, value)),
    }
}

fn phone_format(value: &Value) -> Result<(), ValidationError> {
    match value.as_str() {
        Some(s) if PHONE_RE.is_match(s) => Ok(()),
        _ => Err(violation("regex", PHONE_INVALID, value)),
    }
}

fn address_is_string(value: &Value) -> Result<(), ValidationError> {
    if value.is_string() {
        return Ok(());
    }
    Err(violation("string", ADDRESS_INVALID, value))
}

/// String content of a JSON field; anything else counts as absent.
fn text(value: Option<Value>) -> Option<String> {
    match value {
        Some(Value::String(s)) => Some(s),
        _ => None,
    }
}

// Conversions between REST DTOs and contract models

impl From<Contact> for ContactDto {
    fn from(c: Contact) -> Self {
        Self {
            id: c.id,
            name: c.name,
            email: c.email,
            phone: c.phone,
            address: c.address,
            created_at: c.created_at,
        }
    }
}

/// Presence and types are checked by `Validate`; anything that slipped past
/// maps to an empty string, which the domain rules reject again.
impl From<CreateContactReq> for NewContact {
    fn from(req: CreateContactReq) -> Self {
        Self {
            name: text(req.name).unwrap_or_default(),
            email: text(req.email).unwrap_or_default(),
            phone: text(req.phone).unwrap_or_default(),
            address: text(req.address),
        }
    }
}

impl From<UpdateContactReq> for ContactPatch {
    fn from(req: UpdateContactReq) -> Self {
        Self {
            name: text(req.name),
            email: text(req.email),
            phone: text(req.phone),
            address: text(req.address),
        }
    }
}

impl From<FieldError> for FieldErrorDto {
    fn from(e: FieldError) -> Self {
        Self {
            value: e.value,
            msg: e.msg,
            param: e.param,
            location: "body".to_string(),
        }
    }
}
