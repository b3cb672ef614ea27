use chrono::{DateTime, Utc};
use validator::Validate;

use crate::domain::validation::PHONE_RE;

/// A stored contact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Contact {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub address: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Data for creating a new contact. `id` and `created_at` are system-assigned.
#[derive(Debug, Clone, PartialEq, Eq, Validate)]
pub struct NewContact {
    #[validate(length(min = 1, message = "Name is required"))]
    pub name: String,
    #[validate(email(message = "Invalid email format"))]
    pub email: String,
    #[validate(regex(path = *PHONE_RE, message = "Phone must be a 10-digit number"))]
    pub phone: String,
    pub address: Option<String>,
}

/// Partial update: only `Some` fields are written, the rest keep their stored value.
#[derive(Debug, Clone, PartialEq, Eq, Default, Validate)]
pub struct ContactPatch {
    #[validate(length(min = 1, message = "Name cannot be empty"))]
    pub name: Option<String>,
    #[validate(email(message = "Invalid email format"))]
    pub email: Option<String>,
    #[validate(regex(path = *PHONE_RE, message = "Phone must be a 10-digit number"))]
    pub phone: Option<String>,
    pub address: Option<String>,
}

impl ContactPatch {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.email.is_none() && self.phone.is_none() && self.address.is_none()
    }

    /// Apply the present fields onto `contact`.
    pub fn apply_to(self, contact: &mut Contact) {
        if let Some(name) = self.name {
            contact.name = name;
        }
        if let Some(email) = self.email {
            contact.email = email;
        }
        if let Some(phone) = self.phone {
            contact.phone = phone;
        }
        if let Some(address) = self.address {
            contact.address = Some(address);
        }
    }
}
