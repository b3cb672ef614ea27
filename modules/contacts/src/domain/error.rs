use thiserror::Error;

use crate::domain::validation::FieldError;

#[derive(Error, Debug)]
pub enum DomainError {
    #[error("Contact not found: {id}")]
    ContactNotFound { id: i64 },

    #[error("Contact with email '{email}' already exists")]
    EmailAlreadyExists { email: String },

    #[error("Validation failed: {}", summarize(.errors))]
    Validation { errors: Vec<FieldError> },

    #[error("Database error: {message}")]
    Database { message: String },
}

fn summarize(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(|e| format!("{}: {}", e.param, e.msg))
        .collect::<Vec<_>>()
        .join("; ")
}

impl DomainError {
    pub fn contact_not_found(id: i64) -> Self {
        Self::ContactNotFound { id }
    }

    pub fn email_already_exists(email: impl Into<String>) -> Self {
        Self::EmailAlreadyExists {
            email: email.into(),
        }
    }

    pub fn validation(errors: Vec<FieldError>) -> Self {
        Self::Validation { errors }
    }

    pub fn database(message: impl Into<String>) -> Self {
        Self::Database {
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_display_lists_every_field() {
        let e = DomainError::validation(vec![
            FieldError::new("name", "Name is required", None),
            FieldError::new("phone", "Phone must be a 10-digit number", Some("1".into())),
        ]);
        assert_eq!(
            e.to_string(),
            "Validation failed: name: Name is required; phone: Phone must be a 10-digit number"
        );
    }
}
