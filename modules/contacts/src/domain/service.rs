use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info, instrument, warn};

use crate::contract::model::{Contact, ContactPatch, NewContact};
use crate::domain::error::DomainError;
use crate::domain::repo::{ContactsRepository, RepoError};
use crate::domain::validation::{self, FieldError};

/// Domain service with the contact rules.
/// Depends only on the repository port, not on infra types.
#[derive(Clone)]
pub struct Service {
    repo: Arc<dyn ContactsRepository>,
    config: ServiceConfig,
}

#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub max_name_length: usize,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            max_name_length: 255,
        }
    }
}

impl Service {
    pub fn new(repo: Arc<dyn ContactsRepository>, config: ServiceConfig) -> Self {
        Self { repo, config }
    }

    #[instrument(name = "contacts.service.list_contacts", skip(self), fields(search = %search))]
    pub async fn list_contacts(&self, search: &str) -> Result<Vec<Contact>, DomainError> {
        debug!("Listing contacts");
        let contacts = self.repo.list(search).await.map_err(storage_error)?;
        debug!("Found {} contacts", contacts.len());
        Ok(contacts)
    }

    #[instrument(name = "contacts.service.get_contact", skip(self), fields(contact_id = id))]
    pub async fn get_contact(&self, id: i64) -> Result<Contact, DomainError> {
        debug!("Getting contact by id");
        self.repo
            .find_by_id(id)
            .await
            .map_err(storage_error)?
            .ok_or_else(|| DomainError::contact_not_found(id))
    }

    #[instrument(
        name = "contacts.service.create_contact",
        skip(self, new_contact),
        fields(email = %new_contact.email)
    )]
    pub async fn create_contact(&self, new_contact: NewContact) -> Result<Contact, DomainError> {
        info!("Creating new contact");

        let mut errors = validation::check(&new_contact).err().unwrap_or_default();
        errors.extend(self.check_name_length(Some(&new_contact.name)));
        if !errors.is_empty() {
            return Err(DomainError::validation(errors));
        }

        let created_at = Utc::now();
        let id = self
            .repo
            .insert(&new_contact, created_at)
            .await
            .map_err(|e| conflict_or_storage(e, &new_contact.email))?;

        info!("Successfully created contact with id={}", id);
        Ok(Contact {
            id,
            name: new_contact.name,
            email: new_contact.email,
            phone: new_contact.phone,
            address: new_contact.address,
            created_at,
        })
    }

    #[instrument(name = "contacts.service.update_contact", skip(self, patch), fields(contact_id = id))]
    pub async fn update_contact(
        &self,
        id: i64,
        patch: ContactPatch,
    ) -> Result<Contact, DomainError> {
        info!("Updating contact");

        let mut errors = validation::check(&patch).err().unwrap_or_default();
        errors.extend(self.check_name_length(patch.name.as_deref()));
        if !errors.is_empty() {
            return Err(DomainError::validation(errors));
        }

        let mut current = self.get_contact(id).await?;

        if patch.is_empty() {
            debug!("Empty patch, nothing to write");
            return Ok(current);
        }

        let email = patch.email.clone().unwrap_or_else(|| current.email.clone());
        let updated = self
            .repo
            .update(id, &patch)
            .await
            .map_err(|e| conflict_or_storage(e, &email))?;
        if !updated {
            // Removed between the lookup and the write
            return Err(DomainError::contact_not_found(id));
        }

        patch.apply_to(&mut current);
        info!("Successfully updated contact");
        Ok(current)
    }

    #[instrument(name = "contacts.service.delete_contact", skip(self), fields(contact_id = id))]
    pub async fn delete_contact(&self, id: i64) -> Result<(), DomainError> {
        info!("Deleting contact");

        let deleted = self.repo.delete(id).await.map_err(storage_error)?;
        if !deleted {
            return Err(DomainError::contact_not_found(id));
        }

        info!("Successfully deleted contact");
        Ok(())
    }

    /// Length guard for `name`, configured by `max_name_length`.
    pub fn check_name_length(&self, name: Option<&str>) -> Option<FieldError> {
        let name = name?;
        let len = name.chars().count();
        (len > self.config.max_name_length).then(|| {
            FieldError::new(
                "name",
                format!(
                    "Name must be at most {} characters",
                    self.config.max_name_length
                ),
                Some(name.to_string()),
            )
        })
    }
}

fn storage_error(e: RepoError) -> DomainError {
    DomainError::database(e.to_string())
}

fn conflict_or_storage(e: RepoError, email: &str) -> DomainError {
    match e {
        RepoError::UniqueViolation(detail) => {
            warn!(%detail, "Unique constraint rejected write");
            DomainError::email_already_exists(email)
        }
        other => storage_error(other),
    }
}
