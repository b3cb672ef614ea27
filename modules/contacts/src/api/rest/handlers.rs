use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Path, Query},
    http::StatusCode,
    response::Json,
    Extension,
};
use tracing::{debug, info, warn};
use validator::Validate;

use crate::api::rest::dto::{
    ContactDto, CreateContactReq, ErrorBody, ListContactsQuery, MessageResponse,
    UpdateContactReq, ValidationErrorBody,
};
use crate::api::rest::error::ApiError;
use crate::domain::service::Service;
use crate::domain::validation;

pub const CONTACT_ADDED: &str = "Contact successfully added";
pub const CONTACT_UPDATED: &str = "Contact updated successfully";
pub const CONTACT_DELETED: &str = "Contact deleted successfully";

/// Field rules plus the configured name length, reported together.
fn body_errors<T: Validate>(
    svc: &Service,
    req: &T,
    name: Option<&str>,
) -> Vec<validation::FieldError> {
    let mut errors = validation::check(req).err().unwrap_or_default();
    errors.extend(svc.check_name_length(name));
    validation::sort_by_field(&mut errors);
    errors
}

/// Ids that are not integers cannot match any row.
fn parse_id(raw: &str) -> Result<i64, ApiError> {
    raw.trim().parse::<i64>().map_err(|_| {
        debug!(id = raw, "Non-numeric contact id");
        ApiError::NotFound
    })
}

/// List contacts, optionally filtered by name or email
#[utoipa::path(
    get,
    path = "/contacts",
    tag = "contacts",
    operation_id = "contacts.list_contacts",
    params(ListContactsQuery),
    responses(
        (status = 200, description = "Matching contacts", body = [ContactDto]),
        (status = 500, description = "Internal Server Error", body = ErrorBody)
    )
)]
pub async fn list_contacts(
    Extension(svc): Extension<Arc<Service>>,
    Query(query): Query<ListContactsQuery>,
) -> Result<Json<Vec<ContactDto>>, ApiError> {
    info!("Listing contacts with search: {:?}", query.search_q);

    let contacts = svc.list_contacts(&query.search_q).await?;
    Ok(Json(contacts.into_iter().map(ContactDto::from).collect()))
}

/// Get a contact by id
#[utoipa::path(
    get,
    path = "/contacts/{id}",
    tag = "contacts",
    operation_id = "contacts.get_contact",
    params(("id" = i64, Path, description = "Contact id")),
    responses(
        (status = 200, description = "Contact found", body = ContactDto),
        (status = 404, description = "Contact not found", body = ErrorBody),
        (status = 500, description = "Internal Server Error", body = ErrorBody)
    )
)]
pub async fn get_contact(
    Extension(svc): Extension<Arc<Service>>,
    Path(id): Path<String>,
) -> Result<Json<ContactDto>, ApiError> {
    info!("Getting contact with id: {}", id);

    let id = parse_id(&id)?;
    let contact = svc.get_contact(id).await?;
    Ok(Json(ContactDto::from(contact)))
}

/// Create a contact
#[utoipa::path(
    post,
    path = "/contacts",
    tag = "contacts",
    operation_id = "contacts.create_contact",
    request_body = CreateContactReq,
    responses(
        (status = 201, description = "Contact created", body = MessageResponse),
        (status = 400, description = "Invalid input or duplicate email", body = ValidationErrorBody),
        (status = 500, description = "Internal Server Error", body = ErrorBody)
    )
)]
pub async fn create_contact(
    Extension(svc): Extension<Arc<Service>>,
    body: Result<Json<CreateContactReq>, JsonRejection>,
) -> Result<(StatusCode, Json<MessageResponse>), ApiError> {
    let Json(req) = body?;
    info!("Creating contact");

    let errors = body_errors(&svc, &req, req.name());
    if !errors.is_empty() {
        warn!(count = errors.len(), "Rejected contact creation");
        return Err(ApiError::Validation(errors));
    }

    let contact = svc.create_contact(req.into()).await?;
    Ok((
        StatusCode::CREATED,
        Json(MessageResponse::new(CONTACT_ADDED).with_id(contact.id)),
    ))
}

/// Update the fields present in the body
#[utoipa::path(
    put,
    path = "/contacts/{id}",
    tag = "contacts",
    operation_id = "contacts.update_contact",
    params(("id" = i64, Path, description = "Contact id")),
    request_body = UpdateContactReq,
    responses(
        (status = 200, description = "Contact updated", body = MessageResponse),
        (status = 400, description = "Invalid input or duplicate email", body = ValidationErrorBody),
        (status = 404, description = "Contact not found", body = ErrorBody),
        (status = 500, description = "Internal Server Error", body = ErrorBody)
    )
)]
pub async fn update_contact(
    Extension(svc): Extension<Arc<Service>>,
    Path(id): Path<String>,
    body: Result<Json<UpdateContactReq>, JsonRejection>,
) -> Result<Json<MessageResponse>, ApiError> {
    let Json(req) = body?;
    info!("Updating contact {}", id);

    let errors = body_errors(&svc, &req, req.name());
    if !errors.is_empty() {
        warn!(count = errors.len(), "Rejected contact update");
        return Err(ApiError::Validation(errors));
    }

    let id = parse_id(&id)?;
    svc.update_contact(id, req.into()).await?;
    Ok(Json(MessageResponse::new(CONTACT_UPDATED)))
}

/// Delete a contact
#[utoipa::path(
    delete,
    path = "/contacts/{id}",
    tag = "contacts",
    operation_id = "contacts.delete_contact",
    params(("id" = i64, Path, description = "Contact id")),
    responses(
        (status = 200, description = "Contact deleted", body = MessageResponse),
        (status = 404, description = "Contact not found", body = ErrorBody),
        (status = 500, description = "Internal Server Error", body = ErrorBody)
    )
)]
pub async fn delete_contact(
    Extension(svc): Extension<Arc<Service>>,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    info!("Deleting contact {}", id);

    let id = parse_id(&id)?;
    svc.delete_contact(id).await?;
    Ok(Json(MessageResponse::new(CONTACT_DELETED)))
}
