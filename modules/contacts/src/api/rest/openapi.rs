use utoipa::OpenApi;

use crate::api::rest::{dto, handlers};

#[derive(OpenApi)]
#[openapi(
    info(title = "Contacts API", description = "CRUD over the contact list"),
    paths(
        handlers::list_contacts,
        handlers::get_contact,
        handlers::create_contact,
        handlers::update_contact,
        handlers::delete_contact,
    ),
    components(schemas(
        dto::ContactDto,
        dto::CreateContactReq,
        dto::UpdateContactReq,
        dto::MessageResponse,
        dto::ErrorBody,
        dto::FieldErrorDto,
        dto::ValidationErrorBody,
    )),
    tags((name = "contacts", description = "Contact management"))
)]
pub struct ContactsApiDoc;
