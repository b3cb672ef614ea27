use axum::{routing::get, Extension, Router};
use std::sync::Arc;

use crate::api::rest::handlers;
use crate::domain::service::Service;

/// Mount the contact endpoints on `router`, sharing `service` with every handler.
pub fn register_routes(router: Router, service: Arc<Service>) -> Router {
    let contacts = Router::new()
        .route(
            "/contacts",
            get(handlers::list_contacts).post(handlers::create_contact),
        )
        .route(
            "/contacts/{id}",
            get(handlers::get_contact)
                .put(handlers::update_contact)
                .delete(handlers::delete_contact),
        )
        .layer(Extension(service));

    router.merge(contacts)
}
