// === PUBLIC CONTRACT ===
pub mod contract;

pub use contract::model;

// === LAYERS ===
// Exposed for wiring in the server binary and for tests.
pub mod api;
pub mod domain;
pub mod infra;

pub use domain::service::{Service, ServiceConfig};
