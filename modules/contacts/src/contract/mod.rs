pub mod model;

pub use model::{Contact, ContactPatch, NewContact};
