use crate::contract::model::Contact;
use crate::infra::storage::entity::Model as ContactEntity;

impl From<ContactEntity> for Contact {
    fn from(entity: ContactEntity) -> Self {
        Self {
            id: entity.id,
            name: entity.name,
            email: entity.email,
            phone: entity.phone,
            address: entity.address,
            created_at: entity.created_at,
        }
    }
}
