//! SeaORM-backed implementation of the contacts repository port.
//!
//! Generic over `C: ConnectionTrait`, so it works with a `DatabaseConnection`
//! or with a transaction.

use anyhow::Context;
use chrono::{DateTime, Utc};
use sea_orm::{
    sea_query::LikeExpr,
    ActiveValue::{NotSet, Set},
    ColumnTrait, Condition, ConnectionTrait, DbErr, EntityTrait, QueryFilter, QueryOrder, SqlErr,
};

use crate::contract::model::{Contact, ContactPatch, NewContact};
use crate::domain::repo::{ContactsRepository, RepoError, RepoResult};
use crate::infra::storage::entity::{ActiveModel as ContactAM, Column, Entity as ContactEntity};

pub struct SeaOrmContactsRepository<C>
where
    C: ConnectionTrait + Send + Sync,
{
    conn: C,
}

impl<C> SeaOrmContactsRepository<C>
where
    C: ConnectionTrait + Send + Sync,
{
    pub fn new(conn: C) -> Self {
        Self { conn }
    }
}

/// Split unique-constraint failures from everything else.
fn write_error(err: DbErr, what: &'static str) -> RepoError {
    if let Some(SqlErr::UniqueConstraintViolation(detail)) = err.sql_err() {
        return RepoError::UniqueViolation(detail);
    }
    RepoError::Other(anyhow::Error::new(err).context(what))
}

/// `%term%` with `\\`, `%` and `_` escaped, so the term matches literally.
fn contains_pattern(search: &str) -> LikeExpr {
    let mut pattern = String::with_capacity(search.len() + 2);
    pattern.push('%');
    for c in search.chars() {
        if matches!(c, '\\' | '%' | '_') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    LikeExpr::new(pattern).escape('\\')
}

#[async_trait::async_trait]
impl<C> ContactsRepository for SeaOrmContactsRepository<C>
where
    C: ConnectionTrait + Send + Sync + 'static,
{
    async fn list(&self, search: &str) -> RepoResult<Vec<Contact>> {
        let mut query = ContactEntity::find();
        if !search.is_empty() {
            query = query.filter(
                Condition::any()
                    .add(Column::Name.like(contains_pattern(search)))
                    .add(Column::Email.like(contains_pattern(search))),
            );
        }
        let rows = query
            .order_by_asc(Column::Id)
            .all(&self.conn)
            .await
            .context("list failed")?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn find_by_id(&self, id: i64) -> RepoResult<Option<Contact>> {
        let found = ContactEntity::find_by_id(id)
            .one(&self.conn)
            .await
            .context("find_by_id failed")?;
        Ok(found.map(Into::into))
    }

    async fn insert(&self, new: &NewContact, created_at: DateTime<Utc>) -> RepoResult<i64> {
        let m = ContactAM {
            id: NotSet,
            name: Set(new.name.clone()),
            email: Set(new.email.clone()),
            phone: Set(new.phone.clone()),
            address: Set(new.address.clone()),
            created_at: Set(created_at),
        };
        let res = ContactEntity::insert(m)
            .exec(&self.conn)
            .await
            .map_err(|e| write_error(e, "insert failed"))?;
        Ok(res.last_insert_id)
    }

    async fn update(&self, id: i64, patch: &ContactPatch) -> RepoResult<bool> {
        if patch.is_empty() {
            let exists = ContactEntity::find_by_id(id)
                .one(&self.conn)
                .await
                .context("update lookup failed")?;
            return Ok(exists.is_some());
        }

        let m = ContactAM {
            id: NotSet,
            name: patch.name.clone().map_or(NotSet, Set),
            email: patch.email.clone().map_or(NotSet, Set),
            phone: patch.phone.clone().map_or(NotSet, Set),
            address: patch.address.clone().map_or(NotSet, |a| Set(Some(a))),
            created_at: NotSet,
        };
        let res = ContactEntity::update_many()
            .set(m)
            .filter(Column::Id.eq(id))
            .exec(&self.conn)
            .await
            .map_err(|e| write_error(e, "update failed"))?;
        Ok(res.rows_affected > 0)
    }

    async fn delete(&self, id: i64) -> RepoResult<bool> {
        let res = ContactEntity::delete_by_id(id)
            .exec(&self.conn)
            .await
            .context("delete failed")?;
        Ok(res.rows_affected > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra::storage::migrations::Migrator;
    use sea_orm::{ConnectOptions, Database, DatabaseConnection};
    use sea_orm_migration::MigratorTrait;

    async fn repo() -> SeaOrmContactsRepository<DatabaseConnection> {
        let mut opts = ConnectOptions::new("sqlite::memory:");
        opts.max_connections(1);
        let db = Database::connect(opts).await.unwrap();
        Migrator::up(&db, None).await.unwrap();
        SeaOrmContactsRepository::new(db)
    }

    fn new_contact(name: &str, email: &str) -> NewContact {
        NewContact {
            name: name.into(),
            email: email.into(),
            phone: "5551234567".into(),
            address: None,
        }
    }

    #[tokio::test]
    async fn insert_assigns_increasing_ids() {
        let repo = repo().await;
        let a = repo.insert(&new_contact("A", "a@x.com"), Utc::now()).await.unwrap();
        let b = repo.insert(&new_contact("B", "b@x.com"), Utc::now()).await.unwrap();
        assert!(b > a);
    }

    #[tokio::test]
    async fn duplicate_email_is_unique_violation() {
        let repo = repo().await;
        repo.insert(&new_contact("A", "dup@x.com"), Utc::now()).await.unwrap();
        let err = repo
            .insert(&new_contact("B", "dup@x.com"), Utc::now())
            .await
            .unwrap_err();
        assert!(matches!(err, RepoError::UniqueViolation(_)), "got {err:?}");
    }

    #[tokio::test]
    async fn update_writes_only_present_fields() {
        let repo = repo().await;
        let id = repo.insert(&new_contact("Ann", "ann@x.com"), Utc::now()).await.unwrap();

        let patch = ContactPatch {
            address: Some("1 Main St".into()),
            ..Default::default()
        };
        assert!(repo.update(id, &patch).await.unwrap());

        let stored = repo.find_by_id(id).await.unwrap().unwrap();
        assert_eq!(stored.name, "Ann");
        assert_eq!(stored.email, "ann@x.com");
        assert_eq!(stored.address.as_deref(), Some("1 Main St"));
    }

    #[tokio::test]
    async fn update_and_delete_report_missing_rows() {
        let repo = repo().await;
        let patch = ContactPatch {
            name: Some("X".into()),
            ..Default::default()
        };
        assert!(!repo.update(999_999, &patch).await.unwrap());
        assert!(!repo.update(999_999, &ContactPatch::default()).await.unwrap());
        assert!(!repo.delete(999_999).await.unwrap());
    }

    #[tokio::test]
    async fn list_filters_on_name_or_email() {
        let repo = repo().await;
        repo.insert(&new_contact("Alice", "alice@x.com"), Utc::now()).await.unwrap();
        repo.insert(&new_contact("Bob", "bob@corp.io"), Utc::now()).await.unwrap();

        assert_eq!(repo.list("").await.unwrap().len(), 2);

        let by_name = repo.list("Ali").await.unwrap();
        assert_eq!(by_name.len(), 1);
        assert_eq!(by_name[0].name, "Alice");

        let by_email = repo.list("corp").await.unwrap();
        assert_eq!(by_email.len(), 1);
        assert_eq!(by_email[0].name, "Bob");

        assert!(repo.list("nobody").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn list_matches_wildcards_literally() {
        let repo = repo().await;
        repo.insert(&new_contact("Alice", "alice@x.com"), Utc::now()).await.unwrap();
        repo.insert(&new_contact("Bob_Jr", "bob@corp.io"), Utc::now()).await.unwrap();

        let underscore = repo.list("_").await.unwrap();
        assert_eq!(underscore.len(), 1);
        assert_eq!(underscore[0].name, "Bob_Jr");

        assert!(repo.list("%").await.unwrap().is_empty());
        assert!(repo.list("A%e").await.unwrap().is_empty());
        assert!(repo.list("\\").await.unwrap().is_empty());
    }
}
