use anyhow::{Context, Result};
use sea_orm::{DatabaseConnection, EntityTrait, PaginatorTrait, QueryOrder, Set};
use serde::Serialize;

use crate::db::{InsertOutcome, is_unique_violation, now_timestamp};
use crate::entities::{prelude::*, users};

#[derive(Debug, Clone, Serialize)]
pub struct User {
    pub id: i32,
    pub name: String,
    pub email: String,
    pub created: String,
}

impl From<users::Model> for User {
    fn from(model: users::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            email: model.email,
            created: model.created,
        }
    }
}

pub struct UserRepository {
    conn: DatabaseConnection,
}

impl UserRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn list(&self) -> Result<Vec<User>> {
        let rows = Users::find()
            .order_by_desc(users::Column::Created)
            .order_by_desc(users::Column::Id)
            .all(&self.conn)
            .await
            .context("Failed to list users")?;

        Ok(rows.into_iter().map(User::from).collect())
    }

    pub async fn count(&self) -> Result<u64> {
        Users::find()
            .count(&self.conn)
            .await
            .context("Failed to count users")
    }

    pub async fn create(&self, name: &str, email: &str) -> Result<InsertOutcome<i32>> {
        let active_model = users::ActiveModel {
            name: Set(name.to_string()),
            email: Set(email.to_string()),
            created: Set(now_timestamp()),
            ..Default::default()
        };

        match Users::insert(active_model).exec(&self.conn).await {
            Ok(res) => Ok(InsertOutcome::Created(res.last_insert_id)),
            Err(err) if is_unique_violation(&err) => Ok(InsertOutcome::Duplicate),
            Err(err) => Err(err).context("Failed to insert user"),
        }
    }

    #[cfg(test)]
    pub async fn get_by_email(&self, email: &str) -> Result<Option<User>> {
        use sea_orm::{ColumnTrait, QueryFilter};

        let user = Users::find()
            .filter(users::Column::Email.eq(email))
            .one(&self.conn)
            .await
            .context("Failed to query user by email")?;

        Ok(user.map(User::from))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Store;

    #[tokio::test]
    async fn email_is_unique_and_listing_is_newest_first() {
        let store = Store::new("sqlite::memory:").await.unwrap();
        let repo = UserRepository::new(store.conn);

        assert!(matches!(
            repo.create("Ada", "ada@example.com").await.unwrap(),
            InsertOutcome::Created(_)
        ));
        assert!(matches!(
            repo.create("Grace", "grace@example.com").await.unwrap(),
            InsertOutcome::Created(_)
        ));
        assert_eq!(
            repo.create("Ada Again", "ada@example.com").await.unwrap(),
            InsertOutcome::Duplicate
        );

        let users = repo.list().await.unwrap();
        assert_eq!(users.len(), 2);
        assert_eq!(users[0].name, "Grace");
        assert_eq!(repo.count().await.unwrap(), 2);

        let ada = repo.get_by_email("ada@example.com").await.unwrap().unwrap();
        assert_eq!(ada.name, "Ada");
    }
}
