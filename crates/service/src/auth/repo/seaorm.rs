use sea_orm::DatabaseConnection;

use crate::auth::domain::User;
use crate::auth::errors::AuthError;
use crate::auth::repository::UserRepository;

pub struct SeaOrmUserRepository {
    pub db: DatabaseConnection,
}

impl SeaOrmUserRepository {
    pub fn new(db: DatabaseConnection) -> Self { Self { db } }
}

impl From<models::user::Model> for User {
    fn from(m: models::user::Model) -> Self {
        User { id: m.id, username: m.username, password: m.password }
    }
}

#[async_trait::async_trait]
impl UserRepository for SeaOrmUserRepository {
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, AuthError> {
        let res = models::user::find_by_username(&self.db, username).await?;
        Ok(res.map(User::from))
    }

    async fn insert(&self, username: &str, password_hash: &str) -> Result<User, AuthError> {
        let created = models::user::create(&self.db, username, password_hash).await?;
        Ok(created.into())
    }

    async fn delete_all(&self) -> Result<u64, AuthError> {
        Ok(models::user::delete_all(&self.db).await?)
    }
}
