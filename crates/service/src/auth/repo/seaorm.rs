use sea_orm::{ActiveModelTrait, ActiveValue::NotSet, DatabaseConnection, EntityTrait, Set};

use models::errors::ModelError;

use crate::auth::domain::User;
use crate::auth::errors::AuthError;
use crate::auth::repository::UserRepository;

pub struct SeaOrmUserRepository {
    pub db: DatabaseConnection,
}

fn to_domain(m: models::user::Model) -> User {
    User { id: Some(m.id), name: m.name, email: m.email, password: m.password }
}

#[async_trait::async_trait]
impl UserRepository for SeaOrmUserRepository {
    async fn exists_by_email(&self, email: &str) -> Result<bool, AuthError> {
        models::user::exists_by_email(&self.db, email)
            .await
            .map_err(|e| AuthError::Repository(e.to_string()))
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AuthError> {
        let res = models::user::find_by_email(&self.db, email)
            .await
            .map_err(|e| AuthError::Repository(e.to_string()))?;
        Ok(res.map(to_domain))
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<User>, AuthError> {
        let res = models::user::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(|e| AuthError::Repository(e.to_string()))?;
        Ok(res.map(to_domain))
    }

    async fn save(&self, user: User) -> Result<User, AuthError> {
        let saved = match user.id {
            None => models::user::create(&self.db, &user.name, &user.email, &user.password)
                .await
                .map_err(|e| match e {
                    ModelError::Db(db) => AuthError::Repository(db.to_string()),
                    invalid => AuthError::InvalidInput(invalid.to_string()),
                })?,
            Some(id) => {
                let am = models::user::ActiveModel {
                    id: Set(id),
                    name: Set(user.name),
                    email: Set(user.email),
                    password: Set(user.password),
                    created_at: NotSet,
                };
                am.update(&self.db).await.map_err(|e| AuthError::Repository(e.to_string()))?
            }
        };
        Ok(to_domain(saved))
    }
}
