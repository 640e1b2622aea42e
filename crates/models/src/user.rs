use sea_orm::{entity::prelude::*, Set, DatabaseConnection};
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::errors;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "user")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub name: String,
    #[sea_orm(unique)]
    pub email: String,
    #[serde(skip_serializing)]
    pub password: String,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "crate::entry::Entity")]
    Entry,
}

impl Related<crate::entry::Entity> for Entity {
    fn to() -> RelationDef { Relation::Entry.def() }
}

impl ActiveModelBehavior for ActiveModel {}

pub fn validate_email(email: &str) -> Result<(), errors::ModelError> {
    let valid = email
        .trim()
        .split_once('@')
        .map(|(local, domain)| !local.is_empty() && !domain.is_empty())
        .unwrap_or(false);
    if !valid { return Err(errors::ModelError::Validation { field: "email", reason: "expected local@domain" }); }
    Ok(())
}

pub fn validate_name(name: &str) -> Result<(), errors::ModelError> {
    if name.trim().is_empty() { return Err(errors::ModelError::Validation { field: "name", reason: "must not be blank" }); }
    Ok(())
}

/// Insert a user row. `password` is stored as given; encoding happens upstream.
pub async fn create(db: &DatabaseConnection, name: &str, email: &str, password: &str) -> Result<Model, errors::ModelError> {
    validate_email(email)?;
    validate_name(name)?;
    let am = ActiveModel {
        name: Set(name.to_string()),
        email: Set(email.to_string()),
        password: Set(password.to_string()),
        created_at: Set(Utc::now().into()),
        ..Default::default()
    };
    Ok(am.insert(db).await?)
}

pub async fn find_by_email(db: &DatabaseConnection, email: &str) -> Result<Option<Model>, errors::ModelError> {
    Entity::find()
        .filter(Column::Email.eq(email))
        .one(db)
        .await
        .map_err(Into::into)
}

pub async fn exists_by_email(db: &DatabaseConnection, email: &str) -> Result<bool, errors::ModelError> {
    use sea_orm::PaginatorTrait;
    let n = Entity::find()
        .filter(Column::Email.eq(email))
        .count(db)
        .await?;
    Ok(n > 0)
}
