use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::sea_query::{Expr, Func, LikeExpr};
use sea_orm::{
    ActiveModelTrait, ActiveValue::NotSet, ColumnTrait, Condition, DatabaseConnection, DbErr, EntityTrait,
    QueryFilter, QueryOrder, QuerySelect, Set,
};

use models::{entry, user};

use crate::auth::domain::User;
use crate::entry::domain::{Entry, EntryFilter, EntryKind, EntryStatus};
use crate::entry::errors::EntryError;
use crate::entry::repository::EntryRepository;

pub struct SeaOrmEntryRepository {
    pub db: DatabaseConnection,
}

fn db_err(e: DbErr) -> EntryError { EntryError::Repository(e.to_string()) }

fn to_domain(m: entry::Model, owner: Option<user::Model>) -> Result<Entry, EntryError> {
    let kind = m.kind.parse::<EntryKind>().map_err(|e| EntryError::Repository(e.to_string()))?;
    let status = m.status.parse::<EntryStatus>().map_err(|e| EntryError::Repository(e.to_string()))?;
    let user = match owner {
        Some(u) => User { id: Some(u.id), name: u.name, email: u.email, password: u.password },
        None => User::default().with_id(m.user_id),
    };
    Ok(Entry {
        id: Some(m.id),
        description: Some(m.description),
        month: u32::try_from(m.month).ok(),
        year: Some(m.year),
        user: Some(user),
        value: Some(m.value),
        kind: Some(kind),
        status: Some(status),
        registered_at: Some(m.registered_at),
    })
}

fn required<T>(value: Option<T>, field: &str) -> Result<T, EntryError> {
    value.ok_or_else(|| EntryError::Repository(format!("entry field `{field}` is required for storage")))
}

fn to_active_model(e: &Entry) -> Result<entry::ActiveModel, EntryError> {
    let month = required(e.month, "month")?;
    Ok(entry::ActiveModel {
        id: e.id.map(Set).unwrap_or(NotSet),
        description: Set(required(e.description.clone(), "description")?),
        month: Set(i32::try_from(month).map_err(|_| EntryError::Repository(format!("month out of range: {month}")))?),
        year: Set(required(e.year, "year")?),
        user_id: Set(required(e.user_id(), "user")?),
        value: Set(required(e.value, "value")?),
        kind: Set(required(e.kind, "kind")?.as_str().to_string()),
        status: Set(e.status.unwrap_or_default().as_str().to_string()),
        registered_at: match (e.id, e.registered_at) {
            (_, Some(date)) => Set(date),
            (None, None) => Set(Utc::now().date_naive()),
            (Some(_), None) => NotSet,
        },
    })
}

/// LIKE pattern matching `needle` literally anywhere in the text, with
/// backslash as the escape character.
fn contains_pattern(needle: &str) -> String {
    let mut pattern = String::with_capacity(needle.len() + 2);
    pattern.push('%');
    for c in needle.chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

fn condition(filter: &EntryFilter) -> Condition {
    let mut cond = Condition::all();
    if let Some(id) = filter.id { cond = cond.add(entry::Column::Id.eq(id)); }
    if let Some(user_id) = filter.user_id { cond = cond.add(entry::Column::UserId.eq(user_id)); }
    if let Some(month) = filter.month {
        // no stored month is negative, so an out-of-range filter matches nothing
        cond = cond.add(entry::Column::Month.eq(i32::try_from(month).unwrap_or(-1)));
    }
    if let Some(year) = filter.year { cond = cond.add(entry::Column::Year.eq(year)); }
    if let Some(status) = filter.status { cond = cond.add(entry::Column::Status.eq(status.as_str())); }
    if let Some(kind) = filter.kind { cond = cond.add(entry::Column::Kind.eq(kind.as_str())); }
    if let Some(needle) = filter.description_needle() {
        let lowered = Func::lower(Expr::col((entry::Entity, entry::Column::Description)));
        cond = cond.add(Expr::expr(lowered).like(LikeExpr::new(contains_pattern(&needle)).escape('\\')));
    }
    cond
}

#[async_trait::async_trait]
impl EntryRepository for SeaOrmEntryRepository {
    async fn find_by_id(&self, id: i64) -> Result<Option<Entry>, EntryError> {
        let row = entry::Entity::find_by_id(id)
            .find_also_related(user::Entity)
            .one(&self.db)
            .await
            .map_err(db_err)?;
        row.map(|(e, u)| to_domain(e, u)).transpose()
    }

    async fn find_all(&self, filter: &EntryFilter) -> Result<Vec<Entry>, EntryError> {
        let rows = entry::Entity::find()
            .filter(condition(filter))
            .order_by_asc(entry::Column::Id)
            .find_also_related(user::Entity)
            .all(&self.db)
            .await
            .map_err(db_err)?;
        rows.into_iter().map(|(e, u)| to_domain(e, u)).collect()
    }

    async fn save(&self, e: Entry) -> Result<Entry, EntryError> {
        let am = to_active_model(&e)?;
        let model = match e.id {
            None => am.insert(&self.db).await.map_err(db_err)?,
            Some(id) => am.update(&self.db).await.map_err(|err| match err {
                DbErr::RecordNotUpdated => EntryError::Repository(format!("entry {id} does not exist")),
                other => db_err(other),
            })?,
        };
        let mut saved = to_domain(model, None)?;
        // keep the owner the caller passed in rather than the bare id
        if e.user.is_some() {
            saved.user = e.user;
        }
        Ok(saved)
    }

    async fn delete(&self, id: i64) -> Result<(), EntryError> {
        entry::Entity::delete_by_id(id).exec(&self.db).await.map_err(db_err)?;
        Ok(())
    }

    async fn sum_values(&self, user_id: i64, kind: EntryKind, status: EntryStatus) -> Result<Decimal, EntryError> {
        let total = entry::Entity::find()
            .select_only()
            .column_as(entry::Column::Value.sum(), "total")
            .filter(entry::Column::UserId.eq(user_id))
            .filter(entry::Column::Kind.eq(kind.as_str()))
            .filter(entry::Column::Status.eq(status.as_str()))
            .into_tuple::<Option<Decimal>>()
            .one(&self.db)
            .await
            .map_err(db_err)?;
        Ok(total.flatten().unwrap_or(Decimal::ZERO))
    }
}
