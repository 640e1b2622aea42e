use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use service::entry::domain::{Entry, EntryFilter, EntryKind, EntryStatus};
use service::entry::validation::{INVALID_MONTH, INVALID_YEAR};

use crate::errors::ApiError;
use crate::routes::auth::AuthenticatedUser;
use crate::routes::users::USER_ID_NOT_FOUND;
use crate::state::AppState;

pub const ENTRY_NOT_FOUND: &str = "Lançamento não encontrado na base de Dados.";
pub const INVALID_STATUS: &str = "Não foi possível atualizar o status do lançamento, envie um status válido.";
pub const SEARCH_USER_NOT_FOUND: &str = "Não foi possível realizar a consulta. Usuário não encontrado para o Id informado.";

/// Request body for create and update. Everything is optional here; the
/// entry rules decide what is missing or out of range, so `mes` and `ano`
/// are read as wide integers and narrowed afterwards.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct EntryInput {
    #[serde(rename = "descricao")]
    pub description: Option<String>,
    #[serde(rename = "mes")]
    pub month: Option<i64>,
    #[serde(rename = "ano")]
    pub year: Option<i64>,
    #[serde(rename = "valor")]
    pub value: Option<Decimal>,
    #[serde(rename = "usuario")]
    pub user_id: Option<i64>,
    #[serde(rename = "tipo")]
    pub kind: Option<String>,
    pub status: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct EntryOutput {
    pub id: Option<i64>,
    #[serde(rename = "descricao")]
    pub description: Option<String>,
    #[serde(rename = "mes")]
    pub month: Option<u32>,
    #[serde(rename = "ano")]
    pub year: Option<i32>,
    #[serde(rename = "valor")]
    pub value: Option<Decimal>,
    #[serde(rename = "usuario")]
    pub user_id: Option<i64>,
    #[serde(rename = "tipo")]
    pub kind: Option<EntryKind>,
    pub status: Option<EntryStatus>,
    #[serde(rename = "dataCadastro")]
    pub registered_at: Option<NaiveDate>,
}

impl From<Entry> for EntryOutput {
    fn from(e: Entry) -> Self {
        Self {
            id: e.id,
            user_id: e.user_id(),
            description: e.description,
            month: e.month,
            year: e.year,
            value: e.value,
            kind: e.kind,
            status: e.status,
            registered_at: e.registered_at,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    #[serde(rename = "descricao")]
    pub description: Option<String>,
    #[serde(rename = "mes")]
    pub month: Option<i64>,
    #[serde(rename = "ano")]
    pub year: Option<i64>,
    #[serde(rename = "usuario")]
    pub user_id: i64,
    #[serde(rename = "tipo")]
    pub kind: Option<String>,
    pub status: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct StatusInput {
    pub status: String,
}

fn parse_opt<T: std::str::FromStr>(raw: Option<&str>) -> Result<Option<T>, ApiError>
where
    T::Err: std::fmt::Display,
{
    raw.map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| s.parse::<T>().map_err(|e| ApiError::BadRequest(e.to_string())))
        .transpose()
}

/// Values that do not fit become 0, which the entry rules reject in their
/// usual order.
fn narrow_or_zero<T: TryFrom<i64> + Default>(raw: Option<i64>) -> Option<T> {
    raw.map(|v| T::try_from(v).unwrap_or_default())
}

fn narrow_param<T: TryFrom<i64>>(raw: Option<i64>, message: &str) -> Result<Option<T>, ApiError> {
    raw.map(|v| T::try_from(v).map_err(|_| ApiError::BadRequest(message.into())))
        .transpose()
}

/// Build a domain entry from the request body, resolving the owner by id.
async fn to_entry(state: &AppState, input: EntryInput) -> Result<Entry, ApiError> {
    let user = match input.user_id {
        Some(id) => Some(
            state
                .users
                .find_user(id)
                .await?
                .ok_or_else(|| ApiError::BadRequest(USER_ID_NOT_FOUND.into()))?,
        ),
        None => None,
    };
    Ok(Entry {
        id: None,
        description: input.description,
        month: narrow_or_zero(input.month),
        year: narrow_or_zero(input.year),
        user,
        value: input.value,
        kind: parse_opt(input.kind.as_deref())?,
        status: parse_opt(input.status.as_deref())?,
        registered_at: None,
    })
}

async fn load(state: &AppState, id: i64) -> Result<Entry, ApiError> {
    state
        .entries
        .find_by_id(id)
        .await?
        .ok_or_else(|| ApiError::BadRequest(ENTRY_NOT_FOUND.into()))
}

pub async fn search(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthenticatedUser>,
    Query(params): Query<SearchParams>,
) -> Result<Json<Vec<EntryOutput>>, ApiError> {
    if state.users.find_user(params.user_id).await?.is_none() {
        return Err(ApiError::BadRequest(SEARCH_USER_NOT_FOUND.into()));
    }
    caller.ensure_owner(Some(params.user_id))?;
    let filter = EntryFilter {
        user_id: Some(params.user_id),
        description: params.description,
        month: narrow_param(params.month, INVALID_MONTH)?,
        year: narrow_param(params.year, INVALID_YEAR)?,
        kind: parse_opt(params.kind.as_deref())?,
        status: parse_opt(params.status.as_deref())?,
        ..Default::default()
    };
    let found = state.entries.search(&filter).await?;
    Ok(Json(found.into_iter().map(EntryOutput::from).collect()))
}

pub async fn find(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthenticatedUser>,
    Path(id): Path<i64>,
) -> Result<Json<EntryOutput>, ApiError> {
    match state.entries.find_by_id(id).await? {
        Some(entry) => {
            caller.ensure_owner(entry.user_id())?;
            Ok(Json(entry.into()))
        }
        None => Err(ApiError::NotFound(ENTRY_NOT_FOUND.into())),
    }
}

pub async fn create(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthenticatedUser>,
    Json(input): Json<EntryInput>,
) -> Result<(StatusCode, Json<EntryOutput>), ApiError> {
    let entry = to_entry(&state, input).await?;
    // a missing owner is left to the entry rules
    if entry.user_id().is_some() {
        caller.ensure_owner(entry.user_id())?;
    }
    let saved = state.entries.save(entry).await?;
    Ok((StatusCode::CREATED, Json(saved.into())))
}

pub async fn update(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthenticatedUser>,
    Path(id): Path<i64>,
    Json(input): Json<EntryInput>,
) -> Result<Json<EntryOutput>, ApiError> {
    let stored = load(&state, id).await?;
    caller.ensure_owner(stored.user_id())?;
    let mut entry = to_entry(&state, input).await?;
    if entry.user_id().is_some() {
        caller.ensure_owner(entry.user_id())?;
    }
    entry.id = stored.id;
    entry.registered_at = stored.registered_at;
    entry.status = entry.status.or(stored.status);
    let saved = state.entries.update(entry).await?;
    Ok(Json(saved.into()))
}

pub async fn update_status(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthenticatedUser>,
    Path(id): Path<i64>,
    Json(input): Json<StatusInput>,
) -> Result<Json<EntryOutput>, ApiError> {
    let mut entry = load(&state, id).await?;
    caller.ensure_owner(entry.user_id())?;
    let status = input
        .status
        .trim()
        .parse::<EntryStatus>()
        .map_err(|_| ApiError::BadRequest(INVALID_STATUS.into()))?;
    let saved = state.entries.change_status(&mut entry, status).await?;
    Ok(Json(saved.into()))
}

pub async fn delete(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthenticatedUser>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    let entry = load(&state, id).await?;
    caller.ensure_owner(entry.user_id())?;
    state.entries.delete(&entry).await?;
    Ok(StatusCode::NO_CONTENT)
}
