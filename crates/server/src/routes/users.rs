use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use service::auth::domain::User;

use crate::errors::ApiError;
use crate::routes::auth::AuthenticatedUser;
use crate::state::AppState;

pub const USER_ID_NOT_FOUND: &str = "Usuário não encontrado para o Id informado.";

#[derive(Debug, Deserialize)]
pub struct UserInput {
    #[serde(rename = "nome", default)]
    pub name: String,
    pub email: String,
    #[serde(rename = "senha")]
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct UserOutput {
    pub id: Option<i64>,
    #[serde(rename = "nome")]
    pub name: String,
    pub email: String,
}

impl From<User> for UserOutput {
    fn from(u: User) -> Self { Self { id: u.id, name: u.name, email: u.email } }
}

#[derive(Debug, Serialize)]
pub struct SessionOutput {
    #[serde(flatten)]
    pub user: UserOutput,
    pub token: String,
}

pub async fn register(
    State(state): State<AppState>,
    Json(input): Json<UserInput>,
) -> Result<(StatusCode, Json<UserOutput>), ApiError> {
    let user = state.users.register_user(User::new(input.name, input.email, input.password)).await?;
    Ok((StatusCode::CREATED, Json(user.into())))
}

pub async fn authenticate(
    State(state): State<AppState>,
    Json(input): Json<UserInput>,
) -> Result<Json<SessionOutput>, ApiError> {
    let user = state.users.authenticate(&input.email, &input.password).await?;
    let token = state.tokens.issue_token(&user)?;
    Ok(Json(SessionOutput { user: user.into(), token }))
}

pub async fn balance(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthenticatedUser>,
    Path(id): Path<i64>,
) -> Result<Json<Decimal>, ApiError> {
    if state.users.find_user(id).await?.is_none() {
        return Err(ApiError::NotFound(USER_ID_NOT_FOUND.into()));
    }
    caller.ensure_owner(Some(id))?;
    Ok(Json(state.entries.balance(id).await?))
}
