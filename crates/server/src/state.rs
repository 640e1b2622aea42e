use std::sync::Arc;

use service::auth::password::PasswordEncoder;
use service::auth::repository::UserRepository;
use service::auth::AuthService;
use service::entry::repository::EntryRepository;
use service::entry::EntryService;
use service::token::TokenService;

/// Shared handler state. Services sit behind trait objects so the same
/// router runs against SeaORM or the in-memory repositories.
#[derive(Clone)]
pub struct AppState {
    pub entries: Arc<EntryService<dyn EntryRepository>>,
    pub users: Arc<AuthService<dyn UserRepository>>,
    pub tokens: Arc<TokenService>,
}

impl AppState {
    pub fn new(
        entry_repo: Arc<dyn EntryRepository>,
        user_repo: Arc<dyn UserRepository>,
        encoder: Arc<dyn PasswordEncoder>,
        tokens: TokenService,
    ) -> Self {
        Self {
            entries: Arc::new(EntryService::new(entry_repo)),
            users: Arc::new(AuthService::new(user_repo, encoder)),
            tokens: Arc::new(tokens),
        }
    }
}
