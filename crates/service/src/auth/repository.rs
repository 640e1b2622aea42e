use async_trait::async_trait;

use super::domain::User;
use super::errors::AuthError;

/// Storage port for users.
#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn exists_by_email(&self, email: &str) -> Result<bool, AuthError>;
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AuthError>;
    async fn find_by_id(&self, id: i64) -> Result<Option<User>, AuthError>;
    /// Insert when `user.id` is `None`, otherwise overwrite the stored row.
    async fn save(&self, user: User) -> Result<User, AuthError>;
}

/// Simple in-memory mock repository for tests and doc examples
pub mod mock {
    use super::*;
    use std::collections::BTreeMap;
    use std::sync::atomic::{AtomicI64, AtomicUsize, Ordering};
    use std::sync::Mutex;

    #[derive(Default)]
    pub struct MockUserRepository {
        users: Mutex<BTreeMap<i64, User>>, // key: user id
        last_id: AtomicI64,
        saves: AtomicUsize,
    }

    impl MockUserRepository {
        /// Store a user directly, bypassing `save` bookkeeping.
        pub fn seed(&self, mut user: User) -> User {
            let id = user.id.unwrap_or_else(|| self.last_id.fetch_add(1, Ordering::SeqCst) + 1);
            self.last_id.fetch_max(id, Ordering::SeqCst);
            user.id = Some(id);
            if let Ok(mut users) = self.users.lock() {
                users.insert(id, user.clone());
            }
            user
        }

        pub fn save_calls(&self) -> usize { self.saves.load(Ordering::SeqCst) }

        fn lock(&self) -> Result<std::sync::MutexGuard<'_, BTreeMap<i64, User>>, AuthError> {
            self.users.lock().map_err(|_| AuthError::Repository("user store poisoned".into()))
        }
    }

    #[async_trait]
    impl UserRepository for MockUserRepository {
        async fn exists_by_email(&self, email: &str) -> Result<bool, AuthError> {
            Ok(self.lock()?.values().any(|u| u.email == email))
        }

        async fn find_by_email(&self, email: &str) -> Result<Option<User>, AuthError> {
            Ok(self.lock()?.values().find(|u| u.email == email).cloned())
        }

        async fn find_by_id(&self, id: i64) -> Result<Option<User>, AuthError> {
            Ok(self.lock()?.get(&id).cloned())
        }

        async fn save(&self, mut user: User) -> Result<User, AuthError> {
            self.saves.fetch_add(1, Ordering::SeqCst);
            let mut users = self.lock()?;
            // mirrors the unique index on user.email
            if users.values().any(|u| u.email == user.email && u.id != user.id) {
                return Err(AuthError::Repository(format!("duplicate email: {}", user.email)));
            }
            let id = match user.id {
                Some(id) => id,
                None => self.last_id.fetch_add(1, Ordering::SeqCst) + 1,
            };
            self.last_id.fetch_max(id, Ordering::SeqCst);
            user.id = Some(id);
            users.insert(id, user.clone());
            Ok(user)
        }
    }
}
