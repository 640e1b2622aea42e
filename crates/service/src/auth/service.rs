use std::sync::Arc;

use tracing::{debug, info, instrument, warn};

use super::domain::User;
use super::errors::AuthError;
use super::password::PasswordEncoder;
use super::repository::UserRepository;

/// Auth business service independent of web framework
pub struct AuthService<R: UserRepository + ?Sized> {
    repo: Arc<R>,
    encoder: Arc<dyn PasswordEncoder>,
}

impl<R: UserRepository + ?Sized> AuthService<R> {
    pub fn new(repo: Arc<R>, encoder: Arc<dyn PasswordEncoder>) -> Self { Self { repo, encoder } }

    /// Fails with [`AuthError::EmailTaken`] when a user already uses `email`.
    ///
    /// The check and the later insert are not atomic; the unique index on
    /// `user.email` catches the concurrent case as a repository error.
    #[instrument(skip(self))]
    pub async fn validate_email_available(&self, email: &str) -> Result<(), AuthError> {
        if self.repo.exists_by_email(email).await? {
            debug!("email already registered");
            return Err(AuthError::EmailTaken);
        }
        Ok(())
    }

    /// Register a new user, encoding the password with the configured encoder.
    ///
    /// # Examples
    /// ```
    /// use service::auth::{service::AuthService, repository::mock::MockUserRepository};
    /// use service::auth::{domain::User, password::PlainTextEncoder};
    /// use std::sync::Arc;
    /// let svc = AuthService::new(Arc::new(MockUserRepository::default()), Arc::new(PlainTextEncoder));
    /// let user = tokio_test::block_on(svc.register_user(User::new("usuario", "usuario@email.com", "senha"))).unwrap();
    /// assert_eq!(user.id, Some(1));
    /// ```
    #[instrument(skip(self, user), fields(email = %user.email))]
    pub async fn register_user(&self, mut user: User) -> Result<User, AuthError> {
        self.validate_email_available(&user.email).await?;
        user.password = self.encoder.encode(&user.password)?;
        let saved = self.repo.save(user).await?;
        info!(user_id = ?saved.id, algorithm = self.encoder.algorithm(), "user_registered");
        Ok(saved)
    }

    /// Check credentials and return the stored user.
    ///
    /// # Examples
    /// ```
    /// use service::auth::{service::AuthService, repository::mock::MockUserRepository};
    /// use service::auth::{domain::User, password::PlainTextEncoder};
    /// use std::sync::Arc;
    /// let svc = AuthService::new(Arc::new(MockUserRepository::default()), Arc::new(PlainTextEncoder));
    /// tokio_test::block_on(svc.register_user(User::new("usuario", "u@e.com", "senha"))).unwrap();
    /// let err = tokio_test::block_on(svc.authenticate("u@e.com", "123")).unwrap_err();
    /// assert_eq!(err.to_string(), "Senha inválida");
    /// ```
    #[instrument(skip(self, password))]
    pub async fn authenticate(&self, email: &str, password: &str) -> Result<User, AuthError> {
        let user = match self.repo.find_by_email(email).await? {
            Some(user) => user,
            None => {
                warn!("authentication rejected: unknown email");
                return Err(AuthError::UserNotFound);
            }
        };
        if !self.encoder.matches(password, &user.password) {
            warn!(user_id = ?user.id, "authentication rejected: password mismatch");
            return Err(AuthError::InvalidPassword);
        }
        info!(user_id = ?user.id, "user_authenticated");
        Ok(user)
    }

    pub async fn find_user(&self, id: i64) -> Result<Option<User>, AuthError> {
        self.repo.find_by_id(id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::password::{Argon2Encoder, PlainTextEncoder};
    use crate::auth::repository::mock::MockUserRepository;

    fn service(repo: &Arc<MockUserRepository>) -> AuthService<MockUserRepository> {
        AuthService::new(repo.clone(), Arc::new(PlainTextEncoder))
    }

    #[tokio::test]
    async fn available_email_passes() {
        let repo = Arc::new(MockUserRepository::default());
        assert!(service(&repo).validate_email_available("email@email.com").await.is_ok());
    }

    #[tokio::test]
    async fn taken_email_is_rejected_with_message() {
        let repo = Arc::new(MockUserRepository::default());
        repo.seed(User::new("usuario", "email@email.com", "senha"));
        let err = service(&repo).validate_email_available("email@email.com").await.unwrap_err();
        assert!(matches!(err, AuthError::EmailTaken));
        assert_eq!(err.to_string(), "Já existe um usuário cadastrado com este email.");
    }

    #[tokio::test]
    async fn authenticates_known_user() {
        let repo = Arc::new(MockUserRepository::default());
        repo.seed(User::new("usuario", "email@email.com", "senha"));
        let user = service(&repo).authenticate("email@email.com", "senha").await.unwrap();
        assert_eq!(user.email, "email@email.com");
        assert!(user.id.is_some());
    }

    #[tokio::test]
    async fn unknown_email_fails() {
        let repo = Arc::new(MockUserRepository::default());
        let err = service(&repo).authenticate("usuario@email.com", "senha").await.unwrap_err();
        assert!(matches!(err, AuthError::UserNotFound));
        assert_eq!(err.to_string(), "Usuário não encontrado para o email informado");
        assert!(err.is_credentials_failure());
    }

    #[tokio::test]
    async fn wrong_password_fails() {
        let repo = Arc::new(MockUserRepository::default());
        repo.seed(User::new("usuario", "email@email.com", "senha"));
        let err = service(&repo).authenticate("email@email.com", "123").await.unwrap_err();
        assert!(matches!(err, AuthError::InvalidPassword));
        assert_eq!(err.to_string(), "Senha inválida");
    }

    #[tokio::test]
    async fn registers_user() {
        let repo = Arc::new(MockUserRepository::default());
        let saved = service(&repo)
            .register_user(User::new("nome", "usuario@email.com", "senha"))
            .await
            .unwrap();
        assert_eq!(saved.id, Some(1));
        assert_eq!(saved.name, "nome");
        assert_eq!(saved.email, "usuario@email.com");
        assert_eq!(saved.password, "senha");
        assert_eq!(repo.save_calls(), 1);
    }

    #[tokio::test]
    async fn duplicate_email_never_reaches_storage() {
        let repo = Arc::new(MockUserRepository::default());
        repo.seed(User::new("usuario", "usuario@email.com", "senha"));
        let err = service(&repo)
            .register_user(User::new("outro", "usuario@email.com", "outra"))
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::EmailTaken));
        assert_eq!(repo.save_calls(), 0);
    }

    #[tokio::test]
    async fn argon2_stores_hash_and_still_authenticates() {
        let repo = Arc::new(MockUserRepository::default());
        let svc = AuthService::new(repo.clone(), Arc::new(Argon2Encoder));
        let saved = svc.register_user(User::new("nome", "a@b.com", "S3curePass!")).await.unwrap();
        assert_ne!(saved.password, "S3curePass!");
        assert!(svc.authenticate("a@b.com", "S3curePass!").await.is_ok());
        assert!(matches!(svc.authenticate("a@b.com", "nope").await, Err(AuthError::InvalidPassword)));
    }

    #[tokio::test]
    async fn find_user_misses_quietly() {
        let repo = Arc::new(MockUserRepository::default());
        assert!(service(&repo).find_user(42).await.unwrap().is_none());
    }
}
