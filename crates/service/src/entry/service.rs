use std::sync::Arc;

use rust_decimal::Decimal;
use tracing::{debug, error, info, instrument};

use super::domain::{Entry, EntryFilter, EntryKind, EntryStatus};
use super::errors::EntryError;
use super::repository::EntryRepository;
use super::validation::validate;

/// Application service for the entry lifecycle: validate, store, change
/// status, query.
pub struct EntryService<R: EntryRepository + ?Sized> {
    repo: Arc<R>,
}

impl<R: EntryRepository + ?Sized> EntryService<R> {
    pub fn new(repo: Arc<R>) -> Self { Self { repo } }

    /// Validate and store a new entry. Status is always reset to `Pending`.
    ///
    /// # Examples
    /// ```
    /// use service::entry::{EntryService, repository::mock::MockEntryRepository};
    /// use service::entry::domain::{Entry, EntryKind, EntryStatus};
    /// use service::auth::domain::User;
    /// use std::sync::Arc;
    /// let svc = EntryService::new(Arc::new(MockEntryRepository::default()));
    /// let entry = Entry {
    ///     description: Some("Salario".into()),
    ///     month: Some(2),
    ///     year: Some(2022),
    ///     value: Some(rust_decimal::Decimal::TEN),
    ///     kind: Some(EntryKind::Income),
    ///     user: Some(User::default().with_id(1)),
    ///     ..Default::default()
    /// };
    /// let saved = tokio_test::block_on(svc.save(entry)).unwrap();
    /// assert_eq!(saved.id, Some(1));
    /// assert_eq!(saved.status, Some(EntryStatus::Pending));
    /// ```
    #[instrument(skip(self, entry), fields(user_id = ?entry.user_id()))]
    pub async fn save(&self, mut entry: Entry) -> Result<Entry, EntryError> {
        validate(&entry)?;
        entry.status = Some(EntryStatus::Pending);
        let saved = self.repo.save(entry).await?;
        info!(entry_id = ?saved.id, "entry_saved");
        Ok(saved)
    }

    /// Validate and overwrite a stored entry. Never creates one.
    #[instrument(skip(self, entry), fields(entry_id = ?entry.id))]
    pub async fn update(&self, entry: Entry) -> Result<Entry, EntryError> {
        require_id(&entry, "update")?;
        validate(&entry)?;
        let saved = self.repo.save(entry).await?;
        info!(status = ?saved.status, "entry_updated");
        Ok(saved)
    }

    #[instrument(skip(self, entry), fields(entry_id = ?entry.id))]
    pub async fn delete(&self, entry: &Entry) -> Result<(), EntryError> {
        let id = require_id(entry, "delete")?;
        self.repo.delete(id).await?;
        info!("entry_deleted");
        Ok(())
    }

    #[instrument(skip(self))]
    pub async fn search(&self, filter: &EntryFilter) -> Result<Vec<Entry>, EntryError> {
        let found = self.repo.find_all(filter).await?;
        debug!(count = found.len(), "entries_found");
        Ok(found)
    }

    /// Set `status` on `entry` and persist it through [`Self::update`], so the
    /// whole entry is validated again.
    #[instrument(skip(self, entry), fields(entry_id = ?entry.id))]
    pub async fn change_status(&self, entry: &mut Entry, status: EntryStatus) -> Result<Entry, EntryError> {
        entry.status = Some(status);
        let saved = self.update(entry.clone()).await?;
        info!(%status, "entry_status_changed");
        Ok(saved)
    }

    #[instrument(skip(self))]
    pub async fn find_by_id(&self, id: i64) -> Result<Option<Entry>, EntryError> {
        self.repo.find_by_id(id).await
    }

    /// Settled income minus settled expenses for one user.
    #[instrument(skip(self))]
    pub async fn balance(&self, user_id: i64) -> Result<Decimal, EntryError> {
        let income = self.repo.sum_values(user_id, EntryKind::Income, EntryStatus::Settled).await?;
        let expense = self.repo.sum_values(user_id, EntryKind::Expense, EntryStatus::Settled).await?;
        Ok(income - expense)
    }
}

fn require_id(entry: &Entry, operation: &'static str) -> Result<i64, EntryError> {
    entry.id.ok_or_else(|| {
        error!(operation, "entry_not_persisted");
        EntryError::NotPersisted(operation)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::domain::User;
    use crate::entry::repository::mock::MockEntryRepository;
    use crate::entry::validation::{INVALID_DESCRIPTION, INVALID_VALUE};

    fn new_entry() -> Entry {
        Entry {
            description: Some("Salario".into()),
            month: Some(1),
            year: Some(2019),
            value: Some(Decimal::TEN),
            kind: Some(EntryKind::Income),
            status: Some(EntryStatus::Pending),
            user: Some(User::new("usuario", "usuario@email.com", "senha").with_id(1)),
            ..Default::default()
        }
    }

    fn setup() -> (Arc<MockEntryRepository>, EntryService<MockEntryRepository>) {
        let repo = Arc::new(MockEntryRepository::default());
        (repo.clone(), EntryService::new(repo))
    }

    #[tokio::test]
    async fn saves_entry_as_pending() {
        let (repo, svc) = setup();
        let saved = svc.save(Entry { status: Some(EntryStatus::Settled), ..new_entry() }).await.unwrap();
        assert_eq!(saved.id, Some(1));
        assert_eq!(saved.status, Some(EntryStatus::Pending));
        assert!(saved.registered_at.is_some());
        assert_eq!(repo.save_calls(), 1);
    }

    #[tokio::test]
    async fn invalid_entry_is_not_saved() {
        let (repo, svc) = setup();
        let err = svc.save(Entry { description: None, ..new_entry() }).await.unwrap_err();
        match err {
            EntryError::Validation(v) => assert_eq!(v.message(), INVALID_DESCRIPTION),
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(repo.save_calls(), 0);
    }

    #[tokio::test]
    async fn updates_persisted_entry() {
        let (repo, svc) = setup();
        let stored = repo.seed(new_entry());
        let changed = Entry { description: Some("Salario de Janeiro".into()), ..stored };
        let saved = svc.update(changed).await.unwrap();
        assert_eq!(saved.description.as_deref(), Some("Salario de Janeiro"));
        assert_eq!(repo.save_calls(), 1);
    }

    #[tokio::test]
    async fn update_without_id_never_touches_storage() {
        let (repo, svc) = setup();
        let err = svc.update(new_entry()).await.unwrap_err();
        assert!(matches!(err, EntryError::NotPersisted("update")));
        assert_eq!(repo.save_calls(), 0);
    }

    #[tokio::test]
    async fn update_still_validates() {
        let (repo, svc) = setup();
        let stored = repo.seed(new_entry());
        let err = svc.update(Entry { value: Some(Decimal::ZERO), ..stored }).await.unwrap_err();
        assert_eq!(err.to_string(), INVALID_VALUE);
        assert_eq!(repo.save_calls(), 0);
    }

    #[tokio::test]
    async fn deletes_persisted_entry() {
        let (repo, svc) = setup();
        let stored = repo.seed(new_entry());
        svc.delete(&stored).await.unwrap();
        assert_eq!(repo.delete_calls(), 1);
        assert!(svc.find_by_id(stored.id.unwrap()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn delete_without_id_never_touches_storage() {
        let (repo, svc) = setup();
        let err = svc.delete(&new_entry()).await.unwrap_err();
        assert!(matches!(err, EntryError::NotPersisted("delete")));
        assert_eq!(repo.delete_calls(), 0);
        assert_eq!(repo.save_calls(), 0);
    }

    #[tokio::test]
    async fn search_returns_matching_entries() {
        let (repo, svc) = setup();
        let stored = repo.seed(new_entry());
        let found = svc.search(&EntryFilter::from(&stored)).await.unwrap();
        assert_eq!(found, vec![stored]);
    }

    #[tokio::test]
    async fn search_by_status_only() {
        let (repo, svc) = setup();
        let a = repo.seed(new_entry());
        repo.seed(Entry { status: Some(EntryStatus::Settled), ..new_entry() });
        let c = repo.seed(Entry { description: Some("Aluguel".into()), kind: Some(EntryKind::Expense), ..new_entry() });
        repo.seed(Entry { status: Some(EntryStatus::Canceled), ..new_entry() });

        let filter = EntryFilter { status: Some(EntryStatus::Pending), ..Default::default() };
        let found = svc.search(&filter).await.unwrap();
        assert_eq!(found, vec![a, c]);
    }

    #[tokio::test]
    async fn change_status_sets_field_and_updates_once() {
        let (repo, svc) = setup();
        let mut entry = repo.seed(new_entry());
        let saved = svc.change_status(&mut entry, EntryStatus::Settled).await.unwrap();
        assert_eq!(entry.status, Some(EntryStatus::Settled));
        assert_eq!(saved.status, Some(EntryStatus::Settled));
        assert_eq!(repo.save_calls(), 1);
    }

    #[tokio::test]
    async fn change_status_on_unsaved_entry_fails() {
        let (repo, svc) = setup();
        let mut entry = new_entry();
        let err = svc.change_status(&mut entry, EntryStatus::Canceled).await.unwrap_err();
        assert!(matches!(err, EntryError::NotPersisted("update")));
        assert_eq!(entry.status, Some(EntryStatus::Canceled));
        assert_eq!(repo.save_calls(), 0);
    }

    #[tokio::test]
    async fn find_by_id_hit_and_miss() {
        let (repo, svc) = setup();
        let stored = repo.seed(new_entry());
        assert!(svc.find_by_id(stored.id.unwrap()).await.unwrap().is_some());
        assert!(svc.find_by_id(99).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn balance_counts_only_settled_entries_of_user() {
        let (repo, svc) = setup();
        let settled = Some(EntryStatus::Settled);
        repo.seed(Entry { value: Some(Decimal::new(1500, 0)), status: settled, ..new_entry() });
        repo.seed(Entry { value: Some(Decimal::new(40050, 2)), kind: Some(EntryKind::Expense), status: settled, ..new_entry() });
        repo.seed(Entry { value: Some(Decimal::new(999, 0)), ..new_entry() });
        repo.seed(Entry {
            value: Some(Decimal::new(777, 0)),
            status: settled,
            user: Some(User::default().with_id(2)),
            ..new_entry()
        });

        assert_eq!(svc.balance(1).await.unwrap(), Decimal::new(109950, 2));
        assert_eq!(svc.balance(3).await.unwrap(), Decimal::ZERO);
    }
}
