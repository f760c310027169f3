use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use uuid::Uuid;

use super::filters::PolicyFilters;
use super::record::PolicyTransaction;

/// Storage contract over [`PolicyTransaction`] records.
///
/// Backends own identity and audit timestamps: `create` assigns an id when
/// absent and sets `created_at == updated_at`; `update` keeps the stored id
/// and `created_at`. `list` returns newest-created records first and applies
/// `skip`/`limit` after filtering.
#[async_trait]
pub trait PolicyRepository: Send + Sync {
    async fn get(&self, id: &str) -> Result<Option<PolicyTransaction>, RepositoryError>;

    async fn list(
        &self,
        skip: usize,
        limit: usize,
        filters: &PolicyFilters,
    ) -> Result<Vec<PolicyTransaction>, RepositoryError>;

    async fn create(&self, record: PolicyTransaction)
        -> Result<PolicyTransaction, RepositoryError>;

    async fn update(
        &self,
        id: &str,
        record: PolicyTransaction,
    ) -> Result<Option<PolicyTransaction>, RepositoryError>;

    async fn delete(&self, id: &str) -> Result<bool, RepositoryError>;

    async fn count(&self, filters: &PolicyFilters) -> Result<usize, RepositoryError>;

    async fn exists(&self, id: &str) -> Result<bool, RepositoryError>;
}

/// Error enumeration for repository failures.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("storage io failure: {0}")]
    Io(#[from] std::io::Error),
    #[error("stored policy data is malformed: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}

pub(crate) fn stamp_created(mut record: PolicyTransaction, now: DateTime<Utc>) -> PolicyTransaction {
    if record.id.as_deref().map_or(true, str::is_empty) {
        record.id = Some(Uuid::new_v4().to_string());
    }
    record.created_at = Some(now);
    record.updated_at = Some(now);
    record.transaction_date.get_or_insert(now);
    record
}

/// `updated_at` strictly advances past the stored value even when the clock
/// has not.
pub(crate) fn stamp_updated(
    mut record: PolicyTransaction,
    existing: &PolicyTransaction,
    now: DateTime<Utc>,
) -> PolicyTransaction {
    let now = match existing.updated_at {
        Some(previous) if now <= previous => previous + Duration::microseconds(1),
        _ => now,
    };

    record.id = existing.id.clone();
    record.created_at = existing.created_at;
    record.updated_at = Some(now);
    if record.transaction_date.is_none() {
        record.transaction_date = existing.transaction_date;
    }
    if record.created_by.is_none() {
        record.created_by = existing.created_by.clone();
    }
    record
}

/// Filter, order newest-created first, then page. `records` is in insertion
/// order; ties on `created_at` resolve to the most recently inserted.
pub(crate) fn select<'a, I>(
    records: I,
    skip: usize,
    limit: usize,
    filters: &PolicyFilters,
) -> Vec<PolicyTransaction>
where
    I: DoubleEndedIterator<Item = &'a PolicyTransaction>,
{
    let mut matching: Vec<&PolicyTransaction> =
        records.rev().filter(|record| filters.matches(record)).collect();
    matching.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    matching
        .into_iter()
        .skip(skip)
        .take(limit)
        .cloned()
        .collect()
}
