use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::Utc;

use super::filters::PolicyFilters;
use super::record::PolicyTransaction;
use super::repository::{select, stamp_created, stamp_updated, PolicyRepository, RepositoryError};

/// Process-local repository used by tests and the CLI demo.
#[derive(Debug, Default)]
pub struct InMemoryPolicyRepository {
    records: Mutex<Vec<PolicyTransaction>>,
}

impl InMemoryPolicyRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn records(&self) -> Result<MutexGuard<'_, Vec<PolicyTransaction>>, RepositoryError> {
        self.records
            .lock()
            .map_err(|_| RepositoryError::Unavailable("policy store mutex poisoned".to_string()))
    }
}

#[async_trait]
impl PolicyRepository for InMemoryPolicyRepository {
    async fn get(&self, id: &str) -> Result<Option<PolicyTransaction>, RepositoryError> {
        let records = self.records()?;
        Ok(records
            .iter()
            .find(|record| record.id.as_deref() == Some(id))
            .cloned())
    }

    async fn list(
        &self,
        skip: usize,
        limit: usize,
        filters: &PolicyFilters,
    ) -> Result<Vec<PolicyTransaction>, RepositoryError> {
        let records = self.records()?;
        Ok(select(records.iter(), skip, limit, filters))
    }

    async fn create(
        &self,
        record: PolicyTransaction,
    ) -> Result<PolicyTransaction, RepositoryError> {
        let stored = stamp_created(record, Utc::now());
        self.records()?.push(stored.clone());
        Ok(stored)
    }

    async fn update(
        &self,
        id: &str,
        record: PolicyTransaction,
    ) -> Result<Option<PolicyTransaction>, RepositoryError> {
        let mut records = self.records()?;
        let Some(slot) = records
            .iter_mut()
            .find(|record| record.id.as_deref() == Some(id))
        else {
            return Ok(None);
        };

        let updated = stamp_updated(record, slot, Utc::now());
        *slot = updated.clone();
        Ok(Some(updated))
    }

    async fn delete(&self, id: &str) -> Result<bool, RepositoryError> {
        let mut records = self.records()?;
        let before = records.len();
        records.retain(|record| record.id.as_deref() != Some(id));
        Ok(records.len() < before)
    }

    async fn count(&self, filters: &PolicyFilters) -> Result<usize, RepositoryError> {
        let records = self.records()?;
        Ok(records.iter().filter(|record| filters.matches(record)).count())
    }

    async fn exists(&self, id: &str) -> Result<bool, RepositoryError> {
        let records = self.records()?;
        Ok(records.iter().any(|record| record.id.as_deref() == Some(id)))
    }
}
