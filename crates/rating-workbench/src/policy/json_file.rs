use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::Mutex;
use tracing::debug;

use super::filters::PolicyFilters;
use super::record::PolicyTransaction;
use super::repository::{select, stamp_created, stamp_updated, PolicyRepository, RepositoryError};

pub const DATA_FILE_NAME: &str = "policy_transactions.json";

/// Repository persisting every record as one pretty-printed JSON array.
///
/// Each mutation rewrites the whole file. Writers inside this process are
/// serialized; separate processes sharing a file can lose updates.
#[derive(Debug)]
pub struct JsonFilePolicyRepository {
    file_path: PathBuf,
    write_lock: Mutex<()>,
}

impl JsonFilePolicyRepository {
    /// Open (creating if needed) `<data_dir>/policy_transactions.json`.
    pub async fn open(data_dir: impl AsRef<Path>) -> Result<Self, RepositoryError> {
        let data_dir = data_dir.as_ref();
        tokio::fs::create_dir_all(data_dir).await?;

        let repository = Self {
            file_path: data_dir.join(DATA_FILE_NAME),
            write_lock: Mutex::new(()),
        };

        if tokio::fs::metadata(&repository.file_path).await.is_err() {
            repository.write_all(&[]).await?;
        }
        Ok(repository)
    }

    pub fn file_path(&self) -> &Path {
        &self.file_path
    }

    async fn read_all(&self) -> Result<Vec<PolicyTransaction>, RepositoryError> {
        let bytes = match tokio::fs::read(&self.file_path).await {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(err) => return Err(err.into()),
        };

        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(Vec::new());
        }
        Ok(serde_json::from_slice(&bytes)?)
    }

    /// Write to a sibling temp file and rename so readers never see a partial array.
    async fn write_all(&self, records: &[PolicyTransaction]) -> Result<(), RepositoryError> {
        let payload = serde_json::to_vec_pretty(records)?;
        let staging = self.file_path.with_extension("json.tmp");
        tokio::fs::write(&staging, payload).await?;
        tokio::fs::rename(&staging, &self.file_path).await?;
        debug!(path = %self.file_path.display(), records = records.len(), "policy file written");
        Ok(())
    }
}

#[async_trait]
impl PolicyRepository for JsonFilePolicyRepository {
    async fn get(&self, id: &str) -> Result<Option<PolicyTransaction>, RepositoryError> {
        let records = self.read_all().await?;
        Ok(records
            .into_iter()
            .find(|record| record.id.as_deref() == Some(id)))
    }

    async fn list(
        &self,
        skip: usize,
        limit: usize,
        filters: &PolicyFilters,
    ) -> Result<Vec<PolicyTransaction>, RepositoryError> {
        let records = self.read_all().await?;
        Ok(select(records.iter(), skip, limit, filters))
    }

    async fn create(
        &self,
        record: PolicyTransaction,
    ) -> Result<PolicyTransaction, RepositoryError> {
        let _guard = self.write_lock.lock().await;
        let mut records = self.read_all().await?;
        let stored = stamp_created(record, Utc::now());
        records.push(stored.clone());
        self.write_all(&records).await?;
        Ok(stored)
    }

    async fn update(
        &self,
        id: &str,
        record: PolicyTransaction,
    ) -> Result<Option<PolicyTransaction>, RepositoryError> {
        let _guard = self.write_lock.lock().await;
        let mut records = self.read_all().await?;
        let Some(slot) = records
            .iter_mut()
            .find(|record| record.id.as_deref() == Some(id))
        else {
            return Ok(None);
        };

        let updated = stamp_updated(record, slot, Utc::now());
        *slot = updated.clone();
        self.write_all(&records).await?;
        Ok(Some(updated))
    }

    async fn delete(&self, id: &str) -> Result<bool, RepositoryError> {
        let _guard = self.write_lock.lock().await;
        let mut records = self.read_all().await?;
        let before = records.len();
        records.retain(|record| record.id.as_deref() != Some(id));

        if records.len() == before {
            return Ok(false);
        }
        self.write_all(&records).await?;
        Ok(true)
    }

    async fn count(&self, filters: &PolicyFilters) -> Result<usize, RepositoryError> {
        let records = self.read_all().await?;
        Ok(records.iter().filter(|record| filters.matches(record)).count())
    }

    async fn exists(&self, id: &str) -> Result<bool, RepositoryError> {
        let records = self.read_all().await?;
        Ok(records.iter().any(|record| record.id.as_deref() == Some(id)))
    }
}
