use std::sync::Arc;

use tracing::debug;

use super::fields::DecodeError;
use super::filters::PolicyFilters;
use super::mapper::PolicyMapper;
use super::repository::{PolicyRepository, RepositoryError};
use super::validation::ValidationError;

/// Service sequencing one carrier mapper around a repository.
///
/// `R` may be `dyn PolicyRepository` when the backend is chosen at runtime.
pub struct PolicyTransactionService<R: ?Sized, M> {
    repository: Arc<R>,
    mapper: Arc<M>,
}

impl<R, M> PolicyTransactionService<R, M>
where
    R: PolicyRepository + ?Sized,
    M: PolicyMapper,
{
    pub fn new(repository: Arc<R>, mapper: Arc<M>) -> Self {
        Self { repository, mapper }
    }

    pub fn mapper(&self) -> &M {
        &self.mapper
    }

    pub async fn get(&self, id: &str) -> Result<Option<M::Custom>, ServiceError> {
        match self.repository.get(id).await? {
            Some(common) => Ok(Some(self.mapper.to_custom(&common)?)),
            None => Ok(None),
        }
    }

    pub async fn list(
        &self,
        skip: usize,
        limit: usize,
        filters: &PolicyFilters,
    ) -> Result<Vec<M::Custom>, ServiceError> {
        let records = self.repository.list(skip, limit, filters).await?;
        records
            .iter()
            .map(|common| self.mapper.to_custom(common).map_err(ServiceError::from))
            .collect()
    }

    /// Store a new policy; the returned model carries the assigned id and timestamps.
    ///
    /// The mapped common record must satisfy [`PolicyTransaction::validate`]
    /// or nothing is written.
    ///
    /// [`PolicyTransaction::validate`]: super::PolicyTransaction::validate
    pub async fn create(&self, custom: M::Custom) -> Result<M::Custom, ServiceError> {
        let common = self.mapper.to_common(&custom);
        common.validate()?;
        let created = self.repository.create(common).await?;
        debug!(
            id = created.id.as_deref().unwrap_or_default(),
            carrier = self.mapper.carrier_code(),
            product = self.mapper.product_code(),
            "policy transaction created"
        );
        Ok(self.mapper.to_custom(&created)?)
    }

    pub async fn update(
        &self,
        id: &str,
        custom: M::Custom,
    ) -> Result<Option<M::Custom>, ServiceError> {
        let common = self.mapper.to_common(&custom);
        common.validate()?;
        match self.repository.update(id, common).await? {
            Some(updated) => {
                debug!(id, "policy transaction updated");
                Ok(Some(self.mapper.to_custom(&updated)?))
            }
            None => Ok(None),
        }
    }

    pub async fn delete(&self, id: &str) -> Result<bool, ServiceError> {
        let deleted = self.repository.delete(id).await?;
        if deleted {
            debug!(id, "policy transaction deleted");
        }
        Ok(deleted)
    }

    pub async fn count(&self, filters: &PolicyFilters) -> Result<usize, ServiceError> {
        Ok(self.repository.count(filters).await?)
    }

    pub async fn exists(&self, id: &str) -> Result<bool, ServiceError> {
        Ok(self.repository.exists(id).await?)
    }
}

/// Error raised by the policy service.
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error(transparent)]
    Repository(#[from] RepositoryError),
    #[error("stored policy could not be decoded: {0}")]
    Decode(#[from] DecodeError),
    #[error("policy record rejected: {0}")]
    Invalid(#[from] ValidationError),
}
