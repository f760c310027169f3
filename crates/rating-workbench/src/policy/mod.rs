//! Policy mapping, registry, and persistence.
//!
//! A [`PolicyMapper`] owns one carrier/product model and translates it to and
//! from [`PolicyTransaction`]. Standardized fields live on the record;
//! everything else travels in `custom_fields`. Repositories persist records
//! without knowing any carrier model.

pub mod acme;
pub mod fields;
pub mod filters;
pub mod json_file;
pub mod mapper;
pub mod memory;
pub mod record;
pub mod registry;
pub mod repository;
pub mod router;
pub mod service;
pub mod validation;

#[cfg(test)]
pub(crate) mod tests;

pub use acme::{
    acme_policy_router, AcmeCommercialPackageMapper, AcmeCommercialPackagePolicy,
    AcmeCommercialPackagePolicyUpdate,
};
pub use fields::{DecodeError, FieldMap, FieldReader, FieldValue};
pub use filters::{FilterValue, PolicyFilters};
pub use json_file::JsonFilePolicyRepository;
pub use mapper::{DynPolicyMapper, MapperKey, MappingError, PolicyMapper};
pub use memory::InMemoryPolicyRepository;
pub use record::PolicyTransaction;
pub use registry::{MapperRegistry, RegistryError};
pub use repository::{PolicyRepository, RepositoryError};
pub use router::registry_router;
pub use service::{PolicyTransactionService, ServiceError};
pub use validation::{FieldViolation, ValidationError};
