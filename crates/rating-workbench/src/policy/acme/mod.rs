//! ACME Commercial Package: custom model, mapper, and HTTP surface.

pub mod mapper;
pub mod model;
pub mod router;

pub use mapper::AcmeCommercialPackageMapper;
pub use model::{
    AcmeCommercialPackagePolicy, AcmeCommercialPackagePolicyUpdate, Coverage, CoverageType,
    Employee, Location, PropertyType, UnknownCode,
};
pub use router::acme_policy_router;
