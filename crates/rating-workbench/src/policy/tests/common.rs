use std::sync::Arc;

use async_trait::async_trait;
use axum::response::Response;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde_json::Value;

use crate::policy::acme::{
    AcmeCommercialPackageMapper, AcmeCommercialPackagePolicy, Coverage, CoverageType, Employee,
    Location, PropertyType,
};
use crate::policy::filters::PolicyFilters;
use crate::policy::mapper::PolicyMapper;
use crate::policy::memory::InMemoryPolicyRepository;
use crate::policy::record::PolicyTransaction;
use crate::policy::repository::{PolicyRepository, RepositoryError};
use crate::policy::service::PolicyTransactionService;

pub(crate) type AcmeService<R> = PolicyTransactionService<R, AcmeCommercialPackageMapper>;

pub(crate) fn sample_policy() -> AcmeCommercialPackagePolicy {
    AcmeCommercialPackagePolicy {
        id: None,
        policy_number: "ACME-CPP-2024-001234".to_string(),
        effective_date: NaiveDate::from_ymd_opt(2024, 1, 1).expect("valid date"),
        expiration_date: NaiveDate::from_ymd_opt(2025, 1, 1).expect("valid date"),
        transaction_type: "new_business".to_string(),
        risk_state: "CA".to_string(),
        risk_zip: "94105".to_string(),
        business_name: "Acme Widgets LLC".to_string(),
        dba_name: None,
        business_type: "LLC".to_string(),
        industry_code: "332710".to_string(),
        years_in_business: 12,
        contact_name: "Dana Reyes".to_string(),
        contact_email: Some("dana@acmewidgets.example".to_string()),
        contact_phone: "415-555-0134".to_string(),
        underwriter_code: "UW-17".to_string(),
        underwriter_name: "Priya Natarajan".to_string(),
        producer_code: "PR-2201".to_string(),
        producer_name: "Bayside Insurance Brokers".to_string(),
        locations: vec![Location {
            location_id: "LOC-1".to_string(),
            address: "100 Market St".to_string(),
            city: "San Francisco".to_string(),
            state: "CA".to_string(),
            zip_code: "94105".to_string(),
            property_type: PropertyType::Office,
            building_value: Decimal::new(100_000, 0),
            contents_value: Decimal::new(20_000, 0),
            square_footage: 4_500,
        }],
        employees: vec![Employee {
            class_code: "8810".to_string(),
            description: "Clerical office employees".to_string(),
            num_employees: 6,
            annual_payroll: Decimal::new(42_000_000, 2),
        }],
        coverages: vec![Coverage {
            coverage_type: CoverageType::GeneralLiability,
            limit: Decimal::new(1_000_000, 0),
            deductible: Some(Decimal::new(1_000, 0)),
            premium: Decimal::new(500, 0),
        }],
        total_premium: Decimal::new(50_000, 2),
        payment_plan: "annual".to_string(),
        commission_rate: Decimal::new(150, 1),
        status: "quoted".to_string(),
        created_at: None,
        updated_at: None,
    }
}

pub(crate) fn policy_with_status(status: &str) -> AcmeCommercialPackagePolicy {
    let mut policy = sample_policy();
    policy.status = status.to_string();
    policy
}

/// Common record for repository-level tests, built through the ACME mapper.
pub(crate) fn record_with_status(status: &str) -> PolicyTransaction {
    AcmeCommercialPackageMapper.to_common(&policy_with_status(status))
}

pub(crate) fn memory_service() -> (
    Arc<AcmeService<InMemoryPolicyRepository>>,
    Arc<InMemoryPolicyRepository>,
) {
    let repository = Arc::new(InMemoryPolicyRepository::new());
    let service = Arc::new(PolicyTransactionService::new(
        repository.clone(),
        Arc::new(AcmeCommercialPackageMapper),
    ));
    (service, repository)
}

/// Repository whose every call fails, simulating a lost storage backend.
pub(crate) struct UnavailableRepository;

fn unavailable() -> RepositoryError {
    RepositoryError::Unavailable("storage offline".to_string())
}

#[async_trait]
impl PolicyRepository for UnavailableRepository {
    async fn get(&self, _id: &str) -> Result<Option<PolicyTransaction>, RepositoryError> {
        Err(unavailable())
    }

    async fn list(
        &self,
        _skip: usize,
        _limit: usize,
        _filters: &PolicyFilters,
    ) -> Result<Vec<PolicyTransaction>, RepositoryError> {
        Err(unavailable())
    }

    async fn create(
        &self,
        _record: PolicyTransaction,
    ) -> Result<PolicyTransaction, RepositoryError> {
        Err(unavailable())
    }

    async fn update(
        &self,
        _id: &str,
        _record: PolicyTransaction,
    ) -> Result<Option<PolicyTransaction>, RepositoryError> {
        Err(unavailable())
    }

    async fn delete(&self, _id: &str) -> Result<bool, RepositoryError> {
        Err(unavailable())
    }

    async fn count(&self, _filters: &PolicyFilters) -> Result<usize, RepositoryError> {
        Err(unavailable())
    }

    async fn exists(&self, _id: &str) -> Result<bool, RepositoryError> {
        Err(unavailable())
    }
}

pub(crate) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 1024 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
