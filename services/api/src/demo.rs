use chrono::NaiveDate;
use clap::Args;
use rating_workbench::config::{StorageBackend, StorageConfig};
use rating_workbench::error::AppError;
use rating_workbench::policy::acme::{
    AcmeCommercialPackagePolicy, Coverage, CoverageType, Employee, Location, PropertyType,
};
use rating_workbench::policy::{
    AcmeCommercialPackageMapper, MapperRegistry, PolicyFilters, PolicyTransactionService,
};
use rust_decimal::Decimal;
use std::path::PathBuf;

use crate::infra::open_repository;

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Persist the demo policy to `<DIR>/policy_transactions.json` instead of memory.
    #[arg(long)]
    pub(crate) data_dir: Option<PathBuf>,
    /// Policy number of the sample policy (must start with ACME- to resolve).
    #[arg(long, default_value = "ACME-CPP-2024-001234")]
    pub(crate) policy_number: String,
    /// Print the stored common record alongside the custom model.
    #[arg(long)]
    pub(crate) show_record: bool,
}

pub(crate) async fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let DemoArgs {
        data_dir,
        policy_number,
        show_record,
    } = args;

    let storage = match data_dir {
        Some(data_dir) => StorageConfig {
            backend: StorageBackend::JsonFile,
            data_dir,
        },
        None => StorageConfig {
            backend: StorageBackend::Memory,
            data_dir: PathBuf::new(),
        },
    };

    let registry = MapperRegistry::with_builtin_mappers()?;
    println!("Policy mapping demo");
    println!(
        "Registered mappers: {}",
        registry
            .list_registered()
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(", ")
    );

    match registry.get_mapper_by_policy_number(&policy_number) {
        Some(mapper) => println!("{} resolves to {}", policy_number, mapper.identity()),
        None => {
            println!("{} does not match any registered prefix", policy_number);
            return Ok(());
        }
    }

    let mapper = registry.get_typed::<AcmeCommercialPackageMapper>("ACME", "COMMERCIAL_PACKAGE")?;
    let repository = open_repository(&storage).await?;
    let service = PolicyTransactionService::new(repository.clone(), mapper);

    let created = service.create(demo_policy(&policy_number)).await?;
    let id = created.id.clone().unwrap_or_default();
    println!("\nStored policy {}", id);
    println!(
        "  {} | premium {} | {} location(s) | {} coverage(s)",
        created.business_name,
        created.total_premium,
        created.locations.len(),
        created.coverages.len()
    );

    if show_record {
        if let Some(record) = repository.get(&id).await? {
            match serde_json::to_string_pretty(&record) {
                Ok(json) => println!("\nCommon record:\n{}", json),
                Err(err) => println!("\nCommon record unavailable: {}", err),
            }
        }
    }

    match service.get(&id).await? {
        Some(policy) => match serde_json::to_string_pretty(&policy) {
            Ok(json) => println!("\nRead back through the ACME mapper:\n{}", json),
            Err(err) => println!("\nCustom model unavailable: {}", err),
        },
        None => println!("\nRepository lookup returned no record"),
    }

    let total = service.count(&PolicyFilters::new()).await?;
    println!("\nPolicies in storage: {}", total);
    Ok(())
}

fn demo_policy(policy_number: &str) -> AcmeCommercialPackagePolicy {
    let date = |year, month, day| NaiveDate::from_ymd_opt(year, month, day).unwrap_or_default();

    AcmeCommercialPackagePolicy {
        id: None,
        policy_number: policy_number.to_string(),
        effective_date: date(2024, 1, 1),
        expiration_date: date(2025, 1, 1),
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
            annual_payroll: Decimal::new(420_000, 0),
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
