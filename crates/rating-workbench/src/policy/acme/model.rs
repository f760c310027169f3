use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};

use crate::policy::validation::{ValidationError, Violations};

/// Occupancy classification of an insured location.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PropertyType {
    Office,
    Retail,
    Warehouse,
    Manufacturing,
    Restaurant,
}

impl PropertyType {
    pub fn code(self) -> &'static str {
        match self {
            PropertyType::Office => "office",
            PropertyType::Retail => "retail",
            PropertyType::Warehouse => "warehouse",
            PropertyType::Manufacturing => "manufacturing",
            PropertyType::Restaurant => "restaurant",
        }
    }
}

impl FromStr for PropertyType {
    type Err = UnknownCode;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "office" => Ok(Self::Office),
            "retail" => Ok(Self::Retail),
            "warehouse" => Ok(Self::Warehouse),
            "manufacturing" => Ok(Self::Manufacturing),
            "restaurant" => Ok(Self::Restaurant),
            other => Err(UnknownCode::new("property type", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CoverageType {
    GeneralLiability,
    Property,
    BusinessInterruption,
    WorkersComp,
    CommercialAuto,
}

impl CoverageType {
    pub fn code(self) -> &'static str {
        match self {
            CoverageType::GeneralLiability => "general_liability",
            CoverageType::Property => "property",
            CoverageType::BusinessInterruption => "business_interruption",
            CoverageType::WorkersComp => "workers_comp",
            CoverageType::CommercialAuto => "commercial_auto",
        }
    }
}

impl FromStr for CoverageType {
    type Err = UnknownCode;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "general_liability" => Ok(Self::GeneralLiability),
            "property" => Ok(Self::Property),
            "business_interruption" => Ok(Self::BusinessInterruption),
            "workers_comp" => Ok(Self::WorkersComp),
            "commercial_auto" => Ok(Self::CommercialAuto),
            other => Err(UnknownCode::new("coverage type", other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownCode {
    kind: &'static str,
    code: String,
}

impl UnknownCode {
    fn new(kind: &'static str, code: &str) -> Self {
        Self {
            kind,
            code: code.to_string(),
        }
    }
}

impl fmt::Display for UnknownCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown {} code '{}'", self.kind, self.code)
    }
}

impl std::error::Error for UnknownCode {}

/// Business location information.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    pub location_id: String,
    pub address: String,
    pub city: String,
    pub state: String,
    pub zip_code: String,
    pub property_type: PropertyType,
    pub building_value: Decimal,
    pub contents_value: Decimal,
    pub square_footage: u32,
}

/// Workers compensation classification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Employee {
    pub class_code: String,
    pub description: String,
    pub num_employees: u32,
    pub annual_payroll: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Coverage {
    pub coverage_type: CoverageType,
    pub limit: Decimal,
    #[serde(default)]
    pub deductible: Option<Decimal>,
    pub premium: Decimal,
}

/// ACME Commercial Package policy as exchanged with ACME integrations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AcmeCommercialPackagePolicy {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    pub policy_number: String,
    pub effective_date: NaiveDate,
    pub expiration_date: NaiveDate,
    pub transaction_type: String,

    pub risk_state: String,
    pub risk_zip: String,

    pub business_name: String,
    #[serde(default)]
    pub dba_name: Option<String>,
    pub business_type: String,
    pub industry_code: String,
    pub years_in_business: u32,

    pub contact_name: String,
    #[serde(default)]
    pub contact_email: Option<String>,
    pub contact_phone: String,

    pub underwriter_code: String,
    pub underwriter_name: String,
    pub producer_code: String,
    pub producer_name: String,

    pub locations: Vec<Location>,
    #[serde(default)]
    pub employees: Vec<Employee>,
    pub coverages: Vec<Coverage>,

    pub total_premium: Decimal,
    pub payment_plan: String,
    pub commission_rate: Decimal,

    pub status: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl AcmeCommercialPackagePolicy {
    /// Drop server-assigned fields so a client payload can be created fresh.
    pub fn without_server_fields(mut self) -> Self {
        self.id = None;
        self.created_at = None;
        self.updated_at = None;
        self
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        let mut violations = Violations::default();
        violations.length("policy_number", &self.policy_number, 1, 100);
        violations.length("risk_state", &self.risk_state, 2, 2);
        violations.length("risk_zip", &self.risk_zip, 0, 10);

        violations.at_least_one("locations", self.locations.len());
        for (index, location) in self.locations.iter().enumerate() {
            violations.length(format!("locations[{index}].state"), &location.state, 2, 2);
            violations.non_negative(
                format!("locations[{index}].building_value"),
                location.building_value,
            );
            violations.non_negative(
                format!("locations[{index}].contents_value"),
                location.contents_value,
            );
        }

        for (index, employee) in self.employees.iter().enumerate() {
            violations.non_negative(
                format!("employees[{index}].annual_payroll"),
                employee.annual_payroll,
            );
        }

        violations.at_least_one("coverages", self.coverages.len());
        for (index, coverage) in self.coverages.iter().enumerate() {
            violations.non_negative(format!("coverages[{index}].limit"), coverage.limit);
            if let Some(deductible) = coverage.deductible {
                violations.non_negative(format!("coverages[{index}].deductible"), deductible);
            }
            violations.non_negative(format!("coverages[{index}].premium"), coverage.premium);
        }

        violations.non_negative("total_premium", self.total_premium);
        violations.within(
            "commission_rate",
            self.commission_rate,
            Decimal::ZERO,
            Decimal::ONE_HUNDRED,
        );
        violations.finish()
    }
}

/// Distinguishes an explicit `null` (`Some(None)`) from an absent key (`None`).
fn present<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// Partial update payload; only provided fields replace the stored values.
///
/// `dba_name` and `contact_email` are cleared by an explicit `null`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AcmeCommercialPackagePolicyUpdate {
    pub policy_number: Option<String>,
    pub effective_date: Option<NaiveDate>,
    pub expiration_date: Option<NaiveDate>,
    pub business_name: Option<String>,
    #[serde(deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub dba_name: Option<Option<String>>,
    pub contact_name: Option<String>,
    #[serde(deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub contact_email: Option<Option<String>>,
    pub contact_phone: Option<String>,
    pub locations: Option<Vec<Location>>,
    pub employees: Option<Vec<Employee>>,
    pub coverages: Option<Vec<Coverage>>,
    pub total_premium: Option<Decimal>,
    pub payment_plan: Option<String>,
    pub status: Option<String>,
}

impl AcmeCommercialPackagePolicyUpdate {
    pub fn apply_to(self, policy: &mut AcmeCommercialPackagePolicy) {
        fn replace<T>(slot: &mut T, value: Option<T>) {
            if let Some(value) = value {
                *slot = value;
            }
        }

        replace(&mut policy.policy_number, self.policy_number);
        replace(&mut policy.effective_date, self.effective_date);
        replace(&mut policy.expiration_date, self.expiration_date);
        replace(&mut policy.business_name, self.business_name);
        replace(&mut policy.dba_name, self.dba_name);
        replace(&mut policy.contact_name, self.contact_name);
        replace(&mut policy.contact_email, self.contact_email);
        replace(&mut policy.contact_phone, self.contact_phone);
        replace(&mut policy.locations, self.locations);
        replace(&mut policy.employees, self.employees);
        replace(&mut policy.coverages, self.coverages);
        replace(&mut policy.total_premium, self.total_premium);
        replace(&mut policy.payment_plan, self.payment_plan);
        replace(&mut policy.status, self.status);
    }
}
