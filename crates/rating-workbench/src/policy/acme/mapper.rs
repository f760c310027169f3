use rust_decimal::Decimal;

use super::model::{AcmeCommercialPackagePolicy, Coverage, Employee, Location};
use crate::policy::fields::{DecodeError, FieldMap, FieldReader, FieldValue};
use crate::policy::mapper::PolicyMapper;
use crate::policy::record::{PolicyTransaction, DEFAULT_CURRENCY};

pub const CARRIER_CODE: &str = "ACME";
pub const PRODUCT_CODE: &str = "COMMERCIAL_PACKAGE";
pub const POLICY_PREFIX: &str = "ACME-";
pub const DEFAULT_PAYMENT_PLAN: &str = "quarterly";

/// Maps ACME Commercial Package policies onto [`PolicyTransaction`].
#[derive(Debug, Clone, Copy, Default)]
pub struct AcmeCommercialPackageMapper;

impl PolicyMapper for AcmeCommercialPackageMapper {
    type Custom = AcmeCommercialPackagePolicy;

    fn carrier_code(&self) -> &'static str {
        CARRIER_CODE
    }

    fn product_code(&self) -> &'static str {
        PRODUCT_CODE
    }

    fn policy_prefix(&self) -> Option<&'static str> {
        Some(POLICY_PREFIX)
    }

    fn to_common(&self, custom: &AcmeCommercialPackagePolicy) -> PolicyTransaction {
        PolicyTransaction {
            id: custom.id.clone(),
            policy_number: custom.policy_number.clone(),
            transaction_type: custom.transaction_type.clone(),
            effective_date: custom.effective_date,
            expiration_date: custom.expiration_date,
            transaction_date: None,
            carrier_code: CARRIER_CODE.to_string(),
            product_code: PRODUCT_CODE.to_string(),
            premium: custom.total_premium,
            currency: DEFAULT_CURRENCY.to_string(),
            risk_state: custom.risk_state.clone(),
            risk_zip: Some(custom.risk_zip.clone()).filter(|zip| !zip.is_empty()),
            status: custom.status.clone(),
            custom_fields: custom_fields(custom),
            created_at: custom.created_at,
            updated_at: custom.updated_at,
            created_by: None,
            updated_by: None,
        }
    }

    fn to_custom(
        &self,
        common: &PolicyTransaction,
    ) -> Result<AcmeCommercialPackagePolicy, DecodeError> {
        let fields = FieldReader::new(&common.custom_fields);

        Ok(AcmeCommercialPackagePolicy {
            id: common.id.clone(),
            policy_number: common.policy_number.clone(),
            effective_date: common.effective_date,
            expiration_date: common.expiration_date,
            transaction_type: common.transaction_type.clone(),
            risk_state: common.risk_state.clone(),
            risk_zip: common.risk_zip.clone().unwrap_or_default(),
            business_name: fields.text_or("business_name", "")?,
            dba_name: fields.optional_text("dba_name")?,
            business_type: fields.text_or("business_type", "")?,
            industry_code: fields.text_or("industry_code", "")?,
            years_in_business: fields.count_or("years_in_business", 0)?,
            contact_name: fields.text_or("contact_name", "")?,
            contact_email: fields.optional_text("contact_email")?,
            contact_phone: fields.text_or("contact_phone", "")?,
            underwriter_code: fields.text_or("underwriter_code", "")?,
            underwriter_name: fields.text_or("underwriter_name", "")?,
            producer_code: fields.text_or("producer_code", "")?,
            producer_name: fields.text_or("producer_name", "")?,
            locations: fields.list_of("locations", decode_location)?,
            employees: fields.list_of("employees", decode_employee)?,
            coverages: fields.list_of("coverages", decode_coverage)?,
            total_premium: common.premium,
            payment_plan: fields.text_or("payment_plan", DEFAULT_PAYMENT_PLAN)?,
            commission_rate: fields.decimal_or("commission_rate", Decimal::ZERO)?,
            status: common.status.clone(),
            created_at: common.created_at,
            updated_at: common.updated_at,
        })
    }
}

fn custom_fields(custom: &AcmeCommercialPackagePolicy) -> FieldMap {
    let mut fields = FieldMap::new();

    fields.insert("business_name".into(), custom.business_name.as_str().into());
    fields.insert("dba_name".into(), custom.dba_name.clone().into());
    fields.insert("business_type".into(), custom.business_type.as_str().into());
    fields.insert("industry_code".into(), custom.industry_code.as_str().into());
    fields.insert("years_in_business".into(), custom.years_in_business.into());

    fields.insert("contact_name".into(), custom.contact_name.as_str().into());
    fields.insert("contact_email".into(), custom.contact_email.clone().into());
    fields.insert("contact_phone".into(), custom.contact_phone.as_str().into());

    fields.insert("underwriter_code".into(), custom.underwriter_code.as_str().into());
    fields.insert("underwriter_name".into(), custom.underwriter_name.as_str().into());
    fields.insert("producer_code".into(), custom.producer_code.as_str().into());
    fields.insert("producer_name".into(), custom.producer_name.as_str().into());

    fields.insert(
        "locations".into(),
        custom.locations.iter().map(encode_location).collect::<Vec<_>>().into(),
    );
    fields.insert(
        "employees".into(),
        custom.employees.iter().map(encode_employee).collect::<Vec<_>>().into(),
    );
    fields.insert(
        "coverages".into(),
        custom.coverages.iter().map(encode_coverage).collect::<Vec<_>>().into(),
    );

    fields.insert("payment_plan".into(), custom.payment_plan.as_str().into());
    fields.insert("commission_rate".into(), custom.commission_rate.into());

    fields
}

fn encode_location(location: &Location) -> FieldValue {
    let mut fields = FieldMap::new();
    fields.insert("location_id".into(), location.location_id.as_str().into());
    fields.insert("address".into(), location.address.as_str().into());
    fields.insert("city".into(), location.city.as_str().into());
    fields.insert("state".into(), location.state.as_str().into());
    fields.insert("zip_code".into(), location.zip_code.as_str().into());
    fields.insert("property_type".into(), location.property_type.code().into());
    fields.insert("building_value".into(), location.building_value.into());
    fields.insert("contents_value".into(), location.contents_value.into());
    fields.insert("square_footage".into(), location.square_footage.into());
    FieldValue::Map(fields)
}

fn decode_location(fields: &FieldReader<'_>) -> Result<Location, DecodeError> {
    Ok(Location {
        location_id: fields.required_text("location_id")?,
        address: fields.required_text("address")?,
        city: fields.required_text("city")?,
        state: fields.required_text("state")?,
        zip_code: fields.required_text("zip_code")?,
        property_type: fields.required_code("property_type")?,
        building_value: fields.required_decimal("building_value")?,
        contents_value: fields.required_decimal("contents_value")?,
        square_footage: fields.required_count("square_footage")?,
    })
}

fn encode_employee(employee: &Employee) -> FieldValue {
    let mut fields = FieldMap::new();
    fields.insert("class_code".into(), employee.class_code.as_str().into());
    fields.insert("description".into(), employee.description.as_str().into());
    fields.insert("num_employees".into(), employee.num_employees.into());
    fields.insert("annual_payroll".into(), employee.annual_payroll.into());
    FieldValue::Map(fields)
}

fn decode_employee(fields: &FieldReader<'_>) -> Result<Employee, DecodeError> {
    Ok(Employee {
        class_code: fields.required_text("class_code")?,
        description: fields.required_text("description")?,
        num_employees: fields.required_count("num_employees")?,
        annual_payroll: fields.required_decimal("annual_payroll")?,
    })
}

fn encode_coverage(coverage: &Coverage) -> FieldValue {
    let mut fields = FieldMap::new();
    fields.insert("coverage_type".into(), coverage.coverage_type.code().into());
    fields.insert("limit".into(), coverage.limit.into());
    fields.insert("deductible".into(), coverage.deductible.into());
    fields.insert("premium".into(), coverage.premium.into());
    FieldValue::Map(fields)
}

fn decode_coverage(fields: &FieldReader<'_>) -> Result<Coverage, DecodeError> {
    Ok(Coverage {
        coverage_type: fields.required_code("coverage_type")?,
        limit: fields.required_decimal("limit")?,
        deductible: fields.optional_decimal("deductible")?,
        premium: fields.required_decimal("premium")?,
    })
}
