use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::fields::{FieldMap, FieldValue};
use super::validation::{ValidationError, Violations};

pub const DEFAULT_CURRENCY: &str = "USD";

fn default_currency() -> String {
    DEFAULT_CURRENCY.to_string()
}

/// Normalized storage shape shared by every carrier and product.
///
/// Fields that are not standardized across carriers live in `custom_fields`
/// and are owned by the carrier's mapper. `id`, `created_at`, and
/// `updated_at` are assigned by the repository.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PolicyTransaction {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub policy_number: String,
    pub transaction_type: String,
    pub effective_date: NaiveDate,
    pub expiration_date: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transaction_date: Option<DateTime<Utc>>,
    pub carrier_code: String,
    pub product_code: String,
    pub premium: Decimal,
    #[serde(default = "default_currency")]
    pub currency: String,
    pub risk_state: String,
    #[serde(default)]
    pub risk_zip: Option<String>,
    pub status: String,
    #[serde(default)]
    pub custom_fields: FieldMap,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub created_by: Option<String>,
    #[serde(default)]
    pub updated_by: Option<String>,
}

impl PolicyTransaction {
    /// Names of the scalar fields carried directly on the record. Mappers
    /// never duplicate these inside `custom_fields`.
    pub const STANDARD_FIELDS: &'static [&'static str] = &[
        "id",
        "policy_number",
        "transaction_type",
        "effective_date",
        "expiration_date",
        "transaction_date",
        "carrier_code",
        "product_code",
        "premium",
        "currency",
        "risk_state",
        "risk_zip",
        "status",
        "created_at",
        "updated_at",
        "created_by",
        "updated_by",
    ];

    /// Prefix addressing an extension-bag entry, e.g. `custom_fields.business_name`.
    pub const CUSTOM_FIELD_PREFIX: &'static str = "custom_fields.";

    /// Look up a field by name as a [`FieldValue`] for filtering.
    ///
    /// Dates and decimals are rendered as the strings they serialize to.
    pub fn field(&self, name: &str) -> Option<FieldValue> {
        if let Some(key) = name.strip_prefix(Self::CUSTOM_FIELD_PREFIX) {
            return self.custom_fields.get(key).cloned();
        }

        let value: FieldValue = match name {
            "id" => self.id.clone().into(),
            "policy_number" => self.policy_number.as_str().into(),
            "transaction_type" => self.transaction_type.as_str().into(),
            "effective_date" => self.effective_date.to_string().into(),
            "expiration_date" => self.expiration_date.to_string().into(),
            "transaction_date" => self.transaction_date.map(|ts| ts.to_rfc3339()).into(),
            "carrier_code" => self.carrier_code.as_str().into(),
            "product_code" => self.product_code.as_str().into(),
            "premium" => self.premium.into(),
            "currency" => self.currency.as_str().into(),
            "risk_state" => self.risk_state.as_str().into(),
            "risk_zip" => self.risk_zip.clone().into(),
            "status" => self.status.as_str().into(),
            "created_at" => self.created_at.map(|ts| ts.to_rfc3339()).into(),
            "updated_at" => self.updated_at.map(|ts| ts.to_rfc3339()).into(),
            "created_by" => self.created_by.clone().into(),
            "updated_by" => self.updated_by.clone().into(),
            _ => return None,
        };
        Some(value)
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        let mut violations = Violations::default();
        violations.length("policy_number", &self.policy_number, 1, 100);
        violations.length("carrier_code", &self.carrier_code, 1, 50);
        violations.length("product_code", &self.product_code, 1, 50);
        violations.non_negative("premium", self.premium);
        violations.length("currency", &self.currency, 0, 3);
        violations.length("risk_state", &self.risk_state, 2, 2);
        if let Some(zip) = &self.risk_zip {
            violations.length("risk_zip", zip, 0, 10);
        }
        violations.finish()
    }
}
