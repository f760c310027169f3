use std::collections::BTreeMap;
use std::str::FromStr;

use rust_decimal::Decimal;

use super::fields::FieldValue;
use super::record::PolicyTransaction;

/// A single filter condition on one record field.
#[derive(Debug, Clone, PartialEq)]
pub enum FilterValue {
    Equals(FieldValue),
    OneOf(Vec<FieldValue>),
}

impl FilterValue {
    pub fn matches(&self, candidate: &FieldValue) -> bool {
        match self {
            FilterValue::Equals(expected) => same_value(expected, candidate),
            FilterValue::OneOf(allowed) => {
                allowed.iter().any(|value| same_value(value, candidate))
            }
        }
    }
}

/// Decimal strings compare by value, so `500` matches a stored `500.00`.
fn same_value(expected: &FieldValue, candidate: &FieldValue) -> bool {
    if let (FieldValue::Text(left), FieldValue::Text(right)) = (expected, candidate) {
        if let (Ok(left), Ok(right)) = (Decimal::from_str(left), Decimal::from_str(right)) {
            return left == right;
        }
    }
    expected == candidate
}

/// Field-name keyed conditions; a record matches when every condition holds.
///
/// A condition on a field the record does not have never matches.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PolicyFilters {
    conditions: BTreeMap<String, FilterValue>,
}

impl PolicyFilters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_equals(mut self, field: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        self.insert(field, FilterValue::Equals(value.into()));
        self
    }

    pub fn with_one_of<I, V>(mut self, field: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<FieldValue>,
    {
        let values = values.into_iter().map(Into::into).collect();
        self.insert(field, FilterValue::OneOf(values));
        self
    }

    pub fn insert(&mut self, field: impl Into<String>, condition: FilterValue) {
        self.conditions.insert(field.into(), condition);
    }

    pub fn matches(&self, record: &PolicyTransaction) -> bool {
        self.conditions.iter().all(|(field, condition)| {
            record
                .field(field)
                .is_some_and(|value| condition.matches(&value))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rust_decimal::Decimal;

    fn record(status: &str) -> PolicyTransaction {
        PolicyTransaction {
            id: Some(format!("id-{status}")),
            policy_number: "ACME-CPP-1".to_string(),
            transaction_type: "new_business".to_string(),
            effective_date: NaiveDate::from_ymd_opt(2024, 1, 1).expect("valid"),
            expiration_date: NaiveDate::from_ymd_opt(2025, 1, 1).expect("valid"),
            transaction_date: None,
            carrier_code: "ACME".to_string(),
            product_code: "COMMERCIAL_PACKAGE".to_string(),
            premium: Decimal::new(50000, 2),
            currency: "USD".to_string(),
            risk_state: "CA".to_string(),
            risk_zip: None,
            status: status.to_string(),
            custom_fields: Default::default(),
            created_at: None,
            updated_at: None,
            created_by: None,
            updated_by: None,
        }
    }

    #[test]
    fn empty_filters_match_everything() {
        assert!(PolicyFilters::new().matches(&record("quoted")));
    }

    #[test]
    fn equality_and_membership() {
        let bound = PolicyFilters::new().with_equals("status", "bound");
        assert!(bound.matches(&record("bound")));
        assert!(!bound.matches(&record("quoted")));

        let either = PolicyFilters::new().with_one_of("status", ["quoted", "bound"]);
        assert!(either.matches(&record("bound")));
        assert!(either.matches(&record("quoted")));
        assert!(!either.matches(&record("cancelled")));
    }

    #[test]
    fn all_conditions_must_hold() {
        let filters = PolicyFilters::new()
            .with_equals("status", "bound")
            .with_equals("carrier_code", "OTHER");
        assert!(!filters.matches(&record("bound")));
    }

    #[test]
    fn unknown_fields_never_match() {
        let filters = PolicyFilters::new().with_equals("category", "auto");
        assert!(!filters.matches(&record("bound")));
    }

    #[test]
    fn premium_compares_as_decimal_string() {
        let filters = PolicyFilters::new().with_equals("premium", Decimal::new(50000, 2));
        assert!(filters.matches(&record("bound")));
    }

    #[test]
    fn premium_matches_regardless_of_scale() {
        let whole = PolicyFilters::new().with_equals("premium", Decimal::new(500, 0));
        assert!(whole.matches(&record("bound")));

        let listed = PolicyFilters::new().with_one_of("premium", ["499.99", "500.0"]);
        assert!(listed.matches(&record("bound")));

        let other = PolicyFilters::new().with_equals("premium", Decimal::new(50001, 2));
        assert!(!other.matches(&record("bound")));
    }
}
