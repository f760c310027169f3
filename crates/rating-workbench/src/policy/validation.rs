use rust_decimal::Decimal;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldViolation {
    pub field: String,
    pub message: String,
}

/// Every field constraint a payload failed, in declaration order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, thiserror::Error)]
#[error("{} field constraint(s) violated", .violations.len())]
pub struct ValidationError {
    pub violations: Vec<FieldViolation>,
}

impl ValidationError {
    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.violations.iter().map(|violation| violation.field.as_str())
    }
}

#[derive(Default)]
pub(crate) struct Violations(Vec<FieldViolation>);

impl Violations {
    pub(crate) fn push(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.0.push(FieldViolation {
            field: field.into(),
            message: message.into(),
        });
    }

    pub(crate) fn length(&mut self, field: impl Into<String>, value: &str, min: usize, max: usize) {
        let len = value.chars().count();
        if len < min || len > max {
            let message = if min == max {
                format!("must be exactly {min} characters")
            } else {
                format!("must be between {min} and {max} characters")
            };
            self.push(field, message);
        }
    }

    pub(crate) fn non_negative(&mut self, field: impl Into<String>, value: Decimal) {
        if value.is_sign_negative() && !value.is_zero() {
            self.push(field, "must be greater than or equal to 0");
        }
    }

    pub(crate) fn within(&mut self, field: impl Into<String>, value: Decimal, min: Decimal, max: Decimal) {
        if value < min || value > max {
            self.push(field, format!("must be between {min} and {max}"));
        }
    }

    pub(crate) fn at_least_one(&mut self, field: impl Into<String>, len: usize) {
        if len == 0 {
            self.push(field, "must contain at least one entry");
        }
    }

    pub(crate) fn finish(self) -> Result<(), ValidationError> {
        if self.0.is_empty() {
            Ok(())
        } else {
            Err(ValidationError { violations: self.0 })
        }
    }
}
