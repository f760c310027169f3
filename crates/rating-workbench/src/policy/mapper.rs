use std::any::Any;
use std::fmt;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use super::fields::DecodeError;
use super::record::PolicyTransaction;

/// Bidirectional translation between one carrier/product model and
/// [`PolicyTransaction`].
///
/// Implementations are stateless. `to_common` takes carrier and product
/// codes from the mapper itself so a record can never be stored under the
/// wrong identity.
pub trait PolicyMapper: Send + Sync + 'static {
    type Custom: Send + Sync;

    fn carrier_code(&self) -> &'static str;

    fn product_code(&self) -> &'static str;

    /// Policy-number prefix recognized by [`MapperRegistry::get_mapper_by_policy_number`].
    ///
    /// [`MapperRegistry::get_mapper_by_policy_number`]: super::MapperRegistry::get_mapper_by_policy_number
    fn policy_prefix(&self) -> Option<&'static str> {
        None
    }

    fn to_common(&self, custom: &Self::Custom) -> PolicyTransaction;

    fn to_custom(&self, common: &PolicyTransaction) -> Result<Self::Custom, DecodeError>;
}

/// Registry key for a mapper.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MapperKey {
    pub carrier_code: String,
    pub product_code: String,
}

impl MapperKey {
    pub fn new(carrier_code: impl Into<String>, product_code: impl Into<String>) -> Self {
        Self {
            carrier_code: carrier_code.into(),
            product_code: product_code.into(),
        }
    }

    pub fn matches(&self, carrier_code: &str, product_code: &str) -> bool {
        self.carrier_code == carrier_code && self.product_code == product_code
    }
}

impl fmt::Display for MapperKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.carrier_code, self.product_code)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum MappingError {
    #[error(transparent)]
    Decode(#[from] DecodeError),
    #[error("custom model JSON does not match {key}: {source}")]
    Json {
        key: MapperKey,
        #[source]
        source: serde_json::Error,
    },
}

/// Object-safe view of a [`PolicyMapper`] whose custom model crosses the
/// API boundary as JSON. Lets the registry hold mappers of different types.
pub trait DynPolicyMapper: Send + Sync {
    fn identity(&self) -> MapperKey;

    fn prefix_rule(&self) -> Option<&'static str>;

    fn decode_json(&self, record: &PolicyTransaction) -> Result<serde_json::Value, MappingError>;

    fn encode_json(&self, custom: serde_json::Value) -> Result<PolicyTransaction, MappingError>;

    fn into_any(self: Arc<Self>) -> Arc<dyn Any + Send + Sync>;
}

impl<M> DynPolicyMapper for M
where
    M: PolicyMapper,
    M::Custom: Serialize + DeserializeOwned,
{
    fn identity(&self) -> MapperKey {
        MapperKey::new(self.carrier_code(), self.product_code())
    }

    fn prefix_rule(&self) -> Option<&'static str> {
        self.policy_prefix()
    }

    fn decode_json(&self, record: &PolicyTransaction) -> Result<serde_json::Value, MappingError> {
        let custom = self.to_custom(record)?;
        serde_json::to_value(custom).map_err(|source| MappingError::Json {
            key: self.identity(),
            source,
        })
    }

    fn encode_json(&self, custom: serde_json::Value) -> Result<PolicyTransaction, MappingError> {
        let custom: M::Custom =
            serde_json::from_value(custom).map_err(|source| MappingError::Json {
                key: self.identity(),
                source,
            })?;
        Ok(self.to_common(&custom))
    }

    fn into_any(self: Arc<Self>) -> Arc<dyn Any + Send + Sync> {
        self
    }
}
