use std::fmt;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::info;

use super::acme::AcmeCommercialPackageMapper;
use super::mapper::{DynPolicyMapper, MapperKey, PolicyMapper};

/// Lookup table from (carrier, product) to mapper.
///
/// Registration takes `&mut self` and happens while the composition root is
/// being built. Share the finished registry behind an `Arc`; lookups only need
/// `&self`.
#[derive(Default)]
pub struct MapperRegistry {
    entries: Vec<(MapperKey, Arc<dyn DynPolicyMapper>)>,
}

impl MapperRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry preloaded with every carrier mapper shipped in this crate.
    pub fn with_builtin_mappers() -> Result<Self, RegistryError> {
        let mut registry = Self::new();
        registry.register(AcmeCommercialPackageMapper)?;
        Ok(registry)
    }

    pub fn register<M>(&mut self, mapper: M) -> Result<(), RegistryError>
    where
        M: PolicyMapper,
        M::Custom: Serialize + DeserializeOwned,
    {
        let key = MapperKey::new(mapper.carrier_code(), mapper.product_code());
        if self.position(&key.carrier_code, &key.product_code).is_some() {
            return Err(RegistryError::Conflict {
                carrier_code: key.carrier_code,
                product_code: key.product_code,
            });
        }

        info!(mapper = %key, "registered policy mapper");
        self.entries.push((key, Arc::new(mapper)));
        Ok(())
    }

    pub fn get_mapper(
        &self,
        carrier_code: &str,
        product_code: &str,
    ) -> Result<Arc<dyn DynPolicyMapper>, RegistryError> {
        self.position(carrier_code, product_code)
            .map(|index| Arc::clone(&self.entries[index].1))
            .ok_or_else(|| RegistryError::MapperNotFound {
                carrier_code: carrier_code.to_string(),
                product_code: product_code.to_string(),
                registered: self.list_registered(),
            })
    }

    /// Typed lookup for callers that know the concrete mapper.
    pub fn get_typed<M: PolicyMapper>(
        &self,
        carrier_code: &str,
        product_code: &str,
    ) -> Result<Arc<M>, RegistryError> {
        let mapper = self.get_mapper(carrier_code, product_code)?;
        mapper
            .into_any()
            .downcast::<M>()
            .map_err(|_| RegistryError::TypeMismatch {
                key: MapperKey::new(carrier_code, product_code),
                expected: std::any::type_name::<M>(),
            })
    }

    /// Best-effort dispatch on the policy number prefix.
    ///
    /// The longest registered prefix wins. Callers that need certainty should
    /// use [`MapperRegistry::get_mapper`].
    pub fn get_mapper_by_policy_number(
        &self,
        policy_number: &str,
    ) -> Option<Arc<dyn DynPolicyMapper>> {
        self.entries
            .iter()
            .filter_map(|(_, mapper)| {
                mapper
                    .prefix_rule()
                    .filter(|prefix| policy_number.starts_with(prefix))
                    .map(|prefix| (prefix.len(), mapper))
            })
            .fold(None::<(usize, &Arc<dyn DynPolicyMapper>)>, |best, candidate| {
                match best {
                    Some((len, _)) if len >= candidate.0 => best,
                    _ => Some(candidate),
                }
            })
            .map(|(_, mapper)| Arc::clone(mapper))
    }

    /// Registered keys in registration order.
    pub fn list_registered(&self) -> Vec<MapperKey> {
        self.entries.iter().map(|(key, _)| key.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    fn position(&self, carrier_code: &str, product_code: &str) -> Option<usize> {
        self.entries
            .iter()
            .position(|(key, _)| key.matches(carrier_code, product_code))
    }
}

impl fmt::Debug for MapperRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MapperRegistry")
            .field("registered", &self.list_registered())
            .finish()
    }
}

fn format_keys(keys: &[MapperKey]) -> String {
    if keys.is_empty() {
        return "none".to_string();
    }
    keys.iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
    #[error("mapper already registered for carrier={carrier_code}, product={product_code}")]
    Conflict {
        carrier_code: String,
        product_code: String,
    },
    #[error(
        "no mapper registered for carrier={carrier_code}, product={product_code}; available mappers: {}",
        format_keys(.registered)
    )]
    MapperNotFound {
        carrier_code: String,
        product_code: String,
        registered: Vec<MapperKey>,
    },
    #[error("mapper registered for {key} is not a {expected}")]
    TypeMismatch {
        key: MapperKey,
        expected: &'static str,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::policy::fields::DecodeError;
    use crate::policy::record::PolicyTransaction;
    use crate::policy::tests::common::sample_policy;

    struct EchoMapper {
        carrier: &'static str,
        prefix: Option<&'static str>,
    }

    impl PolicyMapper for EchoMapper {
        type Custom = PolicyTransaction;

        fn carrier_code(&self) -> &'static str {
            self.carrier
        }

        fn product_code(&self) -> &'static str {
            "COMMERCIAL_PACKAGE"
        }

        fn policy_prefix(&self) -> Option<&'static str> {
            self.prefix
        }

        fn to_common(&self, custom: &PolicyTransaction) -> PolicyTransaction {
            custom.clone()
        }

        fn to_custom(&self, common: &PolicyTransaction) -> Result<PolicyTransaction, DecodeError> {
            Ok(common.clone())
        }
    }

    #[test]
    fn duplicate_registration_is_rejected_and_leaves_registry_unchanged() {
        let mut registry = MapperRegistry::new();
        registry
            .register(AcmeCommercialPackageMapper)
            .expect("first registration");

        let err = registry
            .register(EchoMapper {
                carrier: "ACME",
                prefix: None,
            })
            .expect_err("duplicate key");
        assert_eq!(
            err,
            RegistryError::Conflict {
                carrier_code: "ACME".to_string(),
                product_code: "COMMERCIAL_PACKAGE".to_string(),
            }
        );

        assert_eq!(registry.len(), 1);
        let typed = registry.get_typed::<AcmeCommercialPackageMapper>("ACME", "COMMERCIAL_PACKAGE");
        assert!(typed.is_ok(), "first mapper still registered");
    }

    #[test]
    fn missing_mapper_lists_registered_keys() {
        let registry = MapperRegistry::with_builtin_mappers().expect("builtins");
        let err = registry
            .get_mapper("STATE_FARM", "PERSONAL_AUTO")
            .err()
            .expect("not registered");

        match &err {
            RegistryError::MapperNotFound { registered, .. } => {
                assert_eq!(
                    registered,
                    &vec![MapperKey::new("ACME", "COMMERCIAL_PACKAGE")]
                );
            }
            other => panic!("expected not found, got {other:?}"),
        }
        assert!(err.to_string().contains("ACME/COMMERCIAL_PACKAGE"));
    }

    #[test]
    fn policy_number_prefix_resolves_acme() {
        let registry = MapperRegistry::with_builtin_mappers().expect("builtins");

        let mapper = registry
            .get_mapper_by_policy_number("ACME-CPP-2024-001234")
            .expect("prefix match");
        assert_eq!(
            mapper.identity(),
            MapperKey::new("ACME", "COMMERCIAL_PACKAGE")
        );
        assert!(registry
            .get_mapper_by_policy_number("UNKNOWN-123")
            .is_none());
    }

    #[test]
    fn longest_prefix_wins() {
        let mut registry = MapperRegistry::with_builtin_mappers().expect("builtins");
        registry
            .register(EchoMapper {
                carrier: "ACME_SPECIALTY",
                prefix: Some("ACME-SPX-"),
            })
            .expect("distinct key");

        let mapper = registry
            .get_mapper_by_policy_number("ACME-SPX-0001")
            .expect("prefix match");
        assert_eq!(mapper.identity().carrier_code, "ACME_SPECIALTY");

        let mapper = registry
            .get_mapper_by_policy_number("ACME-CPP-0001")
            .expect("prefix match");
        assert_eq!(mapper.identity().carrier_code, "ACME");
    }

    #[test]
    fn typed_lookup_rejects_wrong_type() {
        let registry = MapperRegistry::with_builtin_mappers().expect("builtins");
        let err = registry
            .get_typed::<EchoMapper>("ACME", "COMMERCIAL_PACKAGE")
            .err()
            .expect("wrong concrete type");
        assert!(matches!(err, RegistryError::TypeMismatch { .. }));
    }

    #[test]
    fn list_preserves_order_and_clear_resets() {
        let mut registry = MapperRegistry::new();
        registry
            .register(EchoMapper {
                carrier: "ZETA",
                prefix: None,
            })
            .expect("register");
        registry
            .register(AcmeCommercialPackageMapper)
            .expect("register");

        assert_eq!(
            registry.list_registered(),
            vec![
                MapperKey::new("ZETA", "COMMERCIAL_PACKAGE"),
                MapperKey::new("ACME", "COMMERCIAL_PACKAGE"),
            ]
        );

        registry.clear();
        assert!(registry.is_empty());
        assert!(registry.get_mapper("ACME", "COMMERCIAL_PACKAGE").is_err());
    }

    #[test]
    fn erased_mapper_round_trips_json() {
        let registry = MapperRegistry::with_builtin_mappers().expect("builtins");
        let mapper = registry
            .get_mapper("ACME", "COMMERCIAL_PACKAGE")
            .expect("registered");

        let payload = serde_json::to_value(sample_policy()).expect("serialize policy");
        let record = mapper.encode_json(payload.clone()).expect("encode");
        assert_eq!(record.carrier_code, "ACME");
        assert_eq!(mapper.decode_json(&record).expect("decode"), payload);
    }
}
