use crate::di::{ContractId, Lifetime};
use crate::error::{FornoError, Result};
use serde::{Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;

/// One contract bound to one implementation with a lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct Binding {
    #[serde(serialize_with = "serialize_id")]
    pub contract: ContractId,
    #[serde(serialize_with = "serialize_id")]
    pub implementation: ContractId,
    pub lifetime: Lifetime,
}

fn serialize_id<S: Serializer>(id: &ContractId, serializer: S) -> std::result::Result<S::Ok, S::Error> {
    serializer.serialize_str(id.name())
}

impl Binding {
    pub fn new(contract: ContractId, implementation: ContractId, lifetime: Lifetime) -> Self {
        Self {
            contract,
            implementation,
            lifetime,
        }
    }

    pub fn is_self_binding(&self) -> bool {
        self.contract == self.implementation
    }
}

impl fmt::Display for Binding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} => {} ({})",
            self.contract, self.implementation, self.lifetime
        )
    }
}

/// Append-only store of bindings used while the application is composed.
///
/// At most one binding exists per contract. Binding the same triple again is a
/// no-op; a different implementation or lifetime for an already bound
/// contract is a configuration error, never a silent pick.
#[derive(Debug, Default)]
pub struct BindingRegistry {
    bindings: BTreeMap<ContractId, Binding>,
}

impl BindingRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `Ok(true)` when the binding was newly registered and `Ok(false)`
    /// when the identical binding already existed.
    pub fn try_bind(
        &mut self,
        contract: ContractId,
        implementation: ContractId,
        lifetime: Lifetime,
    ) -> Result<bool> {
        let candidate = Binding::new(contract, implementation, lifetime);
        match self.bindings.get(&contract) {
            Some(existing) if *existing == candidate => Ok(false),
            Some(existing) => Err(FornoError::ConflictingBinding {
                contract: contract.to_string(),
                existing: format!("{} ({})", existing.implementation, existing.lifetime),
                candidate: format!("{implementation} ({lifetime})"),
            }),
            None => {
                tracing::debug!(binding = %candidate, "bound");
                self.bindings.insert(contract, candidate);
                Ok(true)
            }
        }
    }

    pub fn resolve(&self, contract: ContractId) -> Result<&Binding> {
        lookup(&self.bindings, contract)
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    /// Close the registry. The returned set is immutable and may be shared
    /// across request tasks without synchronization.
    pub fn freeze(self) -> Bindings {
        Bindings {
            bindings: self.bindings,
        }
    }
}

/// The frozen binding set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Bindings {
    bindings: BTreeMap<ContractId, Binding>,
}

impl Bindings {
    pub fn resolve(&self, contract: ContractId) -> Result<&Binding> {
        lookup(&self.bindings, contract)
    }

    pub fn get(&self, contract: ContractId) -> Option<&Binding> {
        self.bindings.get(&contract)
    }

    pub fn contains(&self, contract: ContractId) -> bool {
        self.bindings.contains_key(&contract)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Binding> {
        self.bindings.values()
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}

fn lookup(bindings: &BTreeMap<ContractId, Binding>, contract: ContractId) -> Result<&Binding> {
    bindings
        .get(&contract)
        .ok_or_else(|| FornoError::DependencyNotFound {
            type_name: contract.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    trait Repository {}
    struct SqlRepository;
    struct MemoryRepository;

    #[test]
    fn test_try_bind_is_idempotent() {
        let mut registry = BindingRegistry::new();
        let contract = ContractId::of::<dyn Repository>();
        let implementation = ContractId::of::<SqlRepository>();

        assert!(registry.try_bind(contract, implementation, Lifetime::Scoped).unwrap());
        assert!(!registry.try_bind(contract, implementation, Lifetime::Scoped).unwrap());
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_conflicting_implementation_names_the_contract() {
        let mut registry = BindingRegistry::new();
        let contract = ContractId::of::<dyn Repository>();
        registry
            .try_bind(contract, ContractId::of::<SqlRepository>(), Lifetime::Scoped)
            .unwrap();

        let err = registry
            .try_bind(contract, ContractId::of::<MemoryRepository>(), Lifetime::Scoped)
            .unwrap_err();
        match &err {
            FornoError::ConflictingBinding {
                contract: name,
                existing,
                candidate,
            } => {
                assert!(name.contains("Repository"));
                assert!(existing.contains("SqlRepository"));
                assert!(candidate.contains("MemoryRepository"));
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(err.is_configuration_error());
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_lifetime_mismatch_is_a_conflict() {
        let mut registry = BindingRegistry::new();
        let contract = ContractId::of::<dyn Repository>();
        let implementation = ContractId::of::<SqlRepository>();
        registry.try_bind(contract, implementation, Lifetime::Scoped).unwrap();

        assert!(
            registry
                .try_bind(contract, implementation, Lifetime::Singleton)
                .is_err()
        );
    }

    #[test]
    fn test_frozen_bindings_resolve_or_miss() {
        let mut registry = BindingRegistry::new();
        let contract = ContractId::of::<dyn Repository>();
        registry
            .try_bind(contract, ContractId::of::<SqlRepository>(), Lifetime::Singleton)
            .unwrap();

        let bindings = registry.freeze();
        let binding = bindings.resolve(contract).unwrap();
        assert_eq!(binding.implementation, ContractId::of::<SqlRepository>());
        assert!(!binding.is_self_binding());

        let miss = bindings.resolve(ContractId::of::<MemoryRepository>());
        assert!(matches!(miss, Err(FornoError::DependencyNotFound { .. })));
    }
}
