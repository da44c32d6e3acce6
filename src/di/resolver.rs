use crate::di::{ContractId, ContractNode, ImplementationDescriptor};
use crate::error::{FornoError, Result};
use serde::Serialize;
use std::collections::BTreeSet;
use std::str::FromStr;
use strum_macros::{Display, EnumString};

/// Which of an implementation's declared contracts it is registered under.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Display, EnumString, Serialize)]
#[strum(ascii_case_insensitive)]
#[serde(rename_all = "kebab-case")]
pub enum ResolutionPolicy {
    /// Drop every contract that another declared contract already extends.
    #[default]
    #[strum(to_string = "top-level", serialize = "top-level-only")]
    TopLevelOnly,
    /// Register under every declared contract and every contract it extends.
    #[strum(to_string = "full-closure")]
    FullClosure,
}

impl ResolutionPolicy {
    pub fn parse(value: &str) -> Result<Self> {
        ResolutionPolicy::from_str(value.trim()).map_err(|_| FornoError::InvalidPolicy {
            value: value.to_string(),
        })
    }
}

/// The contracts one implementation is bound under. Empty means the
/// implementation is bound under its own type.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContractSet(BTreeSet<ContractId>);

impl ContractSet {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn contains(&self, contract: ContractId) -> bool {
        self.0.contains(&contract)
    }

    pub fn iter(&self) -> impl Iterator<Item = ContractId> + '_ {
        self.0.iter().copied()
    }
}

impl FromIterator<ContractId> for ContractSet {
    fn from_iter<I: IntoIterator<Item = ContractId>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl IntoIterator for ContractSet {
    type Item = ContractId;
    type IntoIter = std::collections::btree_set::IntoIter<ContractId>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

/// Computes contract sets over the supertrait graph.
///
/// Pure and infallible; one policy per resolver.
#[derive(Debug, Clone, Copy, Default)]
pub struct ContractResolver {
    policy: ResolutionPolicy,
}

impl ContractResolver {
    pub fn new(policy: ResolutionPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> ResolutionPolicy {
        self.policy
    }

    pub fn resolve(&self, descriptor: &ImplementationDescriptor) -> ContractSet {
        match descriptor.service() {
            Some(service) => std::iter::once(service.id()).collect(),
            None => self.resolve_nodes(descriptor.contracts()),
        }
    }

    pub fn resolve_nodes(&self, contracts: &[ContractNode]) -> ContractSet {
        match self.policy {
            ResolutionPolicy::FullClosure => contracts
                .iter()
                .flat_map(|node| std::iter::once(node.id()).chain(node.ancestors()))
                .collect(),
            ResolutionPolicy::TopLevelOnly => {
                let ancestry: Vec<BTreeSet<ContractId>> =
                    contracts.iter().map(ContractNode::ancestors).collect();
                contracts
                    .iter()
                    .filter(|candidate| {
                        let id = candidate.id();
                        !contracts
                            .iter()
                            .zip(&ancestry)
                            .any(|(other, ancestors)| other.id() != id && ancestors.contains(&id))
                    })
                    .map(ContractNode::id)
                    .collect()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    trait Reader {}
    trait Store: Reader {}
    trait Audit {}

    fn reader() -> ContractNode {
        ContractNode::leaf(ContractId::of::<dyn Reader>())
    }

    fn store() -> ContractNode {
        ContractNode::new(ContractId::of::<dyn Store>(), vec![reader()])
    }

    fn audit() -> ContractNode {
        ContractNode::leaf(ContractId::of::<dyn Audit>())
    }

    #[test]
    fn test_top_level_absorbs_supertypes() {
        let resolver = ContractResolver::default();
        let set = resolver.resolve_nodes(&[reader(), store()]);
        assert_eq!(set.len(), 1);
        assert!(set.contains(ContractId::of::<dyn Store>()));

        // declaration order does not matter
        assert_eq!(set, resolver.resolve_nodes(&[store(), reader()]));
    }

    #[test]
    fn test_top_level_keeps_unrelated_contracts() {
        let set = ContractResolver::default().resolve_nodes(&[reader(), store(), audit()]);
        assert_eq!(set.len(), 2);
        assert!(set.contains(ContractId::of::<dyn Audit>()));
        assert!(!set.contains(ContractId::of::<dyn Reader>()));
    }

    #[test]
    fn test_full_closure_keeps_everything() {
        let set =
            ContractResolver::new(ResolutionPolicy::FullClosure).resolve_nodes(&[reader(), store()]);
        assert_eq!(set.len(), 2);
        assert!(set.contains(ContractId::of::<dyn Reader>()));
    }

    #[test]
    fn test_full_closure_adds_inherited_contracts() {
        let resolver = ContractResolver::new(ResolutionPolicy::FullClosure);
        let set = resolver.resolve_nodes(&[store()]);
        assert_eq!(set.len(), 2);
        assert!(set.contains(ContractId::of::<dyn Store>()));
        assert!(set.contains(ContractId::of::<dyn Reader>()));

        let set = resolver.resolve_nodes(&[store(), audit()]);
        assert_eq!(set.len(), 3);
    }

    #[test]
    fn test_no_contracts_is_empty() {
        assert!(ContractResolver::default().resolve_nodes(&[]).is_empty());
    }

    #[test]
    fn test_policy_parse() {
        assert_eq!(
            ResolutionPolicy::parse("top-level").unwrap(),
            ResolutionPolicy::TopLevelOnly
        );
        assert_eq!(
            ResolutionPolicy::parse("TOP-LEVEL-ONLY").unwrap(),
            ResolutionPolicy::TopLevelOnly
        );
        assert_eq!(
            ResolutionPolicy::parse("full-closure").unwrap(),
            ResolutionPolicy::FullClosure
        );
        assert!(matches!(
            ResolutionPolicy::parse("everything"),
            Err(FornoError::InvalidPolicy { .. })
        ));
        assert_eq!(ResolutionPolicy::TopLevelOnly.to_string(), "top-level");
    }
}
