use crate::config::ConfigService;
use crate::di::container::Registration;
use crate::di::registry::{BindingRegistry, Bindings};
use crate::di::resolver::{ContractResolver, ContractSet, ResolutionPolicy};
use crate::di::{ContractId, ImplementationDescriptor, Injectable, Lifetime};
use crate::error::{FornoError, Result};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

pub const POLICY_KEY: &str = "FORNO_CONTRACT_POLICY";
pub const DEFAULT_LIFETIME_KEY: &str = "FORNO_DEFAULT_LIFETIME";
pub const LIFETIME_PREFIX: &str = "FORNO_LIFETIME_";

#[derive(Clone)]
struct Candidate {
    describe: Arc<dyn Fn() -> ImplementationDescriptor + Send + Sync>,
    /// Added through [`CodeUnit::instance`]; never deduplicated.
    prepared: bool,
}

/// A named, explicit list of injectable candidates.
///
/// Usually generated by `#[module(providers = [...])]`; it can also be
/// assembled by hand.
#[derive(Clone, Default)]
pub struct CodeUnit {
    name: String,
    candidates: Vec<Candidate>,
}

impl CodeUnit {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            candidates: Vec::new(),
        }
    }

    pub fn injectable<T: Injectable>(self) -> Self {
        self.candidate(T::descriptor)
    }

    /// Add a hand-written descriptor.
    pub fn candidate<F>(mut self, candidate: F) -> Self
    where
        F: Fn() -> ImplementationDescriptor + Send + Sync + 'static,
    {
        self.candidates.push(Candidate {
            describe: Arc::new(candidate),
            prepared: false,
        });
        self
    }

    /// Register an already built value as a self-bound singleton.
    ///
    /// Two instances of the same type conflict, even when equal.
    pub fn instance<T: Clone + Send + Sync + 'static>(mut self, value: T) -> Self {
        self.candidates.push(Candidate {
            describe: Arc::new(move || {
                let value = value.clone();
                ImplementationDescriptor::builder(move |_| Ok(value.clone()))
                    .lifetime(Lifetime::Singleton)
                    .build()
            }),
            prepared: true,
        });
        self
    }

    /// Append the candidates of an imported unit.
    pub fn merge(mut self, other: CodeUnit) -> Self {
        self.candidates.extend(other.candidates);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }
}

impl fmt::Debug for CodeUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CodeUnit")
            .field("name", &self.name)
            .field("candidates", &self.candidates.len())
            .finish()
    }
}

/// Scanner settings: the resolution policy and lifetime defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScannerConfig {
    pub policy: ResolutionPolicy,
    /// Lifetime for candidates that do not declare one.
    pub default_lifetime: Lifetime,
    /// Per-implementation lifetime, keyed by short type name.
    pub lifetime_overrides: HashMap<String, Lifetime>,
}

impl ScannerConfig {
    /// Read `FORNO_CONTRACT_POLICY`, `FORNO_DEFAULT_LIFETIME` and every
    /// `FORNO_LIFETIME_<TypeName>` entry. Unparseable values are errors.
    pub fn from_config(config: &ConfigService) -> Result<Self> {
        let policy = match config.get(POLICY_KEY) {
            Some(value) => ResolutionPolicy::parse(&value)?,
            None => ResolutionPolicy::default(),
        };
        let default_lifetime = match config.get(DEFAULT_LIFETIME_KEY) {
            Some(value) => Lifetime::parse(&value)?,
            None => Lifetime::default(),
        };
        let lifetime_overrides = config
            .entries_with_prefix(LIFETIME_PREFIX)
            .into_iter()
            .map(|(name, value)| Ok((name, Lifetime::parse(&value)?)))
            .collect::<Result<HashMap<_, _>>>()?;

        Ok(Self {
            policy,
            default_lifetime,
            lifetime_overrides,
        })
    }

    pub fn with_policy(mut self, policy: ResolutionPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_lifetime(mut self, type_name: impl Into<String>, lifetime: Lifetime) -> Self {
        self.lifetime_overrides.insert(type_name.into(), lifetime);
        self
    }

    fn lifetime_for(&self, descriptor: &ImplementationDescriptor) -> Lifetime {
        self.lifetime_overrides
            .get(&descriptor.implementation().short_name())
            .copied()
            .or(descriptor.declared_lifetime())
            .unwrap_or(self.default_lifetime)
    }
}

/// How one candidate wants its implementation bound.
#[derive(Debug, PartialEq, Eq)]
struct Claim {
    lifetime: Lifetime,
    contracts: ContractSet,
    prepared: bool,
}

impl Claim {
    /// Repeated candidates are skipped only when they would bind identically.
    fn agrees_with(&self, other: &Claim) -> bool {
        !self.prepared && self == other
    }

    fn describe(&self, implementation: ContractId) -> String {
        let kind = if self.prepared { "instance" } else { "descriptor" };
        let contracts = if self.contracts.is_empty() {
            "itself".to_string()
        } else {
            self.contracts
                .iter()
                .map(|contract| contract.short_name())
                .collect::<Vec<_>>()
                .join(", ")
        };
        format!(
            "{} ({} {kind}) under {contracts}",
            implementation.short_name(),
            self.lifetime
        )
    }
}

/// Result of a finished scan: the frozen bindings and the factory table.
pub struct ScanOutcome {
    pub(crate) bindings: Bindings,
    pub(crate) registrations: HashMap<ContractId, Registration>,
}

impl ScanOutcome {
    pub fn bindings(&self) -> &Bindings {
        &self.bindings
    }
}

/// Walks code units and binds every injectable candidate.
#[derive(Debug, Clone, Default)]
pub struct Scanner {
    config: ScannerConfig,
}

impl Scanner {
    pub fn new(config: ScannerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ScannerConfig {
        &self.config
    }

    /// Bind every candidate of `units`.
    ///
    /// The result does not depend on the order of units or candidates. The
    /// first conflicting binding aborts the scan, and so does a repeated
    /// implementation whose candidates disagree on lifetime or contracts.
    pub fn scan(&self, units: &[CodeUnit]) -> Result<ScanOutcome> {
        let resolver = ContractResolver::new(self.config.policy);
        let mut registry = BindingRegistry::new();
        let mut registrations = HashMap::new();
        let mut claims: HashMap<ContractId, Claim> = HashMap::new();

        for unit in units {
            tracing::debug!(unit = unit.name(), candidates = unit.len(), "scanning code unit");
            for candidate in &unit.candidates {
                let descriptor = (candidate.describe)();
                let implementation = descriptor.implementation();
                let claim = Claim {
                    lifetime: self.config.lifetime_for(&descriptor),
                    contracts: resolver.resolve(&descriptor),
                    prepared: candidate.prepared,
                };

                if let Some(existing) = claims.get(&implementation) {
                    if existing.agrees_with(&claim) {
                        continue;
                    }
                    return Err(FornoError::ConflictingBinding {
                        contract: implementation.to_string(),
                        existing: existing.describe(implementation),
                        candidate: claim.describe(implementation),
                    });
                }

                if let Some(contract) = claim
                    .contracts
                    .iter()
                    .find(|contract| !descriptor.casters().contains_key(contract))
                {
                    return Err(FornoError::UncastableContract {
                        contract: contract.to_string(),
                        implementation: implementation.to_string(),
                    });
                }

                if claim.contracts.is_empty() {
                    registry.try_bind(implementation, implementation, claim.lifetime)?;
                } else {
                    for contract in claim.contracts.iter() {
                        registry.try_bind(contract, implementation, claim.lifetime)?;
                    }
                }

                registrations.insert(
                    implementation,
                    Registration {
                        factory: descriptor.factory().clone(),
                        casters: descriptor.casters().clone(),
                    },
                );
                claims.insert(implementation, claim);
            }
        }

        tracing::info!(
            policy = %self.config.policy,
            implementations = registrations.len(),
            bindings = registry.len(),
            "Component scan completed"
        );

        Ok(ScanOutcome {
            bindings: registry.freeze(),
            registrations,
        })
    }
}
