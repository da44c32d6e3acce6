use crate::di::injectable::{CasterFn, FactoryFn, Instance};
use crate::di::registry::Bindings;
use crate::di::scanner::ScanOutcome;
use crate::di::{ContractId, Lifetime, Scope};
use crate::error::{FornoError, Result};
use dashmap::DashMap;
use std::collections::HashMap;
use std::sync::Arc;

/// How to build one implementation and view it through each of its contracts.
#[derive(Clone)]
pub(crate) struct Registration {
    pub(crate) factory: FactoryFn,
    pub(crate) casters: HashMap<ContractId, CasterFn>,
}

/// Thread-safe dependency injection container.
///
/// Built once from a finished scan; the bindings and the factory table never
/// change afterwards. Singletons are cached per implementation, so an
/// implementation bound under several contracts still has one instance.
pub struct Container {
    bindings: Bindings,
    registrations: HashMap<ContractId, Registration>,
    singletons: DashMap<ContractId, Instance>,
}

impl Container {
    pub fn new(outcome: ScanOutcome) -> Self {
        let ScanOutcome {
            bindings,
            registrations,
        } = outcome;
        tracing::debug!(
            bindings = bindings.len(),
            implementations = registrations.len(),
            "Container created"
        );
        Self {
            bindings,
            registrations,
            singletons: DashMap::new(),
        }
    }

    pub fn bindings(&self) -> &Bindings {
        &self.bindings
    }

    /// Resolve `T` outside any request scope.
    ///
    /// Transient and singleton bindings resolve here; scoped bindings need a
    /// [`Scope`] and fail with `ScopeMismatch`.
    pub fn resolve<T: ?Sized + Send + Sync + 'static>(&self) -> Result<Arc<T>> {
        Injector::root(self).resolve::<T>()
    }

    pub fn contains<T: ?Sized + 'static>(&self) -> bool {
        self.bindings.contains(ContractId::of::<T>())
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    fn instance_for(
        &self,
        contract: ContractId,
        injector: &Injector<'_>,
    ) -> Result<(Instance, &CasterFn)> {
        let binding = self.bindings.resolve(contract)?;
        let implementation = binding.implementation;
        let registration = self.registrations.get(&implementation).ok_or_else(|| {
            FornoError::Internal(format!("No factory registered for {implementation}"))
        })?;
        let caster = registration.casters.get(&contract).ok_or_else(|| {
            FornoError::Internal(format!("{implementation} cannot be viewed as {contract}"))
        })?;

        let instance = match binding.lifetime {
            Lifetime::Transient => injector.construct(implementation, registration)?,
            Lifetime::Singleton => cached(&self.singletons, implementation, || {
                // singletons never capture scoped state
                injector.unscoped().construct(implementation, registration)
            })?,
            Lifetime::Scoped => {
                let scope = injector.scope.ok_or_else(|| FornoError::ScopeMismatch {
                    message: match injector.chain.last() {
                        Some(owner) => format!(
                            "scoped {contract} requested while building {owner} outside a request scope"
                        ),
                        None => format!("scoped {contract} requested outside a request scope"),
                    },
                })?;
                cached(scope.instances(), implementation, || {
                    injector.construct(implementation, registration)
                })?
            }
        };
        Ok((instance, caster))
    }
}

/// Fetch from `cache`, building outside the map lock on a miss. If two
/// callers race, the first inserted instance wins for both.
pub(crate) fn cached(
    cache: &DashMap<ContractId, Instance>,
    key: ContractId,
    build: impl FnOnce() -> Result<Instance>,
) -> Result<Instance> {
    if let Some(existing) = cache.get(&key) {
        return Ok(Arc::clone(existing.value()));
    }
    let instance = build()?;
    Ok(Arc::clone(cache.entry(key).or_insert(instance).value()))
}

/// Resolution context handed to factories.
///
/// Tracks the chain of implementations under construction for cycle
/// detection, and the request scope when there is one.
pub struct Injector<'a> {
    container: &'a Container,
    scope: Option<&'a Scope>,
    chain: Vec<ContractId>,
}

impl<'a> Injector<'a> {
    pub(crate) fn root(container: &'a Container) -> Self {
        Self {
            container,
            scope: None,
            chain: Vec::new(),
        }
    }

    pub(crate) fn scoped(container: &'a Container, scope: &'a Scope) -> Self {
        Self {
            container,
            scope: Some(scope),
            chain: Vec::new(),
        }
    }

    fn unscoped(&self) -> Injector<'a> {
        Injector {
            container: self.container,
            scope: None,
            chain: self.chain.clone(),
        }
    }

    /// Resolve a dependency of the implementation being built.
    pub fn resolve<T: ?Sized + Send + Sync + 'static>(&self) -> Result<Arc<T>> {
        let contract = ContractId::of::<T>();
        let (instance, caster) = self.container.instance_for(contract, self)?;
        let boxed = caster(instance)?;
        boxed
            .downcast::<Arc<T>>()
            .map(|arc| *arc)
            .map_err(|_| FornoError::DowncastFailed {
                type_name: contract.name().to_string(),
            })
    }

    fn construct(&self, implementation: ContractId, registration: &Registration) -> Result<Instance> {
        if self.chain.contains(&implementation) {
            let cycle = self
                .chain
                .iter()
                .chain(std::iter::once(&implementation))
                .map(|id| id.short_name())
                .collect::<Vec<_>>()
                .join(" -> ");
            return Err(FornoError::CircularDependency { cycle });
        }

        let mut chain = self.chain.clone();
        chain.push(implementation);
        let child = Injector {
            container: self.container,
            scope: self.scope,
            chain,
        };
        tracing::trace!(implementation = %implementation, "constructing");
        (registration.factory)(&child)
    }
}
