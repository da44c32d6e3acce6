use crate::di::{Contract, ContractId, ContractNode, Injector, Lifetime, Upcast};
use crate::error::{FornoError, Result};
use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

/// An erased, shared implementation instance (`Arc<Impl>` behind `dyn Any`).
pub(crate) type Instance = Arc<dyn Any + Send + Sync>;

pub(crate) type FactoryFn = Arc<dyn Fn(&Injector<'_>) -> Result<Instance> + Send + Sync>;

/// Turns an erased `Arc<Impl>` into a boxed `Arc<C>` for one contract `C`.
pub(crate) type CasterFn =
    Arc<dyn Fn(Instance) -> Result<Box<dyn Any + Send + Sync>> + Send + Sync>;

/// Trait for types that can be registered by the component scanner
///
/// This trait is typically implemented automatically via `#[derive(Injectable)]`.
///
/// # Example
/// ```
/// use forno::prelude::*;
///
/// #[contract]
/// pub trait Greeter: Send + Sync {
///     fn greet(&self) -> String;
/// }
///
/// #[derive(Injectable)]
/// #[injectable(lifetime = "singleton", contracts(dyn Greeter))]
/// pub struct EnglishGreeter {}
///
/// impl Greeter for EnglishGreeter {
///     fn greet(&self) -> String {
///         "hello".to_string()
///     }
/// }
/// ```
pub trait Injectable: Send + Sync + 'static {
    /// Describe how to build this type and which contracts it implements.
    fn descriptor() -> ImplementationDescriptor;
}

/// Everything the scanner needs to know about one injectable type.
///
/// Immutable once built.
pub struct ImplementationDescriptor {
    implementation: ContractId,
    lifetime: Option<Lifetime>,
    contracts: Vec<ContractNode>,
    service: Option<ContractNode>,
    factory: FactoryFn,
    casters: HashMap<ContractId, CasterFn>,
}

impl ImplementationDescriptor {
    /// Start describing `T`, constructed by `factory` from its dependencies.
    pub fn builder<T, F>(factory: F) -> DescriptorBuilder<T>
    where
        T: Send + Sync + 'static,
        F: Fn(&Injector<'_>) -> Result<T> + Send + Sync + 'static,
    {
        let factory: FactoryFn =
            Arc::new(move |injector| factory(injector).map(|value| Arc::new(value) as Instance));
        DescriptorBuilder {
            implementation: ContractId::of::<T>(),
            lifetime: None,
            contracts: Vec::new(),
            service: None,
            factory,
            casters: HashMap::new(),
            _marker: PhantomData,
        }
    }

    pub fn implementation(&self) -> ContractId {
        self.implementation
    }

    /// The lifetime declared on the type, if any.
    pub fn declared_lifetime(&self) -> Option<Lifetime> {
        self.lifetime
    }

    /// Contracts declared with `implements`. Supertraits are not listed here;
    /// they stay reachable through each node's ancestry.
    pub fn contracts(&self) -> &[ContractNode] {
        &self.contracts
    }

    /// Explicit contract override; when present it is the only registration key.
    pub fn service(&self) -> Option<&ContractNode> {
        self.service.as_ref()
    }

    pub(crate) fn factory(&self) -> &FactoryFn {
        &self.factory
    }

    pub(crate) fn casters(&self) -> &HashMap<ContractId, CasterFn> {
        &self.casters
    }
}

impl fmt::Debug for ImplementationDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ImplementationDescriptor")
            .field("implementation", &self.implementation)
            .field("lifetime", &self.lifetime)
            .field(
                "contracts",
                &self.contracts.iter().map(ContractNode::id).collect::<Vec<_>>(),
            )
            .field("service", &self.service.as_ref().map(ContractNode::id))
            .finish()
    }
}

/// Builder returned by [`ImplementationDescriptor::builder`].
///
/// Each contract needs an explicit upcast (`|i| i as Arc<dyn Trait>`) since
/// unsizing cannot be expressed generically; the derive macro writes these.
pub struct DescriptorBuilder<T> {
    implementation: ContractId,
    lifetime: Option<Lifetime>,
    contracts: Vec<ContractNode>,
    service: Option<ContractNode>,
    factory: FactoryFn,
    casters: HashMap<ContractId, CasterFn>,
    _marker: PhantomData<fn() -> T>,
}

impl<T: Send + Sync + 'static> DescriptorBuilder<T> {
    pub fn lifetime(mut self, lifetime: Lifetime) -> Self {
        self.lifetime = Some(lifetime);
        self
    }

    /// Declare that `T` implements contract `C`.
    pub fn implements<C>(mut self, upcast: fn(Arc<T>) -> Arc<C>) -> Self
    where
        C: ?Sized + Contract + Send + Sync,
    {
        let node = C::node();
        self.casters.insert(node.id(), caster::<T, C>(upcast));
        if !self.contracts.iter().any(|c| c.id() == node.id()) {
            self.contracts.push(node);
        }
        self
    }

    /// Register casters for every contract `C` extends, directly or not.
    ///
    /// Full-closure scanning binds `T` under those ancestors as well; without
    /// a caster for each of them the scan fails.
    pub fn inherits<C>(self) -> Self
    where
        C: ?Sized + Upcast<T>,
    {
        C::supertypes(self)
    }

    /// Make `T` castable to `C` and its supertypes without declaring `C`.
    pub fn cast<C>(mut self) -> Self
    where
        C: ?Sized + Upcast<T> + Send + Sync,
    {
        let id = ContractId::of::<C>();
        if self.casters.contains_key(&id) {
            return self;
        }
        self.casters.insert(id, caster::<T, C>(<C as Upcast<T>>::upcast));
        C::supertypes(self)
    }

    /// Register `T` under `C` only, bypassing contract resolution.
    pub fn service<C>(mut self, upcast: fn(Arc<T>) -> Arc<C>) -> Self
    where
        C: ?Sized + Contract + Send + Sync,
    {
        let node = C::node();
        self.casters.insert(node.id(), caster::<T, C>(upcast));
        self.service = Some(node);
        self
    }

    pub fn build(mut self) -> ImplementationDescriptor {
        // self-binding always works, whatever the resolved contract set
        self.casters
            .insert(self.implementation, caster::<T, T>(|instance| instance));
        ImplementationDescriptor {
            implementation: self.implementation,
            lifetime: self.lifetime,
            contracts: self.contracts,
            service: self.service,
            factory: self.factory,
            casters: self.casters,
        }
    }
}

fn caster<T, C>(upcast: fn(Arc<T>) -> Arc<C>) -> CasterFn
where
    T: Send + Sync + 'static,
    C: ?Sized + Send + Sync + 'static,
{
    Arc::new(move |instance: Instance| {
        let concrete = instance
            .downcast::<T>()
            .map_err(|_| FornoError::DowncastFailed {
                type_name: std::any::type_name::<T>().to_string(),
            })?;
        Ok(Box::new(upcast(concrete)) as Box<dyn Any + Send + Sync>)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    trait Speaker: Send + Sync {
        fn speak(&self) -> &'static str;
    }

    impl Contract for dyn Speaker {
        fn node() -> ContractNode {
            ContractNode::leaf(ContractId::of::<dyn Speaker>())
        }
    }

    trait Singer: Speaker {}

    impl Contract for dyn Singer {
        fn node() -> ContractNode {
            ContractNode::new(
                ContractId::of::<dyn Singer>(),
                vec![<dyn Speaker as Contract>::node()],
            )
        }
    }

    impl<T: Speaker + 'static> Upcast<T> for dyn Speaker {
        fn upcast(instance: Arc<T>) -> Arc<Self> {
            instance
        }
    }

    impl<T: Singer + 'static> Upcast<T> for dyn Singer {
        fn upcast(instance: Arc<T>) -> Arc<Self> {
            instance
        }

        fn supertypes(builder: DescriptorBuilder<T>) -> DescriptorBuilder<T> {
            builder.cast::<dyn Speaker>()
        }
    }

    struct Parrot;

    struct Canary;

    impl Speaker for Canary {
        fn speak(&self) -> &'static str {
            "tweet"
        }
    }

    impl Singer for Canary {}

    impl Speaker for Parrot {
        fn speak(&self) -> &'static str {
            "squawk"
        }
    }

    fn parrot() -> ImplementationDescriptor {
        ImplementationDescriptor::builder(|_| Ok(Parrot))
            .implements::<dyn Speaker>(|p| p as Arc<dyn Speaker>)
            .implements::<dyn Speaker>(|p| p as Arc<dyn Speaker>)
            .build()
    }

    #[test]
    fn test_builder_deduplicates_contracts() {
        let descriptor = parrot();
        assert_eq!(descriptor.contracts().len(), 1);
        assert_eq!(descriptor.declared_lifetime(), None);
        assert_eq!(descriptor.implementation(), ContractId::of::<Parrot>());
    }

    #[test]
    fn test_casters_cover_contracts_and_self() {
        let descriptor = parrot();
        let instance: Instance = Arc::new(Parrot);

        let caster = &descriptor.casters()[&ContractId::of::<dyn Speaker>()];
        let boxed = caster(Arc::clone(&instance)).unwrap();
        let speaker = boxed.downcast::<Arc<dyn Speaker>>().unwrap();
        assert_eq!(speaker.speak(), "squawk");

        let caster = &descriptor.casters()[&ContractId::of::<Parrot>()];
        assert!(caster(instance).unwrap().downcast::<Arc<Parrot>>().is_ok());
    }

    #[test]
    fn test_caster_rejects_foreign_instance() {
        let descriptor = parrot();
        let caster = &descriptor.casters()[&ContractId::of::<dyn Speaker>()];
        let err = caster(Arc::new(42_u32)).unwrap_err();
        assert!(matches!(err, FornoError::DowncastFailed { .. }));
    }

    #[test]
    fn test_inherits_registers_supertype_casters() {
        let descriptor = ImplementationDescriptor::builder(|_| Ok(Canary))
            .implements::<dyn Singer>(|canary| canary as Arc<dyn Singer>)
            .inherits::<dyn Singer>()
            .build();

        // only the declared contract is listed
        assert_eq!(descriptor.contracts().len(), 1);
        let caster = &descriptor.casters()[&ContractId::of::<dyn Speaker>()];
        let speaker = caster(Arc::new(Canary))
            .unwrap()
            .downcast::<Arc<dyn Speaker>>()
            .unwrap();
        assert_eq!(speaker.speak(), "tweet");
    }
}
