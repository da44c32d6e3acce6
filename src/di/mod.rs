//! Dependency injection: contract resolution, binding, scanning and the
//! runtime container.

mod builder;
mod container;
mod contract;
mod extractor;
mod injectable;
mod lifetime;
pub mod registry;
pub mod resolver;
pub mod scanner;
mod scope;

pub use builder::ContainerBuilder;
pub use container::{Container, Injector};
pub use contract::{Contract, ContractId, ContractNode, Upcast};
pub use extractor::{HasContainer, Inject};
pub use injectable::{DescriptorBuilder, ImplementationDescriptor, Injectable};
pub use lifetime::Lifetime;
pub use registry::{Binding, BindingRegistry, Bindings};
pub use resolver::{ContractResolver, ContractSet, ResolutionPolicy};
pub use scanner::{CodeUnit, ScanOutcome, Scanner, ScannerConfig};
pub use scope::Scope;
