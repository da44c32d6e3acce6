use crate::di::injectable::Instance;
use crate::di::{Container, ContractId, Injector};
use crate::error::Result;
use dashmap::DashMap;
use std::sync::Arc;

/// A request scope
///
/// Scoped bindings resolve to one instance per scope. The `Inject` extractor
/// opens one scope per request and shares it between all extractors of that
/// request; dropping the scope drops its instances.
pub struct Scope {
    container: Arc<Container>,
    instances: DashMap<ContractId, Instance>,
}

impl Scope {
    pub fn new(container: Arc<Container>) -> Self {
        Self {
            container,
            instances: DashMap::new(),
        }
    }

    pub fn resolve<T: ?Sized + Send + Sync + 'static>(&self) -> Result<Arc<T>> {
        Injector::scoped(&self.container, self).resolve::<T>()
    }

    pub fn container(&self) -> &Arc<Container> {
        &self.container
    }

    pub(crate) fn instances(&self) -> &DashMap<ContractId, Instance> {
        &self.instances
    }
}
