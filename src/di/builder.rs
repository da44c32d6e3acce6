use crate::config::ConfigService;
use crate::di::resolver::ResolutionPolicy;
use crate::di::scanner::{CodeUnit, Scanner, ScannerConfig};
use crate::di::{Container, Injectable};
use crate::error::Result;

/// Builder for constructing a dependency injection container
///
/// Collects code units, then scans them once in [`build`](Self::build).
///
/// # Example
/// ```
/// use forno::prelude::*;
///
/// #[derive(Injectable)]
/// #[injectable(lifetime = "singleton")]
/// struct Oven {}
///
/// let container = ContainerBuilder::new().register::<Oven>().build().unwrap();
/// assert!(container.resolve::<Oven>().is_ok());
/// ```
#[derive(Debug, Default)]
pub struct ContainerBuilder {
    units: Vec<CodeUnit>,
    loose: Option<CodeUnit>,
    config: ScannerConfig,
}

impl ContainerBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Scanner settings read from the environment-backed config service.
    pub fn from_config(config: &ConfigService) -> Result<Self> {
        Ok(Self::new().config(ScannerConfig::from_config(config)?))
    }

    pub fn config(mut self, config: ScannerConfig) -> Self {
        self.config = config;
        self
    }

    pub fn policy(mut self, policy: ResolutionPolicy) -> Self {
        self.config.policy = policy;
        self
    }

    pub fn unit(mut self, unit: CodeUnit) -> Self {
        self.units.push(unit);
        self
    }

    /// Register a single injectable outside any code unit.
    pub fn register<T: Injectable>(mut self) -> Self {
        let loose = self.loose.take().unwrap_or_else(|| CodeUnit::new("registered"));
        self.loose = Some(loose.injectable::<T>());
        self
    }

    /// Scan everything collected so far and build the container.
    pub fn build(self) -> Result<Container> {
        let mut units = self.units;
        units.extend(self.loose);
        let outcome = Scanner::new(self.config).scan(&units)?;
        Ok(Container::new(outcome))
    }
}
