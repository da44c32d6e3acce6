use crate::di::CodeUnit;
use crate::feature::FeatureEntry;

/// Trait for application modules
///
/// A module declares the injectable providers it contributes (as a
/// [`CodeUnit`]) and the feature modules that expose them over HTTP. Modules
/// are typically defined using the `#[module]` macro, which also folds in the
/// units and features of imported modules.
///
/// # Example
/// ```
/// use forno::prelude::*;
///
/// #[derive(Injectable)]
/// #[injectable(lifetime = "singleton")]
/// pub struct Oven {}
///
/// #[derive(Default)]
/// pub struct OvenFeature;
///
/// impl FeatureModule for OvenFeature {
///     fn add_routes(&self, routes: &mut RouteGroup) {
///         routes.get("/oven", || async { "hot" });
///     }
/// }
///
/// #[module(providers = [Oven], features = [OvenFeature])]
/// pub struct KitchenModule;
///
/// assert_eq!(KitchenModule::unit().len(), 1);
/// assert_eq!(KitchenModule::features().len(), 1);
/// ```
pub trait Module {
    /// The providers of this module and of everything it imports.
    fn unit() -> CodeUnit;

    /// The feature modules of this module and of everything it imports.
    fn features() -> Vec<FeatureEntry> {
        Vec::new()
    }
}
