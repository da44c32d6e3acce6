use proc_macro::TokenStream;

mod contract;
mod injectable;
mod module;

/// Derive macro for making a struct discoverable by the component scanner
///
/// Fields of type `Arc<T>` are resolved from the container (`T` may be a
/// `dyn Contract`); every other field is built with `Default::default()`.
///
/// Options, all optional:
/// - `lifetime = "transient" | "scoped" | "singleton"`
/// - `contracts(dyn A, dyn B)`: the contracts the type implements
/// - `service = dyn X`: bind under `X` only
///
/// # Example
/// ```ignore
/// use forno::prelude::*;
///
/// #[derive(Injectable)]
/// #[injectable(lifetime = "scoped", contracts(dyn PizzaService))]
/// pub struct DefaultPizzaService {
///     pizzas: Arc<dyn Add<Pizza>>,
///     ingredients: Arc<dyn Get<Ingredient>>,
/// }
/// ```
#[proc_macro_derive(Injectable, attributes(injectable))]
pub fn derive_injectable(input: TokenStream) -> TokenStream {
    injectable::derive_injectable(input)
}

/// Attribute macro marking a trait as a contract
///
/// Implements `forno::di::Contract` for `dyn Trait`, recording its
/// supertraits so the scanner can tell which contracts absorb which, and
/// `forno::di::Upcast` for every implementor so inherited contracts can be
/// resolved. Supertraits other than the std marker traits must be contracts
/// too, and the trait must be `Send + Sync` itself or through a supertrait.
///
/// # Example
/// ```ignore
/// #[contract]
/// pub trait Get<T>: Send + Sync {
///     fn get(&self, id: Uuid) -> Option<T>;
/// }
/// ```
#[proc_macro_attribute]
pub fn contract(attr: TokenStream, item: TokenStream) -> TokenStream {
    contract::contract_attribute(attr, item)
}

/// Attribute macro for defining a module with providers and feature modules
///
/// # Example
/// ```ignore
/// use forno::module;
///
/// #[module(
///     imports = [InfrastructureModule],
///     providers = [DefaultPizzaService],
///     features = [PizzaFeature],
/// )]
/// pub struct PizzaModule;
/// ```
#[proc_macro_attribute]
pub fn module(attr: TokenStream, item: TokenStream) -> TokenStream {
    module::module_attribute(attr, item)
}
