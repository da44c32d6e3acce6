use crate::di::DescriptorBuilder;
use std::any::TypeId;
use std::cmp::Ordering;
use std::collections::BTreeSet;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

/// Identity of a contract (`dyn Trait`) or of a concrete implementation type.
///
/// Two ids are equal iff their `TypeId`s are equal; the type name is carried
/// only for diagnostics.
#[derive(Clone, Copy)]
pub struct ContractId {
    type_id: TypeId,
    name: &'static str,
}

impl ContractId {
    pub fn of<T: ?Sized + 'static>() -> Self {
        Self {
            type_id: TypeId::of::<T>(),
            name: std::any::type_name::<T>(),
        }
    }

    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// The type name without its module path, e.g. `PizzaService` or
    /// `dyn Add<Ingredient>`. Used as the key for configuration overrides.
    pub fn short_name(&self) -> String {
        short_type_name(self.name)
    }
}

fn short_type_name(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut segment = String::new();
    for ch in name.chars() {
        match ch {
            ':' => segment.clear(),
            '<' | '>' | ',' | ' ' | '(' | ')' | '[' | ']' | '&' | ';' => {
                out.push_str(&segment);
                segment.clear();
                out.push(ch);
            }
            _ => segment.push(ch),
        }
    }
    out.push_str(&segment);
    out
}

impl PartialEq for ContractId {
    fn eq(&self, other: &Self) -> bool {
        self.type_id == other.type_id
    }
}

impl Eq for ContractId {}

impl Hash for ContractId {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.type_id.hash(state);
    }
}

impl PartialOrd for ContractId {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ContractId {
    fn cmp(&self, other: &Self) -> Ordering {
        self.type_id.cmp(&other.type_id)
    }
}

impl fmt::Debug for ContractId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

impl fmt::Display for ContractId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

/// A contract together with its supertrait graph.
///
/// `supertypes` holds the direct supertraits; each carries its own, so the
/// full ancestry is reachable from any node. Trait hierarchies are acyclic,
/// so the walk always terminates.
#[derive(Debug, Clone)]
pub struct ContractNode {
    id: ContractId,
    supertypes: Vec<ContractNode>,
}

impl ContractNode {
    pub fn new(id: ContractId, supertypes: Vec<ContractNode>) -> Self {
        Self { id, supertypes }
    }

    pub fn leaf(id: ContractId) -> Self {
        Self::new(id, Vec::new())
    }

    pub fn of<C: ?Sized + Contract>() -> Self {
        C::node()
    }

    pub fn id(&self) -> ContractId {
        self.id
    }

    pub fn supertypes(&self) -> &[ContractNode] {
        &self.supertypes
    }

    /// Direct and transitive supertypes, excluding the contract itself.
    pub fn ancestors(&self) -> BTreeSet<ContractId> {
        let mut seen = BTreeSet::new();
        let mut stack: Vec<&ContractNode> = self.supertypes.iter().collect();
        while let Some(node) = stack.pop() {
            if seen.insert(node.id) {
                stack.extend(node.supertypes.iter());
            }
        }
        seen
    }

    pub fn extends(&self, other: ContractId) -> bool {
        self.ancestors().contains(&other)
    }
}

/// Marker for trait-object types that components may be bound against.
///
/// Implemented for `dyn Trait` by the `#[contract]` attribute, or by hand:
///
/// ```
/// use forno::di::{Contract, ContractId, ContractNode};
///
/// pub trait Reader: Send + Sync {}
/// pub trait Store: Reader {}
///
/// impl Contract for dyn Reader {
///     fn node() -> ContractNode {
///         ContractNode::leaf(ContractId::of::<dyn Reader>())
///     }
/// }
///
/// impl Contract for dyn Store {
///     fn node() -> ContractNode {
///         ContractNode::new(
///             ContractId::of::<dyn Store>(),
///             vec![<dyn Reader as Contract>::node()],
///         )
///     }
/// }
///
/// assert!(ContractNode::of::<dyn Store>().extends(ContractId::of::<dyn Reader>()));
/// ```
pub trait Contract: 'static {
    fn node() -> ContractNode;
}

/// Views an implementation `T` as this contract.
///
/// `#[contract]` implements this for every `T` that implements the trait, and
/// `supertypes` registers casters for each contract the trait extends. That is
/// what lets full-closure scanning bind a type under inherited contracts it
/// never names.
pub trait Upcast<T: Send + Sync + 'static>: Contract {
    fn upcast(instance: Arc<T>) -> Arc<Self>;

    fn supertypes(builder: DescriptorBuilder<T>) -> DescriptorBuilder<T> {
        builder
    }
}
