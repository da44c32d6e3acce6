mod persistence;
mod tokens;

pub use persistence::{Add, Entity, Get, InMemoryDatabase, ListAll, Remove, Repository, Update};
pub use tokens::{Claims, IssuedToken, JwtTokens};

use crate::domain::{Ingredient, Pizza};
use forno::module;

/// Storage and token plumbing shared by every feature.
#[module(providers = [InMemoryDatabase, Repository<Ingredient>, Repository<Pizza>, JwtTokens])]
pub struct InfrastructureModule;
