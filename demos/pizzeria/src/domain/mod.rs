//! Pizzeria entities, their validation rules and the errors handlers return.

mod error;
mod ingredient;
mod pizza;

pub use error::DomainError;
pub use ingredient::{Ingredient, IngredientDraft};
pub use pizza::{IngredientRef, MARKUP, Pizza, PizzaDraft};
