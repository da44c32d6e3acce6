pub mod auth;
pub mod ingredients;
pub mod meta;
pub mod pizzas;
