use super::error::Violations;
use super::{DomainError, Ingredient};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Price multiplier applied to the ingredient cost.
pub const MARKUP: f64 = 1.20;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IngredientRef {
    pub id: Uuid,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pizza {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub url: String,
    pub price: f64,
    pub ingredients: Vec<IngredientRef>,
}

impl Pizza {
    /// Build a pizza from a validated draft and its resolved ingredients.
    ///
    /// Repeated ingredients count once.
    pub fn create(draft: PizzaDraft, ingredients: Vec<Ingredient>) -> Result<Self, DomainError> {
        draft.validate()?;

        let mut unique: Vec<Ingredient> = Vec::with_capacity(ingredients.len());
        for ingredient in ingredients {
            if !unique.iter().any(|known| known.id == ingredient.id) {
                unique.push(ingredient);
            }
        }
        let cost: f64 = unique.iter().map(|ingredient| ingredient.cost).sum();

        Ok(Self {
            id: Uuid::new_v4(),
            name: draft.name.trim().to_string(),
            description: draft.description.trim().to_string(),
            url: draft.url.trim().to_string(),
            price: round_cents(cost * MARKUP),
            ingredients: unique
                .into_iter()
                .map(|ingredient| IngredientRef {
                    id: ingredient.id,
                    name: ingredient.name,
                })
                .collect(),
        })
    }
}

fn round_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Request body for creating a pizza.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PizzaDraft {
    pub name: String,
    pub description: String,
    pub url: String,
    pub ingredients: Vec<Uuid>,
}

impl PizzaDraft {
    pub fn validate(&self) -> Result<(), DomainError> {
        let name = self.name.trim().chars().count();
        let description = self.description.trim().chars().count();
        let url = self.url.trim();

        let mut violations = Violations::default();
        violations.check(
            (3..=100).contains(&name),
            "Name must be between 3 and 100 characters.",
        );
        violations.check(
            (10..=500).contains(&description),
            "Description must be between 10 and 500 characters.",
        );
        violations.check(is_web_url(url), "Url must be an absolute http or https URL.");
        violations.finish()
    }
}

fn is_web_url(url: &str) -> bool {
    url.strip_prefix("https://")
        .or_else(|| url.strip_prefix("http://"))
        .and_then(|rest| rest.split(['/', '?', '#']).next())
        .is_some_and(|host| !host.is_empty() && !host.contains(char::is_whitespace))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ingredient(name: &str, cost: f64) -> Ingredient {
        Ingredient {
            id: Uuid::new_v4(),
            name: name.to_string(),
            cost,
        }
    }

    fn draft() -> PizzaDraft {
        PizzaDraft {
            name: "Margherita".to_string(),
            description: "Tomato, mozzarella and basil".to_string(),
            url: "https://example.com/margherita.png".to_string(),
            ingredients: Vec::new(),
        }
    }

    #[test]
    fn test_price_is_marked_up_cost() {
        let cheese = ingredient("Mozzarella", 2.5);
        let basil = ingredient("Basil", 1.5);
        let pizza = Pizza::create(draft(), vec![cheese.clone(), basil, cheese]).unwrap();

        assert_eq!(pizza.ingredients.len(), 2);
        assert!((pizza.price - 4.8).abs() < 1e-9);
    }

    #[test]
    fn test_draft_rules() {
        let mut bad = draft();
        bad.name = "Ma".to_string();
        bad.url = "ftp://example.com".to_string();
        match bad.validate() {
            Err(DomainError::Validation(errors)) => assert_eq!(errors.len(), 2),
            other => panic!("unexpected {other:?}"),
        }
        assert!(is_web_url("http://localhost:8080/a"));
        assert!(!is_web_url("https://"));
    }
}
