use super::DomainError;
use super::error::Violations;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const MAX_COST: f64 = 10_000.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ingredient {
    pub id: Uuid,
    pub name: String,
    pub cost: f64,
}

impl Ingredient {
    pub fn create(draft: IngredientDraft) -> Result<Self, DomainError> {
        draft.validate()?;
        Ok(Self {
            id: Uuid::new_v4(),
            name: draft.name.trim().to_string(),
            cost: draft.cost,
        })
    }

    pub fn update(&mut self, draft: IngredientDraft) -> Result<(), DomainError> {
        draft.validate()?;
        self.name = draft.name.trim().to_string();
        self.cost = draft.cost;
        Ok(())
    }
}

/// Request body for creating or replacing an ingredient.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct IngredientDraft {
    pub name: String,
    pub cost: f64,
}

impl IngredientDraft {
    pub fn validate(&self) -> Result<(), DomainError> {
        let name = self.name.trim();
        let mut violations = Violations::default();
        if name.is_empty() {
            violations.check(false, "Name is required.");
        } else {
            let len = name.chars().count();
            violations.check(
                (2..=50).contains(&len),
                "Name must be between 2 and 50 characters.",
            );
        }
        violations.check(self.cost > 0.0, "Cost must be greater than 0.");
        violations.check(self.cost <= MAX_COST, "Cost must not exceed 10000.");
        violations.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft(name: &str, cost: f64) -> IngredientDraft {
        IngredientDraft {
            name: name.to_string(),
            cost,
        }
    }

    #[test]
    fn test_valid_draft_creates_ingredient() {
        let ingredient = Ingredient::create(draft("  Mozzarella ", 2.5)).unwrap();
        assert_eq!(ingredient.name, "Mozzarella");
        assert_eq!(ingredient.cost, 2.5);
    }

    #[test]
    fn test_invalid_draft_reports_every_violation() {
        match draft("", 0.0).validate() {
            Err(DomainError::Validation(errors)) => assert_eq!(
                errors,
                vec!["Name is required.", "Cost must be greater than 0."]
            ),
            other => panic!("unexpected {other:?}"),
        }
        assert!(draft("X", 1.0).validate().is_err());
        assert!(draft("Basil", 10_001.0).validate().is_err());
        assert!(draft("Basil", 10_000.0).validate().is_ok());
    }
}
