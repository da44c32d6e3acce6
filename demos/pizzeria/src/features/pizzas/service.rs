use crate::domain::{DomainError, Ingredient, Pizza, PizzaDraft};
use crate::infrastructure::{Add, Get, ListAll};
use async_trait::async_trait;
use forno::prelude::{Injectable, contract};
use std::sync::Arc;
use uuid::Uuid;

#[contract]
#[async_trait]
pub trait PizzaService: Send + Sync {
    async fn create(&self, draft: PizzaDraft) -> Result<Pizza, DomainError>;
    async fn get(&self, id: Uuid) -> Result<Pizza, DomainError>;
    async fn list(&self) -> Vec<Pizza>;
}

#[derive(Injectable)]
#[injectable(contracts(dyn PizzaService))]
pub struct PizzaKitchen {
    pizzas: Arc<dyn Add<Pizza>>,
    finder: Arc<dyn Get<Pizza>>,
    menu: Arc<dyn ListAll<Pizza>>,
    ingredients: Arc<dyn Get<Ingredient>>,
}

#[async_trait]
impl PizzaService for PizzaKitchen {
    async fn create(&self, draft: PizzaDraft) -> Result<Pizza, DomainError> {
        draft.validate()?;

        let mut ingredients = Vec::with_capacity(draft.ingredients.len());
        for id in &draft.ingredients {
            let ingredient = self
                .ingredients
                .get(*id)
                .await
                .ok_or_else(|| DomainError::not_found("Ingredient", *id))?;
            ingredients.push(ingredient);
        }

        let pizza = Pizza::create(draft, ingredients)?;
        self.pizzas.add(pizza.clone()).await;
        tracing::info!(id = %pizza.id, name = %pizza.name, price = pizza.price, "pizza created");
        Ok(pizza)
    }

    async fn get(&self, id: Uuid) -> Result<Pizza, DomainError> {
        self.finder
            .get(id)
            .await
            .ok_or_else(|| DomainError::not_found("Pizza", id))
    }

    async fn list(&self) -> Vec<Pizza> {
        let mut pizzas = self.menu.list_all().await;
        pizzas.sort_by(|a, b| a.name.cmp(&b.name));
        pizzas
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::pizzas::PizzasModule;
    use forno::prelude::Scope;

    fn draft(ingredients: Vec<Uuid>) -> PizzaDraft {
        PizzaDraft {
            name: "Marinara".to_string(),
            description: "Tomato, garlic and oregano".to_string(),
            url: "https://example.com/marinara.png".to_string(),
            ingredients,
        }
    }

    #[tokio::test]
    async fn test_create_resolves_ingredients_from_the_shared_store() {
        let scope = Scope::new(Arc::new(PizzasModule::create_container().unwrap()));
        let add = scope.resolve::<dyn Add<Ingredient>>().unwrap();
        let garlic = Ingredient {
            id: Uuid::new_v4(),
            name: "Garlic".to_string(),
            cost: 0.5,
        };
        add.add(garlic.clone()).await;

        let kitchen = scope.resolve::<dyn PizzaService>().unwrap();
        let pizza = kitchen.create(draft(vec![garlic.id])).await.unwrap();
        assert!((pizza.price - 0.6).abs() < 1e-9);
        assert_eq!(kitchen.get(pizza.id).await.unwrap(), pizza);

        let missing = Uuid::new_v4();
        match kitchen.create(draft(vec![garlic.id, missing])).await {
            Err(DomainError::NotFound { entity, id }) => {
                assert_eq!(entity, "Ingredient");
                assert_eq!(id, missing);
            }
            other => panic!("unexpected {other:?}"),
        }
        assert_eq!(kitchen.list().await.len(), 1);
    }
}
