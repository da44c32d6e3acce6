use crate::domain::{DomainError, Ingredient, IngredientDraft};
use crate::infrastructure::{Add, Get, ListAll, Remove, Update};
use async_trait::async_trait;
use forno::prelude::{Injectable, contract};
use std::sync::Arc;
use uuid::Uuid;

#[contract]
#[async_trait]
pub trait IngredientService: Send + Sync {
    async fn create(&self, draft: IngredientDraft) -> Result<Ingredient, DomainError>;
    async fn get(&self, id: Uuid) -> Result<Ingredient, DomainError>;
    /// Every ingredient, ordered by name.
    async fn list(&self) -> Vec<Ingredient>;
    async fn update(&self, id: Uuid, draft: IngredientDraft) -> Result<(), DomainError>;
    async fn remove(&self, id: Uuid) -> Result<(), DomainError>;
}

#[derive(Injectable)]
#[injectable(contracts(dyn IngredientService))]
pub struct IngredientCatalog {
    adder: Arc<dyn Add<Ingredient>>,
    finder: Arc<dyn Get<Ingredient>>,
    lister: Arc<dyn ListAll<Ingredient>>,
    updater: Arc<dyn Update<Ingredient>>,
    remover: Arc<dyn Remove<Ingredient>>,
}

#[async_trait]
impl IngredientService for IngredientCatalog {
    async fn create(&self, draft: IngredientDraft) -> Result<Ingredient, DomainError> {
        let ingredient = Ingredient::create(draft)?;
        self.adder.add(ingredient.clone()).await;
        tracing::info!(id = %ingredient.id, name = %ingredient.name, "ingredient created");
        Ok(ingredient)
    }

    async fn get(&self, id: Uuid) -> Result<Ingredient, DomainError> {
        self.finder
            .get(id)
            .await
            .ok_or_else(|| DomainError::not_found("Ingredient", id))
    }

    async fn list(&self) -> Vec<Ingredient> {
        let mut ingredients = self.lister.list_all().await;
        ingredients.sort_by(|a, b| a.name.cmp(&b.name));
        ingredients
    }

    async fn update(&self, id: Uuid, draft: IngredientDraft) -> Result<(), DomainError> {
        draft.validate()?;
        let mut ingredient = self.get(id).await?;
        ingredient.update(draft)?;
        if !self.updater.update(ingredient).await {
            return Err(DomainError::not_found("Ingredient", id));
        }
        Ok(())
    }

    async fn remove(&self, id: Uuid) -> Result<(), DomainError> {
        if self.remover.remove(id).await {
            tracing::info!(%id, "ingredient removed");
            Ok(())
        } else {
            Err(DomainError::not_found("Ingredient", id))
        }
    }
}
