//! In-memory persistence behind small generic repository contracts.
//!
//! Services depend on the narrowest contract they need (`dyn Get<Pizza>`,
//! `dyn Add<Ingredient>`, ...); one [`Repository`] per entity implements
//! all of them.

use crate::domain::{Ingredient, Pizza};
use async_trait::async_trait;
use dashmap::DashMap;
use forno::prelude::{Injectable, contract};
use std::marker::PhantomData;
use std::sync::Arc;
use uuid::Uuid;

#[contract]
#[async_trait]
pub trait Add<T: Send + 'static>: Send + Sync {
    async fn add(&self, entity: T);
}

#[contract]
#[async_trait]
pub trait Get<T: Send + 'static>: Send + Sync {
    async fn get(&self, id: Uuid) -> Option<T>;
}

#[contract]
#[async_trait]
pub trait Update<T: Send + 'static>: Send + Sync {
    /// Replace a stored entity. Returns false when it does not exist.
    async fn update(&self, entity: T) -> bool;
}

#[contract]
#[async_trait]
pub trait Remove<T: Send + 'static>: Send + Sync {
    async fn remove(&self, id: Uuid) -> bool;
}

#[contract]
#[async_trait]
pub trait ListAll<T: Send + 'static>: Send + Sync {
    async fn list_all(&self) -> Vec<T>;
}

/// The process-wide store.
#[derive(Debug, Default, Injectable)]
#[injectable(lifetime = "singleton")]
pub struct InMemoryDatabase {
    ingredients: DashMap<Uuid, Ingredient>,
    pizzas: DashMap<Uuid, Pizza>,
}

/// A stored entity and the table that holds it.
pub trait Entity: Clone + Send + Sync + 'static {
    fn id(&self) -> Uuid;

    fn table(db: &InMemoryDatabase) -> &DashMap<Uuid, Self>;
}

impl Entity for Ingredient {
    fn id(&self) -> Uuid {
        self.id
    }

    fn table(db: &InMemoryDatabase) -> &DashMap<Uuid, Self> {
        &db.ingredients
    }
}

impl Entity for Pizza {
    fn id(&self) -> Uuid {
        self.id
    }

    fn table(db: &InMemoryDatabase) -> &DashMap<Uuid, Self> {
        &db.pizzas
    }
}

#[derive(Injectable)]
#[injectable(contracts(dyn Add<T>, dyn Get<T>, dyn Update<T>, dyn Remove<T>, dyn ListAll<T>))]
pub struct Repository<T: Entity> {
    db: Arc<InMemoryDatabase>,
    entity: PhantomData<T>,
}

impl<T: Entity> Repository<T> {
    fn table(&self) -> &DashMap<Uuid, T> {
        T::table(&self.db)
    }
}

#[async_trait]
impl<T: Entity> Add<T> for Repository<T> {
    async fn add(&self, entity: T) {
        tracing::debug!(id = %entity.id(), "insert");
        self.table().insert(entity.id(), entity);
    }
}

#[async_trait]
impl<T: Entity> Get<T> for Repository<T> {
    async fn get(&self, id: Uuid) -> Option<T> {
        self.table().get(&id).map(|entry| entry.value().clone())
    }
}

#[async_trait]
impl<T: Entity> Update<T> for Repository<T> {
    async fn update(&self, entity: T) -> bool {
        match self.table().get_mut(&entity.id()) {
            Some(mut slot) => {
                *slot = entity;
                true
            }
            None => false,
        }
    }
}

#[async_trait]
impl<T: Entity> Remove<T> for Repository<T> {
    async fn remove(&self, id: Uuid) -> bool {
        self.table().remove(&id).is_some()
    }
}

#[async_trait]
impl<T: Entity> ListAll<T> for Repository<T> {
    async fn list_all(&self) -> Vec<T> {
        self.table().iter().map(|entry| entry.value().clone()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use forno::prelude::{ContainerBuilder, Scope};

    fn ingredient(name: &str) -> Ingredient {
        Ingredient {
            id: Uuid::new_v4(),
            name: name.to_string(),
            cost: 1.0,
        }
    }

    #[tokio::test]
    async fn test_repository_serves_every_contract_over_one_store() {
        let container = Arc::new(
            ContainerBuilder::new()
                .register::<InMemoryDatabase>()
                .register::<Repository<Ingredient>>()
                .build()
                .unwrap(),
        );

        let scope = Scope::new(Arc::clone(&container));
        let add = scope.resolve::<dyn Add<Ingredient>>().unwrap();
        let basil = ingredient("Basil");
        add.add(basil.clone()).await;

        // a second request sees the same singleton store
        let other = Scope::new(container);
        let get = other.resolve::<dyn Get<Ingredient>>().unwrap();
        assert_eq!(get.get(basil.id).await, Some(basil.clone()));

        let update = other.resolve::<dyn Update<Ingredient>>().unwrap();
        assert!(!update.update(ingredient("Ghost")).await);

        let remove = other.resolve::<dyn Remove<Ingredient>>().unwrap();
        assert!(remove.remove(basil.id).await);
        let list = other.resolve::<dyn ListAll<Ingredient>>().unwrap();
        assert!(list.list_all().await.is_empty());
    }

    #[test]
    fn test_pizza_contracts_are_distinct_from_ingredient_contracts() {
        let container = ContainerBuilder::new()
            .register::<InMemoryDatabase>()
            .register::<Repository<Pizza>>()
            .build()
            .unwrap();

        assert!(container.contains::<dyn Get<Pizza>>());
        assert!(!container.contains::<dyn Get<Ingredient>>());
    }
}
