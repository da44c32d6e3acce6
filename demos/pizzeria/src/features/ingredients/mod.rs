//! Ingredient catalogue: create, read, list, replace and delete.

mod service;

pub use service::{IngredientCatalog, IngredientService};

use crate::domain::{DomainError, Ingredient, IngredientDraft};
use crate::infrastructure::InfrastructureModule;
use forno::prelude::{FeatureModule, Inject, Json, Path, RouteGroup, StatusCode, module};
use uuid::Uuid;

#[module(
    imports = [InfrastructureModule],
    providers = [IngredientCatalog],
    features = [IngredientsFeature],
)]
pub struct IngredientsModule;

#[derive(Default)]
pub struct IngredientsFeature;

impl FeatureModule for IngredientsFeature {
    fn add_routes(&self, routes: &mut RouteGroup) {
        routes.group("/ingredients", |group| {
            group
                .post("", create)
                .name("CreateIngredient")
                .summary("Create an ingredient")
                .produces(StatusCode::OK)
                .produces_problem(StatusCode::BAD_REQUEST);
            group
                .get("", list)
                .name("ListIngredients")
                .summary("List every ingredient")
                .produces(StatusCode::OK);
            group
                .get("/{id}", get_one)
                .name("GetIngredient")
                .summary("Get an ingredient by id")
                .produces(StatusCode::OK)
                .produces_problem(StatusCode::NOT_FOUND);
            group
                .put("/{id}", update)
                .name("UpdateIngredient")
                .summary("Replace an ingredient")
                .produces(StatusCode::NO_CONTENT)
                .produces_problem(StatusCode::BAD_REQUEST)
                .produces_problem(StatusCode::NOT_FOUND);
            group
                .delete("/{id}", remove)
                .name("DeleteIngredient")
                .summary("Delete an ingredient")
                .produces(StatusCode::NO_CONTENT)
                .produces_problem(StatusCode::NOT_FOUND);
        });
    }
}

async fn create(
    Inject(service): Inject<dyn IngredientService>,
    Json(draft): Json<IngredientDraft>,
) -> Result<Json<Ingredient>, DomainError> {
    service.create(draft).await.map(Json)
}

async fn list(Inject(service): Inject<dyn IngredientService>) -> Json<Vec<Ingredient>> {
    Json(service.list().await)
}

async fn get_one(
    Inject(service): Inject<dyn IngredientService>,
    Path(id): Path<Uuid>,
) -> Result<Json<Ingredient>, DomainError> {
    service.get(id).await.map(Json)
}

async fn update(
    Inject(service): Inject<dyn IngredientService>,
    Path(id): Path<Uuid>,
    Json(draft): Json<IngredientDraft>,
) -> Result<StatusCode, DomainError> {
    service.update(id, draft).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn remove(
    Inject(service): Inject<dyn IngredientService>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, DomainError> {
    service.remove(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
