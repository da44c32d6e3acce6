//! Pizza composition from stored ingredients.

mod service;

pub use service::{PizzaKitchen, PizzaService};

use crate::domain::{DomainError, Pizza, PizzaDraft};
use crate::infrastructure::InfrastructureModule;
use forno::prelude::{FeatureModule, Inject, Json, Path, RouteGroup, StatusCode, module};
use uuid::Uuid;

#[module(
    imports = [InfrastructureModule],
    providers = [PizzaKitchen],
    features = [PizzasFeature],
)]
pub struct PizzasModule;

#[derive(Default)]
pub struct PizzasFeature;

impl FeatureModule for PizzasFeature {
    fn add_routes(&self, routes: &mut RouteGroup) {
        routes.group("/pizzas", |group| {
            group
                .post("", create)
                .name("CreatePizza")
                .summary("Create a pizza")
                .description("Creates a pizza from existing ingredients; the price is the ingredient cost plus a 20% markup")
                .produces(StatusCode::OK)
                .produces_problem(StatusCode::BAD_REQUEST)
                .produces_problem(StatusCode::NOT_FOUND);
            group
                .get("", list)
                .name("ListPizzas")
                .summary("List every pizza")
                .produces(StatusCode::OK)
                .allow_anonymous();
            group
                .get("/{id}", get_one)
                .name("GetPizza")
                .summary("Get a pizza by id")
                .produces(StatusCode::OK)
                .produces_problem(StatusCode::NOT_FOUND)
                .allow_anonymous();
        });
    }
}

async fn create(
    Inject(service): Inject<dyn PizzaService>,
    Json(draft): Json<PizzaDraft>,
) -> Result<Json<Pizza>, DomainError> {
    service.create(draft).await.map(Json)
}

async fn list(Inject(service): Inject<dyn PizzaService>) -> Json<Vec<Pizza>> {
    Json(service.list().await)
}

async fn get_one(
    Inject(service): Inject<dyn PizzaService>,
    Path(id): Path<Uuid>,
) -> Result<Json<Pizza>, DomainError> {
    service.get(id).await.map(Json)
}
