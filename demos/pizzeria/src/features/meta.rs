use forno::prelude::{AppState, FeatureModule, Json, RouteGroup, RouteTable, State, StatusCode};

/// Publishes the composed route manifest at `GET /routes`.
#[derive(Default)]
pub struct MetaFeature;

impl FeatureModule for MetaFeature {
    fn add_routes(&self, routes: &mut RouteGroup) {
        routes
            .get("/routes", manifest)
            .name("RouteManifest")
            .summary("Every route with its metadata")
            .tag("meta")
            .produces(StatusCode::OK)
            .allow_anonymous();
    }
}

async fn manifest(State(state): State<AppState>) -> Json<RouteTable> {
    Json(state.routes().clone())
}
