use crate::features::auth::AuthModule;
use crate::features::ingredients::IngredientsModule;
use crate::features::meta::MetaFeature;
use crate::features::pizzas::PizzasModule;
use crate::infrastructure::JwtTokens;
use forno::prelude::*;

/// Root application module
///
/// Every feature module imports the shared infrastructure; the scanner binds
/// each provider once however often it is imported.
#[module(
    imports = [IngredientsModule, PizzasModule, AuthModule],
    features = [MetaFeature],
)]
pub struct AppModule;

/// Compose the pizzeria from `config`.
///
/// Non-anonymous routes require a bearer token issued by `POST /auth/login`.
pub fn build_application(config: ConfigService) -> Result<Application> {
    let scanner = ScannerConfig::from_config(&config)?;
    Application::builder()
        .unit(CodeUnit::new("configuration").instance(config))
        .module::<AppModule>()
        .config(scanner)
        .authorization_from(|container| Ok(RequireBearer::new(container.resolve::<JwtTokens>()?)))
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Ingredient;
    use crate::infrastructure::{Add, InMemoryDatabase};
    use axum::body::{Body, to_bytes};
    use axum::http::{Request, header};
    use serde_json::{Value, json};
    use tower::ServiceExt;

    fn application() -> Application {
        let config = ConfigService::default();
        config.set("JWT_SECRET", "test-secret");
        build_application(config).unwrap()
    }

    async fn send(
        router: &Router,
        method: &str,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut request = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            request = request.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let body = match body {
            Some(json) => {
                request = request.header(header::CONTENT_TYPE, "application/json");
                Body::from(json.to_string())
            }
            None => Body::empty(),
        };

        let response = router.clone().oneshot(request.body(body).unwrap()).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, value)
    }

    async fn login(router: &Router) -> String {
        let credentials = json!({"username": "admin", "password": "admin123"});
        let (status, body) = send(router, "POST", "/auth/login", None, Some(credentials)).await;
        assert_eq!(status, StatusCode::OK);
        body["token"].as_str().unwrap().to_string()
    }

    #[tokio::test]
    async fn test_login_issues_a_usable_token() {
        let router = application().router();

        let wrong = json!({"username": "admin", "password": "nope"});
        let (status, body) = send(&router, "POST", "/auth/login", None, Some(wrong)).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["status"], 401);

        let token = login(&router).await;
        let (status, body) = send(&router, "GET", "/auth/me", Some(&token), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["username"], "admin");

        let (status, _) = send(&router, "GET", "/auth/me", Some("forged"), None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_ingredient_crud() {
        let router = application().router();
        let basil = json!({"name": "Basil", "cost": 0.5});

        let (status, _) = send(&router, "POST", "/ingredients", None, Some(basil.clone())).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let token = login(&router).await;
        let token = Some(token.as_str());
        let (status, created) = send(&router, "POST", "/ingredients", token, Some(basil)).await;
        assert_eq!(status, StatusCode::OK);
        let uri = format!("/ingredients/{}", created["id"].as_str().unwrap());

        let (status, fetched) = send(&router, "GET", &uri, token, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(fetched["name"], "Basil");

        let invalid = json!({"name": "B", "cost": 0});
        let (status, problem) = send(&router, "PUT", &uri, token, Some(invalid)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(problem["errors"].as_array().unwrap().len(), 2);

        let renamed = json!({"name": "Thai basil", "cost": 0.8});
        let (status, _) = send(&router, "PUT", &uri, token, Some(renamed)).await;
        assert_eq!(status, StatusCode::NO_CONTENT);

        let (status, list) = send(&router, "GET", "/ingredients", token, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(list[0]["name"], "Thai basil");

        let (status, _) = send(&router, "DELETE", &uri, token, None).await;
        assert_eq!(status, StatusCode::NO_CONTENT);
        let (status, problem) = send(&router, "GET", &uri, token, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(problem["title"], "Resource Not Found");
        let (status, _) = send(&router, "DELETE", &uri, token, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_pizza_price_and_missing_ingredient() {
        let app = application();
        let router = app.router();
        let token = login(&router).await;
        let token = Some(token.as_str());

        let mut ids = Vec::new();
        for (name, cost) in [("Mozzarella", 2.5), ("Tomato", 1.5)] {
            let (_, created) =
                send(&router, "POST", "/ingredients", token, Some(json!({"name": name, "cost": cost})))
                    .await;
            ids.push(created["id"].clone());
        }

        let pizza = json!({
            "name": "Margherita",
            "description": "Tomato sauce and mozzarella",
            "url": "https://example.com/margherita.png",
            "ingredients": ids,
        });
        let (status, created) = send(&router, "POST", "/pizzas", token, Some(pizza.clone())).await;
        assert_eq!(status, StatusCode::OK);
        assert!((created["price"].as_f64().unwrap() - 4.8).abs() < 1e-9);
        assert_eq!(created["ingredients"].as_array().unwrap().len(), 2);

        // reading the menu is anonymous
        let (status, menu) = send(&router, "GET", "/pizzas", None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(menu.as_array().unwrap().len(), 1);

        let mut unknown = pizza;
        unknown["ingredients"] = json!([uuid::Uuid::new_v4()]);
        let (status, _) = send(&router, "POST", "/pizzas", token, Some(unknown)).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_route_manifest_is_public() {
        let router = application().router();
        let (status, manifest) = send(&router, "GET", "/routes", None, None).await;
        assert_eq!(status, StatusCode::OK);

        let routes = manifest.as_array().unwrap();
        assert_eq!(routes.len(), 11);
        let login = routes
            .iter()
            .find(|route| route["path"] == "/auth/login")
            .unwrap();
        assert_eq!(login["method"], "POST");
        assert_eq!(login["requiresAuthorization"], false);
        assert_eq!(login["tags"], json!(["auth"]));
    }

    #[test]
    fn test_shared_infrastructure_is_bound_once() {
        let app = application();
        let container = app.container();

        let store = container.resolve::<InMemoryDatabase>().unwrap();
        let again = container.resolve::<InMemoryDatabase>().unwrap();
        assert!(Arc::ptr_eq(&store, &again));
        assert!(container.contains::<dyn Add<Ingredient>>());
        // repositories are scoped and only resolve inside a request
        assert!(container.resolve::<dyn Add<Ingredient>>().is_err());
    }
}
