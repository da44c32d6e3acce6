use crate::di::{Container, Scope};
use crate::exception::ProblemDetails;
use axum::{extract::FromRequestParts, http::request::Parts};
use std::sync::Arc;

/// Axum extractor for dependency injection
///
/// Resolves `T` from the request's scope. The first `Inject` of a request
/// opens the scope and stores it in the request extensions, so every scoped
/// dependency is shared by all extractors of that request.
///
/// # Example
/// ```ignore
/// async fn list_ingredients(
///     Inject(ingredients): Inject<dyn ListAll<Ingredient>>,
/// ) -> Json<Vec<Ingredient>> {
///     Json(ingredients.list_all().await)
/// }
/// ```
pub struct Inject<T: ?Sized>(pub Arc<T>);

/// Trait that AppState must implement to provide the DI container
pub trait HasContainer {
    fn get_container(&self) -> &Arc<Container>;
}

impl<S, T> FromRequestParts<S> for Inject<T>
where
    S: Send + Sync + HasContainer,
    T: ?Sized + Send + Sync + 'static,
{
    type Rejection = ProblemDetails;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let scope = match parts.extensions.get::<Arc<Scope>>() {
            Some(scope) => Arc::clone(scope),
            None => {
                let scope = Arc::new(Scope::new(Arc::clone(state.get_container())));
                parts.extensions.insert(Arc::clone(&scope));
                scope
            }
        };

        scope.resolve::<T>().map(Inject).map_err(|e| {
            tracing::error!(error = %e, dependency = std::any::type_name::<T>(), "Dependency injection failed");
            ProblemDetails::internal().with_instance(parts.uri.path())
        })
    }
}

/// Deref implementation for convenient access to the inner service
impl<T: ?Sized> std::ops::Deref for Inject<T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<T: ?Sized> Clone for Inject<T> {
    fn clone(&self) -> Self {
        Inject(Arc::clone(&self.0))
    }
}
