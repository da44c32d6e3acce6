use crate::di::{Container, HasContainer};
use crate::feature::RouteTable;
use std::sync::Arc;

/// Router state shared by every handler of a composed application.
#[derive(Clone)]
pub struct AppState {
    container: Arc<Container>,
    routes: Arc<RouteTable>,
}

impl AppState {
    pub fn new(container: Arc<Container>, routes: Arc<RouteTable>) -> Self {
        Self { container, routes }
    }

    pub fn container(&self) -> &Arc<Container> {
        &self.container
    }

    pub fn routes(&self) -> &RouteTable {
        &self.routes
    }
}

impl HasContainer for AppState {
    fn get_container(&self) -> &Arc<Container> {
        &self.container
    }
}
