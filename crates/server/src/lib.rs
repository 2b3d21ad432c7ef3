pub mod auth;
pub mod error;
pub mod routes;

use axum::Router;
use db::DBService;

#[derive(Clone)]
pub struct AppState {
    pub db: DBService,
}

impl AppState {
    pub fn new(db: DBService) -> Self {
        Self { db }
    }
}

/// The complete API surface, nested under `/api`.
pub fn app(state: AppState) -> Router {
    Router::new()
        .nest(
            "/api",
            Router::new()
                .merge(routes::health::router())
                .merge(routes::habits::router())
                .merge(routes::completions::router()),
        )
        .with_state(state)
}
