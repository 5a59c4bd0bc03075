pub mod driver;
pub mod public;

use axum::Router;

use crate::state::AppState;

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .merge(public::router())
        .nest("/dashboard", driver::router(state.clone()))
        .with_state(state)
}
