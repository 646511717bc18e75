//! Application router configuration.

use axum::{Router, routing::get};

use crate::{
    AppState,
    cors::CorsConfig,
    endpoints,
    not_found::get_404_not_found,
    transaction::{create_transaction_endpoint, list_transactions_endpoint},
};

/// Return a router with all the app's routes.
pub fn build_router(state: AppState, cors_config: &CorsConfig) -> Router {
    Router::new()
        .route(
            endpoints::TRANSACTIONS,
            get(list_transactions_endpoint).post(create_transaction_endpoint),
        )
        .fallback(get_404_not_found)
        .layer(cors_config.layer())
        .with_state(state)
}
