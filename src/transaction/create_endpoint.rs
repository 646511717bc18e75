//! Defines the endpoint for creating a new transaction.
use std::sync::{Arc, Mutex};

use axum::{
    Json,
    extract::{FromRef, State},
};
use rusqlite::Connection;

use crate::{
    AppState, Error,
    db::acquire_connection,
    transaction::{NewTransaction, Transaction, core::create_transaction},
    validation::ValidatedJson,
};

/// The state needed to create a transaction.
#[derive(Debug, Clone)]
pub struct CreateTransactionState {
    /// The database connection for managing transactions.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for CreateTransactionState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// A route handler for creating a new transaction, responds with the created transaction.
///
/// Malformed bodies are rejected with `422 Unprocessable Entity` before the database is touched.
pub async fn create_transaction_endpoint(
    State(state): State<CreateTransactionState>,
    ValidatedJson(new_transaction): ValidatedJson<NewTransaction>,
) -> Result<Json<Transaction>, Error> {
    let connection = acquire_connection(&state.db_connection)?;

    let transaction = create_transaction(&new_transaction, &connection)?;

    tracing::debug!("Created transaction {}", transaction.id);

    Ok(Json(transaction))
}
