//! Defines the endpoint for listing transactions a page at a time.
use std::sync::{Arc, Mutex};

use axum::{
    Json,
    extract::{FromRef, State},
};
use rusqlite::Connection;

use crate::{
    AppState, Error,
    db::acquire_connection,
    pagination::{Pagination, PaginationConfig, PaginationQuery},
    transaction::{Transaction, core::list_transactions},
    validation::ValidatedQuery,
};

/// The state needed to list transactions.
#[derive(Debug, Clone)]
pub struct ListTransactionsState {
    /// The database connection for managing transactions.
    pub db_connection: Arc<Mutex<Connection>>,
    /// The default window for requests that omit `skip` or `limit`.
    pub pagination_config: PaginationConfig,
}

impl FromRef<AppState> for ListTransactionsState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            pagination_config: state.pagination_config.clone(),
        }
    }
}

/// A route handler for listing transactions in the order they were created.
///
/// Takes the optional query parameters `skip` and `limit`.
pub async fn list_transactions_endpoint(
    State(state): State<ListTransactionsState>,
    ValidatedQuery(query): ValidatedQuery<PaginationQuery>,
) -> Result<Json<Vec<Transaction>>, Error> {
    let pagination = Pagination::resolve(query, &state.pagination_config);

    let connection = acquire_connection(&state.db_connection)?;

    let transactions = list_transactions(pagination, &connection)?;

    Ok(Json(transactions))
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use axum::{Json, extract::State};
    use rusqlite::Connection;

    use crate::{
        Error,
        db::initialize,
        pagination::{PaginationConfig, PaginationQuery},
        transaction::{
            NewTransaction, create_transaction,
            list_endpoint::{ListTransactionsState, list_transactions_endpoint},
        },
        validation::ValidatedQuery,
    };

    fn get_test_state(transaction_count: usize) -> ListTransactionsState {
        let conn = Connection::open_in_memory().unwrap();
        initialize(&conn).unwrap();

        for i in 0..transaction_count {
            create_transaction(
                &NewTransaction {
                    amount: i as f64,
                    category: "misc".to_owned(),
                    description: format!("transaction #{i}"),
                    is_income: i % 2 == 0,
                    date: "2024-01-01".to_owned(),
                },
                &conn,
            )
            .unwrap();
        }

        ListTransactionsState {
            db_connection: Arc::new(Mutex::new(conn)),
            pagination_config: PaginationConfig::default(),
        }
    }

    #[tokio::test]
    async fn uses_default_window() {
        let state = get_test_state(120);

        let Json(transactions) =
            list_transactions_endpoint(State(state), ValidatedQuery(PaginationQuery::default()))
                .await
                .unwrap();

        assert_eq!(transactions.len(), 100);
        assert_eq!(transactions[0].id, 1);
        assert_eq!(transactions[99].id, 100);
    }

    #[tokio::test]
    async fn uses_configured_defaults() {
        let mut state = get_test_state(10);
        state.pagination_config = PaginationConfig {
            default_skip: 0,
            default_limit: 3,
        };

        let Json(transactions) =
            list_transactions_endpoint(State(state), ValidatedQuery(PaginationQuery::default()))
                .await
                .unwrap();

        assert_eq!(transactions.len(), 3);
    }

    #[tokio::test]
    async fn applies_query_window() {
        let state = get_test_state(10);
        let query = PaginationQuery {
            skip: Some(8),
            limit: Some(5),
        };

        let Json(transactions) = list_transactions_endpoint(State(state), ValidatedQuery(query))
            .await
            .unwrap();

        let ids: Vec<_> = transactions.iter().map(|transaction| transaction.id).collect();
        assert_eq!(ids, vec![9, 10]);
    }

    #[tokio::test]
    async fn releases_connection_on_storage_error() {
        let state = ListTransactionsState {
            db_connection: Arc::new(Mutex::new(Connection::open_in_memory().unwrap())),
            pagination_config: PaginationConfig::default(),
        };

        let result = list_transactions_endpoint(
            State(state.clone()),
            ValidatedQuery(PaginationQuery::default()),
        )
        .await;

        assert!(matches!(result, Err(Error::SqlError(_))));
        assert!(state.db_connection.try_lock().is_ok());
    }
}
