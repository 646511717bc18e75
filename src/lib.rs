//! Ledger is a small web service for recording income and expenses.
//!
//! This library provides a JSON REST API for creating transactions and listing
//! them page by page. Transactions are stored in a SQLite database.

#![warn(missing_docs)]

use std::{net::SocketAddr, time::Duration};

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_server::Handle;
use serde_json::json;
use tokio::signal;

mod app_state;
mod cors;
mod database_id;
mod db;
mod endpoints;
mod logging;
mod not_found;
mod pagination;
mod routing;
mod transaction;
mod validation;

pub use app_state::AppState;
pub use cors::{CorsConfig, DEFAULT_ALLOWED_ORIGIN};
pub use database_id::TransactionId;
pub use db::initialize as initialize_db;
pub use logging::{LOG_BODY_LENGTH_LIMIT, logging_middleware};
pub use pagination::{Pagination, PaginationConfig, PaginationQuery};
pub use routing::build_router;
pub use transaction::{
    NewTransaction, Transaction, count_transactions, create_transaction, list_transactions,
};
pub use validation::{ValidationError, ValidationIssue};

/// An async task that waits for either the ctrl+c or terminate signal, whichever comes first, and
/// then signals the server to shut down gracefully.
///
/// `handle` is a handle to an Axum `Server`.
pub async fn graceful_shutdown(handle: Handle<SocketAddr>) {
    let ctrl_c = async {
        if let Err(error) = signal::ctrl_c().await {
            tracing::error!("failed to install Ctrl+C handler: {error}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(error) => {
                tracing::error!("failed to install signal handler: {error}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::debug!("Received ctrl+c signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
        _ = terminate => {
            tracing::debug!("Received terminate signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
    }
}

/// The errors that may occur in the application.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
    /// The request body or query string did not match the expected schema.
    ///
    /// The client should fix the fields listed in the error and try again.
    #[error("request validation failed: {0}")]
    Validation(ValidationError),

    /// The request body could not be read, e.g. it was larger than the body limit.
    ///
    /// `status` is the status code the rejection should be reported with.
    #[error("could not read the request body: {message}")]
    UnreadableBody {
        /// The HTTP status for the response, e.g. `413 Payload Too Large`.
        status: StatusCode,
        /// Why the body could not be read.
        message: String,
    },

    /// An unhandled/unexpected SQL error.
    ///
    /// The error should only be logged for debugging on the server. Clients
    /// only see a generic internal server error.
    #[error("an unexpected SQL error occurred: {0}")]
    SqlError(rusqlite::Error),

    /// Could not acquire the database lock
    #[error("could not acquire the database lock")]
    DatabaseLockError,
}

impl Error {
    /// Whether the error originated in the persistence layer.
    pub fn is_storage_error(&self) -> bool {
        matches!(self, Error::SqlError(_) | Error::DatabaseLockError)
    }
}

impl From<rusqlite::Error> for Error {
    fn from(value: rusqlite::Error) -> Self {
        Error::SqlError(value)
    }
}

impl From<ValidationError> for Error {
    fn from(value: ValidationError) -> Self {
        Error::Validation(value)
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        match self {
            Error::Validation(error) => {
                tracing::debug!("rejected request: {error}");
                error.into_response()
            }
            Error::UnreadableBody { status, message } => {
                tracing::debug!("rejected request body: {message}");
                (status, Json(json!({ "detail": message }))).into_response()
            }
            // Storage errors are not intended to be shown to the client. This is the only place
            // they are logged.
            error => {
                tracing::error!("An unexpected error occurred: {}", error);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({ "detail": "Internal Server Error" })),
                )
                    .into_response()
            }
        }
    }
}

#[cfg(test)]
mod error_tests {
    use std::{
        io::Write,
        sync::{Arc, Mutex},
    };

    use axum::{http::StatusCode, response::IntoResponse};
    use rusqlite::Connection;

    use crate::{Error, NewTransaction, ValidationError, ValidationIssue, create_transaction};

    /// Collects formatted log lines so tests can inspect them.
    #[derive(Clone, Default)]
    struct LogBuffer(Arc<Mutex<Vec<u8>>>);

    impl Write for LogBuffer {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    impl LogBuffer {
        fn contents(&self) -> String {
            String::from_utf8_lossy(&self.0.lock().unwrap()).to_string()
        }
    }

    #[test]
    fn sql_error_is_internal_server_error() {
        let response = Error::SqlError(rusqlite::Error::InvalidQuery).into_response();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn lock_error_is_internal_server_error() {
        let response = Error::DatabaseLockError.into_response();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn validation_error_is_unprocessable_entity() {
        let error = ValidationError::new(vec![ValidationIssue::new(
            ["body", "amount"],
            "invalid type",
            "type_error",
        )]);

        let response = Error::from(error).into_response();

        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[test]
    fn storage_errors_are_classified() {
        assert!(Error::DatabaseLockError.is_storage_error());
        assert!(Error::SqlError(rusqlite::Error::InvalidQuery).is_storage_error());
        assert!(!Error::Validation(ValidationError::new(Vec::new())).is_storage_error());
    }

    #[test]
    fn unreadable_body_uses_its_own_status() {
        let response = Error::UnreadableBody {
            status: StatusCode::PAYLOAD_TOO_LARGE,
            message: "length limit exceeded".to_owned(),
        }
        .into_response();

        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    }

    #[test]
    fn sql_error_is_logged_once() {
        let logs = LogBuffer::default();
        let writer = logs.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_ansi(false)
            .with_max_level(tracing::Level::ERROR)
            .with_writer(move || writer.clone())
            .finish();

        tracing::subscriber::with_default(subscriber, || {
            // No tables, so the insert fails.
            let conn = Connection::open_in_memory().unwrap();
            let error = create_transaction(
                &NewTransaction {
                    amount: 1.0,
                    category: "food".to_owned(),
                    description: "lunch".to_owned(),
                    is_income: false,
                    date: "2024-01-01".to_owned(),
                },
                &conn,
            )
            .unwrap_err();

            let response = error.into_response();
            assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        });

        assert_eq!(logs.contents().matches("ERROR").count(), 1);
    }
}
