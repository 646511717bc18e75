//! Sets up the application's database.

use std::sync::{Mutex, MutexGuard};

use rusqlite::{Connection, Transaction as SqlTransaction};

use crate::{Error, transaction::create_transaction_table};

/// Create the tables for the domain models.
///
/// Tables that already exist are left untouched, so it is safe to call this on every startup.
///
/// # Errors
/// Returns an [Error::SqlError] if the tables could not be created.
pub fn initialize(connection: &Connection) -> Result<(), Error> {
    let transaction =
        SqlTransaction::new_unchecked(connection, rusqlite::TransactionBehavior::Exclusive)?;

    create_transaction_table(&transaction)?;

    transaction.commit()?;

    Ok(())
}

/// Acquire the shared database connection for the duration of one operation.
///
/// The connection is released when the returned guard is dropped, on every exit path.
///
/// # Errors
/// Returns [Error::DatabaseLockError] if the lock is poisoned.
pub fn acquire_connection(
    db_connection: &Mutex<Connection>,
) -> Result<MutexGuard<'_, Connection>, Error> {
    db_connection.lock().map_err(|_| Error::DatabaseLockError)
}
