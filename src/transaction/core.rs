//! Defines the core data models and database queries for transactions.

use rusqlite::{Connection, Row};
use serde::{Deserialize, Serialize};

use crate::{Error, database_id::TransactionId, pagination::Pagination};

// ============================================================================
// MODELS
// ============================================================================

/// An expense or income, i.e. an event where money was either spent or earned.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    /// The ID of the transaction, assigned by the database.
    pub id: TransactionId,
    /// The amount of money spent or earned in this transaction.
    pub amount: f64,
    /// A free-form label for grouping transactions, e.g. "food".
    pub category: String,
    /// A text description of what the transaction was for.
    pub description: String,
    /// Whether the money was earned (`true`) or spent (`false`).
    pub is_income: bool,
    /// When the transaction happened.
    ///
    /// The format is up to the client, e.g. "2024-01-01".
    pub date: String,
}

/// The fields needed to create a [Transaction].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewTransaction {
    /// The amount of money spent or earned.
    pub amount: f64,
    /// A free-form label for grouping transactions.
    pub category: String,
    /// A text description of what the transaction was for.
    pub description: String,
    /// Whether the money was earned or spent.
    pub is_income: bool,
    /// When the transaction happened.
    pub date: String,
}

// ============================================================================
// DATABASE FUNCTIONS
// ============================================================================

/// Create a new transaction in the database.
///
/// Duplicate transactions are allowed, each one gets its own ID.
///
/// # Errors
/// This function will return a [Error::SqlError] if there is some SQL error.
pub fn create_transaction(
    transaction: &NewTransaction,
    connection: &Connection,
) -> Result<Transaction, Error> {
    let transaction = connection
        .prepare(
            "INSERT INTO \"transaction\" (amount, category, description, is_income, date)
             VALUES (?1, ?2, ?3, ?4, ?5)
             RETURNING id, amount, category, description, is_income, date",
        )?
        .query_row(
            (
                transaction.amount,
                &transaction.category,
                &transaction.description,
                transaction.is_income,
                &transaction.date,
            ),
            map_transaction_row,
        )?;

    Ok(transaction)
}

/// Get a window of transactions in the order they were created.
///
/// Returns an empty list if the window is past the end of the table.
///
/// # Errors
/// This function will return a [Error::SqlError] if there is some SQL error.
pub fn list_transactions(
    pagination: Pagination,
    connection: &Connection,
) -> Result<Vec<Transaction>, Error> {
    connection
        .prepare(
            "SELECT id, amount, category, description, is_income, date FROM \"transaction\"
             ORDER BY id ASC
             LIMIT :limit OFFSET :skip",
        )?
        .query_map(
            rusqlite::named_params! {
                ":limit": clamp_to_sql_integer(pagination.limit),
                ":skip": clamp_to_sql_integer(pagination.skip),
            },
            map_transaction_row,
        )?
        .map(|maybe_transaction| maybe_transaction.map_err(Error::from))
        .collect()
}

/// SQLite integers are signed 64-bit, so larger windows are capped at `i64::MAX`.
fn clamp_to_sql_integer(value: u64) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}

/// Get the total number of transactions in the database.
///
/// # Errors
/// This function will return a [Error::SqlError] there is some SQL error.
pub fn count_transactions(connection: &Connection) -> Result<u32, Error> {
    connection
        .query_row("SELECT COUNT(id) FROM \"transaction\";", [], |row| {
            row.get(0)
        })
        .map_err(|error| error.into())
}

/// Create the transaction table in the database.
///
/// Does nothing if the table already exists.
///
/// # Errors
/// Returns an error if the table cannot be created or if there is an SQL error.
pub fn create_transaction_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS \"transaction\" (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                amount REAL NOT NULL,
                category TEXT NOT NULL,
                description TEXT NOT NULL,
                is_income INTEGER NOT NULL,
                date TEXT NOT NULL
                )",
        (),
    )?;

    Ok(())
}

/// Map a database row to a Transaction.
pub fn map_transaction_row(row: &Row) -> Result<Transaction, rusqlite::Error> {
    let id = row.get(0)?;
    let amount = row.get(1)?;
    let category = row.get(2)?;
    let description = row.get(3)?;
    let is_income = row.get(4)?;
    let date = row.get(5)?;

    Ok(Transaction {
        id,
        amount,
        category,
        description,
        is_income,
        date,
    })
}

// ============================================================================
// TESTS
// ============================================================================
