//! Transaction management for the ledger.
//!
//! This module contains everything related to transactions:
//! - The `Transaction` model and the `NewTransaction` request schema
//! - Database functions for storing and listing transactions
//! - Route handlers for the transaction endpoints

mod core;
mod create_endpoint;
mod list_endpoint;

pub use core::{
    NewTransaction, Transaction, count_transactions, create_transaction, create_transaction_table,
    list_transactions,
};
pub use create_endpoint::create_transaction_endpoint;
pub use list_endpoint::list_transactions_endpoint;
