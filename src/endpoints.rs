//! The API endpoints URIs.

/// The route to create and list transactions.
pub const TRANSACTIONS: &str = "/transactions";
