//! This modules defines the common functionality for paging data.

use serde::{Deserialize, Serialize};

/// The config for pagination
#[derive(Debug, Clone, PartialEq)]
pub struct PaginationConfig {
    /// The number of rows to skip when not specified in a request.
    pub default_skip: u64,
    /// The maximum number of rows to return when not specified in a request.
    pub default_limit: u64,
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            default_skip: 0,
            default_limit: 100,
        }
    }
}

/// The query parameters for requesting a window of rows.
///
/// Negative or non-integer values are rejected when the query string is decoded.
#[derive(Debug, Default, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PaginationQuery {
    /// The number of rows to skip.
    pub skip: Option<u64>,
    /// The maximum number of rows to return.
    pub limit: Option<u64>,
}

/// A resolved window of rows: skip the first `skip` rows, then take at most `limit` rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    /// The number of rows to skip.
    pub skip: u64,
    /// The maximum number of rows to return.
    pub limit: u64,
}

impl Pagination {
    /// Fill in the parameters missing from `query` with the defaults from `config`.
    pub fn resolve(query: PaginationQuery, config: &PaginationConfig) -> Self {
        Self {
            skip: query.skip.unwrap_or(config.default_skip),
            limit: query.limit.unwrap_or(config.default_limit),
        }
    }
}

impl Default for Pagination {
    fn default() -> Self {
        Self::resolve(PaginationQuery::default(), &PaginationConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::{Pagination, PaginationConfig, PaginationQuery};

    #[test]
    fn default_window() {
        assert_eq!(
            Pagination::default(),
            Pagination {
                skip: 0,
                limit: 100
            }
        );
    }

    #[test]
    fn query_overrides_defaults() {
        let query = PaginationQuery {
            skip: Some(5),
            limit: None,
        };

        let got = Pagination::resolve(query, &PaginationConfig::default());

        assert_eq!(
            got,
            Pagination {
                skip: 5,
                limit: 100
            }
        );
    }

    #[test]
    fn config_sets_defaults() {
        let config = PaginationConfig {
            default_skip: 2,
            default_limit: 10,
        };

        let got = Pagination::resolve(PaginationQuery::default(), &config);

        assert_eq!(got, Pagination { skip: 2, limit: 10 });
    }
}
