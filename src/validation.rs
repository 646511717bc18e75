//! Typed request extractors that reject mismatched input with a structured validation error.
//!
//! [ValidatedJson] and [ValidatedQuery] decode the request body and query string with
//! `serde_path_to_error` so that the field that failed to decode can be reported back to the
//! client. Rejections are returned as [Error::Validation] which renders as a
//! `422 Unprocessable Entity` response:
//!
//! ```json
//! {"detail": [{"loc": ["body", "amount"], "msg": "invalid type: string \"forty\", expected f64", "type": "invalid_type"}]}
//! ```

use std::{borrow::Cow, fmt::Display};

use axum::{
    Json,
    body::Bytes,
    extract::{FromRequest, FromRequestParts, Request},
    http::{StatusCode, request::Parts},
    response::{IntoResponse, Response},
};
use serde::{Serialize, de::DeserializeOwned};
use serde_json::error::Category;

use crate::Error;

/// The location prefix for errors in the request body.
const BODY: &str = "body";
/// The location prefix for errors in the query string.
const QUERY: &str = "query";

/// A single problem found while validating a request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidationIssue {
    /// Where the problem is, e.g. `["body", "amount"]`.
    pub loc: Vec<String>,
    /// A human readable description of the problem.
    pub msg: String,
    /// A short machine readable name for the kind of problem, e.g. "missing".
    #[serde(rename = "type")]
    pub kind: String,
}

impl ValidationIssue {
    /// Create a new issue at `loc`.
    pub fn new<L, S>(loc: L, msg: &str, kind: &str) -> Self
    where
        L: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            loc: loc.into_iter().map(Into::into).collect(),
            msg: msg.to_owned(),
            kind: kind.to_owned(),
        }
    }
}

/// The request did not match the expected schema.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidationError {
    /// The problems found in the request.
    pub detail: Vec<ValidationIssue>,
}

impl ValidationError {
    /// Create a validation error from a list of issues.
    pub fn new(detail: Vec<ValidationIssue>) -> Self {
        Self { detail }
    }
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let issues = self
            .detail
            .iter()
            .map(|issue| format!("{}: {}", issue.loc.join("."), issue.msg))
            .collect::<Vec<_>>()
            .join("; ");

        write!(f, "{issues}")
    }
}

impl IntoResponse for ValidationError {
    fn into_response(self) -> Response {
        (StatusCode::UNPROCESSABLE_ENTITY, Json(self)).into_response()
    }
}

/// Extracts a JSON request body into `T`, reporting the offending field on failure.
///
/// Unlike [axum::Json], the `Content-Type` header is not checked. A body that cannot be read at
/// all, e.g. one over the body limit, is rejected with the status of the underlying rejection.
#[derive(Debug, Clone, Copy, Default)]
pub struct ValidatedJson<T>(pub T);

impl<S, T> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = Error;

    async fn from_request(request: Request, state: &S) -> Result<Self, Self::Rejection> {
        let bytes = Bytes::from_request(request, state)
            .await
            .map_err(|rejection| Error::UnreadableBody {
                status: rejection.status(),
                message: rejection.body_text(),
            })?;

        decode_json(&bytes).map(Self).map_err(Error::Validation)
    }
}

fn decode_json<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, ValidationError> {
    let mut deserializer = serde_json::Deserializer::from_slice(bytes);

    let value = serde_path_to_error::deserialize(&mut deserializer)
        .map_err(|error| ValidationError::new(vec![json_issue(error.path(), error.inner())]))?;

    // Reject trailing characters after the JSON value.
    deserializer.end().map_err(|error| {
        ValidationError::new(vec![ValidationIssue::new(
            [BODY],
            &strip_position(&error.to_string()),
            "json_invalid",
        )])
    })?;

    Ok(value)
}

fn json_issue(path: &serde_path_to_error::Path, error: &serde_json::Error) -> ValidationIssue {
    let message = strip_position(&error.to_string());

    match error.classify() {
        Category::Syntax | Category::Eof | Category::Io => ValidationIssue {
            loc: vec![BODY.to_owned()],
            msg: format!("JSON decode error: {message}"),
            kind: "json_invalid".to_owned(),
        },
        Category::Data => data_issue(BODY, path, &message),
    }
}

/// Extracts the query string into `T`, reporting the offending parameter on failure.
///
/// When a parameter is given more than once, the last value wins.
#[derive(Debug, Clone, Copy, Default)]
pub struct ValidatedQuery<T>(pub T);

impl<S, T> FromRequestParts<S> for ValidatedQuery<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = Error;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let query = parts.uri.query().unwrap_or_default();

        decode_query(query).map(Self).map_err(Error::Validation)
    }
}

fn decode_query<T: DeserializeOwned>(query: &str) -> Result<T, ValidationError> {
    let query = last_value_per_key(query);
    let deserializer =
        serde_urlencoded::Deserializer::new(form_urlencoded::parse(query.as_bytes()));

    serde_path_to_error::deserialize(deserializer).map_err(|error| {
        let message = error.inner().to_string();
        ValidationError::new(vec![data_issue(QUERY, error.path(), &message)])
    })
}

/// Re-encode `query` with only the last value of each repeated key, keeping the key order.
fn last_value_per_key(query: &str) -> String {
    let mut pairs: Vec<(Cow<str>, Cow<str>)> = Vec::new();

    for (key, value) in form_urlencoded::parse(query.as_bytes()) {
        match pairs.iter_mut().find(|(existing, _)| *existing == key) {
            Some(pair) => pair.1 = value,
            None => pairs.push((key, value)),
        }
    }

    form_urlencoded::Serializer::new(String::new())
        .extend_pairs(pairs)
        .finish()
}

/// Build an issue for a value that was well-formed but did not fit the schema.
fn data_issue(prefix: &str, path: &serde_path_to_error::Path, message: &str) -> ValidationIssue {
    let mut loc = vec![prefix.to_owned()];
    loc.extend(
        path.iter()
            .map(ToString::to_string)
            .filter(|segment| segment != "."),
    );

    if let Some(field) = missing_field_name(message) {
        loc.push(field.to_owned());

        return ValidationIssue {
            loc,
            msg: "Field required".to_owned(),
            kind: "missing".to_owned(),
        };
    }

    let kind = if message.starts_with("invalid type") {
        "invalid_type"
    } else {
        "value_error"
    };

    ValidationIssue {
        loc,
        msg: message.to_owned(),
        kind: kind.to_owned(),
    }
}

/// Get the field name from serde's "missing field `name`" message.
fn missing_field_name(message: &str) -> Option<&str> {
    message
        .strip_prefix("missing field `")
        .and_then(|rest| rest.strip_suffix('`'))
}

/// Remove the " at line X column Y" suffix that serde_json appends to its messages.
fn strip_position(message: &str) -> String {
    match message.rfind(" at line ") {
        Some(index) => message[..index].to_owned(),
        None => message.to_owned(),
    }
}
