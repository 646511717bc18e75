//! Middleware for logging requests and responses.

use axum::{
    body::{Body, Bytes, HttpBody},
    extract::Request,
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
};
use http_body_util::{BodyExt, LengthLimitError, Limited};

/// The maximum number of bytes of a body to log at the `info` level.
pub const LOG_BODY_LENGTH_LIMIT: usize = 64;

/// The maximum number of bytes of a body that will be buffered for logging.
///
/// Larger request bodies are rejected with `413 Payload Too Large`, larger response bodies are
/// sent without being logged.
pub const BODY_SIZE_LIMIT: usize = 2 * 1024 * 1024;

/// Log the request and response for each request.
///
/// Both the request and response are logged at the `info` level.
/// If the body is longer than [LOG_BODY_LENGTH_LIMIT] bytes, it is
/// truncated and the full body is logged at the `debug` level.
pub async fn logging_middleware(request: Request, next: Next) -> Response {
    let (parts, body) = request.into_parts();
    let body_bytes = match buffer_request_body(body).await {
        Ok(bytes) => bytes,
        Err(status) => return status.into_response(),
    };

    log_body(
        &format!("Received request: {} {}", parts.method, parts.uri),
        &body_bytes,
    );

    let response = next.run(Request::from_parts(parts, body_bytes.into())).await;

    let (parts, body) = response.into_parts();
    let fits_limit = body
        .size_hint()
        .upper()
        .is_some_and(|size| size <= BODY_SIZE_LIMIT as u64);

    if !fits_limit {
        tracing::info!("Sending response: {} (body too large to log)", parts.status);
        return Response::from_parts(parts, body);
    }

    let body_bytes = match Limited::new(body, BODY_SIZE_LIMIT).collect().await {
        Ok(collected) => collected.to_bytes(),
        Err(error) => {
            tracing::error!("Could not read response body: {error}");
            return StatusCode::INTERNAL_SERVER_ERROR.into_response();
        }
    };

    log_body(&format!("Sending response: {}", parts.status), &body_bytes);

    Response::from_parts(parts, body_bytes.into())
}

/// Read the request body into memory, up to [BODY_SIZE_LIMIT] bytes.
async fn buffer_request_body(body: Body) -> Result<Bytes, StatusCode> {
    match Limited::new(body, BODY_SIZE_LIMIT).collect().await {
        Ok(collected) => Ok(collected.to_bytes()),
        Err(error) if error.is::<LengthLimitError>() => {
            tracing::warn!("Rejected a request body larger than {BODY_SIZE_LIMIT} bytes");
            Err(StatusCode::PAYLOAD_TOO_LARGE)
        }
        Err(error) => {
            tracing::error!("Could not read request body: {error}");
            Err(StatusCode::BAD_REQUEST)
        }
    }
}

fn log_body(message: &str, body: &[u8]) {
    let body = String::from_utf8_lossy(body);

    if body.len() > LOG_BODY_LENGTH_LIMIT {
        tracing::info!("{message}\nbody: {}...", truncate(&body, LOG_BODY_LENGTH_LIMIT));
        tracing::debug!("Full body: {body:?}");
    } else {
        tracing::info!("{message}\nbody: {body:?}");
    }
}

/// Cut `text` to at most `limit` bytes without splitting a character.
fn truncate(text: &str, limit: usize) -> &str {
    if text.len() <= limit {
        return text;
    }

    let mut end = limit;
    while !text.is_char_boundary(end) {
        end -= 1;
    }

    &text[..end]
}

#[cfg(test)]
mod tests {
    use axum::{
        Router,
        body::Body,
        http::StatusCode,
        middleware,
        routing::{get, post},
    };
    use axum_test::TestServer;

    use super::{BODY_SIZE_LIMIT, logging_middleware, truncate};

    #[test]
    fn truncate_keeps_short_text() {
        assert_eq!(truncate("abc", 64), "abc");
    }

    #[test]
    fn truncate_respects_char_boundaries() {
        // 'é' takes two bytes, so cutting at byte 2 would split it.
        assert_eq!(truncate("aé", 2), "a");
        assert_eq!(truncate("abcdef", 3), "abc");
    }

    #[tokio::test]
    async fn middleware_passes_bodies_through() {
        let app = Router::new()
            .route("/echo", post(|body: String| async move { body }))
            .layer(middleware::from_fn(logging_middleware));
        let server = TestServer::try_new(app).expect("Could not create test server.");
        let long_body = "x".repeat(200);

        let response = server.post("/echo").text(long_body.clone()).await;

        response.assert_status_ok();
        response.assert_text(long_body);
    }

    #[tokio::test]
    async fn middleware_rejects_oversized_request_body() {
        let app = Router::new()
            .route("/echo", post(|body: String| async move { body }))
            .layer(middleware::from_fn(logging_middleware));
        let server = TestServer::try_new(app).expect("Could not create test server.");

        let response = server
            .post("/echo")
            .text("x".repeat(BODY_SIZE_LIMIT + 1))
            .await;

        response.assert_status(StatusCode::PAYLOAD_TOO_LARGE);
    }

    #[tokio::test]
    async fn middleware_passes_large_responses_through_unbuffered() {
        let big_body = "y".repeat(BODY_SIZE_LIMIT + 1);
        let handler_body = big_body.clone();
        let app = Router::new()
            .route(
                "/big",
                get(move || {
                    let body = handler_body.clone();
                    async move { Body::from(body) }
                }),
            )
            .layer(middleware::from_fn(logging_middleware));
        let server = TestServer::try_new(app).expect("Could not create test server.");

        let response = server.get("/big").await;

        response.assert_status_ok();
        response.assert_text(big_body);
    }
}
