//! Method guard, preflight and security headers

use crate::handlers::AppState;
use crate::models::SubmissionResult;
use axum::{
    body::Body,
    extract::State,
    http::{header, HeaderValue, Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};

/// Bare CORS preflight: 200 with no body. Preflights carrying
/// `Access-Control-Request-Method` are answered by the CORS layer first.
pub async fn preflight() -> StatusCode {
    StatusCode::OK
}

/// Any method other than POST and OPTIONS on a form endpoint
pub async fn method_not_allowed() -> impl IntoResponse {
    (
        StatusCode::METHOD_NOT_ALLOWED,
        Json(SubmissionResult::error("Method not allowed")),
    )
}

/// Security headers middleware
pub async fn security_headers(
    State(state): State<AppState>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let mut response = next.run(request).await;
    let headers = response.headers_mut();

    headers.insert(
        "X-Content-Type-Options",
        HeaderValue::from_static("nosniff"),
    );
    headers.insert("X-Frame-Options", HeaderValue::from_static("DENY"));
    headers.insert(
        "Referrer-Policy",
        HeaderValue::from_static("strict-origin-when-cross-origin"),
    );
    headers.insert(
        header::CACHE_CONTROL,
        HeaderValue::from_static("no-store"),
    );

    if state.is_production {
        headers.insert(
            header::STRICT_TRANSPORT_SECURITY,
            HeaderValue::from_static("max-age=63072000; includeSubDomains"),
        );
    }

    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handlers::testing::Harness;
    use axum::http::Method;
    use tower::ServiceExt;

    #[tokio::test]
    async fn test_security_headers_applied() {
        let mut harness = Harness::new();
        harness.state.is_production = true;
        let app = crate::handlers::form_routes()
            .layer(axum::middleware::from_fn_with_state(
                harness.state.clone(),
                security_headers,
            ))
            .with_state(harness.state.clone());

        let response = app
            .oneshot(
                Request::builder()
                    .method(Method::OPTIONS)
                    .uri("/contact")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        let headers = response.headers();
        assert_eq!(headers["x-content-type-options"], "nosniff");
        assert_eq!(headers["cache-control"], "no-store");
        assert!(headers.contains_key(header::STRICT_TRANSPORT_SECURITY));
    }
}
