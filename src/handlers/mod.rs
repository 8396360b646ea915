//! HTTP request handlers

pub mod contact;
pub mod demo;
pub mod middleware;
pub mod newsletter;

pub use contact::*;
pub use demo::*;
pub use middleware::*;
pub use newsletter::*;

use crate::config::{MailConfig, SiteConfig};
use crate::mail::{DynMailSender, OutgoingMail};
use crate::models::{FormKind, SubmissionResult};
use crate::notifications::NotificationPair;
use crate::storage::{AppendLog, LogError};
use crate::validation::{SlotAvailability, SpamFilter, ValidationError};
use axum::{http::StatusCode, routing::post, Json, Router};
use std::sync::Arc;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub site: Arc<SiteConfig>,
    pub mail: Arc<MailConfig>,
    pub mailer: DynMailSender,
    pub logs: Arc<AppendLog>,
    pub spam: Arc<SpamFilter>,
    pub availability: Arc<dyn SlotAvailability>,
    pub is_production: bool,
}

/// Handler response: status plus the JSON result body
pub type FormResponse = (StatusCode, Json<SubmissionResult>);

/// Form endpoints. Each accepts POST, answers a bare OPTIONS with 200 and
/// every other method with 405.
pub fn form_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/contact",
            post(submit_contact)
                .options(preflight)
                .fallback(method_not_allowed),
        )
        .route(
            "/demo",
            post(submit_demo)
                .options(preflight)
                .fallback(method_not_allowed),
        )
        .route(
            "/newsletter",
            post(subscribe_newsletter)
                .options(preflight)
                .fallback(method_not_allowed),
        )
}

// =============================================================================
// Helper Functions
// =============================================================================

fn reject(form: FormKind, error: ValidationError) -> FormResponse {
    if error == ValidationError::RejectedAsSpam {
        tracing::warn!(form = form.path(), "Submission rejected by spam filter");
    } else {
        tracing::info!(form = form.path(), "Submission rejected: {}", error);
    }
    (
        StatusCode::BAD_REQUEST,
        Json(SubmissionResult::error(error.to_string())),
    )
}

fn storage_failure(form: FormKind, error: LogError) -> FormResponse {
    tracing::error!(form = form.path(), "Failed to record submission: {}", error);
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(SubmissionResult::error("Erreur interne du serveur")),
    )
}

/// Send the operator notification and the requester confirmation.
/// Failures are logged, never surfaced to the visitor.
async fn send_notifications(state: &AppState, requester: &str, pair: NotificationPair) {
    let operator = OutgoingMail::new(&state.mail.operator_email, pair.operator, &state.mail);
    let confirmation = OutgoingMail::new(requester, pair.requester, &state.mail);

    let (operator_sent, confirmation_sent) = tokio::join!(
        state.mailer.send(&operator),
        state.mailer.send(&confirmation)
    );

    for (mail, result) in [(&operator, operator_sent), (&confirmation, confirmation_sent)] {
        if let Err(e) = result {
            tracing::warn!(to = %mail.to, subject = %mail.subject, "Mail delivery failed: {}", e);
        }
    }
}


#[cfg(test)]
mod tests {
    use super::testing::Harness;
    use axum::http::{Method, StatusCode};

    #[tokio::test]
    async fn test_preflight_returns_empty_ok() {
        let harness = Harness::new();
        for path in ["/contact", "/demo", "/newsletter"] {
            let (status, body) = harness.request(Method::OPTIONS, path, "").await;
            assert_eq!(status, StatusCode::OK);
            assert!(body.is_null());
        }
    }

    #[tokio::test]
    async fn test_other_methods_not_allowed() {
        let harness = Harness::new();
        for method in [Method::GET, Method::PUT, Method::DELETE] {
            let (status, body) = harness.request(method, "/contact", "").await;
            assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
            assert_eq!(
                body,
                serde_json::json!({"success": false, "message": "Method not allowed"})
            );
        }
        let (status, _) = harness.request(Method::GET, "/demo", "").await;
        assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
    }
}
