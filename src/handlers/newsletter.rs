//! Newsletter signup endpoint
//!
//! No mailing-list provider is wired in; signups are recorded in the
//! newsletter log for later export.

use super::{reject, storage_failure, AppState, FormResponse};
use crate::models::{FormKind, RawPayload, SubmissionResult};
use crate::storage::LogStream;
use crate::validation::validate_newsletter;
use axum::{body::Bytes, extract::State, http::StatusCode, Json};
use chrono::Utc;

pub async fn subscribe_newsletter(State(state): State<AppState>, body: Bytes) -> FormResponse {
    let signup = match RawPayload::parse(&body)
        .and_then(|payload| validate_newsletter(&payload, Utc::now()))
    {
        Ok(s) => s,
        Err(e) => return reject(FormKind::Newsletter, e),
    };

    if let Err(e) = state.logs.append(LogStream::NewsletterSignups, &signup).await {
        return storage_failure(FormKind::Newsletter, e);
    }

    tracing::info!("Newsletter signup recorded");

    (
        StatusCode::OK,
        Json(SubmissionResult::accepted(
            "Merci ! Vous êtes maintenant inscrit à notre newsletter.",
            signup.timestamp,
        )),
    )
}

#[cfg(test)]
mod tests {
    use crate::handlers::testing::Harness;
    use crate::storage::testing::read_lines;
    use crate::storage::LogStream;
    use axum::http::StatusCode;
    use serde_json::json;

    #[tokio::test]
    async fn test_signup_recorded() {
        let harness = Harness::new();
        let (status, body) = harness
            .post("/newsletter", json!({"email": "ann@example.com"}))
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);

        let lines = read_lines(&harness.state.logs, LogStream::NewsletterSignups);
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0]["email"], "ann@example.com");
        assert_eq!(lines[0]["name"], "");
        assert!(harness.mailer.sent().is_empty());
    }

    #[tokio::test]
    async fn test_invalid_signup_not_recorded() {
        let harness = Harness::new();
        let (status, body) = harness
            .post("/newsletter", json!({"email": "ann-at-example"}))
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "Adresse email invalide");
        assert!(read_lines(&harness.state.logs, LogStream::NewsletterSignups).is_empty());
    }
}
