//! Contact form endpoint

use super::{reject, send_notifications, storage_failure, AppState, FormResponse};
use crate::models::{FormKind, NewsletterSignup, RawPayload, SubmissionResult};
use crate::notifications::compose_contact;
use crate::storage::LogStream;
use crate::validation::validate_contact;
use axum::{body::Bytes, extract::State, http::StatusCode, Json};
use chrono::Utc;

/// Handle a contact form submission
///
/// Validation happens in full before any side effect: mails, the contact
/// log line and the optional newsletter signup only follow an accepted
/// submission.
pub async fn submit_contact(State(state): State<AppState>, body: Bytes) -> FormResponse {
    let submission = match RawPayload::parse(&body)
        .and_then(|payload| validate_contact(&payload, &state.spam, Utc::now()))
    {
        Ok(s) => s,
        Err(e) => return reject(FormKind::Contact, e),
    };

    let notifications = compose_contact(&state.site, &submission);
    send_notifications(&state, &submission.mail_address, notifications).await;

    if let Err(e) = state
        .logs
        .append(LogStream::ContactSubmissions, &submission)
        .await
    {
        return storage_failure(FormKind::Contact, e);
    }

    if submission.newsletter {
        let signup = NewsletterSignup {
            email: submission.email.clone(),
            name: submission.full_name(),
            timestamp: submission.timestamp.clone(),
        };
        // Contact record is already stored; a lost signup is logged only
        if let Err(e) = state.logs.append(LogStream::NewsletterSignups, &signup).await {
            tracing::error!("Failed to record newsletter signup: {}", e);
        }
    }

    tracing::info!(
        subject = %submission.subject,
        newsletter = submission.newsletter,
        "Contact message received"
    );

    (
        StatusCode::OK,
        Json(SubmissionResult::accepted(
            "Message envoyé avec succès",
            submission.timestamp,
        )),
    )
}
