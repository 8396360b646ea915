//! Demo booking endpoint

use super::{reject, send_notifications, storage_failure, AppState, FormResponse};
use crate::models::{BookingRecord, BookingStatus, FormKind, RawPayload, SubmissionResult};
use crate::notifications::compose_demo;
use crate::storage::LogStream;
use crate::validation::validate_demo;
use axum::{body::Bytes, extract::State, http::StatusCode, Json};
use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Handle a demo booking request
pub async fn submit_demo(State(state): State<AppState>, body: Bytes) -> FormResponse {
    let now = Utc::now();
    let request = match RawPayload::parse(&body).and_then(|payload| {
        validate_demo(&payload, &state.spam, state.availability.as_ref(), now)
    }) {
        Ok(r) => r,
        Err(e) => return reject(FormKind::Demo, e),
    };

    let booking_id = generate_booking_id(now);
    let record = BookingRecord {
        request: &request,
        booking_id: &booking_id,
        status: BookingStatus::Pending,
    };
    if let Err(e) = state.logs.append(LogStream::DemoBookings, &record).await {
        return storage_failure(FormKind::Demo, e);
    }

    let notifications = compose_demo(&state.site, &request, &booking_id);
    send_notifications(&state, &request.mail_address, notifications).await;

    tracing::info!(
        booking_id = %booking_id,
        date = %request.preferred_date,
        slot = request.time_slot.as_str(),
        guests = request.guests,
        "Demo booking received"
    );

    (
        StatusCode::OK,
        Json(
            SubmissionResult::accepted(
                "Demande de démonstration envoyée avec succès",
                request.timestamp.clone(),
            )
            .with_booking_id(booking_id),
        ),
    )
}

/// Booking reference: `DEMO-<acceptance date>-<6 hex chars>`
pub fn generate_booking_id(accepted_at: DateTime<Utc>) -> String {
    format!(
        "DEMO-{}-{}",
        accepted_at.format("%Y%m%d"),
        &Uuid::new_v4().simple().to_string()[..6]
    )
}
