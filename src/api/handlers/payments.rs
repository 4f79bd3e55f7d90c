use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::{
    api::state::AppState,
    domain::{Payment, PaymentType},
    error::Result,
    payments::PaymentCallback,
    service::CheckoutSession,
};

use super::members::ListParams;

#[derive(Debug, Deserialize)]
pub struct CheckoutRequest {
    member_id: Uuid,
    payment_type: PaymentType,
    #[serde(default)]
    donation_amount: f64,
}

pub async fn checkout(
    State(state): State<AppState>,
    Json(request): Json<CheckoutRequest>,
) -> Result<Json<CheckoutSession>> {
    let session = state
        .service_context
        .payment_service
        .begin_checkout(request.member_id, request.payment_type, request.donation_amount)
        .await?;

    Ok(Json(session))
}

/// Success callback from the checkout widget. The signature is re-verified
/// server-side; client-reported success is never trusted on its own.
pub async fn callback(
    State(state): State<AppState>,
    Json(callback): Json<PaymentCallback>,
) -> Result<Json<Payment>> {
    let payment = state.service_context.payment_service.confirm(callback).await?;
    Ok(Json(payment))
}

#[derive(Debug, Deserialize)]
pub struct FailureReport {
    order_id: String,
    #[serde(default)]
    error_description: String,
}

pub async fn failure(
    State(state): State<AppState>,
    Json(report): Json<FailureReport>,
) -> Result<Json<Value>> {
    state
        .service_context
        .payment_service
        .fail(&report.order_id, &report.error_description)
        .await?;

    Ok(Json(json!({ "status": "recorded" })))
}

pub async fn list(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> Result<Json<Vec<Payment>>> {
    let payments = state
        .service_context
        .payment_service
        .list(params.limit, params.offset)
        .await?;

    Ok(Json(payments))
}

pub async fn list_by_member(
    State(state): State<AppState>,
    Path(member_id): Path<Uuid>,
) -> Result<Json<Vec<Payment>>> {
    let payments = state
        .service_context
        .payment_service
        .list_for_member(member_id)
        .await?;

    Ok(Json(payments))
}
