use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::{
    api::state::AppState,
    domain::{CreateDonationRequest, Donation},
    error::Result,
    payments::PaymentCallback,
    service::DonationCheckout,
};

use super::members::ListParams;

pub async fn create(
    State(state): State<AppState>,
    Json(request): Json<CreateDonationRequest>,
) -> Result<(StatusCode, Json<DonationCheckout>)> {
    let checkout = state.service_context.donation_service.create(request).await?;
    Ok((StatusCode::CREATED, Json(checkout)))
}

pub async fn callback(
    State(state): State<AppState>,
    Json(callback): Json<PaymentCallback>,
) -> Result<Json<Donation>> {
    let donation = state.service_context.donation_service.confirm(callback).await?;
    Ok(Json(donation))
}

#[derive(Debug, Deserialize)]
pub struct CloseRequest {
    /// True when the donor dismissed the checkout widget; false when the
    /// gateway reported a failure.
    #[serde(default)]
    aborted: bool,
}

pub async fn close(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<CloseRequest>,
) -> Result<Json<Donation>> {
    let donation = state
        .service_context
        .donation_service
        .close(id, request.aborted)
        .await?;
    Ok(Json(donation))
}

pub async fn list(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> Result<Json<Vec<Donation>>> {
    let donations = state
        .service_context
        .donation_service
        .list(params.limit, params.offset)
        .await?;

    Ok(Json(donations))
}
