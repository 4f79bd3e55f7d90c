use axum::{
    extract::{Query, State},
    Json,
};

use crate::{api::state::AppState, domain::Certificate, error::Result, service::MemberStats};

use super::members::ListParams;

pub async fn stats(State(state): State<AppState>) -> Result<Json<MemberStats>> {
    let stats = state.service_context.member_service.stats().await?;
    Ok(Json(stats))
}

pub async fn list_certificates(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> Result<Json<Vec<Certificate>>> {
    let certificates = state
        .service_context
        .certificate_service
        .list(params.limit, params.offset)
        .await?;

    Ok(Json(certificates))
}
