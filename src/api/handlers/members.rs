use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    api::state::AppState,
    domain::{Certificate, Member, MemberStanding, MemberStatus, RegistrationRequest},
    error::{AppError, Result},
};

#[derive(Debug, Deserialize)]
pub struct ListParams {
    #[serde(default = "default_limit")]
    pub limit: i64,
    #[serde(default)]
    pub offset: i64,
}

#[derive(Debug, Deserialize)]
pub struct MemberListParams {
    #[serde(default = "default_limit")]
    pub limit: i64,
    #[serde(default)]
    pub offset: i64,
    /// Filters on the stored status; "expired" is derived and cannot be
    /// filtered on here.
    pub status: Option<MemberStatus>,
}

fn default_limit() -> i64 {
    50
}

#[derive(Debug, Serialize)]
pub struct MemberDto {
    id: Uuid,
    company_name: String,
    contact_person: String,
    email: String,
    city: String,
    district: String,
    category: String,
    /// Read-time qualified status; "expired" is derived, never stored.
    status: MemberStanding,
    membership_id: Option<String>,
    expiry_date: Option<String>,
    approved_at: Option<String>,
    created_at: String,
}

impl From<Member> for MemberDto {
    fn from(member: Member) -> Self {
        let standing = member.standing(Utc::now());
        Self {
            id: member.id,
            company_name: member.company_name,
            contact_person: member.contact_person,
            email: member.email,
            city: member.city,
            district: member.district,
            category: member.category,
            status: standing,
            membership_id: member.membership_id,
            expiry_date: member.expiry_date.map(|dt| dt.to_rfc3339()),
            approved_at: member.approved_at.map(|dt| dt.to_rfc3339()),
            created_at: member.created_at.to_rfc3339(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ListResponse {
    members: Vec<MemberDto>,
    total: usize,
}

pub async fn register(
    State(state): State<AppState>,
    Json(request): Json<RegistrationRequest>,
) -> Result<(StatusCode, Json<MemberDto>)> {
    let member = state.service_context.member_service.register(request).await?;
    Ok((StatusCode::CREATED, Json(member.into())))
}

#[derive(Debug, Deserialize)]
pub struct LookupParams {
    email: String,
}

pub async fn lookup(
    State(state): State<AppState>,
    Query(params): Query<LookupParams>,
) -> Result<Json<MemberDto>> {
    let member = state
        .service_context
        .member_service
        .find_by_email(&params.email)
        .await?
        .ok_or_else(|| AppError::NotFound("Member not found".to_string()))?;

    Ok(Json(member.into()))
}

pub async fn list(
    State(state): State<AppState>,
    Query(params): Query<MemberListParams>,
) -> Result<Json<ListResponse>> {
    let service = &state.service_context.member_service;
    let members = match params.status {
        Some(status) => service.list_by_status(status).await?,
        None => service.list(params.limit, params.offset).await?,
    };

    let total = members.len();
    let members: Vec<MemberDto> = members.into_iter().map(Into::into).collect();

    Ok(Json(ListResponse { members, total }))
}

pub async fn get(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<MemberDto>> {
    let member = state.service_context.member_service.get(id).await?;
    Ok(Json(member.into()))
}

pub async fn approve(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<MemberDto>> {
    let member = state.service_context.member_service.approve(id).await?;
    Ok(Json(member.into()))
}

pub async fn reject(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<MemberDto>> {
    let member = state.service_context.member_service.reject(id).await?;
    Ok(Json(member.into()))
}

pub async fn extend(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<MemberDto>> {
    let member = state
        .service_context
        .member_service
        .extend_membership(id)
        .await?;
    Ok(Json(member.into()))
}

pub async fn list_certificates(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<Certificate>>> {
    let certificates = state
        .service_context
        .certificate_service
        .list_for_member(id)
        .await?;
    Ok(Json(certificates))
}

pub async fn reissue_certificate(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<(StatusCode, Json<Certificate>)> {
    let certificate = state
        .service_context
        .member_service
        .reissue_certificate(id)
        .await?;
    Ok((StatusCode::CREATED, Json(certificate)))
}
