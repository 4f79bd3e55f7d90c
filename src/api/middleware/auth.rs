use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use axum_extra::extract::CookieJar;
use uuid::Uuid;

use crate::{api::state::AppState, error::AppError};

#[derive(Clone)]
pub struct CurrentAdmin {
    pub admin_id: Uuid,
}

/// Gate for admin routes: a valid session whose user passes the privileged
/// lookup. The lookup is timeout-bounded and defaults to "not privileged".
pub async fn require_admin(
    State(state): State<AppState>,
    jar: CookieJar,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let session_cookie = jar.get("session").ok_or(AppError::Unauthorized)?;

    let auth_service = &state.service_context.auth_service;

    let session = auth_service
        .validate_session(session_cookie.value())
        .await?
        .ok_or(AppError::Unauthorized)?;

    if !auth_service.is_admin(session.admin_id).await {
        return Err(AppError::Forbidden);
    }

    request.extensions_mut().insert(CurrentAdmin {
        admin_id: session.admin_id,
    });

    Ok(next.run(request).await)
}
