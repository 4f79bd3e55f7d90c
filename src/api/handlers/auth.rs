use axum::{extract::State, http::StatusCode, Json};
use axum_extra::extract::CookieJar;
use serde::Deserialize;

use crate::{api::state::AppState, error::Result};

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    email: String,
    password: String,
}

pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(request): Json<LoginRequest>,
) -> Result<(CookieJar, StatusCode)> {
    let auth_service = &state.service_context.auth_service;

    let token = auth_service
        .sign_in(
            &request.email,
            &request.password,
            state.settings.auth.session_duration_hours,
        )
        .await?;

    let secure = state.settings.server.base_url.starts_with("https://");
    let cookie = auth_service.create_session_cookie(&token, secure);

    Ok((jar.add(cookie), StatusCode::NO_CONTENT))
}

pub async fn logout(
    State(state): State<AppState>,
    jar: CookieJar,
) -> Result<(CookieJar, StatusCode)> {
    if let Some(cookie) = jar.get("session") {
        state
            .service_context
            .auth_service
            .sign_out(cookie.value())
            .await?;
    }

    let jar = jar.add(crate::auth::AuthService::create_logout_cookie());
    Ok((jar, StatusCode::NO_CONTENT))
}
