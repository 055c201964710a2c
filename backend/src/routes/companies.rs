//! Company account routes

use crate::auth::cookies::{expired_session_cookie, session_cookie};
use crate::auth::CurrentIdentity;
use crate::config::AppConfig;
use crate::error::{ApiError, ApiResult};
use crate::services::CompanyService;
use crate::state::AppState;
use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use axum_extra::extract::cookie::CookieJar;
use campusbridge_shared::types::{
    ApiEnvelope, CompanyProfile, LoginRequest, Role, SignupCompanyRequest, UpdateCompanyRequest,
};

pub fn company_routes() -> Router<AppState> {
    Router::new()
        .route("/signup", post(signup))
        .route("/login", post(login))
        .route("/logout", post(logout))
        .route("/profile", get(get_profile).patch(update_profile))
}

/// POST /companies/signup
async fn signup(
    State(state): State<AppState>,
    Json(req): Json<SignupCompanyRequest>,
) -> ApiResult<(StatusCode, Json<ApiEnvelope<CompanyProfile>>)> {
    let profile = CompanyService::sign_up(&state.db, req).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiEnvelope::new(
            "Company account created successfully",
            profile,
        )),
    ))
}

/// POST /companies/login
async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(req): Json<LoginRequest>,
) -> ApiResult<(CookieJar, Json<ApiEnvelope<CompanyProfile>>)> {
    let (token, profile) =
        CompanyService::login(&state.db, state.tokens(), &req.email, &req.password).await?;

    let jar = jar.add(session_cookie(
        token,
        state.tokens().expiry_secs(),
        AppConfig::is_production(),
    ));
    Ok((jar, Json(ApiEnvelope::new("Login successful", profile))))
}

/// POST /companies/logout
async fn logout(jar: CookieJar) -> (CookieJar, Json<ApiEnvelope<()>>) {
    let jar = jar.add(expired_session_cookie(AppConfig::is_production()));
    (jar, Json(ApiEnvelope::new("Logout successful", ())))
}

/// GET /companies/profile
async fn get_profile(
    CurrentIdentity(identity): CurrentIdentity,
) -> ApiResult<Json<ApiEnvelope<serde_json::Value>>> {
    if !identity.has_role(Role::Company) {
        return Err(ApiError::Forbidden(
            "Company account required".to_string(),
        ));
    }
    Ok(Json(ApiEnvelope::new(
        "Profile fetched successfully",
        identity.profile_json(),
    )))
}

/// PATCH /companies/profile
async fn update_profile(
    State(state): State<AppState>,
    CurrentIdentity(identity): CurrentIdentity,
    Json(req): Json<UpdateCompanyRequest>,
) -> ApiResult<Json<ApiEnvelope<CompanyProfile>>> {
    if !identity.has_role(Role::Company) {
        return Err(ApiError::Forbidden(
            "Company account required".to_string(),
        ));
    }
    let profile = CompanyService::update_profile(&state.db, identity.id, req).await?;
    Ok(Json(ApiEnvelope::new(
        "Profile updated successfully",
        profile,
    )))
}
