//! Student account routes

use crate::auth::cookies::{expired_session_cookie, session_cookie};
use crate::auth::CurrentIdentity;
use crate::config::AppConfig;
use crate::error::{ApiError, ApiResult};
use crate::services::StudentService;
use crate::state::AppState;
use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use axum_extra::extract::cookie::CookieJar;
use campusbridge_shared::types::{
    ApiEnvelope, LoginRequest, Role, SignupStudentRequest, StudentProfile, UpdateStudentRequest,
};

pub fn student_routes() -> Router<AppState> {
    Router::new()
        .route("/signup", post(signup))
        .route("/login", post(login))
        .route("/logout", post(logout))
        .route("/profile", get(get_profile).patch(update_profile))
}

/// POST /students/signup
async fn signup(
    State(state): State<AppState>,
    Json(req): Json<SignupStudentRequest>,
) -> ApiResult<(StatusCode, Json<ApiEnvelope<StudentProfile>>)> {
    let profile = StudentService::sign_up(&state.db, req).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiEnvelope::new(
            "Student account created successfully",
            profile,
        )),
    ))
}

/// POST /students/login
///
/// The service hands back a raw token; turning it into a cookie (and which
/// attributes it gets) is decided here at the boundary.
async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(req): Json<LoginRequest>,
) -> ApiResult<(CookieJar, Json<ApiEnvelope<StudentProfile>>)> {
    let (token, profile) =
        StudentService::login(&state.db, state.tokens(), &req.email, &req.password).await?;

    let jar = jar.add(session_cookie(
        token,
        state.tokens().expiry_secs(),
        AppConfig::is_production(),
    ));
    Ok((jar, Json(ApiEnvelope::new("Login successful", profile))))
}

/// POST /students/logout
///
/// Stateless tokens have nothing to invalidate server-side; this only clears
/// the cookie and succeeds whether or not a session existed.
async fn logout(jar: CookieJar) -> (CookieJar, Json<ApiEnvelope<()>>) {
    let jar = jar.add(expired_session_cookie(AppConfig::is_production()));
    (jar, Json(ApiEnvelope::new("Logout successful", ())))
}

/// GET /students/profile
///
/// Returns the identity the guard attached to the request; no store
/// round-trip, so edits made after token issuance show up only on re-login.
async fn get_profile(
    CurrentIdentity(identity): CurrentIdentity,
) -> ApiResult<Json<ApiEnvelope<serde_json::Value>>> {
    if !identity.has_role(Role::Student) {
        return Err(ApiError::Forbidden(
            "Student account required".to_string(),
        ));
    }
    Ok(Json(ApiEnvelope::new(
        "Profile fetched successfully",
        identity.profile_json(),
    )))
}

/// PATCH /students/profile
async fn update_profile(
    State(state): State<AppState>,
    CurrentIdentity(identity): CurrentIdentity,
    Json(req): Json<UpdateStudentRequest>,
) -> ApiResult<Json<ApiEnvelope<StudentProfile>>> {
    if !identity.has_role(Role::Student) {
        return Err(ApiError::Forbidden(
            "Student account required".to_string(),
        ));
    }
    let profile = StudentService::update_profile(&state.db, identity.id, req).await?;
    Ok(Json(ApiEnvelope::new(
        "Profile updated successfully",
        profile,
    )))
}
