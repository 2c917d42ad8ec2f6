//! User and authentication handlers.

use axum::{
    Json,
    extract::{Query, State},
};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::auth::{AuthError, generate_code};

use super::super::error::{ApiError, ApiResult};
use super::super::state::AppState;

/// Mainland mobile number shape.
static PHONE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^1[3-9]\d{9}$").expect("phone regex"));

fn validate_phone(phone: &str) -> ApiResult<()> {
    if PHONE_RE.is_match(phone) {
        Ok(())
    } else {
        Err(ApiError::validation("invalid phone number"))
    }
}

fn hash_password(password: &str) -> ApiResult<String> {
    bcrypt::hash(password, bcrypt::DEFAULT_COST)
        .map_err(|e| ApiError::Auth(AuthError::Internal(e.to_string())))
}

// ========== Request/Response Types ==========

/// Request for password login.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Response for successful password login.
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub username: String,
    pub message: String,
}

/// Request for phone verification login.
#[derive(Debug, Deserialize)]
pub struct PhoneLoginRequest {
    pub phone: String,
    pub code: String,
    /// Required for first-time login (account creation).
    pub password: Option<String>,
}

/// Response for successful phone login.
#[derive(Debug, Serialize)]
pub struct PhoneLoginResponse {
    pub token: String,
    pub phone: String,
    pub message: String,
}

/// Request to send a verification code.
#[derive(Debug, Deserialize)]
pub struct SendCodeRequest {
    pub phone: String,
}

/// Response for send-code.
#[derive(Debug, Serialize)]
pub struct SendCodeResponse {
    pub message: String,
    /// Present only when code exposure is enabled (no SMS gateway).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}

/// Request to reset a password.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResetPasswordRequest {
    pub phone: String,
    pub code: String,
    pub new_password: String,
}

/// Generic message response.
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

/// Query for existence check.
#[derive(Debug, Deserialize)]
pub struct CheckExistsQuery {
    pub phone: String,
}

/// Response for existence check.
#[derive(Debug, Serialize)]
pub struct CheckExistsResponse {
    pub exists: bool,
}

// ========== Handlers ==========

/// Password login by username or phone.
///
/// POST /api/users/login
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> ApiResult<Json<LoginResponse>> {
    if req.username.is_empty() || req.password.is_empty() {
        return Err(ApiError::validation("username and password are required"));
    }

    let user = state
        .users
        .get_by_login(&req.username)
        .await?
        .ok_or(ApiError::Auth(AuthError::InvalidCredentials))?;

    let valid = bcrypt::verify(&req.password, &user.password_hash)
        .map_err(|e| ApiError::Auth(AuthError::Internal(e.to_string())))?;
    if !valid {
        return Err(ApiError::Auth(AuthError::InvalidCredentials));
    }

    let token = state.auth.issue_token(user.id)?;
    info!(user_id = user.id, "password login");

    Ok(Json(LoginResponse {
        token,
        username: user.display_name().to_string(),
        message: "登录成功".to_string(),
    }))
}

/// Phone verification login; creates the account on first use.
///
/// POST /api/users/phone-login
pub async fn phone_login(
    State(state): State<AppState>,
    Json(req): Json<PhoneLoginRequest>,
) -> ApiResult<Json<PhoneLoginResponse>> {
    validate_phone(&req.phone)?;

    // Codes are single-use, so registration prerequisites are checked before
    // the code is spent; a rejected first attempt can retry with the same code.
    let user = match state.users.get_by_phone(&req.phone).await? {
        Some(user) => {
            state
                .codes
                .verify_and_consume(&req.phone, &req.code)
                .map_err(AuthError::from)?;
            user
        }
        None => {
            // First login: register with the provided password.
            let password = req
                .password
                .as_deref()
                .filter(|p| !p.is_empty())
                .ok_or_else(|| ApiError::validation("new users must set a password"))?;
            state
                .codes
                .verify_and_consume(&req.phone, &req.code)
                .map_err(AuthError::from)?;
            let hash = hash_password(password)?;
            let user = state.users.create(&req.phone, &hash).await?;
            info!(user_id = user.id, "registered new user via phone login");
            user
        }
    };

    let token = state.auth.issue_token(user.id)?;
    info!(user_id = user.id, "phone login");

    Ok(Json(PhoneLoginResponse {
        token,
        phone: user.phone,
        message: "登录成功".to_string(),
    }))
}

/// Generate and store a verification code.
///
/// POST /api/users/send-code
pub async fn send_code(
    State(state): State<AppState>,
    Json(req): Json<SendCodeRequest>,
) -> ApiResult<Json<SendCodeResponse>> {
    validate_phone(&req.phone)?;

    let code = generate_code();
    state.codes.put(&req.phone, code.clone(), state.code_ttl);
    info!(phone = %req.phone, "verification code issued");

    Ok(Json(SendCodeResponse {
        message: "验证码已发送".to_string(),
        code: state.expose_code.then_some(code),
    }))
}

/// Reset a password after code verification.
///
/// POST /api/users/reset-password
pub async fn reset_password(
    State(state): State<AppState>,
    Json(req): Json<ResetPasswordRequest>,
) -> ApiResult<Json<MessageResponse>> {
    validate_phone(&req.phone)?;
    if req.new_password.is_empty() {
        return Err(ApiError::validation("new password is required"));
    }

    state
        .codes
        .verify_and_consume(&req.phone, &req.code)
        .map_err(AuthError::from)?;

    let hash = hash_password(&req.new_password)?;
    let updated = state.users.update_password(&req.phone, &hash).await?;
    if !updated {
        return Err(ApiError::not_found("user not found"));
    }

    info!(phone = %req.phone, "password reset");
    Ok(Json(MessageResponse {
        message: "密码重置成功".to_string(),
    }))
}

/// Check whether a phone number is registered.
///
/// GET /api/users/check-exists?phone=
pub async fn check_exists(
    State(state): State<AppState>,
    Query(query): Query<CheckExistsQuery>,
) -> ApiResult<Json<CheckExistsResponse>> {
    let exists = state.users.exists_by_phone(&query.phone).await?;
    Ok(Json(CheckExistsResponse { exists }))
}
