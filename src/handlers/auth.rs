use std::sync::Arc;

use actix_web::{web, HttpRequest, HttpResponse};
use serde::{Deserialize, Serialize};
use serde_json::json;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::auth::{decode_token, generate_otp, issue_token, Claims, OtpCheck, OtpStore};
use crate::errors::AppError;
use crate::infrastructure::models::NewUserRow;
use crate::infrastructure::user_repo::DieselUserRepository;
use crate::mailer::Mailer;

/// Shared authentication state: the signing secret, the expiring OTP store
/// and the outbound mailer.
pub struct AuthState {
    pub jwt_secret: String,
    pub otp_store: OtpStore,
    pub mailer: Arc<dyn Mailer>,
}

// ── DTOs ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub user_id: String,
    pub name: String,
    pub email: String,
    pub password: String,
    pub role: String,
    #[serde(default)]
    pub lab_id: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: Uuid,
    pub user_id: String,
    pub name: String,
    pub email: String,
    pub role: String,
    pub lab_id: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ForgotPasswordRequest {
    pub email: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct VerifyOtpRequest {
    pub email: String,
    pub otp: String,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ResetPasswordRequest {
    pub email: String,
    pub new_password: String,
}

// ── Handlers ─────────────────────────────────────────────────────────────────

/// POST /auth/register
#[utoipa::path(
    post,
    path = "/auth/register",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "User registered"),
        (status = 400, description = "Duplicate email or lab ID, or missing lab ID"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "auth"
)]
pub async fn register(
    users: web::Data<DieselUserRepository>,
    body: web::Json<RegisterRequest>,
) -> Result<HttpResponse, AppError> {
    let body = body.into_inner();
    let users = users.into_inner();

    web::block(move || {
        if users.find_by_email(&body.email)?.is_some() {
            return Err(AppError::Validation("User already exists".to_string()));
        }

        let lab_id = if body.role == "lab_assistant" {
            let lab_id = body.lab_id.clone().filter(|l| !l.is_empty()).ok_or_else(|| {
                AppError::Validation("Lab ID is required for lab assistants".to_string())
            })?;
            if users.lab_id_taken(&lab_id)? {
                return Err(AppError::Validation(format!(
                    "Lab ID {} is already assigned to another lab assistant",
                    lab_id
                )));
            }
            Some(lab_id)
        } else {
            None
        };

        let password_hash = bcrypt::hash(&body.password, bcrypt::DEFAULT_COST)
            .map_err(|e| AppError::Internal(e.to_string()))?;

        users.insert(NewUserRow {
            id: Uuid::new_v4(),
            user_id: body.user_id,
            name: body.name,
            email: body.email,
            password_hash,
            role: body.role,
            lab_id,
        })?;
        Ok(())
    })
    .await
    .map_err(|e| AppError::Internal(e.to_string()))??;

    Ok(HttpResponse::Created().json(json!({ "message": "User registered successfully" })))
}

/// POST /auth/login
///
/// Unknown email and wrong password answer the same 400 so the response
/// does not reveal which accounts exist.
#[utoipa::path(
    post,
    path = "/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Token issued"),
        (status = 400, description = "Invalid credentials"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "auth"
)]
pub async fn login(
    users: web::Data<DieselUserRepository>,
    state: web::Data<AuthState>,
    body: web::Json<LoginRequest>,
) -> Result<HttpResponse, AppError> {
    let body = body.into_inner();
    let users = users.into_inner();
    let secret = state.jwt_secret.clone();

    let (token, user_id, role) = web::block(move || {
        let user = users
            .find_by_email(&body.email)?
            .ok_or_else(|| AppError::Validation("Invalid credentials".to_string()))?;

        let matches = bcrypt::verify(&body.password, &user.password_hash)
            .map_err(|e| AppError::Internal(e.to_string()))?;
        if !matches {
            return Err(AppError::Validation("Invalid credentials".to_string()));
        }

        users.touch_last_login(user.id)?;

        let token = issue_token(&secret, user.id, &user.user_id, &user.role, user.lab_id)
            .map_err(|e| AppError::Internal(e.to_string()))?;
        Ok((token, user.user_id, user.role))
    })
    .await
    .map_err(|e| AppError::Internal(e.to_string()))??;

    Ok(HttpResponse::Ok().json(json!({
        "token": token,
        "user": { "userId": user_id, "role": role }
    })))
}

fn bearer_claims(req: &HttpRequest, secret: &str) -> Result<Claims, AppError> {
    let header = req
        .headers()
        .get("Authorization")
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| AppError::Unauthorized("Missing Authorization header".to_string()))?;
    let token = header
        .strip_prefix("Bearer ")
        .ok_or_else(|| AppError::Unauthorized("Expected a Bearer token".to_string()))?;
    decode_token(secret, token).map_err(|_| AppError::Unauthorized("Invalid token".to_string()))
}

/// GET /auth/me
#[utoipa::path(
    get,
    path = "/auth/me",
    responses(
        (status = 200, description = "Current user", body = UserResponse),
        (status = 401, description = "Missing or invalid token"),
        (status = 404, description = "User no longer exists"),
    ),
    tag = "auth"
)]
pub async fn current_user(
    req: HttpRequest,
    users: web::Data<DieselUserRepository>,
    state: web::Data<AuthState>,
) -> Result<HttpResponse, AppError> {
    let claims = bearer_claims(&req, &state.jwt_secret)?;
    let users = users.into_inner();

    let user = web::block(move || users.find_by_id(claims.sub))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    Ok(HttpResponse::Ok().json(UserResponse {
        id: user.id,
        user_id: user.user_id,
        name: user.name,
        email: user.email,
        role: user.role,
        lab_id: user.lab_id,
    }))
}

/// POST /auth/forgot-password
///
/// Step 1 of the reset flow: issue a 6-digit OTP, keep it in the expiring
/// store and mail it. Mail failure is a 500 here, not a swallowed side
/// effect, because the caller cannot proceed without the code.
#[utoipa::path(
    post,
    path = "/auth/forgot-password",
    request_body = ForgotPasswordRequest,
    responses(
        (status = 200, description = "OTP sent"),
        (status = 400, description = "Email missing"),
        (status = 404, description = "No user with this email"),
        (status = 500, description = "Mail delivery failed"),
    ),
    tag = "auth"
)]
pub async fn forgot_password(
    users: web::Data<DieselUserRepository>,
    state: web::Data<AuthState>,
    body: web::Json<ForgotPasswordRequest>,
) -> Result<HttpResponse, AppError> {
    let email = body.into_inner().email;
    if email.trim().is_empty() {
        return Err(AppError::Validation("Email is required".to_string()));
    }

    let users = users.into_inner();
    let lookup_email = email.clone();
    let user = web::block(move || users.find_by_email(&lookup_email))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??
        .ok_or_else(|| AppError::NotFound("No user found with this email".to_string()))?;

    let otp = generate_otp();
    state.otp_store.issue(&email, otp.clone());
    state
        .mailer
        .send_otp(&email, &user.name, &otp)
        .map_err(|e| AppError::Internal(e.to_string()))?;

    Ok(HttpResponse::Ok().json(json!({
        "message": "OTP sent to your registered email address"
    })))
}

/// POST /auth/verify-otp
#[utoipa::path(
    post,
    path = "/auth/verify-otp",
    request_body = VerifyOtpRequest,
    responses(
        (status = 200, description = "OTP verified"),
        (status = 400, description = "Wrong, expired or unknown OTP"),
    ),
    tag = "auth"
)]
pub async fn verify_otp(
    state: web::Data<AuthState>,
    body: web::Json<VerifyOtpRequest>,
) -> Result<HttpResponse, AppError> {
    let body = body.into_inner();
    match state.otp_store.verify(&body.email, &body.otp) {
        OtpCheck::Verified => {
            Ok(HttpResponse::Ok().json(json!({ "message": "OTP verified successfully" })))
        }
        OtpCheck::Mismatch => Err(AppError::Validation("Invalid OTP".to_string())),
        OtpCheck::Expired => Err(AppError::Validation("OTP has expired".to_string())),
        OtpCheck::NotFound => Err(AppError::Validation("OTP expired or not found".to_string())),
    }
}

/// POST /auth/reset-password
///
/// Step 3: requires a previously verified OTP entry, which is consumed on
/// success.
#[utoipa::path(
    post,
    path = "/auth/reset-password",
    request_body = ResetPasswordRequest,
    responses(
        (status = 200, description = "Password updated"),
        (status = 400, description = "OTP not verified or session expired"),
        (status = 404, description = "User not found"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "auth"
)]
pub async fn reset_password(
    users: web::Data<DieselUserRepository>,
    state: web::Data<AuthState>,
    body: web::Json<ResetPasswordRequest>,
) -> Result<HttpResponse, AppError> {
    let body = body.into_inner();
    if body.email.trim().is_empty() || body.new_password.is_empty() {
        return Err(AppError::Validation(
            "Email and new password are required".to_string(),
        ));
    }

    let users = users.into_inner();
    let lookup = users.clone();
    let lookup_email = body.email.clone();
    let user = web::block(move || lookup.find_by_email(&lookup_email))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    if !state.otp_store.take_verified(&body.email) {
        return Err(AppError::Validation(
            "OTP not verified or session expired".to_string(),
        ));
    }

    web::block(move || {
        let password_hash = bcrypt::hash(&body.new_password, bcrypt::DEFAULT_COST)
            .map_err(|e| AppError::Internal(e.to_string()))?;
        users.update_password(user.id, &password_hash)?;
        Ok::<_, AppError>(())
    })
    .await
    .map_err(|e| AppError::Internal(e.to_string()))??;

    Ok(HttpResponse::Ok().json(json!({ "message": "Password updated successfully" })))
}
