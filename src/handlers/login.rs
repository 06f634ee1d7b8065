// handlers/login.rs - /api/login: e-mail OTP login and token issue

use axum::{extract::rejection::JsonRejection, Json};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::auth;
use crate::database::error_log::{self, ErrorSource};
use crate::database::models::{OtpChallenge, VerifiedUser};
use crate::database::{catalog, LogFailure, Procedure};
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult};
use crate::services::mailer;
use crate::validation::{not_blank, not_nil};

const CONTROLLER: &str = "login";

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct OtpRequest {
    #[validate(email(message = "A valid emailId is required"))]
    pub email_id: String,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct VerifyOtpRequest {
    #[validate(email(message = "A valid emailId is required"))]
    pub email_id: String,
    #[validate(custom(function = "not_nil"))]
    pub login_code: Uuid,
    #[validate(custom(function = "not_blank"))]
    pub otp: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OtpIssued {
    pub login_code: Option<Uuid>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub user_id: Uuid,
    pub name: Option<String>,
    pub email: Option<String>,
    pub role_id: Option<Uuid>,
    pub role: Option<String>,
    pub token: String,
    pub expiry_time: DateTime<Utc>,
}

impl LoginResponse {
    fn new(user: VerifiedUser, token: String, expiry_time: DateTime<Utc>) -> Self {
        Self {
            user_id: user.user_id,
            name: user.user_name,
            email: user.email_id,
            role_id: user.role_id,
            role: user.role_name,
            token,
            expiry_time,
        }
    }
}

/// POST /api/login/request-otp - mail a one-time password to an active account
pub async fn request_otp(body: Result<Json<OtpRequest>, JsonRejection>) -> ApiResult<OtpIssued> {
    let Json(request) = body?;
    request.validate()?;

    let challenge = Procedure::new(catalog::LOGIN_GENERATE_OTP)
        .arg("email_id", request.email_id.as_str())
        .fetch_optional_as::<OtpChallenge>()
        .await
        .logged(CONTROLLER, "request_otp")?
        .filter(OtpChallenge::is_active_account)
        .ok_or_else(|| ApiError::not_found("Email ID not found or account is inactive"))?;

    let Some(otp) = challenge.otp.as_deref() else {
        error_log::record(
            CONTROLLER,
            "request_otp",
            "OTP procedure returned no code",
            ErrorSource::Controller,
        );
        return Err(ApiError::internal_server_error("Failed to generate OTP"));
    };

    if let Err(e) = mailer().send_otp(&request.email_id, otp).await {
        error_log::record(CONTROLLER, "request_otp", e.to_string(), ErrorSource::Controller);
        return Err(e.into());
    }

    Ok(ApiResponse::success(OtpIssued {
        login_code: challenge.code,
    })
    .with_message("OTP has been sent successfully to your registered email ID"))
}

/// POST /api/login/verify-otp - exchange a valid OTP for a signed token
///
/// ```json
/// {
///   "success": true,
///   "data": {
///     "userId": "...", "name": "Asha", "email": "asha@example.com",
///     "roleId": "...", "role": "Admin",
///     "token": "eyJ...", "expiryTime": "2025-01-05T10:00:00Z"
///   },
///   "message": "Login successful"
/// }
/// ```
pub async fn verify_otp(
    body: Result<Json<VerifyOtpRequest>, JsonRejection>,
) -> ApiResult<LoginResponse> {
    let Json(request) = body?;
    request.validate()?;

    let user = Procedure::new(catalog::LOGIN_VERIFY_OTP)
        .arg("email_id", request.email_id.as_str())
        .arg("login_code", request.login_code)
        .arg("otp", request.otp)
        .fetch_optional_as::<VerifiedUser>()
        .await
        .logged(CONTROLLER, "verify_otp")?
        .ok_or_else(|| ApiError::not_found("Invalid OTP or expired."))?;

    // Token subject is the address the user logged in with
    let (token, expiry_time) = match auth::generate_jwt(&request.email_id) {
        Ok(issued) => issued,
        Err(e) => {
            error_log::record(CONTROLLER, "verify_otp", e.to_string(), ErrorSource::Controller);
            return Err(e.into());
        }
    };

    Ok(ApiResponse::success(LoginResponse::new(user, token, expiry_time))
        .with_message("Login successful"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation;
    use serde_json::json;

    #[test]
    fn verify_request_requires_every_field() {
        let request: VerifyOtpRequest = serde_json::from_value(json!({
            "emailId": "asha",
            "loginCode": "00000000-0000-0000-0000-000000000000",
            "otp": " "
        }))
        .unwrap();

        let errors = validation::field_errors(&request.validate().unwrap_err());
        assert_eq!(errors.len(), 3);
        assert!(errors.contains_key("emailId"));
        assert!(errors.contains_key("loginCode"));
        assert!(errors.contains_key("otp"));
    }

    #[test]
    fn login_response_wire_names() {
        let user = VerifiedUser {
            user_id: Uuid::nil(),
            user_name: Some("Asha".to_string()),
            email_id: Some("asha@example.com".to_string()),
            role_id: None,
            role_name: Some("Admin".to_string()),
        };
        let expiry = DateTime::from_timestamp(1_736_071_200, 0).unwrap();
        let body = serde_json::to_value(LoginResponse::new(user, "t".to_string(), expiry)).unwrap();

        assert_eq!(body["name"], json!("Asha"));
        assert_eq!(body["email"], json!("asha@example.com"));
        assert_eq!(body["roleId"], json!(null));
        assert_eq!(body["role"], json!("Admin"));
        assert_eq!(body["expiryTime"], json!("2025-01-05T10:00:00Z"));
    }
}
