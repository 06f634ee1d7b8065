// handlers/user.rs - /api/user: application users

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path,
    },
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use crate::database::models::User;
use crate::database::{catalog, LogFailure, Procedure};
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult};
use crate::validation::{not_blank, not_nil};

const CONTROLLER: &str = "user";

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UserRequest {
    #[validate(custom(function = "not_blank"))]
    pub user_name: String,
    #[validate(email(message = "Invalid email address"))]
    pub email_id: String,
    #[serde(default)]
    pub role_id: Option<Uuid>,
    #[serde(default)]
    pub user_code: Option<Uuid>,
    #[serde(default)]
    pub employee_type: Option<String>,
}

impl UserRequest {
    fn bind(self, call: Procedure) -> Procedure {
        call.arg("user_name", self.user_name)
            .arg("email_id", self.email_id)
            .arg("role_id", self.role_id)
            .arg("user_code", self.user_code)
            .arg("employee_type", self.employee_type)
    }
}

/// Update body: the user fields plus the id of the user being changed.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UserUpdateRequest {
    #[validate(custom(function = "not_nil"))]
    pub user_id: Uuid,
    #[validate(custom(function = "not_blank"))]
    pub user_name: String,
    #[validate(email(message = "Invalid email address"))]
    pub email_id: String,
    #[serde(default)]
    pub role_id: Option<Uuid>,
    #[serde(default)]
    pub user_code: Option<Uuid>,
    #[serde(default)]
    pub employee_type: Option<String>,
}

impl UserUpdateRequest {
    fn split(self) -> (Uuid, UserRequest) {
        let user = UserRequest {
            user_name: self.user_name,
            email_id: self.email_id,
            role_id: self.role_id,
            user_code: self.user_code,
            employee_type: self.employee_type,
        };
        (self.user_id, user)
    }
}

/// POST /api/user/insert
pub async fn insert(body: Result<Json<UserRequest>, JsonRejection>) -> ApiResult<()> {
    let Json(request) = body?;
    request.validate()?;

    request
        .bind(Procedure::new(catalog::USER_INSERT))
        .execute()
        .await
        .logged(CONTROLLER, "insert")?;

    Ok(ApiResponse::with_status((), StatusCode::CREATED).with_message("User inserted successfully"))
}

/// GET /api/user/getall
pub async fn get_all() -> ApiResult<Vec<User>> {
    let users = Procedure::new(catalog::USER_GET_ALL)
        .fetch_as::<User>()
        .await
        .logged(CONTROLLER, "get_all")?;

    Ok(ApiResponse::success(users))
}

/// GET /api/user/getbyid/:id
pub async fn get_by_id(path: Result<Path<Uuid>, PathRejection>) -> ApiResult<User> {
    let Path(user_id) = path?;

    let user = Procedure::new(catalog::USER_GET_BY_ID)
        .arg("user_id", user_id)
        .fetch_optional_as::<User>()
        .await
        .logged(CONTROLLER, "get_by_id")?
        .ok_or_else(|| ApiError::not_found("User not found"))?;

    Ok(ApiResponse::success(user))
}

/// POST /api/user/update
pub async fn update(body: Result<Json<UserUpdateRequest>, JsonRejection>) -> ApiResult<()> {
    let Json(request) = body?;
    request.validate()?;

    let (user_id, user) = request.split();
    user.bind(Procedure::new(catalog::USER_UPDATE).arg("user_id", user_id))
        .execute()
        .await
        .logged(CONTROLLER, "update")?;

    Ok(ApiResponse::message_only("User updated successfully"))
}

/// POST /api/user/delete/:id
pub async fn delete(path: Result<Path<Uuid>, PathRejection>) -> ApiResult<()> {
    let Path(user_id) = path?;

    Procedure::new(catalog::USER_DELETE)
        .arg("user_id", user_id)
        .execute()
        .await
        .logged(CONTROLLER, "delete")?;

    Ok(ApiResponse::message_only("User deleted successfully"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation;
    use serde_json::json;

    #[test]
    fn update_body_carries_user_fields_and_id() {
        let request: UserUpdateRequest = serde_json::from_value(json!({
            "userId": "6f1c2a9e-3d4b-4c5d-8e6f-7a8b9c0d1e2f",
            "userName": "Asha",
            "emailId": "asha@example.com",
            "employeeType": "Permanent"
        }))
        .unwrap();

        assert!(request.validate().is_ok());

        let (user_id, user) = request.split();
        assert!(!user_id.is_nil());
        assert_eq!(user.user_name, "Asha");
        assert_eq!(user.employee_type.as_deref(), Some("Permanent"));
    }

    #[test]
    fn name_and_email_are_checked() {
        let request: UserRequest = serde_json::from_value(json!({
            "userName": "",
            "emailId": "not-an-email"
        }))
        .unwrap();

        let errors = validation::field_errors(&request.validate().unwrap_err());
        assert_eq!(errors.get("emailId").map(String::as_str), Some("Invalid email address"));
        assert!(errors.contains_key("userName"));
    }
}
