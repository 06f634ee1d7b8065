// handlers/user_role.rs - /api/userrole: user roles

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path,
    },
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::database::models::UserRole;
use crate::database::{catalog, LogFailure, Procedure};
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult};
use crate::validation::{not_blank, not_nil};

const CONTROLLER: &str = "userrole";

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RoleRequest {
    #[validate(custom(function = "not_blank"))]
    pub role_name: String,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RoleUpdateRequest {
    #[validate(custom(function = "not_nil"))]
    pub role_id: Uuid,
    #[validate(custom(function = "not_blank"))]
    pub role_name: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatedRole {
    pub role_id: Uuid,
}

/// POST /api/userrole/insert - the role id is generated here, not by the database
pub async fn insert(body: Result<Json<RoleRequest>, JsonRejection>) -> ApiResult<CreatedRole> {
    let Json(request) = body?;
    request.validate()?;

    let role_id = Uuid::new_v4();
    Procedure::new(catalog::ROLE_INSERT)
        .arg("role_id", role_id)
        .arg("role_name", request.role_name)
        .execute()
        .await
        .logged(CONTROLLER, "insert")?;

    Ok(ApiResponse::created(CreatedRole { role_id }).with_message("Role inserted successfully"))
}

/// GET /api/userrole/getall
pub async fn get_all() -> ApiResult<Vec<UserRole>> {
    let roles = Procedure::new(catalog::ROLE_GET_ALL)
        .fetch_as::<UserRole>()
        .await
        .logged(CONTROLLER, "get_all")?;

    Ok(ApiResponse::success(roles))
}

/// GET /api/userrole/getbyid/:id
pub async fn get_by_id(path: Result<Path<Uuid>, PathRejection>) -> ApiResult<UserRole> {
    let Path(role_id) = path?;

    let role = Procedure::new(catalog::ROLE_GET_BY_ID)
        .arg("role_id", role_id)
        .fetch_optional_as::<UserRole>()
        .await
        .logged(CONTROLLER, "get_by_id")?
        .ok_or_else(|| ApiError::not_found("Role not found"))?;

    Ok(ApiResponse::success(role))
}

/// POST /api/userrole/update
pub async fn update(body: Result<Json<RoleUpdateRequest>, JsonRejection>) -> ApiResult<()> {
    let Json(request) = body?;
    request.validate()?;

    Procedure::new(catalog::ROLE_UPDATE)
        .arg("role_id", request.role_id)
        .arg("role_name", request.role_name)
        .execute()
        .await
        .logged(CONTROLLER, "update")?;

    Ok(ApiResponse::message_only("Role updated successfully"))
}

/// POST /api/userrole/delete/:id
pub async fn delete(path: Result<Path<Uuid>, PathRejection>) -> ApiResult<()> {
    let Path(role_id) = path?;

    Procedure::new(catalog::ROLE_DELETE)
        .arg("role_id", role_id)
        .execute()
        .await
        .logged(CONTROLLER, "delete")?;

    Ok(ApiResponse::message_only("Role deleted successfully"))
}
