// handlers/authorization.rs - /api/authorization: per-role menu permissions

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

use crate::assembler::TreeNode;
use crate::database::models::{InsertReply, OutputMessage};
use crate::database::{catalog, LogFailure, Procedure};
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult};
use crate::validation::not_nil;

use super::output_message;

const CONTROLLER: &str = "authorization";

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct AuthorizationRequest {
    #[validate(custom(function = "not_nil"))]
    pub role_id: Uuid,
    #[validate(custom(function = "not_nil"))]
    pub menu_id: Uuid,
    #[serde(default)]
    pub can_view: bool,
    #[serde(default)]
    pub can_create: bool,
    #[serde(default)]
    pub can_edit: bool,
    #[serde(default)]
    pub can_delete: bool,
}

impl AuthorizationRequest {
    fn bind(self, call: Procedure) -> Procedure {
        call.arg("role_id", self.role_id)
            .arg("menu_id", self.menu_id)
            .arg("can_view", self.can_view)
            .arg("can_create", self.can_create)
            .arg("can_edit", self.can_edit)
            .arg("can_delete", self.can_delete)
    }
}

fn insert_reply(reply: InsertReply) -> ApiResult<()> {
    let message = reply.message.clone().unwrap_or_default();
    if reply.is_duplicate() {
        return Err(ApiError::conflict(message));
    }
    Ok(ApiResponse::with_status((), StatusCode::CREATED).with_message(message))
}

/// POST /api/authorization/create
pub async fn create(body: Result<Json<AuthorizationRequest>, JsonRejection>) -> ApiResult<()> {
    let Json(request) = body?;
    request.validate()?;

    let reply = request
        .bind(Procedure::new(catalog::AUTHORIZATION_INSERT))
        .fetch_optional_as::<InsertReply>()
        .await
        .logged(CONTROLLER, "create")?
        .ok_or_else(|| ApiError::internal_server_error("Authorization was not created"))?;

    insert_reply(reply)
}

/// GET /api/authorization/:id
pub async fn get_by_id(path: Result<Path<Uuid>, PathRejection>) -> ApiResult<TreeNode> {
    let Path(authorization_id) = path?;

    let authorization = Procedure::new(catalog::AUTHORIZATION_GET_BY_ID)
        .arg("authorization_id", authorization_id)
        .first_row()
        .await
        .logged(CONTROLLER, "get_by_id")?
        .map(TreeNode::from)
        .ok_or_else(|| ApiError::not_found("Authorization not found"))?;

    Ok(ApiResponse::success(authorization))
}

/// GET /api/authorization/role/:roleId
pub async fn get_by_role(path: Result<Path<Uuid>, PathRejection>) -> ApiResult<Vec<TreeNode>> {
    let Path(role_id) = path?;

    let authorizations = Procedure::new(catalog::AUTHORIZATION_GET_BY_ROLE)
        .arg("role_id", role_id)
        .rows()
        .await
        .logged(CONTROLLER, "get_by_role")?;

    if authorizations.is_empty() {
        return Err(ApiError::not_found(
            "No authorizations found for the given RoleId",
        ));
    }

    Ok(ApiResponse::success(authorizations.into_nodes()))
}

/// GET /api/authorization/all
pub async fn get_all() -> ApiResult<Vec<TreeNode>> {
    let authorizations = Procedure::new(catalog::AUTHORIZATION_GET_ALL)
        .rows()
        .await
        .logged(CONTROLLER, "get_all")?;

    Ok(ApiResponse::success(authorizations.into_nodes()))
}

/// PUT /api/authorization/update - keyed by role and menu; the procedure returns the row count
pub async fn update(body: Result<Json<AuthorizationRequest>, JsonRejection>) -> ApiResult<()> {
    let Json(request) = body?;
    request.validate()?;

    let updated = request
        .bind(Procedure::new(catalog::AUTHORIZATION_UPDATE))
        .scalar::<i32>()
        .await
        .logged(CONTROLLER, "update")?;

    if updated == 0 {
        return Err(ApiError::not_found("Authorization not found"));
    }

    Ok(ApiResponse::message_only("Authorization updated"))
}

/// DELETE /api/authorization/delete/:id
pub async fn delete(path: Result<Path<Uuid>, PathRejection>) -> ApiResult<()> {
    let Path(authorization_id) = path?;

    let reply = Procedure::new(catalog::AUTHORIZATION_DELETE)
        .arg("authorization_id", authorization_id)
        .fetch_optional_as::<OutputMessage>()
        .await
        .logged(CONTROLLER, "delete")?;

    output_message(reply, "Authorization deleted successfully")
}
