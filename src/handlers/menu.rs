// handlers/menu.rs - /api/menu: navigation menu tree and menu maintenance

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
use crate::database::models::{OutputMessage, StatusReply};
use crate::database::{catalog, LogFailure, Procedure};
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult};
use crate::validation::not_blank;

use super::output_message;

const CONTROLLER: &str = "menu";

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct MenuRequest {
    #[validate(custom(function = "not_blank"))]
    pub menu_name: String,
    #[serde(default, alias = "menuURL")]
    pub menu_url: Option<String>,
    #[serde(default)]
    pub menu_icon: Option<String>,
    #[serde(default)]
    pub order: i32,
    #[serde(default)]
    pub main_menu_id: Option<Uuid>,
}

impl MenuRequest {
    fn bind(self, call: Procedure) -> Procedure {
        call.arg("menu_name", self.menu_name)
            .arg("menu_url", self.menu_url)
            .arg("menu_icon", self.menu_icon)
            .arg("order", self.order)
            .arg("main_menu_id", self.main_menu_id)
    }
}

/// Map the `(StatusCode, Message)` reply of the insert procedure.
fn status_reply(reply: StatusReply) -> ApiResult<()> {
    let message = reply
        .message
        .filter(|m| !m.trim().is_empty())
        .unwrap_or_else(|| "Menu was not created".to_string());

    let status = u16::try_from(reply.status_code)
        .ok()
        .and_then(|code| StatusCode::from_u16(code).ok());

    match status {
        Some(status) if status.is_success() => {
            Ok(ApiResponse::with_status((), status).with_message(message))
        }
        Some(StatusCode::CONFLICT) => Err(ApiError::conflict(message)),
        Some(StatusCode::NOT_FOUND) => Err(ApiError::not_found(message)),
        _ => Err(ApiError::unprocessable_entity(message)),
    }
}

/// GET /api/menu/all - main menus, each with its ordered `submenu` list
///
/// ```json
/// {
///   "success": true,
///   "data": [
///     { "menuId": "...", "menuName": "Projects", "order": 1, "submenu": [{ "menuName": "Pre-sales" }] },
///     { "menuId": "...", "menuName": "Reports", "order": 2 }
///   ]
/// }
/// ```
pub async fn get_all() -> ApiResult<Vec<TreeNode>> {
    let menus = Procedure::new(catalog::MENU_GET_ALL)
        .assemble_rows(&catalog::MENU_TREE)
        .await
        .logged(CONTROLLER, "get_all")?;

    Ok(ApiResponse::success(menus))
}

/// GET /api/menu/all-by-role/:roleId
pub async fn get_all_by_role(path: Result<Path<Uuid>, PathRejection>) -> ApiResult<Vec<TreeNode>> {
    let Path(role_id) = path?;

    let menus = Procedure::new(catalog::MENU_GET_ALL_BY_ROLE)
        .arg("role_id", role_id)
        .assemble_rows(&catalog::MENU_TREE)
        .await
        .logged(CONTROLLER, "get_all_by_role")?;

    Ok(ApiResponse::success(menus))
}

/// GET /api/menu/only-main-menu
pub async fn get_main_menus() -> ApiResult<Vec<TreeNode>> {
    let menus = Procedure::new(catalog::MENU_GET_ALL)
        .assemble_rows(&catalog::MAIN_MENUS)
        .await
        .logged(CONTROLLER, "get_main_menus")?;

    Ok(ApiResponse::success(menus))
}

/// GET /api/menu/:id
pub async fn get_by_id(path: Result<Path<Uuid>, PathRejection>) -> ApiResult<TreeNode> {
    let Path(menu_id) = path?;

    let menu = Procedure::new(catalog::MENU_GET_BY_ID)
        .arg("menu_id", menu_id)
        .first_row()
        .await
        .logged(CONTROLLER, "get_by_id")?
        .map(TreeNode::from)
        .ok_or_else(|| ApiError::not_found("Menu not found"))?;

    Ok(ApiResponse::success(menu))
}

/// POST /api/menu/create
pub async fn create(body: Result<Json<MenuRequest>, JsonRejection>) -> ApiResult<()> {
    let Json(request) = body?;
    request.validate()?;

    let reply = request
        .bind(Procedure::new(catalog::MENU_INSERT))
        .fetch_optional_as::<StatusReply>()
        .await
        .logged(CONTROLLER, "create")?
        .ok_or_else(|| ApiError::internal_server_error("Menu was not created"))?;

    status_reply(reply)
}

/// PUT /api/menu/update/:id
pub async fn update(
    path: Result<Path<Uuid>, PathRejection>,
    body: Result<Json<MenuRequest>, JsonRejection>,
) -> ApiResult<()> {
    let Path(menu_id) = path?;
    let Json(request) = body?;
    request.validate()?;

    let reply = request
        .bind(Procedure::new(catalog::MENU_UPDATE).arg("menu_id", menu_id))
        .fetch_optional_as::<OutputMessage>()
        .await
        .logged(CONTROLLER, "update")?;

    output_message(reply, "Menu updated successfully")
}

/// DELETE /api/menu/delete/:id
pub async fn delete(path: Result<Path<Uuid>, PathRejection>) -> ApiResult<()> {
    let Path(menu_id) = path?;

    let reply = Procedure::new(catalog::MENU_DELETE)
        .arg("menu_id", menu_id)
        .fetch_optional_as::<OutputMessage>()
        .await
        .logged(CONTROLLER, "delete")?;

    output_message(reply, "Menu deleted successfully")
}
