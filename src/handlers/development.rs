// handlers/development.rs - /api/development and /api/attachment: confirmed projects and work status

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path,
    },
    Json,
};
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use crate::assembler::TreeNode;
use crate::database::{catalog, LogFailure, Procedure};
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult};
use crate::validation::{self, not_blank, not_nil};

use super::json_list;

const CONTROLLER: &str = "development";

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct WorkStatusRequest {
    #[serde(default)]
    pub notes: Option<String>,
    #[validate(custom(function = "not_blank"))]
    pub status: String,
    #[serde(default)]
    pub attachment_urls: Option<Vec<String>>,
    #[validate(custom(function = "not_nil"))]
    pub created_by: Uuid,
}

impl WorkStatusRequest {
    fn bind(self, call: Procedure) -> Procedure {
        // Unlike pre-sales, an empty list is stored as "[]"
        let attachments = json_list(self.attachment_urls.as_deref());

        call.arg("notes", self.notes)
            .arg("status", self.status)
            .arg("attachment_urls", attachments)
            .arg("created_by", self.created_by)
    }
}

/// GET /api/development/:projectNo/serial-numbers
pub async fn serial_numbers(path: Result<Path<i32>, PathRejection>) -> ApiResult<Vec<TreeNode>> {
    let Path(project_no) = path?;
    let project_no = validation::project_no(project_no)?;

    let serials = Procedure::new(catalog::PRESALES_GET_SERIAL_NUMBERS)
        .arg("project_no", project_no)
        .rows()
        .await
        .logged(CONTROLLER, "get_serial_numbers")?;

    Ok(ApiResponse::success(serials.into_nodes()))
}

/// GET /api/development/getall-confirmed - confirmed projects with their serial numbers
pub async fn get_all_confirmed() -> ApiResult<Vec<TreeNode>> {
    let projects = Procedure::new(catalog::PRESALES_GET_ALL_CONFIRMED)
        .assemble(&catalog::CONFIRMED_PROJECTS)
        .await
        .logged(CONTROLLER, "get_all_confirmed")?;

    Ok(ApiResponse::success(projects))
}

/// POST /api/development/:projectNo/status - returns the inserted status row
pub async fn add_status_update(
    path: Result<Path<i32>, PathRejection>,
    body: Result<Json<WorkStatusRequest>, JsonRejection>,
) -> ApiResult<TreeNode> {
    let Path(project_no) = path?;
    let project_no = validation::project_no(project_no)?;
    let Json(request) = body?;
    request.validate()?;

    let inserted = request
        .bind(Procedure::new(catalog::WORK_STATUS_INSERT).arg("project_no", project_no))
        .first_row()
        .await
        .logged(CONTROLLER, "add_status_update")?
        .map(TreeNode::from)
        .ok_or_else(|| {
            tracing::error!("{} returned no row", catalog::WORK_STATUS_INSERT);
            ApiError::internal_server_error("Status update was not recorded")
        })?;

    Ok(ApiResponse::success(inserted).with_message("Status updated successfully"))
}

/// GET /api/development/work-status/:projectNo - status updates with their attachments
pub async fn work_status(path: Result<Path<i32>, PathRejection>) -> ApiResult<Vec<TreeNode>> {
    let Path(project_no) = path?;
    let project_no = validation::project_no(project_no)?;

    let statuses = Procedure::new(catalog::WORK_STATUS_GET_BY_PROJECT_NO)
        .arg("project_no", project_no)
        .assemble(&catalog::WORK_STATUS)
        .await
        .logged(CONTROLLER, "get_work_status")?;

    Ok(ApiResponse::success(statuses))
}

/// GET /api/development/status-master
pub async fn status_master() -> ApiResult<Vec<TreeNode>> {
    let statuses = Procedure::new(catalog::WORK_STATUS_MASTER_GET_ALL)
        .rows()
        .await
        .logged(CONTROLLER, "get_status_master")?;

    Ok(ApiResponse::success(statuses.into_nodes()))
}
