// handlers/presales.rs - /api/presales: pre-sales leads, scope history and advance payments

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        Path, Query,
    },
    Json,
};
use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::assembler::TreeNode;
use crate::database::{catalog, LogFailure, Procedure};
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult};
use crate::validation::{self, non_negative, not_blank, not_nil, positive};

use super::json_list;

const CONTROLLER: &str = "presales";

/// Body of create and update.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct PreSalesRequest {
    #[validate(custom(function = "not_blank"))]
    pub party_name: String,
    #[validate(custom(function = "not_blank"))]
    pub project_name: String,
    #[validate(custom(function = "not_blank"))]
    pub contact_person: String,
    #[validate(custom(function = "not_blank"))]
    pub mobile_number: String,
    #[validate(email(message = "Invalid email address"))]
    pub email_id: String,
    #[validate(custom(function = "not_blank"))]
    pub agent_name: String,
    #[validate(custom(function = "non_negative"))]
    pub project_value: Decimal,
    #[validate(custom(function = "not_blank"))]
    pub scope_of_development: String,
    #[validate(custom(function = "not_blank"))]
    pub current_stage: String,
    #[serde(default)]
    pub attachment_urls: Option<Vec<String>>,
    #[validate(custom(function = "not_nil"))]
    pub user_id: Uuid,
}

impl PreSalesRequest {
    fn bind(self, call: Procedure) -> Procedure {
        // An empty attachment list is sent as NULL, not "[]"
        let attachments = json_list(self.attachment_urls.as_deref().filter(|u| !u.is_empty()));

        call.arg("party_name", self.party_name)
            .arg("project_name", self.project_name)
            .arg("contact_person", self.contact_person)
            .arg("mobile_number", self.mobile_number)
            .arg("email_id", self.email_id)
            .arg("agent_name", self.agent_name)
            .arg("project_value", self.project_value)
            .arg("scope_of_development", self.scope_of_development)
            .arg("current_stage", self.current_stage)
            .arg("attachment_urls", attachments)
            .arg("user_id", self.user_id)
    }
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct AdvancePaymentRequest {
    #[validate(custom(function = "positive"))]
    pub amount: Decimal,
    pub payment_date: NaiveDateTime,
    #[validate(custom(function = "not_blank"))]
    pub tally_entry_number: String,
    #[validate(custom(function = "not_nil"))]
    pub user_id: Uuid,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteQuery {
    pub user_id: Option<Uuid>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Created {
    pub project_no: i32,
}

/// GET /api/presales/:projectNo - project with scope, stage, payment and attachment history
///
/// ```json
/// {
///   "success": true,
///   "data": {
///     "projectNo": 7,
///     "projectName": "Portal",
///     "scopeHistory": [{ "versionNo": 1, "scope": "...", "attachments": [{ "fileUrl": "..." }] }],
///     "stageHistory": [{ "stage": "Proposal" }],
///     "advancePayments": [{ "amount": 5000, "tallyEntryNumber": "T-9" }],
///     "attachmentUrls": ["/Docs/p1.pdf"]
///   }
/// }
/// ```
pub async fn get_by_project_no(path: Result<Path<i32>, PathRejection>) -> ApiResult<TreeNode> {
    let Path(project_no) = path?;
    let project_no = validation::project_no(project_no)?;

    let project = Procedure::new(catalog::PRESALES_GET_BY_PROJECT_NO)
        .arg("project_no", project_no)
        .assemble_single(&catalog::PROJECT_DETAIL)
        .await
        .logged(CONTROLLER, "get_by_project_no")?
        .ok_or_else(|| ApiError::not_found("Project not found"))?;

    Ok(ApiResponse::success(project))
}

/// POST /api/presales/create - returns the new project number
pub async fn create(body: Result<Json<PreSalesRequest>, JsonRejection>) -> ApiResult<Created> {
    let Json(request) = body?;
    request.validate()?;

    let project_no = request
        .bind(Procedure::new(catalog::PRESALES_CREATE))
        .scalar::<i32>()
        .await
        .logged(CONTROLLER, "create")?;

    Ok(ApiResponse::created(Created { project_no }).with_message("Project created successfully"))
}

/// PUT /api/presales/update/:projectNo
pub async fn update(
    path: Result<Path<i32>, PathRejection>,
    body: Result<Json<PreSalesRequest>, JsonRejection>,
) -> ApiResult<()> {
    let Path(project_no) = path?;
    let project_no = validation::project_no(project_no)?;
    let Json(request) = body?;
    request.validate()?;

    request
        .bind(Procedure::new(catalog::PRESALES_UPDATE).arg("project_no", project_no))
        .execute()
        .await
        .logged(CONTROLLER, "update")?;

    Ok(ApiResponse::message_only("Project updated successfully"))
}

/// GET /api/presales/getall
pub async fn get_all() -> ApiResult<Vec<TreeNode>> {
    let projects = Procedure::new(catalog::PRESALES_GET_ALL)
        .rows()
        .await
        .logged(CONTROLLER, "get_all")?;

    Ok(ApiResponse::success(projects.into_nodes()))
}

/// POST /api/presales/:projectNo/advance-payment
pub async fn add_advance_payment(
    path: Result<Path<i32>, PathRejection>,
    body: Result<Json<AdvancePaymentRequest>, JsonRejection>,
) -> ApiResult<()> {
    let Path(project_no) = path?;
    let project_no = validation::project_no(project_no)?;
    let Json(request) = body?;
    request.validate()?;

    Procedure::new(catalog::PRESALES_ADD_ADVANCE_PAYMENT)
        .arg("project_no", project_no)
        .arg("amount", request.amount)
        .arg("payment_date", request.payment_date)
        .arg("tally_entry_number", request.tally_entry_number)
        .arg("user_id", request.user_id)
        .execute()
        .await
        .logged(CONTROLLER, "add_advance_payment")?;

    Ok(ApiResponse::message_only("Advance payment recorded"))
}

/// DELETE /api/presales/delete/:projectNo?userId=
pub async fn delete(
    path: Result<Path<i32>, PathRejection>,
    query: Result<Query<DeleteQuery>, QueryRejection>,
) -> ApiResult<()> {
    let Path(project_no) = path?;
    let project_no = validation::project_no(project_no)?;
    let Query(query) = query?;
    let user_id = query
        .user_id
        .filter(|id| !id.is_nil())
        .ok_or_else(|| ApiError::validation_error("userId is required", None))?;

    Procedure::new(catalog::PRESALES_DELETE)
        .arg("project_no", project_no)
        .arg("user_id", user_id)
        .execute()
        .await
        .logged(CONTROLLER, "delete")?;

    Ok(ApiResponse::message_only("Project deleted successfully"))
}
