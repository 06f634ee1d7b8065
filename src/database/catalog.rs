//! Procedure names and the result-set layouts they are read with.
//!
//! A layout is a positional contract: set `n` of the layout is the `n`-th cursor the procedure
//! returns. Reordering the cursors inside a procedure without changing the layout here is not
//! detectable at runtime unless a column the layout reads goes missing.
//!
//! Column names are part of the same contract. Procedures return quoted PascalCase
//! identifiers (`"ProjectNo"`, `"MenuURL"`), and both readers match them exactly: the
//! assembler looks columns up by the names written below, and the typed rows in
//! [`super::models`] decode with `#[sqlx(rename_all = "PascalCase")]`. An unquoted column comes
//! back lowercased from Postgres and is reported as a contract violation (assembled reads) or
//! a missing column (typed reads), never silently rendered.

use once_cell::sync::Lazy;

use crate::assembler::{Layout, Link, Roots};

// Pre-sales
pub const PRESALES_GET_BY_PROJECT_NO: &str = "sp_presales_get_by_project_no";
pub const PRESALES_CREATE: &str = "sp_presales_create";
pub const PRESALES_UPDATE: &str = "sp_presales_update";
pub const PRESALES_GET_ALL: &str = "sp_presales_get_all";
pub const PRESALES_ADD_ADVANCE_PAYMENT: &str = "sp_presales_add_advance_payment";
pub const PRESALES_DELETE: &str = "sp_presales_delete";
pub const PRESALES_GET_SERIAL_NUMBERS: &str = "sp_presales_get_serial_numbers_by_project_no";
pub const PRESALES_GET_ALL_CONFIRMED: &str = "sp_presales_get_all_confirmed";

// Development tracking
pub const WORK_STATUS_INSERT: &str = "sp_work_status_update_insert";
pub const WORK_STATUS_GET_BY_PROJECT_NO: &str = "sp_work_status_get_by_project_no";
pub const WORK_STATUS_MASTER_GET_ALL: &str = "sp_work_status_master_get_all";

// Menus
pub const MENU_GET_ALL: &str = "usp_get_all_menus";
pub const MENU_GET_ALL_BY_ROLE: &str = "usp_get_all_menus_by_role_id";
pub const MENU_GET_BY_ID: &str = "usp_get_menu_by_id";
pub const MENU_INSERT: &str = "usp_insert_menu";
pub const MENU_UPDATE: &str = "usp_update_menu";
pub const MENU_DELETE: &str = "usp_delete_menu_by_id";

// Authorization
pub const AUTHORIZATION_INSERT: &str = "usp_authorization_insert";
pub const AUTHORIZATION_GET_BY_ID: &str = "usp_authorization_get_by_id";
pub const AUTHORIZATION_GET_BY_ROLE: &str = "usp_authorization_get_by_role_id";
pub const AUTHORIZATION_GET_ALL: &str = "usp_authorization_get_all";
pub const AUTHORIZATION_UPDATE: &str = "usp_authorization_update";
pub const AUTHORIZATION_DELETE: &str = "usp_authorization_delete";

// Users and roles
pub const USER_INSERT: &str = "sp_insert_user";
pub const USER_GET_ALL: &str = "sp_get_users";
pub const USER_GET_BY_ID: &str = "sp_get_user_by_id";
pub const USER_UPDATE: &str = "sp_update_user";
pub const USER_DELETE: &str = "sp_delete_user";
pub const ROLE_INSERT: &str = "sp_insert_user_role";
pub const ROLE_GET_ALL: &str = "sp_get_all_user_roles";
pub const ROLE_GET_BY_ID: &str = "sp_get_user_role_by_id";
pub const ROLE_UPDATE: &str = "sp_update_user_role";
pub const ROLE_DELETE: &str = "sp_delete_user_role";

// Login
pub const LOGIN_GENERATE_OTP: &str = "sp_check_email_and_generate_otp";
pub const LOGIN_VERIFY_OTP: &str = "sp_verify_otp_and_get_user";

pub const INSERT_ERROR_LOG: &str = "usp_insert_error_log";

/// Advance payment shape, shared by every response that lists payments.
pub static ADVANCE_PAYMENT_FIELDS: &[&str] = &[
    "PaymentId",
    "Amount",
    "PaymentDate",
    "TallyEntryNumber",
    "CreatedById",
    "CreatedByName",
    "CreatedDate",
];

pub static CONFIRMED_PROJECT_FIELDS: &[&str] = &[
    "ProjectNo",
    "PartyName",
    "ProjectName",
    "ContactPerson",
    "MobileNumber",
    "EmailId",
    "AgentName",
    "ProjectValue",
    "ScopeOfDevelopment",
    "CurrentStage",
    "CreatedBy",
    "CreatedDate",
    "ModifiedBy",
    "ModifiedDate",
    "LatestAttachmentUrl",
];

pub static SERIAL_NUMBER_FIELDS: &[&str] = &[
    "SerialNumber",
    "Version",
    "RecordedById",
    "RecordedByName",
    "RecordedDate",
];

pub static WORK_STATUS_FIELDS: &[&str] = &[
    "StatusUpdateId",
    "ProjectId",
    "Notes",
    "StatusCode",
    "StatusText",
    "CreatedDate",
    "CreatedById",
    "CreatedByName",
];

pub static WORK_STATUS_ATTACHMENT_FIELDS: &[&str] =
    &["FileUrl", "UploadedDate", "UploadedById", "UploadedByName"];

pub static MENU_FIELDS: &[&str] = &[
    "MenuId",
    "MenuName",
    "MenuURL",
    "MenuIcon",
    "Order",
    "MainMenuId",
];

/// `sp_presales_get_by_project_no`:
/// 0 project, 1 scope history, 2 stage history, 3 attachment history, 4 advance payments,
/// 5 attachment URLs.
///
/// Only scope history and its attachments carry keys. Stage history, payments and the URL list
/// belong to the one project row, and the URL set is a single unnamed column.
pub static PROJECT_DETAIL: Lazy<Layout> = Lazy::new(|| {
    Layout::new(Roots::set(0))
        .link(
            Link::new("scopeHistory")
                .parent(0, "ProjectNo")
                .child(1, "ProjectNo")
                .order_by("VersionNo"),
        )
        .link(
            Link::new("attachments")
                .parent(1, "ScopeHistoryId")
                .child(3, "ScopeHistoryId"),
        )
        .link(Link::new("stageHistory").all_rows_of(2))
        .link(
            Link::new("advancePayments")
                .all_rows_of(4)
                .fields(ADVANCE_PAYMENT_FIELDS),
        )
        .link(Link::new("attachmentUrls").all_rows_of(5).pluck_first())
});

/// `sp_presales_get_all_confirmed`: 0 projects, 1 serial numbers.
pub static CONFIRMED_PROJECTS: Lazy<Layout> = Lazy::new(|| {
    Layout::new(Roots::set(0).fields(CONFIRMED_PROJECT_FIELDS)).link(
        Link::new("serialNumbers")
            .parent(0, "ProjectNo")
            .child(1, "ProjectNo")
            .fields(SERIAL_NUMBER_FIELDS),
    )
});

/// `sp_work_status_get_by_project_no`: 0 status updates, 1 attachments.
pub static WORK_STATUS: Lazy<Layout> = Lazy::new(|| {
    Layout::new(Roots::set(0).fields(WORK_STATUS_FIELDS)).link(
        Link::new("attachments")
            .parent(0, "StatusUpdateId")
            .child(1, "StatusUpdateId")
            .fields(WORK_STATUS_ATTACHMENT_FIELDS),
    )
});

fn main_menu_roots() -> Roots {
    Roots::set(0)
        .where_absent("MainMenuId")
        .order_by("Order")
        .fields(MENU_FIELDS)
}

/// Flat menu rows folded into main menus with their `submenu` lists.
pub static MENU_TREE: Lazy<Layout> = Lazy::new(|| {
    Layout::new(main_menu_roots()).link(
        Link::new("submenu")
            .parent(0, "MenuId")
            .child(0, "MainMenuId")
            .order_by("Order")
            .fields(MENU_FIELDS)
            .omit_when_empty(),
    )
});

pub static MAIN_MENUS: Lazy<Layout> = Lazy::new(|| Layout::new(main_menu_roots()));

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assembler::{assemble, assemble_single, AssembleError, ResultSet};
    use serde_json::{json, Value};

    fn set(value: Value) -> ResultSet {
        value
            .as_array()
            .unwrap()
            .iter()
            .map(|r| r.as_object().unwrap().clone())
            .collect()
    }

    #[test]
    fn project_detail_nests_every_collection() {
        let sets = vec![
            set(json!([{ "ProjectNo": 7, "ProjectName": "Portal", "ProjectValue": 250000 }])),
            set(json!([
                { "ScopeHistoryId": 21, "ProjectNo": 7, "VersionNo": 2, "Scope": "Phase 2" },
                { "ScopeHistoryId": 20, "ProjectNo": 7, "VersionNo": 1, "Scope": "Phase 1" },
            ])),
            set(json!([{ "Stage": "Proposal" }])),
            set(json!([{ "ScopeHistoryId": 21, "FileUrl": "/Docs/p2.pdf" }])),
            set(json!([{
                "PaymentId": 3, "ProjectNo": 7, "Amount": 5000, "PaymentDate": "2025-01-04T00:00:00",
                "TallyEntryNumber": "T-9", "CreatedById": null, "CreatedByName": "Ravi",
                "CreatedDate": "2025-01-04T10:00:00", "InternalFlag": true
            }])),
            set(json!([
                { "AttachmentUrl": "/Docs/p1.pdf" },
                { "AttachmentUrl": "/Docs/p2.pdf" },
            ])),
        ];

        let node = assemble_single(&sets, &PROJECT_DETAIL).unwrap().unwrap();
        let value = serde_json::to_value(&node).unwrap();

        assert_eq!(value["projectNo"], json!(7));
        assert_eq!(value["scopeHistory"][0]["versionNo"], json!(1));
        assert_eq!(value["scopeHistory"][0]["attachments"], json!([]));
        assert_eq!(value["scopeHistory"][1]["attachments"][0]["fileUrl"], json!("/Docs/p2.pdf"));
        assert_eq!(value["stageHistory"][0]["stage"], json!("Proposal"));
        assert_eq!(value["attachmentUrls"], json!(["/Docs/p1.pdf", "/Docs/p2.pdf"]));

        let payment = value["advancePayments"][0].as_object().unwrap();
        assert!(payment.get("internalFlag").is_none());
        assert!(payment.get("projectNo").is_none());
        assert_eq!(payment["tallyEntryNumber"], json!("T-9"));
    }

    #[test]
    fn project_detail_reads_unkeyed_child_sets() {
        let sets = vec![
            set(json!([{ "ProjectNo": 7, "ProjectName": "Portal" }])),
            set(json!([{ "ScopeHistoryId": 20, "ProjectNo": 7, "VersionNo": 1, "Scope": "Phase 1" }])),
            set(json!([{ "Stage": "Proposal" }, { "Stage": "Confirmed" }])),
            set(json!([])),
            set(json!([{
                "PaymentId": 3, "Amount": 5000, "PaymentDate": "2025-01-04T00:00:00",
                "TallyEntryNumber": "T-9", "CreatedById": null, "CreatedByName": "Ravi",
                "CreatedDate": "2025-01-04T10:00:00"
            }])),
            set(json!([{ "AttachmentUrl": "/Docs/p1.pdf" }, { "Url": "/Docs/p2.pdf" }])),
        ];

        let node = assemble_single(&sets, &PROJECT_DETAIL).unwrap().unwrap();
        let value = serde_json::to_value(&node).unwrap();

        assert_eq!(value["stageHistory"], json!([{ "stage": "Proposal" }, { "stage": "Confirmed" }]));
        assert_eq!(value["scopeHistory"][0]["attachments"], json!([]));
        assert_eq!(value["advancePayments"][0]["amount"], json!(5000));
        assert_eq!(value["attachmentUrls"], json!(["/Docs/p1.pdf", "/Docs/p2.pdf"]));
    }

    #[test]
    fn project_detail_with_empty_child_sets() {
        let mut sets = vec![ResultSet::default(); 6];
        sets[0] = set(json!([{ "ProjectNo": 7 }]));

        let value = serde_json::to_value(assemble_single(&sets, &PROJECT_DETAIL).unwrap()).unwrap();
        assert_eq!(value["stageHistory"], json!([]));
        assert_eq!(value["advancePayments"], json!([]));
        assert_eq!(value["attachmentUrls"], json!([]));
    }

    #[test]
    fn lowercased_columns_break_the_contract() {
        let sets = vec![
            set(json!([{ "projectno": 7 }])),
            set(json!([{ "scopehistoryid": 20, "projectno": 7, "versionno": 1 }])),
            ResultSet::default(),
            ResultSet::default(),
            ResultSet::default(),
            ResultSet::default(),
        ];
        assert!(matches!(
            assemble_single(&sets, &PROJECT_DETAIL),
            Err(AssembleError::MissingColumn { set: 0, column: "ProjectNo", .. })
        ));
    }

    #[test]
    fn project_detail_requires_six_sets() {
        let sets = vec![set(json!([{ "ProjectNo": 7 }])); 5];
        assert!(assemble_single(&sets, &PROJECT_DETAIL).is_err());
    }

    #[test]
    fn unknown_project_is_not_found() {
        let sets = vec![ResultSet::default(); 6];
        assert!(assemble_single(&sets, &PROJECT_DETAIL).unwrap().is_none());
    }

    #[test]
    fn confirmed_projects_get_their_serial_numbers() {
        let sets = vec![
            set(json!([
                { "ProjectNo": 1, "ProjectName": "A", "RowVersion": 9 },
                { "ProjectNo": 2, "ProjectName": "B", "RowVersion": 4 },
            ])),
            set(json!([
                { "ProjectNo": 2, "SerialNumber": "SN-2", "Version": "1.0", "RecordedById": null,
                  "RecordedByName": "Meera", "RecordedDate": "2025-02-01T09:30:00" },
            ])),
        ];

        let value = serde_json::to_value(assemble(&sets, &CONFIRMED_PROJECTS).unwrap()).unwrap();
        assert_eq!(value[0]["serialNumbers"], json!([]));
        assert_eq!(value[1]["serialNumbers"][0]["serialNumber"], json!("SN-2"));
        assert!(value[1]["serialNumbers"][0].get("projectNo").is_none());
        assert!(value[0].get("rowVersion").is_none());
    }

    #[test]
    fn work_status_attachments_link_by_status_update() {
        let sets = vec![
            set(json!([
                { "StatusUpdateId": "6f1c2a9e-3d4b-4c5d-8e6f-7a8b9c0d1e2f", "ProjectId": 4,
                  "StatusCode": "DEV", "StatusText": "In development" },
            ])),
            set(json!([
                { "StatusUpdateId": "6F1C2A9E-3D4B-4C5D-8E6F-7A8B9C0D1E2F", "FileUrl": "/Docs/s.png",
                  "UploadedDate": "2025-03-01T00:00:00", "UploadedById": null, "UploadedByName": "Kiran" },
            ])),
        ];

        let value = serde_json::to_value(assemble(&sets, &WORK_STATUS).unwrap()).unwrap();
        assert_eq!(value[0]["statusText"], json!("In development"));
        assert_eq!(value[0]["attachments"][0]["fileUrl"], json!("/Docs/s.png"));
        assert_eq!(value[0]["attachments"][0].as_object().unwrap().len(), 4);
    }

    fn menu_rows() -> Vec<ResultSet> {
        vec![set(json!([
            { "MenuId": "00000000-0000-0000-0000-00000000000a", "MenuName": "Settings", "MenuURL": "/settings",
              "MenuIcon": "cog", "Order": 2, "MainMenuId": null },
            { "MenuId": "00000000-0000-0000-0000-00000000000b", "MenuName": "Projects", "MenuURL": "/projects",
              "MenuIcon": "folder", "Order": 1, "MainMenuId": null },
            { "MenuId": "00000000-0000-0000-0000-00000000000c", "MenuName": "Users", "MenuURL": "/settings/users",
              "MenuIcon": null, "Order": 5, "MainMenuId": "00000000-0000-0000-0000-00000000000a" },
            { "MenuId": "00000000-0000-0000-0000-00000000000d", "MenuName": "Roles", "MenuURL": "/settings/roles",
              "MenuIcon": null, "Order": 3, "MainMenuId": "00000000-0000-0000-0000-00000000000a" },
        ]))]
    }

    #[test]
    fn menu_tree_uses_wire_names_and_omits_empty_submenus() {
        let value = serde_json::to_value(assemble(&menu_rows(), &MENU_TREE).unwrap()).unwrap();

        assert_eq!(value[0]["menuName"], json!("Projects"));
        assert!(value[0].get("submenu").is_none());
        assert_eq!(value[1]["menuURL"], json!("/settings"));
        assert_eq!(value[1]["submenu"][0]["menuName"], json!("Roles"));
        assert_eq!(value[1]["submenu"][1]["menuName"], json!("Users"));
    }

    #[test]
    fn main_menus_are_roots_only() {
        let value = serde_json::to_value(assemble(&menu_rows(), &MAIN_MENUS).unwrap()).unwrap();
        let names: Vec<&Value> = value
            .as_array()
            .unwrap()
            .iter()
            .map(|m| &m["menuName"])
            .collect();
        assert_eq!(names, vec![&json!("Projects"), &json!("Settings")]);
        assert!(value[1].get("submenu").is_none());
    }
}
