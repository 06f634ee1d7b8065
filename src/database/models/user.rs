use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[sqlx(rename_all = "PascalCase")]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub user_id: Uuid,
    pub user_name: Option<String>,
    pub email_id: Option<String>,
    pub role_id: Option<Uuid>,
    pub user_code: Option<Uuid>,
    pub employee_type: Option<String>,
    pub role_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[sqlx(rename_all = "PascalCase")]
#[serde(rename_all = "camelCase")]
pub struct UserRole {
    pub role_id: Uuid,
    pub role_name: Option<String>,
    pub is_active: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn serializes_with_wire_names() {
        let user = User {
            user_id: Uuid::nil(),
            user_name: Some("Asha".to_string()),
            email_id: Some("asha@example.com".to_string()),
            role_id: None,
            user_code: None,
            employee_type: Some("Permanent".to_string()),
            role_name: None,
        };
        let value = serde_json::to_value(&user).unwrap();
        assert_eq!(value["userId"], json!("00000000-0000-0000-0000-000000000000"));
        assert_eq!(value["emailId"], json!("asha@example.com"));
        assert_eq!(value["roleId"], json!(null));
    }
}
