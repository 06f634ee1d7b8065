use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

/// Reply of the OTP generation procedure. `status_code == 1` means the account exists and is
/// active.
#[derive(Debug, Clone, FromRow)]
#[sqlx(rename_all = "PascalCase")]
pub struct OtpChallenge {
    pub status_code: i32,
    pub otp: Option<String>,
    pub code: Option<Uuid>,
}

impl OtpChallenge {
    pub fn is_active_account(&self) -> bool {
        self.status_code == 1
    }
}

#[derive(Debug, Clone, Serialize, FromRow)]
#[sqlx(rename_all = "PascalCase")]
#[serde(rename_all = "camelCase")]
pub struct VerifiedUser {
    pub user_id: Uuid,
    pub user_name: Option<String>,
    pub email_id: Option<String>,
    pub role_id: Option<Uuid>,
    pub role_name: Option<String>,
}
