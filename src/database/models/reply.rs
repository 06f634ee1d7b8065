//! Status rows returned by write procedures.

use serde::Serialize;
use sqlx::FromRow;

/// `(StatusCode, Message)` with an HTTP-like status code.
#[derive(Debug, Clone, Serialize, FromRow)]
#[sqlx(rename_all = "PascalCase")]
#[serde(rename_all = "camelCase")]
pub struct StatusReply {
    pub status_code: i32,
    pub message: Option<String>,
}

/// `(Status, Message)` where status 0 means the row already exists.
#[derive(Debug, Clone, FromRow)]
#[sqlx(rename_all = "PascalCase")]
pub struct InsertReply {
    pub status: i32,
    pub message: Option<String>,
}

impl InsertReply {
    pub fn is_duplicate(&self) -> bool {
        self.status == 0
    }
}

/// Single `OutputMessage` column; anything but `SUCCESS` is a refusal with a reason.
#[derive(Debug, Clone, FromRow)]
#[sqlx(rename_all = "PascalCase")]
pub struct OutputMessage {
    pub output_message: Option<String>,
}

impl OutputMessage {
    pub const SUCCESS: &'static str = "SUCCESS";

    pub fn is_success(&self) -> bool {
        self.output_message.as_deref() == Some(Self::SUCCESS)
    }

    pub fn reason(&self) -> &str {
        self.output_message
            .as_deref()
            .filter(|m| !m.trim().is_empty())
            .unwrap_or("Operation was not completed")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn output_message_success_is_exact() {
        let ok = OutputMessage { output_message: Some("SUCCESS".to_string()) };
        let lower = OutputMessage { output_message: Some("success".to_string()) };
        let none = OutputMessage { output_message: None };
        assert!(ok.is_success());
        assert!(!lower.is_success());
        assert!(!none.is_success());
        assert_eq!(none.reason(), "Operation was not completed");
        assert_eq!(lower.reason(), "success");
    }

    #[test]
    fn insert_reply_duplicate() {
        assert!(InsertReply { status: 0, message: None }.is_duplicate());
        assert!(!InsertReply { status: 1, message: None }.is_duplicate());
    }
}
