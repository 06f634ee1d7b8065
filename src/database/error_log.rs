//! Best-effort error log sink backed by `usp_insert_error_log`.

use chrono::Local;
use tracing::warn;

use crate::database::catalog;
use crate::database::procedure::{ErrorClass, Procedure, ProcedureError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSource {
    Sql,
    Controller,
}

impl ErrorSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorSource::Sql => "SQL",
            ErrorSource::Controller => "Controller",
        }
    }
}

/// Write one entry to the error log without waiting for it.
///
/// Must be called from inside the tokio runtime. A failed write is reported to the process
/// log and otherwise dropped.
pub fn record(
    controller: &'static str,
    action: &'static str,
    message: impl Into<String>,
    source: ErrorSource,
) {
    let message = message.into();
    tokio::spawn(async move {
        let result = Procedure::new(catalog::INSERT_ERROR_LOG)
            .arg("controller_name", controller)
            .arg("action_name", action)
            .arg("error_message", message.as_str())
            .arg("error_source", source.as_str())
            .arg("created_at", Local::now().naive_local())
            .execute()
            .await;

        if let Err(e) = result {
            warn!("Could not write error log entry for {}/{}: {}", controller, action, e);
        }
    });
}

/// Report infrastructure failures of a procedure call to the error log.
pub trait LogFailure<T> {
    fn logged(self, controller: &'static str, action: &'static str) -> Result<T, ProcedureError>;
}

impl<T> LogFailure<T> for Result<T, ProcedureError> {
    fn logged(self, controller: &'static str, action: &'static str) -> Result<T, ProcedureError> {
        if let Err(err) = &self {
            if err.class() == ErrorClass::Infrastructure {
                record(controller, action, err.to_string(), ErrorSource::Sql);
            }
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn source_labels() {
        assert_eq!(ErrorSource::Sql.as_str(), "SQL");
        assert_eq!(ErrorSource::Controller.as_str(), "Controller");
    }

    #[test]
    fn business_errors_pass_through_unlogged() {
        // No runtime here: logging would panic in tokio::spawn if it were attempted
        let result: Result<(), ProcedureError> =
            Err(ProcedureError::from_number(50001, "Duplicate serial number"));
        let err = result.logged("development", "add_status_update").unwrap_err();
        assert!(matches!(err, ProcedureError::BusinessRule { number: 50001, .. }));
    }

    #[tokio::test]
    async fn infrastructure_errors_are_returned_unchanged() {
        let result: Result<(), ProcedureError> =
            Err(ProcedureError::from_number(4060, "Cannot open database"));
        let err = result.logged("menu", "get_all").unwrap_err();
        assert!(matches!(err, ProcedureError::Server { number: 4060, .. }));
    }
}
