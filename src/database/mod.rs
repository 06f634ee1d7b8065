pub mod catalog;
pub mod dynamic;
pub mod error_log;
pub mod manager;
pub mod models;
pub mod procedure;

pub use error_log::{ErrorSource, LogFailure};
pub use manager::{DatabaseError, DatabaseManager};
pub use procedure::{classify, ErrorClass, Param, Procedure, ProcedureError};
