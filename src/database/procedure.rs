//! Stored procedure invocation.
//!
//! Every endpoint makes exactly one call through [`Procedure`]. Arguments are passed with
//! named notation so the call does not depend on the function's parameter order:
//!
//! ```text
//! SELECT * FROM sp_presales_get_all_confirmed()
//! SELECT * FROM sp_presales_delete(project_no => $1, user_id => $2)
//! ```
//!
//! Procedures with several result sets return `SETOF refcursor`; [`Procedure::result_sets`]
//! opens them inside one transaction and drains them in the order they were returned.

use std::time::{Duration, Instant};

use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use sqlx::postgres::{PgArguments, PgDatabaseError, PgRow};
use sqlx::{Arguments, FromRow, Postgres};
use thiserror::Error;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::assembler::{self, AssembleError, Layout, ResultSet, Row, TreeNode};
use crate::config;
use crate::database::dynamic::row_to_json;
use crate::database::manager::{DatabaseError, DatabaseManager};

/// Error numbers at or above this are business-rule violations raised by a procedure.
pub const BUSINESS_RULE_THRESHOLD: i32 = 50000;

/// SQLSTATE of `RAISE EXCEPTION` without an explicit code.
const RAISE_EXCEPTION: &str = "P0001";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    BusinessRule,
    Infrastructure,
}

pub fn classify(number: i32) -> ErrorClass {
    if number >= BUSINESS_RULE_THRESHOLD {
        ErrorClass::BusinessRule
    } else {
        ErrorClass::Infrastructure
    }
}

/// Outcome taxonomy of one procedure call.
#[derive(Debug, Error)]
pub enum ProcedureError {
    /// Raised deliberately by the procedure; the message is meant for the client.
    #[error("{message}")]
    BusinessRule { number: i32, message: String },

    /// A numbered error below the business-rule range.
    #[error("procedure error {number}: {message}")]
    Server { number: i32, message: String },

    /// The procedure's result sets do not match the layout that reads them.
    #[error("procedure contract violation: {0}")]
    ContractViolation(#[from] AssembleError),

    #[error(transparent)]
    Database(sqlx::Error),

    #[error(transparent)]
    Pool(#[from] DatabaseError),
}

impl ProcedureError {
    pub fn from_number(number: i32, message: impl Into<String>) -> Self {
        let message = message.into();
        match classify(number) {
            ErrorClass::BusinessRule => ProcedureError::BusinessRule { number, message },
            ErrorClass::Infrastructure => ProcedureError::Server { number, message },
        }
    }

    pub fn class(&self) -> ErrorClass {
        match self {
            ProcedureError::BusinessRule { .. } => ErrorClass::BusinessRule,
            _ => ErrorClass::Infrastructure,
        }
    }
}

impl From<sqlx::Error> for ProcedureError {
    fn from(err: sqlx::Error) -> Self {
        let raised = err
            .as_database_error()
            .and_then(|db| db.try_downcast_ref::<PgDatabaseError>())
            .filter(|pg| pg.code() == RAISE_EXCEPTION)
            .map(|pg| (error_number(pg.detail()), pg.message().to_string()));

        match raised {
            Some((number, message)) => ProcedureError::from_number(number, message),
            None => ProcedureError::Database(err),
        }
    }
}

/// Error number carried in the DETAIL of a raised exception, 50000 when absent.
fn error_number(detail: Option<&str>) -> i32 {
    detail
        .and_then(|d| d.trim().parse().ok())
        .unwrap_or(BUSINESS_RULE_THRESHOLD)
}

/// A single bound argument.
#[derive(Debug, Clone, PartialEq)]
pub enum Param {
    Int(Option<i32>),
    BigInt(Option<i64>),
    Text(Option<String>),
    Uuid(Option<Uuid>),
    Bool(Option<bool>),
    Decimal(Option<Decimal>),
    Timestamp(Option<NaiveDateTime>),
}

macro_rules! param_from {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$ty> for Param {
                fn from(v: $ty) -> Self {
                    Param::$variant(Some(v))
                }
            }

            impl From<Option<$ty>> for Param {
                fn from(v: Option<$ty>) -> Self {
                    Param::$variant(v)
                }
            }
        )*
    };
}

param_from! {
    i32 => Int,
    i64 => BigInt,
    String => Text,
    Uuid => Uuid,
    bool => Bool,
    Decimal => Decimal,
    NaiveDateTime => Timestamp,
}

impl From<&str> for Param {
    fn from(v: &str) -> Self {
        Param::Text(Some(v.to_string()))
    }
}

impl From<Option<&str>> for Param {
    fn from(v: Option<&str>) -> Self {
        Param::Text(v.map(str::to_string))
    }
}

impl Param {
    fn add_to(self, args: &mut PgArguments) {
        match self {
            Param::Int(v) => args.add(v),
            Param::BigInt(v) => args.add(v),
            Param::Text(v) => args.add(v),
            Param::Uuid(v) => args.add(v),
            Param::Bool(v) => args.add(v),
            Param::Decimal(v) => args.add(v),
            Param::Timestamp(v) => args.add(v),
        }
    }
}

/// Builder for one stored procedure call.
#[derive(Debug, Clone)]
pub struct Procedure {
    name: &'static str,
    args: Vec<(&'static str, Param)>,
}

impl Procedure {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            args: Vec::new(),
        }
    }

    pub fn arg(mut self, name: &'static str, value: impl Into<Param>) -> Self {
        self.args.push((name, value.into()));
        self
    }

    pub fn args(&self) -> &[(&'static str, Param)] {
        &self.args
    }

    /// `name(a => $1, b => $2)`
    fn call_expr(&self) -> String {
        let args: Vec<String> = self
            .args
            .iter()
            .enumerate()
            .map(|(i, (name, _))| format!("{} => ${}", name, i + 1))
            .collect();
        format!("{}({})", self.name, args.join(", "))
    }

    fn sql(&self) -> String {
        format!("SELECT * FROM {}", self.call_expr())
    }

    fn arguments(&self) -> PgArguments {
        let mut args = PgArguments::default();
        for (_, param) in &self.args {
            param.clone().add_to(&mut args);
        }
        args
    }

    /// Run for side effects only.
    pub async fn execute(self) -> Result<(), ProcedureError> {
        let pool = DatabaseManager::pool().await?;
        let sql = self.sql();
        let started = self.begin();
        sqlx::query_with(&sql, self.arguments())
            .execute(&pool)
            .await?;
        self.finish(started);
        Ok(())
    }

    /// First column of the first row.
    pub async fn scalar<T>(self) -> Result<T, ProcedureError>
    where
        T: for<'r> sqlx::Decode<'r, Postgres> + sqlx::Type<Postgres> + Send + Unpin,
    {
        let pool = DatabaseManager::pool().await?;
        let sql = self.sql();
        let started = self.begin();
        let value = sqlx::query_scalar_with::<_, T, _>(&sql, self.arguments())
            .fetch_one(&pool)
            .await?;
        self.finish(started);
        Ok(value)
    }

    /// Rows decoded into a fixed-shape struct.
    pub async fn fetch_as<T>(self) -> Result<Vec<T>, ProcedureError>
    where
        T: for<'r> FromRow<'r, PgRow> + Send + Unpin,
    {
        let pool = DatabaseManager::pool().await?;
        let sql = self.sql();
        let started = self.begin();
        let rows = sqlx::query_as_with::<_, T, _>(&sql, self.arguments())
            .fetch_all(&pool)
            .await?;
        self.finish(started);
        Ok(rows)
    }

    pub async fn fetch_optional_as<T>(self) -> Result<Option<T>, ProcedureError>
    where
        T: for<'r> FromRow<'r, PgRow> + Send + Unpin,
    {
        let pool = DatabaseManager::pool().await?;
        let sql = self.sql();
        let started = self.begin();
        let row = sqlx::query_as_with::<_, T, _>(&sql, self.arguments())
            .fetch_optional(&pool)
            .await?;
        self.finish(started);
        Ok(row)
    }

    /// Untyped rows of a single result set.
    pub async fn rows(self) -> Result<ResultSet, ProcedureError> {
        let pool = DatabaseManager::pool().await?;
        let sql = self.sql();
        let started = self.begin();
        let rows = sqlx::query_with(&sql, self.arguments())
            .fetch_all(&pool)
            .await?;
        self.finish(started);
        decode(&rows)
    }

    pub async fn first_row(self) -> Result<Option<Row>, ProcedureError> {
        Ok(self.rows().await?.into_rows().into_iter().next())
    }

    /// Every result set of a `SETOF refcursor` procedure, in cursor order.
    pub async fn result_sets(self) -> Result<Vec<ResultSet>, ProcedureError> {
        let pool = DatabaseManager::pool().await?;
        let sql = format!("SELECT c::text FROM {} AS c", self.call_expr());
        let started = self.begin();

        // Cursors only live until the end of the transaction; dropping `tx` rolls back
        let mut tx = pool.begin().await?;
        let cursors = sqlx::query_scalar_with::<_, String, _>(&sql, self.arguments())
            .fetch_all(&mut *tx)
            .await?;

        let mut sets = Vec::with_capacity(cursors.len());
        for cursor in &cursors {
            let rows = sqlx::query(&format!("FETCH ALL FROM {}", quote_ident(cursor)))
                .fetch_all(&mut *tx)
                .await?;
            sets.push(decode(&rows)?);
        }
        tx.commit().await?;

        self.finish(started);
        Ok(sets)
    }

    /// Every root of `layout`, assembled from this call's result sets.
    pub async fn assemble(self, layout: &Layout) -> Result<Vec<TreeNode>, ProcedureError> {
        let sets = self.result_sets().await?;
        Ok(assembler::assemble(&sets, layout)?)
    }

    /// Assemble the rows of a plain single-set procedure (self-referencing trees).
    pub async fn assemble_rows(self, layout: &Layout) -> Result<Vec<TreeNode>, ProcedureError> {
        let set = self.rows().await?;
        Ok(assembler::assemble(std::slice::from_ref(&set), layout)?)
    }

    /// A single-entity read; `Ok(None)` when the root set is empty.
    pub async fn assemble_single(self, layout: &Layout) -> Result<Option<TreeNode>, ProcedureError> {
        let sets = self.result_sets().await?;
        Ok(assembler::assemble_single(&sets, layout)?)
    }

    fn begin(&self) -> Instant {
        if config::config().database.enable_query_logging {
            debug!("Calling {} with {} argument(s)", self.name, self.args.len());
        }
        Instant::now()
    }

    fn finish(&self, started: Instant) {
        let elapsed = started.elapsed();
        let settings = &config::config().database;

        if settings.enable_query_logging {
            debug!("{} completed in {:?}", self.name, elapsed);
        }
        if settings.enable_slow_query_warning
            && elapsed > Duration::from_millis(settings.slow_query_threshold_ms)
        {
            warn!(
                "Slow procedure {}: {:?} (threshold {}ms)",
                self.name, elapsed, settings.slow_query_threshold_ms
            );
        }
    }
}

fn decode(rows: &[PgRow]) -> Result<ResultSet, ProcedureError> {
    rows.iter()
        .map(row_to_json)
        .collect::<Result<ResultSet, _>>()
        .map_err(ProcedureError::from)
}

/// Quote a cursor name for use as an identifier.
fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}
