// handlers/mod.rs - one module per resource, each mounted under /api/<resource>
//
// Every handler makes a single procedure call. Request bodies are validated before the call,
// procedure outcomes are mapped to the response envelope through ApiError.

pub mod authorization;
pub mod development;
pub mod login;
pub mod menu;
pub mod presales;
pub mod service;
pub mod user;
pub mod user_role;

use serde_json::Value;

use crate::database::models::OutputMessage;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult};

/// JSON text of a string list, as list-valued procedure arguments expect it.
pub(crate) fn json_list(items: Option<&[String]>) -> Option<String> {
    items.map(|items| Value::from(items.to_vec()).to_string())
}

/// `SUCCESS` becomes `done`; any other output message is the refusal reason (422).
pub(crate) fn output_message(reply: Option<OutputMessage>, done: &str) -> ApiResult<()> {
    match reply {
        Some(reply) if reply.is_success() => Ok(ApiResponse::message_only(done)),
        Some(reply) => Err(ApiError::unprocessable_entity(reply.reason())),
        None => Err(ApiError::internal_server_error("Operation was not completed")),
    }
}
