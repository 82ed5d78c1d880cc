//! Server error classification.
use std::sync::Arc;

use log::warn;

use crate::{
    config::{ConsistencyLevel, WriteType},
    context::DriverContext,
    metadata::Node,
    protocol::{ErrorDetails, ErrorMessage, constants::error_code},
    servererror::CoordinatorError,
};

/// Classifies an ERROR response sent by `node`.
///
/// Every code maps to exactly one variant; codes the driver does not know become a
/// [`CoordinatorError::ProtocolError`] carrying the raw code.
///
/// # Panics
///
/// UNPREPARED is not an error but a request to prepare again, callers must handle it
/// before getting here.
pub fn to_coordinator_error(
    node: Arc<Node>,
    error: ErrorMessage,
    _context: &DriverContext,
) -> CoordinatorError {
    let ErrorMessage {
        code,
        message,
        details,
    } = error;
    assert_ne!(
        code,
        error_code::UNPREPARED,
        "UNPREPARED should be handled as a special case, not turned into an error"
    );

    match classify(&node, code, message, details) {
        Ok(error) => error,
        Err(reason) => {
            warn!("[{node}] malformed error response 0x{code:04x}: {reason}");
            CoordinatorError::ProtocolError {
                node,
                code,
                message: format!("Malformed error response (code 0x{code:04x}): {reason}"),
            }
        }
    }
}

fn classify(
    node: &Arc<Node>,
    code: i32,
    message: String,
    details: ErrorDetails,
) -> Result<CoordinatorError, String> {
    let node = Arc::clone(node);
    let error = match code {
        error_code::SERVER_ERROR => CoordinatorError::ServerError { node, message },
        error_code::PROTOCOL_ERROR => CoordinatorError::ProtocolError {
            node,
            code,
            message,
        },
        // Authentication only happens while a connection is set up.
        error_code::AUTH_ERROR => CoordinatorError::ProtocolError {
            node,
            code,
            message: format!("Unexpected authentication error ({message})"),
        },
        error_code::UNAVAILABLE => match details {
            ErrorDetails::Unavailable {
                consistency,
                required,
                alive,
            } => CoordinatorError::Unavailable {
                node,
                consistency: consistency_level(consistency)?,
                required,
                alive,
            },
            other => return Err(unexpected("unavailable", &other)),
        },
        error_code::OVERLOADED => CoordinatorError::Overloaded { node },
        error_code::IS_BOOTSTRAPPING => CoordinatorError::Bootstrapping { node },
        error_code::TRUNCATE_ERROR => CoordinatorError::Truncate { node, message },
        error_code::WRITE_TIMEOUT => match details {
            ErrorDetails::WriteTimeout {
                consistency,
                received,
                block_for,
                write_type,
            } => CoordinatorError::WriteTimeout {
                node,
                consistency: consistency_level(consistency)?,
                received,
                block_for,
                write_type: WriteType::from_name(&write_type),
            },
            other => return Err(unexpected("write timeout", &other)),
        },
        error_code::READ_TIMEOUT => match details {
            ErrorDetails::ReadTimeout {
                consistency,
                received,
                block_for,
                data_present,
            } => CoordinatorError::ReadTimeout {
                node,
                consistency: consistency_level(consistency)?,
                received,
                block_for,
                data_present,
            },
            other => return Err(unexpected("read timeout", &other)),
        },
        error_code::READ_FAILURE => match details {
            ErrorDetails::ReadFailure {
                consistency,
                received,
                block_for,
                num_failures,
                reason_map,
                data_present,
            } => CoordinatorError::ReadFailure {
                node,
                consistency: consistency_level(consistency)?,
                received,
                block_for,
                num_failures,
                data_present,
                reason_map,
            },
            other => return Err(unexpected("read failure", &other)),
        },
        error_code::FUNCTION_FAILURE => CoordinatorError::FunctionFailure { node, message },
        error_code::WRITE_FAILURE => match details {
            ErrorDetails::WriteFailure {
                consistency,
                received,
                block_for,
                num_failures,
                reason_map,
                write_type,
            } => CoordinatorError::WriteFailure {
                node,
                consistency: consistency_level(consistency)?,
                received,
                block_for,
                write_type: WriteType::from_name(&write_type),
                num_failures,
                reason_map,
            },
            other => return Err(unexpected("write failure", &other)),
        },
        error_code::SYNTAX_ERROR => CoordinatorError::SyntaxError { node, message },
        error_code::UNAUTHORIZED => CoordinatorError::Unauthorized { node, message },
        error_code::INVALID => CoordinatorError::InvalidQuery { node, message },
        error_code::CONFIG_ERROR => CoordinatorError::InvalidConfigurationInQuery { node, message },
        error_code::ALREADY_EXISTS => match details {
            ErrorDetails::AlreadyExists { keyspace, table } => CoordinatorError::AlreadyExists {
                node,
                keyspace,
                table,
            },
            other => return Err(unexpected("already exists", &other)),
        },
        other => {
            warn!("[{node}] unknown error code 0x{other:04x}: {message}");
            CoordinatorError::ProtocolError {
                node,
                code,
                message: format!("Unknown error code: {other} ({message})"),
            }
        }
    };
    Ok(error)
}

fn consistency_level(code: u16) -> Result<ConsistencyLevel, String> {
    ConsistencyLevel::from_code(code).map_err(|e| e.to_string())
}

fn unexpected(expected: &str, details: &ErrorDetails) -> String {
    format!("expected {expected} details, got {details:?}")
}
