//! Errors reported by the coordinator of a request.
//!
//! Each variant carries what the server sent for that error code, so a retry policy can
//! decide what to do without going back to the raw response. Nothing here is retried or
//! suppressed by the driver core.
use std::{collections::BTreeMap, net::IpAddr, sync::Arc};

use thiserror::Error;

use crate::{
    config::{ConsistencyLevel, WriteType},
    metadata::Node,
    protocol::constants::error_code,
};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CoordinatorError {
    #[error("[{node}] server error: {message}")]
    ServerError { node: Arc<Node>, message: String },

    /// Also used for error codes the driver does not know, and for responses whose
    /// payload does not match their code.
    #[error("[{node}] protocol error: {message}")]
    ProtocolError {
        node: Arc<Node>,
        code: i32,
        message: String,
    },

    #[error(
        "[{node}] not enough replicas available for query at consistency {consistency} \
         ({required} required but only {alive} alive)"
    )]
    Unavailable {
        node: Arc<Node>,
        consistency: ConsistencyLevel,
        required: i32,
        alive: i32,
    },

    #[error("[{node}] coordinator is overloaded")]
    Overloaded { node: Arc<Node> },

    #[error("[{node}] coordinator is bootstrapping")]
    Bootstrapping { node: Arc<Node> },

    #[error("[{node}] truncate failed: {message}")]
    Truncate { node: Arc<Node>, message: String },

    #[error(
        "[{node}] timeout during {write_type} write at consistency {consistency} \
         ({block_for} replicas were required but only {received} acknowledged the write)"
    )]
    WriteTimeout {
        node: Arc<Node>,
        consistency: ConsistencyLevel,
        received: i32,
        block_for: i32,
        write_type: WriteType,
    },

    #[error(
        "[{node}] timeout during read at consistency {consistency} \
         ({block_for} responses were required but only {received} replicas responded)"
    )]
    ReadTimeout {
        node: Arc<Node>,
        consistency: ConsistencyLevel,
        received: i32,
        block_for: i32,
        data_present: bool,
    },

    #[error(
        "[{node}] read failed at consistency {consistency} \
         ({block_for} responses were required but only {received} replicas responded, \
         {num_failures} failed)"
    )]
    ReadFailure {
        node: Arc<Node>,
        consistency: ConsistencyLevel,
        received: i32,
        block_for: i32,
        num_failures: i32,
        data_present: bool,
        reason_map: BTreeMap<IpAddr, u16>,
    },

    #[error("[{node}] function failure: {message}")]
    FunctionFailure { node: Arc<Node>, message: String },

    #[error(
        "[{node}] {write_type} write failed at consistency {consistency} \
         ({block_for} responses were required but only {received} replicas responded, \
         {num_failures} failed)"
    )]
    WriteFailure {
        node: Arc<Node>,
        consistency: ConsistencyLevel,
        received: i32,
        block_for: i32,
        write_type: WriteType,
        num_failures: i32,
        reason_map: BTreeMap<IpAddr, u16>,
    },

    #[error("[{node}] syntax error: {message}")]
    SyntaxError { node: Arc<Node>, message: String },

    #[error("[{node}] unauthorized: {message}")]
    Unauthorized { node: Arc<Node>, message: String },

    #[error("[{node}] invalid query: {message}")]
    InvalidQuery { node: Arc<Node>, message: String },

    #[error("[{node}] invalid configuration in query: {message}")]
    InvalidConfigurationInQuery { node: Arc<Node>, message: String },

    #[error("[{node}] {} already exists", already_exists_target(.keyspace, .table))]
    AlreadyExists {
        node: Arc<Node>,
        keyspace: String,
        table: String,
    },
}

fn already_exists_target(keyspace: &str, table: &str) -> String {
    if table.is_empty() {
        format!("keyspace {keyspace}")
    } else {
        format!("object {keyspace}.{table}")
    }
}

impl CoordinatorError {
    /// The node that reported the error.
    pub fn node(&self) -> &Arc<Node> {
        match self {
            CoordinatorError::ServerError { node, .. }
            | CoordinatorError::ProtocolError { node, .. }
            | CoordinatorError::Unavailable { node, .. }
            | CoordinatorError::Overloaded { node }
            | CoordinatorError::Bootstrapping { node }
            | CoordinatorError::Truncate { node, .. }
            | CoordinatorError::WriteTimeout { node, .. }
            | CoordinatorError::ReadTimeout { node, .. }
            | CoordinatorError::ReadFailure { node, .. }
            | CoordinatorError::FunctionFailure { node, .. }
            | CoordinatorError::WriteFailure { node, .. }
            | CoordinatorError::SyntaxError { node, .. }
            | CoordinatorError::Unauthorized { node, .. }
            | CoordinatorError::InvalidQuery { node, .. }
            | CoordinatorError::InvalidConfigurationInQuery { node, .. }
            | CoordinatorError::AlreadyExists { node, .. } => node,
        }
    }

    /// The server error code this error was built from.
    pub fn code(&self) -> i32 {
        match self {
            CoordinatorError::ServerError { .. } => error_code::SERVER_ERROR,
            CoordinatorError::ProtocolError { code, .. } => *code,
            CoordinatorError::Unavailable { .. } => error_code::UNAVAILABLE,
            CoordinatorError::Overloaded { .. } => error_code::OVERLOADED,
            CoordinatorError::Bootstrapping { .. } => error_code::IS_BOOTSTRAPPING,
            CoordinatorError::Truncate { .. } => error_code::TRUNCATE_ERROR,
            CoordinatorError::WriteTimeout { .. } => error_code::WRITE_TIMEOUT,
            CoordinatorError::ReadTimeout { .. } => error_code::READ_TIMEOUT,
            CoordinatorError::ReadFailure { .. } => error_code::READ_FAILURE,
            CoordinatorError::FunctionFailure { .. } => error_code::FUNCTION_FAILURE,
            CoordinatorError::WriteFailure { .. } => error_code::WRITE_FAILURE,
            CoordinatorError::SyntaxError { .. } => error_code::SYNTAX_ERROR,
            CoordinatorError::Unauthorized { .. } => error_code::UNAUTHORIZED,
            CoordinatorError::InvalidQuery { .. } => error_code::INVALID,
            CoordinatorError::InvalidConfigurationInQuery { .. } => error_code::CONFIG_ERROR,
            CoordinatorError::AlreadyExists { .. } => error_code::ALREADY_EXISTS,
        }
    }
}
