use thiserror::Error;

use crate::{
    codec::CodecError, config::ConfigError, metadata::TokenError, protocol::frame::FrameError,
};

/// Failures raised by the driver itself, before or after talking to a server.
#[derive(Debug, Error)]
pub enum DriverError {
    /// The caller built a statement the request cannot express.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// The statement is not in a state that can be sent.
    #[error("illegal state: {0}")]
    IllegalState(String),

    /// The server answered with something the protocol does not allow here.
    #[error("protocol violation: {0}")]
    ProtocolViolation(String),

    #[error(transparent)]
    Token(#[from] TokenError),

    #[error(transparent)]
    Codec(#[from] CodecError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Frame(#[from] FrameError),
}

pub type Result<T> = std::result::Result<T, DriverError>;
