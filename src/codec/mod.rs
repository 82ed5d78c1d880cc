//! Value codecs.
//!
//! A [`Codec`] turns one runtime [`Value`] into its wire bytes and back. A
//! [`CodecRegistry`] picks the codec for a value or for a column type. The marshalling
//! core only relies on this invocation contract; [`DefaultCodecRegistry`] covers the
//! native types the driver needs out of the box.
use std::str::Utf8Error;

use bytes::Bytes;
use thiserror::Error;

use crate::{
    metadata::{DataType, Token},
    protocol::ProtocolVersion,
};

pub mod primitive;
mod registry;

pub use registry::DefaultCodecRegistry;

#[derive(Debug, Error)]
pub enum CodecError {
    #[error("no codec for {0}")]
    Unsupported(String),

    #[error("{codec} codec cannot handle {value}")]
    WrongValue {
        codec: &'static str,
        value: &'static str,
    },

    #[error("expected {expected} bytes, got {actual}")]
    InvalidLength { expected: usize, actual: usize },

    #[error("varint of {0} bytes overflows 128 bits")]
    Overflow(usize),

    #[error("failed to encode value: {0}")]
    Encode(#[from] bincode::error::EncodeError),

    #[error("failed to decode value: {0}")]
    Decode(#[from] bincode::error::DecodeError),

    #[error("invalid text: {0}")]
    Utf8(#[from] Utf8Error),
}

/// A runtime value, as supplied by the user for a bind marker.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    /// Leave the bind marker unset.
    Unset,
    Boolean(bool),
    Int(i32),
    BigInt(i64),
    Double(f64),
    Text(String),
    Blob(Bytes),
    Varint(i128),
    Token(Token),
}

impl Value {
    /// Variant name, used in diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Unset => "unset",
            Value::Boolean(_) => "boolean",
            Value::Int(_) => "int",
            Value::BigInt(_) => "bigint",
            Value::Double(_) => "double",
            Value::Text(_) => "text",
            Value::Blob(_) => "blob",
            Value::Varint(_) => "varint",
            Value::Token(_) => "token",
        }
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Boolean(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value::Int(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::BigInt(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Double(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Text(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Text(value)
    }
}

impl From<Bytes> for Value {
    fn from(value: Bytes) -> Self {
        Value::Blob(value)
    }
}

impl From<Token> for Value {
    fn from(value: Token) -> Self {
        Value::Token(value)
    }
}

/// Encodes and decodes values of one column type.
pub trait Codec: Send + Sync {
    fn data_type(&self) -> DataType;

    fn encode(&self, value: &Value, version: ProtocolVersion) -> Result<Bytes, CodecError>;

    fn decode(&self, bytes: &[u8], version: ProtocolVersion) -> Result<Value, CodecError>;
}

/// Finds codecs by runtime value or by column type.
pub trait CodecRegistry: Send + Sync {
    /// # Errors
    /// [`CodecError::Unsupported`] when no codec accepts the value.
    fn codec_for(&self, value: &Value) -> Result<&dyn Codec, CodecError>;

    /// # Errors
    /// [`CodecError::Unsupported`] when no codec handles the type.
    fn codec_for_type(&self, data_type: &DataType) -> Result<&dyn Codec, CodecError>;
}
