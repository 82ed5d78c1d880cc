//! Value encoding.
//!
//! Tokens are encoded with the codec of their partitioner rather than through the
//! registry: a token's wire form is fixed by the partitioner, not by its runtime type.
use bytes::Bytes;
use log::trace;

use crate::{
    codec::{
        CodecRegistry, Value,
        primitive::{BIGINT, BLOB, VARINT},
    },
    error::Result,
    metadata::{DataType, Token, TokenError},
    protocol::{ProtocolVersion, RawValue},
};

/// Wire form of a token.
pub fn encode_token(token: &Token) -> Result<Bytes> {
    match token {
        Token::Hash64(t) => Ok(BIGINT.encode_i64(t.value())?),
        Token::BigInt(t) => {
            let value = i128::try_from(t.value()).map_err(|_| TokenError::OutOfRange(t.value()))?;
            Ok(VARINT.encode_i128(value))
        }
        Token::Raw(t) => Ok(BLOB.encode_bytes(t.value())),
    }
}

/// Encodes a single value, looking its codec up by runtime type.
pub fn encode(
    value: &Value,
    registry: &dyn CodecRegistry,
    version: ProtocolVersion,
) -> Result<RawValue> {
    match value {
        Value::Null => Ok(RawValue::Null),
        Value::Unset => Ok(RawValue::Unset),
        Value::Token(token) => Ok(RawValue::Bytes(encode_token(token)?)),
        other => Ok(RawValue::Bytes(
            registry.codec_for(other)?.encode(other, version)?,
        )),
    }
}

/// Encodes a value for a column of a known type.
pub fn encode_for_type(
    value: &Value,
    data_type: &DataType,
    registry: &dyn CodecRegistry,
    version: ProtocolVersion,
) -> Result<RawValue> {
    match value {
        Value::Null => Ok(RawValue::Null),
        Value::Unset => Ok(RawValue::Unset),
        Value::Token(token) => Ok(RawValue::Bytes(encode_token(token)?)),
        other => Ok(RawValue::Bytes(
            registry.codec_for_type(data_type)?.encode(other, version)?,
        )),
    }
}

pub fn encode_positional(
    values: &[Value],
    registry: &dyn CodecRegistry,
    version: ProtocolVersion,
) -> Result<Vec<RawValue>> {
    let encoded = values
        .iter()
        .map(|v| encode(v, registry, version))
        .collect::<Result<Vec<_>>>()?;
    trace!("encoded {} positional values", encoded.len());
    Ok(encoded)
}

pub fn encode_named(
    values: &[(String, Value)],
    registry: &dyn CodecRegistry,
    version: ProtocolVersion,
) -> Result<Vec<(String, RawValue)>> {
    let encoded = values
        .iter()
        .map(|(n, v)| Ok((n.clone(), encode(v, registry, version)?)))
        .collect::<Result<Vec<_>>>()?;
    trace!("encoded {} named values", encoded.len());
    Ok(encoded)
}
