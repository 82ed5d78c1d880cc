use crate::metadata::DataType;

use super::{
    Codec, CodecError, CodecRegistry, Value,
    primitive::{BIGINT, BLOB, BOOLEAN, DOUBLE, INT, TEXT, VARINT},
};

/// Registry of the built-in scalar codecs.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultCodecRegistry;

impl CodecRegistry for DefaultCodecRegistry {
    fn codec_for(&self, value: &Value) -> Result<&dyn Codec, CodecError> {
        match value {
            Value::Boolean(_) => Ok(&BOOLEAN),
            Value::Int(_) => Ok(&INT),
            Value::BigInt(_) => Ok(&BIGINT),
            Value::Double(_) => Ok(&DOUBLE),
            Value::Text(_) => Ok(&TEXT),
            Value::Blob(_) => Ok(&BLOB),
            Value::Varint(_) => Ok(&VARINT),
            Value::Null | Value::Unset | Value::Token(_) => {
                Err(CodecError::Unsupported(value.kind().to_string()))
            }
        }
    }

    fn codec_for_type(&self, data_type: &DataType) -> Result<&dyn Codec, CodecError> {
        match data_type {
            DataType::Boolean => Ok(&BOOLEAN),
            DataType::Int => Ok(&INT),
            DataType::BigInt | DataType::Counter | DataType::Timestamp => Ok(&BIGINT),
            DataType::Double => Ok(&DOUBLE),
            DataType::Text | DataType::Ascii => Ok(&TEXT),
            DataType::Blob => Ok(&BLOB),
            DataType::Varint => Ok(&VARINT),
            other => Err(CodecError::Unsupported(other.to_string())),
        }
    }
}
