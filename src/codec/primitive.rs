//! Codecs of the native scalar types.
//!
//! Fixed-width types use bincode with big-endian, fixed-int encoding, which lays integers,
//! doubles and booleans out exactly as the native protocol does.
use bincode::{
    Decode, Encode,
    config::{BigEndian, Configuration, Fixint},
};
use bytes::Bytes;

use crate::{metadata::DataType, protocol::ProtocolVersion};

use super::{Codec, CodecError, Value};

pub static BOOLEAN: BooleanCodec = BooleanCodec;
pub static INT: IntCodec = IntCodec;
pub static BIGINT: BigIntCodec = BigIntCodec;
pub static DOUBLE: DoubleCodec = DoubleCodec;
pub static TEXT: TextCodec = TextCodec;
pub static BLOB: BlobCodec = BlobCodec;
pub static VARINT: VarintCodec = VarintCodec;

fn config() -> Configuration<BigEndian, Fixint> {
    bincode::config::standard()
        .with_big_endian()
        .with_fixed_int_encoding()
}

fn encode_fixed<T: Encode>(value: T) -> Result<Bytes, CodecError> {
    Ok(Bytes::from(bincode::encode_to_vec(value, config())?))
}

fn decode_fixed<T: Decode<()>>(bytes: &[u8], width: usize) -> Result<T, CodecError> {
    if bytes.len() != width {
        return Err(CodecError::InvalidLength {
            expected: width,
            actual: bytes.len(),
        });
    }
    let (value, _) = bincode::decode_from_slice(bytes, config())?;
    Ok(value)
}

fn wrong_value(codec: &'static str, value: &Value) -> CodecError {
    CodecError::WrongValue {
        codec,
        value: value.kind(),
    }
}

#[derive(Debug, Clone, Copy)]
pub struct BooleanCodec;

impl Codec for BooleanCodec {
    fn data_type(&self) -> DataType {
        DataType::Boolean
    }

    fn encode(&self, value: &Value, _version: ProtocolVersion) -> Result<Bytes, CodecError> {
        match value {
            Value::Boolean(b) => encode_fixed(*b),
            other => Err(wrong_value("boolean", other)),
        }
    }

    fn decode(&self, bytes: &[u8], _version: ProtocolVersion) -> Result<Value, CodecError> {
        decode_fixed::<bool>(bytes, 1).map(Value::Boolean)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct IntCodec;

impl Codec for IntCodec {
    fn data_type(&self) -> DataType {
        DataType::Int
    }

    fn encode(&self, value: &Value, _version: ProtocolVersion) -> Result<Bytes, CodecError> {
        match value {
            Value::Int(i) => encode_fixed(*i),
            other => Err(wrong_value("int", other)),
        }
    }

    fn decode(&self, bytes: &[u8], _version: ProtocolVersion) -> Result<Value, CodecError> {
        decode_fixed::<i32>(bytes, 4).map(Value::Int)
    }
}

/// 64-bit integers; also the wire form of counters and timestamps.
#[derive(Debug, Clone, Copy)]
pub struct BigIntCodec;

impl BigIntCodec {
    pub fn encode_i64(&self, value: i64) -> Result<Bytes, CodecError> {
        encode_fixed(value)
    }
}

impl Codec for BigIntCodec {
    fn data_type(&self) -> DataType {
        DataType::BigInt
    }

    fn encode(&self, value: &Value, _version: ProtocolVersion) -> Result<Bytes, CodecError> {
        match value {
            Value::BigInt(i) => self.encode_i64(*i),
            other => Err(wrong_value("bigint", other)),
        }
    }

    fn decode(&self, bytes: &[u8], _version: ProtocolVersion) -> Result<Value, CodecError> {
        decode_fixed::<i64>(bytes, 8).map(Value::BigInt)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct DoubleCodec;

impl Codec for DoubleCodec {
    fn data_type(&self) -> DataType {
        DataType::Double
    }

    fn encode(&self, value: &Value, _version: ProtocolVersion) -> Result<Bytes, CodecError> {
        match value {
            Value::Double(d) => encode_fixed(*d),
            other => Err(wrong_value("double", other)),
        }
    }

    fn decode(&self, bytes: &[u8], _version: ProtocolVersion) -> Result<Value, CodecError> {
        decode_fixed::<f64>(bytes, 8).map(Value::Double)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct TextCodec;

impl Codec for TextCodec {
    fn data_type(&self) -> DataType {
        DataType::Text
    }

    fn encode(&self, value: &Value, _version: ProtocolVersion) -> Result<Bytes, CodecError> {
        match value {
            Value::Text(s) => Ok(Bytes::copy_from_slice(s.as_bytes())),
            other => Err(wrong_value("text", other)),
        }
    }

    fn decode(&self, bytes: &[u8], _version: ProtocolVersion) -> Result<Value, CodecError> {
        Ok(Value::Text(std::str::from_utf8(bytes)?.to_string()))
    }
}

#[derive(Debug, Clone, Copy)]
pub struct BlobCodec;

impl BlobCodec {
    pub fn encode_bytes(&self, value: &Bytes) -> Bytes {
        value.clone()
    }
}

impl Codec for BlobCodec {
    fn data_type(&self) -> DataType {
        DataType::Blob
    }

    fn encode(&self, value: &Value, _version: ProtocolVersion) -> Result<Bytes, CodecError> {
        match value {
            Value::Blob(b) => Ok(self.encode_bytes(b)),
            other => Err(wrong_value("blob", other)),
        }
    }

    fn decode(&self, bytes: &[u8], _version: ProtocolVersion) -> Result<Value, CodecError> {
        Ok(Value::Blob(Bytes::copy_from_slice(bytes)))
    }
}

/// Arbitrary-precision integers, as minimal big-endian two's complement.
#[derive(Debug, Clone, Copy)]
pub struct VarintCodec;

impl VarintCodec {
    pub fn encode_i128(&self, value: i128) -> Bytes {
        let bytes = value.to_be_bytes();
        let mut start = 0;
        while start < bytes.len() - 1 {
            let (b, next) = (bytes[start], bytes[start + 1]);
            let redundant = (b == 0x00 && next & 0x80 == 0) || (b == 0xff && next & 0x80 != 0);
            if !redundant {
                break;
            }
            start += 1;
        }
        Bytes::copy_from_slice(&bytes[start..])
    }

    pub fn decode_i128(&self, bytes: &[u8]) -> Result<i128, CodecError> {
        if bytes.is_empty() {
            return Err(CodecError::InvalidLength {
                expected: 1,
                actual: 0,
            });
        }
        if bytes.len() > 16 {
            return Err(CodecError::Overflow(bytes.len()));
        }
        let fill = if bytes[0] & 0x80 != 0 { 0xff } else { 0x00 };
        let mut buf = [fill; 16];
        buf[16 - bytes.len()..].copy_from_slice(bytes);
        Ok(i128::from_be_bytes(buf))
    }
}

impl Codec for VarintCodec {
    fn data_type(&self) -> DataType {
        DataType::Varint
    }

    fn encode(&self, value: &Value, _version: ProtocolVersion) -> Result<Bytes, CodecError> {
        match value {
            Value::Varint(i) => Ok(self.encode_i128(*i)),
            other => Err(wrong_value("varint", other)),
        }
    }

    fn decode(&self, bytes: &[u8], _version: ProtocolVersion) -> Result<Value, CodecError> {
        self.decode_i128(bytes).map(Value::Varint)
    }
}
