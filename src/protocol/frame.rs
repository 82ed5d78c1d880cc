//! Request frame layout.
//!
//! Lays a [`RequestMessage`] out exactly as it travels on the wire: the 9 byte header, an
//! optional custom payload, then the message body. The size helpers in [`sizes`] mirror
//! the encoders one for one, which is what keeps request size estimates honest.
use std::collections::BTreeMap;

use bytes::{BufMut, Bytes, BytesMut};
use log::trace;
use thiserror::Error;

use super::{
    ProtocolFeature, ProtocolVersion, ProtocolVersionRegistry,
    constants::{header_flag, query_flag},
    request::{Batch, Execute, Query, QueryOptions, QueryOrId, RawValue, RequestMessage, Values},
};

/// Size of the frame header from protocol V3 on.
pub const HEADER_SIZE: usize = 9;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FrameError {
    #[error("{kind} of {len} bytes does not fit its length prefix")]
    TooLong { kind: &'static str, len: usize },

    #[error("{0} not supported by protocol {1}")]
    Unsupported(&'static str, ProtocolVersion),
}

/// Encoded sizes of the protocol primitives.
pub mod sizes {
    use std::collections::BTreeMap;

    use bytes::Bytes;

    use crate::protocol::RawValue;

    pub const BYTE: usize = 1;
    pub const SHORT: usize = 2;
    pub const INT: usize = 4;
    pub const LONG: usize = 8;

    pub fn of_string(s: &str) -> usize {
        SHORT + s.len()
    }

    pub fn of_long_string(s: &str) -> usize {
        INT + s.len()
    }

    pub fn of_short_bytes(b: &[u8]) -> usize {
        SHORT + b.len()
    }

    pub fn of_bytes(b: &[u8]) -> usize {
        INT + b.len()
    }

    pub fn of_value(value: &RawValue) -> usize {
        match value {
            RawValue::Bytes(b) => of_bytes(b),
            RawValue::Null | RawValue::Unset => INT,
        }
    }

    pub fn of_bytes_map(map: &BTreeMap<String, Bytes>) -> usize {
        map.iter()
            .fold(SHORT, |size, (k, v)| size + of_string(k) + of_bytes(v))
    }

    pub fn of_positional_values(values: &[RawValue]) -> usize {
        values.iter().fold(SHORT, |size, v| size + of_value(v))
    }

    pub fn of_named_values(values: &[(String, RawValue)]) -> usize {
        values
            .iter()
            .fold(SHORT, |size, (k, v)| size + of_string(k) + of_value(v))
    }
}

pub fn header_encoded_size(_version: ProtocolVersion) -> usize {
    HEADER_SIZE
}

/// Size of the query/batch flags field: a byte up to V4, an int from V5 on.
pub fn query_flags_size(version: ProtocolVersion) -> usize {
    if version >= ProtocolVersion::V5 {
        sizes::INT
    } else {
        sizes::BYTE
    }
}

/// A request ready to be written to a connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub version: ProtocolVersion,
    pub stream_id: i16,
    pub tracing: bool,
    pub custom_payload: BTreeMap<String, Bytes>,
    pub message: RequestMessage,
}

impl Frame {
    pub fn new(version: ProtocolVersion, stream_id: i16, message: RequestMessage) -> Self {
        Self {
            version,
            stream_id,
            tracing: false,
            custom_payload: BTreeMap::new(),
            message,
        }
    }

    pub fn with_custom_payload(mut self, payload: BTreeMap<String, Bytes>) -> Self {
        self.custom_payload = payload;
        self
    }

    /// Encodes header, payload and body.
    ///
    /// The custom payload is only written when the version supports it.
    pub fn encode(&self, registry: &dyn ProtocolVersionRegistry) -> Result<Bytes, FrameError> {
        let mut body = BytesMut::new();
        let mut flags = 0u8;
        if self.tracing {
            flags |= header_flag::TRACING;
        }
        if !self.custom_payload.is_empty()
            && registry.supports(self.version, ProtocolFeature::CustomPayload)
        {
            flags |= header_flag::CUSTOM_PAYLOAD;
            write_bytes_map(&mut body, &self.custom_payload)?;
        }

        let mut writer = BodyWriter {
            buf: &mut body,
            version: self.version,
        };
        match &self.message {
            RequestMessage::Query(query) => writer.query(query)?,
            RequestMessage::Execute(execute) => writer.execute(execute)?,
            RequestMessage::Batch(batch) => writer.batch(batch)?,
        }

        let length = u32::try_from(body.len()).map_err(|_| FrameError::TooLong {
            kind: "frame body",
            len: body.len(),
        })?;
        let mut frame = BytesMut::with_capacity(HEADER_SIZE + body.len());
        frame.put_u8(self.version.code());
        frame.put_u8(flags);
        frame.put_i16(self.stream_id);
        frame.put_u8(self.message.opcode());
        frame.put_u32(length);
        frame.put_slice(&body);

        trace!(
            "encoded frame: opcode 0x{:02x}, stream {}, {} bytes",
            self.message.opcode(),
            self.stream_id,
            frame.len()
        );
        Ok(frame.freeze())
    }
}

fn write_string(buf: &mut BytesMut, s: &str) -> Result<(), FrameError> {
    let len = u16::try_from(s.len()).map_err(|_| FrameError::TooLong {
        kind: "string",
        len: s.len(),
    })?;
    buf.put_u16(len);
    buf.put_slice(s.as_bytes());
    Ok(())
}

fn write_long_string(buf: &mut BytesMut, s: &str) -> Result<(), FrameError> {
    let len = i32::try_from(s.len()).map_err(|_| FrameError::TooLong {
        kind: "long string",
        len: s.len(),
    })?;
    buf.put_i32(len);
    buf.put_slice(s.as_bytes());
    Ok(())
}

fn write_short_bytes(buf: &mut BytesMut, b: &[u8]) -> Result<(), FrameError> {
    let len = u16::try_from(b.len()).map_err(|_| FrameError::TooLong {
        kind: "short bytes",
        len: b.len(),
    })?;
    buf.put_u16(len);
    buf.put_slice(b);
    Ok(())
}

fn write_bytes(buf: &mut BytesMut, b: &[u8]) -> Result<(), FrameError> {
    let len = i32::try_from(b.len()).map_err(|_| FrameError::TooLong {
        kind: "bytes",
        len: b.len(),
    })?;
    buf.put_i32(len);
    buf.put_slice(b);
    Ok(())
}

fn write_bytes_map(buf: &mut BytesMut, map: &BTreeMap<String, Bytes>) -> Result<(), FrameError> {
    write_count(buf, map.len(), "bytes map")?;
    for (k, v) in map {
        write_string(buf, k)?;
        write_bytes(buf, v)?;
    }
    Ok(())
}

fn write_count(buf: &mut BytesMut, count: usize, kind: &'static str) -> Result<(), FrameError> {
    let count = u16::try_from(count).map_err(|_| FrameError::TooLong { kind, len: count })?;
    buf.put_u16(count);
    Ok(())
}

struct BodyWriter<'a> {
    buf: &'a mut BytesMut,
    version: ProtocolVersion,
}

impl BodyWriter<'_> {
    fn query(&mut self, query: &Query) -> Result<(), FrameError> {
        write_long_string(self.buf, &query.query)?;
        self.options(&query.options)
    }

    fn execute(&mut self, execute: &Execute) -> Result<(), FrameError> {
        write_short_bytes(self.buf, &execute.id)?;
        if self.version >= ProtocolVersion::V5 {
            let id = execute.result_metadata_id.as_deref().unwrap_or_default();
            write_short_bytes(self.buf, id)?;
        }
        self.options(&execute.options)
    }

    fn batch(&mut self, batch: &Batch) -> Result<(), FrameError> {
        self.buf.put_u8(batch.batch_type);
        write_count(self.buf, batch.queries_or_ids.len(), "batch")?;
        for (query_or_id, values) in batch.queries_or_ids.iter().zip(&batch.values) {
            match query_or_id {
                QueryOrId::Query(query) => {
                    self.buf.put_u8(0);
                    write_long_string(self.buf, query)?;
                }
                QueryOrId::Id(id) => {
                    self.buf.put_u8(1);
                    write_short_bytes(self.buf, id)?;
                }
            }
            write_count(self.buf, values.len(), "values")?;
            for value in values {
                self.value(value)?;
            }
        }
        self.buf.put_u16(batch.consistency);

        let flags = batch.flags();
        self.flags(flags)?;
        if flags & query_flag::SERIAL_CONSISTENCY != 0 {
            self.buf.put_u16(batch.serial_consistency);
        }
        if flags & query_flag::DEFAULT_TIMESTAMP != 0 {
            self.buf.put_i64(batch.default_timestamp);
        }
        if let Some(keyspace) = &batch.keyspace {
            write_string(self.buf, keyspace)?;
        }
        Ok(())
    }

    fn options(&mut self, options: &QueryOptions) -> Result<(), FrameError> {
        self.buf.put_u16(options.consistency);

        let flags = options.flags();
        self.flags(flags)?;
        if flags & query_flag::VALUES != 0 {
            match &options.values {
                Values::Positional(values) => {
                    write_count(self.buf, values.len(), "values")?;
                    for value in values {
                        self.value(value)?;
                    }
                }
                Values::Named(values) => {
                    write_count(self.buf, values.len(), "values")?;
                    for (name, value) in values {
                        write_string(self.buf, name)?;
                        self.value(value)?;
                    }
                }
                Values::Empty => {}
            }
        }
        if flags & query_flag::PAGE_SIZE != 0 {
            self.buf.put_i32(options.page_size);
        }
        if let Some(paging_state) = &options.paging_state {
            write_bytes(self.buf, paging_state)?;
        }
        if flags & query_flag::SERIAL_CONSISTENCY != 0 {
            self.buf.put_u16(options.serial_consistency);
        }
        if flags & query_flag::DEFAULT_TIMESTAMP != 0 {
            self.buf.put_i64(options.default_timestamp);
        }
        if let Some(keyspace) = &options.keyspace {
            write_string(self.buf, keyspace)?;
        }
        Ok(())
    }

    fn flags(&mut self, flags: u32) -> Result<(), FrameError> {
        if self.version >= ProtocolVersion::V5 {
            self.buf.put_u32(flags);
        } else if flags & query_flag::WITH_KEYSPACE != 0 {
            let feature = "per-request keyspace";
            return Err(FrameError::Unsupported(feature, self.version));
        } else {
            // Remaining flags all fit in the low byte.
            self.buf.put_u8(flags as u8);
        }
        Ok(())
    }

    fn value(&mut self, value: &RawValue) -> Result<(), FrameError> {
        match value {
            RawValue::Bytes(b) => write_bytes(self.buf, b)?,
            RawValue::Null => self.buf.put_i32(-1),
            RawValue::Unset if self.version >= ProtocolVersion::V4 => self.buf.put_i32(-2),
            RawValue::Unset => return Err(FrameError::Unsupported("unset values", self.version)),
        }
        Ok(())
    }
}
