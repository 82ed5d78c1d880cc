//! Native wire protocol messages.
//!
//! This module defines the protocol-level representation of the requests the driver sends
//! and of the responses it receives, along with the protocol versions the driver speaks and
//! the features each version advertises.
//!
//! # Overview
//!
//! The marshalling core never talks to the network. It produces [`RequestMessage`] values
//! from user statements and consumes [`ResultMessage`] / [`ErrorMessage`] values decoded by
//! the transport. The [`frame`] module knows how to lay a request out on the wire, which is
//! what request size estimates are checked against.
//!
//! # Binary Format
//!
//! - Every frame starts with a fixed 9 byte header: version, flags, stream id, opcode and
//!   body length.
//! - An optional custom payload (a string to bytes map) precedes the body when the
//!   `CUSTOM_PAYLOAD` header flag is set.
//! - All integers are big-endian.
//!
//! # Versioning
//!
//! Capabilities differ between versions, see [`ProtocolFeature`]. Callers ask a
//! [`ProtocolVersionRegistry`] instead of comparing version numbers directly.
//!
//! # See Also
//!
//! - [`conversions`](crate::conversions): statement and response translation.
use std::{fmt, str::FromStr};

use thiserror::Error;

pub mod frame;
pub mod request;
pub mod response;

pub use request::{Batch, Execute, Query, QueryOptions, QueryOrId, RawValue, RequestMessage, Values};
pub use response::{
    ColumnSpec, ErrorDetails, ErrorMessage, Prepared, RawType, ResultMessage, Rows, RowsMetadata,
    SchemaChange,
};

/// Default timestamp value meaning "no client-side timestamp".
pub const UNSET_TIMESTAMP: i64 = i64::MIN;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("unsupported protocol version '{0}'")]
pub struct UnsupportedVersion(pub String);

/// Versions of the native protocol understood by the driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ProtocolVersion {
    V3,
    V4,
    V5,
}

impl ProtocolVersion {
    pub const ALL: [Self; 3] = [Self::V3, Self::V4, Self::V5];

    pub fn code(self) -> u8 {
        match self {
            ProtocolVersion::V3 => 3,
            ProtocolVersion::V4 => 4,
            ProtocolVersion::V5 => 5,
        }
    }
}

impl fmt::Display for ProtocolVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "V{}", self.code())
    }
}

impl TryFrom<u8> for ProtocolVersion {
    type Error = UnsupportedVersion;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            3 => Ok(ProtocolVersion::V3),
            4 => Ok(ProtocolVersion::V4),
            5 => Ok(ProtocolVersion::V5),
            other => Err(UnsupportedVersion(other.to_string())),
        }
    }
}

impl FromStr for ProtocolVersion {
    type Err = UnsupportedVersion;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let digits = s.trim().trim_start_matches(['v', 'V']);
        digits
            .parse::<u8>()
            .ok()
            .and_then(|code| ProtocolVersion::try_from(code).ok())
            .ok_or_else(|| UnsupportedVersion(s.to_string()))
    }
}

/// Capabilities that only some protocol versions advertise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProtocolFeature {
    /// Bound values may be left unset instead of being bound to null.
    UnsetBoundValues,
    /// A query or batch may name the keyspace it runs against.
    PerRequestKeyspace,
    /// Frames may carry a custom key/value payload.
    CustomPayload,
}

/// Answers which features a protocol version supports.
pub trait ProtocolVersionRegistry: Send + Sync {
    fn supports(&self, version: ProtocolVersion, feature: ProtocolFeature) -> bool;
}

/// Feature table of the open-source protocol versions.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultProtocolVersionRegistry;

impl ProtocolVersionRegistry for DefaultProtocolVersionRegistry {
    fn supports(&self, version: ProtocolVersion, feature: ProtocolFeature) -> bool {
        match feature {
            ProtocolFeature::UnsetBoundValues | ProtocolFeature::CustomPayload => {
                version >= ProtocolVersion::V4
            }
            ProtocolFeature::PerRequestKeyspace => version >= ProtocolVersion::V5,
        }
    }
}

/// Protocol constants.
pub mod constants {
    pub mod opcode {
        pub const QUERY: u8 = 0x07;
        pub const EXECUTE: u8 = 0x0A;
        pub const BATCH: u8 = 0x0D;
    }

    pub mod header_flag {
        pub const TRACING: u8 = 0x02;
        pub const CUSTOM_PAYLOAD: u8 = 0x04;
    }

    pub mod query_flag {
        pub const VALUES: u32 = 0x01;
        pub const SKIP_METADATA: u32 = 0x02;
        pub const PAGE_SIZE: u32 = 0x04;
        pub const PAGING_STATE: u32 = 0x08;
        pub const SERIAL_CONSISTENCY: u32 = 0x10;
        pub const DEFAULT_TIMESTAMP: u32 = 0x20;
        pub const VALUE_NAMES: u32 = 0x40;
        pub const WITH_KEYSPACE: u32 = 0x80;
    }

    pub mod consistency {
        pub const ANY: u16 = 0x0000;
        pub const ONE: u16 = 0x0001;
        pub const TWO: u16 = 0x0002;
        pub const THREE: u16 = 0x0003;
        pub const QUORUM: u16 = 0x0004;
        pub const ALL: u16 = 0x0005;
        pub const LOCAL_QUORUM: u16 = 0x0006;
        pub const EACH_QUORUM: u16 = 0x0007;
        pub const SERIAL: u16 = 0x0008;
        pub const LOCAL_SERIAL: u16 = 0x0009;
        pub const LOCAL_ONE: u16 = 0x000A;
    }

    pub mod batch_type {
        pub const LOGGED: u8 = 0x00;
        pub const UNLOGGED: u8 = 0x01;
        pub const COUNTER: u8 = 0x02;
    }

    pub mod error_code {
        pub const SERVER_ERROR: i32 = 0x0000;
        pub const PROTOCOL_ERROR: i32 = 0x000A;
        pub const AUTH_ERROR: i32 = 0x0100;
        pub const UNAVAILABLE: i32 = 0x1000;
        pub const OVERLOADED: i32 = 0x1001;
        pub const IS_BOOTSTRAPPING: i32 = 0x1002;
        pub const TRUNCATE_ERROR: i32 = 0x1003;
        pub const WRITE_TIMEOUT: i32 = 0x1100;
        pub const READ_TIMEOUT: i32 = 0x1200;
        pub const READ_FAILURE: i32 = 0x1300;
        pub const FUNCTION_FAILURE: i32 = 0x1400;
        pub const WRITE_FAILURE: i32 = 0x1500;
        pub const SYNTAX_ERROR: i32 = 0x2000;
        pub const UNAUTHORIZED: i32 = 0x2100;
        pub const INVALID: i32 = 0x2200;
        pub const CONFIG_ERROR: i32 = 0x2300;
        pub const ALREADY_EXISTS: i32 = 0x2400;
        pub const UNPREPARED: i32 = 0x2500;
    }
}
