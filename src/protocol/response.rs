use std::{collections::BTreeMap, net::IpAddr};

use bytes::Bytes;

/// Column type exactly as the server describes it in result metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawType {
    /// Native type, identified by its protocol option id.
    Primitive(u16),
    Custom(String),
    List(Box<RawType>),
    Set(Box<RawType>),
    Map(Box<RawType>, Box<RawType>),
    Udt {
        keyspace: String,
        type_name: String,
        fields: Vec<(String, RawType)>,
    },
    Tuple(Vec<RawType>),
}

/// Protocol option ids of the native types.
pub mod type_id {
    pub const ASCII: u16 = 0x0001;
    pub const BIGINT: u16 = 0x0002;
    pub const BLOB: u16 = 0x0003;
    pub const BOOLEAN: u16 = 0x0004;
    pub const COUNTER: u16 = 0x0005;
    pub const DECIMAL: u16 = 0x0006;
    pub const DOUBLE: u16 = 0x0007;
    pub const FLOAT: u16 = 0x0008;
    pub const INT: u16 = 0x0009;
    pub const TIMESTAMP: u16 = 0x000B;
    pub const UUID: u16 = 0x000C;
    pub const VARCHAR: u16 = 0x000D;
    pub const VARINT: u16 = 0x000E;
    pub const TIMEUUID: u16 = 0x000F;
    pub const INET: u16 = 0x0010;
    pub const DATE: u16 = 0x0011;
    pub const TIME: u16 = 0x0012;
    pub const SMALLINT: u16 = 0x0013;
    pub const TINYINT: u16 = 0x0014;
    pub const DURATION: u16 = 0x0015;
}

/// One column of a rows or prepared response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnSpec {
    pub keyspace: String,
    pub table: String,
    pub name: String,
    pub index: usize,
    pub raw_type: RawType,
}

/// Metadata block of a rows result, or of either half of a prepared result.
///
/// `column_specs` is empty when the request asked the server to skip metadata; the
/// column count is still sent.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RowsMetadata {
    pub column_specs: Vec<ColumnSpec>,
    pub column_count: usize,
    pub paging_state: Option<Bytes>,
    /// Only present in the bind-marker metadata of a prepared result.
    pub pk_indices: Vec<u16>,
    /// Set when the result shape changed since the statement was prepared.
    pub new_result_metadata_id: Option<Bytes>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rows {
    pub metadata: RowsMetadata,
    /// Row payload: one cell per column, `None` for null.
    pub data: Vec<Vec<Option<Bytes>>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prepared {
    pub prepared_query_id: Bytes,
    pub result_metadata_id: Option<Bytes>,
    pub variables_metadata: RowsMetadata,
    pub result_metadata: RowsMetadata,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaChange {
    pub change_type: String,
    pub target: String,
    pub keyspace: String,
    pub object: Option<String>,
}

/// RESULT responses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResultMessage {
    Void,
    Rows(Rows),
    SetKeyspace(String),
    Prepared(Prepared),
    SchemaChange(SchemaChange),
}

/// Code-specific fields of an ERROR response.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ErrorDetails {
    #[default]
    None,
    Unavailable {
        consistency: u16,
        required: i32,
        alive: i32,
    },
    WriteTimeout {
        consistency: u16,
        received: i32,
        block_for: i32,
        write_type: String,
    },
    ReadTimeout {
        consistency: u16,
        received: i32,
        block_for: i32,
        data_present: bool,
    },
    ReadFailure {
        consistency: u16,
        received: i32,
        block_for: i32,
        num_failures: i32,
        reason_map: BTreeMap<IpAddr, u16>,
        data_present: bool,
    },
    WriteFailure {
        consistency: u16,
        received: i32,
        block_for: i32,
        num_failures: i32,
        reason_map: BTreeMap<IpAddr, u16>,
        write_type: String,
    },
    AlreadyExists {
        keyspace: String,
        table: String,
    },
    Unprepared {
        id: Bytes,
    },
}

/// ERROR response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorMessage {
    pub code: i32,
    pub message: String,
    pub details: ErrorDetails,
}

impl ErrorMessage {
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            details: ErrorDetails::None,
        }
    }

    pub fn with_details(mut self, details: ErrorDetails) -> Self {
        self.details = details;
        self
    }
}
