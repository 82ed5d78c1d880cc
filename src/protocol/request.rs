use bytes::Bytes;

use super::{
    UNSET_TIMESTAMP,
    constants::{consistency, opcode, query_flag},
};

/// A single encoded value as it travels on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum RawValue {
    /// Explicit null.
    Null,
    /// Left unset: the server keeps whatever it has for this column.
    Unset,
    Bytes(Bytes),
}

impl RawValue {
    pub fn is_unset(&self) -> bool {
        matches!(self, RawValue::Unset)
    }
}

impl From<Bytes> for RawValue {
    fn from(value: Bytes) -> Self {
        RawValue::Bytes(value)
    }
}

impl From<Option<Bytes>> for RawValue {
    fn from(value: Option<Bytes>) -> Self {
        value.map_or(RawValue::Null, RawValue::Bytes)
    }
}

/// Values attached to a query or execute request.
///
/// `Empty` is the "no values" marker: no values block is written and the `VALUES` flag is
/// left clear. Positional and named values can never be mixed in one request.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Values {
    #[default]
    Empty,
    Positional(Vec<RawValue>),
    Named(Vec<(String, RawValue)>),
}

impl Values {
    pub fn is_empty(&self) -> bool {
        match self {
            Values::Empty => true,
            Values::Positional(values) => values.is_empty(),
            Values::Named(values) => values.is_empty(),
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Values::Empty => 0,
            Values::Positional(values) => values.len(),
            Values::Named(values) => values.len(),
        }
    }
}

/// Options shared by query and execute requests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryOptions {
    pub consistency: u16,
    pub values: Values,
    pub skip_metadata: bool,
    /// Non-positive means "no paging".
    pub page_size: i32,
    pub paging_state: Option<Bytes>,
    pub serial_consistency: u16,
    /// [`UNSET_TIMESTAMP`] means "let the server assign it".
    pub default_timestamp: i64,
    pub keyspace: Option<String>,
}

impl Default for QueryOptions {
    fn default() -> Self {
        Self {
            consistency: consistency::ONE,
            values: Values::Empty,
            skip_metadata: false,
            page_size: -1,
            paging_state: None,
            serial_consistency: consistency::SERIAL,
            default_timestamp: UNSET_TIMESTAMP,
            keyspace: None,
        }
    }
}

impl QueryOptions {
    /// Flags describing which optional fields follow on the wire.
    pub fn flags(&self) -> u32 {
        let mut flags = 0;
        match &self.values {
            Values::Positional(values) if !values.is_empty() => flags |= query_flag::VALUES,
            Values::Named(values) if !values.is_empty() => {
                flags |= query_flag::VALUES | query_flag::VALUE_NAMES
            }
            _ => {}
        }
        if self.skip_metadata {
            flags |= query_flag::SKIP_METADATA;
        }
        if self.page_size > 0 {
            flags |= query_flag::PAGE_SIZE;
        }
        if self.paging_state.is_some() {
            flags |= query_flag::PAGING_STATE;
        }
        if self.serial_consistency != consistency::SERIAL {
            flags |= query_flag::SERIAL_CONSISTENCY;
        }
        if self.default_timestamp != UNSET_TIMESTAMP {
            flags |= query_flag::DEFAULT_TIMESTAMP;
        }
        if self.keyspace.is_some() {
            flags |= query_flag::WITH_KEYSPACE;
        }
        flags
    }
}

/// QUERY: run a query string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query {
    pub query: String,
    pub options: QueryOptions,
}

/// EXECUTE: run a previously prepared statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Execute {
    pub id: Bytes,
    /// Result shape the client already knows; only sent from protocol V5 on.
    pub result_metadata_id: Option<Bytes>,
    pub options: QueryOptions,
}

/// Child of a batch: either a query string or a prepared statement id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryOrId {
    Query(String),
    Id(Bytes),
}

/// BATCH: run several statements as one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Batch {
    pub batch_type: u8,
    pub queries_or_ids: Vec<QueryOrId>,
    /// One value list per child, in child order.
    pub values: Vec<Vec<RawValue>>,
    pub consistency: u16,
    pub serial_consistency: u16,
    pub default_timestamp: i64,
    pub keyspace: Option<String>,
}

impl Batch {
    pub fn flags(&self) -> u32 {
        let mut flags = 0;
        if self.serial_consistency != consistency::SERIAL {
            flags |= query_flag::SERIAL_CONSISTENCY;
        }
        if self.default_timestamp != UNSET_TIMESTAMP {
            flags |= query_flag::DEFAULT_TIMESTAMP;
        }
        if self.keyspace.is_some() {
            flags |= query_flag::WITH_KEYSPACE;
        }
        flags
    }
}

/// Requests produced by statement translation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestMessage {
    Query(Query),
    Execute(Execute),
    Batch(Batch),
}

impl RequestMessage {
    pub fn opcode(&self) -> u8 {
        match self {
            RequestMessage::Query(_) => opcode::QUERY,
            RequestMessage::Execute(_) => opcode::EXECUTE,
            RequestMessage::Batch(_) => opcode::BATCH,
        }
    }
}
