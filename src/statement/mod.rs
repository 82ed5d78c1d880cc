//! User-facing statements.
//!
//! A [`Statement`] is one of three closed shapes: a [`SimpleStatement`] carrying query
//! text, a [`BoundStatement`] carrying values for a [`PreparedStatement`], or a
//! [`BatchStatement`] grouping several of the former two. Statements are plain values;
//! turning them into requests is the job of [`conversions`](crate::conversions).
use std::collections::BTreeMap;

use bytes::Bytes;

use crate::{
    codec::Value,
    protocol::{UNSET_TIMESTAMP, constants::batch_type},
};

mod bound;
mod prepared;

pub use bound::BoundStatement;
pub use prepared::{BoundStatementDefaults, PrepareRequest, PreparedStatement, ResultMetadata};

/// Attributes shared by every kind of request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestAttributes {
    /// Keyspace the request runs against, when it overrides the session's.
    pub keyspace: Option<String>,
    /// Client-side timestamp in microseconds, [`UNSET_TIMESTAMP`] if none.
    pub timestamp: i64,
    pub paging_state: Option<Bytes>,
    pub custom_payload: BTreeMap<String, Bytes>,
    pub idempotent: Option<bool>,
    /// Configuration profile to run with; the default profile if `None`.
    pub config_profile_name: Option<String>,
}

impl Default for RequestAttributes {
    fn default() -> Self {
        Self {
            keyspace: None,
            timestamp: UNSET_TIMESTAMP,
            paging_state: None,
            custom_payload: BTreeMap::new(),
            idempotent: None,
            config_profile_name: None,
        }
    }
}

/// Anything that can be sent to a coordinator.
pub trait Request: Sized {
    fn attributes(&self) -> &RequestAttributes;

    fn attributes_mut(&mut self) -> &mut RequestAttributes;

    fn with_keyspace(mut self, keyspace: impl Into<String>) -> Self {
        self.attributes_mut().keyspace = Some(keyspace.into());
        self
    }

    fn with_timestamp(mut self, timestamp: i64) -> Self {
        self.attributes_mut().timestamp = timestamp;
        self
    }

    fn with_paging_state(mut self, paging_state: Bytes) -> Self {
        self.attributes_mut().paging_state = Some(paging_state);
        self
    }

    fn with_custom_payload(mut self, key: impl Into<String>, value: Bytes) -> Self {
        self.attributes_mut()
            .custom_payload
            .insert(key.into(), value);
        self
    }

    fn with_idempotence(mut self, idempotent: bool) -> Self {
        self.attributes_mut().idempotent = Some(idempotent);
        self
    }

    fn with_config_profile_name(mut self, name: impl Into<String>) -> Self {
        self.attributes_mut().config_profile_name = Some(name.into());
        self
    }
}

/// A query string with optional values.
///
/// Values are either positional or named, never both; mixing them is only detected when
/// the statement is translated.
#[derive(Debug, Clone, PartialEq)]
pub struct SimpleStatement {
    query: String,
    positional_values: Vec<Value>,
    named_values: Vec<(String, Value)>,
    attributes: RequestAttributes,
}

impl SimpleStatement {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            positional_values: Vec::new(),
            named_values: Vec::new(),
            attributes: RequestAttributes::default(),
        }
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn with_positional_values(mut self, values: Vec<Value>) -> Self {
        self.positional_values = values;
        self
    }

    pub fn add_positional_value(mut self, value: impl Into<Value>) -> Self {
        self.positional_values.push(value.into());
        self
    }

    /// Sets a named value, replacing any previous value for the same name.
    pub fn with_named_value(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        let name = name.into();
        let value = value.into();
        match self.named_values.iter_mut().find(|(n, _)| *n == name) {
            Some((_, v)) => *v = value,
            None => self.named_values.push((name, value)),
        }
        self
    }

    pub fn positional_values(&self) -> &[Value] {
        &self.positional_values
    }

    pub fn named_values(&self) -> &[(String, Value)] {
        &self.named_values
    }
}

impl Request for SimpleStatement {
    fn attributes(&self) -> &RequestAttributes {
        &self.attributes
    }

    fn attributes_mut(&mut self) -> &mut RequestAttributes {
        &mut self.attributes
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BatchType {
    Logged,
    Unlogged,
    Counter,
}

impl BatchType {
    pub fn protocol_code(self) -> u8 {
        match self {
            BatchType::Logged => batch_type::LOGGED,
            BatchType::Unlogged => batch_type::UNLOGGED,
            BatchType::Counter => batch_type::COUNTER,
        }
    }
}

/// A statement that can be part of a batch.
#[derive(Debug, Clone)]
pub enum BatchableStatement {
    Simple(SimpleStatement),
    Bound(BoundStatement),
}

impl From<SimpleStatement> for BatchableStatement {
    fn from(value: SimpleStatement) -> Self {
        BatchableStatement::Simple(value)
    }
}

impl From<BoundStatement> for BatchableStatement {
    fn from(value: BoundStatement) -> Self {
        BatchableStatement::Bound(value)
    }
}

/// Several statements sent as one request. Children keep their insertion order.
#[derive(Debug, Clone)]
pub struct BatchStatement {
    batch_type: BatchType,
    statements: Vec<BatchableStatement>,
    attributes: RequestAttributes,
}

impl BatchStatement {
    pub fn new(batch_type: BatchType) -> Self {
        Self {
            batch_type,
            statements: Vec::new(),
            attributes: RequestAttributes::default(),
        }
    }

    pub fn batch_type(&self) -> BatchType {
        self.batch_type
    }

    pub fn add_statement(mut self, statement: impl Into<BatchableStatement>) -> Self {
        self.statements.push(statement.into());
        self
    }

    pub fn len(&self) -> usize {
        self.statements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.statements.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, BatchableStatement> {
        self.statements.iter()
    }
}

impl Request for BatchStatement {
    fn attributes(&self) -> &RequestAttributes {
        &self.attributes
    }

    fn attributes_mut(&mut self) -> &mut RequestAttributes {
        &mut self.attributes
    }
}

#[derive(Debug, Clone)]
pub enum Statement {
    Simple(SimpleStatement),
    Bound(BoundStatement),
    Batch(BatchStatement),
}

impl Statement {
    pub fn attributes(&self) -> &RequestAttributes {
        match self {
            Statement::Simple(s) => s.attributes(),
            Statement::Bound(s) => s.attributes(),
            Statement::Batch(s) => s.attributes(),
        }
    }
}

impl From<SimpleStatement> for Statement {
    fn from(value: SimpleStatement) -> Self {
        Statement::Simple(value)
    }
}

impl From<BoundStatement> for Statement {
    fn from(value: BoundStatement) -> Self {
        Statement::Bound(value)
    }
}

impl From<BatchStatement> for Statement {
    fn from(value: BatchStatement) -> Self {
        Statement::Batch(value)
    }
}
