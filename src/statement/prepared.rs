use std::{collections::BTreeMap, fmt, sync::Arc};

use arc_swap::ArcSwap;
use bytes::Bytes;

use crate::{
    codec::{CodecRegistry, Value},
    error::Result,
    metadata::ColumnDefinitions,
    protocol::ProtocolVersion,
};

use super::{BoundStatement, Request, RequestAttributes, SimpleStatement};

/// Result shape of a prepared statement: the id the server knows it by and the columns.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ResultMetadata {
    pub id: Option<Bytes>,
    pub definitions: ColumnDefinitions,
}

/// Attributes copied into every statement bound from a prepared statement.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct BoundStatementDefaults {
    pub config_profile_name: Option<String>,
    pub keyspace: Option<String>,
    pub custom_payload: BTreeMap<String, Bytes>,
    pub idempotent: Option<bool>,
}

/// A request to prepare a query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrepareRequest {
    query: String,
    attributes: RequestAttributes,
    bound_config_profile_name: Option<String>,
    bound_custom_payload: BTreeMap<String, Bytes>,
    bound_idempotent: Option<bool>,
}

impl PrepareRequest {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            attributes: RequestAttributes::default(),
            bound_config_profile_name: None,
            bound_custom_payload: BTreeMap::new(),
            bound_idempotent: None,
        }
    }

    /// Prepares the query of `statement`; the statements bound later inherit its profile,
    /// keyspace, custom payload and idempotence.
    pub fn from_statement(statement: &SimpleStatement) -> Self {
        let source = statement.attributes();
        Self {
            query: statement.query().to_string(),
            attributes: RequestAttributes {
                keyspace: source.keyspace.clone(),
                custom_payload: source.custom_payload.clone(),
                config_profile_name: source.config_profile_name.clone(),
                ..RequestAttributes::default()
            },
            bound_config_profile_name: source.config_profile_name.clone(),
            bound_custom_payload: source.custom_payload.clone(),
            bound_idempotent: source.idempotent,
        }
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn with_bound_config_profile_name(mut self, name: impl Into<String>) -> Self {
        self.bound_config_profile_name = Some(name.into());
        self
    }

    pub fn with_bound_custom_payload(mut self, key: impl Into<String>, value: Bytes) -> Self {
        self.bound_custom_payload.insert(key.into(), value);
        self
    }

    pub fn with_bound_idempotence(mut self, idempotent: bool) -> Self {
        self.bound_idempotent = Some(idempotent);
        self
    }

    pub fn bound_statement_defaults(&self) -> BoundStatementDefaults {
        BoundStatementDefaults {
            config_profile_name: self.bound_config_profile_name.clone(),
            keyspace: self.attributes.keyspace.clone(),
            custom_payload: self.bound_custom_payload.clone(),
            idempotent: self.bound_idempotent,
        }
    }
}

impl Request for PrepareRequest {
    fn attributes(&self) -> &RequestAttributes {
        &self.attributes
    }

    fn attributes_mut(&mut self) -> &mut RequestAttributes {
        &mut self.attributes
    }
}

/// A query the server has parsed, identified by an opaque id.
///
/// Everything is fixed at creation except the result metadata, which is replaced as a
/// whole when the server reports that the result shape changed. Concurrent executions may
/// race to replace it; the last write wins and readers always see a consistent pair.
pub struct PreparedStatement {
    id: Bytes,
    query: String,
    variable_definitions: ColumnDefinitions,
    partition_key_indices: Vec<usize>,
    result_metadata: ArcSwap<ResultMetadata>,
    bound_defaults: BoundStatementDefaults,
    custom_payload: BTreeMap<String, Bytes>,
    codec_registry: Arc<dyn CodecRegistry>,
    protocol_version: ProtocolVersion,
}

impl PreparedStatement {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        id: Bytes,
        query: impl Into<String>,
        variable_definitions: ColumnDefinitions,
        partition_key_indices: Vec<usize>,
        result_metadata: ResultMetadata,
        bound_defaults: BoundStatementDefaults,
        custom_payload: BTreeMap<String, Bytes>,
        codec_registry: Arc<dyn CodecRegistry>,
        protocol_version: ProtocolVersion,
    ) -> Self {
        Self {
            id,
            query: query.into(),
            variable_definitions,
            partition_key_indices,
            result_metadata: ArcSwap::from_pointee(result_metadata),
            bound_defaults,
            custom_payload,
            codec_registry,
            protocol_version,
        }
    }

    pub fn id(&self) -> &Bytes {
        &self.id
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn variable_definitions(&self) -> &ColumnDefinitions {
        &self.variable_definitions
    }

    pub fn partition_key_indices(&self) -> &[usize] {
        &self.partition_key_indices
    }

    /// Snapshot of the current result metadata.
    pub fn result_metadata(&self) -> Arc<ResultMetadata> {
        self.result_metadata.load_full()
    }

    pub fn result_metadata_id(&self) -> Option<Bytes> {
        self.result_metadata.load().id.clone()
    }

    pub fn result_set_definitions(&self) -> ColumnDefinitions {
        self.result_metadata.load().definitions.clone()
    }

    /// Replaces the result metadata with a new id and column set.
    pub fn set_result_metadata(&self, id: Bytes, definitions: ColumnDefinitions) {
        self.result_metadata.store(Arc::new(ResultMetadata {
            id: Some(id),
            definitions,
        }));
    }

    pub fn bound_defaults(&self) -> &BoundStatementDefaults {
        &self.bound_defaults
    }

    /// Custom payload the statement was prepared with.
    pub fn custom_payload(&self) -> &BTreeMap<String, Bytes> {
        &self.custom_payload
    }

    pub fn codec_registry(&self) -> &Arc<dyn CodecRegistry> {
        &self.codec_registry
    }

    pub fn protocol_version(&self) -> ProtocolVersion {
        self.protocol_version
    }

    /// A statement with every bind marker unset.
    pub fn bind_empty(self: &Arc<Self>) -> BoundStatement {
        BoundStatement::new(Arc::clone(self))
    }

    /// Binds `values` to the first bind markers, in order. Remaining markers stay unset.
    pub fn bind(self: &Arc<Self>, values: Vec<Value>) -> Result<BoundStatement> {
        values
            .into_iter()
            .enumerate()
            .try_fold(self.bind_empty(), |bound, (i, value)| bound.set(i, value))
    }
}

impl fmt::Debug for PreparedStatement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PreparedStatement")
            .field("id", &self.id)
            .field("query", &self.query)
            .field("variable_definitions", &self.variable_definitions)
            .field("partition_key_indices", &self.partition_key_indices)
            .field("result_metadata", &self.result_metadata.load())
            .field("protocol_version", &self.protocol_version)
            .finish_non_exhaustive()
    }
}
