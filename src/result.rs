//! Results handed back to the caller.
use std::{collections::VecDeque, sync::Arc};

use bytes::Bytes;

use crate::{
    codec::{CodecRegistry, Value},
    context::DriverContext,
    error::{DriverError, Result},
    metadata::{ColumnDefinitions, Node},
    protocol::ProtocolVersion,
    statement::Statement,
};

/// Information about how a request was executed.
#[derive(Debug, Clone)]
pub struct ExecutionInfo {
    statement: Statement,
    coordinator: Option<Arc<Node>>,
    paging_state: Option<Bytes>,
    warnings: Vec<String>,
}

impl ExecutionInfo {
    pub fn new(statement: impl Into<Statement>) -> Self {
        Self {
            statement: statement.into(),
            coordinator: None,
            paging_state: None,
            warnings: Vec::new(),
        }
    }

    pub fn with_coordinator(mut self, node: Arc<Node>) -> Self {
        self.coordinator = Some(node);
        self
    }

    pub fn with_paging_state(mut self, paging_state: Option<Bytes>) -> Self {
        self.paging_state = paging_state;
        self
    }

    pub fn with_warnings(mut self, warnings: Vec<String>) -> Self {
        self.warnings = warnings;
        self
    }

    /// The statement that was executed.
    pub fn statement(&self) -> &Statement {
        &self.statement
    }

    pub fn coordinator(&self) -> Option<&Arc<Node>> {
        self.coordinator.as_ref()
    }

    /// Cursor to fetch the next page with, if there is one.
    pub fn paging_state(&self) -> Option<&Bytes> {
        self.paging_state.as_ref()
    }

    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }
}

/// One page of results.
///
/// Rows are handed out in server order through the [`Iterator`] implementation.
pub struct AsyncResultSet {
    column_definitions: ColumnDefinitions,
    execution_info: ExecutionInfo,
    rows: VecDeque<Vec<Option<Bytes>>>,
    codec_registry: Arc<dyn CodecRegistry>,
    protocol_version: ProtocolVersion,
}

impl AsyncResultSet {
    pub fn new(
        column_definitions: ColumnDefinitions,
        execution_info: ExecutionInfo,
        rows: Vec<Vec<Option<Bytes>>>,
        context: &DriverContext,
    ) -> Self {
        Self {
            column_definitions,
            execution_info,
            rows: rows.into(),
            codec_registry: Arc::clone(context.codec_registry()),
            protocol_version: context.protocol_version(),
        }
    }

    /// A result without rows or columns, for requests that only get an acknowledgement.
    pub fn empty(execution_info: ExecutionInfo, context: &DriverContext) -> Self {
        Self::new(
            ColumnDefinitions::default(),
            execution_info,
            Vec::new(),
            context,
        )
    }

    pub fn column_definitions(&self) -> &ColumnDefinitions {
        &self.column_definitions
    }

    pub fn execution_info(&self) -> &ExecutionInfo {
        &self.execution_info
    }

    /// Rows left in this page.
    pub fn remaining(&self) -> usize {
        self.rows.len()
    }

    pub fn has_more_pages(&self) -> bool {
        self.execution_info.paging_state.is_some()
    }

    /// The next row, if any.
    pub fn one(&mut self) -> Option<Row> {
        self.next()
    }
}

impl Iterator for AsyncResultSet {
    type Item = Row;

    fn next(&mut self) -> Option<Row> {
        let data = self.rows.pop_front()?;
        Some(Row {
            definitions: self.column_definitions.clone(),
            data,
            codec_registry: Arc::clone(&self.codec_registry),
            protocol_version: self.protocol_version,
        })
    }
}

pub struct Row {
    definitions: ColumnDefinitions,
    data: Vec<Option<Bytes>>,
    codec_registry: Arc<dyn CodecRegistry>,
    protocol_version: ProtocolVersion,
}

impl Row {
    pub fn column_definitions(&self) -> &ColumnDefinitions {
        &self.definitions
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn is_null(&self, index: usize) -> bool {
        matches!(self.data.get(index), Some(None))
    }

    /// Raw cell bytes, `None` for null or out of range.
    pub fn bytes(&self, index: usize) -> Option<&Bytes> {
        self.data.get(index).and_then(Option::as_ref)
    }

    /// Decodes the cell at `index` with the codec of the column's type.
    pub fn get(&self, index: usize) -> Result<Value> {
        let cell = self.data.get(index).ok_or_else(|| {
            DriverError::InvalidArgument(format!(
                "index {index} out of bounds for {} columns",
                self.data.len()
            ))
        })?;
        let Some(bytes) = cell else {
            return Ok(Value::Null);
        };
        let definition = self.definitions.get(index).ok_or_else(|| {
            DriverError::ProtocolViolation(format!("no column definition for index {index}"))
        })?;
        let codec = self.codec_registry.codec_for_type(&definition.data_type)?;
        Ok(codec.decode(bytes, self.protocol_version)?)
    }

    pub fn get_by_name(&self, name: &str) -> Result<Value> {
        let index = self.definitions.index_of(name).ok_or_else(|| {
            DriverError::InvalidArgument(format!("{name} is not a column in this row"))
        })?;
        self.get(index)
    }
}
