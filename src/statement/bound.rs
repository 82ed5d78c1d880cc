use std::sync::Arc;

use crate::{
    codec::Value,
    conversions::values,
    error::{DriverError, Result},
    protocol::RawValue,
};

use super::{PreparedStatement, Request, RequestAttributes};

/// Values for the bind markers of a prepared statement.
///
/// Every marker starts out unset. Unset is not null: a marker is only null once it has
/// been explicitly set to null. Values are encoded as they are set, with the codec of the
/// marker's declared type.
#[derive(Debug, Clone)]
pub struct BoundStatement {
    prepared: Arc<PreparedStatement>,
    values: Vec<RawValue>,
    attributes: RequestAttributes,
}

impl BoundStatement {
    pub fn new(prepared: Arc<PreparedStatement>) -> Self {
        let defaults = prepared.bound_defaults();
        let attributes = RequestAttributes {
            keyspace: defaults.keyspace.clone(),
            custom_payload: defaults.custom_payload.clone(),
            idempotent: defaults.idempotent,
            config_profile_name: defaults.config_profile_name.clone(),
            ..RequestAttributes::default()
        };
        let values = vec![RawValue::Unset; prepared.variable_definitions().len()];
        Self {
            prepared,
            values,
            attributes,
        }
    }

    pub fn prepared(&self) -> &Arc<PreparedStatement> {
        &self.prepared
    }

    /// Number of bind markers.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn values(&self) -> &[RawValue] {
        &self.values
    }

    pub fn is_set(&self, index: usize) -> bool {
        self.values.get(index).is_some_and(|v| !v.is_unset())
    }

    pub fn set(self, index: usize, value: impl Into<Value>) -> Result<Self> {
        self.check_index(index)?;
        let value = value.into();
        let data_type = &self.prepared.variable_definitions()[index].data_type;
        let raw = values::encode_for_type(
            &value,
            data_type,
            self.prepared.codec_registry().as_ref(),
            self.prepared.protocol_version(),
        )?;
        self.set_raw(index, raw)
    }

    /// Sets every marker named `name`.
    pub fn set_by_name(mut self, name: &str, value: impl Into<Value>) -> Result<Self> {
        let value = value.into();
        let indices: Vec<usize> = self
            .prepared
            .variable_definitions()
            .iter()
            .enumerate()
            .filter(|(_, c)| c.name == name)
            .map(|(i, _)| i)
            .collect();
        if indices.is_empty() {
            return Err(DriverError::InvalidArgument(format!(
                "{name} is not a variable in this bound statement"
            )));
        }
        for index in indices {
            self = self.set(index, value.clone())?;
        }
        Ok(self)
    }

    pub fn set_null(self, index: usize) -> Result<Self> {
        self.set_raw(index, RawValue::Null)
    }

    pub fn unset(self, index: usize) -> Result<Self> {
        self.set_raw(index, RawValue::Unset)
    }

    /// Sets an already encoded value.
    pub fn set_raw(mut self, index: usize, value: RawValue) -> Result<Self> {
        self.check_index(index)?;
        self.values[index] = value;
        Ok(self)
    }

    fn check_index(&self, index: usize) -> Result<()> {
        if index >= self.values.len() {
            return Err(DriverError::InvalidArgument(format!(
                "index {index} out of bounds for {} bind markers",
                self.values.len()
            )));
        }
        Ok(())
    }
}

impl Request for BoundStatement {
    fn attributes(&self) -> &RequestAttributes {
        &self.attributes
    }

    fn attributes_mut(&mut self) -> &mut RequestAttributes {
        &mut self.attributes
    }
}
