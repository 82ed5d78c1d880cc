//! Response to result translation.
use log::debug;

use crate::{
    context::DriverContext,
    error::{DriverError, Result},
    metadata::{ColumnDefinition, ColumnDefinitions, DataType},
    protocol::{
        Prepared, RawType, ResultMessage, Rows,
        response::{RowsMetadata, type_id},
    },
    result::{AsyncResultSet, ExecutionInfo},
    statement::{PrepareRequest, PreparedStatement, Request, ResultMetadata, Statement},
};

/// Turns the result of a query, execute or batch into a result set.
///
/// A PREPARED result is never a valid answer to these requests and is reported as a
/// protocol violation.
pub fn to_result_set(
    result: ResultMessage,
    execution_info: ExecutionInfo,
    context: &DriverContext,
) -> Result<AsyncResultSet> {
    match result {
        ResultMessage::Rows(Rows { metadata, data }) => {
            let definitions = result_definitions(&metadata, execution_info.statement(), context)?;
            let execution_info = execution_info.with_paging_state(metadata.paging_state);
            let result_set = AsyncResultSet::new(definitions, execution_info, data, context);
            Ok(result_set)
        }
        ResultMessage::Prepared(_) => Err(DriverError::ProtocolViolation(
            "Unexpected PREPARED response to a CQL query".to_string(),
        )),
        ResultMessage::Void | ResultMessage::SetKeyspace(_) | ResultMessage::SchemaChange(_) => {
            Ok(AsyncResultSet::empty(execution_info, context))
        }
    }
}

/// Column definitions of a rows result.
///
/// A result without column specs means the request skipped metadata, which only bound
/// statements do; the prepared statement's copy is used. Otherwise the specs in the result
/// win, and a new result metadata id replaces the prepared statement's copy.
pub fn result_definitions(
    metadata: &RowsMetadata,
    statement: &Statement,
    context: &DriverContext,
) -> Result<ColumnDefinitions> {
    if metadata.column_specs.is_empty() {
        return match statement {
            Statement::Bound(bound) => Ok(bound.prepared().result_set_definitions()),
            _ => Err(DriverError::ProtocolViolation(
                "rows without metadata for a statement that did not skip it".to_string(),
            )),
        };
    }

    let definitions = to_column_definitions(metadata, context)?;
    if let Some(id) = &metadata.new_result_metadata_id {
        match statement {
            Statement::Bound(bound) => {
                debug!(
                    "result metadata of prepared statement {:02x?} changed, refreshing",
                    bound.prepared().id().as_ref()
                );
                bound
                    .prepared()
                    .set_result_metadata(id.clone(), definitions.clone());
            }
            _ => {
                return Err(DriverError::ProtocolViolation(
                    "new result metadata id for a statement that was not prepared".to_string(),
                ));
            }
        }
    }
    Ok(definitions)
}

/// Builds the prepared statement described by a PREPARED result.
pub fn to_prepared_statement(
    response: Prepared,
    request: &PrepareRequest,
    context: &DriverContext,
) -> Result<PreparedStatement> {
    let variable_definitions = to_column_definitions(&response.variables_metadata, context)?;
    let result_definitions = to_column_definitions(&response.result_metadata, context)?;
    let partition_key_indices = response
        .variables_metadata
        .pk_indices
        .iter()
        .map(|&i| usize::from(i))
        .collect();

    Ok(PreparedStatement::new(
        response.prepared_query_id,
        request.query(),
        variable_definitions,
        partition_key_indices,
        ResultMetadata {
            id: response.result_metadata_id,
            definitions: result_definitions,
        },
        request.bound_statement_defaults(),
        request.attributes().custom_payload.clone(),
        context.codec_registry().clone(),
        context.protocol_version(),
    ))
}

/// Column definitions in declaration order.
pub fn to_column_definitions(
    metadata: &RowsMetadata,
    _context: &DriverContext,
) -> Result<ColumnDefinitions> {
    let definitions = metadata
        .column_specs
        .iter()
        .map(|spec| {
            Ok(ColumnDefinition {
                keyspace: spec.keyspace.clone(),
                table: spec.table.clone(),
                name: spec.name.clone(),
                data_type: to_data_type(&spec.raw_type)?,
            })
        })
        .collect::<Result<Vec<_>>>()?;
    Ok(ColumnDefinitions::new(definitions))
}

fn to_data_type(raw: &RawType) -> Result<DataType> {
    let data_type = match raw {
        RawType::Primitive(id) => match *id {
            type_id::ASCII => DataType::Ascii,
            type_id::BIGINT => DataType::BigInt,
            type_id::BLOB => DataType::Blob,
            type_id::BOOLEAN => DataType::Boolean,
            type_id::COUNTER => DataType::Counter,
            type_id::DECIMAL => DataType::Decimal,
            type_id::DOUBLE => DataType::Double,
            type_id::FLOAT => DataType::Float,
            type_id::INT => DataType::Int,
            type_id::TIMESTAMP => DataType::Timestamp,
            type_id::UUID => DataType::Uuid,
            type_id::VARCHAR => DataType::Text,
            type_id::VARINT => DataType::Varint,
            type_id::TIMEUUID => DataType::Timeuuid,
            type_id::INET => DataType::Inet,
            type_id::DATE => DataType::Date,
            type_id::TIME => DataType::Time,
            type_id::SMALLINT => DataType::SmallInt,
            type_id::TINYINT => DataType::TinyInt,
            type_id::DURATION => DataType::Duration,
            other => {
                return Err(DriverError::ProtocolViolation(format!(
                    "unknown type id 0x{other:04x} in column metadata"
                )));
            }
        },
        RawType::Custom(class) => DataType::Custom(class.clone()),
        RawType::List(element) => DataType::List(Box::new(to_data_type(element)?)),
        RawType::Set(element) => DataType::Set(Box::new(to_data_type(element)?)),
        RawType::Map(key, value) => {
            DataType::Map(Box::new(to_data_type(key)?), Box::new(to_data_type(value)?))
        }
        RawType::Udt {
            keyspace,
            type_name,
            fields,
        } => DataType::Udt {
            keyspace: keyspace.clone(),
            name: type_name.clone(),
            fields: fields
                .iter()
                .map(|(name, field)| Ok((name.clone(), to_data_type(field)?)))
                .collect::<Result<Vec<_>>>()?,
        },
        RawType::Tuple(elements) => DataType::Tuple(
            elements
                .iter()
                .map(to_data_type)
                .collect::<Result<Vec<_>>>()?,
        ),
    };
    Ok(data_type)
}

#[cfg(test)]
mod tests {
    use std::{collections::BTreeMap, sync::Arc, thread};

    use bytes::Bytes;

    use crate::{
        codec::{DefaultCodecRegistry, Value},
        protocol::{ColumnSpec, ProtocolVersion, SchemaChange},
        statement::{BoundStatementDefaults, SimpleStatement},
    };

    use super::*;

    fn spec(name: &str, index: usize, raw_type: RawType) -> ColumnSpec {
        ColumnSpec {
            keyspace: "ks".into(),
            table: "t".into(),
            name: name.into(),
            index,
            raw_type,
        }
    }

    fn metadata(specs: Vec<ColumnSpec>) -> RowsMetadata {
        RowsMetadata {
            column_count: specs.len(),
            column_specs: specs,
            ..Default::default()
        }
    }

    fn prepared(result: ResultMetadata) -> Arc<PreparedStatement> {
        Arc::new(PreparedStatement::new(
            Bytes::from_static(&[7]),
            "SELECT v FROM t",
            ColumnDefinitions::default(),
            vec![],
            result,
            BoundStatementDefaults::default(),
            BTreeMap::new(),
            Arc::new(DefaultCodecRegistry),
            ProtocolVersion::V5,
        ))
    }

    #[test]
    fn rows_with_metadata() {
        let context = DriverContext::new(ProtocolVersion::V4);
        let rows = Rows {
            metadata: RowsMetadata {
                paging_state: Some(Bytes::from_static(b"p")),
                ..metadata(vec![spec("v", 0, RawType::Primitive(type_id::VARCHAR))])
            },
            data: vec![vec![Some(Bytes::from_static(b"hello"))]],
        };
        let info = ExecutionInfo::new(SimpleStatement::new("SELECT v FROM t"));

        let mut result = to_result_set(ResultMessage::Rows(rows), info, &context).unwrap();
        assert_eq!(result.column_definitions()[0].data_type, DataType::Text);
        assert!(result.has_more_pages());
        assert_eq!(
            result.one().unwrap().get(0).unwrap(),
            Value::Text("hello".into())
        );
    }

    #[test]
    fn acknowledgements_are_empty() {
        let context = DriverContext::new(ProtocolVersion::V4);
        let results = vec![
            ResultMessage::Void,
            ResultMessage::SetKeyspace("ks".into()),
            ResultMessage::SchemaChange(SchemaChange {
                change_type: "CREATED".into(),
                target: "TABLE".into(),
                keyspace: "ks".into(),
                object: Some("t".into()),
            }),
        ];
        for message in results {
            let info = ExecutionInfo::new(SimpleStatement::new("q"));
            let result = to_result_set(message, info, &context).unwrap();
            assert_eq!(result.remaining(), 0);
            assert!(result.column_definitions().is_empty());
        }
    }

    #[test]
    #[should_panic(expected = "ProtocolViolation")]
    fn prepared_result_is_a_violation() {
        let context = DriverContext::new(ProtocolVersion::V4);
        let info = ExecutionInfo::new(SimpleStatement::new("q"));
        let prepared = Prepared {
            prepared_query_id: Bytes::from_static(&[1]),
            result_metadata_id: None,
            variables_metadata: RowsMetadata::default(),
            result_metadata: RowsMetadata::default(),
        };
        to_result_set(ResultMessage::Prepared(prepared), info, &context).unwrap();
    }

    #[test]
    fn skipped_metadata_comes_from_prepared_statement() {
        let context = DriverContext::new(ProtocolVersion::V5);
        let cached = ColumnDefinitions::new(vec![ColumnDefinition {
            keyspace: "ks".into(),
            table: "t".into(),
            name: "v".into(),
            data_type: DataType::Int,
        }]);
        let statement = prepared(ResultMetadata {
            id: Some(Bytes::from_static(b"m1")),
            definitions: cached.clone(),
        });
        let info = ExecutionInfo::new(statement.bind_empty());
        let rows = Rows {
            metadata: RowsMetadata {
                column_count: 1,
                ..Default::default()
            },
            data: vec![],
        };

        let result = to_result_set(ResultMessage::Rows(rows), info, &context).unwrap();
        assert_eq!(result.column_definitions(), &cached);
    }

    #[test]
    fn new_metadata_id_refreshes_prepared_statement() {
        let context = DriverContext::new(ProtocolVersion::V5);
        let statement = prepared(ResultMetadata::default());
        let list = RawType::List(Box::new(RawType::Primitive(type_id::BIGINT)));
        let rows = RowsMetadata {
            new_result_metadata_id: Some(Bytes::from_static(b"m2")),
            ..metadata(vec![
                spec("a", 0, RawType::Primitive(type_id::INT)),
                spec("b", 1, list),
            ])
        };

        let definitions =
            result_definitions(&rows, &Statement::Bound(statement.bind_empty()), &context).unwrap();
        assert_eq!(definitions.len(), 2);
        assert_eq!(
            definitions[1].data_type,
            DataType::List(Box::new(DataType::BigInt))
        );

        let refreshed = statement.result_metadata();
        assert_eq!(refreshed.id.as_deref(), Some(&b"m2"[..]));
        assert_eq!(refreshed.definitions, definitions);
    }

    #[test]
    fn concurrent_refreshes_land_whole() {
        let context = DriverContext::new(ProtocolVersion::V5);
        let statement = prepared(ResultMetadata::default());

        thread::scope(|s| {
            for i in 1..=4u8 {
                let context = &context;
                let statement = &statement;
                s.spawn(move || {
                    let int = RawType::Primitive(type_id::INT);
                    let specs = (0..usize::from(i))
                        .map(|c| spec(&format!("c{c}"), c, int.clone()))
                        .collect();
                    let rows = RowsMetadata {
                        new_result_metadata_id: Some(Bytes::from(vec![i])),
                        ..metadata(specs)
                    };
                    let bound = Statement::Bound(statement.bind_empty());
                    result_definitions(&rows, &bound, context).unwrap();
                });
            }
        });

        let metadata = statement.result_metadata();
        let id = metadata.id.as_ref().unwrap();
        assert_eq!(metadata.definitions.len(), usize::from(id[0]));
    }

    #[test]
    fn prepared_statement_from_response() {
        let context = DriverContext::new(ProtocolVersion::V4);
        let request = PrepareRequest::new("SELECT v FROM t WHERE k = ?")
            .with_keyspace("ks")
            .with_bound_idempotence(true)
            .with_bound_config_profile_name("olap");
        let response = Prepared {
            prepared_query_id: Bytes::from_static(&[0xaa]),
            result_metadata_id: Some(Bytes::from_static(b"r")),
            variables_metadata: RowsMetadata {
                pk_indices: vec![0],
                ..metadata(vec![spec("k", 0, RawType::Primitive(type_id::INT))])
            },
            result_metadata: metadata(vec![spec("v", 0, RawType::Primitive(type_id::ASCII))]),
        };

        let statement = to_prepared_statement(response, &request, &context).unwrap();
        assert_eq!(statement.id().as_ref(), &[0xaa]);
        assert_eq!(statement.query(), "SELECT v FROM t WHERE k = ?");
        assert_eq!(statement.partition_key_indices(), &[0]);
        assert_eq!(statement.variable_definitions()[0].name, "k");
        assert_eq!(
            statement.result_metadata_id(),
            Some(Bytes::from_static(b"r"))
        );
        assert_eq!(
            statement.result_set_definitions()[0].data_type,
            DataType::Ascii
        );
        assert_eq!(statement.bound_defaults().keyspace.as_deref(), Some("ks"));
        assert_eq!(statement.bound_defaults().idempotent, Some(true));
        assert_eq!(
            statement.bound_defaults().config_profile_name.as_deref(),
            Some("olap")
        );
        assert_eq!(statement.protocol_version(), ProtocolVersion::V4);
    }

    #[test]
    fn column_order_is_preserved() {
        let context = DriverContext::new(ProtocolVersion::V4);
        let specs = ["z", "a", "m"]
            .iter()
            .enumerate()
            .map(|(i, name)| spec(name, i, RawType::Primitive(type_id::BLOB)))
            .collect();
        let definitions = to_column_definitions(&metadata(specs), &context).unwrap();
        let names: Vec<_> = definitions.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["z", "a", "m"]);
    }

    #[test]
    fn unknown_type_id() {
        let context = DriverContext::new(ProtocolVersion::V4);
        let specs = vec![spec("x", 0, RawType::Primitive(0x00ff))];
        assert!(matches!(
            to_column_definitions(&metadata(specs), &context),
            Err(DriverError::ProtocolViolation(_))
        ));
    }
}
