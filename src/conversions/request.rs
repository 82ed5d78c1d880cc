//! Statement to request translation.
use log::{debug, trace};

use crate::{
    config::{ConsistencyLevel, DriverConfigProfile, DriverOption},
    context::DriverContext,
    error::{DriverError, Result},
    protocol::{
        Batch, Execute, ProtocolFeature, Query, QueryOptions, QueryOrId, RequestMessage,
        UNSET_TIMESTAMP, Values,
    },
    statement::{
        BatchStatement, BatchableStatement, BoundStatement, Request, SimpleStatement, Statement,
    },
};

use super::values::{encode_named, encode_positional};

/// Options every request carries, resolved once per translation.
struct SharedOptions {
    consistency: u16,
    serial_consistency: u16,
    page_size: i32,
    timestamp: i64,
}

impl SharedOptions {
    fn resolve(
        statement: &Statement,
        options: &DriverConfigProfile,
        context: &DriverContext,
    ) -> Result<Self> {
        let consistency =
            ConsistencyLevel::from_name(options.get_string(DriverOption::RequestConsistency)?)?;
        let serial_consistency = ConsistencyLevel::from_name(
            options.get_string(DriverOption::RequestSerialConsistency)?,
        )?;
        let page_size = options.get_int(DriverOption::RequestPageSize)?;

        let mut timestamp = statement.attributes().timestamp;
        if timestamp == UNSET_TIMESTAMP {
            timestamp = context.timestamp_generator().next();
            debug!("using generated timestamp {timestamp}");
        }

        Ok(Self {
            consistency: consistency.protocol_code(),
            serial_consistency: serial_consistency.protocol_code(),
            page_size,
            timestamp,
        })
    }
}

/// Picks the configuration profile a statement asked for.
pub fn resolve_profile<'a>(
    statement: &Statement,
    context: &'a DriverContext,
) -> Result<&'a DriverConfigProfile> {
    let config = context.config();
    match &statement.attributes().config_profile_name {
        Some(name) => Ok(config.get_profile(name)?),
        None => Ok(config.default_profile()),
    }
}

/// Translates a statement into the request message that executes it.
///
/// All validation happens here, before anything is written to the wire.
pub fn to_message(
    statement: &Statement,
    options: &DriverConfigProfile,
    context: &DriverContext,
) -> Result<RequestMessage> {
    let shared = SharedOptions::resolve(statement, options, context)?;
    let message = match statement {
        Statement::Simple(simple) => simple_to_message(simple, &shared, context)?,
        Statement::Bound(bound) => bound_to_message(bound, &shared, context)?,
        Statement::Batch(batch) => batch_to_message(batch, &shared, context)?,
    };
    trace!("translated statement to {message:?}");
    Ok(message)
}

fn simple_to_message(
    statement: &SimpleStatement,
    shared: &SharedOptions,
    context: &DriverContext,
) -> Result<RequestMessage> {
    if !statement.positional_values().is_empty() && !statement.named_values().is_empty() {
        return Err(DriverError::InvalidArgument(
            "Can't have both positional and named values in a statement.".to_string(),
        ));
    }
    let keyspace = statement.attributes().keyspace.clone();
    ensure_keyspace_supported(keyspace.as_deref(), context)?;

    let registry = context.codec_registry().as_ref();
    let version = context.protocol_version();
    let values = if !statement.positional_values().is_empty() {
        Values::Positional(encode_positional(
            statement.positional_values(),
            registry,
            version,
        )?)
    } else if !statement.named_values().is_empty() {
        Values::Named(encode_named(statement.named_values(), registry, version)?)
    } else {
        Values::Empty
    };

    Ok(RequestMessage::Query(Query {
        query: statement.query().to_string(),
        options: QueryOptions {
            consistency: shared.consistency,
            values,
            skip_metadata: false,
            page_size: shared.page_size,
            paging_state: statement.attributes().paging_state.clone(),
            serial_consistency: shared.serial_consistency,
            default_timestamp: shared.timestamp,
            keyspace,
        },
    }))
}

fn bound_to_message(
    statement: &BoundStatement,
    shared: &SharedOptions,
    context: &DriverContext,
) -> Result<RequestMessage> {
    if !context.supports(ProtocolFeature::UnsetBoundValues) {
        ensure_all_set(statement)?;
    }
    let prepared = statement.prepared();
    let result_metadata = prepared.result_metadata();
    let skip_metadata = !result_metadata.definitions.is_empty();
    if skip_metadata {
        debug!(
            "skipping result metadata for {} known columns",
            result_metadata.definitions.len()
        );
    }
    let values = if statement.is_empty() {
        Values::Empty
    } else {
        Values::Positional(statement.values().to_vec())
    };

    Ok(RequestMessage::Execute(Execute {
        id: prepared.id().clone(),
        result_metadata_id: result_metadata.id.clone(),
        options: QueryOptions {
            consistency: shared.consistency,
            values,
            skip_metadata,
            page_size: shared.page_size,
            paging_state: statement.attributes().paging_state.clone(),
            serial_consistency: shared.serial_consistency,
            default_timestamp: shared.timestamp,
            keyspace: None,
        },
    }))
}

fn batch_to_message(
    statement: &BatchStatement,
    shared: &SharedOptions,
    context: &DriverContext,
) -> Result<RequestMessage> {
    if !context.supports(ProtocolFeature::UnsetBoundValues) {
        ensure_all_set_in_batch(statement)?;
    }
    let keyspace = statement.attributes().keyspace.clone();
    ensure_keyspace_supported(keyspace.as_deref(), context)?;

    let registry = context.codec_registry().as_ref();
    let version = context.protocol_version();
    let mut queries_or_ids = Vec::with_capacity(statement.len());
    let mut values = Vec::with_capacity(statement.len());
    for child in statement.iter() {
        match child {
            BatchableStatement::Simple(simple) => {
                if !simple.named_values().is_empty() {
                    return Err(DriverError::InvalidArgument(format!(
                        "Batch statements cannot contain simple statements with named values \
                         (offending statement: {})",
                        simple.query()
                    )));
                }
                queries_or_ids.push(QueryOrId::Query(simple.query().to_string()));
                let encoded = encode_positional(simple.positional_values(), registry, version)?;
                values.push(encoded);
            }
            BatchableStatement::Bound(bound) => {
                queries_or_ids.push(QueryOrId::Id(bound.prepared().id().clone()));
                values.push(bound.values().to_vec());
            }
        }
    }

    Ok(RequestMessage::Batch(Batch {
        batch_type: statement.batch_type().protocol_code(),
        queries_or_ids,
        values,
        consistency: shared.consistency,
        serial_consistency: shared.serial_consistency,
        default_timestamp: shared.timestamp,
        keyspace,
    }))
}

fn ensure_keyspace_supported(keyspace: Option<&str>, context: &DriverContext) -> Result<()> {
    if keyspace.is_some() && !context.supports(ProtocolFeature::PerRequestKeyspace) {
        return Err(DriverError::InvalidArgument(format!(
            "Can't use per-request keyspace with protocol {}",
            context.protocol_version()
        )));
    }
    Ok(())
}

/// Fails on the first unset bind marker.
pub fn ensure_all_set(statement: &BoundStatement) -> Result<()> {
    match (0..statement.len()).find(|&i| !statement.is_set(i)) {
        Some(i) => Err(DriverError::IllegalState(format!(
            "Unset value at index {i}. \
             If you want this value to be null, please set it to null explicitly."
        ))),
        None => Ok(()),
    }
}

pub fn ensure_all_set_in_batch(statement: &BatchStatement) -> Result<()> {
    statement.iter().try_for_each(|child| match child {
        BatchableStatement::Bound(bound) => ensure_all_set(bound),
        BatchableStatement::Simple(_) => Ok(()),
    })
}

#[cfg(test)]
mod tests {
    use std::{collections::BTreeMap, sync::Arc};

    use bytes::Bytes;

    use crate::{
        codec::{DefaultCodecRegistry, Value},
        config::DriverConfig,
        context::ServerSideTimestampGenerator,
        metadata::{ColumnDefinition, ColumnDefinitions, DataType},
        protocol::{ProtocolVersion, RawValue, constants::consistency},
        statement::{BatchType, BoundStatementDefaults, PreparedStatement, ResultMetadata},
    };

    use super::*;

    fn column(name: &str, data_type: DataType) -> ColumnDefinition {
        ColumnDefinition {
            keyspace: "ks".into(),
            table: "t".into(),
            name: name.into(),
            data_type,
        }
    }

    fn prepared(markers: usize, result: ResultMetadata) -> Arc<PreparedStatement> {
        let variables = (0..markers)
            .map(|i| column(&format!("c{i}"), DataType::Int))
            .collect();
        Arc::new(PreparedStatement::new(
            Bytes::from_static(&[0xab, 0xcd]),
            "INSERT INTO t (c0, c1, c2) VALUES (?, ?, ?)",
            ColumnDefinitions::new(variables),
            vec![0],
            result,
            BoundStatementDefaults::default(),
            BTreeMap::new(),
            Arc::new(DefaultCodecRegistry),
            ProtocolVersion::V3,
        ))
    }

    fn translate(
        statement: impl Into<Statement>,
        context: &DriverContext,
    ) -> Result<RequestMessage> {
        let statement = statement.into();
        let profile = resolve_profile(&statement, context)?;
        to_message(&statement, profile, context)
    }

    fn local_quorum() -> DriverConfig {
        let profile = DriverConfigProfile::defaults()
            .with_string(DriverOption::RequestConsistency, "LOCAL_QUORUM");
        DriverConfig::new(profile)
    }

    #[test]
    fn simple_statement_local_quorum() {
        let context = DriverContext::new(ProtocolVersion::V4).with_config(local_quorum());
        let message = translate(SimpleStatement::new("SELECT * FROM t"), &context).unwrap();

        let RequestMessage::Query(query) = message else {
            panic!("expected a query");
        };
        assert_eq!(query.query, "SELECT * FROM t");
        assert_eq!(query.options.values, Values::Empty);
        assert_eq!(query.options.consistency, consistency::LOCAL_QUORUM);
        assert_eq!(query.options.serial_consistency, consistency::SERIAL);
        assert_eq!(query.options.page_size, 5000);
        assert_ne!(query.options.default_timestamp, UNSET_TIMESTAMP);
        assert!(query.options.keyspace.is_none());
    }

    #[test]
    fn explicit_timestamp_is_kept() {
        let context = DriverContext::new(ProtocolVersion::V4);
        let message = translate(SimpleStatement::new("q").with_timestamp(1234), &context).unwrap();
        let RequestMessage::Query(query) = message else {
            panic!("expected a query");
        };
        assert_eq!(query.options.default_timestamp, 1234);
    }

    #[test]
    fn server_side_timestamps_stay_unset() {
        let context = DriverContext::new(ProtocolVersion::V4)
            .with_timestamp_generator(Arc::new(ServerSideTimestampGenerator));
        let message = translate(SimpleStatement::new("q"), &context).unwrap();
        let RequestMessage::Query(query) = message else {
            panic!("expected a query");
        };
        assert_eq!(query.options.default_timestamp, UNSET_TIMESTAMP);
    }

    #[test]
    fn simple_statement_value_kinds() {
        let context = DriverContext::new(ProtocolVersion::V4);

        let mixed = SimpleStatement::new("q")
            .add_positional_value(1)
            .with_named_value("a", 2);
        let err = translate(mixed, &context).unwrap_err();
        assert_eq!(
            err.to_string(),
            "invalid argument: Can't have both positional and named values in a statement."
        );

        let positional = SimpleStatement::new("q").add_positional_value(1);
        let named = SimpleStatement::new("q").with_named_value("a", 2);
        assert!(translate(positional, &context).is_ok());
        assert!(translate(named, &context).is_ok());
        assert!(translate(SimpleStatement::new("q"), &context).is_ok());
    }

    #[test]
    fn per_request_keyspace_needs_v5() {
        let statement = SimpleStatement::new("q").with_keyspace("ks");

        let v4 = DriverContext::new(ProtocolVersion::V4);
        let err = translate(statement.clone(), &v4).unwrap_err();
        assert!(matches!(err, DriverError::InvalidArgument(_)));
        assert_eq!(
            err.to_string(),
            "invalid argument: Can't use per-request keyspace with protocol V4"
        );

        let v5 = DriverContext::new(ProtocolVersion::V5);
        let RequestMessage::Query(query) = translate(statement, &v5).unwrap() else {
            panic!("expected a query");
        };
        assert_eq!(query.options.keyspace.as_deref(), Some("ks"));
    }

    #[test]
    fn bound_statement_unset_slot() {
        let bound = prepared(3, ResultMetadata::default())
            .bind(vec![Value::Int(1), Value::Int(2)])
            .unwrap();

        let v3 = DriverContext::new(ProtocolVersion::V3);
        let err = translate(bound.clone(), &v3).unwrap_err();
        assert!(matches!(err, DriverError::IllegalState(_)));
        assert_eq!(
            err.to_string(),
            "illegal state: Unset value at index 2. \
             If you want this value to be null, please set it to null explicitly."
        );

        let v4 = DriverContext::new(ProtocolVersion::V4);
        let RequestMessage::Execute(execute) = translate(bound, &v4).unwrap() else {
            panic!("expected an execute");
        };
        let Values::Positional(values) = execute.options.values else {
            panic!("expected positional values");
        };
        assert_eq!(values[2], RawValue::Unset);
    }

    #[test]
    fn skip_metadata_follows_cached_result() {
        let v4 = DriverContext::new(ProtocolVersion::V4);

        let unknown = prepared(0, ResultMetadata::default()).bind_empty();
        let RequestMessage::Execute(execute) = translate(unknown, &v4).unwrap() else {
            panic!("expected an execute");
        };
        assert!(!execute.options.skip_metadata);
        assert!(execute.result_metadata_id.is_none());
        assert_eq!(execute.options.values, Values::Empty);

        let cached = ResultMetadata {
            id: Some(Bytes::from_static(b"m")),
            definitions: ColumnDefinitions::new(vec![column("v", DataType::Text)]),
        };
        let known = prepared(0, cached).bind_empty();
        let RequestMessage::Execute(execute) = translate(known, &v4).unwrap() else {
            panic!("expected an execute");
        };
        assert!(execute.options.skip_metadata);
        assert_eq!(execute.result_metadata_id, Some(Bytes::from_static(b"m")));
        assert_eq!(execute.id, Bytes::from_static(&[0xab, 0xcd]));
    }

    #[test]
    fn batch_preserves_child_order() {
        let v4 = DriverContext::new(ProtocolVersion::V4);
        let bound = prepared(1, ResultMetadata::default())
            .bind(vec![Value::Int(9)])
            .unwrap();
        let batch = BatchStatement::new(BatchType::Logged)
            .add_statement(SimpleStatement::new("first").add_positional_value(1))
            .add_statement(bound)
            .add_statement(SimpleStatement::new("third"));

        let RequestMessage::Batch(message) = translate(batch, &v4).unwrap() else {
            panic!("expected a batch");
        };
        assert_eq!(
            message.queries_or_ids,
            vec![
                QueryOrId::Query("first".into()),
                QueryOrId::Id(Bytes::from_static(&[0xab, 0xcd])),
                QueryOrId::Query("third".into()),
            ]
        );
        assert_eq!(
            message.values,
            vec![
                vec![RawValue::Bytes(Bytes::from_static(&[0, 0, 0, 1]))],
                vec![RawValue::Bytes(Bytes::from_static(&[0, 0, 0, 9]))],
                vec![],
            ]
        );
        assert_eq!(message.consistency, consistency::LOCAL_ONE);
    }

    #[test]
    fn batch_rejects_named_values() {
        let v4 = DriverContext::new(ProtocolVersion::V4);
        let batch = BatchStatement::new(BatchType::Unlogged)
            .add_statement(SimpleStatement::new("INSERT x").with_named_value("a", 1));
        let err = translate(batch, &v4).unwrap_err();
        assert_eq!(
            err.to_string(),
            "invalid argument: Batch statements cannot contain simple statements with named \
             values (offending statement: INSERT x)"
        );
    }

    #[test]
    fn batch_checks_children_and_keyspace() {
        let v3 = DriverContext::new(ProtocolVersion::V3);
        let unset = prepared(2, ResultMetadata::default()).bind_empty();
        let batch = BatchStatement::new(BatchType::Logged).add_statement(unset);
        assert!(matches!(
            translate(batch, &v3),
            Err(DriverError::IllegalState(_))
        ));

        let batch = BatchStatement::new(BatchType::Logged).with_keyspace("ks");
        assert!(matches!(
            translate(batch, &v3),
            Err(DriverError::InvalidArgument(_))
        ));
    }

    #[test]
    fn translation_is_deterministic() {
        let context = DriverContext::new(ProtocolVersion::V4);
        let statement: Statement = SimpleStatement::new("q")
            .add_positional_value("a")
            .add_positional_value(7i64)
            .with_timestamp(10)
            .into();
        let profile = context.config().default_profile();

        let first = to_message(&statement, profile, &context).unwrap();
        let second = to_message(&statement, profile, &context).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn unknown_profile_fails() {
        let context = DriverContext::new(ProtocolVersion::V4);
        let statement = SimpleStatement::new("q").with_config_profile_name("olap");
        let err = translate(statement, &context).unwrap_err();
        assert!(matches!(err, DriverError::Config(_)));
    }
}
