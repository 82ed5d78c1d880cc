use std::sync::Arc;

use bytes::Bytes;

use quorum::{
    BatchStatement, BatchType, CoordinatorError, DriverContext, ExecutionInfo, Node,
    PrepareRequest, ProtocolVersion, SimpleStatement, Statement, Value,
    conversions::{
        minimum_request_size, size_of_values, to_coordinator_error, to_message,
        to_prepared_statement, to_result_set,
    },
    protocol::{
        ColumnSpec, ErrorMessage, Prepared, RawType, RequestMessage, ResultMessage, Rows,
        RowsMetadata, Values,
        constants::{consistency, error_code},
        frame::Frame,
        response::type_id,
    },
};

fn spec(name: &str, index: usize, id: u16) -> ColumnSpec {
    ColumnSpec {
        keyspace: "shop".into(),
        table: "orders".into(),
        name: name.into(),
        index,
        raw_type: RawType::Primitive(id),
    }
}

fn prepared_response() -> Prepared {
    Prepared {
        prepared_query_id: Bytes::from_static(&[0x01, 0x02, 0x03, 0x04]),
        result_metadata_id: Some(Bytes::from_static(b"v1")),
        variables_metadata: RowsMetadata {
            column_specs: vec![spec("id", 0, type_id::BIGINT)],
            column_count: 1,
            pk_indices: vec![0],
            ..Default::default()
        },
        result_metadata: RowsMetadata {
            column_specs: vec![
                spec("id", 0, type_id::BIGINT),
                spec("item", 1, type_id::VARCHAR),
            ],
            column_count: 2,
            ..Default::default()
        },
    }
}

#[test]
fn prepare_bind_execute_rows() {
    let context = DriverContext::new(ProtocolVersion::V5);
    let request = PrepareRequest::new("SELECT id, item FROM shop.orders WHERE id = ?");
    let prepared = to_prepared_statement(prepared_response(), &request, &context).unwrap();
    let prepared = Arc::new(prepared);

    let bound = prepared.bind(vec![Value::BigInt(42)]).unwrap();
    let statement = Statement::from(bound);
    let message = to_message(&statement, context.config().default_profile(), &context).unwrap();

    let RequestMessage::Execute(execute) = &message else {
        panic!("expected an execute request");
    };
    assert_eq!(execute.id.as_ref(), &[0x01, 0x02, 0x03, 0x04]);
    assert_eq!(execute.result_metadata_id, Some(Bytes::from_static(b"v1")));
    assert!(execute.options.skip_metadata);
    assert_eq!(execute.options.consistency, consistency::LOCAL_ONE);
    assert_eq!(
        execute.options.values,
        Values::Positional(vec![Bytes::copy_from_slice(&42i64.to_be_bytes()).into()])
    );

    let frame = Frame::new(ProtocolVersion::V5, 1, message)
        .encode(context.version_registry())
        .unwrap();
    let estimate = minimum_request_size(&statement, &context)
        + size_of_values(&statement, &context).unwrap();
    assert!(estimate <= frame.len());

    // The server skipped the metadata, so the prepared statement's copy is used.
    let rows = Rows {
        metadata: RowsMetadata {
            column_count: 2,
            ..Default::default()
        },
        data: vec![vec![
            Some(Bytes::copy_from_slice(&42i64.to_be_bytes())),
            Some(Bytes::from_static(b"teapot")),
        ]],
    };
    let info = ExecutionInfo::new(statement)
        .with_coordinator(Arc::new(Node::new("127.0.0.1:9042".parse().unwrap())));
    let mut result = to_result_set(ResultMessage::Rows(rows), info, &context).unwrap();

    assert_eq!(result.column_definitions().len(), 2);
    assert!(!result.has_more_pages());
    let row = result.one().unwrap();
    assert_eq!(row.get_by_name("id").unwrap(), Value::BigInt(42));
    assert_eq!(row.get(1).unwrap(), Value::Text("teapot".into()));
}

#[test]
fn schema_change_refreshes_later_executions() {
    let context = DriverContext::new(ProtocolVersion::V5);
    let request = PrepareRequest::new("SELECT * FROM shop.orders WHERE id = ?");
    let prepared = to_prepared_statement(prepared_response(), &request, &context).unwrap();
    let prepared = Arc::new(prepared);

    let statement = Statement::from(prepared.bind(vec![Value::BigInt(1)]).unwrap());
    let rows = Rows {
        metadata: RowsMetadata {
            column_specs: vec![
                spec("id", 0, type_id::BIGINT),
                spec("item", 1, type_id::VARCHAR),
                spec("quantity", 2, type_id::INT),
            ],
            column_count: 3,
            new_result_metadata_id: Some(Bytes::from_static(b"v2")),
            ..Default::default()
        },
        data: vec![],
    };
    let info = ExecutionInfo::new(statement);
    let result = to_result_set(ResultMessage::Rows(rows), info, &context).unwrap();
    assert_eq!(result.column_definitions().len(), 3);

    let next = Statement::from(prepared.bind(vec![Value::BigInt(2)]).unwrap());
    let RequestMessage::Execute(execute) =
        to_message(&next, context.config().default_profile(), &context).unwrap()
    else {
        panic!("expected an execute request");
    };
    assert_eq!(execute.result_metadata_id, Some(Bytes::from_static(b"v2")));
    assert_eq!(prepared.result_set_definitions().len(), 3);
}

#[test]
fn batch_of_prepared_and_simple_statements() {
    let context = DriverContext::new(ProtocolVersion::V4);
    let request = PrepareRequest::new("SELECT id FROM shop.orders WHERE id = ?");
    let prepared = to_prepared_statement(prepared_response(), &request, &context).unwrap();
    let prepared = Arc::new(prepared);

    let delete = SimpleStatement::new("DELETE FROM shop.carts WHERE id = ?");
    let batch = BatchStatement::new(BatchType::Logged)
        .add_statement(prepared.bind(vec![Value::BigInt(7)]).unwrap())
        .add_statement(delete.add_positional_value(7i64));
    let statement = Statement::from(batch);

    let message = to_message(&statement, context.config().default_profile(), &context).unwrap();
    let frame = Frame::new(ProtocolVersion::V4, 0, message)
        .encode(context.version_registry())
        .unwrap();
    let estimate = minimum_request_size(&statement, &context)
        + size_of_values(&statement, &context).unwrap();
    assert!(estimate <= frame.len());
}

#[test]
fn server_errors_keep_their_node() {
    let context = DriverContext::new(ProtocolVersion::V4);
    let node = Node::new("10.1.2.3:9042".parse().unwrap()).with_datacenter("dc1");
    let node = Arc::new(node);

    let error = to_coordinator_error(
        Arc::clone(&node),
        ErrorMessage::new(error_code::OVERLOADED, "busy"),
        &context,
    );
    assert!(matches!(error, CoordinatorError::Overloaded { .. }));
    assert_eq!(error.node().datacenter(), Some("dc1"));
    assert_eq!(error.code(), error_code::OVERLOADED);
}
