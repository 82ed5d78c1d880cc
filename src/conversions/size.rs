//! Request size estimates.
//!
//! These are structural lower bounds, computed without laying the whole request out. The
//! query text and some optional fields are left out, so an encoded frame is never smaller
//! than the estimate.
use crate::{
    context::DriverContext,
    error::Result,
    protocol::{
        ProtocolFeature,
        frame::{header_encoded_size, query_flags_size, sizes},
    },
    statement::{BatchableStatement, SimpleStatement, Statement},
};

use super::values::{encode_named, encode_positional};

/// Size every request of this kind has at least: frame header, custom payload, flags,
/// consistency and serial consistency.
pub fn minimum_request_size(statement: &Statement, context: &DriverContext) -> usize {
    let version = context.protocol_version();
    let mut size = header_encoded_size(version);

    let payload = &statement.attributes().custom_payload;
    if !payload.is_empty() && context.supports(ProtocolFeature::CustomPayload) {
        size += sizes::of_bytes_map(payload);
    }

    size += query_flags_size(version);
    size += sizes::SHORT; // consistency
    size += sizes::SHORT; // serial consistency
    size
}

/// Size of the values a statement sends.
pub fn size_of_values(statement: &Statement, context: &DriverContext) -> Result<usize> {
    match statement {
        Statement::Simple(simple) => size_of_simple_values(simple, context),
        Statement::Bound(bound) if bound.is_empty() => Ok(0),
        Statement::Bound(bound) => Ok(sizes::of_positional_values(bound.values())),
        Statement::Batch(batch) => batch.iter().try_fold(0, |size, child| {
            let child_size = match child {
                BatchableStatement::Simple(simple) => {
                    let values = encode_positional(
                        simple.positional_values(),
                        context.codec_registry().as_ref(),
                        context.protocol_version(),
                    )?;
                    sizes::of_positional_values(&values)
                }
                BatchableStatement::Bound(bound) => sizes::of_positional_values(bound.values()),
            };
            Ok(size + child_size)
        }),
    }
}

fn size_of_simple_values(statement: &SimpleStatement, context: &DriverContext) -> Result<usize> {
    let registry = context.codec_registry().as_ref();
    let version = context.protocol_version();
    if !statement.positional_values().is_empty() {
        let values = encode_positional(statement.positional_values(), registry, version)?;
        Ok(sizes::of_positional_values(&values))
    } else if !statement.named_values().is_empty() {
        let values = encode_named(statement.named_values(), registry, version)?;
        Ok(sizes::of_named_values(&values))
    } else {
        Ok(0)
    }
}


#[cfg(test)]
mod proptests {
    use std::collections::BTreeMap;

    use bytes::Bytes;
    use proptest::prelude::*;

    use crate::{
        codec::Value,
        conversions::{resolve_profile, to_message},
        protocol::{ProtocolVersion, frame::Frame},
        statement::{BatchStatement, BatchType, Request},
    };

    use super::*;

    fn value() -> impl Strategy<Value = Value> {
        prop_oneof![
            Just(Value::Null),
            any::<i32>().prop_map(Value::Int),
            any::<i64>().prop_map(Value::BigInt),
            ".{0,16}".prop_map(Value::Text),
            prop::collection::vec(any::<u8>(), 0..16).prop_map(|b| Value::Blob(Bytes::from(b))),
        ]
    }

    fn version() -> impl Strategy<Value = ProtocolVersion> {
        prop::sample::select(ProtocolVersion::ALL.to_vec())
    }

    fn simple() -> impl Strategy<Value = SimpleStatement> {
        (
            "[a-z ]{0,24}",
            prop::collection::vec(value(), 0..6),
            prop::collection::vec(("[a-z]{1,6}", value()), 0..6),
            any::<bool>(),
            prop::option::of(any::<i64>().prop_filter("sentinel", |t| *t != i64::MIN)),
        )
            .prop_map(|(query, positional, named, use_named, timestamp)| {
                let mut statement = SimpleStatement::new(query);
                if use_named {
                    for (name, value) in named {
                        statement = statement.with_named_value(name, value);
                    }
                } else {
                    statement = statement.with_positional_values(positional);
                }
                if let Some(timestamp) = timestamp {
                    statement = statement.with_timestamp(timestamp);
                }
                statement
            })
    }

    fn payload() -> impl Strategy<Value = BTreeMap<String, Bytes>> {
        prop::collection::btree_map(
            "[a-z]{0,8}",
            prop::collection::vec(any::<u8>(), 0..8).prop_map(Bytes::from),
            0..3,
        )
    }

    fn frame_size(statement: &Statement, context: &DriverContext) -> usize {
        let profile = resolve_profile(statement, context).unwrap();
        let message = to_message(statement, profile, context).unwrap();
        Frame::new(context.protocol_version(), 0, message)
            .with_custom_payload(statement.attributes().custom_payload.clone())
            .encode(context.version_registry())
            .unwrap()
            .len()
    }

    proptest! {
        #[test]
        fn simple_estimate_is_lower_bound(
            statement in simple(),
            payload in payload(),
            version in version(),
        ) {
            let mut statement = statement;
            for (k, v) in payload {
                statement = statement.with_custom_payload(k, v);
            }
            let statement: Statement = statement.into();
            let context = DriverContext::new(version);

            let estimate = minimum_request_size(&statement, &context)
                + size_of_values(&statement, &context).unwrap();
            prop_assert!(estimate <= frame_size(&statement, &context));
        }

        #[test]
        fn batch_estimate_is_lower_bound(
            children in prop::collection::vec(
                ("[a-z ]{0,12}", prop::collection::vec(value(), 0..4)),
                0..5,
            ),
            version in version(),
        ) {
            let batch = children.into_iter().fold(
                BatchStatement::new(BatchType::Unlogged),
                |batch, (query, values)| {
                    batch.add_statement(SimpleStatement::new(query).with_positional_values(values))
                },
            );
            let statement: Statement = batch.into();
            let context = DriverContext::new(version);

            let estimate = minimum_request_size(&statement, &context)
                + size_of_values(&statement, &context).unwrap();
            prop_assert!(estimate <= frame_size(&statement, &context));
        }
    }
}
