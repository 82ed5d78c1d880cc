//! Conversions between statements, protocol messages and results.
//!
//! # Overview
//!
//! - [`to_message`] turns a [`Statement`](crate::statement::Statement) into the
//!   [`RequestMessage`](crate::protocol::RequestMessage) that executes it, checking the
//!   statement against the features of the negotiated protocol version.
//! - [`minimum_request_size`] and [`size_of_values`] estimate the encoded size of a request
//!   without encoding it.
//! - [`to_result_set`], [`to_prepared_statement`] and [`to_column_definitions`] turn
//!   results into driver objects.
//! - [`to_coordinator_error`] classifies server errors.
//!
//! Everything here is synchronous and free of I/O. The only state touched is the result
//! metadata of prepared statements, which [`to_result_set`] refreshes when the server
//! reports a new result shape.
mod error;
mod request;
mod response;
mod size;
pub mod values;

pub use error::to_coordinator_error;
pub use request::{ensure_all_set, ensure_all_set_in_batch, resolve_profile, to_message};
pub use response::{
    result_definitions, to_column_definitions, to_prepared_statement, to_result_set,
};
pub use size::{minimum_request_size, size_of_values};
