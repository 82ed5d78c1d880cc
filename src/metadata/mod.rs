//! Cluster metadata consumed by the marshalling layer.
//!
//! - [`token`]: partitioner tokens and their ordering contract.
//! - [`column`]: column definitions of results and bind markers.
//! - [`node`]: identity of the coordinator that answered a request.
pub mod column;
pub mod node;
pub mod token;

pub use column::{ColumnDefinition, ColumnDefinitions, DataType};
pub use node::Node;
pub use token::{BigIntToken, Hash64Token, RawToken, Token, TokenError};
