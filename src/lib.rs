pub mod codec;
pub mod config;
pub mod context;
pub mod conversions;
pub mod error;
pub mod metadata;
pub mod protocol;
pub mod result;
pub mod servererror;
pub mod statement;

pub use codec::{Codec, CodecRegistry, DefaultCodecRegistry, Value};
pub use config::{ConsistencyLevel, DriverConfig, DriverConfigProfile, DriverOption};
pub use context::{DriverContext, TimestampGenerator};
pub use error::{DriverError, Result};
pub use metadata::{BigIntToken, Hash64Token, Node, RawToken, Token};
pub use protocol::ProtocolVersion;
pub use result::{AsyncResultSet, ExecutionInfo, Row};
pub use servererror::CoordinatorError;
pub use statement::{
    BatchStatement, BatchType, BoundStatement, PrepareRequest, PreparedStatement, Request,
    SimpleStatement, Statement,
};
