//! Partitioner tokens.
//!
//! A token is a position on the ring of one specific partitioner. Three partitioning
//! schemes are supported and their token spaces are unrelated to each other:
//!
//! - [`Hash64Token`]: signed 64-bit hash, covering the whole `i64` range.
//! - [`BigIntToken`]: non-negative integer in `[0, 2^127)`.
//! - [`RawToken`]: the partition key bytes themselves.
//!
//! Each concrete token type is totally ordered and can key ordered ring structures
//! directly. The [`Token`] enum erases the scheme; comparing two erased tokens of
//! different schemes is an error rather than an arbitrary order.
use std::{cmp::Ordering, fmt};

use bytes::Bytes;
use thiserror::Error;

/// Exclusive upper bound of the [`BigIntToken`] ring.
pub const BIG_INT_TOKEN_LIMIT: u128 = 1 << 127;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TokenError {
    #[error("can only compare tokens of the same type (got {left} and {right})")]
    Mismatch {
        left: &'static str,
        right: &'static str,
    },

    #[error("token {0} is outside of the ring range [0, 2^127)")]
    OutOfRange(u128),
}

/// Token of a 64-bit hashing partitioner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Hash64Token(i64);

impl Hash64Token {
    pub fn new(value: i64) -> Self {
        Self(value)
    }

    pub fn value(self) -> i64 {
        self.0
    }
}

/// Token of a partitioner hashing into `[0, 2^127)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BigIntToken(u128);

impl BigIntToken {
    pub fn new(value: u128) -> Result<Self, TokenError> {
        if value >= BIG_INT_TOKEN_LIMIT {
            return Err(TokenError::OutOfRange(value));
        }
        Ok(Self(value))
    }

    pub fn value(self) -> u128 {
        self.0
    }
}

/// Token of an order-preserving partitioner; wraps the key bytes.
///
/// Trailing zero bytes carry no ordering information, so they are stripped once when the
/// token is built: `[1, 0, 0]` becomes `[1]`. The first byte is never stripped, which
/// means an all-zero key collapses to a single `0x00` byte, while an empty key (the ring
/// minimum) stays empty. Equality, hashing and ordering all operate on that canonical
/// form.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RawToken(Bytes);

impl RawToken {
    pub fn new(value: impl Into<Bytes>) -> Self {
        let mut value: Bytes = value.into();
        let mut end = value.len();
        while end > 1 && value[end - 1] == 0 {
            end -= 1;
        }
        value.truncate(end);
        Self(value)
    }

    pub fn value(&self) -> &Bytes {
        &self.0
    }
}

impl fmt::Debug for RawToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RawToken({self})")
    }
}

impl fmt::Display for RawToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x")?;
        for b in self.0.iter() {
            write!(f, "{b:02x}")?;
        }
        Ok(())
    }
}

/// A token of any of the supported partitioners.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Token {
    Hash64(Hash64Token),
    BigInt(BigIntToken),
    Raw(RawToken),
}

impl Token {
    /// Name of the token scheme, used in diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            Token::Hash64(_) => "Hash64Token",
            Token::BigInt(_) => "BigIntToken",
            Token::Raw(_) => "RawToken",
        }
    }

    /// Orders two tokens of the same scheme.
    ///
    /// # Errors
    /// [`TokenError::Mismatch`] if the tokens come from different partitioners.
    pub fn try_cmp(&self, other: &Token) -> Result<Ordering, TokenError> {
        match (self, other) {
            (Token::Hash64(a), Token::Hash64(b)) => Ok(a.cmp(b)),
            (Token::BigInt(a), Token::BigInt(b)) => Ok(a.cmp(b)),
            (Token::Raw(a), Token::Raw(b)) => Ok(a.cmp(b)),
            _ => Err(TokenError::Mismatch {
                left: self.kind(),
                right: other.kind(),
            }),
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Hash64(t) => write!(f, "Hash64Token({})", t.0),
            Token::BigInt(t) => write!(f, "BigIntToken({})", t.0),
            Token::Raw(t) => write!(f, "RawToken({t})"),
        }
    }
}

impl From<Hash64Token> for Token {
    fn from(value: Hash64Token) -> Self {
        Token::Hash64(value)
    }
}

impl From<BigIntToken> for Token {
    fn from(value: BigIntToken) -> Self {
        Token::BigInt(value)
    }
}

impl From<RawToken> for Token {
    fn from(value: RawToken) -> Self {
        Token::Raw(value)
    }
}
