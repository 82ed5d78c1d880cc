use std::fmt;

use crate::protocol::constants::consistency;

use super::ConfigError;

/// Replica acknowledgement policy of a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConsistencyLevel {
    Any,
    One,
    Two,
    Three,
    Quorum,
    All,
    LocalQuorum,
    EachQuorum,
    Serial,
    LocalSerial,
    LocalOne,
}

const LEVELS: [(ConsistencyLevel, &str, u16); 11] = [
    (ConsistencyLevel::Any, "ANY", consistency::ANY),
    (ConsistencyLevel::One, "ONE", consistency::ONE),
    (ConsistencyLevel::Two, "TWO", consistency::TWO),
    (ConsistencyLevel::Three, "THREE", consistency::THREE),
    (ConsistencyLevel::Quorum, "QUORUM", consistency::QUORUM),
    (ConsistencyLevel::All, "ALL", consistency::ALL),
    (ConsistencyLevel::LocalQuorum, "LOCAL_QUORUM", consistency::LOCAL_QUORUM),
    (ConsistencyLevel::EachQuorum, "EACH_QUORUM", consistency::EACH_QUORUM),
    (ConsistencyLevel::Serial, "SERIAL", consistency::SERIAL),
    (ConsistencyLevel::LocalSerial, "LOCAL_SERIAL", consistency::LOCAL_SERIAL),
    (ConsistencyLevel::LocalOne, "LOCAL_ONE", consistency::LOCAL_ONE),
];

impl ConsistencyLevel {
    pub fn from_name(name: &str) -> Result<Self, ConfigError> {
        LEVELS
            .iter()
            .find(|(_, n, _)| n.eq_ignore_ascii_case(name.trim()))
            .map(|(level, _, _)| *level)
            .ok_or_else(|| ConfigError::UnknownConsistencyName(name.to_string()))
    }

    pub fn from_code(code: u16) -> Result<Self, ConfigError> {
        LEVELS
            .iter()
            .find(|(_, _, c)| *c == code)
            .map(|(level, _, _)| *level)
            .ok_or(ConfigError::UnknownConsistencyCode(code))
    }

    pub fn protocol_code(self) -> u16 {
        LEVELS[self as usize].2
    }

    pub fn name(self) -> &'static str {
        LEVELS[self as usize].1
    }

    pub fn is_serial(self) -> bool {
        matches!(
            self,
            ConsistencyLevel::Serial | ConsistencyLevel::LocalSerial
        )
    }
}

impl fmt::Display for ConsistencyLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Kind of write that timed out or failed on the server.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum WriteType {
    Simple,
    Batch,
    UnloggedBatch,
    Counter,
    BatchLog,
    Cas,
    View,
    Cdc,
    /// A write type this driver does not know yet; kept verbatim.
    Other(String),
}

impl WriteType {
    pub fn from_name(name: &str) -> Self {
        match name {
            "SIMPLE" => WriteType::Simple,
            "BATCH" => WriteType::Batch,
            "UNLOGGED_BATCH" => WriteType::UnloggedBatch,
            "COUNTER" => WriteType::Counter,
            "BATCH_LOG" => WriteType::BatchLog,
            "CAS" => WriteType::Cas,
            "VIEW" => WriteType::View,
            "CDC" => WriteType::Cdc,
            other => WriteType::Other(other.to_string()),
        }
    }

    pub fn name(&self) -> &str {
        match self {
            WriteType::Simple => "SIMPLE",
            WriteType::Batch => "BATCH",
            WriteType::UnloggedBatch => "UNLOGGED_BATCH",
            WriteType::Counter => "COUNTER",
            WriteType::BatchLog => "BATCH_LOG",
            WriteType::Cas => "CAS",
            WriteType::View => "VIEW",
            WriteType::Cdc => "CDC",
            WriteType::Other(name) => name,
        }
    }
}

impl fmt::Display for WriteType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn levels_table_matches_discriminants() {
        for (i, (level, _, _)) in LEVELS.iter().enumerate() {
            assert_eq!(*level as usize, i);
        }
    }

    #[test]
    fn consistency_by_name_and_code() {
        let level = ConsistencyLevel::from_name("LOCAL_QUORUM").unwrap();
        assert_eq!(level, ConsistencyLevel::LocalQuorum);
        assert_eq!(level.protocol_code(), 0x0006);
        assert_eq!(
            ConsistencyLevel::from_code(0x000A).unwrap(),
            ConsistencyLevel::LocalOne
        );
        assert_eq!(
            ConsistencyLevel::from_name("quorum").unwrap(),
            ConsistencyLevel::Quorum
        );
    }

    #[test]
    fn serial_levels() {
        assert!(ConsistencyLevel::Serial.is_serial());
        assert!(ConsistencyLevel::LocalSerial.is_serial());
        assert!(!ConsistencyLevel::LocalQuorum.is_serial());
        assert!(!ConsistencyLevel::from_code(0x0001).unwrap().is_serial());
    }

    #[test]
    #[should_panic(expected = "UnknownConsistencyName")]
    fn unknown_consistency_name() {
        ConsistencyLevel::from_name("MOST").unwrap();
    }

    #[test]
    fn unknown_consistency_code() {
        assert_eq!(
            ConsistencyLevel::from_code(0x00ff),
            Err(ConfigError::UnknownConsistencyCode(0x00ff))
        );
    }

    #[test]
    fn write_type_keeps_unknown_names() {
        assert_eq!(WriteType::from_name("CAS"), WriteType::Cas);
        assert_eq!(
            WriteType::from_name("FUTURE"),
            WriteType::Other("FUTURE".into())
        );
        assert_eq!(WriteType::from_name("BATCH_LOG").to_string(), "BATCH_LOG");
        assert_eq!(WriteType::from_name("FUTURE").name(), "FUTURE");
    }
}
