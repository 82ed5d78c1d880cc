//! Driver configuration.
//!
//! Options are grouped into profiles. The default profile is always present; named
//! profiles override part of it and inherit the rest, so that a class of requests (say,
//! "analytics") can run with different settings than the others.
//!
//! The marshalling core only reads the request options: consistency, serial consistency
//! and page size.
use std::{collections::BTreeMap, fmt, time::Duration};

use thiserror::Error;

mod consistency;

pub use consistency::{ConsistencyLevel, WriteType};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("missing configuration option '{0}'")]
    Missing(DriverOption),

    #[error("configuration option '{option}' should be of type {expected}")]
    WrongType {
        option: DriverOption,
        expected: &'static str,
    },

    #[error("unknown profile '{0}'")]
    UnknownProfile(String),

    #[error("unknown consistency level '{0}'")]
    UnknownConsistencyName(String),

    #[error("unknown consistency level code {0:#06x}")]
    UnknownConsistencyCode(u16),
}

/// Options understood by the driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum DriverOption {
    RequestConsistency,
    RequestSerialConsistency,
    RequestPageSize,
    RequestTimeout,
    ProtocolVersion,
}

impl DriverOption {
    pub fn path(self) -> &'static str {
        match self {
            DriverOption::RequestConsistency => "basic.request.consistency",
            DriverOption::RequestSerialConsistency => "basic.request.serial-consistency",
            DriverOption::RequestPageSize => "basic.request.page-size",
            DriverOption::RequestTimeout => "basic.request.timeout",
            DriverOption::ProtocolVersion => "advanced.protocol.version",
        }
    }
}

impl fmt::Display for DriverOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.path())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OptionValue {
    String(String),
    Int(i32),
    Duration(Duration),
}

/// A named set of option values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DriverConfigProfile {
    name: String,
    options: BTreeMap<DriverOption, OptionValue>,
}

impl DriverConfigProfile {
    pub const DEFAULT_NAME: &'static str = "default";

    /// The default profile, filled with the driver defaults.
    pub fn defaults() -> Self {
        Self::empty(Self::DEFAULT_NAME)
            .with_string(DriverOption::RequestConsistency, "LOCAL_ONE")
            .with_string(DriverOption::RequestSerialConsistency, "SERIAL")
            .with_int(DriverOption::RequestPageSize, 5000)
            .with_duration(DriverOption::RequestTimeout, Duration::from_secs(2))
    }

    pub fn empty(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            options: BTreeMap::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn with_string(mut self, option: DriverOption, value: impl Into<String>) -> Self {
        self.options
            .insert(option, OptionValue::String(value.into()));
        self
    }

    pub fn with_int(mut self, option: DriverOption, value: i32) -> Self {
        self.options.insert(option, OptionValue::Int(value));
        self
    }

    pub fn with_duration(mut self, option: DriverOption, value: Duration) -> Self {
        self.options.insert(option, OptionValue::Duration(value));
        self
    }

    pub fn is_defined(&self, option: DriverOption) -> bool {
        self.options.contains_key(&option)
    }

    pub fn get_string(&self, option: DriverOption) -> Result<&str, ConfigError> {
        match self.options.get(&option) {
            Some(OptionValue::String(s)) => Ok(s),
            Some(_) => Err(ConfigError::WrongType {
                option,
                expected: "string",
            }),
            None => Err(ConfigError::Missing(option)),
        }
    }

    pub fn get_int(&self, option: DriverOption) -> Result<i32, ConfigError> {
        match self.options.get(&option) {
            Some(OptionValue::Int(i)) => Ok(*i),
            Some(_) => Err(ConfigError::WrongType {
                option,
                expected: "int",
            }),
            None => Err(ConfigError::Missing(option)),
        }
    }

    pub fn get_duration(&self, option: DriverOption) -> Result<Duration, ConfigError> {
        match self.options.get(&option) {
            Some(OptionValue::Duration(d)) => Ok(*d),
            Some(_) => Err(ConfigError::WrongType {
                option,
                expected: "duration",
            }),
            None => Err(ConfigError::Missing(option)),
        }
    }

    fn inherit(mut self, base: &DriverConfigProfile) -> Self {
        for (option, value) in &base.options {
            self.options.entry(*option).or_insert_with(|| value.clone());
        }
        self
    }
}

/// All profiles of a driver instance.
#[derive(Debug, Clone)]
pub struct DriverConfig {
    default: DriverConfigProfile,
    named: BTreeMap<String, DriverConfigProfile>,
}

impl DriverConfig {
    pub fn new(default: DriverConfigProfile) -> Self {
        Self {
            default,
            named: BTreeMap::new(),
        }
    }

    /// Adds a named profile; options it leaves undefined come from the default profile.
    pub fn with_profile(mut self, profile: DriverConfigProfile) -> Self {
        let profile = profile.inherit(&self.default);
        self.named.insert(profile.name.clone(), profile);
        self
    }

    pub fn default_profile(&self) -> &DriverConfigProfile {
        &self.default
    }

    pub fn get_profile(&self, name: &str) -> Result<&DriverConfigProfile, ConfigError> {
        if name == DriverConfigProfile::DEFAULT_NAME {
            return Ok(&self.default);
        }
        self.named
            .get(name)
            .ok_or_else(|| ConfigError::UnknownProfile(name.to_string()))
    }

    pub fn profile_names(&self) -> impl Iterator<Item = &str> {
        let named = self.named.keys().map(String::as_str);
        std::iter::once(DriverConfigProfile::DEFAULT_NAME).chain(named)
    }
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self::new(DriverConfigProfile::defaults())
    }
}
