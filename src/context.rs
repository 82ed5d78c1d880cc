//! Collaborators the conversions read from.
//!
//! A [`DriverContext`] bundles everything that is fixed for a connection's lifetime: the
//! negotiated protocol version, the feature table, the codec registry, the timestamp
//! generator and the configuration. It is immutable and meant to be shared behind an
//! [`Arc`].
use std::{
    fmt,
    sync::{
        Arc,
        atomic::{AtomicI64, Ordering},
    },
    time::{SystemTime, UNIX_EPOCH},
};

use log::debug;

use crate::{
    codec::{CodecRegistry, DefaultCodecRegistry},
    config::DriverConfig,
    protocol::{
        DefaultProtocolVersionRegistry, ProtocolFeature, ProtocolVersion, ProtocolVersionRegistry,
        UNSET_TIMESTAMP,
    },
};

/// Source of client-side request timestamps, in microseconds since the epoch.
pub trait TimestampGenerator: Send + Sync {
    fn next(&self) -> i64;
}

/// Wall-clock based generator that never hands out the same value twice.
///
/// When the clock does not move (or moves backwards) between two calls, the previous
/// value plus one microsecond is returned instead.
#[derive(Debug)]
pub struct MonotonicTimestampGenerator {
    last: AtomicI64,
}

impl MonotonicTimestampGenerator {
    pub fn new() -> Self {
        Self {
            last: AtomicI64::new(0),
        }
    }
}

impl Default for MonotonicTimestampGenerator {
    fn default() -> Self {
        Self::new()
    }
}

fn clock_micros() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| i64::try_from(d.as_micros()).unwrap_or(i64::MAX))
        .unwrap_or(0)
}

impl TimestampGenerator for MonotonicTimestampGenerator {
    fn next(&self) -> i64 {
        loop {
            let last = self.last.load(Ordering::Acquire);
            let now = clock_micros();
            let next = if now > last {
                now
            } else {
                let behind = last - now;
                if behind > 1_000_000 {
                    debug!("clock is {behind}us behind the last generated timestamp");
                }
                last + 1
            };
            if self
                .last
                .compare_exchange(last, next, Ordering::AcqRel, Ordering::Acquire)
                .is_ok()
            {
                return next;
            }
        }
    }
}

/// Leaves timestamps to the server: always returns [`UNSET_TIMESTAMP`].
#[derive(Debug, Clone, Copy, Default)]
pub struct ServerSideTimestampGenerator;

impl TimestampGenerator for ServerSideTimestampGenerator {
    fn next(&self) -> i64 {
        UNSET_TIMESTAMP
    }
}

#[derive(Clone)]
pub struct DriverContext {
    protocol_version: ProtocolVersion,
    version_registry: Arc<dyn ProtocolVersionRegistry>,
    codec_registry: Arc<dyn CodecRegistry>,
    timestamp_generator: Arc<dyn TimestampGenerator>,
    config: Arc<DriverConfig>,
}

impl DriverContext {
    /// A context with the default collaborators.
    pub fn new(protocol_version: ProtocolVersion) -> Self {
        Self {
            protocol_version,
            version_registry: Arc::new(DefaultProtocolVersionRegistry),
            codec_registry: Arc::new(DefaultCodecRegistry),
            timestamp_generator: Arc::new(MonotonicTimestampGenerator::new()),
            config: Arc::new(DriverConfig::default()),
        }
    }

    pub fn with_version_registry(mut self, registry: Arc<dyn ProtocolVersionRegistry>) -> Self {
        self.version_registry = registry;
        self
    }

    pub fn with_codec_registry(mut self, registry: Arc<dyn CodecRegistry>) -> Self {
        self.codec_registry = registry;
        self
    }

    pub fn with_timestamp_generator(mut self, generator: Arc<dyn TimestampGenerator>) -> Self {
        self.timestamp_generator = generator;
        self
    }

    pub fn with_config(mut self, config: DriverConfig) -> Self {
        self.config = Arc::new(config);
        self
    }

    pub fn protocol_version(&self) -> ProtocolVersion {
        self.protocol_version
    }

    pub fn version_registry(&self) -> &dyn ProtocolVersionRegistry {
        self.version_registry.as_ref()
    }

    /// Whether the negotiated protocol version supports `feature`.
    pub fn supports(&self, feature: ProtocolFeature) -> bool {
        self.version_registry
            .supports(self.protocol_version, feature)
    }

    pub fn codec_registry(&self) -> &Arc<dyn CodecRegistry> {
        &self.codec_registry
    }

    pub fn timestamp_generator(&self) -> &dyn TimestampGenerator {
        self.timestamp_generator.as_ref()
    }

    pub fn config(&self) -> &DriverConfig {
        &self.config
    }
}

impl fmt::Debug for DriverContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DriverContext")
            .field("protocol_version", &self.protocol_version)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
