use std::{fmt, net::SocketAddr};

/// Identity of a cluster node, as seen by the request that reached it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Node {
    endpoint: SocketAddr,
    datacenter: Option<String>,
}

impl Node {
    pub fn new(endpoint: SocketAddr) -> Self {
        Self {
            endpoint,
            datacenter: None,
        }
    }

    pub fn with_datacenter(mut self, datacenter: impl Into<String>) -> Self {
        self.datacenter = Some(datacenter.into());
        self
    }

    pub fn endpoint(&self) -> SocketAddr {
        self.endpoint
    }

    pub fn datacenter(&self) -> Option<&str> {
        self.datacenter.as_deref()
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.endpoint)
    }
}
