//! Free port discovery.

use std::net::IpAddr;
use std::ops::RangeInclusive;

use async_trait::async_trait;
use tokio::net::TcpListener;

use crate::error::PortError;

/// Finds currently free TCP ports.
#[async_trait]
pub trait PortFinder: Send + Sync {
    /// Find `count` free ports.
    ///
    /// Resolves with at least `count` ports, in preference order.
    ///
    /// # Errors
    ///
    /// Returns an error if not enough free ports can be found.
    async fn find_ports(&self, count: usize) -> Result<Vec<u16>, PortError>;
}

/// Probes a port range by binding and immediately releasing each port.
#[derive(Clone, Debug)]
pub struct ScanningPortFinder {
    host: String,
    range: RangeInclusive<u16>,
}

impl ScanningPortFinder {
    /// Create a finder scanning `range` on `host`.
    #[must_use]
    pub fn new(host: impl Into<String>, range: RangeInclusive<u16>) -> Self {
        Self {
            host: host.into(),
            range,
        }
    }

    async fn resolve_host(&self) -> Result<IpAddr, PortError> {
        tokio::net::lookup_host((self.host.as_str(), 0))
            .await
            .ok()
            .and_then(|mut addrs| addrs.next())
            .map(|addr| addr.ip())
            .ok_or_else(|| PortError::InvalidHost(self.host.clone()))
    }

    async fn is_free(addr: IpAddr, port: u16) -> bool {
        TcpListener::bind((addr, port)).await.is_ok()
    }
}

#[async_trait]
impl PortFinder for ScanningPortFinder {
    async fn find_ports(&self, count: usize) -> Result<Vec<u16>, PortError> {
        let addr = self.resolve_host().await?;

        let mut found = Vec::with_capacity(count);
        for port in self.range.clone() {
            if found.len() == count {
                break;
            }
            if Self::is_free(addr, port).await {
                found.push(port);
            } else {
                tracing::debug!(port, "Port in use, skipping");
            }
        }

        if found.len() < count {
            return Err(PortError::Exhausted {
                start: *self.range.start(),
                end: *self.range.end(),
                count,
                found: found.len(),
            });
        }

        Ok(found)
    }
}
