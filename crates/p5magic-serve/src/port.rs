//! Free-port search over the reserved range.
//!
//! A port counts as free when a loopback connect attempt is refused. The
//! probe and the later bind are not atomic; another process can take the
//! port in between. That race is accepted for a single interactive user.

use std::net::{Ipv4Addr, SocketAddr, TcpStream};
use std::time::Duration;

use p5magic_core::config::ServeConfig;
use p5magic_core::{MagicError, Result};

const PROBE_TIMEOUT: Duration = Duration::from_millis(200);

/// Inclusive port range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PortRange {
    start: u16,
    end: u16,
}

impl PortRange {
    pub fn new(start: u16, end: u16) -> Result<Self> {
        if start == 0 || start > end {
            return Err(MagicError::invalid(
                "port_range",
                format!("{}-{} is not a usable port range", start, end),
            ));
        }
        Ok(Self { start, end })
    }

    pub fn from_config(cfg: &ServeConfig) -> Result<Self> {
        Self::new(cfg.port_start, cfg.port_end)
    }

    pub fn start(&self) -> u16 {
        self.start
    }

    pub fn end(&self) -> u16 {
        self.end
    }

    pub fn iter(&self) -> impl Iterator<Item = u16> {
        self.start..=self.end
    }
}

/// True when nothing accepts connections on `127.0.0.1:port`.
pub fn is_port_free(port: u16) -> bool {
    let addr = SocketAddr::from((Ipv4Addr::LOCALHOST, port));
    TcpStream::connect_timeout(&addr, PROBE_TIMEOUT).is_err()
}

/// First free port in `range`, probing in ascending order.
pub fn find_free_port(range: PortRange) -> Result<u16> {
    for port in range.iter() {
        if is_port_free(port) {
            tracing::debug!(port, "Selected free port");
            return Ok(port);
        }
        tracing::trace!(port, "Port in use");
    }
    Err(MagicError::ResourceExhausted {
        start: range.start,
        end: range.end,
    })
}
