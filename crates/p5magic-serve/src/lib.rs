//! Frame-mode plumbing for p5magic: find a port, serve the page for a while,
//! tell the notebook where to look.

pub mod display;
pub mod host;
pub mod lease;
pub mod port;

pub use display::{iframe_markup, DisplayMode, Dispatcher, FrameSize, NotebookDisplay, TerminalDisplay};
pub use host::{detect_host, ColabHost, HostEnvironment, LocalHost};
pub use lease::{ServerLease, MAX_LEASE_LIFETIME};
pub use port::{find_free_port, is_port_free, PortRange};
