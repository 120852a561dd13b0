//! Service implementations
//!
//! This module contains real implementations of all service traits.
//! These are the production implementations that handle actual I/O operations.

pub mod command_runner;
pub mod display;
pub mod http_client;
pub mod port_probe;
pub mod process_table;

// Re-export all service implementations
pub use command_runner::RealCommandRunner;
pub use display::RealDisplaySource;
pub use http_client::RealHttpProbe;
pub use port_probe::RealPortProbe;
pub use process_table::RealProcessTable;
