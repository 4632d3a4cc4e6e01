//! Logging utilities.
//!
//! Every diagnostic in the shell goes through the `log` facade. This module
//! installs the `env_logger` backend with the carrier line format and exposes
//! the message sanitiser it uses.

mod format;
mod init;

pub use format::{single_line, MAX_MESSAGE_LEN};
pub use init::{init_logging, LoggingConfig};
