//! Command line and JSON-lines RPC front end for the kreate backend.

mod error;
pub mod host;
pub mod rpc;
pub mod watch;

pub use error::{CliError, CliResult};
pub use host::CliHost;
