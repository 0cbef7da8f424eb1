//! CLI commands implementation

pub mod ingest;
pub mod init;
pub mod report;
pub mod status;
pub mod topics;

pub use ingest::*;
pub use init::*;
pub use report::*;
pub use status::*;
pub use topics::*;
