//! Crate-wide error type.
//!
//! Only structural failures live here. Recoverable problems in the user's
//! program (type conflicts, pin conflicts, out-of-range values) are warnings
//! attached to blocks and never become an `Error`.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid workspace JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("unknown block type '{tag}'")]
    UnknownBlockType { tag: String },

    /// A generator asked for a port the component schema does not declare.
    #[error("Port {port} not found on {instance} ({schema})")]
    MissingPort {
        instance: String,
        port: String,
        schema: String,
    },

    #[error("wire references unknown component instance '{0}'")]
    UnknownComponent(String),

    #[error("cannot load schematic asset '{schema}': {reason}")]
    Asset { schema: String, reason: String },

    #[error("unknown target '{0}' (expected arduino or micropython)")]
    UnknownTarget(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
