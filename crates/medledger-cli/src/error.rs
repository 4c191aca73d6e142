//! CLI error types.

use medledger_core::ActorKind;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CliError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to write {path}: {source}")]
    Write {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid JSON in {path}: {source}")]
    Json {
        path: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("{kind} '{id}' is not registered")]
    NotRegistered { kind: ActorKind, id: String },
}
