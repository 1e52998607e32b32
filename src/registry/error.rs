//! Core error type for the registry, mirroring the teacher's per-module
//! `thiserror` enums (`DatabaseError`, `WorkerError`).

use thiserror::Error;

/// Errors raised by the classified host index and its operation handlers.
#[derive(Error, Debug)]
pub enum RegistryError {
    /// An update or query referenced a host IP that was never created.
    #[error("unknown host: {0}")]
    UnknownHost(String),

    /// A bucket move could not find the host in the bucket it claimed to
    /// be in. This signals the invariants in §3 have already been broken
    /// by a prior bug; the move does not attempt to paper over it.
    #[error("index corruption: host {host} expected in bucket {bucket}")]
    IndexCorruption { host: String, bucket: String },

    /// A class value outside 1..=4 was supplied.
    #[error("invalid host class: {0}")]
    InvalidClass(String),

    /// The external container-runtime driver failed to execute.
    #[error("runtime driver error: {0}")]
    RuntimeDriver(String),
}

/// Result alias used throughout the registry core.
pub type RegistryResult<T> = Result<T, RegistryError>;
