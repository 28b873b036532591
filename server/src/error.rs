use std::io;
use thiserror::Error;

/// Failures that prevent the relay from starting.
///
/// None of these reach the tick side once the relay is running; transport and
/// decode problems are handled per request and per envelope.
#[derive(Debug, Error)]
pub enum RelayError {
    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: io::Error,
    },
    #[error("failed to build listener runtime: {0}")]
    Runtime(#[source] io::Error),
    #[error("failed to spawn listener thread: {0}")]
    Spawn(#[source] io::Error),
}
