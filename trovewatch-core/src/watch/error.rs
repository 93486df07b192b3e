use thiserror::Error;
use trovewatch_sdk::chain::ChainError;

/// Errors returned synchronously by a watch operation.
///
/// Nothing is registered with the chain client when one of these is
/// returned.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WatchError {
    /// The watch needs a subject address and none was given or bound.
    #[error("no active account: pass an address or bind one to the observer")]
    NoActiveAccount,

    /// The quantity has no push-based event source to watch.
    #[error("{0} is not implemented: no event source reports this quantity")]
    NotImplemented(&'static str),

    /// Watches spawn their coalescer onto the current tokio runtime.
    #[error("watches must be registered from within a tokio runtime")]
    NoRuntime,
}

/// Registrations that could not be removed while disposing.
///
/// Disposal keeps going after a failure, so every other registration has
/// already been removed when this is returned.
#[derive(Debug, Error)]
#[error("failed to remove {count} listener registration(s)", count = .failures.len())]
pub struct DisposeError {
    pub failures: Vec<ChainError>,
}
