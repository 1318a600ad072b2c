use std::io;
use std::result;

use cdrs_tokio::cluster::session::SessionBuildError;
use thiserror::Error as ThisError;

pub type Result<T> = result::Result<T, Error>;

/// Errors raised while copying rows. Usage problems and an operator abort are detected locally,
/// before any network I/O; everything else comes from the cluster or from decoding what it
/// returned.
#[derive(Debug, ThisError)]
pub enum Error {
    /// Help was requested; carries the rendered text.
    #[error("{0}")]
    Help(String),
    /// Wrong number or shape of command line arguments.
    #[error("Usage error: {0}")]
    Usage(String),
    /// The cluster endpoint argument is not a list literal of strings.
    #[error("CLUSTER_IPS must be a list: {0}")]
    InvalidClusterList(String),
    /// The operator answered `n` at the confirmation prompt.
    #[error("Aborted")]
    Aborted,
    /// Error reported by the Cassandra driver or by the server.
    #[error("Cassandra error: {0}")]
    Cassandra(#[from] cdrs_tokio::error::Error),
    /// A session bound to a keyspace could not be established.
    #[error("Session error: {0}")]
    Session(#[from] SessionBuildError),
    /// The server answered with something other than a result set.
    #[error("Unexpected result: {0}")]
    UnexpectedResult(String),
    /// A cell could not be decoded according to its column type.
    #[error("Cannot decode column '{column}': {reason}")]
    Decode { column: String, reason: String },
    /// Terminal IO error.
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

impl Error {
    /// Errors which should be answered by printing usage and exiting without touching the
    /// cluster.
    pub fn is_usage(&self) -> bool {
        matches!(self, Error::Usage(_) | Error::InvalidClusterList(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_wrap_session_build_errors() {
        let error = Error::from(SessionBuildError::SessionInitFailed);

        assert!(matches!(error, Error::Session(SessionBuildError::SessionInitFailed)));
        assert!(!error.is_usage());
    }

    #[test]
    fn should_classify_usage_errors() {
        assert!(Error::Usage("missing TABLE".into()).is_usage());
        assert!(Error::InvalidClusterList("the list is empty".into()).is_usage());
        assert!(!Error::Aborted.is_usage());
        assert!(!Error::Help("USAGE".into()).is_usage());
    }
}
