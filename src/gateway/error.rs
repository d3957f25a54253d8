//! Errors that abort a solver invocation outright.
//!
//! Everything else (timeouts, crashes, missing or malformed output) is
//! reported through [`SolverStatus`](super::SolverStatus) on the returned job.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum GatewayError {
    /// A handoff directory could not be created or resolved.
    #[error("cannot prepare solver directory {}: {source}", .path.display())]
    Workspace {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn workspace_display() {
        let err = GatewayError::Workspace {
            path: PathBuf::from("/srv/solver/input"),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        };
        assert_eq!(
            err.to_string(),
            "cannot prepare solver directory /srv/solver/input: denied"
        );
    }

    #[test]
    fn error_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<GatewayError>();
    }
}
