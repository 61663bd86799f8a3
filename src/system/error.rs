use std::io;

use thiserror::Error;

/// Failure reading an OS counter or table.
///
/// Only the probe layer returns these; the sampler turns every variant into
/// an empty or skipped result.
#[derive(Debug, Error)]
pub enum ProbeError {
    #[error("permission denied")]
    PermissionDenied,
    #[error("process or resource no longer exists")]
    NotFound,
    #[error("not supported on this platform")]
    Unsupported,
    #[error("malformed OS data: {0}")]
    Parse(String),
    #[error("os error: {0}")]
    Io(io::Error),
}

impl From<io::Error> for ProbeError {
    fn from(err: io::Error) -> Self {
        match err.kind() {
            io::ErrorKind::PermissionDenied => ProbeError::PermissionDenied,
            io::ErrorKind::NotFound => ProbeError::NotFound,
            _ => ProbeError::Io(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn io_kinds_map_to_dedicated_variants() {
        let denied = io::Error::from(io::ErrorKind::PermissionDenied);
        assert!(matches!(ProbeError::from(denied), ProbeError::PermissionDenied));

        let missing = io::Error::from(io::ErrorKind::NotFound);
        assert!(matches!(ProbeError::from(missing), ProbeError::NotFound));

        let other = io::Error::other("boom");
        assert!(matches!(ProbeError::from(other), ProbeError::Io(_)));
    }
}
