//! Precondition errors and the fail-fast policy.

use std::fmt;
use thiserror::Error;
use tracing::error;

pub type Result<T> = std::result::Result<T, HeaderError>;

/// Which header an operation was missing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeaderKind {
    Ip,
    Tcp,
}

impl fmt::Display for HeaderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HeaderKind::Ip => f.write_str("IP"),
            HeaderKind::Tcp => f.write_str("TCP"),
        }
    }
}

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeaderError {
    /// An operation was handed no header to work on.
    #[error("{header} header is missing")]
    Missing { header: HeaderKind },
}

/// Turns an absent header reference into [`HeaderError::Missing`].
pub fn require<T>(header: Option<T>, kind: HeaderKind) -> Result<T> {
    header.ok_or(HeaderError::Missing { header: kind })
}

/// Exit status used when a precondition is violated.
pub const PRECONDITION_EXIT_CODE: i32 = -libc::EINVAL;

/// Terminates the process on a precondition violation instead of
/// propagating it.
///
/// Missing headers are programming errors, so the default is to report and
/// exit with `-EINVAL`. Callers that want to recover match on the
/// [`Result`] instead.
pub trait OrAbort<T> {
    fn or_abort(self) -> T;
}

impl<T> OrAbort<T> for Result<T> {
    fn or_abort(self) -> T {
        match self {
            Ok(value) => value,
            Err(err) => {
                error!(%err, "header precondition violated, aborting");
                eprintln!("{err}");
                std::process::exit(PRECONDITION_EXIT_CODE)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn require_passes_present_values_through() {
        assert_eq!(require(Some(7u8), HeaderKind::Ip), Ok(7));
        assert_eq!(Ok::<_, HeaderError>(3).or_abort(), 3);
    }

    #[test]
    fn require_reports_missing_header() {
        let err = require(None::<u8>, HeaderKind::Tcp).unwrap_err();
        assert_eq!(err, HeaderError::Missing { header: HeaderKind::Tcp });
        assert_eq!(err.to_string(), "TCP header is missing");
    }
}
