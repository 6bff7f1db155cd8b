use crate::server::RouteError;
use std::fmt;
use std::io;

/// Error returned by the serve boundary and the controller.
///
/// Validation variants are raised before any state is touched. Bind failures leave
/// the controller idle with a fresh server instance.
#[derive(Debug)]
pub enum ServeError {
    /// The document argument was not a string
    InvalidDocument,
    /// The port argument was not a scalar integer, or does not fit a TCP port
    InvalidPort,
    /// The address argument was not a string
    InvalidAddress,
    /// More arguments than `document, port, address`
    TooManyArguments {
        /// Number of arguments received
        given: usize,
    },
    /// The listener could not be bound
    Bind {
        /// `address:port` that was attempted
        endpoint: String,
        source: io::Error,
    },
    /// The root route could not be bound on the server instance
    Route(RouteError),
}

impl ServeError {
    /// Whether this error was raised by argument validation.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            ServeError::InvalidDocument
                | ServeError::InvalidPort
                | ServeError::InvalidAddress
                | ServeError::TooManyArguments { .. }
        )
    }
}

impl fmt::Display for ServeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ServeError::InvalidDocument => write!(f, "serve: HTML must be a string."),
            ServeError::InvalidPort => write!(f, "serve: PORT must be a scalar integer value."),
            ServeError::InvalidAddress => write!(f, "serve: ADDR must be a character vector."),
            ServeError::TooManyArguments { given } => {
                write!(f, "serve: expected at most 3 arguments, got {}", given)
            }
            ServeError::Bind { endpoint, source } => {
                write!(f, "serve: cannot listen on {}: {}", endpoint, source)
            }
            ServeError::Route(err) => write!(f, "serve: {}", err),
        }
    }
}

impl std::error::Error for ServeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ServeError::Bind { source, .. } => Some(source),
            ServeError::Route(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RouteError> for ServeError {
    fn from(err: RouteError) -> Self {
        ServeError::Route(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn test_validation_classification() {
        assert!(ServeError::InvalidDocument.is_validation());
        assert!(ServeError::InvalidPort.is_validation());
        assert!(ServeError::InvalidAddress.is_validation());
        assert!(ServeError::TooManyArguments { given: 4 }.is_validation());

        let bind = ServeError::Bind {
            endpoint: "0.0.0.0:80".into(),
            source: io::Error::new(io::ErrorKind::AddrInUse, "in use"),
        };
        assert!(!bind.is_validation());
        assert!(bind.source().is_some());
    }

    #[test]
    fn test_messages() {
        assert_eq!(
            ServeError::InvalidDocument.to_string(),
            "serve: HTML must be a string."
        );
        assert!(ServeError::TooManyArguments { given: 5 }
            .to_string()
            .contains("got 5"));
    }
}
