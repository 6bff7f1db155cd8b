//! # Host Boundary
//!
//! The `serve` entry point as seen from an interactive host that passes loosely
//! typed values:
//!
//! - `serve()` serves the default document on `0.0.0.0:8080`
//! - `serve(document)`, `serve(document, port)`, `serve(document, port, address)`
//!   start a listener or swap the served document
//! - `serve(0)` stops the listener
//!
//! Every argument is validated before the controller is touched, so a bad call
//! never disturbs a running listener.

use crate::controller::{ControllerState, ServerController, StopOutcome};
use crate::document::DEFAULT_DOCUMENT;
use crate::error::ServeError;
use crate::lock::HostLock;
use crate::server::{DEFAULT_ADDRESS, DEFAULT_PORT};
use std::fmt;

/// A value passed in from the host.
#[derive(Debug, Clone, PartialEq)]
pub enum HostValue {
    Str(String),
    Int(i64),
    Real(f64),
    Bool(bool),
}

impl HostValue {
    fn is_zero(&self) -> bool {
        match self {
            HostValue::Int(n) => *n == 0,
            HostValue::Real(x) => *x == 0.0,
            _ => false,
        }
    }

    fn as_port(&self) -> Option<u16> {
        match self {
            HostValue::Int(n) => u16::try_from(*n).ok(),
            HostValue::Real(x) if x.fract() == 0.0 && (0.0..=65535.0).contains(x) => {
                Some(*x as u16)
            }
            _ => None,
        }
    }
}

impl From<&str> for HostValue {
    fn from(s: &str) -> Self {
        HostValue::Str(s.to_string())
    }
}

impl From<String> for HostValue {
    fn from(s: String) -> Self {
        HostValue::Str(s)
    }
}

impl From<i64> for HostValue {
    fn from(n: i64) -> Self {
        HostValue::Int(n)
    }
}

impl From<f64> for HostValue {
    fn from(x: f64) -> Self {
        HostValue::Real(x)
    }
}

impl From<bool> for HostValue {
    fn from(b: bool) -> Self {
        HostValue::Bool(b)
    }
}

impl fmt::Display for HostValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HostValue::Str(s) => write!(f, "{:?}", s),
            HostValue::Int(n) => write!(f, "{}", n),
            HostValue::Real(x) => write!(f, "{}", x),
            HostValue::Bool(b) => write!(f, "{}", b),
        }
    }
}

/// A validated `serve` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServeRequest {
    Start {
        document: String,
        port: u16,
        address: String,
    },
    Stop,
}

impl ServeRequest {
    /// Validate host arguments.
    ///
    /// # Errors
    ///
    /// A validation [`ServeError`] naming the first offending argument.
    pub fn parse(args: &[HostValue]) -> Result<Self, ServeError> {
        if args.len() > 3 {
            return Err(ServeError::TooManyArguments { given: args.len() });
        }

        let document = match args.first() {
            None => DEFAULT_DOCUMENT.to_string(),
            Some(v) if v.is_zero() => return Ok(ServeRequest::Stop),
            Some(HostValue::Str(s)) => s.clone(),
            Some(_) => return Err(ServeError::InvalidDocument),
        };

        let port = match args.get(1) {
            None => DEFAULT_PORT,
            Some(v) => v.as_port().ok_or(ServeError::InvalidPort)?,
        };

        let address = match args.get(2) {
            None => DEFAULT_ADDRESS.to_string(),
            Some(HostValue::Str(s)) => s.clone(),
            Some(_) => return Err(ServeError::InvalidAddress),
        };

        Ok(ServeRequest::Start {
            document,
            port,
            address,
        })
    }
}

/// What a `serve` call did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServeOutcome {
    Serving(ControllerState),
    Stopped(StopOutcome),
}

/// Validate `args` and drive `controller` accordingly.
///
/// # Errors
///
/// Validation errors (controller untouched) or a bind error from the controller.
pub fn serve<L: HostLock>(
    controller: &ServerController<L>,
    args: &[HostValue],
) -> Result<ServeOutcome, ServeError> {
    match ServeRequest::parse(args)? {
        ServeRequest::Start {
            document,
            port,
            address,
        } => controller
            .start(&document, &address, port)
            .map(ServeOutcome::Serving),
        ServeRequest::Stop => Ok(ServeOutcome::Stopped(controller.stop())),
    }
}
