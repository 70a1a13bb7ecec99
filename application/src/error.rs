//! [`Error`]-related definitions.

use std::{fmt, io};

use derive_more::Error as StdError;
use itertools::Itertools as _;
use serde::{ser::SerializeStruct as _, Serialize, Serializer};
use service::{
    error::ConfigurationError, infra::document::DecodeError,
};
use tracerr::{Trace, Traced};

/// Reported [`Error`].
#[derive(Clone, Debug, StdError)]
pub struct Error {
    /// [`Error`] code.
    pub code: Code,

    /// Backtrace of this [`Error`].
    #[error(not(backtrace))]
    pub backtrace: Option<Trace>,

    /// [`Error`] message.
    pub message: String,
}

impl Error {
    /// Create a new [`Error`] representing an unexpected failure.
    #[must_use]
    pub fn internal(msg: &impl ToString) -> Self {
        Self {
            code: "INTERNAL_ERROR",
            message: msg.to_string(),
            backtrace: None,
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Self {
            code,
            backtrace,
            message,
        } = self;

        write!(
            f,
            "[{code}]: {message}{}",
            backtrace
                .iter()
                .format_with("\n", |trace, f| f(&format_args!("\n{trace}"))),
        )
    }
}

impl Serialize for Error {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut s = serializer.serialize_struct("Error", 3)?;
        s.serialize_field("code", self.code)?;
        s.serialize_field("message", &self.message)?;
        s.serialize_field(
            "backtrace",
            &self
                .backtrace
                .iter()
                .flat_map(|trace| trace.iter())
                .map(ToString::to_string)
                .collect::<Vec<_>>(),
        )?;
        s.end()
    }
}

/// [`Error`] code.
pub type Code = &'static str;

/// Helper trait for converting types into [`Error`]s.
pub trait AsError {
    /// Tries to convert the type into an [`Error`].
    ///
    /// [`None`] is returned if the type cannot be converted into an [`Error`].
    fn try_as_error(&self) -> Option<Error>;

    /// Converts the type into an [`Error`].
    fn as_error(&self) -> Error
    where
        Self: fmt::Display,
    {
        self.try_as_error()
            .unwrap_or_else(|| Error::internal(&self))
    }

    /// Converts the type into an [`Error`] by consuming it.
    fn into_error(self) -> Error
    where
        Self: fmt::Display + Sized,
    {
        self.as_error()
    }
}

impl<E: AsError> AsError for Traced<E> {
    fn try_as_error(&self) -> Option<Error> {
        let mut error = self.as_ref().try_as_error()?;
        error.backtrace = Some(self.trace().clone());
        Some(error)
    }
}

impl AsError for ConfigurationError {
    fn try_as_error(&self) -> Option<Error> {
        let code = match self {
            Self::ParentNotExists { .. } => "PARENT_NOT_EXISTS",
            Self::RootNotExists(_) => "ROOT_NOT_EXISTS",
            Self::AmendmentNotInFamily { .. } => "AMENDMENT_NOT_IN_FAMILY",
            Self::NoPredecessor(_) => "NO_PREDECESSOR",
            Self::InvalidDate { .. } => "INVALID_DATE",
        };
        Some(Error {
            code,
            message: self.to_string(),
            backtrace: None,
        })
    }
}

impl AsError for DecodeError {
    fn try_as_error(&self) -> Option<Error> {
        let code = match self {
            Self::Json(_) => "MALFORMED_DOCUMENT",
            Self::MissingAmendment(_) | Self::MissingParent(_) => {
                "MALFORMED_RECORD"
            }
        };
        Some(Error {
            code,
            message: self.to_string(),
            backtrace: None,
        })
    }
}

impl AsError for io::Error {
    fn try_as_error(&self) -> Option<Error> {
        Some(Error {
            code: "DOCUMENT_UNREADABLE",
            message: self.to_string(),
            backtrace: None,
        })
    }
}

impl AsError for serde_json::Error {
    fn try_as_error(&self) -> Option<Error> {
        None
    }
}
