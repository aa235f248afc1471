//! Error type shared by the HTTP model builders and the JSONL codec.

use thiserror::Error;

/// Errors raised while building model values or reading/writing exchanges.
#[derive(Debug, Error)]
pub enum Error {
    /// A required JSON field is missing or has the wrong shape.
    #[error("malformed input at `{path}`: {reason}")]
    MalformedInput { path: String, reason: String },

    /// A method or protocol string that is not part of the closed enumeration.
    #[error("unrecognized {kind} `{value}`")]
    UnrecognizedEnumValue { kind: &'static str, value: String },

    /// A builder invariant was violated.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// `build()` was called before a required field was set.
    #[error("{entity} is missing required field `{field}`")]
    MissingField {
        entity: &'static str,
        field: &'static str,
    },

    /// Percent-decoding or UTF-8 decoding failed.
    #[error("decode error: {0}")]
    Decode(String),

    /// The input is not valid JSON.
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// Any error raised while parsing one line of a JSONL stream.
    #[error("line {line}: {source}")]
    Line {
        line: usize,
        #[source]
        source: Box<Error>,
    },

    #[error("line {line} exceeds the maximum line size of {limit} bytes")]
    LineTooLong { line: usize, limit: usize },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    pub(crate) fn malformed(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Error::MalformedInput {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Wraps an error with the JSONL line number it was raised on.
    pub(crate) fn at_line(self, line: usize) -> Self {
        match self {
            err @ (Error::Line { .. } | Error::LineTooLong { .. }) => err,
            err => Error::Line {
                line,
                source: Box::new(err),
            },
        }
    }

    /// Maps an I/O error from a text source, turning invalid UTF-8 into [`Error::Decode`].
    pub(crate) fn from_text_io(err: std::io::Error) -> Self {
        if err.kind() == std::io::ErrorKind::InvalidData {
            Error::Decode(format!("input is not valid UTF-8: {err}"))
        } else {
            Error::Io(err)
        }
    }

    /// The innermost error, looking through [`Error::Line`] wrappers.
    pub fn root(&self) -> &Error {
        match self {
            Error::Line { source, .. } => source.root(),
            err => err,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::malformed("request.method", "missing field");
        assert_eq!(
            err.to_string(),
            "malformed input at `request.method`: missing field"
        );

        let err = Error::MissingField {
            entity: "HttpRequest",
            field: "url",
        };
        assert_eq!(err.to_string(), "HttpRequest is missing required field `url`");
    }

    #[test]
    fn test_line_wrapping_is_not_nested() {
        let err = Error::InvalidArgument("x".into()).at_line(3).at_line(7);
        match &err {
            Error::Line { line, .. } => assert_eq!(*line, 3),
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(matches!(err.root(), Error::InvalidArgument(_)));
        assert!(err.to_string().starts_with("line 3: "));
    }

    #[test]
    fn test_invalid_utf8_io_error_is_decode() {
        let io = std::io::Error::new(std::io::ErrorKind::InvalidData, "bad bytes");
        assert!(matches!(Error::from_text_io(io), Error::Decode(_)));

        let io = std::io::Error::new(std::io::ErrorKind::BrokenPipe, "gone");
        assert!(matches!(Error::from_text_io(io), Error::Io(_)));
    }
}
