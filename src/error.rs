//! All errors related to parsing commit messages.

use std::fmt;

/// Why a single parser did not match.
///
/// Parsers return these as values; nothing in the engine panics on bad input.
#[derive(Clone, Debug, Eq, PartialEq, thiserror::Error)]
#[non_exhaustive]
pub enum ParseError {
    /// A primitive (`tag`, `literal_rune`, `regex`, `empty`) did not recognize
    /// the input at the current position.
    #[error("expected {expected}, found {found:?}")]
    NoMatch {
        /// The literal or pattern that was attempted.
        expected: String,
        /// The start of the offending input.
        found: String,
    },

    /// Every branch of an alternation failed.
    #[error("no alternative matched {found:?}")]
    Exhausted {
        /// The start of the offending input.
        found: String,
    },

    /// A negative lookahead saw what it must not see.
    #[error("unexpected match at {found:?}")]
    Unexpected {
        /// The start of the offending input.
        found: String,
    },

    /// `take_until` ran out of input before its stop condition matched.
    #[error("stop condition never matched in {found:?}")]
    Unterminated {
        /// The start of the offending input.
        found: String,
    },

    /// `many1` matched zero repetitions.
    #[error("expected at least one repetition at {found:?}")]
    Vacuous {
        /// The start of the offending input.
        found: String,
    },
}

const SNIPPET_LEN: usize = 20;

impl ParseError {
    pub(crate) fn no_match(expected: impl Into<String>, input: &str) -> Self {
        Self::NoMatch {
            expected: expected.into(),
            found: snippet(input),
        }
    }

    pub(crate) fn exhausted(input: &str) -> Self {
        Self::Exhausted {
            found: snippet(input),
        }
    }

    pub(crate) fn unexpected(input: &str) -> Self {
        Self::Unexpected {
            found: snippet(input),
        }
    }

    pub(crate) fn unterminated(input: &str) -> Self {
        Self::Unterminated {
            found: snippet(input),
        }
    }

    pub(crate) fn vacuous(input: &str) -> Self {
        Self::Vacuous {
            found: snippet(input),
        }
    }
}

fn snippet(input: &str) -> String {
    input.chars().take(SNIPPET_LEN).collect()
}

/// The error returned when a commit message does not match the grammar to
/// completion.
///
/// A best-effort parse still yields whatever was recognized before the error;
/// see [`parse_as_much_as_possible`][crate::parse_as_much_as_possible].
#[derive(Clone, Debug, Eq, PartialEq, thiserror::Error)]
#[error("{kind} at offset {offset}")]
pub struct Error {
    kind: ErrorKind,

    offset: usize,

    #[source]
    cause: Option<ParseError>,
}

impl Error {
    /// Create a new error from a `ErrorKind`.
    pub(crate) fn new(kind: ErrorKind, offset: usize) -> Self {
        Self {
            kind,
            offset,
            cause: None,
        }
    }

    pub(crate) fn with_cause(kind: ErrorKind, offset: usize, cause: ParseError) -> Self {
        Self {
            kind,
            offset,
            cause: Some(cause),
        }
    }

    /// The kind of error.
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// How many code points of the message were accepted before the error.
    pub fn offset(&self) -> usize {
        self.offset
    }
}

/// All possible error kinds returned when parsing a commit message.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
#[non_exhaustive]
pub enum ErrorKind {
    /// The commit type is missing from the commit message.
    ///
    /// Not currently produced: an empty type parses, and is reported by
    /// [`crate::Convention::check`] instead.
    MissingType,

    /// The `: ` between the header's type/scope and its description is missing.
    MissingSeparator,

    /// The description of the commit is missing.
    ///
    /// Not currently produced: an empty description parses, and is reported
    /// by [`crate::Convention::check`] instead.
    MissingDescription,

    /// An optional part of the message failed in a way it never should.
    ///
    /// Not currently produced, since optional parts always match.
    InvalidFormat,

    /// Input remained after the footers.
    TrailingInput,

    /// The parse tree had a shape that cannot be turned into a record.
    UnexpectedNode,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingType => f.write_str("missing type definition"),
            Self::MissingSeparator => f.write_str("missing `: ` after the commit type"),
            Self::MissingDescription => f.write_str("missing commit description"),
            Self::InvalidFormat => f.write_str("invalid commit format"),
            Self::TrailingInput => f.write_str("unparsed input after the footers"),
            Self::UnexpectedNode => f.write_str("unexpected parse tree shape"),
        }
    }
}
