use std::io;
use thiserror::Error;

/// Category of a failure while reading a .bvh file.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseErrorKind {
    #[error("malformed section header")]
    MalformedHeader,
    #[error("unknown node type")]
    UnknownNodeType,
    #[error("expected opening `{{`")]
    MissingBraceOpen,
    #[error("invalid OFFSET")]
    InvalidOffset,
    #[error("invalid CHANNELS declaration")]
    InvalidChannelSpec,
    #[error("unknown channel")]
    UnknownChannel,
    #[error("invalid frame count")]
    InvalidFrameCount,
    #[error("invalid frame time")]
    InvalidFrameTime,
    #[error("not enough values in motion row")]
    TruncatedFrameData,
    #[error("motion value is not a finite number")]
    InvalidFrameValue,
    #[error("unconsumed values at the end of motion row")]
    TrailingFrameData,
    #[error("more than one ROOT")]
    MultipleRoots,
    #[error("End Site cannot have children")]
    EndSiteChildren,
    #[error("unexpected end of input")]
    UnexpectedEof,
}

/// A fatal parse failure, pinned to the offending line.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("{kind} at line {line}: `{text}`")]
pub struct ParseError {
    pub kind: ParseErrorKind,
    /// 1-based line number in the input
    pub line: usize,
    /// raw line text (empty when the input ended early)
    pub text: String,
}

impl ParseError {
    pub fn new(kind: ParseErrorKind, line: usize, text: impl Into<String>) -> Self {
        ParseError {
            kind,
            line,
            text: text.into(),
        }
    }
}

/// Returned when an Euler order string is not one of the six supported orders.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unsupported rotation order: `{0}`")]
pub struct UnsupportedRotationOrder(pub String);

#[derive(Error, Debug)]
pub enum BvhError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    UnsupportedRotationOrder(#[from] UnsupportedRotationOrder),
}

pub type Result<T> = std::result::Result<T, BvhError>;
