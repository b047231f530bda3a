use std::fmt::{self, Display};

/// The kind of error that occurred.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// The model provider is rate limited, or the quota is used up.
    RateLimitExceeded,
    /// The model provider could not be reached in time.
    Unavailable,
    /// The model provider answered with something we cannot decode.
    MalformedResponse,
    /// Any other errors.
    Other,
}

impl Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorKind::RateLimitExceeded => write!(f, "Rate limit exceeded"),
            ErrorKind::Unavailable => write!(f, "Model unavailable"),
            ErrorKind::MalformedResponse => write!(f, "Malformed response"),
            ErrorKind::Other => write!(f, "Other error"),
        }
    }
}
