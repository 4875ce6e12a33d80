use alloc::string::{String, ToString};
use core::fmt::{self, Display};

#[derive(Debug, PartialEq, Eq)]
pub enum Error {
    /// The record violates a table constraint.
    BadInput,
    /// No question has the requested identifier.
    NotFound,
    /// Unrecoverable error, with its cause.
    Fatal(String),
}

impl Error {
    /// Logs `cause` and wraps it as [`Error::Fatal`].
    pub fn fatal(cause: impl Display) -> Self {
        let cause = cause.to_string();
        log::error!("store failure: {cause}");
        Self::Fatal(cause)
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BadInput => f.write_str("record violates a question constraint"),
            Self::NotFound => f.write_str("question not found"),
            Self::Fatal(cause) => write!(f, "unrecoverable store error: {cause}"),
        }
    }
}

pub type Result<T> = core::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::Error;

    #[test]
    fn fatal_keeps_its_cause() {
        let err = Error::fatal("connection reset by peer");
        assert_eq!(err, Error::Fatal(String::from("connection reset by peer")));
        assert_eq!(err.to_string(), "unrecoverable store error: connection reset by peer");
    }
}
