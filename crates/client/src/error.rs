use core::fmt::{self, Display};
use hyper::StatusCode;

#[derive(Debug, PartialEq, Eq)]
pub enum Error {
    /// The server could not be reached or the exchange broke off.
    Transport,
    /// The server answered with a non-success status.
    Status { code: StatusCode, message: String },
    /// The response body did not have the expected shape.
    Decode,
    /// Submission attempted without a single answer.
    NoAnswers,
    /// A submission is already in flight or finished.
    AlreadySubmitting,
}

impl Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Transport => f.write_str("Could not reach the server. Please try again."),
            Self::Status { message, .. } => f.write_str(message),
            Self::Decode => f.write_str("Unexpected response from the server."),
            Self::NoAnswers => f.write_str("No answers to submit"),
            Self::AlreadySubmitting => f.write_str("Test has already been submitted"),
        }
    }
}

impl std::error::Error for Error {}

pub type Result<T> = core::result::Result<T, Error>;
