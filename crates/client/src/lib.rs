//! Client side of the mock test: talks to the server over HTTP and keeps the
//! state of a test attempt and of the admin screen.

pub mod admin;
pub mod answers;
pub mod error;
pub mod http;
pub mod session;
pub mod timer;

pub use admin::AdminBoard;
pub use answers::Answers;
pub use http::Client;
pub use session::{Phase, TestSession, Tick};
pub use timer::{format_clock, Countdown, Urgency};
