#![cfg_attr(not(test), no_std)]
extern crate alloc;

pub mod page;
pub mod question;
pub mod score;
pub mod validate;

pub use page::{Page, PageInfo, PageRequest};
pub use question::{Changes, Draft, NewQuestion, Patch, PublicQuestion, Question, QuestionId};
pub use score::{Answer, Band, Standing, Submission, TestResult};
pub use validate::FieldError;
