use serde::Serialize;

/// A single rejected input field, reported back to the caller as-is.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: &'static str,
    pub message: &'static str,
}

pub const TEXT_REQUIRED: FieldError = FieldError { field: "text", message: "Question text is required" };
pub const OPTIONS_COUNT: FieldError = FieldError { field: "options", message: "Exactly 4 options are required" };
pub const ANSWER_RANGE: FieldError =
    FieldError { field: "correctAnswerIndex", message: "Valid correct answer index is required" };

/// Trims the question text, rejecting blank input.
pub fn text(raw: &str) -> Result<&str, FieldError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        Err(TEXT_REQUIRED)
    } else {
        Ok(trimmed)
    }
}

/// Checks the option list has exactly [`OPTION_COUNT`](crate::question::OPTION_COUNT) entries.
pub fn options<T>(raw: alloc::vec::Vec<T>) -> Result<[T; crate::question::OPTION_COUNT], FieldError> {
    raw.try_into().map_err(|_| OPTIONS_COUNT)
}

/// The index must point into the option list.
pub fn answer(raw: i64) -> Result<u8, FieldError> {
    match u8::try_from(raw) {
        Ok(index) if usize::from(index) < crate::question::OPTION_COUNT => Ok(index),
        _ => Err(ANSWER_RANGE),
    }
}
