use crate::validate::{self, FieldError};
use alloc::{string::String, vec::Vec};
use chrono::{DateTime, Utc};
use core::num::NonZeroI64;
use serde::{Deserialize, Serialize};

/// Every question offers exactly this many choices.
pub const OPTION_COUNT: usize = 4;

/// Store-assigned identifier of a question.
pub type QuestionId = NonZeroI64;

/// A multiple-choice question as persisted by the store.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    pub id: QuestionId,
    /// Prompt shown to the test taker.
    pub text: String,
    /// Possible answers to select from.
    pub options: [String; OPTION_COUNT],
    /// Index into `options` of the correct answer.
    pub correct_answer_index: u8,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Question {
    /// Overwrites the fields present in `changes`. Timestamps are left to the store.
    pub fn apply(&mut self, changes: Changes) {
        let Changes { text, options, correct_answer_index } = changes;
        if let Some(text) = text {
            self.text = text;
        }
        if let Some(options) = options {
            self.options = options;
        }
        if let Some(index) = correct_answer_index {
            self.correct_answer_index = index;
        }
    }
}

/// The test-taker's view of a [`Question`]. There is no answer field to leak.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicQuestion {
    pub id: QuestionId,
    pub text: String,
    pub options: [String; OPTION_COUNT],
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Question> for PublicQuestion {
    fn from(Question { id, text, options, created_at, updated_at, .. }: Question) -> Self {
        Self { id, text, options, created_at, updated_at }
    }
}

/// A validated question that has not been stored yet.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NewQuestion {
    pub text: String,
    pub options: [String; OPTION_COUNT],
    pub correct_answer_index: u8,
}

/// Raw body of a creation request. Every field is optional here so that all
/// missing or invalid fields can be reported at once.
#[derive(Debug, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Draft {
    pub text: Option<String>,
    pub options: Option<Vec<String>>,
    pub correct_answer_index: Option<i64>,
}

impl Draft {
    pub fn validate(self) -> Result<NewQuestion, Vec<FieldError>> {
        let mut errors = Vec::new();

        let text = self.text.as_deref().unwrap_or_default();
        let text = validate::text(text).map_err(|err| errors.push(err)).ok();
        let options = match self.options {
            Some(options) => validate::options(options).map_err(|err| errors.push(err)).ok(),
            None => {
                errors.push(validate::OPTIONS_COUNT);
                None
            }
        };
        let index = match self.correct_answer_index {
            Some(index) => validate::answer(index).map_err(|err| errors.push(err)).ok(),
            None => {
                errors.push(validate::ANSWER_RANGE);
                None
            }
        };

        match (text, options, index) {
            (Some(text), Some(options), Some(correct_answer_index)) if errors.is_empty() => {
                Ok(NewQuestion { text: text.into(), options, correct_answer_index })
            }
            _ => Err(errors),
        }
    }
}

/// Raw body of an update request. Absent fields are left untouched.
#[derive(Debug, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Patch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub correct_answer_index: Option<i64>,
}

/// A validated [`Patch`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Changes {
    pub text: Option<String>,
    pub options: Option<[String; OPTION_COUNT]>,
    pub correct_answer_index: Option<u8>,
}

impl Patch {
    /// Blank text counts as "not supplied". An index of zero is a real update.
    pub fn validate(self) -> Result<Changes, Vec<FieldError>> {
        let mut errors = Vec::new();

        let text = self.text.as_deref().map(str::trim).filter(|text| !text.is_empty()).map(String::from);
        let options = self.options.and_then(|options| validate::options(options).map_err(|err| errors.push(err)).ok());
        let correct_answer_index = self
            .correct_answer_index
            .and_then(|index| validate::answer(index).map_err(|err| errors.push(err)).ok());

        if errors.is_empty() {
            Ok(Changes { text, options, correct_answer_index })
        } else {
            Err(errors)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Changes, Draft, Patch, PublicQuestion, Question};
    use crate::validate;
    use chrono::{TimeZone, Utc};
    use core::num::NonZeroI64;

    fn sample() -> Question {
        let at = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        Question {
            id: NonZeroI64::new(7).unwrap(),
            text: String::from("What is the capital of France?"),
            options: ["Berlin", "Paris", "Rome", "Madrid"].map(String::from),
            correct_answer_index: 1,
            created_at: at,
            updated_at: at,
        }
    }

    #[test]
    fn draft_reports_every_bad_field() {
        let draft = Draft { text: Some(String::from("   ")), options: Some(vec![String::from("a")]), correct_answer_index: Some(9) };
        let errors = draft.validate().unwrap_err();
        assert_eq!(errors, [validate::TEXT_REQUIRED, validate::OPTIONS_COUNT, validate::ANSWER_RANGE]);

        let errors = Draft::default().validate().unwrap_err();
        assert_eq!(errors.len(), 3);
    }

    #[test]
    fn draft_accepts_valid_question() {
        let draft: Draft = serde_json::from_str(
            r#"{"text":"  Pick one  ","options":["a","b","c","d"],"correctAnswerIndex":0}"#,
        )
        .unwrap();
        let new = draft.validate().unwrap();
        assert_eq!(new.text, "Pick one");
        assert_eq!(new.options, ["a", "b", "c", "d"].map(String::from));
        assert_eq!(new.correct_answer_index, 0);
    }

    #[test]
    fn patch_keeps_zero_index_and_skips_blank_text() {
        let patch: Patch = serde_json::from_str(r#"{"text":"","correctAnswerIndex":0}"#).unwrap();
        let changes = patch.validate().unwrap();
        assert_eq!(changes, Changes { text: None, options: None, correct_answer_index: Some(0) });

        let mut question = sample();
        question.apply(changes);
        assert_eq!(question.text, "What is the capital of France?");
        assert_eq!(question.correct_answer_index, 0);
    }

    #[test]
    fn patch_rejects_wrong_option_count() {
        let patch = Patch { options: Some(vec![String::from("a"), String::from("b")]), ..Default::default() };
        assert_eq!(patch.validate().unwrap_err(), [validate::OPTIONS_COUNT]);
    }

    #[test]
    fn public_question_has_no_answer() {
        let public = PublicQuestion::from(sample());
        let json = serde_json::to_value(&public).unwrap();
        assert!(json.get("correctAnswerIndex").is_none());
        assert_eq!(json["options"].as_array().unwrap().len(), 4);

        let full = serde_json::to_value(sample()).unwrap();
        assert_eq!(full["correctAnswerIndex"], 1);
        assert_eq!(full["id"], 7);
    }
}
