use crate::question::QuestionId;
use alloc::vec::Vec;
use serde::{Deserialize, Serialize};

/// The option a test taker picked for one question. The identifier is kept
/// raw so that a zero or unknown id is scored rather than rejected.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Answer {
    pub question_id: i64,
    pub selected_option: u32,
}

/// Body of a submission. A missing list deserializes as empty so that it is
/// rejected by the same check as an empty one.
#[derive(Debug, Default, Deserialize, Serialize)]
pub struct Submission {
    #[serde(default)]
    pub answers: Vec<Answer>,
}

#[derive(Clone, Copy, Debug, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TestResult {
    pub correct_count: usize,
    pub total: usize,
    /// Share of correct answers out of 100, rounded to two decimal places.
    pub percentage: f64,
}

impl TestResult {
    /// Scores `answers` against an answer key. Answers whose question the key
    /// does not know are counted in the total but never credited.
    ///
    /// Returns `None` for an empty submission, which has no defined percentage.
    pub fn tally<K>(answers: &[Answer], mut key: K) -> Option<Self>
    where
        K: FnMut(QuestionId) -> Option<u8>,
    {
        let total = answers.len();
        if total == 0 {
            return None;
        }

        let correct_count = answers
            .iter()
            .filter(|Answer { question_id, selected_option }| {
                QuestionId::new(*question_id)
                    .and_then(&mut key)
                    .is_some_and(|correct| u32::from(correct) == *selected_option)
            })
            .count();

        Some(Self { correct_count, total, percentage: percentage(correct_count, total) })
    }

    pub fn band(&self) -> Band {
        Band::from_percentage(self.percentage)
    }

    pub fn standing(&self) -> Standing {
        Standing::from_percentage(self.percentage)
    }
}

/// Rounds half away from zero in integer hundredths to avoid float rounding.
fn percentage(correct: usize, total: usize) -> f64 {
    let correct = correct as u128;
    let total = total as u128;
    let hundredths = (correct * 20_000 + total) / (total * 2);
    hundredths as f64 / 100.0
}

/// IELTS-style band awarded for a percentage.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum Band {
    Three,
    Four,
    Five,
    Six,
    Seven,
    Eight,
    Nine,
}

impl Band {
    pub fn from_percentage(percentage: f64) -> Self {
        const THRESHOLDS: [(f64, Band); 6] = [
            (90.0, Band::Nine),
            (80.0, Band::Eight),
            (70.0, Band::Seven),
            (60.0, Band::Six),
            (50.0, Band::Five),
            (40.0, Band::Four),
        ];
        THRESHOLDS.into_iter().find_map(|(min, band)| (percentage >= min).then_some(band)).unwrap_or(Self::Three)
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Three => "3.0",
            Self::Four => "4.0",
            Self::Five => "5.0",
            Self::Six => "6.0",
            Self::Seven => "7.0",
            Self::Eight => "8.0",
            Self::Nine => "9.0",
        }
    }
}

impl core::fmt::Display for Band {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Coarse verdict shown next to a result.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Standing {
    Excellent,
    Good,
    NeedsPractice,
}

impl Standing {
    pub fn from_percentage(percentage: f64) -> Self {
        if percentage >= 80.0 {
            Self::Excellent
        } else if percentage >= 60.0 {
            Self::Good
        } else {
            Self::NeedsPractice
        }
    }

    pub const fn message(self) -> &'static str {
        match self {
            Self::Excellent => "Excellent performance!",
            Self::Good => "Good job! Keep practicing.",
            Self::NeedsPractice => "Keep studying and try again.",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Answer, Band, Standing, Submission, TestResult};
    use crate::question::QuestionId;

    fn key(question: QuestionId) -> Option<u8> {
        match question.get() {
            1 => Some(0),
            2 => Some(2),
            3 => Some(3),
            _ => None,
        }
    }

    #[test]
    fn half_correct() {
        let answers = [Answer { question_id: 1, selected_option: 0 }, Answer { question_id: 2, selected_option: 1 }];
        let result = TestResult::tally(&answers, key).unwrap();
        assert_eq!(result, TestResult { correct_count: 1, total: 2, percentage: 50.0 });
    }

    #[test]
    fn unknown_questions_count_against_total() {
        let answers = [
            Answer { question_id: 3, selected_option: 3 },
            Answer { question_id: 99, selected_option: 0 },
            Answer { question_id: 100, selected_option: 1 },
        ];
        let result = TestResult::tally(&answers, key).unwrap();
        assert_eq!(result.correct_count, 1);
        assert_eq!(result.total, 3);
        assert_eq!(result.percentage, 33.33);
    }

    #[test]
    fn zero_identifier_earns_no_credit() {
        let answers = [Answer { question_id: 1, selected_option: 0 }, Answer { question_id: 0, selected_option: 0 }];
        let result = TestResult::tally(&answers, key).unwrap();
        assert_eq!((result.correct_count, result.total), (1, 2));
    }

    #[test]
    fn empty_submission_has_no_result() {
        assert!(TestResult::tally(&[], key).is_none());
    }

    #[test]
    fn percentage_rounds_to_hundredths() {
        assert_eq!(super::percentage(2, 3), 66.67);
        assert_eq!(super::percentage(1, 8), 12.5);
        assert_eq!(super::percentage(0, 7), 0.0);
        assert_eq!(super::percentage(7, 7), 100.0);
    }

    #[test]
    fn band_thresholds() {
        assert_eq!(Band::from_percentage(100.0), Band::Nine);
        assert_eq!(Band::from_percentage(90.0), Band::Nine);
        assert_eq!(Band::from_percentage(89.99), Band::Eight);
        assert_eq!(Band::from_percentage(55.0), Band::Five);
        assert_eq!(Band::from_percentage(39.99), Band::Three);
        assert_eq!(Band::Seven.to_string(), "7.0");
    }

    #[test]
    fn standing_thresholds() {
        assert_eq!(Standing::from_percentage(80.0), Standing::Excellent);
        assert_eq!(Standing::from_percentage(79.99), Standing::Good);
        assert_eq!(Standing::from_percentage(59.0), Standing::NeedsPractice);
    }

    #[test]
    fn missing_answers_deserialize_empty() {
        let sub: Submission = serde_json::from_str("{}").unwrap();
        assert!(sub.answers.is_empty());

        let sub: Submission = serde_json::from_str(r#"{"answers":[{"questionId":4,"selectedOption":2}]}"#).unwrap();
        assert_eq!(sub.answers, [Answer { question_id: 4, selected_option: 2 }]);
    }
}
