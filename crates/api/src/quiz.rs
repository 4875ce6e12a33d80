use crate::{
    error::{Error, Result},
    util::{self, BoxError, Reply},
};
use db::Store;
use hyper::{body::Body, StatusCode};
use model::{Answer, PublicQuestion, QuestionId, TestResult};
use serde_json::Value;

/// Number of questions drawn for one test.
pub const SAMPLE_SIZE: u32 = 10;

const ANSWERS_REQUIRED: &str = "Answers are required";

/// Draws a fresh random test. Fewer questions are returned if the bank is small.
pub async fn sample<S: Store>(store: &S) -> Result<Vec<PublicQuestion>> {
    let questions = store.sample_questions(SAMPLE_SIZE).await?;
    log::debug!("sampled {} questions", questions.len());
    Ok(questions)
}

/// Scores a submission against the current answer key. The key is looked up
/// once for all distinct question identifiers. A zero identifier names no
/// question, so it is never looked up and never credited.
pub async fn score<S: Store>(store: &S, answers: &[Answer]) -> Result<TestResult> {
    let mut ids: Vec<_> = answers.iter().filter_map(|answer| QuestionId::new(answer.question_id)).collect();
    ids.sort_unstable();
    ids.dedup();

    let key = store.answer_key(&ids).await?;
    TestResult::tally(answers, |id| key.get(&id).copied()).ok_or(Error::BadRequest(ANSWERS_REQUIRED))
}

pub async fn try_sample<S: Store>(store: &S) -> Result<Reply> {
    let questions = sample(store).await?;
    util::json(StatusCode::OK, &questions)
}

pub async fn try_submit<S, B>(store: &S, body: B) -> Result<Reply>
where
    S: Store,
    B: Body,
    B::Error: Into<BoxError>,
{
    // Only a missing, empty or non-list `answers` is reported as such. Bad
    // entries inside the list are malformed.
    let mut body: Value = util::read_json(body).await?;
    let answers = match body.get_mut("answers").map(Value::take) {
        Some(Value::Array(list)) if !list.is_empty() => list,
        _ => return Err(Error::BadRequest(ANSWERS_REQUIRED)),
    };
    let answers = answers
        .into_iter()
        .map(serde_json::from_value)
        .collect::<serde_json::Result<Vec<Answer>>>()
        .map_err(|_| Error::BadRequest(util::MALFORMED_JSON))?;

    let result = score(store, &answers).await?;
    log::debug!("scored {}/{} ({}%, band {})", result.correct_count, result.total, result.percentage, result.band());
    util::json(StatusCode::OK, &result)
}
