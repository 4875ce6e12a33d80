use crate::{
    answers::Answers,
    error::{Error, Result},
    http::Client,
    timer::{Countdown, Expired, DEFAULT_DURATION},
};
use core::num::NonZeroU32;
use model::{Answer, PublicQuestion, QuestionId, TestResult};
use std::sync::{Mutex, MutexGuard, PoisonError};

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Phase {
    Answering,
    /// Answers were handed off for scoring.
    Submitting,
    Finished(TestResult),
}

/// Outcome of one countdown tick.
#[derive(Debug, PartialEq, Eq)]
pub enum Tick {
    /// Still counting down, with the seconds left.
    Counting(u32),
    /// The countdown is no longer running. Nothing to do.
    Stopped,
    /// Time ran out. These answers must be submitted now.
    Submit(Vec<Answer>),
}

impl Tick {
    pub const fn is_stopped(&self) -> bool {
        matches!(self, Self::Stopped)
    }
}

/// Client-held state of one test attempt.
#[derive(Debug)]
pub struct TestSession {
    duration: NonZeroU32,
    questions: Vec<PublicQuestion>,
    current: usize,
    answers: Answers,
    countdown: Countdown,
    phase: Phase,
    error: Option<String>,
}

impl Default for TestSession {
    fn default() -> Self {
        Self::new(DEFAULT_DURATION)
    }
}

impl TestSession {
    pub fn new(duration: NonZeroU32) -> Self {
        Self {
            duration,
            questions: Vec::new(),
            current: 0,
            answers: Answers::default(),
            countdown: Countdown::new(duration),
            phase: Phase::Answering,
            error: None,
        }
    }

    /// Starts a fresh attempt over `questions`.
    pub fn load(&mut self, questions: Vec<PublicQuestion>) {
        self.reset();
        self.questions = questions;
    }

    /// Back to the initial state, including a full countdown.
    pub fn reset(&mut self) {
        *self = Self::new(self.duration);
    }

    pub fn questions(&self) -> &[PublicQuestion] {
        &self.questions
    }

    pub fn current(&self) -> Option<&PublicQuestion> {
        self.questions.get(self.current)
    }

    pub fn current_index(&self) -> usize {
        self.current
    }

    /// Jumps to a question. Out-of-range indices are ignored.
    pub fn go_to(&mut self, index: usize) -> bool {
        let valid = index < self.questions.len();
        if valid {
            self.current = index;
        }
        valid
    }

    pub fn next(&mut self) -> bool {
        self.go_to(self.current + 1)
    }

    pub fn previous(&mut self) -> bool {
        self.current.checked_sub(1).is_some_and(|index| self.go_to(index))
    }

    /// Records a selection. Answers are frozen once a submission has begun.
    pub fn set_answer(&mut self, question_id: QuestionId, selected_option: u32) -> bool {
        let open = self.phase == Phase::Answering;
        if open {
            self.answers.set(question_id, selected_option);
        }
        open
    }

    pub fn answer_for(&self, question_id: QuestionId) -> Option<u32> {
        self.answers.get(question_id)
    }

    pub fn answers(&self) -> &Answers {
        &self.answers
    }

    pub fn countdown(&self) -> &Countdown {
        &self.countdown
    }

    pub fn phase(&self) -> &Phase {
        &self.phase
    }

    pub fn result(&self) -> Option<&TestResult> {
        match &self.phase {
            Phase::Finished(result) => Some(result),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn set_error(&mut self, message: impl Into<String>) {
        self.error = Some(message.into());
    }

    /// Advances the countdown. Expiry becomes a submission only while the
    /// session is still being answered.
    pub fn tick(&mut self) -> Tick {
        match self.countdown.tick() {
            Some(Expired) => match self.begin_submit() {
                Ok(answers) => Tick::Submit(answers),
                Err(_) => Tick::Stopped,
            },
            None if self.countdown.is_running() => Tick::Counting(self.countdown.remaining()),
            None => Tick::Stopped,
        }
    }

    /// Moves to [`Phase::Submitting`] and stops the countdown for good.
    /// Returns the answers to send.
    pub fn begin_submit(&mut self) -> Result<Vec<Answer>> {
        if self.phase != Phase::Answering {
            return Err(Error::AlreadySubmitting);
        }
        if self.answers.is_empty() {
            let err = Error::NoAnswers;
            self.error = Some(err.to_string());
            return Err(err);
        }

        self.countdown.cancel();
        self.phase = Phase::Submitting;
        self.error = None;
        Ok(self.answers.to_vec())
    }

    pub fn finish(&mut self, result: TestResult) {
        self.phase = Phase::Finished(result);
    }

    /// Returns to answering with the answers intact. The countdown stays stopped.
    pub fn fail_submit(&mut self, err: &Error) {
        self.phase = Phase::Answering;
        self.error = Some(err.to_string());
    }
}

/// Locks a shared session. A panic while holding the lock cannot leave the
/// session half-updated, so poisoning is ignored.
pub fn lock(session: &Mutex<TestSession>) -> MutexGuard<'_, TestSession> {
    session.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Fetches a fresh set of questions into the session. Failures land in the
/// session's error slot.
pub async fn start(session: &Mutex<TestSession>, client: &Client) -> Result<()> {
    match client.fetch_questions().await {
        Ok(questions) => {
            lock(session).load(questions);
            Ok(())
        }
        Err(err) => {
            lock(session).set_error(err.to_string());
            Err(err)
        }
    }
}

/// Sends answers obtained from [`TestSession::begin_submit`] or an expired countdown.
pub async fn deliver(session: &Mutex<TestSession>, client: &Client, answers: Vec<Answer>) -> Result<TestResult> {
    match client.submit_answers(answers).await {
        Ok(result) => {
            lock(session).finish(result);
            Ok(result)
        }
        Err(err) => {
            log::warn!("submission failed: {err}");
            lock(session).fail_submit(&err);
            Err(err)
        }
    }
}

/// Manual submission.
pub async fn submit(session: &Mutex<TestSession>, client: &Client) -> Result<TestResult> {
    let answers = lock(session).begin_submit()?;
    deliver(session, client, answers).await
}
