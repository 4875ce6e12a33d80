use super::{error, AnswerKey, Store};
use alloc::vec::Vec;
use chrono::Utc;
use core::{
    num::NonZeroI64,
    sync::atomic::{AtomicI64, Ordering},
};
use dashmap::DashMap;
use model::{
    question::OPTION_COUNT, Changes, NewQuestion, Page, PageInfo, PageRequest, PublicQuestion, Question, QuestionId,
};
use rand::seq::SliceRandom;

/// Process-local question table. Used when no database is configured and in tests.
pub struct Memory {
    /// Last identifier handed out.
    last: AtomicI64,
    questions: DashMap<QuestionId, Question>,
}

impl Default for Memory {
    fn default() -> Self {
        Self { last: AtomicI64::new(0), questions: DashMap::new() }
    }
}

impl Memory {
    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    /// Same checks as the table constraints of the Postgres schema.
    fn check(question: &Question) -> error::Result<()> {
        if question.text.trim().is_empty() || usize::from(question.correct_answer_index) >= OPTION_COUNT {
            Err(error::Error::BadInput)
        } else {
            Ok(())
        }
    }

    /// Snapshot of the table in identifier (that is, creation) order.
    fn snapshot(&self) -> Vec<Question> {
        let mut questions: Vec<_> = self.questions.iter().map(|entry| entry.value().clone()).collect();
        questions.sort_unstable_by_key(|question| question.id);
        questions
    }
}

impl Store for Memory {
    async fn create_question(&self, question: &NewQuestion) -> error::Result<Question> {
        let NewQuestion { text, options, correct_answer_index } = question.clone();
        let now = Utc::now();
        let mut question =
            Question { id: NonZeroI64::MIN, text, options, correct_answer_index, created_at: now, updated_at: now };
        Self::check(&question)?;

        let id = self.last.fetch_add(1, Ordering::Relaxed) + 1;
        question.id = NonZeroI64::new(id).ok_or_else(|| error::Error::fatal("question identifiers are exhausted"))?;
        self.questions.insert(question.id, question.clone());
        Ok(question)
    }

    async fn get_question(&self, id: QuestionId) -> error::Result<Question> {
        self.questions.get(&id).map(|entry| entry.value().clone()).ok_or(error::Error::NotFound)
    }

    async fn get_questions(&self, request: PageRequest) -> error::Result<Page<Question>> {
        let questions = self.snapshot();
        let total = u64::try_from(questions.len()).map_err(error::Error::fatal)?;
        let skip = usize::try_from(request.offset()).unwrap_or(usize::MAX);
        let take = usize::try_from(request.limit()).unwrap_or(usize::MAX);
        let content = questions.into_iter().skip(skip).take(take).collect();
        Ok(Page { content, page: PageInfo::new(request, total) })
    }

    async fn update_question(&self, id: QuestionId, changes: &Changes) -> error::Result<Question> {
        let mut entry = self.questions.get_mut(&id).ok_or(error::Error::NotFound)?;
        let mut question = entry.value().clone();
        question.apply(changes.clone());
        Self::check(&question)?;

        question.updated_at = Utc::now();
        *entry.value_mut() = question.clone();
        Ok(question)
    }

    async fn delete_question(&self, id: QuestionId) -> error::Result<()> {
        self.questions.remove(&id).map(drop).ok_or(error::Error::NotFound)
    }

    async fn sample_questions(&self, count: u32) -> error::Result<Vec<PublicQuestion>> {
        let questions = self.snapshot();
        let count = usize::try_from(count).unwrap_or(usize::MAX);
        let sample =
            questions.choose_multiple(&mut rand::thread_rng(), count).cloned().map(PublicQuestion::from).collect();
        Ok(sample)
    }

    async fn answer_key(&self, ids: &[QuestionId]) -> error::Result<AnswerKey> {
        Ok(ids
            .iter()
            .filter_map(|id| self.questions.get(id).map(|entry| (*id, entry.correct_answer_index)))
            .collect())
    }
}
