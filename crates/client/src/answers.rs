use model::{Answer, QuestionId};

/// Selections made during one test, at most one per question.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Answers(Vec<Answer>);

impl Answers {
    /// Records a selection, replacing any earlier one for the same question.
    /// The position of the first selection is kept.
    pub fn set(&mut self, question_id: QuestionId, selected_option: u32) {
        let question_id = question_id.get();
        match self.0.iter_mut().find(|answer| answer.question_id == question_id) {
            Some(answer) => answer.selected_option = selected_option,
            None => self.0.push(Answer { question_id, selected_option }),
        }
    }

    pub fn get(&self, question_id: QuestionId) -> Option<u32> {
        self.0.iter().find(|answer| answer.question_id == question_id.get()).map(|answer| answer.selected_option)
    }

    pub fn is_answered(&self, question_id: QuestionId) -> bool {
        self.get(question_id).is_some()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Answer> {
        self.0.iter()
    }

    pub fn to_vec(&self) -> Vec<Answer> {
        self.0.clone()
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }
}
