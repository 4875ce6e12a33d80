use crate::{error::Result, http::Client};
use core::num::NonZeroU32;
use model::{Draft, Page, PageRequest, Patch, Question, QuestionId};

/// Client-held state of the question management screen.
#[derive(Debug, Default)]
pub struct AdminBoard {
    questions: Vec<Question>,
    request: PageRequest,
    total_pages: u64,
    total_questions: u64,
    /// Question being edited. `None` with an open form means a new question.
    editing: Option<Question>,
    form_open: bool,
    error: Option<String>,
}

impl AdminBoard {
    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    pub fn request(&self) -> PageRequest {
        self.request
    }

    pub fn total_pages(&self) -> u64 {
        self.total_pages
    }

    pub fn total_questions(&self) -> u64 {
        self.total_questions
    }

    pub fn editing(&self) -> Option<&Question> {
        self.editing.as_ref()
    }

    pub fn is_form_open(&self) -> bool {
        self.form_open
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn set_error(&mut self, message: impl Into<String>) {
        self.error = Some(message.into());
    }

    /// Replaces the visible page with a fetched one.
    pub fn show(&mut self, page: Page<Question>) {
        let Page { content, page } = page;
        self.questions = content;
        if let Some(number) = NonZeroU32::new(page.number) {
            self.request.number = number;
        }
        self.total_pages = page.total_pages;
        self.total_questions = page.total_elements;
    }

    pub fn go_to_page(&mut self, number: NonZeroU32) {
        self.request.number = number;
    }

    /// Changing the page size starts over from the first page.
    pub fn set_page_size(&mut self, size: NonZeroU32) {
        self.request = PageRequest { number: NonZeroU32::MIN, size };
    }

    /// Opens the form, empty for a new question or filled from `question`.
    pub fn open_form(&mut self, question: Option<Question>) {
        self.editing = question;
        self.form_open = true;
    }

    pub fn close_form(&mut self) {
        self.editing = None;
        self.form_open = false;
        self.error = None;
    }

    /// Newly created questions are shown first.
    pub fn add(&mut self, question: Question) {
        self.questions.insert(0, question);
        self.total_questions += 1;
    }

    pub fn replace(&mut self, question: Question) {
        if let Some(slot) = self.questions.iter_mut().find(|old| old.id == question.id) {
            *slot = question;
        }
    }

    pub fn remove(&mut self, id: QuestionId) {
        let before = self.questions.len();
        self.questions.retain(|question| question.id != id);
        if self.questions.len() < before {
            self.total_questions = self.total_questions.saturating_sub(1);
        }
    }

    /// Reloads the current page. A failure is kept in the error slot and the
    /// previous page stays visible.
    pub async fn refresh(&mut self, client: &Client) -> Result<()> {
        self.error = None;
        match client.list_questions(self.request).await {
            Ok(page) => {
                self.show(page);
                Ok(())
            }
            Err(err) => {
                self.error = Some(err.to_string());
                Err(err)
            }
        }
    }

    /// Creates or updates the question in the form. On failure the form stays
    /// open with its contents so that the input is not lost.
    pub async fn save(&mut self, client: &Client, draft: Draft) -> Result<Question> {
        let saved = match &self.editing {
            Some(question) => {
                let Draft { text, options, correct_answer_index } = draft;
                let patch = Patch { text, options, correct_answer_index };
                client.update_question(question.id, &patch).await
            }
            None => client.create_question(&draft).await,
        };

        let question = match saved {
            Ok(question) => question,
            Err(err) => {
                self.error = Some(err.to_string());
                return Err(err);
            }
        };

        if self.editing.is_some() {
            self.replace(question.clone());
        } else {
            self.add(question.clone());
        }
        self.close_form();
        Ok(question)
    }

    pub async fn delete(&mut self, client: &Client, id: QuestionId) -> Result<()> {
        match client.delete_question(id).await {
            Ok(()) => {
                self.remove(id);
                Ok(())
            }
            Err(err) => {
                self.error = Some(err.to_string());
                Err(err)
            }
        }
    }
}
