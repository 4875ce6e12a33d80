#![cfg_attr(not(test), no_std)]

extern crate alloc;

pub mod error;
mod memory;

use alloc::{collections::BTreeMap, string::String, vec::Vec};
use chrono::{DateTime, Utc};
use core::{future::Future, num::NonZeroI64};
use model::{Changes, NewQuestion, Page, PageInfo, PageRequest, PublicQuestion, Question, QuestionId};
use tokio_postgres::error::SqlState;

pub use futures_util::TryStreamExt;
pub use memory::Memory;
pub use tokio_postgres::{tls::NoTls, Client, Config};

/// Correct option index of every question that still exists.
pub type AnswerKey = BTreeMap<QuestionId, u8>;

/// Persistence of question records.
pub trait Store: Send + Sync + 'static {
    fn create_question(&self, question: &NewQuestion) -> impl Future<Output = error::Result<Question>> + Send;

    fn get_question(&self, id: QuestionId) -> impl Future<Output = error::Result<Question>> + Send;

    /// Questions in creation order. Pages past the end are empty.
    fn get_questions(&self, request: PageRequest) -> impl Future<Output = error::Result<Page<Question>>> + Send;

    fn update_question(
        &self,
        id: QuestionId,
        changes: &Changes,
    ) -> impl Future<Output = error::Result<Question>> + Send;

    fn delete_question(&self, id: QuestionId) -> impl Future<Output = error::Result<()>> + Send;

    /// Picks up to `count` distinct questions uniformly at random.
    fn sample_questions(&self, count: u32) -> impl Future<Output = error::Result<Vec<PublicQuestion>>> + Send;

    /// Looks up the correct option of each identifier. Unknown identifiers are
    /// simply absent from the key.
    fn answer_key(&self, ids: &[QuestionId]) -> impl Future<Output = error::Result<AnswerKey>> + Send;
}

pub struct Database(Client);

impl From<Client> for Database {
    fn from(client: Client) -> Self {
        Self(client)
    }
}

const SCHEMA: &str = include_str!("../schema.sql");
const CONSTRAINTS: [&str; 3] = ["question_text_check", "question_options_check", "question_answer_check"];

fn classify(err: tokio_postgres::Error) -> error::Error {
    let bad_input = err
        .as_db_error()
        .filter(|db| *db.code() == SqlState::CHECK_VIOLATION)
        .and_then(|db| db.constraint())
        .is_some_and(|constraint| CONSTRAINTS.contains(&constraint));
    if bad_input {
        error::Error::BadInput
    } else {
        error::Error::fatal(err)
    }
}

fn deserialize_id_from_row(row: &tokio_postgres::Row) -> error::Result<QuestionId> {
    let id: i64 = row.try_get("id").map_err(error::Error::fatal)?;
    NonZeroI64::new(id).ok_or_else(|| error::Error::fatal("question row has a zero identifier"))
}

fn deserialize_answer_from_row(row: &tokio_postgres::Row) -> error::Result<u8> {
    let answer: i16 = row.try_get("answer").map_err(error::Error::fatal)?;
    u8::try_from(answer).map_err(error::Error::fatal)
}

fn deserialize_public_question_from_row(row: &tokio_postgres::Row) -> error::Result<PublicQuestion> {
    let id = deserialize_id_from_row(row)?;
    let text = row.try_get("text").map_err(error::Error::fatal)?;
    let options: Vec<String> = row.try_get("options").map_err(error::Error::fatal)?;
    let options = options.try_into().map_err(|_| error::Error::fatal("question row does not have four options"))?;
    let created_at: DateTime<Utc> = row.try_get("created_at").map_err(error::Error::fatal)?;
    let updated_at: DateTime<Utc> = row.try_get("updated_at").map_err(error::Error::fatal)?;
    Ok(PublicQuestion { id, text, options, created_at, updated_at })
}

fn deserialize_question_from_row(row: &tokio_postgres::Row) -> error::Result<Question> {
    let PublicQuestion { id, text, options, created_at, updated_at } = deserialize_public_question_from_row(row)?;
    let correct_answer_index = deserialize_answer_from_row(row)?;
    Ok(Question { id, text, options, correct_answer_index, created_at, updated_at })
}

impl Database {
    /// Creates the question table if it does not exist yet.
    pub async fn migrate(&self) -> error::Result<()> {
        self.0.batch_execute(SCHEMA).await.map_err(error::Error::fatal)
    }
}

impl Store for Database {
    async fn create_question(&self, question: &NewQuestion) -> error::Result<Question> {
        let options: &[String] = &question.options;
        let answer = i16::from(question.correct_answer_index);
        let row = self
            .0
            .query_one(
                "INSERT INTO question (text, options, answer) VALUES ($1, $2, $3) \
                 RETURNING id, text, options, answer, created_at, updated_at",
                &[&question.text, &options, &answer],
            )
            .await
            .map_err(classify)?;
        deserialize_question_from_row(&row)
    }

    async fn get_question(&self, id: QuestionId) -> error::Result<Question> {
        let row = self
            .0
            .query_opt(
                "SELECT id, text, options, answer, created_at, updated_at FROM question WHERE id = $1",
                &[&id.get()],
            )
            .await
            .map_err(error::Error::fatal)?
            .ok_or(error::Error::NotFound)?;
        deserialize_question_from_row(&row)
    }

    async fn get_questions(&self, request: PageRequest) -> error::Result<Page<Question>> {
        let row = self
            .0
            .query_one("SELECT count(*) AS total FROM question", &[])
            .await
            .map_err(error::Error::fatal)?;
        let total: i64 = row.try_get("total").map_err(error::Error::fatal)?;
        let total = u64::try_from(total).map_err(error::Error::fatal)?;

        let page = PageInfo::new(request, total);
        let offset = request.offset();
        if offset >= total {
            return Ok(Page { content: Vec::new(), page });
        }

        let limit = i64::try_from(request.limit()).map_err(error::Error::fatal)?;
        let offset = i64::try_from(offset).map_err(error::Error::fatal)?;
        let content = self
            .0
            .query(
                "SELECT id, text, options, answer, created_at, updated_at FROM question \
                 ORDER BY id LIMIT $1 OFFSET $2",
                &[&limit, &offset],
            )
            .await
            .map_err(error::Error::fatal)?
            .iter()
            .map(deserialize_question_from_row)
            .collect::<error::Result<_>>()?;
        Ok(Page { content, page })
    }

    async fn update_question(&self, id: QuestionId, changes: &Changes) -> error::Result<Question> {
        let options = changes.options.as_ref().map(|options| options.as_slice());
        let answer = changes.correct_answer_index.map(i16::from);
        let row = self
            .0
            .query_opt(
                "UPDATE question SET text = COALESCE($2, text), options = COALESCE($3, options), \
                 answer = COALESCE($4, answer), updated_at = now() WHERE id = $1 \
                 RETURNING id, text, options, answer, created_at, updated_at",
                &[&id.get(), &changes.text, &options, &answer],
            )
            .await
            .map_err(classify)?
            .ok_or(error::Error::NotFound)?;
        deserialize_question_from_row(&row)
    }

    async fn delete_question(&self, id: QuestionId) -> error::Result<()> {
        let deleted = self
            .0
            .execute("DELETE FROM question WHERE id = $1", &[&id.get()])
            .await
            .map_err(error::Error::fatal)?;
        match deleted {
            1 => Ok(()),
            0 => Err(error::Error::NotFound),
            count => Err(error::Error::fatal(format_args!("deleted {count} rows with identifier {id}"))),
        }
    }

    async fn sample_questions(&self, count: u32) -> error::Result<Vec<PublicQuestion>> {
        let count = i64::from(count);
        self.0
            .query_raw(
                "SELECT id, text, options, created_at, updated_at FROM question ORDER BY random() LIMIT $1",
                &[&count],
            )
            .await
            .map_err(error::Error::fatal)?
            .map_err(error::Error::fatal)
            .and_then(|row| core::future::ready(deserialize_public_question_from_row(&row)))
            .try_collect()
            .await
    }

    async fn answer_key(&self, ids: &[QuestionId]) -> error::Result<AnswerKey> {
        if ids.is_empty() {
            return Ok(AnswerKey::new());
        }

        let ids: Vec<i64> = ids.iter().map(|id| id.get()).collect();
        self.0
            .query_raw("SELECT id, answer FROM question WHERE id = ANY($1)", &[&ids])
            .await
            .map_err(error::Error::fatal)?
            .map_err(error::Error::fatal)
            .and_then(|row| {
                let pair = deserialize_id_from_row(&row).and_then(|id| Ok((id, deserialize_answer_from_row(&row)?)));
                core::future::ready(pair)
            })
            .try_collect()
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::{Config, Database, NoTls, Store};
    use model::{Changes, NewQuestion, PageRequest};

    #[tokio::test(flavor = "current_thread")]
    #[ignore = "requires a live PostgreSQL instance"]
    async fn database_test() {
        use std::env::var;
        let user = var("PG_USERNAME").unwrap();
        let pass = var("PG_PASSWORD").unwrap();
        let host = var("PG_HOSTNAME").unwrap();
        let data = var("PG_DATABASE").unwrap();

        let (client, conn) = Config::new()
            .user(&user)
            .password(&pass)
            .host(&host)
            .dbname(&data)
            .port(5432)
            .connect(NoTls)
            .await
            .expect("cannot connect to database");
        let handle = tokio::spawn(conn);
        let db = Database::from(client);
        db.migrate().await.unwrap();

        // Question creation
        let created = db
            .create_question(&NewQuestion {
                text: String::from("What is the largest planet in the solar system?"),
                options: ["Mars", "Venus", "Jupiter", "Saturn"].map(String::from),
                correct_answer_index: 2,
            })
            .await
            .unwrap();
        assert_eq!(created.correct_answer_index, 2);
        assert_eq!(db.get_question(created.id).await.unwrap(), created);

        // Constraint violations are bad input
        let blank = NewQuestion {
            text: String::from("  "),
            options: ["a", "b", "c", "d"].map(String::from),
            correct_answer_index: 0,
        };
        assert_eq!(db.create_question(&blank).await.unwrap_err(), super::error::Error::BadInput);

        // Paging and sampling
        let page = db.get_questions(PageRequest::default()).await.unwrap();
        assert!(page.page.total_elements >= 1);
        let sample = db.sample_questions(10).await.unwrap();
        assert!(sample.iter().any(|question| question.id == created.id));

        // Partial update keeps untouched fields
        let changes = Changes { correct_answer_index: Some(0), ..Default::default() };
        let updated = db.update_question(created.id, &changes).await.unwrap();
        assert_eq!(updated.text, created.text);
        assert_eq!(updated.correct_answer_index, 0);

        let key = db.answer_key(&[created.id]).await.unwrap();
        assert_eq!(key.get(&created.id), Some(&0));

        // Deletion
        db.delete_question(created.id).await.unwrap();
        assert_eq!(db.delete_question(created.id).await.unwrap_err(), super::error::Error::NotFound);
        assert!(db.answer_key(&[created.id]).await.unwrap().is_empty());

        drop(db);
        handle.await.unwrap().unwrap();
    }
}
