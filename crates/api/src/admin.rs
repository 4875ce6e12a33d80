use crate::{
    error::{Error, Result},
    route,
    util::{self, BoxError, Reply},
};
use db::Store;
use hyper::{body::Body, StatusCode};
use model::{Draft, Patch, QuestionId};

pub async fn try_create<S, B>(store: &S, body: B) -> Result<Reply>
where
    S: Store,
    B: Body,
    B::Error: Into<BoxError>,
{
    let draft: Draft = util::read_json(body).await?;
    let question = draft.validate().map_err(Error::Validation)?;
    let created = store.create_question(&question).await?;
    log::info!("created question {}", created.id);
    util::json(StatusCode::CREATED, &created)
}

pub async fn try_list<S: Store>(store: &S, query: Option<&str>) -> Result<Reply> {
    let request = route::parse_page(query)?;
    let page = store.get_questions(request).await?;
    util::json(StatusCode::OK, &page)
}

pub async fn try_get<S: Store>(store: &S, id: QuestionId) -> Result<Reply> {
    let question = store.get_question(id).await?;
    util::json(StatusCode::OK, &question)
}

pub async fn try_update<S, B>(store: &S, id: QuestionId, body: B) -> Result<Reply>
where
    S: Store,
    B: Body,
    B::Error: Into<BoxError>,
{
    let patch: Patch = util::read_json(body).await?;
    let changes = patch.validate().map_err(Error::Validation)?;
    let updated = store.update_question(id, &changes).await?;
    log::info!("updated question {id}");
    util::json(StatusCode::OK, &updated)
}

pub async fn try_delete<S: Store>(store: &S, id: QuestionId) -> Result<Reply> {
    store.delete_question(id).await?;
    log::info!("deleted question {id}");
    Ok(util::empty(StatusCode::NO_CONTENT))
}
