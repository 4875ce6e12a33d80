use crate::error::{Error, Result};
use http_body_util::{BodyExt, Full};
use hyper::{
    body::Bytes,
    header::{HeaderValue, ACCEPT, CONTENT_TYPE},
    Method, Request, StatusCode, Uri,
};
use hyper_util::{
    client::legacy::{connect::HttpConnector, Client as HyperClient},
    rt::TokioExecutor,
};
use model::{Answer, Draft, Page, PageRequest, Patch, PublicQuestion, Question, QuestionId, Submission, TestResult};
use serde::{de::DeserializeOwned, Deserialize, Serialize};

const APPLICATION_JSON: &str = "application/json";

/// Body of every error response.
#[derive(Deserialize)]
struct ErrorBody {
    error: String,
}

/// HTTP client for the quiz server.
#[derive(Clone)]
pub struct Client {
    inner: HyperClient<HttpConnector, Full<Bytes>>,
    /// Base URL including the `/api` prefix, without a trailing slash.
    base: String,
}

impl Client {
    /// `base` is the API root, such as `http://localhost:5000/api`.
    pub fn new(base: impl Into<String>) -> Self {
        let mut base = base.into();
        while base.ends_with('/') {
            base.pop();
        }
        let inner = HyperClient::builder(TokioExecutor::new()).build_http();
        Self { inner, base }
    }

    async fn send<T: Serialize>(&self, method: Method, path: &str, body: Option<&T>) -> Result<(StatusCode, Bytes)> {
        let uri: Uri = format!("{}{path}", self.base).parse().map_err(|_| Error::Transport)?;
        let mut req = Request::new(Full::default());
        *req.method_mut() = method;
        *req.uri_mut() = uri;

        let headers = req.headers_mut();
        assert!(headers.insert(ACCEPT, HeaderValue::from_static(APPLICATION_JSON)).is_none());
        if let Some(body) = body {
            let bytes = serde_json::to_vec(body).map_err(|_| Error::Decode)?;
            assert!(headers.insert(CONTENT_TYPE, HeaderValue::from_static(APPLICATION_JSON)).is_none());
            *req.body_mut() = Full::new(Bytes::from(bytes));
        }

        let res = self.inner.request(req).await.map_err(|err| {
            log::warn!("request to {path} failed: {err}");
            Error::Transport
        })?;
        let status = res.status();
        let bytes = res.into_body().collect().await.map_err(|_| Error::Transport)?.to_bytes();
        if status.is_success() {
            return Ok((status, bytes));
        }

        let message = match serde_json::from_slice::<ErrorBody>(&bytes) {
            Ok(ErrorBody { error }) => error,
            Err(_) => status.canonical_reason().unwrap_or("Request failed").into(),
        };
        Err(Error::Status { code: status, message })
    }

    async fn json<T, B>(&self, method: Method, path: &str, body: Option<&B>) -> Result<T>
    where
        T: DeserializeOwned,
        B: Serialize,
    {
        let (_, bytes) = self.send(method, path, body).await?;
        serde_json::from_slice(&bytes).map_err(|_| Error::Decode)
    }

    pub async fn health(&self) -> Result<String> {
        let (_, bytes) = self.send::<()>(Method::GET, "/health", None).await?;
        String::from_utf8(bytes.to_vec()).map_err(|_| Error::Decode)
    }

    /// Draws a new random test.
    pub async fn fetch_questions(&self) -> Result<Vec<PublicQuestion>> {
        self.json::<_, ()>(Method::GET, "/test", None).await
    }

    pub async fn submit_answers(&self, answers: Vec<Answer>) -> Result<TestResult> {
        self.json(Method::POST, "/submit", Some(&Submission { answers })).await
    }

    pub async fn list_questions(&self, request: PageRequest) -> Result<Page<Question>> {
        let path = format!("/admin/questions?page={}&size={}", request.number, request.size);
        self.json::<_, ()>(Method::GET, &path, None).await
    }

    pub async fn get_question(&self, id: QuestionId) -> Result<Question> {
        self.json::<_, ()>(Method::GET, &format!("/admin/questions/{id}"), None).await
    }

    pub async fn create_question(&self, draft: &Draft) -> Result<Question> {
        self.json(Method::POST, "/admin/questions", Some(draft)).await
    }

    pub async fn update_question(&self, id: QuestionId, patch: &Patch) -> Result<Question> {
        self.json(Method::PUT, &format!("/admin/questions/{id}"), Some(patch)).await
    }

    pub async fn delete_question(&self, id: QuestionId) -> Result<()> {
        self.send::<()>(Method::DELETE, &format!("/admin/questions/{id}"), None).await.map(drop)
    }
}
