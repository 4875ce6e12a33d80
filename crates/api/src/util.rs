use crate::error::{Error, Result};
use http_body_util::{BodyExt, Full, LengthLimitError, Limited};
use hyper::{
    body::{Body, Bytes},
    header::{HeaderValue, CONTENT_TYPE},
    Response, StatusCode,
};
use serde::{de::DeserializeOwned, Serialize};

pub type Reply = Response<Full<Bytes>>;
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Largest request body we are willing to buffer.
pub const MAX_BODY: usize = 64 * 1024;

pub const APPLICATION_JSON: &str = "application/json";

pub const MALFORMED_JSON: &str = "Malformed JSON body";

/// Buffers the request body (up to [`MAX_BODY`] bytes) and parses it as JSON.
pub async fn read_json<T, B>(body: B) -> Result<T>
where
    T: DeserializeOwned,
    B: Body,
    B::Error: Into<BoxError>,
{
    let bytes = Limited::new(body, MAX_BODY)
        .collect()
        .await
        .map_err(|err| {
            if err.downcast_ref::<LengthLimitError>().is_some() {
                Error::TooLarge
            } else {
                Error::BadRequest("Unreadable request body")
            }
        })?
        .to_bytes();
    serde_json::from_slice(&bytes).map_err(|_| Error::BadRequest(MALFORMED_JSON))
}

pub fn json<T: Serialize>(status: StatusCode, value: &T) -> Result<Reply> {
    let bytes = serde_json::to_vec(value).map_err(|err| Error::Internal(format!("cannot serialize response: {err}")))?;
    let mut res = Response::new(Full::new(Bytes::from(bytes)));
    *res.status_mut() = status;
    assert!(res.headers_mut().insert(CONTENT_TYPE, HeaderValue::from_static(APPLICATION_JSON)).is_none());
    Ok(res)
}

pub fn text(status: StatusCode, body: &'static str) -> Reply {
    let mut res = Response::new(Full::new(Bytes::from_static(body.as_bytes())));
    *res.status_mut() = status;
    assert!(res.headers_mut().insert(CONTENT_TYPE, HeaderValue::from_static("text/plain; charset=utf-8")).is_none());
    res
}

pub fn empty(status: StatusCode) -> Reply {
    let mut res = Response::new(Full::default());
    *res.status_mut() = status;
    res
}
