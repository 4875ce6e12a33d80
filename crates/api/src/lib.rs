pub mod admin;
pub mod error;
pub mod quiz;
pub mod route;
pub mod util;

use db::Store;
use error::{Error, Result};
use hyper::{
    body::Body,
    header::{
        HeaderMap, HeaderValue, ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_METHODS,
        ACCESS_CONTROL_ALLOW_ORIGIN, ACCESS_CONTROL_MAX_AGE, ALLOW, ORIGIN, VARY,
    },
    Method, Request, StatusCode,
};
use route::Route;
use util::{BoxError, Reply};

/// Request router over a question store.
pub struct App<S> {
    store: S,
    /// Frontend origin allowed to make cross-origin requests.
    origin: Option<HeaderValue>,
}

impl<S: Store> App<S> {
    pub fn new(store: S, origin: Option<HeaderValue>) -> Self {
        Self { store, origin }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Handles one request. Every failure is rendered as a JSON error response.
    pub async fn respond<B>(&self, req: Request<B>) -> Reply
    where
        B: Body,
        B::Error: Into<BoxError>,
    {
        let method = req.method().clone();
        let path = req.uri().path().to_owned();
        let origin = req.headers().get(ORIGIN).cloned();

        let mut res = match self.try_respond(req).await {
            Ok(res) => res,
            Err(err) => {
                if let Error::Internal(detail) = &err {
                    log::error!("{method} {path} failed: {detail}");
                }
                err.into_response()
            }
        };

        self.allow_origin(origin, res.headers_mut());
        log::info!("{method} {path} {}", res.status());
        res
    }

    async fn try_respond<B>(&self, req: Request<B>) -> Result<Reply>
    where
        B: Body,
        B::Error: Into<BoxError>,
    {
        let (parts, body) = req.into_parts();
        let route = Route::parse(parts.uri.path())?;

        let store = &self.store;
        match (route, &parts.method) {
            (_, &Method::OPTIONS) => Ok(preflight(route)),
            (Route::Health, &Method::GET) => Ok(util::text(StatusCode::OK, "Healthy")),
            (Route::Questions, &Method::GET) => admin::try_list(store, parts.uri.query()).await,
            (Route::Questions, &Method::POST) => admin::try_create(store, body).await,
            (Route::Question(id), &Method::GET) => admin::try_get(store, id).await,
            (Route::Question(id), &Method::PUT) => admin::try_update(store, id, body).await,
            (Route::Question(id), &Method::DELETE) => admin::try_delete(store, id).await,
            (Route::Test, &Method::GET) => quiz::try_sample(store).await,
            (Route::Submit, &Method::POST) => quiz::try_submit(store, body).await,
            _ => Err(Error::MethodNotAllowed),
        }
    }

    fn allow_origin(&self, origin: Option<HeaderValue>, headers: &mut HeaderMap) {
        let Some(allowed) = &self.origin else {
            return;
        };
        headers.append(VARY, HeaderValue::from_static("Origin"));
        if origin.as_ref() == Some(allowed) {
            assert!(headers.insert(ACCESS_CONTROL_ALLOW_ORIGIN, allowed.clone()).is_none());
        }
    }
}

fn preflight(route: Route) -> Reply {
    let mut res = util::empty(StatusCode::NO_CONTENT);
    let headers = res.headers_mut();
    let methods = HeaderValue::from_static(route.methods());
    assert!(!headers.append(ALLOW, methods.clone()));
    assert!(!headers.append(ACCESS_CONTROL_ALLOW_METHODS, methods));
    assert!(!headers.append(ACCESS_CONTROL_ALLOW_HEADERS, HeaderValue::from_static("Content-Type")));
    assert!(!headers.append(ACCESS_CONTROL_MAX_AGE, HeaderValue::from_static("86400")));
    res
}
