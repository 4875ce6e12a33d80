use crate::error::{Error, Result};
use core::num::{NonZeroI64, NonZeroU32};
use model::{FieldError, PageRequest, QuestionId};

const PREFIX: &str = "/api";

const PAGE_NUMBER: FieldError = FieldError { field: "page", message: "Page must be a positive integer" };
const PAGE_SIZE: FieldError = FieldError { field: "size", message: "Size must be a positive integer" };

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Route {
    Health,
    Questions,
    Question(QuestionId),
    Test,
    Submit,
}

impl Route {
    pub fn parse(path: &str) -> Result<Self> {
        let path = path.strip_prefix(PREFIX).ok_or(Error::NoRoute)?;
        let path = path.strip_suffix('/').unwrap_or(path);
        Ok(match path {
            "/health" => Self::Health,
            "/admin/questions" => Self::Questions,
            "/test" => Self::Test,
            "/submit" => Self::Submit,
            _ => {
                let id = path.strip_prefix("/admin/questions/").ok_or(Error::NoRoute)?;
                if id.contains('/') {
                    return Err(Error::NoRoute);
                }
                Self::Question(parse_id(id)?)
            }
        })
    }

    /// Methods served on this route, as listed in `Allow`.
    pub const fn methods(self) -> &'static str {
        match self {
            Self::Health | Self::Test => "GET, OPTIONS",
            Self::Questions => "GET, POST, OPTIONS",
            Self::Question(_) => "GET, PUT, DELETE, OPTIONS",
            Self::Submit => "POST, OPTIONS",
        }
    }
}

/// Identifiers are positive integers.
fn parse_id(raw: &str) -> Result<QuestionId> {
    raw.parse::<NonZeroI64>()
        .ok()
        .filter(|id| id.get() > 0)
        .ok_or(Error::BadRequest("Valid question ID is required"))
}

/// Reads `page` and `size` from a query string, defaulting to the first page of ten.
pub fn parse_page(query: Option<&str>) -> Result<PageRequest> {
    let mut number = None;
    let mut size = None;

    for chunk in query.unwrap_or_default().split('&') {
        let (key, value) = match chunk.split_once('=') {
            Some(pair) => pair,
            _ => continue,
        };
        let target = match key {
            "page" => &mut number,
            "size" => &mut size,
            _ => continue,
        };
        *target = Some(value);
    }

    let mut errors = Vec::new();
    let number = match number {
        Some(raw) => raw.parse().map_err(|_| errors.push(PAGE_NUMBER)).ok(),
        None => Some(NonZeroU32::MIN),
    };
    let size = match size {
        Some(raw) => raw
            .parse::<NonZeroU32>()
            .map(|size| size.min(PageRequest::MAX_SIZE))
            .map_err(|_| errors.push(PAGE_SIZE))
            .ok(),
        None => Some(PageRequest::DEFAULT_SIZE),
    };

    match number.zip(size) {
        Some((number, size)) => Ok(PageRequest { number, size }),
        None => Err(Error::Validation(errors)),
    }
}
