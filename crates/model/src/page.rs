use alloc::vec::Vec;
use core::num::NonZeroU32;
use serde::{Deserialize, Serialize};

/// A one-based page request.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PageRequest {
    pub number: NonZeroU32,
    pub size: NonZeroU32,
}

impl PageRequest {
    pub const DEFAULT_SIZE: NonZeroU32 = match NonZeroU32::new(10) {
        Some(size) => size,
        None => unreachable!(),
    };
    /// Larger requested sizes are clamped to this.
    pub const MAX_SIZE: NonZeroU32 = match NonZeroU32::new(100) {
        Some(size) => size,
        None => unreachable!(),
    };

    /// Number of rows preceding this page.
    pub fn offset(&self) -> u64 {
        u64::from(self.number.get() - 1) * u64::from(self.size.get())
    }

    pub fn limit(&self) -> u64 {
        self.size.get().into()
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self { number: NonZeroU32::MIN, size: Self::DEFAULT_SIZE }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageInfo {
    pub number: u32,
    pub size: u32,
    pub total_elements: u64,
    pub total_pages: u64,
}

impl PageInfo {
    pub fn new(request: PageRequest, total_elements: u64) -> Self {
        let size = request.size.get();
        Self {
            number: request.number.get(),
            size,
            total_elements,
            total_pages: total_elements.div_ceil(u64::from(size)),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct Page<T> {
    pub content: Vec<T>,
    pub page: PageInfo,
}

#[cfg(test)]
mod tests {
    use super::{PageInfo, PageRequest};
    use core::num::NonZeroU32;

    fn request(number: u32, size: u32) -> PageRequest {
        PageRequest { number: NonZeroU32::new(number).unwrap(), size: NonZeroU32::new(size).unwrap() }
    }

    #[test]
    fn total_pages_is_ceiling() {
        for size in 1..=12 {
            for total in 0..=40u64 {
                let info = PageInfo::new(request(1, size), total);
                let expected = (total + u64::from(size) - 1) / u64::from(size);
                assert_eq!(info.total_pages, expected, "total {total} size {size}");
            }
        }
    }

    #[test]
    fn offsets() {
        assert_eq!(PageRequest::default().offset(), 0);
        assert_eq!(request(3, 10).offset(), 20);
        assert_eq!(request(u32::MAX, u32::MAX).offset(), u64::from(u32::MAX - 1) * u64::from(u32::MAX));
    }

    #[test]
    fn camel_case_metadata() {
        let json = serde_json::to_value(PageInfo::new(request(2, 5), 11)).unwrap();
        assert_eq!(json, serde_json::json!({ "number": 2, "size": 5, "totalElements": 11, "totalPages": 3 }));
    }
}
