//! Offset/limit pagination helpers.

use serde::Deserialize;
use thiserror::Error;

/// Upper bound on page size, matching the discovery API contract.
pub const MAX_PAGE_SIZE: u32 = 100;

/// Default page size when the caller does not supply one.
pub const DEFAULT_PAGE_SIZE: u32 = 20;

/// Error type for page parameter validation.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PageError {
    #[error("Limit must be at most {MAX_PAGE_SIZE}")]
    LimitTooLarge,
}

/// Validated offset/limit pair.
///
/// A limit of zero is allowed and yields an empty page.
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq)]
pub struct PageParams {
    #[serde(default)]
    pub offset: u32,
    #[serde(default = "default_limit")]
    pub limit: u32,
}

fn default_limit() -> u32 {
    DEFAULT_PAGE_SIZE
}

impl Default for PageParams {
    fn default() -> Self {
        Self {
            offset: 0,
            limit: DEFAULT_PAGE_SIZE,
        }
    }
}

impl PageParams {
    pub fn new(offset: u32, limit: u32) -> Result<Self, PageError> {
        let params = Self { offset, limit };
        params.validate()?;
        Ok(params)
    }

    pub fn validate(&self) -> Result<(), PageError> {
        if self.limit > MAX_PAGE_SIZE {
            return Err(PageError::LimitTooLarge);
        }
        Ok(())
    }

    /// Applies offset-then-limit slicing to an already ordered vector.
    pub fn slice<T>(&self, mut items: Vec<T>) -> Vec<T> {
        let offset = self.offset as usize;
        if offset >= items.len() {
            return Vec::new();
        }
        let mut page: Vec<T> = items.drain(offset..).collect();
        page.truncate(self.limit as usize);
        page
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_params() {
        let params = PageParams::default();
        assert_eq!(params.offset, 0);
        assert_eq!(params.limit, DEFAULT_PAGE_SIZE);
    }

    #[test]
    fn test_slice_offset_then_limit() {
        let params = PageParams::new(1, 2).unwrap();
        let page = params.slice(vec![1, 2, 3, 4, 5]);
        assert_eq!(page, vec![2, 3]);
    }

    #[test]
    fn test_slice_is_stable_across_calls() {
        let params = PageParams::new(1, 2).unwrap();
        let first = params.slice(vec![1, 2, 3, 4, 5]);
        let second = params.slice(vec![1, 2, 3, 4, 5]);
        assert_eq!(first, second);
    }

    #[test]
    fn test_zero_limit_returns_empty_page() {
        let params = PageParams::new(0, 0).unwrap();
        let page = params.slice(vec![1, 2, 3]);
        assert!(page.is_empty());
    }

    #[test]
    fn test_offset_past_end_returns_empty_page() {
        let params = PageParams::new(10, 5).unwrap();
        let page = params.slice(vec![1, 2, 3]);
        assert!(page.is_empty());
    }

    #[test]
    fn test_limit_past_end_is_clamped() {
        let params = PageParams::new(1, 50).unwrap();
        let page = params.slice(vec![1, 2, 3]);
        assert_eq!(page, vec![2, 3]);
    }

    #[test]
    fn test_limit_too_large_rejected() {
        assert_eq!(
            PageParams::new(0, MAX_PAGE_SIZE + 1),
            Err(PageError::LimitTooLarge)
        );
    }

    #[test]
    fn test_deserialization_defaults() {
        let params: PageParams = serde_json::from_str("{}").unwrap();
        assert_eq!(params, PageParams::default());
    }
}
