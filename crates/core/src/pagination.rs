//! Page/size validation and offset-based page construction.
//!
//! Two policies exist deliberately: [`check_page_and_size`] strictly rejects
//! out-of-bounds values (list endpoint), while [`clamp_size`] silently caps
//! an oversized request (search endpoint).

use serde::Serialize;

/// Hard ceiling on page size regardless of caller intent.
pub const MAX_PAGE_SIZE: i64 = 10;

pub const PAGE_VALUE_ERROR: &str = "The input page value is not valid : ";
pub const SIZE_VALUE_ERROR: &str = "The input size value is not valid : ";
pub const SIZE_LIMIT_ERROR: &str = "The input size value is over the permitted limit of 10 : ";

/// Error type carrying every page/size violation found in one request
#[derive(Debug, Clone, PartialEq)]
pub struct PageValidationError {
    violations: Vec<String>,
}

impl PageValidationError {
    pub fn violations(&self) -> &[String] {
        &self.violations
    }
}

impl std::fmt::Display for PageValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.violations.join("\n"))
    }
}

impl std::error::Error for PageValidationError {}

/// Validate requested page and size against the fixed bounds.
///
/// All violations are collected and reported together, one message per line,
/// rather than short-circuiting on the first failure.
pub fn check_page_and_size(page: i64, size: i64) -> Result<(), PageValidationError> {
    let mut violations = Vec::new();

    if page < 0 {
        violations.push(format!("{PAGE_VALUE_ERROR}{page}"));
    }
    if size < 0 {
        violations.push(format!("{SIZE_VALUE_ERROR}{size}"));
    }
    if size > MAX_PAGE_SIZE {
        violations.push(format!("{SIZE_LIMIT_ERROR}{size}"));
    }

    if violations.is_empty() {
        Ok(())
    } else {
        Err(PageValidationError { violations })
    }
}

/// Cap an oversized page size at [`MAX_PAGE_SIZE`]. Values within bounds pass
/// through unchanged; negative values are not this function's concern.
pub fn clamp_size(size: i64) -> i64 {
    size.min(MAX_PAGE_SIZE)
}

/// Zero-based row offset for a page request.
pub fn offset(page: i64, size: i64) -> i64 {
    page * size
}

/// A bounded, offset-based slice of a larger result set.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub content: Vec<T>,
    pub page: i64,
    pub size: i64,
    pub total_elements: u64,
    pub total_pages: u64,
}

impl<T> Page<T> {
    /// Build a page from one fetched slice and the total count of the
    /// underlying (possibly filtered) set.
    pub fn new(content: Vec<T>, page: i64, size: i64, total_elements: u64) -> Self {
        let total_pages = if size > 0 {
            total_elements.div_ceil(size as u64)
        } else {
            0
        };

        Page {
            content,
            page,
            size,
            total_elements,
            total_pages,
        }
    }

    /// An empty page for queries that matched nothing.
    pub fn empty(page: i64, size: i64) -> Self {
        Page::new(Vec::new(), page, size, 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_accepts_valid_bounds() {
        assert!(check_page_and_size(0, 10).is_ok());
        assert!(check_page_and_size(5, 1).is_ok());
        assert!(check_page_and_size(0, 0).is_ok());
    }

    #[test]
    fn test_check_rejects_negative_page() {
        let err = check_page_and_size(-1, 10).unwrap_err();
        assert_eq!(err.violations(), &[format!("{PAGE_VALUE_ERROR}-1")]);
    }

    #[test]
    fn test_check_rejects_negative_size() {
        let err = check_page_and_size(0, -5).unwrap_err();
        assert_eq!(err.violations(), &[format!("{SIZE_VALUE_ERROR}-5")]);
    }

    #[test]
    fn test_check_rejects_oversized_page() {
        let err = check_page_and_size(0, 11).unwrap_err();
        assert_eq!(err.violations(), &[format!("{SIZE_LIMIT_ERROR}11")]);
    }

    #[test]
    fn test_check_collects_multiple_violations() {
        let err = check_page_and_size(-1, 20).unwrap_err();
        assert_eq!(
            err.violations(),
            &[format!("{PAGE_VALUE_ERROR}-1"), format!("{SIZE_LIMIT_ERROR}20")]
        );
        assert_eq!(
            err.to_string(),
            format!("{PAGE_VALUE_ERROR}-1\n{SIZE_LIMIT_ERROR}20")
        );
    }

    #[test]
    fn test_clamp_size() {
        assert_eq!(clamp_size(5), 5);
        assert_eq!(clamp_size(10), 10);
        assert_eq!(clamp_size(50), 10);
    }

    #[test]
    fn test_offset() {
        assert_eq!(offset(0, 10), 0);
        assert_eq!(offset(3, 10), 30);
    }

    #[test]
    fn test_page_math() {
        let page = Page::new(vec![1, 2, 3], 0, 3, 8);
        assert_eq!(page.total_pages, 3);

        let exact = Page::new(vec![1, 2], 0, 2, 4);
        assert_eq!(exact.total_pages, 2);
    }

    #[test]
    fn test_empty_page() {
        let page: Page<i32> = Page::empty(0, 10);
        assert!(page.content.is_empty());
        assert_eq!(page.total_elements, 0);
        assert_eq!(page.total_pages, 0);
    }

    #[test]
    fn test_page_serializes_camel_case() {
        let page = Page::new(vec![1], 0, 10, 1);
        let json = serde_json::to_value(&page).unwrap();
        assert_eq!(json["totalElements"], 1);
        assert_eq!(json["totalPages"], 1);
        assert_eq!(json["content"], serde_json::json!([1]));
    }
}
