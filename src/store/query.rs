//! Search and pagination for list requests.

use crate::error::BackofficeError;

/// Parameters of a list request: an optional search term and a 1-based page number.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct ListQuery {
    pub q: Option<String>,
    pub page: u32,
}

impl Default for ListQuery {
    fn default() -> Self {
        ListQuery { q: None, page: 1 }
    }
}

impl ListQuery {
    pub fn search(q: impl Into<String>) -> Self {
        ListQuery { q: Some(q.into()), page: 1 }
    }

    pub fn page(mut self, page: u32) -> Self {
        self.page = page;
        self
    }

    /// The search term, lowercased, or `None` when blank.
    pub fn needle(&self) -> Option<String> {
        self.q
            .as_deref()
            .map(str::trim)
            .filter(|q| !q.is_empty())
            .map(str::to_lowercase)
    }
}

/// Case-insensitive substring match of a lowercased `needle` against any of `fields`.
pub fn matches_any<'a>(needle: &str, fields: impl IntoIterator<Item = &'a str>) -> bool {
    fields.into_iter().any(|f| f.to_lowercase().contains(needle))
}

/// One page of a listing.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    /// 1-based page number.
    pub number: u32,
    pub num_pages: u32,
    /// Matching rows across all pages.
    pub total: usize,
}

impl<T> Page<T> {
    pub fn has_next(&self) -> bool {
        self.number < self.num_pages
    }

    pub fn has_previous(&self) -> bool {
        self.number > 1
    }

    /// Every row on a single page, for unpaginated listings.
    pub fn single(items: Vec<T>) -> Self {
        let total = items.len();
        Page { items, number: 1, num_pages: 1, total }
    }
}

/// Slices `rows` into the requested page.
///
/// An empty listing still has page 1. Page 0 and pages past the end are rejected.
pub fn paginate<T>(rows: Vec<T>, page: u32, page_size: usize) -> Result<Page<T>, BackofficeError> {
    let total = rows.len();
    let size = page_size.max(1);
    let num_pages = total.div_ceil(size).max(1) as u32;
    if page == 0 || page > num_pages {
        return Err(BackofficeError::InvalidPage(page));
    }
    let start = (page as usize - 1) * size;
    let items = rows.into_iter().skip(start).take(size).collect();
    Ok(Page { items, number: page, num_pages, total })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paginates_in_fixed_size_pages() {
        let rows: Vec<u32> = (1..=23).collect();
        let page = paginate(rows.clone(), 3, 10).unwrap();
        assert_eq!(page.items, vec![21, 22, 23]);
        assert_eq!(page.num_pages, 3);
        assert_eq!(page.total, 23);
        assert!(!page.has_next());
        assert!(page.has_previous());
        assert!(matches!(paginate(rows.clone(), 4, 10), Err(BackofficeError::InvalidPage(4))));
        assert!(matches!(paginate(rows, 0, 10), Err(BackofficeError::InvalidPage(0))));
    }

    #[test]
    fn empty_listing_has_one_page() {
        let page = paginate(Vec::<u32>::new(), 1, 10).unwrap();
        assert!(page.items.is_empty());
        assert_eq!(page.num_pages, 1);
        assert!(paginate(Vec::<u32>::new(), 2, 10).is_err());
    }

    #[test]
    fn needle_is_trimmed_and_lowercased() {
        assert_eq!(ListQuery::search("  Cancún ").needle().as_deref(), Some("cancún"));
        assert_eq!(ListQuery::search("   ").needle(), None);
        assert_eq!(ListQuery::default().needle(), None);
        assert!(matches_any("lima", ["Trip to LIMA", "x"]));
        assert!(!matches_any("lima", ["Cusco"]));
    }
}
