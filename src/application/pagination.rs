//! Shared page-number pagination helpers.
//!
//! Feeds are sliced into fixed-size, 1-based pages. Requested page numbers
//! arrive as raw query strings and are clamped: anything non-numeric selects
//! page 1, numeric values outside the valid range select the last page.

/// Raw `?page=` value as parsed from the query string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageParam {
    /// No value supplied; page 1.
    Default,
    /// A parsed page number (may still be out of range).
    Number(i64),
    /// Present but not an integer; page 1.
    Invalid,
}

impl PageParam {
    pub fn parse(raw: Option<&str>) -> Self {
        match raw {
            None => PageParam::Default,
            Some(value) => match value.trim().parse::<i64>() {
                Ok(number) => PageParam::Number(number),
                Err(_) => PageParam::Invalid,
            },
        }
    }
}

/// Slices an ordered collection of `total` items into pages of `page_size`.
#[derive(Debug, Clone, Copy)]
pub struct Paginator {
    total: u64,
    page_size: u32,
}

impl Paginator {
    pub fn new(total: u64, page_size: u32) -> Self {
        Self {
            total,
            page_size: page_size.max(1),
        }
    }

    pub fn total(&self) -> u64 {
        self.total
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    /// Total number of pages. An empty collection still has one empty page.
    pub fn num_pages(&self) -> u64 {
        self.total.div_ceil(u64::from(self.page_size)).max(1)
    }

    /// Clamp a requested page to the valid range: missing or non-numeric
    /// input selects page 1, out-of-range numbers select the last page.
    pub fn clamp(&self, requested: PageParam) -> u64 {
        match requested {
            PageParam::Default | PageParam::Invalid => 1,
            PageParam::Number(number) => {
                if number < 1 {
                    self.num_pages()
                } else {
                    (number as u64).min(self.num_pages())
                }
            }
        }
    }

    /// Offset window for the repository query backing `page`.
    pub fn window(&self, page: u64) -> PageWindow {
        let page = page.clamp(1, self.num_pages());
        PageWindow {
            limit: self.page_size,
            offset: (page - 1) * u64::from(self.page_size),
        }
    }
}

/// Limit/offset pair handed to repository list queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageWindow {
    pub limit: u32,
    pub offset: u64,
}

/// One page of a feed, with the aggregates templates need for controls.
#[derive(Debug, Clone)]
pub struct FeedPage<T> {
    pub items: Vec<T>,
    pub number: u64,
    pub total_items: u64,
    pub total_pages: u64,
}

impl<T> FeedPage<T> {
    pub fn new(items: Vec<T>, number: u64, paginator: &Paginator) -> Self {
        Self {
            items,
            number,
            total_items: paginator.total(),
            total_pages: paginator.num_pages(),
        }
    }

    pub fn has_previous(&self) -> bool {
        self.number > 1
    }

    pub fn has_next(&self) -> bool {
        self.number < self.total_pages
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fifteen_items_split_ten_five() {
        let paginator = Paginator::new(15, 10);
        assert_eq!(paginator.num_pages(), 2);
        assert_eq!(paginator.window(1), PageWindow { limit: 10, offset: 0 });
        assert_eq!(
            paginator.window(2),
            PageWindow {
                limit: 10,
                offset: 10
            }
        );
    }

    #[test]
    fn missing_page_selects_first() {
        let paginator = Paginator::new(15, 10);
        assert_eq!(paginator.clamp(PageParam::parse(None)), 1);
    }

    #[test]
    fn non_numeric_page_selects_first() {
        let paginator = Paginator::new(15, 10);
        assert_eq!(paginator.clamp(PageParam::parse(Some("abc"))), 1);
    }

    #[test]
    fn out_of_range_page_selects_last() {
        let paginator = Paginator::new(15, 10);
        assert_eq!(paginator.clamp(PageParam::parse(Some("99"))), 2);
        assert_eq!(paginator.clamp(PageParam::parse(Some("0"))), 2);
        assert_eq!(paginator.clamp(PageParam::parse(Some("-3"))), 2);
    }

    #[test]
    fn empty_collection_has_one_empty_page() {
        let paginator = Paginator::new(0, 10);
        assert_eq!(paginator.num_pages(), 1);
        assert_eq!(paginator.clamp(PageParam::Number(5)), 1);
        assert_eq!(paginator.window(1), PageWindow { limit: 10, offset: 0 });
    }

    #[test]
    fn feed_page_navigation_flags() {
        let paginator = Paginator::new(15, 10);
        let first = FeedPage::new(vec![0u8; 10], 1, &paginator);
        assert!(!first.has_previous());
        assert!(first.has_next());
        assert_eq!(first.total_items, 15);

        let last = FeedPage::new(vec![0u8; 5], 2, &paginator);
        assert!(last.has_previous());
        assert!(!last.has_next());
        assert_eq!(last.total_pages, 2);
    }
}
