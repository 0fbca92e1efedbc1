use serde::{Deserialize, Serialize};

/// Window of a listing, as an offset and a maximum number of rows
///
/// # Example
/// ```
/// use meter_report_db::repository::pagination::PageRequest;
///
/// let third = PageRequest::for_page(10, 3);
/// assert_eq!(third.offset, 20);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub limit: usize,
    pub offset: usize,
}

impl PageRequest {
    /// Window of the 1-based page `page_number`; page 0 is read as page 1.
    pub fn for_page(page_size: usize, page_number: usize) -> Self {
        Self {
            limit: page_size,
            offset: (page_number.max(1) - 1) * page_size,
        }
    }
}

impl Default for PageRequest {
    /// First page of ten, the default of every report listing.
    fn default() -> Self {
        Self::for_page(10, 1)
    }
}

/// One window of a filtered listing, with the size of the whole listing in `total`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: usize,
    pub limit: usize,
    pub offset: usize,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, total: usize, limit: usize, offset: usize) -> Self {
        Self {
            items,
            total,
            limit,
            offset,
        }
    }

    /// A page for `page` when nothing can match, e.g. a role restricted to no ids.
    pub fn empty(page: PageRequest) -> Self {
        Self::new(Vec::new(), 0, page.limit, page.offset)
    }

    /// Cuts the requested window out of an already filtered and ordered result set.
    ///
    /// # Example
    /// ```
    /// use meter_report_db::repository::pagination::{Page, PageRequest};
    ///
    /// let page = Page::from_filtered(vec![1, 2, 3, 4, 5], PageRequest::for_page(2, 3));
    /// assert_eq!(page.items, vec![5]);
    /// assert_eq!(page.total, 5);
    /// ```
    pub fn from_filtered(all: Vec<T>, page: PageRequest) -> Self {
        let total = all.len();
        let items = all.into_iter().skip(page.offset).take(page.limit).collect();
        Self::new(items, total, page.limit, page.offset)
    }

    pub fn current_page(&self) -> usize {
        match self.limit {
            0 => 1,
            limit => self.offset / limit + 1,
        }
    }

    pub fn total_pages(&self) -> usize {
        match self.limit {
            0 => 1,
            limit => self.total.div_ceil(limit),
        }
    }

    /// Transforms the items, keeping the window.
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            total: self.total,
            limit: self.limit,
            offset: self.offset,
        }
    }

    pub fn meta(&self) -> PageMeta {
        PageMeta {
            total_items: self.total,
            item_count: self.items.len(),
            items_per_page: self.limit,
            total_pages: self.total_pages(),
            current_page: self.current_page(),
        }
    }
}

/// Listing metadata as exposed to clients
///
/// # Example
/// ```
/// use meter_report_db::repository::pagination::Page;
///
/// let page = Page::new(vec!["a", "b"], 12, 5, 10);
/// let meta = page.meta();
/// assert_eq!(meta.current_page, 3);
/// assert_eq!(meta.total_pages, 3);
/// assert_eq!(meta.item_count, 2);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageMeta {
    pub total_items: usize,
    pub item_count: usize,
    pub items_per_page: usize,
    pub total_pages: usize,
    pub current_page: usize,
}

/// A page of items together with its metadata, as returned by listings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Paginated<T> {
    pub data: Vec<T>,
    pub meta: PageMeta,
}

impl<T> From<Page<T>> for Paginated<T> {
    fn from(page: Page<T>) -> Self {
        let meta = page.meta();
        Self {
            data: page.items,
            meta,
        }
    }
}
