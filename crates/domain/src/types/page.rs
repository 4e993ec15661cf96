//! One page of a paginated listing

/// A single chunk of a multi-page listing.
///
/// The absence of `next_page_url` is the only terminal condition. A page
/// with no items but a next URL is valid and must still be followed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub next_page_url: Option<String>,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, next_page_url: Option<String>) -> Self {
        Self { items, next_page_url }
    }

    pub fn is_last(&self) -> bool {
        self.next_page_url.is_none()
    }
}
