//! Draining multi-page listings
//!
//! Pages are fetched one after another. The absence of a next-page URL is
//! the only way a listing ends; an empty page that still links onward is
//! followed. Any failure discards everything gathered so far.

use archivum_domain::{ArchivumError, Page, Result};
use async_trait::async_trait;
use tracing::{debug, instrument};

/// Fetches the raw body of one page.
#[async_trait]
pub trait PageSource: Send + Sync {
    async fn fetch_page(&self, url: &str) -> Result<String>;
}

/// Follow `first_url` and every next-page link, collecting all items in
/// page order.
///
/// `max_pages` bounds the number of pages fetched. Reaching the bound while
/// a next link is still present is an error rather than a silent
/// truncation.
///
/// # Errors
/// Returns the first fetch or parse error, or `ArchivumError::Pagination`
/// when the page bound is exceeded. No partial result is returned.
#[instrument(skip(source, parse_page))]
pub async fn drain<T, P>(
    source: &dyn PageSource,
    first_url: &str,
    max_pages: Option<u32>,
    mut parse_page: P,
) -> Result<Vec<T>>
where
    P: FnMut(&str) -> Result<Page<T>> + Send,
    T: Send,
{
    let mut items = Vec::new();
    let mut next = Some(first_url.to_string());
    let mut fetched: u32 = 0;

    while let Some(url) = next.take() {
        if let Some(limit) = max_pages {
            if fetched >= limit {
                return Err(ArchivumError::Pagination(format!(
                    "listing starting at {first_url} exceeded {limit} pages"
                )));
            }
        }

        let body = source.fetch_page(&url).await?;
        let page = parse_page(&body)?;
        fetched += 1;

        debug!(page = fetched, items = page.items.len(), last = page.is_last(), "fetched page");
        items.extend(page.items);
        next = page.next_page_url;
    }

    Ok(items)
}
