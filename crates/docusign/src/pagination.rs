//! Offset pagination for "get many" operations.
//!
//! DocuSign list endpoints take `start_position`/`count` and report
//! `totalSetSize`.  [`paginate`] walks the offsets, stops on whichever comes
//! first (source exhausted, limit reached, time budget spent) and returns
//! the accumulated items in order.

use std::future::Future;
use std::time::Duration;

use serde_json::Value;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::error::Result;

pub const DEFAULT_PAGE_SIZE: usize = 100;
/// Largest `count` the list endpoints honour.
pub const MAX_PAGE_SIZE: usize = 100;
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(300);

/// One fetched page.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Page {
    pub items: Vec<Value>,
    /// Total number of items the source reports, when it reports one.
    pub total_available: Option<usize>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PaginationOptions {
    pub return_all: bool,
    /// Ignored when `return_all` is set.
    pub limit: usize,
    pub page_size: usize,
    pub timeout: Duration,
}

impl Default for PaginationOptions {
    fn default() -> Self {
        Self {
            return_all: false,
            limit: 50,
            page_size: DEFAULT_PAGE_SIZE,
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

/// Position within one listing session.  `offset` never decreases.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageCursor {
    pub offset: usize,
    pub page_size: usize,
    pub total_seen: usize,
}

impl PageCursor {
    fn new(page_size: usize) -> Self {
        Self {
            offset: 0,
            page_size: page_size.clamp(1, MAX_PAGE_SIZE),
            total_seen: 0,
        }
    }

    fn advance(&mut self, fetched: usize) {
        self.offset += fetched;
        self.total_seen += fetched;
    }
}

/// Fetch pages via `fetch_page(offset, count)` until the source is
/// exhausted, the limit is reached, or `options.timeout` elapses.
///
/// A timeout is not an error: whatever was accumulated is returned.
/// Without `return_all` the result holds at most `limit` items.
pub async fn paginate<F, Fut>(mut fetch_page: F, options: &PaginationOptions) -> Result<Vec<Value>>
where
    F: FnMut(usize, usize) -> Fut,
    Fut: Future<Output = Result<Page>>,
{
    let started = Instant::now();
    let mut cursor = PageCursor::new(options.page_size);
    let mut items: Vec<Value> = Vec::new();

    if !options.return_all && options.limit == 0 {
        return Ok(items);
    }

    loop {
        let count = if options.return_all {
            cursor.page_size
        } else {
            cursor.page_size.min(options.limit - items.len())
        };

        debug!(offset = cursor.offset, count, "fetching page");
        let page = fetch_page(cursor.offset, count).await?;
        let fetched = page.items.len();
        cursor.advance(fetched);
        items.extend(page.items);

        if !options.return_all && items.len() >= options.limit {
            items.truncate(options.limit);
            break;
        }

        let exhausted = match page.total_available {
            Some(total) => cursor.offset >= total || fetched == 0,
            None => fetched < count,
        };
        if exhausted {
            break;
        }

        if started.elapsed() >= options.timeout {
            warn!(
                collected = items.len(),
                "pagination time budget of {:?} spent, returning partial results",
                options.timeout
            );
            break;
        }
    }

    info!(total = items.len(), pages_offset = cursor.offset, "listing complete");
    Ok(items)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::cell::RefCell;

    /// A source of `n` numbered items that reports its total.
    fn source(n: usize) -> impl Fn(usize, usize) -> Page {
        move |offset, count| {
            let end = (offset + count).min(n);
            Page {
                items: (offset.min(n)..end).map(|i| json!({ "n": i })).collect(),
                total_available: Some(n),
            }
        }
    }

    #[tokio::test]
    async fn limit_truncates_and_bounds_fetch_count() {
        let src = source(25);
        let calls = RefCell::new(Vec::new());
        let opts = PaginationOptions {
            return_all: false,
            limit: 10,
            ..Default::default()
        };

        let items = paginate(
            |offset, count| {
                calls.borrow_mut().push((offset, count));
                let page = src(offset, count);
                async move { Ok(page) }
            },
            &opts,
        )
        .await
        .unwrap();

        assert_eq!(items.len(), 10);
        assert_eq!(items[9]["n"], 9);
        // ceil(10 / 100) = 1
        assert_eq!(calls.borrow().len(), 1);
    }

    #[tokio::test]
    async fn limit_with_small_pages() {
        let src = source(25);
        let calls = RefCell::new(0usize);
        let opts = PaginationOptions {
            return_all: false,
            limit: 10,
            page_size: 3,
            ..Default::default()
        };

        let items = paginate(
            |offset, count| {
                *calls.borrow_mut() += 1;
                let page = src(offset, count);
                async move { Ok(page) }
            },
            &opts,
        )
        .await
        .unwrap();

        assert_eq!(items.len(), 10);
        // ceil(10 / 3) = 4
        assert!(*calls.borrow() <= 4);
        let ns: Vec<u64> = items.iter().map(|v| v["n"].as_u64().unwrap()).collect();
        assert_eq!(ns, (0..10).collect::<Vec<u64>>());
    }

    #[tokio::test]
    async fn return_all_walks_every_page_in_order() {
        let src = source(250);
        let offsets = RefCell::new(Vec::new());
        let opts = PaginationOptions {
            return_all: true,
            ..Default::default()
        };

        let items = paginate(
            |offset, count| {
                offsets.borrow_mut().push(offset);
                let page = src(offset, count);
                async move { Ok(page) }
            },
            &opts,
        )
        .await
        .unwrap();

        assert_eq!(items.len(), 250);
        assert_eq!(*offsets.borrow(), vec![0, 100, 200]);
        assert_eq!(items[249]["n"], 249);
    }

    #[tokio::test]
    async fn short_page_ends_listing_without_total() {
        let opts = PaginationOptions {
            return_all: true,
            page_size: 10,
            ..Default::default()
        };
        let calls = RefCell::new(0usize);

        let items = paginate(
            |offset, _count| {
                *calls.borrow_mut() += 1;
                let n = if offset == 0 { 10 } else { 4 };
                async move {
                    Ok(Page {
                        items: vec![json!({}); n],
                        total_available: None,
                    })
                }
            },
            &opts,
        )
        .await
        .unwrap();

        assert_eq!(items.len(), 14);
        assert_eq!(*calls.borrow(), 2);
    }

    #[tokio::test]
    async fn page_size_is_capped() {
        let opts = PaginationOptions {
            return_all: true,
            page_size: 5000,
            ..Default::default()
        };
        let counts = RefCell::new(Vec::new());
        let src = source(150);

        paginate(
            |offset, count| {
                counts.borrow_mut().push(count);
                let page = src(offset, count);
                async move { Ok(page) }
            },
            &opts,
        )
        .await
        .unwrap();

        assert!(counts.borrow().iter().all(|&c| c == MAX_PAGE_SIZE));
    }

    #[tokio::test(start_paused = true)]
    async fn timeout_returns_partial_results() {
        let opts = PaginationOptions {
            return_all: true,
            page_size: 10,
            timeout: Duration::from_secs(25),
            ..Default::default()
        };

        // An endless source where every page takes ten seconds.
        let items = paginate(
            |_offset, count| async move {
                tokio::time::sleep(Duration::from_secs(10)).await;
                Ok(Page {
                    items: vec![json!({}); count],
                    total_available: None,
                })
            },
            &opts,
        )
        .await
        .unwrap();

        // Pages finish at 10s, 20s, 30s; the budget check after the third stops it.
        assert_eq!(items.len(), 30);
    }

    #[tokio::test]
    async fn fetch_errors_propagate() {
        let opts = PaginationOptions::default();
        let result = paginate(
            |_, _| async { Err(crate::DocuSignError::validation("boom")) },
            &opts,
        )
        .await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn zero_limit_fetches_nothing() {
        let opts = PaginationOptions {
            limit: 0,
            ..Default::default()
        };
        let calls = RefCell::new(0usize);
        let items = paginate(
            |_, _| {
                *calls.borrow_mut() += 1;
                async { Ok(Page::default()) }
            },
            &opts,
        )
        .await
        .unwrap();
        assert!(items.is_empty());
        assert_eq!(*calls.borrow(), 0);
    }
}
