//! Count-then-page retrieval.
//!
//! Paged listings are fetched by first asking for the total, then walking
//! offsets with a fixed page size:
//!
//! ```ignore
//! let names = fetch_all(
//!     || client.count_names(),
//!     |offset, count| client.names_page(offset, count),
//!     NAME_PAGE_SIZE,
//! )?;
//! ```
//!
//! Each request asks for `min(page_size, remaining)` items and the reply must
//! contain exactly that many. A server that returns more or fewer items than
//! requested is treated as misbehaving, so `N` items always take exactly
//! `ceil(N / page_size)` page calls.

use tracing::warn;

use crate::error::RpcError;

/// Page size for name listings.
pub const NAME_PAGE_SIZE: u64 = 100;
/// Page size for history rows and per-block operations.
pub const HISTORY_PAGE_SIZE: u64 = 10;

/// Upper bound on the capacity reserved up front; the count is untrusted.
const MAX_PREALLOCATE: u64 = 1024;

pub struct Paginator<T, F>
where
    F: FnMut(u64, u64) -> Result<Vec<T>, RpcError>,
{
    start: u64,
    total: u64,
    page_size: u64,
    fetch_fn: F,
    collected: u64,
    pages_requested: u64,
}

impl<T, F> Paginator<T, F>
where
    F: FnMut(u64, u64) -> Result<Vec<T>, RpcError>,
{
    /// - `start`: offset of the first item
    /// - `total`: number of items to fetch
    /// - `fetch_fn`: fetches `(offset, count)` items
    pub fn new(start: u64, total: u64, page_size: u64, fetch_fn: F) -> Self {
        Self {
            start,
            total,
            page_size: page_size.max(1),
            fetch_fn,
            collected: 0,
            pages_requested: 0,
        }
    }

    pub fn next_page(&mut self) -> Result<Option<Vec<T>>, RpcError> {
        if self.collected >= self.total {
            return Ok(None);
        }

        let request_size = (self.total - self.collected).min(self.page_size);
        let offset = self.start + self.collected;
        let page = (self.fetch_fn)(offset, request_size)?;
        self.pages_requested += 1;

        let received = page.len() as u64;
        if received > request_size {
            warn!(offset, request_size, received, "page larger than requested");
            return Err(RpcError::integrity("server replied too much data"));
        }
        if received < request_size {
            warn!(offset, request_size, received, "page smaller than requested");
            return Err(RpcError::integrity("server replied too little data"));
        }

        self.collected += received;
        Ok(Some(page))
    }

    pub fn collect_all(mut self) -> Result<Vec<T>, RpcError> {
        let mut all_items = Vec::with_capacity(self.total.min(MAX_PREALLOCATE) as usize);

        while let Some(page) = self.next_page()? {
            all_items.extend(page);
        }

        Ok(all_items)
    }

    pub fn pages_requested(&self) -> u64 {
        self.pages_requested
    }
}

/// Ask for the total with `count_fn`, then fetch every page.
pub fn fetch_all<T, C, F>(count_fn: C, page_fn: F, page_size: u64) -> Result<Vec<T>, RpcError>
where
    C: FnOnce() -> Result<u64, RpcError>,
    F: FnMut(u64, u64) -> Result<Vec<T>, RpcError>,
{
    let total = count_fn()?;
    Paginator::new(0, total, page_size, page_fn).collect_all()
}

/// Number of page calls needed for `total` items.
pub fn page_count(total: u64, page_size: u64) -> u64 {
    total.div_ceil(page_size.max(1))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ErrorKind;

    fn honest(total: u64) -> impl FnMut(u64, u64) -> Result<Vec<u64>, RpcError> {
        move |offset, count| Ok((offset..(offset + count).min(total)).collect())
    }

    #[test]
    fn test_exact_page_walk() {
        let mut requests = Vec::new();
        let items = fetch_all(
            || Ok(250),
            |offset, count| {
                requests.push((offset, count));
                honest(250)(offset, count)
            },
            NAME_PAGE_SIZE,
        )
        .unwrap();
        assert_eq!(items, (0..250).collect::<Vec<_>>());
        assert_eq!(requests, vec![(0, 100), (100, 100), (200, 50)]);
    }

    #[test]
    fn test_zero_total_makes_no_page_calls() {
        let mut paginator = Paginator::new(0, 0, HISTORY_PAGE_SIZE, |_, _| -> Result<Vec<u64>, RpcError> {
            panic!("no page should be requested")
        });
        assert!(paginator.next_page().unwrap().is_none());
        assert_eq!(paginator.pages_requested(), 0);
    }

    #[test]
    fn test_oversized_page_is_rejected() {
        let err = fetch_all(|| Ok(5), |offset, count| Ok((offset..offset + count + 1).collect::<Vec<u64>>()), 10)
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Integrity);
        assert_eq!(err.message(), "server replied too much data");
    }

    #[test]
    fn test_short_page_is_rejected() {
        let err = fetch_all(|| Ok(25), honest(15), 10).unwrap_err();
        assert_eq!(err.message(), "server replied too little data");
    }

    #[test]
    fn test_count_error_propagates() {
        let err = fetch_all(
            || Err(RpcError::Transport("down".into())),
            honest(1),
            10,
        )
        .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Transport);
    }

    #[test]
    fn test_start_offset() {
        let mut paginator = Paginator::new(40, 15, 10, honest(100));
        assert_eq!(paginator.next_page().unwrap().unwrap(), (40..50).collect::<Vec<_>>());
        assert_eq!(paginator.next_page().unwrap().unwrap(), (50..55).collect::<Vec<_>>());
        assert!(paginator.next_page().unwrap().is_none());
        assert_eq!(paginator.pages_requested(), 2);
    }

    mod property_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn prop_page_calls_are_ceil(total in 0u64..2_000, page_size in 1u64..150) {
                let mut paginator = Paginator::new(0, total, page_size, honest(total));
                let mut items = 0u64;
                while let Some(page) = paginator.next_page().unwrap() {
                    items += page.len() as u64;
                }
                prop_assert_eq!(items, total);
                prop_assert_eq!(paginator.pages_requested(), page_count(total, page_size));
            }
        }
    }
}
