//! Infinite-scroll bookkeeping for one movie listing.
//!
//! A [`Listing`] never fetches anything itself. It hands out [`Ticket`]s for
//! the page that should be requested next and accepts the outcome of each
//! ticket, so the widget driving it controls I/O and timing. Tickets issued
//! before a [`Listing::reset`] are rejected, which is how results of requests
//! abandoned by navigation are kept out of the new listing.

use std::{collections::HashSet, future::Future};

use crate::models::{MovieSummary, Paged};

pub const DEFAULT_CAP: usize = 100;

pub trait Identified {
    fn id(&self) -> i32;
}

impl Identified for MovieSummary {
    fn id(&self) -> i32 {
        self.id
    }
}

/// Anything that can produce page `n` of a list.
pub trait PageSource<T> {
    type Error;

    fn fetch(&self, page: u32) -> impl Future<Output = Result<Paged<T>, Self::Error>> + Send;
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Phase {
    Idle,
    Loading,
    Loaded,
    LoadingMore,
    /// No further pages: upstream ran out or the cap was reached.
    Exhausted,
    /// The first page failed; nothing to show.
    Failed,
    /// A later page failed; accumulated items stay and auto-loading stops.
    Stalled,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Ticket {
    generation: u64,
    page: u32,
}

impl Ticket {
    pub fn page(&self) -> u32 {
        self.page
    }
}

#[derive(Debug)]
pub struct Listing<T> {
    cap: usize,
    generation: u64,
    phase: Phase,
    page: u32,
    total_pages: u32,
    items: Vec<T>,
    seen: HashSet<i32>,
    in_flight: Option<Ticket>,
    error: Option<String>,
}

impl<T: Identified> Default for Listing<T> {
    fn default() -> Self {
        Self::with_cap(DEFAULT_CAP)
    }
}

impl<T: Identified> Listing<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_cap(cap: usize) -> Self {
        Self {
            cap,
            generation: 0,
            phase: Phase::Idle,
            page: 0,
            total_pages: 0,
            items: Vec::new(),
            seen: HashSet::new(),
            in_flight: None,
            error: None,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn items(&self) -> &[T] {
        &self.items
    }

    pub fn into_items(self) -> Vec<T> {
        self.items
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn total_pages(&self) -> u32 {
        self.total_pages
    }

    /// Failure message of the first page, or the non-blocking notice of a
    /// failed "load more".
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn is_loading(&self) -> bool {
        self.in_flight.is_some()
    }

    pub fn is_capped(&self) -> bool {
        self.items.len() >= self.cap
    }

    pub fn has_more(&self) -> bool {
        self.page < self.total_pages && !self.is_capped()
    }

    /// Requests the first page. Only valid from `Idle`.
    pub fn start(&mut self) -> Option<Ticket> {
        (self.phase == Phase::Idle).then(|| self.issue(1, Phase::Loading))
    }

    /// Called whenever the scroll sensor fires. Returns the next page to
    /// request, or `None` when a fetch is already running, the listing is not
    /// in a loaded state, or nothing is left.
    pub fn on_near_end(&mut self) -> Option<Ticket> {
        if self.phase != Phase::Loaded || self.in_flight.is_some() || !self.has_more() {
            return None;
        }
        Some(self.issue(self.page + 1, Phase::LoadingMore))
    }

    /// Manual retry after a failure. From `Failed` the first page is
    /// requested again; from `Stalled` the page that failed.
    pub fn retry(&mut self) -> Option<Ticket> {
        match self.phase {
            Phase::Failed => {
                self.error = None;
                Some(self.issue(1, Phase::Loading))
            },
            Phase::Stalled => {
                self.error = None;
                Some(self.issue(self.page + 1, Phase::LoadingMore))
            },
            _ => None,
        }
    }

    /// Drops everything and returns to `Idle`. Outstanding tickets become
    /// stale.
    pub fn reset(&mut self) {
        self.generation += 1;
        self.phase = Phase::Idle;
        self.page = 0;
        self.total_pages = 0;
        self.items.clear();
        self.seen.clear();
        self.in_flight = None;
        self.error = None;
    }

    /// Applies a fetched page. Returns `false` and changes nothing when the
    /// ticket is stale or was never issued.
    pub fn apply_page(&mut self, ticket: Ticket, envelope: Paged<T>) -> bool {
        if self.in_flight != Some(ticket) {
            return false;
        }
        self.in_flight = None;
        self.page = envelope.page.max(ticket.page);
        self.total_pages = envelope.total_pages;

        for item in envelope.results {
            if self.is_capped() {
                break;
            }
            if self.seen.insert(item.id()) {
                self.items.push(item);
            }
        }

        self.phase = if self.has_more() { Phase::Loaded } else { Phase::Exhausted };
        true
    }

    pub fn apply_error(&mut self, ticket: Ticket, message: impl Into<String>) -> bool {
        if self.in_flight != Some(ticket) {
            return false;
        }
        self.in_flight = None;
        self.error = Some(message.into());
        self.phase = if self.phase == Phase::Loading { Phase::Failed } else { Phase::Stalled };
        true
    }

    /// Footer text once the listing stops growing.
    pub fn end_message(&self) -> Option<String> {
        if self.phase != Phase::Exhausted || self.items.is_empty() {
            return None;
        }
        if self.is_capped() {
            Some(format!("Showing top {} movies", self.cap))
        } else {
            Some("You've reached the end!".to_string())
        }
    }

    fn issue(&mut self, page: u32, phase: Phase) -> Ticket {
        let ticket = Ticket { generation: self.generation, page };
        self.in_flight = Some(ticket);
        self.phase = phase;
        ticket
    }
}

/// Walks `source` from page 1 until the listing is exhausted or capped.
pub async fn collect<T, S>(source: &S, cap: usize) -> Result<Listing<T>, S::Error>
where
    T: Identified,
    S: PageSource<T>,
{
    let mut listing = Listing::with_cap(cap);
    let mut next = listing.start();
    while let Some(ticket) = next {
        let page = source.fetch(ticket.page()).await?;
        listing.apply_page(ticket, page);
        next = listing.on_near_end();
    }
    Ok(listing)
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;

    #[derive(Clone, Debug, PartialEq)]
    struct Item(i32);

    impl Identified for Item {
        fn id(&self) -> i32 {
            self.0
        }
    }

    fn envelope(page: u32, total_pages: u32, ids: impl IntoIterator<Item = i32>) -> Paged<Item> {
        Paged { page, results: ids.into_iter().map(Item).collect(), total_pages, total_results: None }
    }

    fn ids(listing: &Listing<Item>) -> Vec<i32> {
        listing.items().iter().map(|i| i.0).collect()
    }

    /// Serves `pages` pages of `per_page` sequential ids and records what was
    /// asked for.
    struct Pages {
        per_page: i32,
        pages: u32,
        requested: Mutex<Vec<u32>>,
    }

    impl PageSource<Item> for Pages {
        type Error = String;

        async fn fetch(&self, page: u32) -> Result<Paged<Item>, String> {
            self.requested.lock().unwrap().push(page);
            if page > self.pages {
                return Err(format!("page {page} out of range"));
            }
            let start = (page as i32 - 1) * self.per_page;
            Ok(envelope(page, self.pages, start..start + self.per_page))
        }
    }

    #[test]
    fn first_page_then_more() {
        let mut listing = Listing::new();
        assert_eq!(listing.phase(), Phase::Idle);
        assert_eq!(listing.on_near_end(), None);

        let t1 = listing.start().unwrap();
        assert_eq!(t1.page(), 1);
        assert_eq!(listing.phase(), Phase::Loading);
        assert_eq!(listing.start(), None);

        assert!(listing.apply_page(t1, envelope(1, 3, 0..20)));
        assert_eq!(listing.phase(), Phase::Loaded);
        assert!(listing.has_more());

        let t2 = listing.on_near_end().unwrap();
        assert_eq!(t2.page(), 2);
        assert_eq!(listing.phase(), Phase::LoadingMore);
        // sensor fires again while page 2 is in flight
        assert_eq!(listing.on_near_end(), None);

        listing.apply_page(t2, envelope(2, 3, 20..40));
        assert_eq!(listing.items().len(), 40);
        assert_eq!(listing.page(), 2);
    }

    #[test]
    fn reaching_total_pages_exhausts() {
        let mut listing = Listing::new();
        let t1 = listing.start().unwrap();
        listing.apply_page(t1, envelope(1, 2, 0..5));
        let t2 = listing.on_near_end().unwrap();
        listing.apply_page(t2, envelope(2, 2, 5..10));

        assert_eq!(listing.phase(), Phase::Exhausted);
        assert_eq!(listing.end_message().as_deref(), Some("You've reached the end!"));
        for _ in 0..5 {
            assert_eq!(listing.on_near_end(), None);
        }
    }

    #[test]
    fn overlapping_pages_are_deduped() {
        let mut listing = Listing::new();
        let t1 = listing.start().unwrap();
        listing.apply_page(t1, envelope(1, 3, [1, 2, 3]));
        let t2 = listing.on_near_end().unwrap();
        listing.apply_page(t2, envelope(2, 3, [3, 4, 1, 5]));
        assert_eq!(ids(&listing), vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn cap_stops_loading() {
        let mut listing = Listing::with_cap(30);
        let t1 = listing.start().unwrap();
        listing.apply_page(t1, envelope(1, 50, 0..20));
        let t2 = listing.on_near_end().unwrap();
        listing.apply_page(t2, envelope(2, 50, 20..40));

        assert_eq!(listing.items().len(), 30);
        assert_eq!(listing.phase(), Phase::Exhausted);
        assert!(!listing.has_more());
        assert_eq!(listing.on_near_end(), None);
        assert_eq!(listing.end_message().as_deref(), Some("Showing top 30 movies"));
    }

    #[test]
    fn reset_discards_results_and_stale_tickets() {
        let mut listing = Listing::new();
        let old = listing.start().unwrap();
        listing.reset();
        assert_eq!(listing.phase(), Phase::Idle);

        let fresh = listing.start().unwrap();
        assert_eq!(fresh.page(), 1);
        assert_ne!(old, fresh);

        // the abandoned request resolves late
        assert!(!listing.apply_page(old, envelope(1, 5, [99])));
        assert!(listing.items().is_empty());
        assert_eq!(listing.phase(), Phase::Loading);

        assert!(listing.apply_page(fresh, envelope(1, 5, [7])));
        assert_eq!(ids(&listing), vec![7]);
    }

    #[test]
    fn reset_after_loading_clears_items() {
        let mut listing = Listing::new();
        let t1 = listing.start().unwrap();
        listing.apply_page(t1, envelope(1, 5, 0..20));
        listing.reset();
        assert!(listing.items().is_empty());
        assert_eq!(listing.page(), 0);
        assert_eq!(listing.total_pages(), 0);
    }

    #[test]
    fn first_page_failure_is_retryable() {
        let mut listing = Listing::new();
        let t1 = listing.start().unwrap();
        assert!(listing.apply_error(t1, "Failed to load movies"));
        assert_eq!(listing.phase(), Phase::Failed);
        assert_eq!(listing.error(), Some("Failed to load movies"));
        assert_eq!(listing.on_near_end(), None);
        assert_eq!(listing.end_message(), None);

        let again = listing.retry().unwrap();
        assert_eq!(again.page(), 1);
        assert_eq!(listing.error(), None);
        listing.apply_page(again, envelope(1, 1, [1]));
        assert_eq!(listing.phase(), Phase::Exhausted);
    }

    #[test]
    fn load_more_failure_keeps_items() {
        let mut listing = Listing::new();
        let t1 = listing.start().unwrap();
        listing.apply_page(t1, envelope(1, 4, 0..20));
        let t2 = listing.on_near_end().unwrap();
        listing.apply_error(t2, "network down");

        assert_eq!(listing.phase(), Phase::Stalled);
        assert_eq!(listing.items().len(), 20);
        assert_eq!(listing.error(), Some("network down"));
        assert_eq!(listing.on_near_end(), None);

        let t2_again = listing.retry().unwrap();
        assert_eq!(t2_again.page(), 2);
        listing.apply_page(t2_again, envelope(2, 4, 20..40));
        assert_eq!(listing.phase(), Phase::Loaded);
        assert_eq!(listing.items().len(), 40);
    }

    #[test]
    fn empty_first_page_has_no_end_message() {
        let mut listing = Listing::<Item>::new();
        let t1 = listing.start().unwrap();
        listing.apply_page(t1, envelope(1, 1, []));
        assert_eq!(listing.phase(), Phase::Exhausted);
        assert_eq!(listing.end_message(), None);
    }

    #[tokio::test]
    async fn collect_walks_pages_in_order_up_to_cap() {
        let source = Pages { per_page: 20, pages: 50, requested: Mutex::new(Vec::new()) };
        let listing = collect(&source, DEFAULT_CAP).await.unwrap();

        assert_eq!(*source.requested.lock().unwrap(), vec![1, 2, 3, 4, 5]);
        assert_eq!(listing.items().len(), 100);
        assert_eq!(ids(&listing), (0..100).collect::<Vec<_>>());
        assert_eq!(listing.phase(), Phase::Exhausted);
    }

    #[tokio::test]
    async fn collect_matches_manual_concatenation() {
        let source = Pages { per_page: 7, pages: 3, requested: Mutex::new(Vec::new()) };
        let listing = collect(&source, DEFAULT_CAP).await.unwrap();

        let mut manual = Vec::new();
        for page in 1..=3 {
            for item in source.fetch(page).await.unwrap().results {
                if !manual.contains(&item.0) {
                    manual.push(item.0);
                }
            }
        }
        assert_eq!(ids(&listing), manual);
    }

    #[tokio::test]
    async fn collect_propagates_errors() {
        // upstream claims more pages than it serves
        struct Liar;
        impl PageSource<Item> for Liar {
            type Error = String;
            async fn fetch(&self, page: u32) -> Result<Paged<Item>, String> {
                if page == 1 { Ok(envelope(1, 2, [1])) } else { Err("boom".into()) }
            }
        }
        assert_eq!(collect(&Liar, 10).await.unwrap_err(), "boom");
    }
}
