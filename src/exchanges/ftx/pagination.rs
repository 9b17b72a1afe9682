use crate::core::errors::FtxError;
use crate::core::kernel::transport::HttpTransport;
use crate::exchanges::ftx::rest::FtxRest;
use crate::exchanges::ftx::types::{unix_seconds, Trade, TradeWindow};
use chrono::{DateTime, Utc};
use futures_util::stream::{self, Stream};
use rust_decimal::Decimal;
use std::collections::HashSet;
use tracing::debug;

/// Trades requested per page; a shorter page means history is exhausted
pub const PAGE_LIMIT: usize = 100;

/// Per-fetch state: ids already emitted and the oldest trade time seen so far
#[derive(Debug, Clone)]
pub struct PaginationCursor {
    seen_ids: HashSet<u64>,
    boundary: Option<DateTime<Utc>>,
    page_limit: usize,
}

/// Result of folding one fetched page into the cursor
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageOutcome {
    /// Trades not seen before, in arrival order
    pub trades: Vec<Trade>,
    pub exhausted: bool,
}

impl Default for PaginationCursor {
    fn default() -> Self {
        Self::new(PAGE_LIMIT)
    }
}

impl PaginationCursor {
    pub fn new(page_limit: usize) -> Self {
        Self {
            seen_ids: HashSet::new(),
            boundary: None,
            page_limit,
        }
    }

    pub const fn boundary(&self) -> Option<DateTime<Utc>> {
        self.boundary
    }

    pub fn seen(&self) -> usize {
        self.seen_ids.len()
    }

    pub const fn page_limit(&self) -> usize {
        self.page_limit
    }

    /// Dedupe a page, record its ids and move the boundary to its oldest trade.
    ///
    /// History is exhausted when the page is empty, shorter than the page
    /// limit, or adds nothing new (the boundary could not move past it).
    pub fn absorb(&mut self, page: Vec<Trade>) -> PageOutcome {
        if page.is_empty() {
            return PageOutcome {
                trades: Vec::new(),
                exhausted: true,
            };
        }

        let fetched = page.len();
        if let Some(oldest) = page.iter().map(|t| t.time).min() {
            self.boundary = Some(oldest);
        }

        let trades: Vec<Trade> = page
            .into_iter()
            .filter(|t| self.seen_ids.insert(t.id))
            .collect();

        PageOutcome {
            exhausted: fetched < self.page_limit || trades.is_empty(),
            trades,
        }
    }
}

/// Best-effort full trade history for one market.
///
/// Pages are fetched strictly one after another, newest first; each follow-up
/// request asks for trades up to the oldest time seen so far. The cursor is
/// only updated once a page has fully arrived, so dropping an in-flight
/// `next_page` future leaves it untouched.
pub struct TradeHistory<'a, T: HttpTransport> {
    rest: &'a FtxRest<T>,
    market: String,
    window: TradeWindow,
    cursor: PaginationCursor,
    done: bool,
}

impl<'a, T: HttpTransport> TradeHistory<'a, T> {
    pub(crate) fn new(rest: &'a FtxRest<T>, market: String) -> Self {
        Self {
            rest,
            market,
            window: TradeWindow::default(),
            cursor: PaginationCursor::default(),
            done: false,
        }
    }

    /// Restrict the fetch to a time window (unix seconds)
    pub fn with_window(mut self, start_time: Option<i64>, end_time: Option<i64>) -> Self {
        self.window.start_time = start_time.map(Decimal::from);
        self.window.end_time = end_time.map(Decimal::from);
        self
    }

    pub fn market(&self) -> &str {
        &self.market
    }

    pub const fn cursor(&self) -> &PaginationCursor {
        &self.cursor
    }

    pub const fn is_done(&self) -> bool {
        self.done
    }

    /// Window for the next request: the caller's window, with `end_time`
    /// replaced by the boundary once one exists.
    ///
    /// The boundary keeps its sub-second part. The venue treats `end_time` as
    /// inclusive, so the oldest trade comes back again and is dropped by the
    /// seen-id set.
    pub fn next_window(&self) -> TradeWindow {
        TradeWindow {
            start_time: self.window.start_time,
            end_time: self
                .cursor
                .boundary()
                .map(unix_seconds)
                .or(self.window.end_time),
            limit: Some(self.cursor.page_limit() as u32),
        }
    }

    /// Fetch the next page and return its new trades, or `None` once history is exhausted
    pub async fn next_page(&mut self) -> Result<Option<Vec<Trade>>, FtxError> {
        if self.done {
            return Ok(None);
        }

        let window = self.next_window();
        let page = self
            .rest
            .get_trades_between(&self.market, window)
            .await?
            .into_result()?;
        let fetched = page.len();

        let outcome = self.cursor.absorb(page);
        self.done = outcome.exhausted;

        debug!(
            market = %self.market,
            fetched,
            new = outcome.trades.len(),
            boundary = ?self.cursor.boundary(),
            done = self.done,
            "Fetched trade page"
        );

        if fetched == 0 {
            Ok(None)
        } else {
            Ok(Some(outcome.trades))
        }
    }

    /// Lazily yield pages of new trades as they are fetched
    pub fn into_stream(self) -> impl Stream<Item = Result<Vec<Trade>, FtxError>> + 'a
    where
        T: 'a,
    {
        stream::try_unfold(self, |mut history| async move {
            let page = history.next_page().await?;
            Ok::<_, FtxError>(page.map(|page| (page, history)))
        })
    }

    /// Drive the fetch to completion and return every trade, each id once, in first-seen order
    pub async fn collect_all(mut self) -> Result<Vec<Trade>, FtxError> {
        let mut results = Vec::new();
        while let Some(page) = self.next_page().await? {
            results.extend(page);
        }
        Ok(results)
    }
}
