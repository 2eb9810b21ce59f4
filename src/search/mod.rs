//! Paginated repository search
//!
//! Walks forward through a cursor-linked result sequence one item at a time,
//! fetching pages lazily through the scheduler and counting results against
//! a caller-supplied predicate. Progress is reported as "ticks": however the
//! walk ends, `on_tick` fires exactly `limit` times, so a caller using the
//! tick count as a progress-bar denominator never sees a partial bar.

use crate::error::{Error, Result};
use crate::pagination::Page;
use crate::retry::Retry;
use crate::scheduler::{ApiRequest, Scheduler};
use crate::types::{JsonValue, SortKey, SortOrder, StatusSink};
use url::Url;

/// Default number of accepted results a search aims for
pub const DEFAULT_LIMIT: usize = 500;

/// Response body field carrying the raw result items
const RESULTS_FIELD: &str = "items";

type TickFn = Box<dyn FnMut() + Send>;
type PlanFn = Box<dyn FnOnce(usize) + Send>;

/// A repository search, configured with a builder and executed with
/// [`Search::run`].
///
/// ```rust,ignore
/// Search::new("language:rust stars:>100")
///     .limit(100)
///     .sort(SortKey::Stars)
///     .on_tick(|| progress.inc(1))
///     .run(&scheduler, |repo| repo["archived"] == false)
///     .await?;
/// ```
pub struct Search {
    query: String,
    limit: usize,
    sort: SortKey,
    order: SortOrder,
    retry: Retry,
    on_tick: Option<TickFn>,
    on_plan: Option<PlanFn>,
    status: StatusSink,
}

impl Search {
    /// Create a search for the given query
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            limit: DEFAULT_LIMIT,
            sort: SortKey::default(),
            order: SortOrder::default(),
            retry: Retry::default(),
            on_tick: None,
            on_plan: None,
            status: StatusSink::silent(),
        }
    }

    /// Number of accepted results to collect. Only results the predicate
    /// accepts count towards this.
    #[must_use]
    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    /// Sort key for the result ranking
    #[must_use]
    pub fn sort(mut self, sort: SortKey) -> Self {
        self.sort = sort;
        self
    }

    /// Sort order for the result ranking
    #[must_use]
    pub fn order(mut self, order: SortOrder) -> Self {
        self.order = order;
        self
    }

    /// Retry policy for page fetches
    #[must_use]
    pub fn retry(mut self, retry: Retry) -> Self {
        self.retry = retry;
        self
    }

    /// Called once per accepted result, and again for every unit left below
    /// `limit` once results run out
    #[must_use]
    pub fn on_tick(mut self, on_tick: impl FnMut() + Send + 'static) -> Self {
        self.on_tick = Some(Box::new(on_tick));
        self
    }

    /// Called exactly once, before any fetch, with the resolved limit
    #[must_use]
    pub fn on_plan(mut self, on_plan: impl FnOnce(usize) + Send + 'static) -> Self {
        self.on_plan = Some(Box::new(on_plan));
        self
    }

    /// Status observer for this search
    #[must_use]
    pub fn on_status(mut self, observer: impl Fn(&str) + Send + Sync + 'static) -> Self {
        self.status = StatusSink::new(observer);
        self
    }

    /// Run the search, handing every raw item to `handle_result`.
    ///
    /// The predicate returns whether the item counts towards `limit`. Items
    /// arrive in page order, every item of a page exactly once. Returns once
    /// `limit` ticks have fired or a fatal response-contract error occurs.
    pub async fn run<H>(mut self, scheduler: &Scheduler, mut handle_result: H) -> Result<()>
    where
        H: FnMut(JsonValue) -> bool + Send,
    {
        let limit = self.limit;
        if let Some(on_plan) = self.on_plan.take() {
            on_plan(limit);
        }

        let mut walker = PageWalker {
            page: Page::seed(self.first_link(scheduler)?),
            retry: self.retry,
            status: self.status,
        };

        let mut accepted = 0usize;
        while accepted < limit {
            let Some(item) = walker.next_item(scheduler).await? else {
                break;
            };
            if !handle_result(item) {
                continue;
            }

            accepted += 1;
            if let Some(on_tick) = self.on_tick.as_mut() {
                on_tick();
            }
        }

        // Results ran dry before the limit: keep ticking so progress
        // consumers always see a full bar
        while accepted < limit {
            accepted += 1;
            if let Some(on_tick) = self.on_tick.as_mut() {
                on_tick();
            }
        }

        Ok(())
    }

    fn first_link(&self, scheduler: &Scheduler) -> Result<String> {
        let mut url = Url::parse(&scheduler.config().endpoint("/search/repositories"))?;
        {
            let mut pairs = url.query_pairs_mut();
            pairs.append_pair("q", &self.query);
            pairs.append_pair("order", self.order.as_str());
            // best-match is the engine's own default; sort is only sent when
            // it deviates
            if self.sort != SortKey::default() {
                pairs.append_pair("sort", self.sort.as_str());
            }
        }

        Ok(url.into())
    }
}

#[cfg(test)]
mod tests;

/// Cursor state for one search run
struct PageWalker {
    page: Page,
    retry: Retry,
    status: StatusSink,
}

impl PageWalker {
    /// Next raw item, fetching a new page only when the current one is
    /// exhausted and a next link exists. `None` means the sequence is done.
    async fn next_item(&mut self, scheduler: &Scheduler) -> Result<Option<JsonValue>> {
        if let Some(item) = self.page.pop() {
            return Ok(Some(item));
        }

        let Some(link) = self.page.next_url().map(str::to_string) else {
            return Ok(None);
        };
        self.fetch_page(scheduler, &link).await?;

        // A fresh page with no items would walk forever; treat it as the end
        Ok(self.page.pop())
    }

    async fn fetch_page(&mut self, scheduler: &Scheduler, link: &str) -> Result<()> {
        self.status.emit("Fetching a new page of results");

        let response = self
            .retry
            .run(&self.status, "Page fetch", || async move {
                let response = scheduler.submit(ApiRequest::get(link)?).await?;
                if !response.status().is_success() {
                    let status = response.status().as_u16();
                    let body = response.text().await.unwrap_or_default();
                    return Err(Error::http_status(status, body));
                }
                Ok(response)
            })
            .await?;

        let headers = response.headers().clone();
        let body: JsonValue = response.json().await?;
        self.page = Page::from_response(body, &headers, RESULTS_FIELD)?;

        Ok(())
    }
}
