//! Cursor-style traversal of a paginated collection.

use std::collections::VecDeque;
use std::mem;

use reqwest::header::{HeaderMap, AUTHORIZATION};
use reqwest::Client;
use tracing::{debug, warn};
use url::{Origin, Url};

use super::apis::{ApiResource, Page};
use crate::error::{ClientError, Result};

/// Query used to request the first page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u32,
    pub size: u32,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self { page: 1, size: 10 }
    }
}

impl PageRequest {
    pub(crate) fn apply(&self, url: &mut Url) {
        url.query_pairs_mut()
            .append_pair("page", &self.page.to_string())
            .append_pair("size", &self.size.to_string());
    }
}

#[derive(Debug)]
enum State {
    Fetching(Url),
    Done,
}

/// Walks a collection by following each page's `links.next` until it runs out.
///
/// One request is in flight at a time. Any failure ends the traversal; items
/// already handed out stay valid. A finished pager cannot be restarted.
/// `Authorization` is only sent to the origin of the first page.
#[derive(Debug)]
pub struct Pager {
    http: Client,
    headers: HeaderMap,
    origin: Origin,
    state: State,
    buffered: VecDeque<ApiResource>,
    pages_fetched: usize,
}

impl Pager {
    pub fn new(http: Client, headers: HeaderMap, start: Url) -> Self {
        Self {
            http,
            headers,
            origin: start.origin(),
            state: State::Fetching(start),
            buffered: VecDeque::new(),
            pages_fetched: 0,
        }
    }

    pub fn is_done(&self) -> bool {
        matches!(self.state, State::Done) && self.buffered.is_empty()
    }

    pub fn pages_fetched(&self) -> usize {
        self.pages_fetched
    }

    /// Fetch the next page. `Ok(None)` once the last page has been consumed.
    ///
    /// Items buffered by [`Pager::next_item`] are not returned here.
    pub async fn next_page(&mut self) -> Result<Option<Vec<ApiResource>>> {
        // Leaving Done in place means every early return below terminates the traversal.
        let url = match mem::replace(&mut self.state, State::Done) {
            State::Fetching(url) => url,
            State::Done => return Ok(None),
        };

        let mut headers = self.headers.clone();
        if url.origin() != self.origin {
            warn!(url = %url, "next page is on another origin, sending it without credentials");
            headers.remove(AUTHORIZATION);
        }

        debug!(url = %url, page = self.pages_fetched + 1, "fetching page");
        let response = self.http.get(url.clone()).headers(headers).send().await?;

        let status = response.status();
        debug!(status = status.as_u16(), "page response");
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(ClientError::Fetch {
                status: status.as_u16(),
                body,
            });
        }

        let body = response.text().await?;
        let page: Page = serde_json::from_str(&body)
            .map_err(|e| ClientError::Parse(format!("invalid page envelope: {}", e)))?;
        self.pages_fetched += 1;

        if let Some(next) = page.next_link() {
            let next = url
                .join(next)
                .map_err(|e| ClientError::Parse(format!("invalid next link {:?}: {}", next, e)))?;
            self.state = State::Fetching(next);
        }

        Ok(Some(page.data))
    }

    /// Next item in server order, fetching pages as needed.
    pub async fn next_item(&mut self) -> Option<Result<ApiResource>> {
        loop {
            if let Some(item) = self.buffered.pop_front() {
                return Some(Ok(item));
            }
            match self.next_page().await {
                Ok(Some(items)) => self.buffered.extend(items),
                Ok(None) => return None,
                Err(e) => return Some(Err(e)),
            }
        }
    }

    /// Append every remaining item to `items`.
    ///
    /// On failure, items from the pages fetched before it are already in `items`.
    pub async fn collect_into(&mut self, items: &mut Vec<ApiResource>) -> Result<()> {
        items.extend(self.buffered.drain(..));
        while let Some(page) = self.next_page().await? {
            items.extend(page);
        }
        Ok(())
    }

    /// Drain every remaining page into one list. All-or-nothing; see
    /// [`Pager::collect_into`] to keep the items fetched before a failure.
    pub async fn collect_all(mut self) -> Result<Vec<ApiResource>> {
        let mut items = Vec::new();
        self.collect_into(&mut items).await?;
        Ok(items)
    }
}
