//! Offset pagination across list endpoints
//!
//! The first page is requested without an offset; following pages pass the
//! running offset until the server-reported `total_count` is reached.

use log::{debug, warn};
use serde::de::DeserializeOwned;

use crate::api::cancel::CancelSignal;
use crate::api::client::{ApiRequest, DbtCloudClient};
use crate::api::envelope::{decode_envelope, Pagination};
use crate::config::api;
use crate::error::{ApiError, Result};

/// Append the offset query parameter, choosing `?` or `&`
pub fn with_offset(url: &str, offset: u64) -> String {
    let separator = if url.contains('?') { '&' } else { '?' };
    format!("{}{}{}={}", url, separator, api::OFFSET_PARAM, offset)
}

/// One decoded page
#[derive(Debug)]
struct Page {
    items: Vec<serde_json::Value>,
    pagination: Option<Pagination>,
}

impl Page {
    /// Items the server claims this page holds
    fn count(&self) -> u64 {
        self.pagination
            .map(|p| p.count)
            .unwrap_or(self.items.len() as u64)
    }
}

/// Accumulated items plus the running offset and last reported target
#[derive(Debug)]
struct PaginationState {
    items: Vec<serde_json::Value>,
    offset: u64,
    total_count: u64,
}

impl PaginationState {
    fn from_first_page(page: Page) -> Self {
        let offset = page.count();
        let total_count = page.pagination.map(|p| p.total_count).unwrap_or(offset);
        Self {
            items: page.items,
            offset,
            total_count,
        }
    }

    fn has_more(&self) -> bool {
        self.offset < self.total_count
    }

    /// Merge a following page; false when the page was empty and paging must stop
    fn absorb(&mut self, page: Page) -> Result<bool> {
        let count = page.count();
        if count == 0 {
            return Ok(false);
        }
        let offset = self
            .offset
            .checked_add(count)
            .ok_or_else(|| ApiError::MalformedEnvelope {
                http_status: 200,
                reason: format!(
                    "pagination count {} overflows offset {}",
                    count, self.offset
                ),
                body: String::new(),
            })?;
        if let Some(p) = page.pagination {
            self.total_count = p.total_count;
        }
        self.items.extend(page.items);
        self.offset = offset;
        Ok(true)
    }
}

impl DbtCloudClient {
    /// Fetch every item of a list endpoint as raw JSON
    pub async fn fetch_all(&self, url: &str) -> Result<Vec<serde_json::Value>> {
        self.fetch_all_with(url, self.cancel_signal()).await
    }

    /// Fetch every item of a list endpoint and decode each into `T`
    pub async fn fetch_all_as<T>(&self, url: &str) -> Result<Vec<T>>
    where
        T: DeserializeOwned,
    {
        self.fetch_all(url)
            .await?
            .into_iter()
            .enumerate()
            .map(|(index, item)| {
                serde_json::from_value(item).map_err(|e| {
                    ApiError::Json(format!("failed to decode item {} from {}: {}", index, url, e))
                })
            })
            .collect()
    }

    /// Fetch every item of a list endpoint, page by page in offset order
    ///
    /// A page reporting zero items before `total_count` is reached ends the
    /// listing with what was gathered so far. Any failure aborts the whole
    /// listing.
    pub async fn fetch_all_with(
        &self,
        url: &str,
        cancel: &CancelSignal,
    ) -> Result<Vec<serde_json::Value>> {
        debug!("Fetching page 1 from: {}", url);
        let first = self.fetch_page(url, cancel).await?;
        let mut state = PaginationState::from_first_page(first);
        let mut page_number: u32 = 1;

        while state.has_more() {
            if cancel.is_cancelled() {
                return Err(ApiError::Cancelled);
            }
            page_number += 1;
            let page_url = with_offset(url, state.offset);
            debug!(
                "Fetching page {} from: {} ({}/{} items so far)",
                page_number, page_url, state.offset, state.total_count
            );

            let page = self.fetch_page(&page_url, cancel).await?;
            if !state.absorb(page)? {
                warn!(
                    "{} returned an empty page at offset {} while {} items were reported; \
                     returning {} items (items may have been deleted while listing)",
                    url,
                    state.offset,
                    state.total_count,
                    state.items.len()
                );
                break;
            }
        }

        debug!(
            "Fetched {} total items from {} in {} page(s)",
            state.items.len(),
            url,
            page_number
        );
        Ok(state.items)
    }

    async fn fetch_page(&self, url: &str, cancel: &CancelSignal) -> Result<Page> {
        let request = ApiRequest::get(url);
        let body = self
            .execute_with(&request, self.config().retry_policy(), cancel)
            .await?;
        let envelope = decode_envelope(&body, 200)?;
        let pagination = envelope.pagination();

        let items = match envelope.data {
            serde_json::Value::Array(items) => items,
            serde_json::Value::Null => Vec::new(),
            other => {
                return Err(ApiError::MalformedEnvelope {
                    http_status: 200,
                    reason: format!("expected a list in `data` from {}", url),
                    body: other.to_string(),
                })
            }
        };

        debug!("Page from {} returned {} items", url, items.len());
        let page = Page { items, pagination };
        if page.count() != page.items.len() as u64 {
            warn!(
                "{} reported {} items but returned {}; the offset follows the reported count",
                url,
                page.count(),
                page.items.len()
            );
        }
        Ok(page)
    }
}
