use crate::provider::{Endpoint, PageSource};
use crate::runtime::error::SyncError;
use anyhow::Result;
use serde_json::Value;
use std::time::Duration;
use tokio::time::sleep;

/// One page worth of raw provider records.
#[derive(Debug, Clone, PartialEq)]
pub struct PageBatch {
    /// 1-based page number.
    pub page: u32,
    /// Position of the first record of this page in the provider's listing.
    pub offset: usize,
    pub records: Vec<Value>,
}

/// Walks a list endpoint page by page until a short page signals exhaustion.
///
/// The sequence is lazy and cannot be restarted: once exhausted, or once an error was
/// returned, [`Paginator::next_batch`] keeps answering `None`. There is no page ceiling,
/// so a source that always fills the page never terminates.
pub struct Paginator<'a> {
    source: &'a dyn PageSource,
    endpoint: &'a Endpoint,
    page_delay: Duration,
    next_page: u32,
    offset: usize,
    exhausted: bool,
}

impl<'a> Paginator<'a> {
    pub fn new(source: &'a dyn PageSource, endpoint: &'a Endpoint, page_delay: Duration) -> Self {
        Self {
            source,
            endpoint,
            page_delay,
            next_page: 1,
            offset: 0,
            exhausted: false,
        }
    }

    pub fn is_exhausted(&self) -> bool {
        self.exhausted
    }

    pub async fn next_batch(&mut self) -> Result<Option<PageBatch>> {
        if self.exhausted {
            return Ok(None);
        }

        let page = self.next_page;
        if !self.page_delay.is_zero() {
            sleep(self.page_delay).await;
        }

        tracing::info!(path = self.endpoint.path(), page, "page fetching");
        let records = match self.fetch(page).await {
            Ok(records) => records,
            Err(err) => {
                self.exhausted = true;
                return Err(err);
            }
        };
        tracing::info!(
            path = self.endpoint.path(),
            page,
            records = records.len(),
            "page fetched"
        );

        match self.endpoint.page_size() {
            Some(page_size) if records.len() >= page_size => self.next_page += 1,
            _ => self.exhausted = true,
        }

        let batch = PageBatch {
            page,
            offset: self.offset,
            records,
        };
        self.offset += batch.records.len();
        Ok(Some(batch))
    }

    async fn fetch(&self, page: u32) -> Result<Vec<Value>> {
        let payload = self.source.fetch_page(self.endpoint, page).await?;
        parse_page(self.endpoint, page, payload)
    }
}

/// Turns a decoded page payload into its record list.
///
/// An object carrying an error message fails with [`SyncError::Provider`]; anything else
/// that is not an array fails with [`SyncError::UnexpectedPayload`].
pub fn parse_page(endpoint: &Endpoint, page: u32, payload: Value) -> Result<Vec<Value>> {
    match payload {
        Value::Array(records) => Ok(records),
        other => match provider_error_message(&other) {
            Some(message) => Err(SyncError::Provider {
                endpoint: endpoint.path().to_owned(),
                page,
                message,
            }
            .into()),
            None => Err(SyncError::UnexpectedPayload {
                endpoint: endpoint.path().to_owned(),
                page,
            }
            .into()),
        },
    }
}

fn provider_error_message(payload: &Value) -> Option<String> {
    if let Some(message) = payload
        .pointer("/status/error_message")
        .and_then(Value::as_str)
    {
        return Some(match payload.pointer("/status/error_code") {
            Some(code) if !code.is_null() => format!("{message} (code {code})"),
            _ => message.to_owned(),
        });
    }

    payload
        .get("error")
        .and_then(Value::as_str)
        .map(str::to_owned)
}
