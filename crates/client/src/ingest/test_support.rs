//! Scripted record source for pipeline tests.

use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{Value, json};

use crate::source::{FetchResult, RecordSource, SourceError, SourceRequest};

/// Replays a fixed sequence of page responses and records every offset asked for.
pub struct ScriptedSource {
    pages: Mutex<VecDeque<Result<FetchResult, SourceError>>>,
    offsets: Mutex<Vec<u32>>,
    delay: Option<Duration>,
}

impl ScriptedSource {
    pub fn new(pages: Vec<Result<FetchResult, SourceError>>) -> Self {
        Self { pages: Mutex::new(pages.into()), offsets: Mutex::new(Vec::new()), delay: None }
    }

    /// Successful pages with the given item counts; items are numbered across pages from 1.
    pub fn with_page_sizes(sizes: &[usize]) -> Self {
        let mut next = 0;
        let pages = sizes
            .iter()
            .map(|&size| {
                let items = (next + 1..=next + size).map(item).collect();
                next += size;
                Ok(FetchResult::ok(items))
            })
            .collect();
        Self::new(pages)
    }

    /// Sleep this long before answering each request.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn offsets(&self) -> Vec<u32> {
        self.offsets.lock().unwrap().clone()
    }
}

/// The `n`-th item a scripted source hands out.
pub fn item(n: usize) -> Value {
    json!({ "n": n })
}

#[async_trait]
impl RecordSource for ScriptedSource {
    async fn fetch_page(&self, request: &SourceRequest<'_>) -> Result<FetchResult, SourceError> {
        self.offsets.lock().unwrap().push(request.offset_page);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.pages
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(FetchResult::ok(Vec::new())))
    }
}
