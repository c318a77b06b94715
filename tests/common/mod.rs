// tests/common/mod.rs
#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

use health_release_notifier::poll::{FetchError, FetchResult, Fetcher};

/// Serves queued responses per address; unknown addresses get a 404.
#[derive(Default)]
pub struct ScriptedFetcher {
    routes: Mutex<HashMap<String, VecDeque<FetchResult>>>,
    fallback: Mutex<VecDeque<FetchResult>>,
    pub requests: Mutex<Vec<String>>,
}

impl ScriptedFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a response for one address. The last queued response repeats.
    pub fn route(self, address: &str, status: u16, body: impl Into<Vec<u8>>) -> Self {
        self.routes
            .lock()
            .unwrap()
            .entry(address.to_string())
            .or_default()
            .push_back(FetchResult::new(address, status, body.into()));
        self
    }

    /// Responses handed out in order to addresses without a route.
    pub fn then(self, status: u16, content_length: u64) -> Self {
        self.fallback
            .lock()
            .unwrap()
            .push_back(FetchResult::new("", status, Vec::new()).with_content_length(content_length));
        self
    }

    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl Fetcher for ScriptedFetcher {
    async fn fetch(&self, address: &str) -> Result<FetchResult, FetchError> {
        self.requests.lock().unwrap().push(address.to_string());

        if let Some(queue) = self.routes.lock().unwrap().get_mut(address) {
            let res = if queue.len() > 1 {
                queue.pop_front().unwrap()
            } else {
                queue.front().unwrap().clone()
            };
            return Ok(res);
        }

        let next = self.fallback.lock().unwrap().pop_front();
        Ok(match next {
            Some(mut res) => {
                res.address = address.to_string();
                res
            }
            None => FetchResult::new(address, 404, Vec::new()),
        })
    }
}

pub fn landing_page(numbers: &[&str]) -> String {
    let links: String = numbers
        .iter()
        .map(|n| format!(r#"<a href="/hodo/saishin/corona{n}.html">第{n}報</a>"#))
        .collect();
    format!("<html><body>{links}</body></html>")
}
