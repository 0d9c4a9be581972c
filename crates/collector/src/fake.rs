// Copyright 2024 RustFS Team
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! In-memory [`Fetch`] used by the collector tests.

use async_trait::async_trait;
use pvex_client::{ClientError, Document, Fetch, Result, StatusCode};
use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

#[derive(Default)]
pub(crate) struct FakeApi {
    responses: Mutex<HashMap<String, Option<String>>>,
    calls: Mutex<Vec<String>>,
    latency: Option<Duration>,
    in_flight: AtomicUsize,
    peak_in_flight: AtomicUsize,
}

impl FakeApi {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Serves `body` as the response to `path`.
    pub(crate) fn with(self, path: &str, body: &str) -> Self {
        self.set(path, body);
        self
    }

    /// Answers `path` with a server error.
    pub(crate) fn failing(self, path: &str) -> Self {
        self.fail(path);
        self
    }

    /// Delays every response by `latency`.
    pub(crate) fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Highest number of requests that were pending at the same time.
    pub(crate) fn peak_in_flight(&self) -> usize {
        self.peak_in_flight.load(Ordering::SeqCst)
    }

    pub(crate) fn set(&self, path: &str, body: &str) {
        self.responses.lock().unwrap().insert(path.to_string(), Some(body.to_string()));
    }

    pub(crate) fn fail(&self, path: &str) {
        self.responses.lock().unwrap().insert(path.to_string(), None);
    }

    pub(crate) fn calls(&self, path: &str) -> usize {
        self.calls.lock().unwrap().iter().filter(|p| *p == path).count()
    }
}

#[async_trait]
impl Fetch for FakeApi {
    async fn fetch(&self, path: &str) -> Result<Document> {
        self.calls.lock().unwrap().push(path.to_string());
        let pending = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak_in_flight.fetch_max(pending, Ordering::SeqCst);
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        let response = self.responses.lock().unwrap().get(path).cloned();
        match response {
            Some(Some(body)) => Document::from_slice(body.as_bytes()).map_err(|source| ClientError::Decode {
                path: path.to_string(),
                source,
            }),
            Some(None) => Err(ClientError::Status {
                path: path.to_string(),
                status: StatusCode::INTERNAL_SERVER_ERROR,
            }),
            None => Err(ClientError::Status {
                path: path.to_string(),
                status: StatusCode::NOT_FOUND,
            }),
        }
    }
}
