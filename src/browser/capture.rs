//! Network log capture over CDP events.
//!
//! Listeners must be attached before navigation starts so the document
//! request itself is captured. Everything accumulates into one shared log
//! keyed by CDP request id; `finish` tears the listeners down and drains
//! the log in arrival order.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use chromiumoxide::cdp::browser_protocol::network::{
    EventDataReceived, EventLoadingFailed, EventLoadingFinished, EventRequestServedFromCache,
    EventRequestWillBeSent, EventResponseReceived,
};
use chromiumoxide::Page;
use futures::StreamExt;
use tokio::task::JoinHandle;

use crate::error::{AppError, Result};

/// One request as observed on the wire, before extraction turns it into a
/// `RequestRecord`. Times are CDP monotonic seconds.
#[derive(Debug, Clone, Default)]
pub struct RawCapture {
    pub url: String,
    pub priority: String,
    pub start_time: f64,
    pub end_time: f64,
    pub status_code: u16,
    pub mime_type: String,
    pub protocol: String,
    pub cache_control: Option<String>,
    pub from_cache: bool,
    /// Compressed bytes, from `loadingFinished`.
    pub transfer_size: u64,
    /// Decompressed bytes, summed over `dataReceived`.
    pub resource_size: u64,
    /// Whether a response (and thus headers) was ever observed.
    pub response_seen: bool,
}

#[derive(Default)]
struct CaptureLog {
    order: Vec<String>,
    entries: HashMap<String, RawCapture>,
}

impl CaptureLog {
    fn entry(&mut self, id: &str) -> Option<&mut RawCapture> {
        self.entries.get_mut(id)
    }
}

/// Accumulates the network log of one navigation.
pub struct NetworkCapture {
    log: Arc<Mutex<CaptureLog>>,
    tasks: Vec<JoinHandle<()>>,
}

impl NetworkCapture {
    /// Subscribe to the page's network events. Call before `goto`.
    pub async fn attach(page: &Page) -> Result<Self> {
        let log = Arc::new(Mutex::new(CaptureLog::default()));
        let mut tasks = Vec::new();

        let mut requests = page
            .event_listener::<EventRequestWillBeSent>()
            .await
            .map_err(|e| AppError::metrics(e.to_string()))?;
        let shared = Arc::clone(&log);
        tasks.push(tokio::spawn(async move {
            while let Some(event) = requests.next().await {
                let url = event.request.url.clone();
                // Inline payloads are not network transfers.
                if url.starts_with("data:") || url.starts_with("blob:") {
                    continue;
                }
                let id = event.request_id.inner().clone();
                let mut log = shared.lock().expect("capture log poisoned");
                match log.entries.get_mut(&id) {
                    // Redirect hop: keep the original start, follow the url.
                    Some(entry) => entry.url = url,
                    None => {
                        log.order.push(id.clone());
                        log.entries.insert(
                            id,
                            RawCapture {
                                url,
                                priority: format!("{:?}", event.request.initial_priority),
                                start_time: *event.timestamp.inner(),
                                ..RawCapture::default()
                            },
                        );
                    }
                }
            }
        }));

        let mut responses = page
            .event_listener::<EventResponseReceived>()
            .await
            .map_err(|e| AppError::metrics(e.to_string()))?;
        let shared = Arc::clone(&log);
        tasks.push(tokio::spawn(async move {
            while let Some(event) = responses.next().await {
                let id = event.request_id.inner().clone();
                let headers = serde_json::to_value(&event.response.headers).unwrap_or_default();
                let mut log = shared.lock().expect("capture log poisoned");
                if let Some(entry) = log.entry(&id) {
                    entry.status_code =
                        u16::try_from(event.response.status).unwrap_or_default();
                    entry.mime_type = event.response.mime_type.clone();
                    entry.protocol = event.response.protocol.clone().unwrap_or_default();
                    entry.cache_control = header_value(&headers, "cache-control");
                    entry.from_cache |= event.response.from_disk_cache.unwrap_or(false);
                    entry.response_seen = true;
                }
            }
        }));

        let mut chunks = page
            .event_listener::<EventDataReceived>()
            .await
            .map_err(|e| AppError::metrics(e.to_string()))?;
        let shared = Arc::clone(&log);
        tasks.push(tokio::spawn(async move {
            while let Some(event) = chunks.next().await {
                let id = event.request_id.inner().clone();
                let mut log = shared.lock().expect("capture log poisoned");
                if let Some(entry) = log.entry(&id) {
                    entry.resource_size += u64::try_from(event.data_length).unwrap_or_default();
                }
            }
        }));

        let mut finished = page
            .event_listener::<EventLoadingFinished>()
            .await
            .map_err(|e| AppError::metrics(e.to_string()))?;
        let shared = Arc::clone(&log);
        tasks.push(tokio::spawn(async move {
            while let Some(event) = finished.next().await {
                let id = event.request_id.inner().clone();
                let mut log = shared.lock().expect("capture log poisoned");
                if let Some(entry) = log.entry(&id) {
                    entry.transfer_size = event.encoded_data_length.max(0.0) as u64;
                    entry.end_time = *event.timestamp.inner();
                }
            }
        }));

        let mut failed = page
            .event_listener::<EventLoadingFailed>()
            .await
            .map_err(|e| AppError::metrics(e.to_string()))?;
        let shared = Arc::clone(&log);
        tasks.push(tokio::spawn(async move {
            while let Some(event) = failed.next().await {
                let id = event.request_id.inner().clone();
                let mut log = shared.lock().expect("capture log poisoned");
                if let Some(entry) = log.entry(&id) {
                    entry.end_time = *event.timestamp.inner();
                }
            }
        }));

        let mut cached = page
            .event_listener::<EventRequestServedFromCache>()
            .await
            .map_err(|e| AppError::metrics(e.to_string()))?;
        let shared = Arc::clone(&log);
        tasks.push(tokio::spawn(async move {
            while let Some(event) = cached.next().await {
                let id = event.request_id.inner().clone();
                let mut log = shared.lock().expect("capture log poisoned");
                if let Some(entry) = log.entry(&id) {
                    entry.from_cache = true;
                }
            }
        }));

        Ok(Self { log, tasks })
    }

    /// Stop listening and drain the log in arrival order.
    pub fn finish(self) -> Vec<RawCapture> {
        for task in &self.tasks {
            task.abort();
        }
        let mut log = self.log.lock().expect("capture log poisoned");
        let mut entries = std::mem::take(&mut log.entries);
        let order = std::mem::take(&mut log.order);
        order
            .into_iter()
            .filter_map(|id| entries.remove(&id))
            .collect()
    }
}

fn header_value(headers: &serde_json::Value, name: &str) -> Option<String> {
    headers.as_object()?.iter().find_map(|(key, value)| {
        if key.eq_ignore_ascii_case(name) {
            value.as_str().map(str::to_string)
        } else {
            None
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_lookup_is_case_insensitive() {
        let headers = serde_json::json!({ "Cache-Control": "max-age=600" });
        assert_eq!(
            header_value(&headers, "cache-control").as_deref(),
            Some("max-age=600")
        );
        assert_eq!(header_value(&headers, "expires"), None);
        assert_eq!(header_value(&serde_json::Value::Null, "cache-control"), None);
    }
}
