//! List fetching with a single automatic retry at an enlarged page size.
//!
//! Some backends fail on payload-size or row-count limits. The first failure
//! is reported and retried once from page 1 with a fixed, larger page size;
//! a second failure is reported and ends the chain.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tokio::sync::RwLock;

use super::codec::QueryCodec;
use super::freshness::{FreshnessCache, STATUS_FAILED, STATUS_OK};
use super::sinks::{
    BusyIndicator, Notification, NotificationSink, TracingBusyIndicator, TracingNotifier,
};
use super::transport::ListTransport;
use crate::config::Config;
use crate::errors::AppError;
use crate::models::{ColumnFilter, ListRequest, ListResult, PageRequest, SortSpec};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Attempt {
    First,
    Final,
}

/// The published result and the sequence number of the fetch that produced it.
#[derive(Debug, Default)]
struct Published {
    seq: u64,
    result: ListResult,
}

/// Fetches list pages and publishes the latest result per resource.
pub struct AdaptiveFetcher {
    transport: Arc<dyn ListTransport>,
    codec: QueryCodec,
    notifier: Arc<dyn NotificationSink>,
    busy: Arc<dyn BusyIndicator>,
    freshness: Arc<RwLock<FreshnessCache>>,
    retry_page_size: u32,
    last_seq: AtomicU64,
    published: RwLock<HashMap<String, Published>>,
}

impl AdaptiveFetcher {
    pub fn new(transport: Arc<dyn ListTransport>, codec: QueryCodec, retry_page_size: u32) -> Self {
        Self {
            transport,
            codec,
            notifier: Arc::new(TracingNotifier),
            busy: Arc::new(TracingBusyIndicator),
            freshness: Arc::new(RwLock::new(FreshnessCache::new())),
            retry_page_size,
            last_seq: AtomicU64::new(0),
            published: RwLock::new(HashMap::new()),
        }
    }

    /// A fetcher using the configured defaults and retry page size.
    pub fn from_config(transport: Arc<dyn ListTransport>, config: &Config) -> Self {
        Self::new(
            transport,
            QueryCodec::from_config(config),
            config.retry_page_size,
        )
    }

    pub fn with_notifier(mut self, notifier: Arc<dyn NotificationSink>) -> Self {
        self.notifier = notifier;
        self
    }

    pub fn with_busy_indicator(mut self, busy: Arc<dyn BusyIndicator>) -> Self {
        self.busy = busy;
        self
    }

    /// Share a freshness cache with other list views of the session.
    pub fn with_freshness(mut self, freshness: Arc<RwLock<FreshnessCache>>) -> Self {
        self.freshness = freshness;
        self
    }

    pub fn freshness(&self) -> Arc<RwLock<FreshnessCache>> {
        Arc::clone(&self.freshness)
    }

    /// The published result for `resource`. `loaded` is false until a fetch
    /// of it succeeds.
    pub async fn published(&self, resource: &str) -> ListResult {
        self.published
            .read()
            .await
            .get(resource)
            .map(|p| p.result.clone())
            .unwrap_or_default()
    }

    /// Fetch one page of `table` from loose list-view arguments.
    pub async fn fetch_with_retry(
        &self,
        table: &str,
        page_index: u32,
        page_size: u32,
        search_text: &str,
        sort: Option<SortSpec>,
        column_filters: Vec<ColumnFilter>,
    ) -> Result<ListResult, AppError> {
        let mut request = ListRequest::page(page_index, page_size).with_filters(column_filters);
        if !search_text.is_empty() {
            request = request.with_search(search_text);
        }
        if let Some(sort) = sort.filter(|s| s.is_set()) {
            request = request.with_sort(sort);
        }
        self.fetch(table, request).await
    }

    /// Fetch `request` for `resource`, retrying once on failure.
    ///
    /// A response older than the last published one is returned to its caller
    /// but not published.
    pub async fn fetch(&self, resource: &str, request: ListRequest) -> Result<ListResult, AppError> {
        let seq = self.last_seq.fetch_add(1, Ordering::SeqCst) + 1;
        self.busy.set_busy(true);

        let mut request = request;
        let mut attempt = Attempt::First;
        loop {
            let params = self.codec.encode(&request);
            tracing::debug!(
                resource,
                seq,
                ?attempt,
                page_index = params.page_index,
                page_size = params.page_size,
                "Fetching list page"
            );

            match self.transport.fetch(resource, &params).await {
                Ok(payload) => {
                    let result = self.codec.decode(payload, &request);
                    self.freshness
                        .write()
                        .await
                        .record_status(resource, STATUS_OK);
                    self.publish(resource, seq, &result).await;
                    self.finish(seq);
                    return Ok(result);
                }
                Err(err) => {
                    self.freshness
                        .write()
                        .await
                        .record_status(resource, STATUS_FAILED);

                    match attempt {
                        Attempt::First => {
                            tracing::warn!(
                                resource,
                                retry_page_size = self.retry_page_size,
                                "List fetch failed, retrying: {}",
                                err
                            );
                            self.notifier.notify(Notification::error(format!(
                                "{}. Fetching again with page size {}.",
                                err.message(),
                                self.retry_page_size
                            )));
                            request.pagination = PageRequest {
                                page_index: Some(1),
                                page_size: Some(self.retry_page_size),
                            };
                            attempt = Attempt::Final;
                        }
                        Attempt::Final => {
                            tracing::error!(resource, "List fetch failed after retry: {}", err);
                            self.notifier.notify(Notification::error(err.message()));
                            self.finish(seq);
                            return Err(err);
                        }
                    }
                }
            }
        }
    }

    /// Fetch unless the freshness cache says `resource` is loaded and this
    /// fetcher holds a published result for it.
    pub async fn ensure_loaded(
        &self,
        resource: &str,
        request: ListRequest,
    ) -> Result<ListResult, AppError> {
        let needs_reload = self.freshness.read().await.needs_reload(resource);
        if !needs_reload {
            if let Some(published) = self.published.read().await.get(resource) {
                tracing::debug!(resource, "Reusing published list");
                return Ok(published.result.clone());
            }
        }
        self.fetch(resource, request).await
    }

    /// Force the next [`ensure_loaded`](Self::ensure_loaded) to fetch.
    pub async fn invalidate(&self, resource: &str) {
        self.freshness.write().await.forget(resource);
    }

    async fn publish(&self, resource: &str, seq: u64, result: &ListResult) {
        let mut published = self.published.write().await;
        let entry = published.entry(resource.to_string()).or_default();
        if seq < entry.seq {
            tracing::debug!(
                resource,
                seq,
                published_seq = entry.seq,
                "Discarding stale list response"
            );
            return;
        }
        entry.seq = seq;
        entry.result = result.clone();
    }

    /// Only the newest fetch hides the busy indicator.
    fn finish(&self, seq: u64) {
        if self.last_seq.load(Ordering::SeqCst) == seq {
            self.busy.set_busy(false);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Row, SortDirection, TransportPage, WireParams};
    use async_trait::async_trait;
    use serde_json::json;
    use std::collections::VecDeque;
    use std::sync::Mutex;
    use std::time::Duration;

    /// Replays scripted outcomes and records every call.
    struct ScriptedTransport {
        outcomes: Mutex<VecDeque<Result<TransportPage, AppError>>>,
        calls: Mutex<Vec<WireParams>>,
    }

    impl ScriptedTransport {
        fn new(outcomes: Vec<Result<TransportPage, AppError>>) -> Arc<Self> {
            Arc::new(Self {
                outcomes: Mutex::new(outcomes.into()),
                calls: Mutex::new(Vec::new()),
            })
        }

        fn calls(&self) -> Vec<WireParams> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl ListTransport for ScriptedTransport {
        async fn fetch(&self, _resource: &str, params: &WireParams) -> Result<TransportPage, AppError> {
            self.calls.lock().unwrap().push(params.clone());
            self.outcomes
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Err(AppError::Transport("script exhausted".to_string())))
        }
    }

    /// Answers every call, sleeping first when the search term is "slow".
    struct DelayedTransport;

    #[async_trait]
    impl ListTransport for DelayedTransport {
        async fn fetch(&self, _resource: &str, params: &WireParams) -> Result<TransportPage, AppError> {
            let term = params.global_search.clone().unwrap_or_default();
            if term == "slow" {
                tokio::time::sleep(Duration::from_millis(50)).await;
            }
            Ok(page(&[term.as_str()]))
        }
    }

    /// Answers every call with one row named after the resource.
    struct EchoTransport {
        calls: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl ListTransport for EchoTransport {
        async fn fetch(&self, resource: &str, _params: &WireParams) -> Result<TransportPage, AppError> {
            self.calls.lock().unwrap().push(resource.to_string());
            Ok(page(&[resource]))
        }
    }

    #[derive(Default)]
    struct Recorder {
        notifications: Mutex<Vec<Notification>>,
        busy: Mutex<Vec<bool>>,
    }

    impl NotificationSink for Recorder {
        fn notify(&self, notification: Notification) {
            self.notifications.lock().unwrap().push(notification);
        }
    }

    impl BusyIndicator for Recorder {
        fn set_busy(&self, busy: bool) {
            self.busy.lock().unwrap().push(busy);
        }
    }

    impl Recorder {
        fn messages(&self) -> Vec<String> {
            self.notifications
                .lock()
                .unwrap()
                .iter()
                .map(|n| n.message.clone())
                .collect()
        }

        fn busy(&self) -> Vec<bool> {
            self.busy.lock().unwrap().clone()
        }
    }

    fn page(names: &[&str]) -> TransportPage {
        let rows: Vec<Row> = names
            .iter()
            .map(|n| json!({ "name": n }).as_object().cloned().unwrap())
            .collect();
        let total = rows.len() as u64;
        TransportPage::new(rows, total)
    }

    fn failure(message: &str) -> Result<TransportPage, AppError> {
        Err(AppError::Transport(message.to_string()))
    }

    fn fetcher(transport: Arc<dyn ListTransport>, recorder: &Arc<Recorder>) -> AdaptiveFetcher {
        let codec = QueryCodec::new(SortSpec::new("modified_at", SortDirection::Desc), 25);
        AdaptiveFetcher::new(transport, codec, 500)
            .with_notifier(recorder.clone())
            .with_busy_indicator(recorder.clone())
    }

    #[tokio::test]
    async fn test_success_publishes_and_records_freshness() {
        let transport = ScriptedTransport::new(vec![Ok(page(&["Acme"]))]);
        let recorder = Arc::new(Recorder::default());
        let fetcher = fetcher(transport.clone(), &recorder);

        assert!(!fetcher.published("vendors").await.loaded);

        let result = fetcher
            .fetch_with_retry("vendors", 2, 10, "ac", None, Vec::new())
            .await
            .unwrap();

        assert_eq!(result.pagination.start_index, 2);
        assert_eq!(result.search_text, "ac");
        assert_eq!(fetcher.published("vendors").await, result);
        assert_eq!(transport.calls().len(), 1);
        assert_eq!(transport.calls()[0].page_index, 1);
        assert_eq!(recorder.busy(), vec![true, false]);
        assert!(recorder.messages().is_empty());
        assert!(!fetcher.freshness().read().await.needs_reload("vendors"));
    }

    #[tokio::test]
    async fn test_first_failure_retries_with_enlarged_page() {
        let transport = ScriptedTransport::new(vec![failure("Payload too large"), Ok(page(&["Acme"]))]);
        let recorder = Arc::new(Recorder::default());
        let fetcher = fetcher(transport.clone(), &recorder);

        let result = fetcher
            .fetch_with_retry("vendors", 3, 25, "", None, Vec::new())
            .await
            .unwrap();

        let calls = transport.calls();
        assert_eq!(calls.len(), 2);
        assert_eq!((calls[0].page_index, calls[0].page_size), (2, 25));
        assert_eq!((calls[1].page_index, calls[1].page_size), (0, 500));
        assert_eq!(result.pagination.start_index, 1);
        assert_eq!(result.pagination.page_size, 500);
        assert_eq!(
            recorder.messages(),
            vec!["Payload too large. Fetching again with page size 500.".to_string()]
        );
        // Busy stays on across the retry.
        assert_eq!(recorder.busy(), vec![true, false]);
        assert!(!fetcher.freshness().read().await.needs_reload("vendors"));
    }

    #[tokio::test]
    async fn test_two_failures_retry_exactly_once() {
        let transport = ScriptedTransport::new(vec![
            Ok(page(&["Acme"])),
            failure("Gateway timeout"),
            failure("Gateway timeout"),
        ]);
        let recorder = Arc::new(Recorder::default());
        let fetcher = fetcher(transport.clone(), &recorder);

        fetcher
            .fetch("vendors", ListRequest::page(1, 25))
            .await
            .unwrap();
        let err = fetcher
            .fetch("vendors", ListRequest::page(2, 25))
            .await
            .unwrap_err();

        assert_eq!(err, AppError::Transport("Gateway timeout".to_string()));
        assert_eq!(transport.calls().len(), 3);

        let messages = recorder.messages();
        assert_eq!(messages.len(), 2);
        assert!(messages[0].contains("Fetching again"));
        assert_eq!(messages[1], "Gateway timeout");

        // The earlier result stays published and loaded.
        let published = fetcher.published("vendors").await;
        assert!(published.loaded);
        assert_eq!(published.rows[0]["name"], "Acme");
        assert_eq!(recorder.busy(), vec![true, false, true, false]);
        assert!(fetcher.freshness().read().await.needs_reload("vendors"));
    }

    #[tokio::test]
    async fn test_new_fetch_gets_a_fresh_retry() {
        let transport = ScriptedTransport::new(vec![
            failure("boom"),
            failure("boom"),
            failure("boom"),
            Ok(page(&["Globex"])),
        ]);
        let recorder = Arc::new(Recorder::default());
        let fetcher = fetcher(transport.clone(), &recorder);

        assert!(fetcher
            .fetch("vendors", ListRequest::page(1, 25))
            .await
            .is_err());
        let result = fetcher
            .fetch("vendors", ListRequest::page(1, 25))
            .await
            .unwrap();

        assert_eq!(transport.calls().len(), 4);
        assert_eq!(result.rows[0]["name"], "Globex");
    }

    #[tokio::test]
    async fn test_ensure_loaded_reuses_fresh_resource() {
        let transport = ScriptedTransport::new(vec![Ok(page(&["Acme"])), Ok(page(&["Globex"]))]);
        let recorder = Arc::new(Recorder::default());
        let fetcher = fetcher(transport.clone(), &recorder);

        let first = fetcher
            .ensure_loaded("vendors", ListRequest::page(1, 25))
            .await
            .unwrap();
        let second = fetcher
            .ensure_loaded("vendors", ListRequest::page(1, 25))
            .await
            .unwrap();
        assert_eq!(first, second);
        assert_eq!(transport.calls().len(), 1);

        fetcher.invalidate("vendors").await;
        let third = fetcher
            .ensure_loaded("vendors", ListRequest::page(1, 25))
            .await
            .unwrap();
        assert_eq!(third.rows[0]["name"], "Globex");
        assert_eq!(transport.calls().len(), 2);
    }

    #[tokio::test]
    async fn test_slower_older_response_is_not_published() {
        let recorder = Arc::new(Recorder::default());
        let fetcher = fetcher(Arc::new(DelayedTransport), &recorder);

        let (slow, fast) = tokio::join!(
            fetcher.fetch("vendors", ListRequest::page(1, 25).with_search("slow")),
            async {
                tokio::time::sleep(Duration::from_millis(5)).await;
                fetcher
                    .fetch("vendors", ListRequest::page(1, 25).with_search("fast"))
                    .await
            }
        );

        assert_eq!(slow.unwrap().rows[0]["name"], "slow");
        assert_eq!(fast.unwrap().rows[0]["name"], "fast");
        assert_eq!(fetcher.published("vendors").await.search_text, "fast");
        assert_eq!(recorder.busy(), vec![true, true, false]);
    }

    #[tokio::test]
    async fn test_ensure_loaded_keeps_resources_apart() {
        let transport = Arc::new(EchoTransport {
            calls: Mutex::new(Vec::new()),
        });
        let recorder = Arc::new(Recorder::default());
        let fetcher = fetcher(transport.clone(), &recorder);

        fetcher
            .fetch("vendors", ListRequest::page(1, 25))
            .await
            .unwrap();
        fetcher
            .fetch("departments", ListRequest::page(1, 25))
            .await
            .unwrap();

        let vendors = fetcher
            .ensure_loaded("vendors", ListRequest::page(1, 25))
            .await
            .unwrap();
        assert_eq!(vendors.rows[0]["name"], "vendors");
        assert_eq!(fetcher.published("departments").await.rows[0]["name"], "departments");
        assert_eq!(transport.calls.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_shared_freshness_without_published_result_fetches() {
        let transport = Arc::new(EchoTransport {
            calls: Mutex::new(Vec::new()),
        });
        let recorder = Arc::new(Recorder::default());
        let first_view = fetcher(transport.clone(), &recorder);
        let second_view = fetcher(transport.clone(), &recorder).with_freshness(first_view.freshness());

        first_view
            .fetch("vendors", ListRequest::page(1, 25))
            .await
            .unwrap();
        let result = second_view
            .ensure_loaded("vendors", ListRequest::page(1, 25))
            .await
            .unwrap();

        assert!(result.loaded);
        assert_eq!(result.rows[0]["name"], "vendors");
        assert_eq!(transport.calls.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_from_config_uses_configured_sizes_and_sort() {
        let config = Config {
            db_path: "unused.sqlite".into(),
            bind_addr: "127.0.0.1:0".parse().unwrap(),
            log_level: "warn".to_string(),
            default_page_size: 10,
            retry_page_size: 2000,
            default_sort_column: "name".to_string(),
            default_sort_direction: SortDirection::Asc,
        };
        let transport = ScriptedTransport::new(vec![failure("Payload too large"), Ok(page(&["Acme"]))]);
        let recorder = Arc::new(Recorder::default());
        let fetcher = AdaptiveFetcher::from_config(transport.clone(), &config)
            .with_notifier(recorder.clone())
            .with_busy_indicator(recorder.clone());

        let result = fetcher
            .fetch("vendors", ListRequest::default())
            .await
            .unwrap();

        let calls = transport.calls();
        assert_eq!(calls[0].page_size, 10);
        assert_eq!(calls[0].sort_column, "name");
        assert_eq!(calls[0].sort_direction, SortDirection::Asc);
        assert_eq!(calls[1].page_size, 2000);
        assert_eq!(result.sorting, SortSpec::new("name", SortDirection::Asc));
        assert_eq!(
            recorder.messages(),
            vec!["Payload too large. Fetching again with page size 2000.".to_string()]
        );
    }
}
