//! Process-wide chain registry cache with a single shared in-flight load.

use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;

use tokio::sync::watch;
use tracing::{info, warn};
use url::Url;

use super::{RegistryError, RegistrySource};
use crate::chain::{ChainConfig, ChainRegistry};
use crate::retry::{RetryPolicy, with_retry};

/// Progress of the most recent registry load.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum LoadStatus {
    /// No load has been requested yet.
    #[default]
    Idle,
    /// A load is in flight; waiters share it.
    Loading,
    /// The last load completed and its registry is cached.
    Loaded,
    /// The last load failed; any previously cached registry is still served.
    Failed(RegistryError),
}

/// Loads the paginated chain registry and caches the result.
///
/// Cloning is cheap and every clone shares the same cache. Concurrent
/// [`load`](Self::load) calls join the load already in flight instead of
/// issuing their own requests. The fetch runs as a detached task, so a caller
/// that stops waiting (see [`load_with_timeout`](Self::load_with_timeout))
/// does not abort it and a late result still populates the cache.
#[derive(Debug, Clone)]
pub struct ChainRegistryLoader {
    inner: Arc<Inner>,
}

#[derive(Debug)]
struct Inner {
    source: Arc<dyn RegistrySource>,
    retry: RetryPolicy,
    cache: RwLock<Option<Arc<ChainRegistry>>>,
    status: watch::Sender<LoadStatus>,
}

impl ChainRegistryLoader {
    /// Creates a loader with an empty cache.
    pub fn new(source: impl RegistrySource + 'static) -> Self {
        Self::with_retry(source, RetryPolicy::default())
    }

    /// Creates a loader retrying transient page failures per `retry`.
    pub fn with_retry(source: impl RegistrySource + 'static, retry: RetryPolicy) -> Self {
        let (status, _) = watch::channel(LoadStatus::Idle);
        Self {
            inner: Arc::new(Inner {
                source: Arc::new(source),
                retry,
                cache: RwLock::new(None),
                status,
            }),
        }
    }

    /// Last successfully loaded registry, if any.
    #[must_use]
    pub fn snapshot(&self) -> Option<Arc<ChainRegistry>> {
        self.inner
            .cache
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Current load status.
    #[must_use]
    pub fn status(&self) -> LoadStatus {
        self.inner.status.borrow().clone()
    }

    /// Whether a load is in flight.
    #[must_use]
    pub fn is_loading(&self) -> bool {
        matches!(*self.inner.status.borrow(), LoadStatus::Loading)
    }

    /// Subscribes to status changes.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<LoadStatus> {
        self.inner.status.subscribe()
    }

    /// Drops the cached registry and resets the status to idle.
    ///
    /// A load in flight keeps running and publishes its result when done.
    pub fn clear(&self) {
        *self
            .inner
            .cache
            .write()
            .unwrap_or_else(PoisonError::into_inner) = None;
        self.inner.status.send_if_modified(|status| {
            if matches!(status, LoadStatus::Loading) {
                false
            } else {
                *status = LoadStatus::Idle;
                true
            }
        });
    }

    /// Loads the full registry, joining a load already in flight.
    ///
    /// On success the cache is replaced wholesale. On failure nothing is
    /// published and the previous cache stays readable.
    ///
    /// # Errors
    ///
    /// Returns the error of the shared load if any page failed.
    pub async fn load(&self) -> Result<Arc<ChainRegistry>, RegistryError> {
        let rx = self.start();
        self.wait(rx).await
    }

    /// Like [`load`](Self::load) but stops waiting after `timeout`.
    ///
    /// The underlying fetch is not cancelled.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::Timeout`] if the load did not finish in time,
    /// or the error of the shared load.
    pub async fn load_with_timeout(
        &self,
        timeout: Duration,
    ) -> Result<Arc<ChainRegistry>, RegistryError> {
        let rx = self.start();
        tokio::time::timeout(timeout, self.wait(rx))
            .await
            .map_err(|_| RegistryError::Timeout(timeout))?
    }

    /// Returns the cached registry unless a load is in flight or nothing is
    /// cached, in which case it waits for (or starts) a load bounded by
    /// `timeout`.
    ///
    /// # Errors
    ///
    /// Same as [`load_with_timeout`](Self::load_with_timeout).
    pub async fn ready(&self, timeout: Duration) -> Result<Arc<ChainRegistry>, RegistryError> {
        if !self.is_loading()
            && let Some(registry) = self.snapshot()
        {
            return Ok(registry);
        }
        self.load_with_timeout(timeout).await
    }

    /// Marks a load as started unless one is already running, spawning the
    /// fetch in the former case. The returned receiver observes its outcome.
    fn start(&self) -> watch::Receiver<LoadStatus> {
        let rx = self.inner.status.subscribe();
        let started = self.inner.status.send_if_modified(|status| {
            if matches!(status, LoadStatus::Loading) {
                false
            } else {
                *status = LoadStatus::Loading;
                true
            }
        });
        if started {
            let inner = Arc::clone(&self.inner);
            tokio::spawn(async move {
                let result = fetch_all(inner.source.as_ref(), inner.retry).await;
                inner.publish(result);
            });
        }
        rx
    }

    async fn wait(
        &self,
        mut rx: watch::Receiver<LoadStatus>,
    ) -> Result<Arc<ChainRegistry>, RegistryError> {
        let status = rx
            .wait_for(|status| !matches!(status, LoadStatus::Loading))
            .await
            .map_err(|e| RegistryError::unavailable("registry loader dropped", e))?
            .clone();
        match status {
            LoadStatus::Failed(err) => Err(err),
            _ => self
                .snapshot()
                .ok_or_else(|| RegistryError::Unavailable("registry cache was cleared".to_owned())),
        }
    }
}

impl Inner {
    fn publish(&self, result: Result<ChainRegistry, RegistryError>) {
        match result {
            Ok(registry) => {
                info!(chains = registry.len(), "chain registry published");
                *self.cache.write().unwrap_or_else(PoisonError::into_inner) =
                    Some(Arc::new(registry));
                self.status.send_replace(LoadStatus::Loaded);
            }
            Err(err) => {
                warn!(error = %err, "chain registry load failed, keeping previous cache");
                self.status.send_replace(LoadStatus::Failed(err));
            }
        }
    }
}

/// Follows `next` cursors until the last page, concatenating results in
/// response order. Any page failure discards everything fetched so far.
async fn fetch_all(
    source: &dyn RegistrySource,
    retry: RetryPolicy,
) -> Result<ChainRegistry, RegistryError> {
    let mut chains: Vec<ChainConfig> = Vec::new();
    let mut cursor: Option<Url> = None;
    loop {
        let page_cursor = cursor.as_ref();
        let page = with_retry("fetch chain registry page", retry, move || {
            source.fetch_page(page_cursor)
        })
        .await?;
        chains.extend(page.results.into_iter().map(ChainConfig::from));
        match page.next {
            Some(next) => cursor = Some(next),
            None => break,
        }
    }
    Ok(chains.into_iter().collect())
}

#[cfg(test)]
pub(crate) mod fakes {
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;

    use super::*;
    use crate::chain::ChainPage;
    use crate::chain::fixtures::gateway_json;

    /// In-memory registry serving fixed pages of `(chain_id, short_name)`.
    #[derive(Debug, Default)]
    pub(crate) struct FakeSource {
        pub(crate) pages: Vec<Vec<(&'static str, &'static str)>>,
        pub(crate) latency: Duration,
        pub(crate) failing_page: Mutex<Option<usize>>,
        pub(crate) calls: AtomicUsize,
    }

    impl FakeSource {
        pub(crate) fn new(pages: Vec<Vec<(&'static str, &'static str)>>) -> Self {
            Self {
                pages,
                ..Self::default()
            }
        }

        pub(crate) fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    fn page_url(index: usize) -> Url {
        Url::parse(&format!("https://registry.test/v1/chains?cursor={index}")).unwrap()
    }

    #[async_trait]
    impl RegistrySource for FakeSource {
        async fn fetch_page(&self, cursor: Option<&Url>) -> Result<ChainPage, RegistryError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(self.latency).await;
            let index = cursor
                .and_then(|url| url.query_pairs().find(|(k, _)| k == "cursor"))
                .map_or(0, |(_, v)| v.parse().unwrap());
            if *self.failing_page.lock().unwrap() == Some(index) {
                return Err(RegistryError::Http {
                    status: 404,
                    url: page_url(index),
                });
            }
            let results = self.pages[index]
                .iter()
                .map(|(id, short)| serde_json::from_value(gateway_json(id, short)).unwrap())
                .collect();
            Ok(ChainPage {
                count: Some(self.pages.iter().map(Vec::len).sum()),
                next: (index + 1 < self.pages.len()).then(|| page_url(index + 1)),
                results,
            })
        }
    }

    /// Source wrapper sharing one [`FakeSource`] with the test body.
    #[derive(Debug, Clone)]
    pub(crate) struct SharedSource(pub(crate) Arc<FakeSource>);

    #[async_trait]
    impl RegistrySource for SharedSource {
        async fn fetch_page(&self, cursor: Option<&Url>) -> Result<ChainPage, RegistryError> {
            self.0.fetch_page(cursor).await
        }
    }

    pub(crate) fn loader(source: FakeSource) -> (ChainRegistryLoader, Arc<FakeSource>) {
        let source = Arc::new(source);
        let loader =
            ChainRegistryLoader::with_retry(SharedSource(Arc::clone(&source)), RetryPolicy::NONE);
        (loader, source)
    }
}

#[cfg(test)]
mod tests {
    use super::fakes::*;
    use super::*;

    fn two_pages() -> FakeSource {
        FakeSource::new(vec![
            vec![("1", "eth"), ("560000", "hetu")],
            vec![("137", "matic")],
        ])
    }

    #[tokio::test]
    async fn concatenates_pages_in_response_order() {
        let (loader, source) = loader(two_pages());
        assert!(loader.snapshot().is_none());
        assert_eq!(loader.status(), LoadStatus::Idle);

        let registry = loader.load().await.unwrap();
        let ids: Vec<_> = registry.iter().map(|c| c.chain_id.to_string()).collect();
        assert_eq!(ids, ["1", "560000", "137"]);
        assert_eq!(source.calls(), 2);
        assert_eq!(loader.status(), LoadStatus::Loaded);
        assert!(Arc::ptr_eq(&registry, &loader.snapshot().unwrap()));
    }

    #[tokio::test(start_paused = true)]
    async fn concurrent_loads_share_one_fetch() {
        let (loader, source) = loader(FakeSource {
            latency: Duration::from_millis(50),
            ..two_pages()
        });

        let handles: Vec<_> = (0..5)
            .map(|_| {
                let loader = loader.clone();
                tokio::spawn(async move { loader.load().await })
            })
            .collect();
        let mut registries = Vec::new();
        for handle in handles {
            registries.push(handle.await.unwrap().unwrap());
        }

        assert_eq!(source.calls(), 2);
        assert!(registries.windows(2).all(|w| Arc::ptr_eq(&w[0], &w[1])));
    }

    #[tokio::test]
    async fn failing_page_discards_load_and_keeps_previous_cache() {
        let (loader, source) = loader(two_pages());
        let first = loader.load().await.unwrap();

        *source.failing_page.lock().unwrap() = Some(1);
        let err = loader.load().await.unwrap_err();
        assert!(matches!(err, RegistryError::Http { status: 404, .. }));
        assert_eq!(loader.status(), LoadStatus::Failed(err));
        assert!(Arc::ptr_eq(&first, &loader.snapshot().unwrap()));
        assert_eq!(source.calls(), 4);
    }

    #[tokio::test]
    async fn failing_first_load_publishes_nothing() {
        let (loader, source) = loader(two_pages());
        *source.failing_page.lock().unwrap() = Some(1);
        assert!(loader.load().await.is_err());
        assert!(loader.snapshot().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn timeout_cancels_the_wait_not_the_fetch() {
        let (loader, _source) = loader(FakeSource {
            latency: Duration::from_secs(10),
            ..two_pages()
        });

        let err = loader
            .load_with_timeout(Duration::from_secs(1))
            .await
            .unwrap_err();
        assert_eq!(err, RegistryError::Timeout(Duration::from_secs(1)));
        assert!(loader.is_loading());

        tokio::time::sleep(Duration::from_secs(30)).await;
        assert_eq!(loader.status(), LoadStatus::Loaded);
        assert_eq!(loader.snapshot().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn ready_serves_cache_without_refetching() {
        let (loader, source) = loader(two_pages());
        loader.load().await.unwrap();
        loader.ready(Duration::from_secs(1)).await.unwrap();
        assert_eq!(source.calls(), 2);

        loader.clear();
        assert!(loader.snapshot().is_none());
        assert_eq!(loader.status(), LoadStatus::Idle);
        loader.ready(Duration::from_secs(1)).await.unwrap();
        assert_eq!(source.calls(), 4);
    }
}
