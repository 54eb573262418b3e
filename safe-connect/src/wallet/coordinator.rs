//! Exactly-once wallet session bootstrap.

use std::sync::{Arc, Mutex, PoisonError, RwLock};
use std::time::Duration;

use futures::FutureExt;
use futures::future::{BoxFuture, Shared};
use tokio::sync::watch;
use tracing::{debug, info, warn};
use url::Url;

use super::connector::{ConnectRequest, WalletConnector};
use super::{ConnectError, WalletSession};
use crate::chain::{ChainId, MAINNET};
use crate::registry::ChainRegistryLoader;

/// Default bound on waiting for the chain registry.
pub const DEFAULT_REGISTRY_TIMEOUT: Duration = Duration::from_secs(5);

/// Observable bootstrap progress.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum BootstrapState {
    /// No connection requested, or the last session was disconnected.
    #[default]
    Idle,
    /// Waiting for the chain registry to finish loading.
    AwaitingRegistry,
    /// Constructing the wallet provider.
    Initializing,
    /// A session for the chain is published.
    Ready(ChainId),
    /// The last attempt failed; a new `connect` retries.
    Failed(ConnectError),
}

/// Coordinator settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoordinatorSettings {
    /// Chain `connect` binds to until switched.
    pub chain: ChainId,
    /// RPC URL replacing the registry endpoint.
    pub rpc_override: Option<Url>,
    /// Bound on waiting for the registry. Provider construction is not bounded.
    pub registry_timeout: Duration,
}

impl Default for CoordinatorSettings {
    fn default() -> Self {
        Self {
            chain: ChainId::new(MAINNET),
            rpc_override: None,
            registry_timeout: DEFAULT_REGISTRY_TIMEOUT,
        }
    }
}

type InitResult = Result<Arc<WalletSession>, ConnectError>;
type SharedInit = Shared<BoxFuture<'static, InitResult>>;

struct InFlight {
    chain: ChainId,
    init: SharedInit,
}

impl std::fmt::Debug for InFlight {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InFlight")
            .field("chain", &self.chain)
            .finish_non_exhaustive()
    }
}

/// Owns the current [`WalletSession`] and makes sure at most one is being
/// constructed at any time.
///
/// Concurrent [`connect`](Self::connect) calls share one registry wait and one
/// provider construction and all resolve to the same session or the same
/// error. Cloning is cheap; clones share state.
#[derive(Debug, Clone)]
pub struct WalletCoordinator {
    inner: Arc<Inner>,
}

#[derive(Debug)]
struct Inner {
    registry: ChainRegistryLoader,
    connector: Arc<dyn WalletConnector>,
    rpc_override: Option<Url>,
    registry_timeout: Duration,
    selected: RwLock<ChainId>,
    current: RwLock<Option<Arc<WalletSession>>>,
    in_flight: Mutex<Option<InFlight>>,
    state: watch::Sender<BootstrapState>,
}

impl WalletCoordinator {
    /// Creates an idle coordinator.
    pub fn new(
        registry: ChainRegistryLoader,
        connector: Arc<dyn WalletConnector>,
        settings: CoordinatorSettings,
    ) -> Self {
        let (state, _) = watch::channel(BootstrapState::Idle);
        Self {
            inner: Arc::new(Inner {
                registry,
                connector,
                rpc_override: settings.rpc_override,
                registry_timeout: settings.registry_timeout,
                selected: RwLock::new(settings.chain),
                current: RwLock::new(None),
                in_flight: Mutex::new(None),
                state,
            }),
        }
    }

    /// Registry loader the coordinator waits on.
    #[must_use]
    pub fn registry(&self) -> &ChainRegistryLoader {
        &self.inner.registry
    }

    /// Currently selected chain.
    #[must_use]
    pub fn selected_chain(&self) -> ChainId {
        self.inner
            .selected
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Current session, if one is published.
    #[must_use]
    pub fn current(&self) -> Option<Arc<WalletSession>> {
        self.inner.current()
    }

    /// Current bootstrap state.
    #[must_use]
    pub fn state(&self) -> BootstrapState {
        self.inner.state.borrow().clone()
    }

    /// Subscribes to bootstrap state changes.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<BootstrapState> {
        self.inner.state.subscribe()
    }

    /// Connects to the selected chain.
    ///
    /// An existing session for the chain is returned without suspending.
    /// Otherwise the caller joins the initialization in flight or starts one:
    /// wait for the registry (bounded by the registry timeout), construct the
    /// provider, then publish the session and invalidate its predecessor.
    /// A session finished after [`switch_chain`](Self::switch_chain) moved the
    /// selection elsewhere is returned already invalidated and never published.
    ///
    /// # Errors
    ///
    /// [`ConnectError::RegistryTimeout`] or
    /// [`ConnectError::RegistryUnavailable`] if the registry is not available,
    /// [`ConnectError::UnknownChain`] if it lacks the chain, and
    /// [`ConnectError::InitializationFailed`] if the provider could not be
    /// constructed. A failure leaves the current session untouched.
    pub async fn connect(&self) -> Result<Arc<WalletSession>, ConnectError> {
        let chain = self.selected_chain();
        self.connect_to(&chain).await
    }

    /// Selects `chain` and connects to it, superseding the session of any
    /// other chain. On failure the previous selection is restored.
    ///
    /// # Errors
    ///
    /// See [`connect`](Self::connect).
    pub async fn switch_chain(&self, chain: ChainId) -> Result<Arc<WalletSession>, ConnectError> {
        let previous = std::mem::replace(
            &mut *self
                .inner
                .selected
                .write()
                .unwrap_or_else(PoisonError::into_inner),
            chain.clone(),
        );
        let result = self.connect_to(&chain).await;
        if result.is_err() {
            let mut selected = self
                .inner
                .selected
                .write()
                .unwrap_or_else(PoisonError::into_inner);
            if *selected == chain {
                *selected = previous;
            }
        }
        result
    }

    async fn connect_to(&self, chain: &ChainId) -> Result<Arc<WalletSession>, ConnectError> {
        loop {
            if let Some(session) = self.inner.current_for(chain) {
                return Ok(session);
            }
            let (init, ours) = self.join_or_start(chain);
            let result = init.await;
            if ours {
                return result;
            }
            debug!(%chain, "initialization for another chain finished, retrying");
        }
    }

    /// Drops and invalidates the current session.
    ///
    /// An initialization already in flight is not cancelled.
    pub fn disconnect(&self) {
        let previous = self
            .inner
            .current
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(session) = previous {
            info!(chain_id = %session.chain_id(), "wallet session disconnected");
            session.invalidate();
        }
        self.inner.state.send_replace(BootstrapState::Idle);
    }

    fn join_or_start(&self, chain: &ChainId) -> (SharedInit, bool) {
        let mut slot = self
            .inner
            .in_flight
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if let Some(in_flight) = slot.as_ref() {
            debug!(%chain, in_flight = %in_flight.chain, "joining wallet initialization");
            return (in_flight.init.clone(), in_flight.chain == *chain);
        }

        let inner = Arc::clone(&self.inner);
        let target = chain.clone();
        let init = async move {
            let result = inner.initialize(&target).await;
            *inner.in_flight.lock().unwrap_or_else(PoisonError::into_inner) = None;
            result
        }
        .boxed()
        .shared();
        *slot = Some(InFlight {
            chain: chain.clone(),
            init: init.clone(),
        });
        (init, true)
    }
}

impl Inner {
    fn current(&self) -> Option<Arc<WalletSession>> {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn is_selected(&self, chain: &ChainId) -> bool {
        *self.selected.read().unwrap_or_else(PoisonError::into_inner) == *chain
    }

    fn current_for(&self, chain: &ChainId) -> Option<Arc<WalletSession>> {
        self.current().filter(|s| s.chain_id() == chain)
    }

    async fn initialize(&self, chain: &ChainId) -> InitResult {
        let result = self.construct(chain).await;
        match &result {
            Ok(session) if !self.is_selected(chain) => {
                // Selection moved on while constructing; the switch publishes.
                debug!(chain_id = %chain, "discarding session for deselected chain");
                session.invalidate();
            }
            Ok(session) => {
                let previous = self
                    .current
                    .write()
                    .unwrap_or_else(PoisonError::into_inner)
                    .replace(Arc::clone(session));
                if let Some(previous) = previous {
                    previous.invalidate();
                }
                info!(chain_id = %chain, address = ?session.address(), "wallet session published");
                self.state.send_replace(BootstrapState::Ready(chain.clone()));
            }
            Err(err) => {
                warn!(chain_id = %chain, error = %err, "wallet initialization failed");
                self.state.send_replace(BootstrapState::Failed(err.clone()));
            }
        }
        result
    }

    async fn construct(&self, chain: &ChainId) -> InitResult {
        if self.registry.is_loading() || self.registry.snapshot().is_none() {
            self.state.send_replace(BootstrapState::AwaitingRegistry);
        }
        let registry = self.registry.ready(self.registry_timeout).await?;
        let config = registry
            .get(chain)
            .ok_or_else(|| ConnectError::UnknownChain(chain.clone()))?;

        self.state.send_replace(BootstrapState::Initializing);
        let connection = self
            .connector
            .connect(ConnectRequest {
                chains: &registry,
                chain: config,
                rpc_override: self.rpc_override.as_ref(),
            })
            .await
            .map_err(|e| ConnectError::InitializationFailed(e.to_string()))?;

        Ok(Arc::new(WalletSession::new(config.clone(), connection)))
    }
}

#[cfg(test)]
mod tests {
    use futures::future::join_all;

    use super::*;
    use crate::registry::fakes::{FakeSource, loader};
    use crate::wallet::connector::ConnectorError;
    use crate::wallet::connector::fakes::{ACCOUNT, FakeConnector};

    struct Harness {
        coordinator: WalletCoordinator,
        source: Arc<FakeSource>,
        connector: Arc<FakeConnector>,
    }

    fn harness(registry_latency: Duration, registry_timeout: Duration) -> Harness {
        let mut source = FakeSource::new(vec![
            vec![("1", "eth"), ("137", "matic")],
            vec![("560000", "hetu")],
        ]);
        source.latency = registry_latency;
        let (registry, source) = loader(source);
        let connector = Arc::new(FakeConnector {
            latency: Duration::from_millis(50),
            ..FakeConnector::default()
        });
        let coordinator = WalletCoordinator::new(
            registry,
            Arc::clone(&connector) as Arc<dyn WalletConnector>,
            CoordinatorSettings {
                registry_timeout,
                ..CoordinatorSettings::default()
            },
        );
        Harness {
            coordinator,
            source,
            connector,
        }
    }

    #[tokio::test(start_paused = true)]
    async fn concurrent_connects_share_one_construction() {
        let h = harness(Duration::from_millis(100), Duration::from_secs(5));
        let mut states = h.coordinator.subscribe();

        let results = join_all((0..5).map(|_| h.coordinator.connect())).await;
        let sessions: Vec<_> = results.into_iter().map(Result::unwrap).collect();

        assert_eq!(h.connector.calls(), 1);
        assert_eq!(h.source.calls(), 2);
        assert!(sessions.iter().all(|s| Arc::ptr_eq(s, &sessions[0])));
        assert_eq!(sessions[0].chain_id(), &ChainId::new("1"));
        assert_eq!(sessions[0].address(), Some(ACCOUNT));
        assert!(states.has_changed().unwrap());
        assert_eq!(*states.borrow_and_update(), BootstrapState::Ready(ChainId::new("1")));
    }

    #[tokio::test(start_paused = true)]
    async fn existing_session_is_returned_without_construction() {
        let h = harness(Duration::ZERO, Duration::from_secs(5));
        let first = h.coordinator.connect().await.unwrap();
        let second = h.coordinator.connect().await.unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(h.connector.calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn registry_timeout_fails_all_waiters_identically() {
        let h = harness(Duration::from_secs(10), Duration::from_secs(1));

        let results = join_all((0..3).map(|_| h.coordinator.connect())).await;
        for result in results {
            assert_eq!(
                result.unwrap_err(),
                ConnectError::RegistryTimeout(Duration::from_secs(1))
            );
        }
        assert_eq!(h.connector.calls(), 0);
        assert!(h.coordinator.current().is_none());
        assert!(matches!(h.coordinator.state(), BootstrapState::Failed(_)));

        // The fetch was not cancelled; once it lands a retry succeeds.
        tokio::time::sleep(Duration::from_secs(30)).await;
        assert!(h.coordinator.registry().snapshot().is_some());
        h.coordinator.connect().await.unwrap();
        assert_eq!(h.connector.calls(), 1);
        assert_eq!(h.source.calls(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn initialization_failure_publishes_nothing_and_can_be_retried() {
        let h = harness(Duration::ZERO, Duration::from_secs(5));
        h.connector
            .fail_with(Some(ConnectorError::NoRpcEndpoint(ChainId::new("1"))));

        let results = join_all((0..2).map(|_| h.coordinator.connect())).await;
        for result in &results {
            assert!(matches!(result, Err(ConnectError::InitializationFailed(_))));
        }
        assert_eq!(
            results[0].as_ref().unwrap_err(),
            results[1].as_ref().unwrap_err()
        );
        assert_eq!(h.connector.calls(), 1);
        assert!(h.coordinator.current().is_none());

        h.connector.fail_with(None);
        h.coordinator.connect().await.unwrap();
        assert_eq!(h.connector.calls(), 2);
        assert_eq!(h.coordinator.state(), BootstrapState::Ready(ChainId::new("1")));
    }

    #[tokio::test(start_paused = true)]
    async fn chain_switch_invalidates_previous_session() {
        let h = harness(Duration::ZERO, Duration::from_secs(5));
        let mainnet = h.coordinator.connect().await.unwrap();
        let polygon = h.coordinator.switch_chain(ChainId::new("137")).await.unwrap();

        assert!(!mainnet.is_current());
        mainnet.invalidated().await;
        assert!(polygon.is_current());
        assert_eq!(h.coordinator.selected_chain(), ChainId::new("137"));
        assert!(Arc::ptr_eq(&h.coordinator.current().unwrap(), &polygon));

        h.coordinator.disconnect();
        assert!(!polygon.is_current());
        assert!(h.coordinator.current().is_none());
        assert_eq!(h.coordinator.state(), BootstrapState::Idle);
    }

    #[tokio::test(start_paused = true)]
    async fn failed_switch_keeps_previous_session() {
        let h = harness(Duration::ZERO, Duration::from_secs(5));
        let mainnet = h.coordinator.connect().await.unwrap();

        let err = h
            .coordinator
            .switch_chain(ChainId::new("42161"))
            .await
            .unwrap_err();
        assert_eq!(err, ConnectError::UnknownChain(ChainId::new("42161")));
        assert_eq!(h.connector.calls(), 1);
        assert_eq!(h.coordinator.selected_chain(), ChainId::new("1"));
        assert!(mainnet.is_current());
        assert!(Arc::ptr_eq(&h.coordinator.current().unwrap(), &mainnet));
    }

    #[tokio::test(start_paused = true)]
    async fn switch_during_initialization_publishes_only_the_selected_chain() {
        let h = harness(Duration::from_millis(100), Duration::from_secs(5));
        let hetu = ChainId::new("560000");
        let (a, b) = tokio::join!(
            h.coordinator.connect(),
            h.coordinator.switch_chain(hetu.clone())
        );

        let (a, b) = (a.unwrap(), b.unwrap());
        assert_eq!(h.connector.calls(), 2);
        assert_eq!(a.chain_id(), &ChainId::new("1"));
        assert!(!a.is_current());
        assert_eq!(b.chain_id(), &hetu);
        assert!(b.is_current());
        assert_eq!(h.coordinator.selected_chain(), hetu);
        assert_eq!(h.coordinator.state(), BootstrapState::Ready(hetu.clone()));

        let again = h.coordinator.connect().await.unwrap();
        assert!(Arc::ptr_eq(&again, &b));
        assert_eq!(h.connector.calls(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn state_walks_through_every_bootstrap_phase() {
        let h = harness(Duration::from_millis(600), Duration::from_secs(1));
        assert_eq!(h.coordinator.state(), BootstrapState::Idle);

        let mut rx = h.coordinator.subscribe();
        let recorder = tokio::spawn(async move {
            let mut seen = Vec::new();
            while rx.changed().await.is_ok() {
                let state = rx.borrow_and_update().clone();
                let ready = matches!(state, BootstrapState::Ready(_));
                seen.push(state);
                if ready {
                    break;
                }
            }
            seen
        });

        // Two pages at 600ms each outlast the first 1s wait.
        let err = h.coordinator.connect().await.unwrap_err();
        assert_eq!(err, ConnectError::RegistryTimeout(Duration::from_secs(1)));
        tokio::time::sleep(Duration::from_millis(100)).await;
        assert!(h.coordinator.registry().is_loading());
        h.coordinator.connect().await.unwrap();

        assert_eq!(
            recorder.await.unwrap(),
            [
                BootstrapState::AwaitingRegistry,
                BootstrapState::Failed(err),
                BootstrapState::AwaitingRegistry,
                BootstrapState::Initializing,
                BootstrapState::Ready(ChainId::new("1")),
            ]
        );
        assert_eq!(h.connector.calls(), 1);
        assert_eq!(h.source.calls(), 2);
    }
}
