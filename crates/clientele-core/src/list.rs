// ── Customer list controller ──
//
// Owns the list snapshot and publishes it through a `watch` channel.
// Every refresh re-enters `Loading` and replaces the whole list; there
// is no incremental merge and no cancellation of in-flight fetches.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use clientele_api::Customer;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio_stream::wrappers::WatchStream;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::api::CustomerApi;

const REFRESH_CHANNEL_SIZE: usize = 16;

/// What the list view should show.
#[derive(Debug, Clone)]
pub enum ListState {
    Loading,
    Error(String),
    Ready(Arc<Vec<Customer>>),
}

impl ListState {
    pub fn is_loading(&self) -> bool {
        matches!(self, Self::Loading)
    }

    /// The loaded customers, if any.
    pub fn customers(&self) -> Option<&Arc<Vec<Customer>>> {
        match self {
            Self::Ready(list) => Some(list),
            _ => None,
        }
    }
}

/// Which completion wins when fetches overlap.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum RefreshOrdering {
    /// Whichever fetch resolves last is shown, even if it was issued first.
    #[default]
    LastResolved,
    /// Only the most recently issued fetch may update the list.
    LatestIssued,
}

/// Marker sent through a [`RefreshHandle`].
#[derive(Debug)]
struct RefreshRequest;

/// Cloneable "please refetch" sender handed to forms and actions.
#[derive(Debug, Clone)]
pub struct RefreshHandle {
    tx: mpsc::Sender<RefreshRequest>,
}

impl RefreshHandle {
    /// Ask the list controller to refetch. Never blocks; requests beyond
    /// the queue capacity are coalesced into the pending ones.
    pub fn refresh(&self) {
        match self.tx.try_send(RefreshRequest) {
            Ok(()) => debug!("refresh requested"),
            Err(mpsc::error::TrySendError::Full(_)) => debug!("refresh already queued"),
            Err(mpsc::error::TrySendError::Closed(_)) => {
                debug!("list controller gone, refresh dropped");
            }
        }
    }
}

/// Fetches the customer list and publishes it.
pub struct ListController<A> {
    inner: Arc<ListInner<A>>,
}

impl<A> Clone for ListController<A> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

struct ListInner<A> {
    api: Arc<A>,
    ordering: RefreshOrdering,
    state: watch::Sender<ListState>,
    issued: AtomicU64,
    refresh_tx: mpsc::Sender<RefreshRequest>,
    refresh_rx: Mutex<Option<mpsc::Receiver<RefreshRequest>>>,
}

impl<A: CustomerApi + 'static> ListController<A> {
    /// A controller in the `Loading` state. Nothing is fetched until
    /// [`start`](Self::start) or [`refresh`](Self::refresh).
    pub fn new(api: Arc<A>, ordering: RefreshOrdering) -> Self {
        let (state, _) = watch::channel(ListState::Loading);
        let (refresh_tx, refresh_rx) = mpsc::channel(REFRESH_CHANNEL_SIZE);
        Self {
            inner: Arc::new(ListInner {
                api,
                ordering,
                state,
                issued: AtomicU64::new(0),
                refresh_tx,
                refresh_rx: Mutex::new(Some(refresh_rx)),
            }),
        }
    }

    pub fn ordering(&self) -> RefreshOrdering {
        self.inner.ordering
    }

    /// Initial load.
    pub fn start(&self) -> JoinHandle<()> {
        self.refresh()
    }

    /// Re-enter `Loading` and spawn a full refetch.
    pub fn refresh(&self) -> JoinHandle<()> {
        let generation = self.inner.issued.fetch_add(1, Ordering::SeqCst) + 1;
        self.inner.state.send_replace(ListState::Loading);
        debug!(generation, "fetching customers");

        let inner = Arc::clone(&self.inner);
        tokio::spawn(async move {
            let result = inner.api.list().await;
            let next = match result {
                Ok(list) => ListState::Ready(Arc::new(list)),
                Err(e) => {
                    warn!(error = %e, generation, "customer fetch failed");
                    ListState::Error(e.to_string())
                }
            };
            inner.apply(generation, next);
        })
    }

    /// A handle forms and actions use to request a refetch.
    pub fn refresh_handle(&self) -> RefreshHandle {
        RefreshHandle {
            tx: self.inner.refresh_tx.clone(),
        }
    }

    /// Serve refresh requests until `cancel` fires. Only the first call
    /// does anything; later calls return at once.
    pub async fn run(&self, cancel: CancellationToken) {
        let rx = self
            .inner
            .refresh_rx
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        let Some(mut rx) = rx else {
            warn!("list refresh loop already running");
            return;
        };

        loop {
            tokio::select! {
                biased;
                () = cancel.cancelled() => break,
                request = rx.recv() => {
                    let Some(RefreshRequest) = request else { break };
                    drop(self.refresh());
                }
            }
        }
        debug!("list refresh loop stopped");
    }

    pub fn state(&self) -> ListState {
        self.inner.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<ListState> {
        self.inner.state.subscribe()
    }

    /// The state as a `Stream`, starting with the current value.
    pub fn stream(&self) -> WatchStream<ListState> {
        WatchStream::new(self.subscribe())
    }

    /// Wait until the state leaves `Loading`, returning it.
    pub async fn wait_settled(&self) -> ListState {
        let mut rx = self.subscribe();
        match rx.wait_for(|s| !s.is_loading()).await {
            Ok(state) => state.clone(),
            Err(_) => self.state(),
        }
    }

    /// Loaded, and nobody is there.
    pub fn is_empty(&self) -> bool {
        self.inner
            .state
            .borrow()
            .customers()
            .is_some_and(|list| list.is_empty())
    }
}

impl<A> ListInner<A> {
    fn apply(&self, generation: u64, next: ListState) {
        let ordering = self.ordering;
        let applied = self.state.send_if_modified(|state| {
            if ordering == RefreshOrdering::LatestIssued
                && generation < self.issued.load(Ordering::SeqCst)
            {
                return false;
            }
            *state = next;
            true
        });
        if !applied {
            warn!(generation, "discarding stale customer list");
        }
    }
}
