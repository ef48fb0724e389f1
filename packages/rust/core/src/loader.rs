//! Route-bound content loader.
//!
//! A [`RouteLoader`] follows the current route parameter and publishes the
//! rendered tutorial for it through a `watch` channel. Every route change
//! starts a new load cycle identified by a monotonically increasing token.
//! A cycle publishes only if its token is still the current one when it
//! completes, so a slow response for an earlier route can never overwrite a
//! later one, and nothing is published once the loader is torn down.
//!
//! Superseded cycles are not aborted by default: their results are simply
//! dropped. [`RouteLoader::with_abort_superseded`] additionally aborts the
//! in-flight fetch.

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::sync::watch;
use tokio::task::{AbortHandle, JoinHandle};
use tracing::{debug, warn};

use monotone_content::ContentResolver;
use monotone_markdown::{MarkdownRenderer, RenderedDocument};
use monotone_shared::{MonotoneError, Result, RouteParam};

// ---------------------------------------------------------------------------
// Published state
// ---------------------------------------------------------------------------

/// What the view shows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderedContent {
    /// Nothing loaded yet (no route, or before the first cycle finishes).
    Placeholder,
    /// A rendered tutorial and the parameter it was loaded for.
    Loaded {
        param: RouteParam,
        document: Arc<RenderedDocument>,
    },
    /// The route names a tutorial that has no content.
    NotFound { param: RouteParam },
    /// Content exists (or may exist) but could not be retrieved.
    Failed { param: RouteParam, message: String },
}

impl RenderedContent {
    /// The HTML to display, if a tutorial is loaded.
    pub fn html(&self) -> Option<&str> {
        match self {
            Self::Loaded { document, .. } => Some(&document.html),
            _ => None,
        }
    }
}

/// Snapshot published to subscribers on every state transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadState {
    /// The route parameter of the active cycle.
    pub route: Option<RouteParam>,
    /// A cycle is in flight; `content` still holds the previous result.
    pub loading: bool,
    pub content: RenderedContent,
}

impl LoadState {
    fn idle() -> Self {
        Self {
            route: None,
            loading: false,
            content: RenderedContent::Placeholder,
        }
    }

    /// Lifecycle status implied by this snapshot.
    pub fn status(&self) -> LoaderStatus {
        if self.loading {
            return LoaderStatus::Loading;
        }
        match (&self.route, &self.content) {
            (None, _) | (_, RenderedContent::Placeholder) => LoaderStatus::Idle,
            (_, RenderedContent::Loaded { .. }) => LoaderStatus::Loaded,
            (_, RenderedContent::NotFound { .. }) => LoaderStatus::NotFound,
            (_, RenderedContent::Failed { .. }) => LoaderStatus::Failed,
        }
    }
}

/// Loader lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoaderStatus {
    Idle,
    Loading,
    Loaded,
    NotFound,
    Failed,
    TornDown,
}

impl fmt::Display for LoaderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Idle => write!(f, "idle"),
            Self::Loading => write!(f, "loading"),
            Self::Loaded => write!(f, "loaded"),
            Self::NotFound => write!(f, "not found"),
            Self::Failed => write!(f, "failed"),
            Self::TornDown => write!(f, "torn down"),
        }
    }
}

/// How a load cycle ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleOutcome {
    /// The cycle was current at completion and published this status.
    Published(LoaderStatus),
    /// A newer cycle or a teardown happened first; nothing was published.
    Superseded,
}

// ---------------------------------------------------------------------------
// Cycle bookkeeping
// ---------------------------------------------------------------------------

struct CycleState {
    /// Freshness token of the active cycle.
    token: u64,
    route: Option<RouteParam>,
    status: LoaderStatus,
    torn_down: bool,
    in_flight: Option<AbortHandle>,
}

struct Shared {
    cycle: Mutex<CycleState>,
    tx: watch::Sender<LoadState>,
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, CycleState> {
        self.cycle.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn is_current(&self, token: u64) -> bool {
        let cycle = self.lock();
        !cycle.torn_down && cycle.token == token
    }

    /// Publish `content` for cycle `token`, unless it has been superseded.
    ///
    /// The freshness check and the send happen under the same lock that
    /// `set_route` takes to advance the token.
    fn publish(&self, token: u64, param: RouteParam, content: RenderedContent) -> CycleOutcome {
        let mut cycle = self.lock();
        if cycle.torn_down || cycle.token != token {
            debug!(token, current = cycle.token, %param, "load cycle superseded, result dropped");
            return CycleOutcome::Superseded;
        }

        let state = LoadState {
            route: Some(param),
            loading: false,
            content,
        };
        let status = state.status();
        cycle.status = status;
        cycle.in_flight = None;
        self.tx.send_replace(state);

        debug!(token, %status, "load cycle published");
        CycleOutcome::Published(status)
    }
}

// ---------------------------------------------------------------------------
// CycleHandle
// ---------------------------------------------------------------------------

/// Handle to a spawned load cycle. Dropping it does not cancel the cycle.
#[derive(Debug)]
pub struct CycleHandle {
    token: u64,
    param: RouteParam,
    handle: JoinHandle<CycleOutcome>,
}

impl CycleHandle {
    pub fn token(&self) -> u64 {
        self.token
    }

    pub fn param(&self) -> &RouteParam {
        &self.param
    }

    /// Wait for the cycle to finish.
    pub async fn wait(self) -> CycleOutcome {
        match self.handle.await {
            Ok(outcome) => outcome,
            Err(e) => {
                warn!(token = self.token, error = %e, "load cycle task did not complete");
                CycleOutcome::Superseded
            }
        }
    }
}

// ---------------------------------------------------------------------------
// RouteLoader
// ---------------------------------------------------------------------------

/// Loads and renders the tutorial for the current route parameter.
///
/// Cycles run on the ambient tokio runtime. Each loader owns its token and
/// published slot; loaders never share state with each other.
pub struct RouteLoader {
    resolver: Arc<dyn ContentResolver>,
    renderer: Arc<MarkdownRenderer>,
    shared: Arc<Shared>,
    abort_superseded: bool,
}

impl RouteLoader {
    /// Mount a loader in the idle state.
    pub fn new(resolver: Arc<dyn ContentResolver>, renderer: Arc<MarkdownRenderer>) -> Self {
        let (tx, _rx) = watch::channel(LoadState::idle());
        Self {
            resolver,
            renderer,
            shared: Arc::new(Shared {
                cycle: Mutex::new(CycleState {
                    token: 0,
                    route: None,
                    status: LoaderStatus::Idle,
                    torn_down: false,
                    in_flight: None,
                }),
                tx,
            }),
            abort_superseded: false,
        }
    }

    /// Also abort the fetch of a superseded cycle instead of only
    /// discarding its result.
    pub fn with_abort_superseded(mut self, abort: bool) -> Self {
        self.abort_superseded = abort;
        self
    }

    /// Follow a new route parameter.
    ///
    /// Returns `None` when no cycle was started: the parameter equals the
    /// current one, the new route has no parameter (published as idle right
    /// away), or the loader is torn down.
    pub fn set_route(&self, route: Option<RouteParam>) -> Option<CycleHandle> {
        let mut cycle = self.shared.lock();
        if cycle.torn_down {
            debug!("route change after teardown ignored");
            return None;
        }
        if cycle.route == route {
            return None;
        }
        self.start_cycle(&mut cycle, route)
    }

    /// Start a fresh cycle for the current route parameter.
    pub fn reload(&self) -> Option<CycleHandle> {
        let mut cycle = self.shared.lock();
        if cycle.torn_down {
            return None;
        }
        if cycle.route.is_none() {
            return None;
        }
        let route = cycle.route.clone();
        self.start_cycle(&mut cycle, route)
    }

    fn start_cycle(
        &self,
        cycle: &mut CycleState,
        route: Option<RouteParam>,
    ) -> Option<CycleHandle> {
        cycle.token += 1;
        let token = cycle.token;
        cycle.route = route.clone();

        if let Some(previous) = cycle.in_flight.take() {
            if self.abort_superseded {
                previous.abort();
            }
        }

        let Some(param) = route else {
            cycle.status = LoaderStatus::Idle;
            self.shared.tx.send_replace(LoadState::idle());
            debug!(token, "route cleared");
            return None;
        };

        cycle.status = LoaderStatus::Loading;
        self.shared.tx.send_modify(|state| {
            state.route = Some(param.clone());
            state.loading = true;
        });
        debug!(token, %param, resolver = self.resolver.name(), "load cycle started");

        // The fetch runs as its own task so a panicking resolver surfaces as
        // a join error instead of tearing down the cycle.
        let fetch = {
            let resolver = Arc::clone(&self.resolver);
            let param = param.clone();
            tokio::spawn(async move { resolver.resolve(&param).await })
        };
        cycle.in_flight = Some(fetch.abort_handle());

        let shared = Arc::clone(&self.shared);
        let renderer = Arc::clone(&self.renderer);
        let cycle_param = param.clone();
        let handle = tokio::spawn(async move {
            let result = match fetch.await {
                Ok(result) => result,
                Err(e) if e.is_cancelled() => {
                    return CycleOutcome::Superseded;
                }
                Err(e) => Err(MonotoneError::unavailable(format!("resolver failed: {e}"))),
            };

            // Skip rendering for results nobody will see.
            if !shared.is_current(token) {
                debug!(token, param = %cycle_param, "load cycle superseded before render");
                return CycleOutcome::Superseded;
            }

            let content = to_content(&renderer, &cycle_param, result);
            shared.publish(token, cycle_param, content)
        });

        Some(CycleHandle {
            token,
            param,
            handle,
        })
    }

    /// Subscribe to published state.
    pub fn subscribe(&self) -> watch::Receiver<LoadState> {
        self.shared.tx.subscribe()
    }

    /// The most recently published state.
    pub fn state(&self) -> LoadState {
        self.shared.tx.borrow().clone()
    }

    pub fn status(&self) -> LoaderStatus {
        self.shared.lock().status
    }

    /// The route parameter the loader is following.
    pub fn route(&self) -> Option<RouteParam> {
        self.shared.lock().route.clone()
    }

    /// Stop publishing. In-flight cycles complete as superseded.
    pub fn teardown(&self) {
        let mut cycle = self.shared.lock();
        if cycle.torn_down {
            return;
        }
        cycle.torn_down = true;
        cycle.status = LoaderStatus::TornDown;
        cycle.token += 1;
        if let Some(in_flight) = cycle.in_flight.take() {
            if self.abort_superseded {
                in_flight.abort();
            }
        }
        debug!(token = cycle.token, "loader torn down");
    }
}

impl Drop for RouteLoader {
    fn drop(&mut self) {
        self.teardown();
    }
}

impl fmt::Debug for RouteLoader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let cycle = self.shared.lock();
        f.debug_struct("RouteLoader")
            .field("resolver", &self.resolver.name())
            .field("token", &cycle.token)
            .field("route", &cycle.route)
            .field("status", &cycle.status)
            .finish()
    }
}

/// Normalize a resolver result into publishable content.
fn to_content(
    renderer: &MarkdownRenderer,
    param: &RouteParam,
    result: Result<String>,
) -> RenderedContent {
    match result {
        Ok(text) => RenderedContent::Loaded {
            param: param.clone(),
            document: Arc::new(renderer.render_document(&text)),
        },
        Err(e) if e.is_not_found() => {
            debug!(%param, "tutorial not found");
            RenderedContent::NotFound {
                param: param.clone(),
            }
        }
        Err(e) => {
            warn!(%param, error = %e, "tutorial load failed");
            RenderedContent::Failed {
                param: param.clone(),
                message: e.to_string(),
            }
        }
    }
}
