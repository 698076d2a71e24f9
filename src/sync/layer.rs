//! Shared order cache with optimistic mutations and background reconciliation.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};
use std::time::Duration;

use chrono::Utc;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use super::cache::{self, SyncSnapshot};
use super::client::OrderApi;
use super::error::SyncError;
use super::mutation::OptimisticMutation;
use super::timers::ScheduledTask;
use crate::config::SyncConfig;
use crate::types::{Order, OrderDraft, StatusDomain};

/// Timer settings for an [`OrderSync`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyncSettings {
    pub poll_interval: Duration,
    pub mutation_debounce: Duration,
    pub visibility_debounce: Duration,
}

impl Default for SyncSettings {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(30),
            mutation_debounce: Duration::from_millis(500),
            visibility_debounce: Duration::from_millis(1000),
        }
    }
}

impl SyncSettings {
    pub fn from_config(config: &SyncConfig) -> Self {
        Self {
            poll_interval: config.poll_interval(),
            mutation_debounce: config.mutation_debounce(),
            visibility_debounce: config.visibility_debounce(),
        }
    }
}

struct Inner {
    api: Arc<dyn OrderApi>,
    state: watch::Sender<SyncSnapshot>,
    settings: SyncSettings,
    in_flight: AtomicBool,
    alive: AtomicBool,
    poll: ScheduledTask,
    mutation_refresh: ScheduledTask,
    visibility_refresh: ScheduledTask,
}

/// Clears the in-flight flag however the refresh ends
struct InFlight<'a>(&'a AtomicBool);

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Handle to one sync session; clones share the same cache
///
/// Consumers read through [`OrderSync::subscribe`] or [`OrderSync::snapshot`];
/// only the methods on this type ever change the cache.
#[derive(Clone)]
pub struct OrderSync {
    inner: Arc<Inner>,
}

impl OrderSync {
    pub fn new(api: Arc<dyn OrderApi>, domain: StatusDomain, settings: SyncSettings) -> Self {
        let (state, _) = watch::channel(SyncSnapshot::initial(domain));
        Self {
            inner: Arc::new(Inner {
                api,
                state,
                settings,
                in_flight: AtomicBool::new(false),
                alive: AtomicBool::new(true),
                poll: ScheduledTask::new(),
                mutation_refresh: ScheduledTask::new(),
                visibility_refresh: ScheduledTask::new(),
            }),
        }
    }

    /// Kick off the initial load and the periodic poll
    pub fn start(&self) {
        let this = self.clone();
        tokio::spawn(async move {
            let _ = this.refresh_orders(true).await;
        });

        let weak = Arc::downgrade(&self.inner);
        self.inner.poll.every(self.inner.settings.poll_interval, move || {
            let weak = weak.clone();
            async move {
                let Some(sync) = upgrade(&weak) else { return };
                let snapshot = sync.snapshot();
                if snapshot.is_online && !snapshot.loading {
                    let _ = sync.refresh_orders(false).await;
                } else {
                    debug!("Skipping poll (online: {}, loading: {})", snapshot.is_online, snapshot.loading);
                }
            }
        });
        info!("Order sync started (poll every {:?})", self.inner.settings.poll_interval);
    }

    /// Stop all timers; requests already in flight finish but are not committed
    pub fn dispose(&self) {
        self.inner.alive.store(false, Ordering::Release);
        self.inner.poll.cancel();
        self.inner.mutation_refresh.cancel();
        self.inner.visibility_refresh.cancel();
        debug!("Order sync disposed");
    }

    pub fn is_disposed(&self) -> bool {
        !self.is_alive()
    }

    fn is_alive(&self) -> bool {
        self.inner.alive.load(Ordering::Acquire)
    }

    pub fn subscribe(&self) -> watch::Receiver<SyncSnapshot> {
        self.inner.state.subscribe()
    }

    pub fn snapshot(&self) -> SyncSnapshot {
        self.inner.state.borrow().clone()
    }

    /// Apply `edit` to the published state unless the session was disposed
    fn commit<F>(&self, edit: F) -> bool
    where
        F: FnOnce(&mut SyncSnapshot),
    {
        if !self.is_alive() {
            debug!("Dropping state change after dispose");
            return false;
        }
        self.inner.state.send_modify(edit);
        true
    }

    /// Replace the cache with the server's current list
    ///
    /// At most one refresh runs at a time; a call made while one is in flight
    /// returns `Ok(())` immediately without touching the network.
    pub async fn refresh_orders(&self, show_loading: bool) -> Result<(), SyncError> {
        if !self.is_alive() {
            return Ok(());
        }
        if self
            .inner
            .in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            debug!("Refresh already in flight");
            return Ok(());
        }
        let _in_flight = InFlight(&self.inner.in_flight);

        if show_loading {
            self.commit(|s| s.loading = true);
        }

        match self.inner.api.list_orders(None).await {
            Ok(orders) => {
                let count = orders.len();
                let orders = Arc::new(orders);
                self.commit(|s| {
                    s.orders = orders;
                    s.loading = false;
                    s.error = None;
                    s.is_online = true;
                    s.last_updated = Some(Utc::now());
                });
                debug!("Order cache refreshed ({} orders)", count);
                Ok(())
            }
            Err(err) => {
                warn!("Order refresh failed: {}", err);
                let message = err.to_string();
                let offline = err.is_unreachable();
                self.commit(|s| {
                    s.loading = false;
                    s.error = Some(message);
                    if offline {
                        s.is_online = false;
                    }
                });
                Err(err)
            }
        }
    }

    /// Create an order; it enters the cache only once the server has assigned its id
    pub async fn create_order(&self, draft: &OrderDraft) -> Result<Order, SyncError> {
        let created = self.inner.api.create_order(draft).await?;

        let entry = created.clone();
        self.commit(|s| s.orders = Arc::new(cache::prepend(&s.orders, entry)));
        info!("Order {} created for {}", created.id, created.customer_name);

        self.spawn_refresh();
        Ok(created)
    }

    /// Move an order to `status` in the cache first, then on the server
    pub async fn update_order_status(&self, id: i64, status: &str) -> Result<(), SyncError> {
        let mut mutation = self.begin_mutation(|orders| cache::set_status(orders, id, status));

        match self.inner.api.update_order_status(id, status).await {
            Ok(()) => {
                mutation.confirm();
                self.schedule_mutation_refresh();
                Ok(())
            }
            Err(err) => {
                self.roll_back(&mut mutation, &err);
                Err(err)
            }
        }
    }

    /// Remove an order from the cache first, then on the server
    pub async fn delete_order(&self, id: i64) -> Result<(), SyncError> {
        let mut mutation = self.begin_mutation(|orders| cache::remove(orders, id));

        match self.inner.api.delete_order(id).await {
            Ok(()) => {
                mutation.confirm();
                self.schedule_mutation_refresh();
                Ok(())
            }
            Err(err) => {
                self.roll_back(&mut mutation, &err);
                Err(err)
            }
        }
    }

    /// Capture and apply in one `send_modify`, so no other change can land in between
    fn begin_mutation<F>(&self, edit: F) -> OptimisticMutation
    where
        F: FnOnce(&[Order]) -> Vec<Order>,
    {
        let mut started = None;
        self.commit(|s| {
            let mut mutation = OptimisticMutation::capture(&s.orders);
            s.orders = mutation.apply(edit);
            started = Some(mutation);
        });
        // Disposed sessions skip the commit; there is nothing to roll back then
        started.unwrap_or_else(|| OptimisticMutation::capture(&self.inner.state.borrow().orders))
    }

    fn roll_back(&self, mutation: &mut OptimisticMutation, err: &SyncError) {
        let restored = mutation.roll_back();
        self.commit(|s| s.orders = restored);
        warn!("Rolled back optimistic change: {}", err);
    }

    pub fn handle_online(&self) {
        info!("Back online");
        self.commit(|s| s.is_online = true);
        self.spawn_refresh();
    }

    pub fn handle_offline(&self) {
        info!("Went offline");
        self.commit(|s| s.is_online = false);
    }

    /// Refresh shortly after the view becomes visible again
    pub fn handle_visibility_change(&self, visible: bool) {
        if !visible || !self.is_alive() {
            return;
        }
        let job = self.refresh_job();
        self.inner
            .visibility_refresh
            .schedule(self.inner.settings.visibility_debounce, job);
    }

    fn schedule_mutation_refresh(&self) {
        if !self.is_alive() {
            return;
        }
        let job = self.refresh_job();
        self.inner
            .mutation_refresh
            .schedule(self.inner.settings.mutation_debounce, job);
    }

    fn spawn_refresh(&self) {
        if self.is_alive() {
            tokio::spawn(self.refresh_job());
        }
    }

    /// Background refresh that does not keep the session alive
    fn refresh_job(&self) -> impl std::future::Future<Output = ()> + Send + 'static {
        let weak = Arc::downgrade(&self.inner);
        async move {
            if let Some(sync) = upgrade(&weak) {
                let _ = sync.refresh_orders(false).await;
            }
        }
    }
}

fn upgrade(weak: &Weak<Inner>) -> Option<OrderSync> {
    weak.upgrade().map(|inner| OrderSync { inner })
}
