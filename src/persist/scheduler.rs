//! Write scheduling: throttled idle-time saves plus forced flushes.
//!
//! The scheduler owns at most one pending deferred write. A forced flush
//! always cancels it first, so a stale deferred write can never land after
//! a newer forced one.

use std::cell::{Cell, RefCell};

use log::{debug, error};

use crate::game::state::PlayerState;

use super::snapshot::SaveSnapshot;
use super::Persistence;

/// Tunable save timing, in milliseconds.
#[derive(Clone, Debug, PartialEq)]
pub struct SchedulePolicy {
    /// Throttled saves happen at most once per this interval.
    pub min_interval_ms: f64,
    /// Longest a deferred save waits for the host to go idle.
    pub idle_timeout_ms: u32,
    /// Delay used when the host has no idle callback.
    pub fallback_delay_ms: i32,
    /// Period of the host's background autosave timer.
    pub autosave_period_ms: i32,
}

impl Default for SchedulePolicy {
    fn default() -> Self {
        Self {
            min_interval_ms: 12_000.0,
            idle_timeout_ms: 500,
            fallback_delay_ms: 120,
            autosave_period_ms: 3_000,
        }
    }
}

/// Host-issued handle for a deferred save.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DeferHandle {
    Idle(u32),
    Timeout(i32),
}

/// What the scheduler needs from its host: a wall clock and a way to be
/// called back later.
pub trait DeferHost {
    /// Epoch milliseconds.
    fn now_ms(&self) -> f64;

    /// Arrange for [`SaveScheduler::run_deferred`] to be called soon, at an
    /// idle moment if possible. `None` means the host cannot defer and the
    /// save should happen right away.
    fn defer(&self, policy: &SchedulePolicy) -> Option<DeferHandle>;

    fn cancel(&self, handle: DeferHandle);
}

pub struct SaveScheduler<H: DeferHost> {
    host: H,
    persistence: Persistence,
    policy: SchedulePolicy,
    pending: Option<DeferHandle>,
    /// Snapshot taken at the last request; the last one taken wins.
    latest: Option<SaveSnapshot>,
    /// Last written payload, without its checkpoint.
    last_payload: Option<String>,
    last_save_ms: Option<f64>,
    writes: u32,
}

impl<H: DeferHost> SaveScheduler<H> {
    pub fn new(host: H, persistence: Persistence, policy: SchedulePolicy) -> Self {
        Self {
            host,
            persistence,
            policy,
            pending: None,
            latest: None,
            last_payload: None,
            last_save_ms: None,
            writes: 0,
        }
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn persistence(&self) -> &Persistence {
        &self.persistence
    }

    pub fn policy(&self) -> &SchedulePolicy {
        &self.policy
    }

    pub fn has_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Payloads handed to storage so far.
    pub fn writes(&self) -> u32 {
        self.writes
    }

    /// Request a throttled save of `state`.
    pub fn schedule(&mut self, state: &PlayerState) {
        self.latest = Some(SaveSnapshot::capture(state));
        if self.pending.is_some() {
            return;
        }
        let now = self.host.now_ms();
        if self
            .last_save_ms
            .is_some_and(|last| now - last < self.policy.min_interval_ms)
        {
            return;
        }
        match self.host.defer(&self.policy) {
            Some(handle) => self.pending = Some(handle),
            None => self.write_latest(false),
        }
    }

    /// Save `state` right now, cancelling any pending deferred save.
    /// `force_flat` writes even an unchanged payload, to the flat store.
    pub fn flush_now(&mut self, state: &PlayerState, force_flat: bool) {
        if let Some(handle) = self.pending.take() {
            self.host.cancel(handle);
        }
        self.latest = Some(SaveSnapshot::capture(state));
        self.write_latest(force_flat);
    }

    /// Host callback for a deferred save.
    pub fn run_deferred(&mut self) {
        // Cancelled or superseded.
        if self.pending.take().is_none() {
            return;
        }
        self.write_latest(false);
    }

    fn write_latest(&mut self, force_flat: bool) {
        let Some(snapshot) = self.latest.take() else {
            return;
        };
        let now = self.host.now_ms();
        self.last_save_ms = Some(now);

        let body = match snapshot.to_json() {
            Ok(body) => body,
            Err(e) => {
                error!("could not serialize save: {e}");
                return;
            }
        };
        if !force_flat && self.last_payload.as_deref() == Some(body.as_str()) {
            debug!("save unchanged, skipped");
            return;
        }
        let payload = match snapshot.stamped(now).to_json() {
            Ok(payload) => payload,
            Err(e) => {
                error!("could not serialize save: {e}");
                return;
            }
        };
        self.last_payload = Some(body);
        self.persistence.write(payload, force_flat);
        self.writes += 1;
    }
}

/// A host driven by hand: the clock moves only when told to, and deferred
/// saves run only when the owner calls `run_deferred`. Used by native builds
/// and tests.
pub struct ManualHost {
    now: Cell<f64>,
    can_defer: bool,
    next_id: Cell<u32>,
    deferred: RefCell<Vec<DeferHandle>>,
    cancelled: RefCell<Vec<DeferHandle>>,
}

impl ManualHost {
    pub fn new(now_ms: f64) -> Self {
        Self {
            now: Cell::new(now_ms),
            can_defer: true,
            next_id: Cell::new(1),
            deferred: RefCell::new(Vec::new()),
            cancelled: RefCell::new(Vec::new()),
        }
    }

    /// A host without deferral: every throttled save happens inline.
    pub fn immediate(now_ms: f64) -> Self {
        Self {
            can_defer: false,
            ..Self::new(now_ms)
        }
    }

    pub fn advance(&self, ms: f64) {
        self.now.set(self.now.get() + ms);
    }

    /// Handles issued so far.
    pub fn deferred(&self) -> Vec<DeferHandle> {
        self.deferred.borrow().clone()
    }

    pub fn cancelled(&self) -> Vec<DeferHandle> {
        self.cancelled.borrow().clone()
    }
}

impl DeferHost for ManualHost {
    fn now_ms(&self) -> f64 {
        self.now.get()
    }

    fn defer(&self, _policy: &SchedulePolicy) -> Option<DeferHandle> {
        if !self.can_defer {
            return None;
        }
        let handle = DeferHandle::Idle(self.next_id.get());
        self.next_id.set(self.next_id.get() + 1);
        self.deferred.borrow_mut().push(handle);
        Some(handle)
    }

    fn cancel(&self, handle: DeferHandle) {
        self.cancelled.borrow_mut().push(handle);
    }
}
