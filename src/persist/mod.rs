//! Save persistence: storage backends, the snapshot format, write
//! scheduling, and reconciliation of a loaded save.
//!
//! Storage faults never reach the simulation. They are logged here and
//! degrade to the fallback store on write, or to "no save" on read.

pub mod reconcile;
pub mod scheduler;
pub mod snapshot;
pub mod store;
#[cfg(target_arch = "wasm32")]
pub mod web;

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use log::{error, info, warn};

use snapshot::SaveSnapshot;
use store::{SaveStore, StorageError};

/// Key of the flat fallback store.
pub const SAVE_KEY: &str = "idle-ring-save-v1";
/// Transactional store: database, object store and entry key.
pub const DB_NAME: &str = "idle-ring";
pub const STORE_NAME: &str = "saves";
pub const ENTRY_KEY: &str = "game";

/// Routes saves to the primary store, falling back to the flat store.
/// Clones share the stores and the fallback decision.
#[derive(Clone)]
pub struct Persistence {
    primary: Rc<dyn SaveStore>,
    fallback: Rc<dyn SaveStore>,
    /// Cleared for the rest of the session once the primary fails.
    use_primary: Rc<Cell<bool>>,
}

impl Persistence {
    pub fn new(primary: Rc<dyn SaveStore>, fallback: Rc<dyn SaveStore>) -> Self {
        let use_primary = primary.is_available();
        if use_primary {
            info!("saving to {}", primary.label());
        } else {
            warn!(
                "{} unavailable, saving to {}",
                primary.label(),
                fallback.label()
            );
        }
        Self {
            primary,
            fallback,
            use_primary: Rc::new(Cell::new(use_primary)),
        }
    }

    /// True while writes still go to the primary store.
    pub fn prefers_primary(&self) -> bool {
        self.use_primary.get()
    }

    /// Best-effort write. `force_flat` skips the primary, for teardown paths
    /// where only a synchronous store can be relied on.
    pub fn write(&self, payload: String, force_flat: bool) {
        if force_flat || !self.use_primary.get() {
            write_flat(&self.fallback, payload);
            return;
        }

        let fallback = Rc::clone(&self.fallback);
        let use_primary = Rc::clone(&self.use_primary);
        let label = self.primary.label();
        let retry = payload.clone();
        self.primary.put(
            payload,
            Box::new(move |result| {
                if let Err(e) = result {
                    error!("{label} write failed, switching to {}: {e}", fallback.label());
                    use_primary.set(false);
                    write_flat(&fallback, retry);
                }
            }),
        );
    }

    /// Read both stores and hand the newest readable snapshot to `done`.
    pub fn load(&self, done: Box<dyn FnOnce(Option<SaveSnapshot>)>) {
        let join = Rc::new(RefCell::new(ReadJoin {
            pending: 2,
            best: None,
            done: Some(done),
        }));
        for store in [&self.primary, &self.fallback] {
            if !store.is_available() {
                ReadJoin::offer(&join, None);
                continue;
            }
            let join = Rc::clone(&join);
            let label = store.label();
            store.get(Box::new(move |result| {
                ReadJoin::offer(&join, parse(label, result));
            }));
        }
    }
}

fn write_flat(store: &Rc<dyn SaveStore>, payload: String) {
    let label = store.label();
    store.put(
        payload,
        Box::new(move |result| {
            if let Err(e) = result {
                error!("{label} write failed: {e}");
            }
        }),
    );
}

fn parse(label: &str, result: Result<Option<String>, StorageError>) -> Option<SaveSnapshot> {
    match result {
        Ok(Some(json)) => match SaveSnapshot::from_json(&json) {
            Ok(snapshot) => Some(snapshot),
            Err(e) => {
                warn!("{label}: discarding save: {e}");
                None
            }
        },
        Ok(None) => None,
        Err(e) => {
            warn!("{label} read failed: {e}");
            None
        }
    }
}

/// Collects the results of concurrent reads.
struct ReadJoin {
    pending: u8,
    best: Option<SaveSnapshot>,
    done: Option<Box<dyn FnOnce(Option<SaveSnapshot>)>>,
}

impl ReadJoin {
    fn offer(join: &Rc<RefCell<ReadJoin>>, found: Option<SaveSnapshot>) {
        let finished = {
            let mut j = join.borrow_mut();
            j.pending = j.pending.saturating_sub(1);
            if let Some(found) = found {
                let newer = j
                    .best
                    .as_ref()
                    .map_or(true, |best| found.checkpoint_or_min() > best.checkpoint_or_min());
                if newer {
                    j.best = Some(found);
                }
            }
            if j.pending == 0 {
                j.done.take().map(|done| (done, j.best.take()))
            } else {
                None
            }
        };
        // Outside the borrow: `done` may start a new read.
        if let Some((done, best)) = finished {
            done(best);
        }
    }
}
