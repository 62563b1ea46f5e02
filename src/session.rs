//! A running game wired to its save scheduler.
//!
//! Holdings changes are saved immediately, ticks and clicks on a throttle,
//! and lifecycle events (hidden page, teardown) force a flat-store write.
//! Nothing is saved until the stored game has been restored, so an early
//! autosave can never overwrite a save that is still loading.

use std::rc::Rc;

use log::{error, info, warn};

use crate::catalog::Catalog;
use crate::error::ContractViolation;
use crate::game::actions::Action;
use crate::game::logic::Transition;
use crate::game::Game;
use crate::persist::reconcile;
use crate::persist::scheduler::{DeferHost, SaveScheduler, SchedulePolicy};
use crate::persist::snapshot::SaveSnapshot;
use crate::persist::Persistence;

pub struct Session<H: DeferHost> {
    game: Game,
    scheduler: SaveScheduler<H>,
    restored: bool,
}

impl<H: DeferHost> Session<H> {
    pub fn new(
        catalog: Rc<Catalog>,
        persistence: Persistence,
        host: H,
        policy: SchedulePolicy,
    ) -> Self {
        let game = Game::new(catalog, host.now_ms());
        Self {
            game,
            scheduler: SaveScheduler::new(host, persistence, policy),
            restored: false,
        }
    }

    pub fn game(&self) -> &Game {
        &self.game
    }

    pub fn scheduler(&self) -> &SaveScheduler<H> {
        &self.scheduler
    }

    pub fn host(&self) -> &H {
        self.scheduler.host()
    }

    pub fn is_restored(&self) -> bool {
        self.restored
    }

    pub fn dispatch(&mut self, action: Action) -> Result<Transition, ContractViolation> {
        let immediate = action.wants_immediate_save();
        let transition = self.game.dispatch(action).inspect_err(|e| {
            error!("action rejected: {e}");
        })?;
        if !self.restored {
            return Ok(transition);
        }
        if immediate {
            if transition.changed() {
                self.scheduler.flush_now(self.game.state(), false);
            }
        } else {
            self.scheduler.schedule(self.game.state());
        }
        Ok(transition)
    }

    /// Adopt the stored game, crediting time away. Only the first call has
    /// any effect.
    pub fn restore(&mut self, snapshot: Option<SaveSnapshot>) {
        if self.restored {
            warn!("save already restored, ignoring late load");
            return;
        }
        let now = self.scheduler.host().now_ms();
        if snapshot.is_none() {
            info!("no save found, starting fresh");
        }
        let restored = reconcile::restore(self.game.catalog(), snapshot, now);
        self.game.restore(restored);
        self.restored = true;
    }

    /// Periodic background save request.
    pub fn autosave(&mut self) {
        if self.restored {
            self.scheduler.schedule(self.game.state());
        }
    }

    /// The page is being hidden or torn down.
    pub fn suspend(&mut self) {
        if self.restored {
            self.scheduler.flush_now(self.game.state(), true);
        }
    }

    /// Host callback for a deferred save.
    pub fn run_deferred(&mut self) {
        self.scheduler.run_deferred();
    }

    pub fn ack_offline_gain(&mut self) {
        self.game.ack_offline_gain();
    }
}
