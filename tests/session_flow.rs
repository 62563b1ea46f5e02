//! End-to-end session flows over in-memory stores: play, save, reload and
//! catch up, the way a browser session would, with the clock under test
//! control.

use std::cell::RefCell;
use std::rc::Rc;

use idle_ring::catalog::Catalog;
use idle_ring::game::actions::{Action, BuyAmount};
use idle_ring::game::logic::Transition;
use idle_ring::persist::scheduler::{ManualHost, SchedulePolicy};
use idle_ring::persist::snapshot::SaveSnapshot;
use idle_ring::persist::store::MemoryStore;
use idle_ring::persist::Persistence;
use idle_ring::session::Session;

const NOW: f64 = 1_700_000_000_000.0;

struct Device {
    catalog: Rc<Catalog>,
    primary: Rc<MemoryStore>,
    flat: Rc<MemoryStore>,
}

impl Device {
    fn new() -> Self {
        Self {
            catalog: Rc::new(Catalog::standard().unwrap()),
            primary: Rc::new(MemoryStore::new("primary")),
            flat: Rc::new(MemoryStore::new("flat")),
        }
    }

    /// Open a session at `now_ms` and restore whatever the stores hold.
    fn open(&self, now_ms: f64) -> Session<ManualHost> {
        let persistence = Persistence::new(self.primary.clone(), self.flat.clone());
        let loaded = Rc::new(RefCell::new(None));
        let sink = Rc::clone(&loaded);
        persistence.load(Box::new(move |snapshot| *sink.borrow_mut() = snapshot));

        let mut session = Session::new(
            Rc::clone(&self.catalog),
            persistence,
            ManualHost::new(now_ms),
            SchedulePolicy::default(),
        );
        session.restore(loaded.take());
        session
    }
}

fn click(session: &mut Session<ManualHost>, times: usize) {
    for _ in 0..times {
        session.dispatch(Action::Click).unwrap();
    }
}

#[test]
fn fresh_start_then_first_purchase_is_saved() {
    let device = Device::new();
    let mut session = device.open(NOW);
    assert!(session.is_restored());
    assert_eq!(session.game().offline_gain(), 0.0);

    click(&mut session, 10);
    assert_eq!(device.primary.writes(), 0);

    let t = session
        .dispatch(Action::buy("spark", BuyAmount::One))
        .unwrap();
    assert_eq!(t, Transition::OwnershipChanged);
    assert_eq!(session.game().balance(), 0.0);
    assert_eq!(device.primary.writes(), 1);

    let saved = SaveSnapshot::from_json(&device.primary.payload().unwrap()).unwrap();
    assert_eq!(saved.generators.get("spark"), Some(&1.0));
    assert_eq!(saved.last_checkpoint, Some(NOW));
}

#[test]
fn reload_credits_time_away_once() {
    let device = Device::new();
    {
        let mut session = device.open(NOW);
        click(&mut session, 10);
        session
            .dispatch(Action::buy("spark", BuyAmount::One))
            .unwrap();
    }

    let mut session = device.open(NOW + 60_000.0);
    let expected = session.game().rate() * 60.0;
    assert!(expected > 0.0);
    assert!((session.game().offline_gain() - expected).abs() < 1e-9);
    assert!((session.game().balance() - expected).abs() < 1e-9);
    assert_eq!(session.game().state().count("spark"), 1);

    session.ack_offline_gain();
    assert_eq!(session.game().offline_gain(), 0.0);
    assert!((session.game().balance() - expected).abs() < 1e-9);
}

#[test]
fn teardown_save_outlives_older_primary_save() {
    let device = Device::new();
    {
        let mut session = device.open(NOW);
        click(&mut session, 10);
        session
            .dispatch(Action::buy("spark", BuyAmount::One))
            .unwrap();
        // Clicks right after a save are throttled; only the teardown
        // flush records them.
        click(&mut session, 7);
        assert_eq!(device.primary.writes(), 1);
        session.host().advance(2_000.0);
        session.suspend();
    }
    assert_eq!(device.primary.writes(), 1);
    assert_eq!(device.flat.writes(), 1);

    let session = device.open(NOW + 2_000.0);
    assert!((session.game().balance() - 7.0).abs() < 1e-9);
}

#[test]
fn failing_primary_falls_back_for_the_session() {
    let device = Device::new();
    device.primary.set_failing(true);
    let mut session = device.open(NOW);
    click(&mut session, 10);
    session
        .dispatch(Action::buy("spark", BuyAmount::One))
        .unwrap();
    assert!(!session.scheduler().persistence().prefers_primary());
    assert_eq!(device.flat.writes(), 1);

    device.primary.set_failing(false);
    click(&mut session, 12);
    session
        .dispatch(Action::buy("spark", BuyAmount::One))
        .unwrap();
    assert_eq!(device.primary.writes(), 0);
    assert_eq!(device.flat.writes(), 2);

    let reloaded = device.open(NOW);
    assert_eq!(reloaded.game().state().count("spark"), 2);
}

#[test]
fn auto_buyer_flag_survives_reload_with_timer_reset() {
    let device = Device::new();
    {
        let mut session = device.open(NOW);
        click(&mut session, 400);
        let t = session
            .dispatch(Action::BuyUpgrade {
                id: "spark_winder".into(),
            })
            .unwrap();
        assert_eq!(t, Transition::OwnershipChanged);
        assert!(!session.game().state().automation["spark"].enabled);

        session
            .dispatch(Action::ToggleAutoBuyer {
                id: "spark".into(),
                enabled: true,
            })
            .unwrap();

        // 25 s at a 10 s interval: two purchases (10 + 12), 5 s carried.
        session.dispatch(Action::Tick { dt: 25.0 }).unwrap();
        let game = session.game();
        assert_eq!(game.state().count("spark"), 2);
        assert!((game.balance() - 128.0).abs() < 1e-9);
        assert!((game.lifetime_total() - 400.0).abs() < 1e-9);
        assert!((game.state().automation["spark"].timer - 5.0).abs() < 1e-9);
        session.host().advance(1_000.0);
        session.suspend();
    }

    let session = device.open(NOW + 1_000.0);
    assert_eq!(session.game().state().count("spark"), 2);
    let entry = &session.game().state().automation["spark"];
    assert!(entry.enabled);
    assert_eq!(entry.timer, 0.0);
    assert_eq!(entry.interval, 10.0);
}

#[test]
fn unknown_ids_are_ignored_and_change_nothing() {
    let device = Device::new();
    let mut session = device.open(NOW);
    click(&mut session, 5);
    let before = session.game().state().clone();

    let t = session
        .dispatch(Action::buy("antimatter", BuyAmount::One))
        .unwrap();
    assert_eq!(t, Transition::Ignored);
    let t = session
        .dispatch(Action::ClaimMilestone { id: "nope".into() })
        .unwrap();
    assert_eq!(t, Transition::Ignored);
    assert_eq!(session.game().state(), &before);
    assert_eq!(device.primary.writes(), 0);

    let mut foreign = before.clone();
    foreign.generators.insert("antimatter".into(), 3);
    assert!(session.dispatch(Action::Load(Box::new(foreign))).is_err());
    assert_eq!(session.game().state(), &before);
}
