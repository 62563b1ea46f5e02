#[cfg(target_arch = "wasm32")]
fn main() {
    console_error_panic_hook::set_once();
    match idle_ring::host::start() {
        // Page-lifetime callbacks own the session from here on.
        Ok(_session) => {}
        Err(e) => web_sys::console::error_1(&e),
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    use std::rc::Rc;

    use idle_ring::catalog::Catalog;
    use idle_ring::game::actions::{Action, BuyAmount};
    use idle_ring::persist::scheduler::{ManualHost, SchedulePolicy};
    use idle_ring::persist::store::MemoryStore;
    use idle_ring::persist::Persistence;
    use idle_ring::session::Session;

    let catalog = match Catalog::standard() {
        Ok(catalog) => Rc::new(catalog),
        Err(e) => {
            eprintln!("bad catalog: {e}");
            std::process::exit(1);
        }
    };
    let first = catalog.generators()[0].id.clone();
    let persistence = Persistence::new(
        Rc::new(MemoryStore::new("memory")),
        Rc::new(MemoryStore::new("flat")),
    );
    let mut session = Session::new(
        catalog,
        persistence,
        ManualHost::immediate(0.0),
        SchedulePolicy::default(),
    );
    session.restore(None);

    // One headless minute: a click per second, buying the first generator
    // whenever affordable.
    for _ in 0..60 {
        let steps = [
            Action::Click,
            Action::buy(&first, BuyAmount::Max),
            Action::Tick { dt: 1.0 },
        ];
        for action in steps {
            if let Err(e) = session.dispatch(action) {
                eprintln!("{e}");
                std::process::exit(1);
            }
        }
        session.host().advance(1_000.0);
    }
    let game = session.game();
    println!(
        "idle-ring (headless): balance {:.1}, rate {:.1}/s, {} x {first}",
        game.balance(),
        game.rate(),
        game.state().count(&first),
    );
    println!("build for wasm32-unknown-unknown to play in the browser");
}
