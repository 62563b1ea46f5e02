//! Browser host: drives a [`Session`] from animation frames, idle callbacks,
//! a background autosave timer and page lifecycle events. WASM only.

use std::cell::RefCell;
use std::rc::Rc;

use log::{error, info, LevelFilter};
use wasm_bindgen::closure::Closure;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{IdleRequestOptions, VisibilityState, Window};

use crate::catalog::Catalog;
use crate::game::actions::Action;
use crate::logging;
use crate::persist::scheduler::{DeferHandle, DeferHost, SchedulePolicy};
use crate::persist::web::{IndexedDbStore, LocalStorageStore};
use crate::persist::Persistence;
use crate::session::Session;
use crate::time::FrameClock;

pub type SharedSession = Rc<RefCell<Session<BrowserHost>>>;

/// Set once the session exists; deferred saves call through it.
type Wake = Rc<RefCell<Option<Box<dyn Fn()>>>>;

type FrameCell = Rc<RefCell<Option<Closure<dyn FnMut()>>>>;

pub struct BrowserHost {
    window: Window,
    has_idle_callback: bool,
    /// Reused for every deferred save.
    on_deferred: Closure<dyn FnMut()>,
}

impl BrowserHost {
    fn new(window: Window, wake: Wake) -> Self {
        let has_idle_callback =
            js_sys::Reflect::has(&window, &JsValue::from_str("requestIdleCallback"))
                .unwrap_or(false);
        let on_deferred = Closure::wrap(Box::new(move || {
            if let Some(wake) = wake.borrow().as_ref() {
                wake();
            }
        }) as Box<dyn FnMut()>);
        Self {
            window,
            has_idle_callback,
            on_deferred,
        }
    }
}

impl DeferHost for BrowserHost {
    fn now_ms(&self) -> f64 {
        js_sys::Date::now()
    }

    fn defer(&self, policy: &SchedulePolicy) -> Option<DeferHandle> {
        let callback: &js_sys::Function = self.on_deferred.as_ref().unchecked_ref();
        if self.has_idle_callback {
            let options = IdleRequestOptions::new();
            options.set_timeout(policy.idle_timeout_ms);
            match self
                .window
                .request_idle_callback_with_options(callback, &options)
            {
                Ok(id) => return Some(DeferHandle::Idle(id)),
                Err(e) => error!("requestIdleCallback failed: {e:?}"),
            }
        }
        self.window
            .set_timeout_with_callback_and_timeout_and_arguments_0(
                callback,
                policy.fallback_delay_ms,
            )
            .map(DeferHandle::Timeout)
            .map_err(|e| error!("setTimeout failed: {e:?}"))
            .ok()
    }

    fn cancel(&self, handle: DeferHandle) {
        match handle {
            DeferHandle::Idle(id) => self.window.cancel_idle_callback(id),
            DeferHandle::Timeout(id) => self.window.clear_timeout_with_handle(id),
        }
    }
}

fn js_error(e: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&e.to_string())
}

/// Boot the game: load the save, then start ticking and autosaving.
pub fn start() -> Result<SharedSession, JsValue> {
    logging::init(LevelFilter::Info);
    let window = web_sys::window().ok_or_else(|| js_error("no window"))?;
    let catalog = Rc::new(Catalog::standard().map_err(js_error)?);

    let wake: Wake = Rc::new(RefCell::new(None));
    let host = BrowserHost::new(window.clone(), Rc::clone(&wake));
    let persistence = Persistence::new(
        Rc::new(IndexedDbStore::new()),
        Rc::new(LocalStorageStore),
    );
    let policy = SchedulePolicy::default();
    let autosave_ms = policy.autosave_period_ms;
    let session: SharedSession = Rc::new(RefCell::new(Session::new(
        catalog,
        persistence.clone(),
        host,
        policy,
    )));

    let weak = Rc::downgrade(&session);
    *wake.borrow_mut() = Some(Box::new(move || {
        if let Some(session) = weak.upgrade() {
            session.borrow_mut().run_deferred();
        }
    }));

    // The flat store answers synchronously, so no session borrow may be
    // held while loading.
    let weak = Rc::downgrade(&session);
    persistence.load(Box::new(move |snapshot| {
        if let Some(session) = weak.upgrade() {
            let mut session = session.borrow_mut();
            session.restore(snapshot);
            let gain = session.game().offline_gain();
            if gain > 0.0 {
                info!("offline gain: {gain:.1}");
            }
        }
    }));

    let clock = Rc::new(RefCell::new(FrameClock::new()));
    start_frames(&window, &session, &clock);
    start_autosave(&window, &session, autosave_ms)?;
    watch_lifecycle(&window, &session, &clock)?;
    Ok(session)
}

fn request_frame(window: &Window, frame: &FrameCell) {
    if let Some(callback) = frame.borrow().as_ref() {
        if let Err(e) = window.request_animation_frame(callback.as_ref().unchecked_ref()) {
            error!("requestAnimationFrame failed: {e:?}");
        }
    }
}

fn start_frames(window: &Window, session: &SharedSession, clock: &Rc<RefCell<FrameClock>>) {
    let frame: FrameCell = Rc::new(RefCell::new(None));
    let next = Rc::clone(&frame);
    let window_loop = window.clone();
    let performance = window.performance();
    let session = Rc::clone(session);
    let clock = Rc::clone(clock);
    *frame.borrow_mut() = Some(Closure::wrap(Box::new(move || {
        let now = performance
            .as_ref()
            .map_or_else(js_sys::Date::now, |p| p.now());
        let dt = clock.borrow_mut().update(now);
        {
            let mut session = session.borrow_mut();
            // Ticks before the save lands would be thrown away by the load.
            if session.is_restored() && dt > 0.0 {
                // Rejections are logged by the session.
                session.dispatch(Action::Tick { dt }).ok();
            }
        }
        request_frame(&window_loop, &next);
    }) as Box<dyn FnMut()>));
    request_frame(window, &frame);
}

fn start_autosave(window: &Window, session: &SharedSession, period_ms: i32) -> Result<(), JsValue> {
    let session = Rc::clone(session);
    let tick = Closure::wrap(Box::new(move || {
        session.borrow_mut().autosave();
    }) as Box<dyn FnMut()>);
    window.set_interval_with_callback_and_timeout_and_arguments_0(
        tick.as_ref().unchecked_ref(),
        period_ms,
    )?;
    // Lives as long as the page.
    tick.forget();
    Ok(())
}

fn watch_lifecycle(
    window: &Window,
    session: &SharedSession,
    clock: &Rc<RefCell<FrameClock>>,
) -> Result<(), JsValue> {
    let document = window.document().ok_or_else(|| js_error("no document"))?;

    let on_visibility = {
        let session = Rc::clone(session);
        let clock = Rc::clone(clock);
        let document = document.clone();
        Closure::wrap(Box::new(move |_: web_sys::Event| {
            if document.visibility_state() == VisibilityState::Hidden {
                clock.borrow_mut().reset();
                session.borrow_mut().suspend();
            }
        }) as Box<dyn FnMut(_)>)
    };
    document.add_event_listener_with_callback(
        "visibilitychange",
        on_visibility.as_ref().unchecked_ref(),
    )?;
    on_visibility.forget();

    let on_teardown = {
        let session = Rc::clone(session);
        Closure::wrap(Box::new(move |_: web_sys::Event| {
            session.borrow_mut().suspend();
        }) as Box<dyn FnMut(_)>)
    };
    for event in ["pagehide", "beforeunload"] {
        window.add_event_listener_with_callback(event, on_teardown.as_ref().unchecked_ref())?;
    }
    on_teardown.forget();
    Ok(())
}
