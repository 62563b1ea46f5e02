//! Browser storage: IndexedDB as the primary store, localStorage as the flat
//! fallback. WASM only.

use std::cell::RefCell;
use std::rc::Rc;

use log::error;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{IdbDatabase, IdbFactory, IdbRequest, IdbTransactionMode, Storage};

use super::store::{Completion, SaveStore, StorageError};
use super::{DB_NAME, ENTRY_KEY, SAVE_KEY, STORE_NAME};

const LOCAL_LABEL: &str = "localStorage";
const IDB_LABEL: &str = "IndexedDB";

fn js_error(store: &'static str, e: JsValue) -> StorageError {
    StorageError::backend(store, format!("{e:?}"))
}

/// Synchronous key/value store. Survives page teardown, so forced saves go
/// here.
pub struct LocalStorageStore;

impl LocalStorageStore {
    fn storage() -> Option<Storage> {
        web_sys::window()?.local_storage().ok()?
    }
}

impl SaveStore for LocalStorageStore {
    fn label(&self) -> &'static str {
        LOCAL_LABEL
    }

    fn is_available(&self) -> bool {
        Self::storage().is_some()
    }

    fn put(&self, payload: String, done: Completion<()>) {
        let result = match Self::storage() {
            Some(storage) => storage
                .set_item(SAVE_KEY, &payload)
                .map_err(|e| js_error(LOCAL_LABEL, e)),
            None => Err(StorageError::Unavailable(LOCAL_LABEL)),
        };
        done(result);
    }

    fn get(&self, done: Completion<Option<String>>) {
        let result = match Self::storage() {
            Some(storage) => storage
                .get_item(SAVE_KEY)
                .map_err(|e| js_error(LOCAL_LABEL, e)),
            None => Err(StorageError::Unavailable(LOCAL_LABEL)),
        };
        done(result);
    }
}

/// Transactional store. The database handle is opened on first use and
/// kept for the session.
pub struct IndexedDbStore {
    db: Rc<RefCell<Option<IdbDatabase>>>,
}

impl IndexedDbStore {
    pub fn new() -> Self {
        Self {
            db: Rc::new(RefCell::new(None)),
        }
    }

    fn factory() -> Option<IdbFactory> {
        web_sys::window()?.indexed_db().ok()?
    }

    fn with_db(&self, then: impl FnOnce(Result<IdbDatabase, StorageError>) + 'static) {
        let cached = self.db.borrow().clone();
        if let Some(db) = cached {
            then(Ok(db));
            return;
        }
        let Some(factory) = Self::factory() else {
            then(Err(StorageError::Unavailable(IDB_LABEL)));
            return;
        };
        let request = match factory.open_with_u32(DB_NAME, 1) {
            Ok(request) => request,
            Err(e) => {
                then(Err(js_error(IDB_LABEL, e)));
                return;
            }
        };

        let upgrading = request.clone();
        let on_upgrade = Closure::once_into_js(move |_: web_sys::Event| {
            let Ok(db) = upgrading.result().and_then(|r| r.dyn_into::<IdbDatabase>()) else {
                return;
            };
            if !db.object_store_names().contains(STORE_NAME) {
                if let Err(e) = db.create_object_store(STORE_NAME) {
                    error!("{IDB_LABEL}: could not create store: {e:?}");
                }
            }
        });
        request.set_onupgradeneeded(Some(on_upgrade.unchecked_ref()));

        let cache = Rc::clone(&self.db);
        on_settled(&request, move |result| {
            let db = result.and_then(|value| {
                value
                    .dyn_into::<IdbDatabase>()
                    .map_err(|e| js_error(IDB_LABEL, e))
            });
            if let Ok(db) = &db {
                *cache.borrow_mut() = Some(db.clone());
            }
            then(db);
        });
    }
}

impl Default for IndexedDbStore {
    fn default() -> Self {
        Self::new()
    }
}

/// Route the success or error event of `request` to `done`, once.
fn on_settled(request: &IdbRequest, done: impl FnOnce(Result<JsValue, StorageError>) + 'static) {
    let settled = request.clone();
    let handler = Closure::once_into_js(move |event: web_sys::Event| {
        if event.type_() == "success" {
            done(settled.result().map_err(|e| js_error(IDB_LABEL, e)));
        } else {
            done(Err(StorageError::backend(IDB_LABEL, "request failed")));
        }
    });
    let handler: &js_sys::Function = handler.unchecked_ref();
    request.set_onsuccess(Some(handler));
    request.set_onerror(Some(handler));
}

fn object_store(
    db: &IdbDatabase,
    mode: IdbTransactionMode,
) -> Result<web_sys::IdbObjectStore, StorageError> {
    let tx = db
        .transaction_with_str_and_mode(STORE_NAME, mode)
        .map_err(|e| js_error(IDB_LABEL, e))?;
    tx.object_store(STORE_NAME)
        .map_err(|e| js_error(IDB_LABEL, e))
}

impl SaveStore for IndexedDbStore {
    fn label(&self) -> &'static str {
        IDB_LABEL
    }

    fn is_available(&self) -> bool {
        Self::factory().is_some()
    }

    fn put(&self, payload: String, done: Completion<()>) {
        self.with_db(move |db| {
            let request = db.and_then(|db| {
                object_store(&db, IdbTransactionMode::Readwrite)?
                    .put_with_key(&JsValue::from_str(&payload), &JsValue::from_str(ENTRY_KEY))
                    .map_err(|e| js_error(IDB_LABEL, e))
            });
            match request {
                Ok(request) => on_settled(&request, move |result| done(result.map(|_| ()))),
                Err(e) => done(Err(e)),
            }
        });
    }

    fn get(&self, done: Completion<Option<String>>) {
        self.with_db(move |db| {
            let request = db.and_then(|db| {
                object_store(&db, IdbTransactionMode::Readonly)?
                    .get(&JsValue::from_str(ENTRY_KEY))
                    .map_err(|e| js_error(IDB_LABEL, e))
            });
            match request {
                Ok(request) => on_settled(&request, move |result| {
                    done(result.map(|value| value.as_string()))
                }),
                Err(e) => done(Err(e)),
            }
        });
    }
}
