//! WebAssembly number raffle for the browser.
//!
//! Draws numbers that have not come up before, animates the reveal on timers,
//! and keeps the history of winners in `localStorage`. The page subscribes to
//! engine events for rendering, sound and confetti.

pub mod config;
pub mod draw;
pub mod engine;
pub mod error;
pub mod history;
#[cfg(target_arch = "wasm32")]
pub mod logging;
pub mod rng;
pub mod scheduler;
pub mod storage;
pub mod types;

pub use config::DrawConfig;
pub use engine::{DrawEngine, DrawEvent, SubscriptionId};
pub use error::{DrawError, DrawResult, StorageError};
pub use history::{HistoryStore, HISTORY_KEY};
pub use scheduler::{Scheduler, TimerKind, VirtualScheduler};
pub use storage::{KeyValueStore, MemoryStore};
pub use types::{format_number, History, WinRecord};

// ─── WASM Exports (only compiled for wasm32 target) ─────────────────────────

#[cfg(target_arch = "wasm32")]
mod wasm_exports {
    use crate::config::DrawConfig;
    use crate::engine::DrawEngine;
    use crate::error::DrawError;
    use crate::scheduler::BrowserScheduler;
    use crate::storage::LocalStorage;
    use std::cell::{Ref, RefCell, RefMut};
    use std::rc::{Rc, Weak};
    use wasm_bindgen::prelude::*;

    type BrowserEngine = DrawEngine<LocalStorage, BrowserScheduler>;

    fn to_js(e: impl std::fmt::Display) -> JsValue {
        JsValue::from_str(&e.to_string())
    }

    /// Read `displayTitle`, `maxNumber` and `winnerDelay` from the page URL.
    fn config_from_location() -> DrawConfig {
        let search = web_sys::window()
            .and_then(|w| w.location().search().ok())
            .unwrap_or_default();
        let Ok(params) = web_sys::UrlSearchParams::new_with_str(&search) else {
            return DrawConfig::default();
        };
        DrawConfig::from_params(
            ["displayTitle", "maxNumber", "winnerDelay"]
                .into_iter()
                .filter_map(|key| params.get(key).map(|value| (key, value))),
        )
    }

    /// Raffle widget state owned by the page.
    ///
    /// Dropping it (`free()` in JS) clears any pending timers.
    #[wasm_bindgen]
    pub struct RaffleApp {
        engine: Rc<RefCell<BrowserEngine>>,
    }

    impl RaffleApp {
        fn build(config: DrawConfig) -> Self {
            let engine = Rc::new_cyclic(|weak: &Weak<RefCell<BrowserEngine>>| {
                let weak = weak.clone();
                let scheduler = BrowserScheduler::new(move |kind| {
                    let Some(engine) = weak.upgrade() else {
                        return;
                    };
                    match engine.try_borrow_mut() {
                        Ok(mut engine) => engine.fire(kind),
                        Err(_) => log::warn!("Dropped {kind:?} timer: engine busy"),
                    };
                });
                RefCell::new(DrawEngine::new(config, LocalStorage::new(), scheduler))
            });
            Self { engine }
        }

        // subscribers run inside engine calls, so a callback re-entering the
        // app must get an error instead of a borrow panic
        fn engine(&self) -> Result<Ref<'_, BrowserEngine>, JsValue> {
            self.engine.try_borrow().map_err(|_| to_js("raffle is busy dispatching events"))
        }

        fn engine_mut(&self) -> Result<RefMut<'_, BrowserEngine>, JsValue> {
            self.engine
                .try_borrow_mut()
                .map_err(|_| to_js("raffle is busy dispatching events"))
        }
    }

    #[wasm_bindgen]
    impl RaffleApp {
        /// Create the raffle with configuration from the page's query string.
        #[wasm_bindgen(constructor)]
        pub fn new() -> RaffleApp {
            Self::build(config_from_location())
        }

        /// Create the raffle from a `{ title, maxNumber, winnerDelayMs, tickIntervalMs }`
        /// object; missing fields take their defaults.
        #[wasm_bindgen(js_name = "withConfig")]
        pub fn with_config(options: JsValue) -> Result<RaffleApp, JsValue> {
            let config = if options.is_undefined() || options.is_null() {
                DrawConfig::default()
            } else {
                serde_wasm_bindgen::from_value(options).map_err(to_js)?
            };
            Ok(Self::build(config))
        }

        /// Start a draw. Returns `false` if one is already running.
        pub fn start(&self) -> Result<bool, JsValue> {
            match self.engine_mut()?.start() {
                Ok(()) => Ok(true),
                Err(DrawError::Busy) => Ok(false),
                Err(e) => Err(to_js(e)),
            }
        }

        #[wasm_bindgen(js_name = "clearHistory")]
        pub fn clear_history(&self) -> Result<(), JsValue> {
            self.engine_mut()?.clear_history().map_err(to_js)
        }

        /// Past draws, newest first, as `[{ number, timestamp }]`.
        pub fn history(&self) -> Result<JsValue, JsValue> {
            serde_wasm_bindgen::to_value(self.engine()?.history()).map_err(to_js)
        }

        pub fn config(&self) -> Result<JsValue, JsValue> {
            serde_wasm_bindgen::to_value(self.engine()?.config()).map_err(to_js)
        }

        #[wasm_bindgen(js_name = "isDrawing")]
        pub fn is_drawing(&self) -> Result<bool, JsValue> {
            Ok(self.engine()?.is_drawing())
        }

        pub fn display(&self) -> Result<String, JsValue> {
            Ok(self.engine()?.display().to_string())
        }

        /// Register `callback(event)` for every draw event. Returns an id for `unsubscribe`.
        pub fn subscribe(&self, callback: js_sys::Function) -> Result<u32, JsValue> {
            Ok(self.engine_mut()?.subscribe(move |event| {
                let value = match serde_wasm_bindgen::to_value(event) {
                    Ok(value) => value,
                    Err(e) => {
                        log::warn!("Could not convert draw event: {e}");
                        return;
                    }
                };
                if let Err(e) = callback.call1(&JsValue::NULL, &value) {
                    log::warn!("Draw event subscriber threw: {e:?}");
                }
            }))
        }

        pub fn unsubscribe(&self, id: u32) -> Result<bool, JsValue> {
            Ok(self.engine_mut()?.unsubscribe(id))
        }

        /// Abandon any running draw and release its timers.
        pub fn destroy(&self) -> Result<(), JsValue> {
            self.engine_mut()?.teardown();
            Ok(())
        }
    }

    impl Default for RaffleApp {
        fn default() -> Self {
            Self::new()
        }
    }

    /// Route `log` output to the browser console. `level` is one of
    /// error, warn, info, debug, trace (default info).
    #[wasm_bindgen(js_name = "initLogging")]
    pub fn wasm_init_logging(level: Option<String>) {
        let level = level
            .and_then(|l| l.parse::<log::LevelFilter>().ok())
            .unwrap_or(log::LevelFilter::Info);
        crate::logging::init(level);
    }

    /// Ping function to verify WASM is loaded.
    #[wasm_bindgen(js_name = "ping")]
    pub fn wasm_ping() -> String {
        "WASM raffle ready".to_string()
    }
}
