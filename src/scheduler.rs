//! Timer scheduling for the draw animation.
//!
//! The engine arms two timers per draw: a repeating tick and a one-shot
//! settle. A scheduler only tracks which `TimerKind` is due when; whoever
//! drives it hands fired kinds back to `DrawEngine::fire`.

use crate::error::DrawResult;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimerKind {
    Tick,
    Settle,
}

pub trait Scheduler {
    type Handle;

    /// Current time in milliseconds since the Unix epoch.
    fn now_ms(&self) -> u64;

    fn set_interval(&mut self, kind: TimerKind, period_ms: u32) -> DrawResult<Self::Handle>;

    fn set_timeout(&mut self, kind: TimerKind, delay_ms: u32) -> DrawResult<Self::Handle>;

    /// Cancelling an already-fired one-shot is a no-op.
    fn cancel(&mut self, handle: Self::Handle);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimerId(u64);

#[derive(Debug)]
struct VirtualTimer {
    kind: TimerKind,
    due: u64,
    period: Option<u64>,
}

/// Deterministic clock and timer queue for tests and headless runs.
///
/// Time only moves through `pop_due`.
#[derive(Debug, Default)]
pub struct VirtualScheduler {
    now: u64,
    next_id: u64,
    timers: BTreeMap<TimerId, VirtualTimer>,
}

impl VirtualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start the clock at `now_ms` instead of the epoch.
    pub fn starting_at(now_ms: u64) -> Self {
        Self {
            now: now_ms,
            ..Self::default()
        }
    }

    /// Number of armed timers.
    pub fn pending(&self) -> usize {
        self.timers.len()
    }

    /// Fire the earliest timer due at or before `until`, moving the clock to
    /// its due time. Ties go to the timer armed first. Returns `None` when
    /// nothing is due, leaving the clock where it was.
    pub fn pop_due(&mut self, until: u64) -> Option<TimerKind> {
        let (id, due) = self
            .timers
            .iter()
            .filter(|(_, t)| t.due <= until)
            .min_by_key(|(id, t)| (t.due, **id))
            .map(|(id, t)| (*id, t.due))?;

        self.now = self.now.max(due);
        let timer = self.timers.get_mut(&id)?;
        let kind = timer.kind;
        match timer.period {
            Some(period) => timer.due += period,
            None => {
                self.timers.remove(&id);
            }
        }
        Some(kind)
    }

    /// Move the clock forward to `until` without firing anything.
    pub fn settle_clock(&mut self, until: u64) {
        self.now = self.now.max(until);
    }

    fn arm(&mut self, kind: TimerKind, delay_ms: u32, period: Option<u64>) -> TimerId {
        let id = TimerId(self.next_id);
        self.next_id += 1;
        self.timers.insert(
            id,
            VirtualTimer {
                kind,
                due: self.now + u64::from(delay_ms),
                period,
            },
        );
        id
    }
}

impl Scheduler for VirtualScheduler {
    type Handle = TimerId;

    fn now_ms(&self) -> u64 {
        self.now
    }

    fn set_interval(&mut self, kind: TimerKind, period_ms: u32) -> DrawResult<TimerId> {
        // a zero period would never let the clock move
        let period = period_ms.max(1);
        Ok(self.arm(kind, period, Some(u64::from(period))))
    }

    fn set_timeout(&mut self, kind: TimerKind, delay_ms: u32) -> DrawResult<TimerId> {
        Ok(self.arm(kind, delay_ms, None))
    }

    fn cancel(&mut self, handle: TimerId) {
        self.timers.remove(&handle);
    }
}

#[cfg(target_arch = "wasm32")]
pub use browser::BrowserScheduler;

#[cfg(target_arch = "wasm32")]
mod browser {
    use super::{Scheduler, TimerKind};
    use crate::error::{DrawError, DrawResult};
    use std::collections::HashMap;
    use std::rc::Rc;
    use wasm_bindgen::prelude::*;
    use wasm_bindgen::JsCast;

    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct BrowserTimer {
        id: i32,
        repeating: bool,
    }

    /// `window.setInterval` / `setTimeout` timers.
    ///
    /// Each callback calls the dispatch function with its `TimerKind`.
    pub struct BrowserScheduler {
        dispatch: Rc<dyn Fn(TimerKind)>,
        callbacks: HashMap<i32, Closure<dyn FnMut()>>,
        // a callback may cancel its own timer while running, so it cannot be
        // dropped until a later call
        retired: Vec<Closure<dyn FnMut()>>,
    }

    impl BrowserScheduler {
        pub fn new(dispatch: impl Fn(TimerKind) + 'static) -> Self {
            Self {
                dispatch: Rc::new(dispatch),
                callbacks: HashMap::new(),
                retired: Vec::new(),
            }
        }

        fn window() -> DrawResult<web_sys::Window> {
            web_sys::window().ok_or_else(|| DrawError::Timer("no window".to_string()))
        }

        fn callback(&self, kind: TimerKind) -> Closure<dyn FnMut()> {
            let dispatch = Rc::clone(&self.dispatch);
            Closure::wrap(Box::new(move || dispatch(kind)) as Box<dyn FnMut()>)
        }

        fn clear(window: &web_sys::Window, timer: BrowserTimer) {
            if timer.repeating {
                window.clear_interval_with_handle(timer.id);
            } else {
                window.clear_timeout_with_handle(timer.id);
            }
        }
    }

    impl Scheduler for BrowserScheduler {
        type Handle = BrowserTimer;

        fn now_ms(&self) -> u64 {
            js_sys::Date::now() as u64
        }

        fn set_interval(&mut self, kind: TimerKind, period_ms: u32) -> DrawResult<BrowserTimer> {
            self.retired.clear();
            let window = Self::window()?;
            let cb = self.callback(kind);
            let id = window
                .set_interval_with_callback_and_timeout_and_arguments_0(
                    cb.as_ref().unchecked_ref(),
                    period_ms.min(i32::MAX as u32) as i32,
                )
                .map_err(|e| DrawError::Timer(format!("{e:?}")))?;
            self.callbacks.insert(id, cb);
            Ok(BrowserTimer { id, repeating: true })
        }

        fn set_timeout(&mut self, kind: TimerKind, delay_ms: u32) -> DrawResult<BrowserTimer> {
            self.retired.clear();
            let window = Self::window()?;
            let cb = self.callback(kind);
            let id = window
                .set_timeout_with_callback_and_timeout_and_arguments_0(
                    cb.as_ref().unchecked_ref(),
                    delay_ms.min(i32::MAX as u32) as i32,
                )
                .map_err(|e| DrawError::Timer(format!("{e:?}")))?;
            self.callbacks.insert(id, cb);
            Ok(BrowserTimer { id, repeating: false })
        }

        fn cancel(&mut self, timer: BrowserTimer) {
            if let Some(window) = web_sys::window() {
                Self::clear(&window, timer);
            }
            if let Some(cb) = self.callbacks.remove(&timer.id) {
                self.retired.push(cb);
            }
        }
    }

    impl Drop for BrowserScheduler {
        fn drop(&mut self) {
            if let Some(window) = web_sys::window() {
                for &id in self.callbacks.keys() {
                    // ids are shared between both timer kinds
                    window.clear_interval_with_handle(id);
                    window.clear_timeout_with_handle(id);
                }
            }
        }
    }
}
