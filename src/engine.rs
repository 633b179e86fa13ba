//! Timer-driven draw engine.
//!
//! `start` picks the winning number up front and arms a repeating tick timer
//! plus a one-shot settle timer. Ticks show cosmetic values, settle commits the
//! number to the history. Observers get every state change as a `DrawEvent`.
//! Only one draw runs at a time.

use crate::config::DrawConfig;
use crate::draw::{self, AnimationTrace, Draw};
use crate::error::{DrawError, DrawResult};
use crate::history::HistoryStore;
use crate::rng::DrawRng;
use crate::scheduler::{Scheduler, TimerKind, VirtualScheduler};
use crate::storage::KeyValueStore;
use crate::types::{format_number, History, WinRecord};
use serde::Serialize;

/// Notifications for the presentation layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum DrawEvent {
    Started { max_number: u32, duration_ms: u32 },
    /// Cosmetic value; not the result.
    Tick { value: String },
    Settled { record: WinRecord },
    HistoryChanged { history: History },
    /// The draw could not be committed.
    Failed { error: String },
    Stopped,
}

pub type SubscriptionId = u32;

type Observer = Box<dyn FnMut(&DrawEvent)>;

struct ActiveDraw<H> {
    number: String,
    trace: AnimationTrace,
    tick: H,
    settle: H,
}

pub struct DrawEngine<S: KeyValueStore, T: Scheduler> {
    config: DrawConfig,
    history: HistoryStore<S>,
    scheduler: T,
    rng: DrawRng,
    active: Option<ActiveDraw<T::Handle>>,
    display: String,
    observers: Vec<(SubscriptionId, Observer)>,
    next_subscription: SubscriptionId,
}

impl<S: KeyValueStore, T: Scheduler> DrawEngine<S, T> {
    /// Create an engine, loading any history already in `store`.
    pub fn new(config: DrawConfig, store: S, scheduler: T) -> Self {
        Self::with_rng(config, store, scheduler, DrawRng::new())
    }

    pub fn with_rng(config: DrawConfig, store: S, scheduler: T, rng: DrawRng) -> Self {
        let history = HistoryStore::open(store);
        log::debug!(
            "Draw engine ready: max {} delay {}ms, {} past draws",
            config.max_number,
            config.winner_delay_ms,
            history.history().len()
        );
        Self {
            config,
            history,
            scheduler,
            rng,
            active: None,
            display: format_number(0),
            observers: Vec::new(),
            next_subscription: 0,
        }
    }

    /// Begin a draw.
    ///
    /// Fails with `Busy` while another draw runs, and with `RangeExhausted`
    /// when no unused number is left; in both cases nothing is scheduled.
    pub fn start(&mut self) -> DrawResult<()> {
        if self.active.is_some() {
            log::debug!("Draw requested while one is running");
            return Err(DrawError::Busy);
        }

        let Draw { number, trace } = draw::draw(
            self.history.history(),
            self.config.max_number,
            self.config.winner_delay_ms,
            self.config.tick_interval_ms,
            &mut self.rng,
        )?;

        let tick = self
            .scheduler
            .set_interval(TimerKind::Tick, self.config.tick_interval_ms)?;
        let settle = match self
            .scheduler
            .set_timeout(TimerKind::Settle, self.config.winner_delay_ms)
        {
            Ok(handle) => handle,
            Err(e) => {
                self.scheduler.cancel(tick);
                return Err(e);
            }
        };

        self.active = Some(ActiveDraw {
            number,
            trace,
            tick,
            settle,
        });
        log::debug!("Draw started, settling in {}ms", self.config.winner_delay_ms);
        self.emit(&DrawEvent::Started {
            max_number: self.config.max_number,
            duration_ms: self.config.winner_delay_ms,
        });
        Ok(())
    }

    /// Handle a fired timer. Timers that outlive their draw are ignored.
    pub fn fire(&mut self, kind: TimerKind) {
        match kind {
            TimerKind::Tick => self.on_tick(),
            TimerKind::Settle => self.on_settle(),
        }
    }

    fn on_tick(&mut self) {
        let Some(frame) = self.active.as_mut().and_then(|a| a.trace.next_tick()) else {
            return;
        };
        self.display = frame.value.clone();
        self.emit(&DrawEvent::Tick { value: frame.value });
    }

    fn on_settle(&mut self) {
        let Some(active) = self.active.take() else {
            return;
        };
        let ActiveDraw {
            number,
            tick,
            settle,
            ..
        } = active;
        self.scheduler.cancel(tick);
        self.scheduler.cancel(settle);

        let record = WinRecord::new(number, self.scheduler.now_ms());
        match self.history.record(record.clone()) {
            Ok(history) => {
                let history = history.clone();
                log::info!("Draw settled on {}", record.number);
                self.display = record.number.clone();
                self.emit(&DrawEvent::Settled { record });
                self.emit(&DrawEvent::HistoryChanged { history });
            }
            Err(e) => {
                log::warn!("Could not persist draw {}: {e}", record.number);
                self.emit(&DrawEvent::Failed {
                    error: DrawError::from(e).to_string(),
                });
            }
        }
        self.emit(&DrawEvent::Stopped);
    }

    /// Cancel the running draw's timers. Returns whether a draw was running.
    fn release(&mut self) -> bool {
        match self.active.take() {
            Some(active) => {
                self.scheduler.cancel(active.tick);
                self.scheduler.cancel(active.settle);
                true
            }
            None => false,
        }
    }

    /// Stop a running draw without committing it.
    pub fn teardown(&mut self) {
        if self.release() {
            log::debug!("Draw abandoned on teardown");
            self.emit(&DrawEvent::Stopped);
        }
    }

    /// Forget every past draw. A draw in progress is abandoned first.
    ///
    /// When the stored history cannot be removed nothing is forgotten, so
    /// later draws still avoid the recorded numbers.
    pub fn clear_history(&mut self) -> DrawResult<()> {
        if self.release() {
            log::debug!("Draw abandoned by history reset");
            self.emit(&DrawEvent::Stopped);
        }
        match self.history.clear() {
            Ok(history) => {
                let history = history.clone();
                self.emit(&DrawEvent::HistoryChanged { history });
                Ok(())
            }
            Err(e) => {
                log::warn!("Could not clear draw history: {e}");
                let err = DrawError::from(e);
                self.emit(&DrawEvent::Failed {
                    error: err.to_string(),
                });
                Err(err)
            }
        }
    }

    pub fn subscribe(&mut self, observer: impl FnMut(&DrawEvent) + 'static) -> SubscriptionId {
        let id = self.next_subscription;
        self.next_subscription = self.next_subscription.wrapping_add(1);
        self.observers.push((id, Box::new(observer)));
        id
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.observers.len();
        self.observers.retain(|(sid, _)| *sid != id);
        self.observers.len() != before
    }

    fn emit(&mut self, event: &DrawEvent) {
        for (_, observer) in &mut self.observers {
            observer(event);
        }
    }

    pub fn is_drawing(&self) -> bool {
        self.active.is_some()
    }

    /// The value currently on display: last tick, last winner, or "0000".
    pub fn display(&self) -> &str {
        &self.display
    }

    pub fn history(&self) -> &History {
        self.history.history()
    }

    pub fn config(&self) -> &DrawConfig {
        &self.config
    }

    pub fn store(&self) -> &S {
        self.history.store()
    }

    pub fn scheduler(&self) -> &T {
        &self.scheduler
    }
}

impl<S: KeyValueStore> DrawEngine<S, VirtualScheduler> {
    /// Move virtual time forward by `ms`, firing due timers in order.
    pub fn advance(&mut self, ms: u64) {
        let until = self.scheduler.now_ms() + ms;
        while let Some(kind) = self.scheduler.pop_due(until) {
            self.fire(kind);
        }
        self.scheduler.settle_clock(until);
    }
}

impl<S: KeyValueStore, T: Scheduler> Drop for DrawEngine<S, T> {
    fn drop(&mut self) {
        self.release();
    }
}
