//! Number generation and the reveal animation.
//!
//! `generate_unique` picks a value that is not already in the history, and
//! `draw` pairs it with the lazily generated animation frames shown before it
//! settles.

use crate::error::{DrawError, DrawResult};
use crate::rng::DrawRng;
use crate::types::{format_number, parse_number, History};
use serde::Serialize;
use std::collections::HashSet;

/// Random candidates tried before falling back to picking among the free values.
pub const MAX_RANDOM_ATTEMPTS: u32 = 1_000;

/// Any uniform value in [0, max_number), formatted. No uniqueness check.
pub fn random_number(max_number: u32, rng: &mut DrawRng) -> String {
    format_number(rng.gen_range(max_number))
}

/// Pick a uniformly random number in [0, max_number) that is absent from `history`.
///
/// Fails with `RangeExhausted` when every value in range has been drawn. Random
/// sampling stops after `MAX_RANDOM_ATTEMPTS` misses; the answer is then chosen
/// uniformly among the values still free, so a dense history cannot stall it.
pub fn generate_unique(history: &History, max_number: u32, rng: &mut DrawRng) -> DrawResult<String> {
    if max_number == 0 {
        return Err(DrawError::InvalidRange);
    }

    let taken = history.numbers();
    let used = taken
        .iter()
        .filter(|n| parse_number(n).is_some_and(|v| v < max_number))
        .count();
    if used as u64 >= u64::from(max_number) {
        return Err(DrawError::RangeExhausted {
            max_number,
            recorded: used,
        });
    }

    for _ in 0..MAX_RANDOM_ATTEMPTS {
        let candidate = random_number(max_number, rng);
        if !taken.contains(candidate.as_str()) {
            return Ok(candidate);
        }
    }

    log::debug!(
        "No free number after {MAX_RANDOM_ATTEMPTS} attempts ({used}/{max_number} used), scanning"
    );
    pick_free(&taken, max_number, max_number - used as u32, rng)
}

/// Choose the k-th free value for a uniform k.
fn pick_free(taken: &HashSet<&str>, max_number: u32, free: u32, rng: &mut DrawRng) -> DrawResult<String> {
    let k = rng.gen_range(free) as usize;
    (0..max_number)
        .map(format_number)
        .filter(|n| !taken.contains(n.as_str()))
        .nth(k)
        .ok_or(DrawError::RangeExhausted {
            max_number,
            recorded: (max_number - free) as usize,
        })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum FrameKind {
    /// Cosmetic value shown while the draw is running.
    Tick,
    /// The committed number; always the last frame.
    Settle,
}

/// One value shown during a draw, `at_ms` after it started.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Frame {
    pub at_ms: u32,
    pub value: String,
    pub kind: FrameKind,
}

/// Finite, time-ordered frames of one draw.
///
/// Ticks come every `interval_ms` strictly before `duration_ms`; the settle
/// frame comes at `duration_ms`. Values are produced on demand.
pub struct AnimationTrace {
    rng: DrawRng,
    max_number: u32,
    interval_ms: u32,
    duration_ms: u32,
    next_at: u64,
    settle: Option<String>,
}

impl AnimationTrace {
    fn new(final_number: String, max_number: u32, duration_ms: u32, interval_ms: u32, rng: DrawRng) -> Self {
        let interval_ms = interval_ms.max(1);
        Self {
            rng,
            max_number,
            interval_ms,
            duration_ms,
            next_at: u64::from(interval_ms),
            settle: Some(final_number),
        }
    }

    /// Next cosmetic value, or `None` once only the settle frame is left.
    pub fn next_tick(&mut self) -> Option<Frame> {
        if self.settle.is_none() || self.next_at >= u64::from(self.duration_ms) {
            return None;
        }
        let at_ms = self.next_at as u32;
        self.next_at += u64::from(self.interval_ms);
        Some(Frame {
            at_ms,
            value: random_number(self.max_number, &mut self.rng),
            kind: FrameKind::Tick,
        })
    }

    /// Skip any remaining ticks and take the settle frame.
    pub fn settle(&mut self) -> Option<Frame> {
        self.settle.take().map(|value| Frame {
            at_ms: self.duration_ms,
            value,
            kind: FrameKind::Settle,
        })
    }
}

impl Iterator for AnimationTrace {
    type Item = Frame;

    fn next(&mut self) -> Option<Frame> {
        self.next_tick().or_else(|| self.settle())
    }
}

/// Result of a draw: the committed number and its reveal animation.
pub struct Draw {
    pub number: String,
    pub trace: AnimationTrace,
}

/// Pick a fresh number against `history` and build the animation leading to it.
pub fn draw(
    history: &History,
    max_number: u32,
    duration_ms: u32,
    interval_ms: u32,
    rng: &mut DrawRng,
) -> DrawResult<Draw> {
    let number = generate_unique(history, max_number, rng)?;
    let trace = AnimationTrace::new(number.clone(), max_number, duration_ms, interval_ms, rng.fork());
    Ok(Draw { number, trace })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::WinRecord;

    fn history_of(numbers: &[&str]) -> History {
        History::from(
            numbers
                .iter()
                .enumerate()
                .map(|(i, n)| WinRecord::new(*n, i as u64))
                .collect::<Vec<_>>(),
        )
    }

    #[test]
    fn test_unique_avoids_history() {
        let mut rng = DrawRng::from_seed(1);
        let history = history_of(&["0000", "0001", "0002"]);
        for _ in 0..50 {
            let n = generate_unique(&history, 4, &mut rng).unwrap();
            assert_eq!(n, "0003");
        }
    }

    #[test]
    fn test_exhausted_range_fails() {
        let mut rng = DrawRng::from_seed(1);
        let history = history_of(&["0000"]);
        let err = generate_unique(&history, 1, &mut rng).unwrap_err();
        assert_eq!(
            err,
            DrawError::RangeExhausted {
                max_number: 1,
                recorded: 1
            }
        );
    }

    #[test]
    fn test_out_of_range_history_does_not_count() {
        let mut rng = DrawRng::from_seed(9);
        let history = history_of(&["0042"]);
        let n = generate_unique(&history, 2, &mut rng).unwrap();
        assert!(n == "0000" || n == "0001");
    }

    #[test]
    fn test_zero_range_rejected() {
        let mut rng = DrawRng::from_seed(1);
        assert_eq!(
            generate_unique(&History::new(), 0, &mut rng).unwrap_err(),
            DrawError::InvalidRange
        );
    }

    #[test]
    fn test_dense_history_falls_back_to_scan() {
        // one free slot out of 5000: random sampling will almost surely miss it
        let numbers: Vec<String> = (0..5000).filter(|&v| v != 1234).map(format_number).collect();
        let refs: Vec<&str> = numbers.iter().map(String::as_str).collect();
        let history = history_of(&refs);
        let mut rng = DrawRng::from_seed(3);
        assert_eq!(generate_unique(&history, 5000, &mut rng).unwrap(), "1234");
    }

    #[test]
    fn test_trace_timing() {
        let mut rng = DrawRng::from_seed(5);
        let d = draw(&History::new(), 5000, 3000, 50, &mut rng).unwrap();
        let number = d.number.clone();
        let frames: Vec<Frame> = d.trace.collect();

        // ticks at 50..=2950, then the settle frame
        assert_eq!(frames.len(), 60);
        assert!(frames[..59].iter().all(|f| f.kind == FrameKind::Tick));
        assert_eq!(frames[0].at_ms, 50);
        assert_eq!(frames[58].at_ms, 2950);
        let last = frames.last().unwrap();
        assert_eq!(last.kind, FrameKind::Settle);
        assert_eq!(last.at_ms, 3000);
        assert_eq!(last.value, number);
        assert!(frames.windows(2).all(|w| w[0].at_ms < w[1].at_ms));
    }

    #[test]
    fn test_zero_duration_settles_immediately() {
        let mut rng = DrawRng::from_seed(5);
        let d = draw(&History::new(), 10, 0, 50, &mut rng).unwrap();
        let frames: Vec<Frame> = d.trace.collect();
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].kind, FrameKind::Settle);
        assert_eq!(frames[0].at_ms, 0);
    }

    #[test]
    fn test_settle_skips_remaining_ticks() {
        let mut rng = DrawRng::from_seed(8);
        let mut d = draw(&History::new(), 100, 1000, 100, &mut rng).unwrap();
        assert!(d.trace.next_tick().is_some());
        let settled = d.trace.settle().unwrap();
        assert_eq!(settled.value, d.number);
        assert!(d.trace.next_tick().is_none());
        assert!(d.trace.next().is_none());
    }
}
