//! Sleeps between browser actions.
//!
//! Every wait in a run goes through a [`Pacer`], so an operator interrupt cuts
//! the current sleep short and tests can run the control flow without waiting.

use rand::Rng;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

const SLICE: Duration = Duration::from_millis(200);

pub trait Pacer {
    /// Block for `duration`, returning early if the run was interrupted.
    fn pause(&mut self, duration: Duration);

    fn interrupted(&self) -> bool {
        false
    }
}

/// Sleeps the current thread in short slices, watching a shared interrupt flag.
#[derive(Debug, Clone, Default)]
pub struct ThreadPacer {
    interrupt: Arc<AtomicBool>,
}

impl ThreadPacer {
    pub fn new(interrupt: Arc<AtomicBool>) -> Self {
        Self { interrupt }
    }
}

impl Pacer for ThreadPacer {
    fn pause(&mut self, duration: Duration) {
        let mut left = duration;
        while !left.is_zero() && !self.interrupted() {
            let step = left.min(SLICE);
            std::thread::sleep(step);
            left -= step;
        }
    }

    fn interrupted(&self) -> bool {
        self.interrupt.load(Ordering::Relaxed)
    }
}

/// Uniformly random duration in `[min_secs, max_secs]`, saturating at
/// [`Duration::MAX`].
pub fn random_delay(min_secs: f64, max_secs: f64) -> Duration {
    let secs = if max_secs <= min_secs {
        min_secs
    } else {
        rand::thread_rng().gen_range(min_secs..=max_secs)
    };
    Duration::try_from_secs_f64(secs.max(0.0)).unwrap_or(Duration::MAX)
}

/// Records requested pauses instead of sleeping.
#[cfg(test)]
#[derive(Debug, Default)]
pub(crate) struct RecordingPacer {
    pub pauses: Vec<Duration>,
}

#[cfg(test)]
impl RecordingPacer {
    pub fn total(&self) -> Duration {
        self.pauses.iter().sum()
    }
}

#[cfg(test)]
impl Pacer for RecordingPacer {
    fn pause(&mut self, duration: Duration) {
        self.pauses.push(duration);
    }
}
