use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use anyhow::Result;

use crate::audio::graph::MediaClock;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FrameTick {
    pub index: u64,
    /// Media time in seconds.
    pub time: f64,
}

/// Source of frame callbacks. Returns `None` once the host has no more frames.
pub trait Scheduler {
    fn next_frame(&mut self) -> Option<FrameTick>;
}

/// Shared stop flag, checked by [`run`] before every frame.
#[derive(Clone, Debug, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Deterministic clock for offline rendering: `frames` ticks at `fps`, each one
/// moving the media clock to `index / fps` before the step runs.
pub struct FixedRateScheduler {
    fps: u32,
    clock: MediaClock,
    next: u64,
    frames: u64,
}

impl FixedRateScheduler {
    pub fn new(fps: u32, frames: u64, clock: MediaClock) -> Self {
        Self {
            fps,
            clock,
            next: 0,
            frames,
        }
    }

    /// Enough frames to cover `seconds` of media.
    pub fn for_duration(fps: u32, seconds: f32, clock: MediaClock) -> Self {
        let frames = (seconds as f64 * fps as f64).ceil() as u64;
        Self::new(fps, frames, clock)
    }

    pub fn total_frames(&self) -> u64 {
        self.frames
    }
}

impl Scheduler for FixedRateScheduler {
    fn next_frame(&mut self) -> Option<FrameTick> {
        if self.next >= self.frames {
            return None;
        }
        let tick = FrameTick {
            index: self.next,
            time: self.next as f64 / self.fps as f64,
        };
        self.clock.set(tick.time);
        self.next += 1;
        Some(tick)
    }
}

/// Drive `step` once per scheduled frame until the scheduler runs dry, the token is
/// cancelled, or a step fails. Returns the number of frames completed.
pub fn run<S, F>(scheduler: &mut S, cancel: &CancelToken, mut step: F) -> Result<u64>
where
    S: Scheduler,
    F: FnMut(FrameTick) -> Result<()>,
{
    let mut completed = 0;
    loop {
        if cancel.is_cancelled() {
            log::debug!("Frame loop cancelled after {} frames", completed);
            break;
        }
        let Some(tick) = scheduler.next_frame() else {
            break;
        };
        step(tick)?;
        completed += 1;
    }
    Ok(completed)
}
