// torolife - Toroidal Cellular Automaton Viewer
// Copyright (c) 2025 Filipe da Veiga Ventura Alves
// Licensed under MIT License

use std::time::{Duration, Instant};

const STATS_WINDOW: Duration = Duration::from_millis(500);

/// Minimum time between generations, `None` when advancement is unthrottled.
pub fn advance_budget(max_fps: u8) -> Option<Duration> {
    if max_fps == 0 {
        return None;
    }
    Some(Duration::from_nanos(1_000_000_000 / max_fps as u64))
}

/// Decides when the next generation is due. Redraws are never paced here.
#[derive(Debug, Clone)]
pub struct FramePacer {
    budget: Option<Duration>,
    last_tick: Instant,
}

impl FramePacer {
    pub fn new(max_fps: u8, now: Instant) -> Self {
        Self {
            budget: advance_budget(max_fps),
            last_tick: now,
        }
    }

    /// True when the budget has elapsed since the last tick. A due tick is
    /// consumed even if the caller is paused and skips the step.
    pub fn tick(&mut self, now: Instant) -> bool {
        let due = match self.budget {
            None => true,
            Some(budget) => now.saturating_duration_since(self.last_tick) >= budget,
        };
        if due {
            self.last_tick = now;
        }
        due
    }
}

/// Frame and generation rates averaged over half a second, for the title bar.
#[derive(Debug, Clone)]
pub struct FrameStats {
    frames: u32,
    generations: u32,
    window_start: Instant,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rates {
    pub fps: f32,
    pub generations_per_second: f32,
}

impl FrameStats {
    pub fn new(now: Instant) -> Self {
        Self {
            frames: 0,
            generations: 0,
            window_start: now,
        }
    }

    pub fn record(&mut self, advanced: bool) {
        self.frames += 1;
        if advanced {
            self.generations += 1;
        }
    }

    pub fn poll(&mut self, now: Instant) -> Option<Rates> {
        let elapsed = now.saturating_duration_since(self.window_start);
        if elapsed < STATS_WINDOW || self.frames == 0 {
            return None;
        }
        let secs = elapsed.as_secs_f32();
        let rates = Rates {
            fps: self.frames as f32 / secs,
            generations_per_second: self.generations as f32 / secs,
        };
        self.frames = 0;
        self.generations = 0;
        self.window_start = now;
        Some(rates)
    }
}
