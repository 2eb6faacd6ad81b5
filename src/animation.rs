use std::time::Duration;

use crate::field::ParticleField;

/// Host-owned frame loop. The host asks for a timer only while playing, so
/// pausing stops the loop outright.
///
/// A windowed host steps the field in a background task and reports finished
/// frames through [`record`](Self::record). [`tick`](Self::tick),
/// [`step`](Self::step) and [`run`](Self::run) drive the field directly, for
/// headless drivers such as tests and benchmarks.
#[derive(Clone, Debug)]
pub struct Animation {
    playing: bool,
    frame: u64,
    interval: Duration,
}

impl Animation {
    pub fn new(interval: Duration) -> Self {
        Animation {
            playing: false,
            frame: 0,
            interval,
        }
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    pub fn frame(&self) -> u64 {
        self.frame
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn set_interval(&mut self, interval: Duration) {
        self.interval = interval;
    }

    pub fn play(&mut self) {
        self.playing = true;
    }

    pub fn pause(&mut self) {
        self.playing = false;
    }

    pub fn toggle(&mut self) {
        self.playing = !self.playing;
    }

    /// Advances one frame if playing.
    pub fn tick(&mut self, field: &mut ParticleField) -> bool {
        if !self.playing {
            return false;
        }
        self.step(field);
        true
    }

    /// Advances one frame regardless of the play state.
    pub fn step(&mut self, field: &mut ParticleField) {
        field.step();
        self.frame += 1;
    }

    pub fn run(&mut self, field: &mut ParticleField, frames: u64) {
        for _ in 0..frames {
            self.step(field);
        }
    }

    /// Counts a frame that was advanced elsewhere (e.g. in a background task).
    pub fn record(&mut self, frames: u64) {
        self.frame += frames;
    }

    pub fn reset(&mut self) {
        self.frame = 0;
    }
}

impl Default for Animation {
    fn default() -> Self {
        Animation::new(Duration::from_millis(16))
    }
}
