use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::debug;

/// Transport state of the playback clock.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlaybackState {
    #[default]
    Stopped,
    Playing,
    Paused,
}

/// Advances the playhead while playing.
///
/// The clock holds no timer of its own; a driver calls [`PlaybackClock::advance`]
/// on every tick and stops calling it to pause.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlaybackClock {
    state: PlaybackState,
    rate: f64,
}

impl Default for PlaybackClock {
    fn default() -> Self {
        Self::new(1.0)
    }
}

impl PlaybackClock {
    pub fn new(rate: f64) -> Self {
        Self {
            state: PlaybackState::Stopped,
            rate,
        }
    }

    pub fn state(&self) -> PlaybackState {
        self.state
    }

    pub fn rate(&self) -> f64 {
        self.rate
    }

    pub fn is_playing(&self) -> bool {
        self.state == PlaybackState::Playing
    }

    pub fn play(&mut self) {
        self.state = PlaybackState::Playing;
        debug!(rate = self.rate, "playback started");
    }

    pub fn pause(&mut self) {
        if self.state == PlaybackState::Playing {
            self.state = PlaybackState::Paused;
            debug!("playback paused");
        }
    }

    pub fn stop(&mut self) {
        self.state = PlaybackState::Stopped;
        debug!("playback stopped");
    }

    /// Plays when paused or stopped, pauses when playing.
    pub fn toggle(&mut self) {
        match self.state {
            PlaybackState::Playing => self.pause(),
            PlaybackState::Paused | PlaybackState::Stopped => self.play(),
        }
    }

    /// Next playhead position after `elapsed` wall time, or `None` when not
    /// playing.
    pub fn advance(&self, current: f64, elapsed: Duration) -> Option<f64> {
        if !self.is_playing() {
            return None;
        }
        Some(current + elapsed.as_secs_f64() * self.rate)
    }
}
