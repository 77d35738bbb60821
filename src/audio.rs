//! Audio cues as procedurally generated tones
//!
//! The simulation describes sounds as (frequency, duration, waveform)
//! triples and hands them to whatever tone backend the host provides.
//! Audio is strictly fire-and-forget: a backend that is missing, blocked
//! or out of voices must never interrupt a frame.

use crate::settings::Settings;

/// Oscillator shapes the tone backend is expected to support
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Waveform {
    Sine,
    Square,
    Sawtooth,
}

/// Error from a tone backend. Carries no detail on purpose; callers
/// discard it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AudioUnavailable;

/// Host-provided tone synthesizer.
pub trait ToneSink {
    fn play_tone(
        &mut self,
        frequency_hz: f32,
        duration_secs: f32,
        waveform: Waveform,
    ) -> Result<(), AudioUnavailable>;
}

/// Tone sink that plays nothing. Used for headless runs and tests.
#[derive(Debug, Default)]
pub struct NullTone;

impl ToneSink for NullTone {
    fn play_tone(
        &mut self,
        _frequency_hz: f32,
        _duration_secs: f32,
        _waveform: Waveform,
    ) -> Result<(), AudioUnavailable> {
        Ok(())
    }
}

/// Gameplay events with an audio cue
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cue {
    /// Player fired a bullet
    Fire,
    /// Bullet struck an enemy
    Impact,
    /// Enemy destroyed
    EnemyDown,
    /// Enemy rammed the player
    PlayerHit,
    /// Power-up collected
    Pickup,
    /// Run ended
    GameOver,
}

impl Cue {
    /// Tone for each cue
    fn tone(self) -> (f32, f32, Waveform) {
        match self {
            Cue::Fire => (800.0, 0.1, Waveform::Square),
            Cue::Impact => (220.0, 0.15, Waveform::Sawtooth),
            Cue::EnemyDown => (120.0, 0.3, Waveform::Sawtooth),
            Cue::PlayerHit => (90.0, 0.4, Waveform::Sawtooth),
            Cue::Pickup => (600.0, 0.2, Waveform::Sine),
            Cue::GameOver => (160.0, 0.8, Waveform::Sine),
        }
    }
}

/// Maps gameplay cues onto the host tone backend, applying volume and
/// mute preferences. Backend failures are swallowed here.
pub struct AudioDirector {
    sink: Box<dyn ToneSink>,
    settings: Settings,
}

impl AudioDirector {
    pub fn new(sink: Box<dyn ToneSink>, settings: Settings) -> Self {
        Self { sink, settings }
    }

    pub fn set_settings(&mut self, settings: Settings) {
        self.settings = settings;
    }

    /// Play the tone for a cue. Silent when muted; backend errors are
    /// discarded.
    pub fn play(&mut self, cue: Cue) {
        if self.settings.effective_volume() <= 0.0 {
            return;
        }
        let (freq, dur, waveform) = cue.tone();
        let _ = self.sink.play_tone(freq, dur, waveform);
    }
}

impl std::fmt::Debug for AudioDirector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AudioDirector")
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}
