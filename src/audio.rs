//! Synthesized audio cues.
//!
//! Each cue is a short fundsp graph rendered to a sample buffer and handed
//! to a detached rodio sink, so playback never blocks the frame loop. When
//! the output stream cannot be opened (headless CI, no audio device) every
//! cue degrades to a silent no-op; the game never depends on sound.

use fundsp::prelude64::*;
use log::warn;
use rodio::buffer::SamplesBuffer;
use rodio::{OutputStream, OutputStreamBuilder, Sink};

const SAMPLE_RATE: f64 = 44100.0;

pub struct AudioCues {
    stream: Option<OutputStream>,
    muted: bool,
}

impl AudioCues {
    pub fn new(muted: bool) -> Self {
        let stream = match OutputStreamBuilder::open_default_stream() {
            Ok(stream) => Some(stream),
            Err(e) => {
                warn!("audio unavailable, continuing silent: {e}");
                None
            }
        };
        Self { stream, muted }
    }

    pub fn muted(&self) -> bool {
        self.muted
    }

    pub fn toggle_mute(&mut self) {
        self.muted = !self.muted;
    }

    /// Short ascending whoosh, 150 -> 300 Hz over 0.1 s.
    pub fn jump(&self) {
        let unit = (lfo(|t| xerp(150.0, 300.0, clamp01(t / 0.1))) >> sine())
            * lfo(|t| xerp(0.15, 0.01, clamp01(t / 0.1)));
        self.play(0.12, unit);
    }

    /// Coin chime: a C5 + E5 dyad with a bell-like decay.
    pub fn score(&self) {
        let unit = (sine_hz(523.25) + sine_hz(659.25))
            * lfo(|t| xerp(0.2, 0.01, clamp01(t / 0.3)));
        self.play(0.3, unit);
    }

    /// Deep thud, 100 -> 30 Hz through a lowpass for the muffled impact.
    pub fn death(&self) {
        let unit = (lfo(|t| xerp(100.0, 30.0, clamp01(t / 0.15))) >> sine()
            >> lowpass_hz(200.0, 1.0))
            * lfo(|t| xerp(0.4, 0.01, clamp01(t / 0.15)));
        self.play(0.18, unit);
    }

    fn play(&self, duration: f64, mut unit: impl AudioUnit) {
        if self.muted {
            return;
        }
        let Some(stream) = &self.stream else { return };

        let wave = Wave::render(SAMPLE_RATE, duration, &mut unit);
        let samples: Vec<f32> = (0..wave.len()).map(|i| wave.at(0, i)).collect();

        let sink = Sink::connect_new(stream.mixer());
        sink.append(SamplesBuffer::new(1, SAMPLE_RATE as u32, samples));
        sink.detach();
    }
}
