//! Audio cues
//!
//! Procedurally generated sound effects - no external files needed!
//! Every effect is a short list of [`Tone`]s. The [`AudioManager`] scales them
//! by volume and hands them to an [`AudioSink`]; in the browser that sink is
//! Web Audio, elsewhere a no-op or a recorder.

use crate::sim::state::{GameEvent, GamePhase};

/// Sound effect types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SoundEffect {
    /// Bird flaps
    Flap,
    /// Runner leaves the ground
    Jump,
    /// Pipe passed
    Score,
    /// Collectible picked up (pitch rises with the combo)
    Collect { combo: u32 },
    PowerUp,
    ShieldBreak,
    /// Boost smashed through an obstacle
    Smash,
    /// Terminal collision
    Crash,
    /// Session started
    Start,
    /// Difficulty tier crossed
    Milestone,
    /// New session best
    HighScore,
}

impl SoundEffect {
    /// Sound cue for a simulation event, if it has one
    pub fn for_event(event: &GameEvent) -> Option<Self> {
        match *event {
            GameEvent::Flapped => Some(SoundEffect::Flap),
            GameEvent::Jumped => Some(SoundEffect::Jump),
            GameEvent::PipePassed | GameEvent::ObstacleCleared { .. } => Some(SoundEffect::Score),
            GameEvent::Collected { combo, .. } => Some(SoundEffect::Collect { combo }),
            GameEvent::PowerUp { .. } => Some(SoundEffect::PowerUp),
            GameEvent::ShieldBroken => Some(SoundEffect::ShieldBreak),
            GameEvent::ObstacleSmashed => Some(SoundEffect::Smash),
            GameEvent::Crashed => Some(SoundEffect::Crash),
            GameEvent::Milestone { .. } => Some(SoundEffect::Milestone),
            GameEvent::PhaseChanged {
                to: GamePhase::Playing,
                ..
            } => Some(SoundEffect::Start),
            _ => None,
        }
    }
}

/// Oscillator shape
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Waveform {
    Sine,
    Square,
    Triangle,
    Sawtooth,
}

/// One oscillator voice: frequency ramp under an exponential gain decay
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tone {
    pub waveform: Waveform,
    pub freq_start: f32,
    pub freq_end: f32,
    /// Peak gain before volume scaling
    pub gain: f32,
    /// Start offset from now (seconds)
    pub delay: f64,
    /// Decay length (seconds); the voice stops shortly after
    pub duration: f64,
}

impl Tone {
    const fn new(waveform: Waveform, freq: f32, gain: f32, duration: f64) -> Self {
        Self {
            waveform,
            freq_start: freq,
            freq_end: freq,
            gain,
            delay: 0.0,
            duration,
        }
    }

    const fn sweep(mut self, freq_end: f32) -> Self {
        self.freq_end = freq_end;
        self
    }

    const fn after(mut self, delay: f64) -> Self {
        self.delay = delay;
        self
    }
}

/// Arpeggio of equal voices spaced `step` seconds apart
fn arpeggio(waveform: Waveform, freqs: &[f32], step: f64, gain: f32, duration: f64) -> Vec<Tone> {
    freqs
        .iter()
        .enumerate()
        .map(|(i, &f)| Tone::new(waveform, f, gain, duration).after(i as f64 * step))
        .collect()
}

/// The tones that make up a sound effect
pub fn recipe(effect: SoundEffect) -> Vec<Tone> {
    use Waveform::*;
    match effect {
        // Quick chirp up
        SoundEffect::Flap => vec![Tone::new(Triangle, 420.0, 0.25, 0.08).sweep(760.0)],
        // Springy whoosh
        SoundEffect::Jump => vec![Tone::new(Square, 220.0, 0.15, 0.15).sweep(520.0)],
        // Two-note ding
        SoundEffect::Score => arpeggio(Sine, &[880.0, 1320.0], 0.06, 0.22, 0.12),
        SoundEffect::Collect { combo } => {
            let steps = combo.saturating_sub(1).min(8) as f32;
            let base = 700.0 * 1.06_f32.powf(steps);
            arpeggio(Sine, &[base, base * 1.5], 0.05, 0.22, 0.12)
        }
        SoundEffect::PowerUp => arpeggio(Triangle, &[500.0, 650.0, 800.0, 1000.0], 0.06, 0.25, 0.2),
        // Glassy crack
        SoundEffect::ShieldBreak => vec![
            Tone::new(Sawtooth, 1800.0, 0.2, 0.18).sweep(300.0),
            Tone::new(Sine, 90.0, 0.3, 0.12),
        ],
        // Boom with a high crack on top
        SoundEffect::Smash => vec![
            Tone::new(Sawtooth, 140.0, 0.4, 0.3).sweep(40.0),
            Tone::new(Square, 1500.0, 0.15, 0.08),
        ],
        // Thump, then a sad descent
        SoundEffect::Crash => {
            let mut tones = vec![Tone::new(Sine, 150.0, 0.5, 0.25).sweep(45.0)];
            tones.extend(
                arpeggio(Sine, &[400.0, 350.0, 300.0, 200.0], 0.18, 0.25, 0.3)
                    .into_iter()
                    .map(|t| Tone {
                        delay: t.delay + 0.15,
                        ..t
                    }),
            );
            tones
        }
        SoundEffect::Start => vec![Tone::new(Triangle, 200.0, 0.3, 0.2).sweep(600.0)],
        SoundEffect::Milestone => arpeggio(Triangle, &[400.0, 500.0, 600.0, 800.0], 0.1, 0.3, 0.4),
        SoundEffect::HighScore => {
            arpeggio(Triangle, &[500.0, 600.0, 700.0, 800.0, 1000.0], 0.08, 0.25, 0.25)
        }
    }
}

/// Anything that can voice a tone. Failures must stay inside the sink.
pub trait AudioSink {
    fn play_tone(&mut self, tone: &Tone);

    /// Resume after a user gesture (browser autoplay policy)
    fn resume(&mut self) {}

    /// Release the underlying audio context
    fn close(&mut self) {}
}

/// Sink that drops everything (headless runs, audio unavailable)
#[derive(Debug, Default)]
pub struct NullAudioSink;

impl AudioSink for NullAudioSink {
    fn play_tone(&mut self, _tone: &Tone) {}
}

/// Sink that keeps every tone it was asked to play
#[derive(Debug, Default, Clone)]
pub struct RecordingAudioSink {
    log: std::rc::Rc<std::cell::RefCell<RecordedAudio>>,
}

#[derive(Debug, Default)]
pub struct RecordedAudio {
    pub tones: Vec<Tone>,
    pub closed: bool,
}

impl RecordingAudioSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of tones played so far (shared across clones)
    pub fn tone_count(&self) -> usize {
        self.log.borrow().tones.len()
    }

    pub fn tones(&self) -> Vec<Tone> {
        self.log.borrow().tones.clone()
    }

    pub fn is_closed(&self) -> bool {
        self.log.borrow().closed
    }
}

impl AudioSink for RecordingAudioSink {
    fn play_tone(&mut self, tone: &Tone) {
        self.log.borrow_mut().tones.push(*tone);
    }

    fn close(&mut self) {
        self.log.borrow_mut().closed = true;
    }
}

/// Audio manager for the game
pub struct AudioManager {
    sink: Box<dyn AudioSink>,
    master_volume: f32,
    sfx_volume: f32,
    muted: bool,
}

impl AudioManager {
    pub fn new(sink: Box<dyn AudioSink>) -> Self {
        Self {
            sink,
            master_volume: 0.8,
            sfx_volume: 1.0,
            muted: false,
        }
    }

    pub fn apply_settings(&mut self, settings: &crate::settings::Settings) {
        self.set_master_volume(settings.master_volume);
        self.set_sfx_volume(settings.sfx_volume);
        self.set_muted(settings.muted);
    }

    /// Set master volume (0.0 - 1.0)
    pub fn set_master_volume(&mut self, vol: f32) {
        self.master_volume = vol.clamp(0.0, 1.0);
    }

    /// Set SFX volume (0.0 - 1.0)
    pub fn set_sfx_volume(&mut self, vol: f32) {
        self.sfx_volume = vol.clamp(0.0, 1.0);
    }

    /// Mute/unmute all audio
    pub fn set_muted(&mut self, muted: bool) {
        self.muted = muted;
    }

    pub fn is_muted(&self) -> bool {
        self.muted
    }

    /// Get effective volume
    fn effective_volume(&self) -> f32 {
        if self.muted {
            0.0
        } else {
            self.master_volume * self.sfx_volume
        }
    }

    pub fn resume(&mut self) {
        self.sink.resume();
    }

    /// Play a sound effect (no-op when muted)
    pub fn play(&mut self, effect: SoundEffect) {
        let vol = self.effective_volume();
        if vol <= 0.0 {
            return;
        }
        for tone in recipe(effect) {
            let scaled = Tone {
                gain: tone.gain * vol,
                ..tone
            };
            self.sink.play_tone(&scaled);
        }
    }

    pub fn close(&mut self) {
        self.sink.close();
    }
}

#[cfg(target_arch = "wasm32")]
pub use web::WebAudioSink;

#[cfg(target_arch = "wasm32")]
mod web {
    use web_sys::{AudioContext, GainNode, OscillatorNode, OscillatorType};

    use super::{AudioSink, Tone, Waveform};

    /// Web Audio backed sink. Missing context or failed scheduling is silent.
    pub struct WebAudioSink {
        ctx: Option<AudioContext>,
    }

    impl Default for WebAudioSink {
        fn default() -> Self {
            Self::new()
        }
    }

    impl WebAudioSink {
        pub fn new() -> Self {
            // Try to create audio context (may fail if not in secure context)
            let ctx = AudioContext::new().ok();
            if ctx.is_none() {
                log::warn!("Failed to create AudioContext - audio disabled");
            }
            Self { ctx }
        }

        /// Create an oscillator with gain envelope
        fn create_osc(
            ctx: &AudioContext,
            freq: f32,
            osc_type: OscillatorType,
        ) -> Option<(OscillatorNode, GainNode)> {
            let osc = ctx.create_oscillator().ok()?;
            let gain = ctx.create_gain().ok()?;

            osc.set_type(osc_type);
            osc.frequency().set_value(freq);
            osc.connect_with_audio_node(&gain).ok()?;
            gain.connect_with_audio_node(&ctx.destination()).ok()?;

            Some((osc, gain))
        }
    }

    fn osc_type(waveform: Waveform) -> OscillatorType {
        match waveform {
            Waveform::Sine => OscillatorType::Sine,
            Waveform::Square => OscillatorType::Square,
            Waveform::Triangle => OscillatorType::Triangle,
            Waveform::Sawtooth => OscillatorType::Sawtooth,
        }
    }

    impl AudioSink for WebAudioSink {
        fn play_tone(&mut self, tone: &Tone) {
            let Some(ctx) = &self.ctx else { return };

            // Resume context if suspended (browsers require user gesture)
            if ctx.state() == web_sys::AudioContextState::Suspended {
                let _ = ctx.resume();
            }

            let Some((osc, gain)) = Self::create_osc(ctx, tone.freq_start, osc_type(tone.waveform))
            else {
                return;
            };
            let t = ctx.current_time() + tone.delay;

            gain.gain().set_value_at_time(tone.gain, t).ok();
            gain.gain()
                .exponential_ramp_to_value_at_time(0.01, t + tone.duration)
                .ok();
            if tone.freq_end != tone.freq_start {
                osc.frequency().set_value_at_time(tone.freq_start, t).ok();
                osc.frequency()
                    .exponential_ramp_to_value_at_time(tone.freq_end, t + tone.duration)
                    .ok();
            }

            osc.start_with_when(t).ok();
            osc.stop_with_when(t + tone.duration + 0.05).ok();
        }

        fn resume(&mut self) {
            if let Some(ctx) = &self.ctx {
                let _ = ctx.resume();
            }
        }

        fn close(&mut self) {
            if let Some(ctx) = self.ctx.take() {
                let _ = ctx.close();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::state::PowerUpKind;

    #[test]
    fn muted_manager_plays_nothing() {
        let sink = RecordingAudioSink::new();
        let mut audio = AudioManager::new(Box::new(sink.clone()));
        audio.set_muted(true);
        audio.play(SoundEffect::Crash);
        assert_eq!(sink.tone_count(), 0);

        audio.set_muted(false);
        audio.play(SoundEffect::Crash);
        assert_eq!(sink.tone_count(), recipe(SoundEffect::Crash).len());
    }

    #[test]
    fn gain_scaled_by_volume() {
        let sink = RecordingAudioSink::new();
        let mut audio = AudioManager::new(Box::new(sink.clone()));
        audio.set_master_volume(0.5);
        audio.set_sfx_volume(0.5);
        audio.play(SoundEffect::Flap);
        let played = sink.tones();
        assert_eq!(played.len(), 1);
        assert!((played[0].gain - recipe(SoundEffect::Flap)[0].gain * 0.25).abs() < 1e-6);
    }

    #[test]
    fn recipes_are_well_formed() {
        let all = [
            SoundEffect::Flap,
            SoundEffect::Jump,
            SoundEffect::Score,
            SoundEffect::Collect { combo: 5 },
            SoundEffect::PowerUp,
            SoundEffect::ShieldBreak,
            SoundEffect::Smash,
            SoundEffect::Crash,
            SoundEffect::Start,
            SoundEffect::Milestone,
            SoundEffect::HighScore,
        ];
        for effect in all {
            let tones = recipe(effect);
            assert!(!tones.is_empty(), "{effect:?}");
            for t in tones {
                // Exponential ramps need strictly positive targets
                assert!(t.freq_start > 0.0 && t.freq_end > 0.0);
                assert!(t.gain > 0.0 && t.gain <= 1.0);
                assert!(t.duration > 0.0 && t.delay >= 0.0);
            }
        }
    }

    #[test]
    fn combo_raises_pitch() {
        let low = recipe(SoundEffect::Collect { combo: 1 })[0].freq_start;
        let high = recipe(SoundEffect::Collect { combo: 4 })[0].freq_start;
        assert!(high > low);
    }

    #[test]
    fn events_map_to_cues() {
        assert_eq!(SoundEffect::for_event(&GameEvent::Crashed), Some(SoundEffect::Crash));
        assert_eq!(
            SoundEffect::for_event(&GameEvent::PowerUp {
                kind: PowerUpKind::Magnet
            }),
            Some(SoundEffect::PowerUp)
        );
        assert_eq!(SoundEffect::for_event(&GameEvent::Scored { points: 4 }), None);
        assert_eq!(
            SoundEffect::for_event(&GameEvent::PhaseChanged {
                from: GamePhase::GameOver,
                to: GamePhase::Playing
            }),
            Some(SoundEffect::Start)
        );
    }

    #[test]
    fn close_reaches_sink() {
        let sink = RecordingAudioSink::new();
        let mut audio = AudioManager::new(Box::new(sink.clone()));
        audio.close();
        assert!(sink.is_closed());
    }

    #[test]
    fn settings_drive_output_gain() {
        let sink = RecordingAudioSink::new();
        let mut audio = AudioManager::new(Box::new(sink.clone()));
        let mut settings = crate::settings::Settings {
            master_volume: 0.5,
            sfx_volume: 0.4,
            ..Default::default()
        };
        audio.apply_settings(&settings);
        audio.play(SoundEffect::Flap);
        let expected = recipe(SoundEffect::Flap)[0].gain * 0.2;
        assert!((sink.tones()[0].gain - expected).abs() < 1e-6);

        settings.muted = true;
        audio.apply_settings(&settings);
        audio.play(SoundEffect::Flap);
        assert_eq!(sink.tone_count(), 1);
    }
}
