//! Audio cues and playback backends
//!
//! The game never plays audio itself. It names a cue (`Cue`), turns it into a
//! symbolic `ClipId`, and hands that to an `AudioSink`. Backends:
//! - `VirtualMixer`: time-stepped model of one feedback channel (headless runs, tests)
//! - `WebAudio` (wasm32): Web Audio chimes plus Web Speech prompts

use std::collections::HashMap;
use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::number_word;
use crate::sim::Presentation;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AudioError {
    #[error("no clip registered for `{0}`")]
    UnknownClip(ClipId),

    #[error("audio backend error: {0}")]
    Backend(String),
}

/// Symbolic clip handle, the slug of the spoken phrase (`point_to_three`)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ClipId(String);

impl ClipId {
    /// Slug a phrase: lowercase, words joined by underscores
    pub fn from_phrase(phrase: &str) -> Self {
        let slug = phrase
            .split(|c: char| !c.is_ascii_alphanumeric())
            .filter(|w| !w.is_empty())
            .map(|w| w.to_ascii_lowercase())
            .collect::<Vec<_>>()
            .join("_");
        Self(slug)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ClipId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Things the game says
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Cue {
    /// "point to three balls"
    PointTo {
        value: u32,
        presentation: Presentation,
    },
    Good,
    NoGood,
    YouDidIt,
}

impl Cue {
    /// Round prompt for `target` in the given presentation
    pub fn prompt(target: u32, presentation: Presentation) -> Self {
        Cue::PointTo {
            value: target,
            presentation,
        }
    }

    /// The spoken text
    pub fn phrase(&self) -> String {
        match self {
            Cue::PointTo {
                value,
                presentation,
            } => {
                let word = number_word(*value)
                    .map(str::to_string)
                    .unwrap_or_else(|| value.to_string());
                format!("point to {word}{}", presentation.prompt_tail(*value))
            }
            Cue::Good => "good".to_string(),
            Cue::NoGood => "no good".to_string(),
            Cue::YouDidIt => "you did it".to_string(),
        }
    }

    pub fn clip_id(&self) -> ClipId {
        ClipId::from_phrase(&self.phrase())
    }

    /// Every cue a session up to `max_level` can ask for
    pub fn all(max_level: u8) -> Vec<Cue> {
        let mut cues = vec![Cue::Good, Cue::NoGood, Cue::YouDidIt];
        for level in 1..=max_level {
            let presentation = Presentation::for_level(level);
            for value in 1..=crate::consts::ROUNDS_PER_SEQUENCE {
                let cue = Cue::prompt(value, presentation);
                if !cues.contains(&cue) {
                    cues.push(cue);
                }
            }
        }
        cues
    }
}

/// Background music tracks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MusicTrack {
    Menu,
    Play,
}

impl MusicTrack {
    pub fn as_str(&self) -> &'static str {
        match self {
            MusicTrack::Menu => "bgm_medium",
            MusicTrack::Play => "bgm_strong",
        }
    }
}

/// Playback collaborator
pub trait AudioSink {
    /// Play a clip once on the feedback channel
    fn play_once(&mut self, clip: &ClipId) -> Result<(), AudioError>;

    /// Whether the feedback channel is still sounding
    fn is_channel_busy(&self) -> bool;

    /// Start looping background music (no-op if already playing)
    fn play_looping_music(&mut self, track: MusicTrack) -> Result<(), AudioError>;
}

/// One-channel mixer model advanced by simulated time.
///
/// Clips must be registered with their length before they can play. A new
/// clip cuts off the current one, like a single mixer channel.
#[derive(Debug, Clone, Default)]
pub struct VirtualMixer {
    clips: HashMap<ClipId, Duration>,
    busy_for: Duration,
    music: Option<MusicTrack>,
    history: Vec<ClipId>,
}

impl VirtualMixer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, clip: ClipId, length: Duration) {
        self.clips.insert(clip, length);
    }

    /// Register every cue with the same length
    pub fn with_cues(cues: &[Cue], length: Duration) -> Self {
        let mut mixer = Self::new();
        for cue in cues {
            mixer.register(cue.clip_id(), length);
        }
        mixer
    }

    pub fn advance(&mut self, dt: Duration) {
        self.busy_for = self.busy_for.saturating_sub(dt);
    }

    /// Cut the feedback channel
    pub fn stop(&mut self) {
        self.busy_for = Duration::ZERO;
    }

    /// Clips played so far, oldest first
    pub fn history(&self) -> &[ClipId] {
        &self.history
    }

    pub fn music(&self) -> Option<MusicTrack> {
        self.music
    }
}

impl AudioSink for VirtualMixer {
    fn play_once(&mut self, clip: &ClipId) -> Result<(), AudioError> {
        let length = *self
            .clips
            .get(clip)
            .ok_or_else(|| AudioError::UnknownClip(clip.clone()))?;
        self.busy_for = length;
        self.history.push(clip.clone());
        Ok(())
    }

    fn is_channel_busy(&self) -> bool {
        !self.busy_for.is_zero()
    }

    fn play_looping_music(&mut self, track: MusicTrack) -> Result<(), AudioError> {
        if self.music != Some(track) {
            log::debug!("Music: {}", track.as_str());
            self.music = Some(track);
        }
        Ok(())
    }
}

#[cfg(target_arch = "wasm32")]
pub use web::WebAudio;

#[cfg(target_arch = "wasm32")]
mod web {
    //! Web Audio chimes for feedback, Web Speech for prompts

    use std::collections::HashMap;

    use web_sys::{
        AudioContext, GainNode, OscillatorNode, OscillatorType, SpeechSynthesis,
        SpeechSynthesisUtterance,
    };

    use super::{AudioError, AudioSink, ClipId, Cue, MusicTrack};
    use crate::speech::{SpeechCache, SpeechError};

    /// Happy ding
    static GOOD_NOTES: [f32; 3] = [600.0, 800.0, 1000.0];
    /// Two falling notes
    static NO_GOOD_NOTES: [f32; 2] = [400.0, 300.0];
    /// Celebratory run
    static FANFARE_NOTES: [f32; 5] = [500.0, 600.0, 700.0, 800.0, 1000.0];

    /// Browser audio backend
    pub struct WebAudio {
        ctx: Option<AudioContext>,
        speech: Option<SpeechSynthesis>,
        utterances: HashMap<ClipId, SpeechSynthesisUtterance>,
        /// AudioContext time at which the last chime ends
        chime_until: f64,
        sfx_volume: f32,
        music: Option<MusicTrack>,
    }

    impl WebAudio {
        pub fn new(sfx_volume: f32) -> Self {
            // Both may be missing (insecure context, old browser); degrade to silence
            let ctx = AudioContext::new().ok();
            if ctx.is_none() {
                log::warn!("Failed to create AudioContext - chimes disabled");
            }
            let speech = web_sys::window().and_then(|w| w.speech_synthesis().ok());
            if speech.is_none() {
                log::warn!("Speech synthesis unavailable - prompts disabled");
            }
            Self {
                ctx,
                speech,
                utterances: HashMap::new(),
                chime_until: 0.0,
                sfx_volume: sfx_volume.clamp(0.0, 1.0),
                music: None,
            }
        }

        /// Resume audio context (required after user gesture)
        pub fn resume(&self) {
            if let Some(ctx) = &self.ctx {
                let _ = ctx.resume();
            }
        }

        fn create_osc(
            &self,
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

        /// Rising or falling note run; returns when it ends (context time)
        fn chime(
            &self,
            ctx: &AudioContext,
            freqs: &[f32],
            step: f64,
            osc_type: OscillatorType,
        ) -> f64 {
            let vol = self.sfx_volume;
            let start = ctx.current_time();
            for (i, freq) in freqs.iter().enumerate() {
                let t = start + i as f64 * step;
                if let Some((osc, gain)) = self.create_osc(ctx, *freq, osc_type) {
                    gain.gain().set_value_at_time(vol * 0.3, t).ok();
                    gain.gain()
                        .exponential_ramp_to_value_at_time(0.01, t + step * 2.0)
                        .ok();
                    osc.start_with_when(t).ok();
                    osc.stop_with_when(t + step * 2.5).ok();
                }
            }
            start + freqs.len() as f64 * step + step * 1.5
        }

        fn chime_for(clip: &ClipId) -> Option<(&'static [f32], f64, OscillatorType)> {
            if *clip == Cue::Good.clip_id() {
                Some((&GOOD_NOTES[..], 0.08, OscillatorType::Sine))
            } else if *clip == Cue::NoGood.clip_id() {
                Some((&NO_GOOD_NOTES[..], 0.15, OscillatorType::Triangle))
            } else if *clip == Cue::YouDidIt.clip_id() {
                Some((&FANFARE_NOTES[..], 0.1, OscillatorType::Triangle))
            } else {
                None
            }
        }
    }

    impl SpeechCache for WebAudio {
        fn clip_for(&mut self, phrase: &str) -> Result<ClipId, SpeechError> {
            let id = ClipId::from_phrase(phrase);
            if !self.utterances.contains_key(&id) {
                let utterance = SpeechSynthesisUtterance::new_with_text(phrase)
                    .map_err(|e| SpeechError::Synth(format!("{e:?}")))?;
                utterance.set_rate(0.9);
                utterance.set_volume(self.sfx_volume);
                self.utterances.insert(id.clone(), utterance);
            }
            Ok(id)
        }
    }

    impl AudioSink for WebAudio {
        fn play_once(&mut self, clip: &ClipId) -> Result<(), AudioError> {
            // Chime feedback only sounds with a running context; speak the phrase otherwise
            if let (Some(ctx), Some((freqs, step, osc_type))) = (&self.ctx, Self::chime_for(clip)) {
                if ctx.state() == web_sys::AudioContextState::Suspended {
                    let _ = ctx.resume();
                }
                self.chime_until = self.chime(ctx, freqs, step, osc_type);
                return Ok(());
            }

            let utterance = self
                .utterances
                .get(clip)
                .ok_or_else(|| AudioError::UnknownClip(clip.clone()))?;
            let speech = self
                .speech
                .as_ref()
                .ok_or_else(|| AudioError::Backend("speech synthesis unavailable".into()))?;
            speech.cancel();
            speech.speak(utterance);
            Ok(())
        }

        fn is_channel_busy(&self) -> bool {
            let speaking = self.speech.as_ref().is_some_and(|s| s.speaking());
            let chiming = self
                .ctx
                .as_ref()
                .is_some_and(|ctx| ctx.current_time() < self.chime_until);
            speaking || chiming
        }

        fn play_looping_music(&mut self, track: MusicTrack) -> Result<(), AudioError> {
            // Music files are not bundled with the web build; remember the request only
            if self.music != Some(track) {
                log::info!("Music track requested: {}", track.as_str());
                self.music = Some(track);
            }
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clip_ids_are_phrase_slugs() {
        assert_eq!(Cue::Good.clip_id().as_str(), "good");
        assert_eq!(Cue::NoGood.clip_id().as_str(), "no_good");
        assert_eq!(Cue::YouDidIt.clip_id().as_str(), "you_did_it");
        assert_eq!(
            Cue::prompt(3, Presentation::Digits).clip_id().as_str(),
            "point_to_three"
        );
        assert_eq!(ClipId::from_phrase("  Point to  ONE ball! ").as_str(), "point_to_one_ball");
    }

    #[test]
    fn test_prompt_phrases() {
        assert_eq!(Cue::prompt(1, Presentation::Balls).phrase(), "point to one ball");
        assert_eq!(Cue::prompt(6, Presentation::Balls).phrase(), "point to six balls");
        assert_eq!(
            Cue::prompt(10, Presentation::DigitsAndBalls).phrase(),
            "point to ten number and balls"
        );

        // Spoken and on-screen prompts share their wording
        for level in 1..=3 {
            let p = Presentation::for_level(level);
            for value in [1, 4] {
                let cue = Cue::prompt(value, p);
                assert_eq!(cue, Cue::PointTo { value, presentation: p });
                let word = number_word(value).unwrap();
                let expected = format!("point to {word}{}", p.prompt_tail(value));
                assert_eq!(cue.phrase(), expected);
            }
        }
    }

    #[test]
    fn test_all_cues_unique() {
        let cues = Cue::all(3);
        // 3 feedback cues + 10 prompts per level
        assert_eq!(cues.len(), 3 + 30);
        let mut ids: Vec<ClipId> = cues.iter().map(Cue::clip_id).collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), cues.len());

        assert_eq!(Cue::all(1).len(), 13);
    }

    #[test]
    fn test_mixer_busy_until_clip_ends() {
        let mut mixer = VirtualMixer::with_cues(&[Cue::Good], Duration::from_millis(500));
        assert!(!mixer.is_channel_busy());

        mixer.play_once(&Cue::Good.clip_id()).unwrap();
        assert!(mixer.is_channel_busy());
        mixer.advance(Duration::from_millis(300));
        assert!(mixer.is_channel_busy());
        mixer.advance(Duration::from_millis(200));
        assert!(!mixer.is_channel_busy());
        assert_eq!(mixer.history(), &[Cue::Good.clip_id()]);
    }

    #[test]
    fn test_mixer_unknown_clip() {
        let mut mixer = VirtualMixer::new();
        let err = mixer.play_once(&Cue::NoGood.clip_id()).unwrap_err();
        assert_eq!(err, AudioError::UnknownClip(Cue::NoGood.clip_id()));
        assert!(!mixer.is_channel_busy());
    }

    #[test]
    fn test_mixer_music() {
        let mut mixer = VirtualMixer::new();
        mixer.play_looping_music(MusicTrack::Play).unwrap();
        assert_eq!(mixer.music(), Some(MusicTrack::Play));
    }
}
