//! Spoken phrase cache
//!
//! Prompts are spoken phrases rendered to clips once and reused. The game
//! only ever sees `clip_for(phrase) -> ClipId`; how the clip is produced and
//! stored is up to the implementation:
//! - `DiskSpeechCache`: `sfx_<slug>.wav` files in a directory, synthesized on first use
//! - `WebAudio` (wasm32): one Web Speech utterance per phrase

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use thiserror::Error;

use crate::audio::{ClipId, Cue};

#[derive(Debug, Error)]
pub enum SpeechError {
    #[error("speech synthesis failed: {0}")]
    Synth(String),

    #[error("cannot access {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("{} is not a usable clip: {source}", path.display())]
    InvalidClip {
        path: PathBuf,
        #[source]
        source: WavError,
    },
}

/// Why a byte buffer is not a playable WAV
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum WavError {
    #[error("missing RIFF/WAVE header")]
    MissingHeader,

    #[error("zero byte rate")]
    ZeroByteRate,
}

/// Phrase → clip lookup, generating the clip on first use
pub trait SpeechCache {
    fn clip_for(&mut self, phrase: &str) -> Result<ClipId, SpeechError>;

    /// Make sure every cue has a clip; fails on the first one that cannot be produced
    fn preload(&mut self, cues: &[Cue]) -> Result<Vec<ClipId>, SpeechError> {
        cues.iter().map(|cue| self.clip_for(&cue.phrase())).collect()
    }
}

/// Turns text into encoded audio bytes
pub trait SpeechSynth {
    fn synthesize(&mut self, phrase: &str) -> Result<Vec<u8>, SpeechError>;
}

/// Deterministic stand-in voice: one short tone per word, as 16-bit mono WAV
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ToneSynth {
    pub sample_rate: u32,
    /// Tone length per word (seconds)
    pub word_secs: f32,
    /// Silence after each word (seconds)
    pub gap_secs: f32,
}

impl Default for ToneSynth {
    fn default() -> Self {
        Self {
            sample_rate: 16_000,
            word_secs: 0.25,
            gap_secs: 0.05,
        }
    }
}

impl ToneSynth {
    /// Pitch for a word, stable across runs
    fn word_freq(word: &str) -> f32 {
        let hash = word
            .bytes()
            .fold(2166136261u32, |h, b| (h ^ b as u32).wrapping_mul(16777619));
        300.0 + (hash % 500) as f32
    }
}

impl SpeechSynth for ToneSynth {
    fn synthesize(&mut self, phrase: &str) -> Result<Vec<u8>, SpeechError> {
        let words: Vec<&str> = phrase.split_whitespace().collect();
        if words.is_empty() {
            return Err(SpeechError::Synth("empty phrase".to_string()));
        }

        let tone_len = (self.word_secs * self.sample_rate as f32) as usize;
        let gap_len = (self.gap_secs * self.sample_rate as f32) as usize;
        let mut samples: Vec<i16> = Vec::with_capacity(words.len() * (tone_len + gap_len));
        for word in &words {
            let freq = Self::word_freq(word);
            for i in 0..tone_len {
                let t = i as f32 / self.sample_rate as f32;
                // Short linear fade in/out to avoid clicks
                let edge = (i.min(tone_len - 1 - i) as f32 / 160.0).min(1.0);
                let s = (t * freq * std::f32::consts::TAU).sin() * 0.4 * edge;
                samples.push((s * i16::MAX as f32) as i16);
            }
            samples.extend(std::iter::repeat_n(0i16, gap_len));
        }
        Ok(encode_wav(&samples, self.sample_rate))
    }
}

/// Canonical 44-byte-header PCM WAV, 16-bit mono
pub fn encode_wav(samples: &[i16], sample_rate: u32) -> Vec<u8> {
    let data_len = (samples.len() * 2) as u32;
    let mut out = Vec::with_capacity(44 + data_len as usize);
    out.extend_from_slice(b"RIFF");
    out.extend_from_slice(&(36 + data_len).to_le_bytes());
    out.extend_from_slice(b"WAVE");
    out.extend_from_slice(b"fmt ");
    out.extend_from_slice(&16u32.to_le_bytes());
    out.extend_from_slice(&1u16.to_le_bytes()); // PCM
    out.extend_from_slice(&1u16.to_le_bytes()); // mono
    out.extend_from_slice(&sample_rate.to_le_bytes());
    out.extend_from_slice(&(sample_rate * 2).to_le_bytes());
    out.extend_from_slice(&2u16.to_le_bytes());
    out.extend_from_slice(&16u16.to_le_bytes());
    out.extend_from_slice(b"data");
    out.extend_from_slice(&data_len.to_le_bytes());
    for s in samples {
        out.extend_from_slice(&s.to_le_bytes());
    }
    out
}

/// Play length of a canonical PCM WAV
pub fn wav_duration(bytes: &[u8]) -> Result<Duration, WavError> {
    if bytes.len() < 44 || &bytes[0..4] != b"RIFF" || &bytes[8..12] != b"WAVE" {
        return Err(WavError::MissingHeader);
    }
    let u16_at = |i: usize| u16::from_le_bytes([bytes[i], bytes[i + 1]]);
    let u32_at = |i: usize| {
        u32::from_le_bytes([bytes[i], bytes[i + 1], bytes[i + 2], bytes[i + 3]])
    };

    let channels = u16_at(22) as u64;
    let sample_rate = u32_at(24) as u64;
    let bits = u16_at(34) as u64;
    let data_len = u32_at(40) as u64;
    let bytes_per_sec = sample_rate * channels * bits / 8;
    if bytes_per_sec == 0 {
        return Err(WavError::ZeroByteRate);
    }
    Ok(Duration::from_micros(data_len * 1_000_000 / bytes_per_sec))
}

/// A clip available on disk
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CachedClip {
    pub path: PathBuf,
    pub length: Duration,
}

/// Directory-backed cache of synthesized phrases
#[derive(Debug)]
pub struct DiskSpeechCache<S> {
    dir: PathBuf,
    synth: S,
    clips: HashMap<ClipId, CachedClip>,
}

impl<S: SpeechSynth> DiskSpeechCache<S> {
    pub fn new(dir: impl Into<PathBuf>, synth: S) -> Result<Self, SpeechError> {
        let dir = dir.into();
        fs::create_dir_all(&dir).map_err(|source| SpeechError::Io {
            path: dir.clone(),
            source,
        })?;
        Ok(Self {
            dir,
            synth,
            clips: HashMap::new(),
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, clip: &ClipId) -> PathBuf {
        self.dir.join(format!("sfx_{clip}.wav"))
    }

    /// A clip resolved earlier through `clip_for`
    pub fn clip(&self, clip: &ClipId) -> Option<&CachedClip> {
        self.clips.get(clip)
    }

    pub fn clips(&self) -> impl Iterator<Item = (&ClipId, &CachedClip)> {
        self.clips.iter()
    }
}

impl<S: SpeechSynth> SpeechCache for DiskSpeechCache<S> {
    fn clip_for(&mut self, phrase: &str) -> Result<ClipId, SpeechError> {
        let id = ClipId::from_phrase(phrase);
        if self.clips.contains_key(&id) {
            return Ok(id);
        }

        let path = self.path_for(&id);
        let io_err = |source| SpeechError::Io {
            path: path.clone(),
            source,
        };
        let bytes = if path.exists() {
            log::debug!("Loading speech clip {}", path.display());
            fs::read(&path).map_err(io_err)?
        } else {
            log::info!("Generating speech clip for \"{phrase}\"");
            let bytes = self.synth.synthesize(phrase)?;
            fs::write(&path, &bytes).map_err(io_err)?;
            bytes
        };

        let length = wav_duration(&bytes).map_err(|source| SpeechError::InvalidClip {
            path: path.clone(),
            source,
        })?;
        self.clips.insert(id.clone(), CachedClip { path, length });
        Ok(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    /// Synth that counts calls, wrapping the tone voice
    struct CountingSynth {
        inner: ToneSynth,
        calls: usize,
    }

    impl SpeechSynth for CountingSynth {
        fn synthesize(&mut self, phrase: &str) -> Result<Vec<u8>, SpeechError> {
            self.calls += 1;
            self.inner.synthesize(phrase)
        }
    }

    #[test]
    fn test_tone_wav_length() {
        let mut synth = ToneSynth::default();
        let bytes = synth.synthesize("point to three").unwrap();
        // 3 words × (0.25 + 0.05) s
        let len = wav_duration(&bytes).unwrap();
        assert_eq!(len, Duration::from_millis(900));
    }

    #[test]
    fn test_tone_synth_is_deterministic() {
        let a = ToneSynth::default().synthesize("good").unwrap();
        let b = ToneSynth::default().synthesize("good").unwrap();
        assert_eq!(a, b);
        assert!(ToneSynth::default().synthesize("   ").is_err());
    }

    #[test]
    fn test_wav_duration_rejects_garbage() {
        assert_eq!(wav_duration(b"not a wav file"), Err(WavError::MissingHeader));

        // Valid header, all-zero format fields
        let mut bytes = vec![0u8; 64];
        bytes[0..4].copy_from_slice(b"RIFF");
        bytes[8..12].copy_from_slice(b"WAVE");
        assert_eq!(wav_duration(&bytes), Err(WavError::ZeroByteRate));
    }

    #[test]
    fn test_disk_cache_generates_once() {
        let tmp = TempDir::new().unwrap();
        let dir = tmp.path().join("speech");
        let synth = CountingSynth {
            inner: ToneSynth::default(),
            calls: 0,
        };
        let mut cache = DiskSpeechCache::new(&dir, synth).unwrap();

        let id = cache.clip_for("no good").unwrap();
        assert_eq!(id.as_str(), "no_good");
        assert!(dir.join("sfx_no_good.wav").exists());
        let again = cache.clip_for("No good!").unwrap();
        assert_eq!(again, id);
        assert_eq!(cache.synth.calls, 1);
        assert_eq!(cache.clip(&id).unwrap().length, Duration::from_millis(600));

        // A fresh cache over the same directory loads from disk instead
        let synth = CountingSynth {
            inner: ToneSynth::default(),
            calls: 0,
        };
        let mut reopened = DiskSpeechCache::new(&dir, synth).unwrap();
        reopened.clip_for("no good").unwrap();
        assert_eq!(reopened.synth.calls, 0);
    }

    #[test]
    fn test_preload_all_cues() {
        let tmp = TempDir::new().unwrap();
        let mut cache = DiskSpeechCache::new(tmp.path(), ToneSynth::default()).unwrap();
        let cues = Cue::all(2);
        let ids = cache.preload(&cues).unwrap();
        assert_eq!(ids.len(), cues.len());
        assert_eq!(cache.clips().count(), cues.len());
    }

    #[test]
    fn test_corrupt_cached_file_is_an_error() {
        let tmp = TempDir::new().unwrap();
        let mut cache = DiskSpeechCache::new(tmp.path(), ToneSynth::default()).unwrap();
        fs::write(tmp.path().join("sfx_good.wav"), b"garbage").unwrap();
        let err = cache.clip_for("good").unwrap_err();
        assert!(matches!(
            err,
            SpeechError::InvalidClip {
                source: WavError::MissingHeader,
                ..
            }
        ));
    }
}
