//! Read-aloud playback.
//!
//! Speech engines have an unspecified maximum utterance length, so text is
//! queued sentence by sentence. `SpeechSession` tracks play/pause state on top
//! of an engine and cancels playback when the text changes or the session is
//! dropped.

use thiserror::Error;
use tracing::warn;

#[derive(Error, Debug)]
pub enum SpeechError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Speech not available: {0}")]
    NotAvailable(String),
    #[error("Speech failed: {0}")]
    Failed(String),
    #[error("Cannot change rate while speaking")]
    Busy,
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum PlaybackRate {
    Half,
    #[default]
    Normal,
    OneAndHalf,
    Double,
}

impl PlaybackRate {
    pub const ALL: [PlaybackRate; 4] = [
        PlaybackRate::Half,
        PlaybackRate::Normal,
        PlaybackRate::OneAndHalf,
        PlaybackRate::Double,
    ];

    pub fn factor(self) -> f32 {
        match self {
            PlaybackRate::Half => 0.5,
            PlaybackRate::Normal => 1.0,
            PlaybackRate::OneAndHalf => 1.5,
            PlaybackRate::Double => 2.0,
        }
    }

    pub fn from_factor(factor: f32) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|rate| (rate.factor() - factor).abs() < f32::EPSILON)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Utterance {
    pub text: String,
    pub rate: PlaybackRate,
}

pub trait SpeechEngine {
    /// Queue one utterance behind anything already queued.
    fn speak(&mut self, utterance: &Utterance) -> Result<(), SpeechError>;
    fn pause(&mut self) -> Result<(), SpeechError>;
    fn resume(&mut self) -> Result<(), SpeechError>;
    /// Drop everything queued or playing.
    fn cancel(&mut self) -> Result<(), SpeechError>;
}

/// Split text at sentence boundaries (`.`, `!`, `?`, newline). Chunks are
/// trimmed, empty ones dropped, and trailing text without punctuation is kept.
pub fn chunk_sentences(text: &str) -> Vec<String> {
    let mut chunks = Vec::new();
    let mut current = String::new();

    for c in text.chars() {
        current.push(c);
        if matches!(c, '.' | '!' | '?' | '\n') {
            push_trimmed(&mut chunks, &current);
            current.clear();
        }
    }
    push_trimmed(&mut chunks, &current);

    chunks
}

fn push_trimmed(chunks: &mut Vec<String>, chunk: &str) {
    let trimmed = chunk.trim();
    if trimmed.is_empty() {
        return;
    }
    // A run like "..." or "?!" belongs to the previous sentence.
    if trimmed.chars().all(|c| matches!(c, '.' | '!' | '?')) {
        if let Some(last) = chunks.last_mut() {
            last.push_str(trimmed);
            return;
        }
    }
    chunks.push(trimmed.to_string());
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackState {
    Idle,
    Speaking,
    Paused,
}

pub struct SpeechSession<E: SpeechEngine> {
    engine: E,
    state: PlaybackState,
    rate: PlaybackRate,
    text: String,
}

impl<E: SpeechEngine> SpeechSession<E> {
    pub fn new(engine: E) -> Self {
        Self {
            engine,
            state: PlaybackState::Idle,
            rate: PlaybackRate::default(),
            text: String::new(),
        }
    }

    pub fn state(&self) -> PlaybackState {
        self.state
    }

    pub fn rate(&self) -> PlaybackRate {
        self.rate
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    pub fn set_rate(&mut self, rate: PlaybackRate) -> Result<(), SpeechError> {
        if self.state != PlaybackState::Idle {
            return Err(SpeechError::Busy);
        }
        self.rate = rate;
        Ok(())
    }

    /// Replace the text to read. A different text stops current playback.
    pub fn set_text(&mut self, text: &str) -> Result<(), SpeechError> {
        if self.text != text {
            self.stop()?;
            self.text = text.to_string();
        }
        Ok(())
    }

    /// Play/pause button: start when idle, pause when speaking, resume when paused.
    pub fn toggle(&mut self) -> Result<PlaybackState, SpeechError> {
        match self.state {
            PlaybackState::Idle => self.start()?,
            PlaybackState::Speaking => {
                self.engine.pause()?;
                self.state = PlaybackState::Paused;
            }
            PlaybackState::Paused => {
                self.engine.resume()?;
                self.state = PlaybackState::Speaking;
            }
        }
        Ok(self.state)
    }

    fn start(&mut self) -> Result<(), SpeechError> {
        if self.text.trim().is_empty() {
            return Ok(());
        }
        self.engine.cancel()?;
        self.state = PlaybackState::Speaking;
        for text in chunk_sentences(&self.text) {
            let utterance = Utterance {
                text,
                rate: self.rate,
            };
            if let Err(e) = self.engine.speak(&utterance) {
                if let Err(stop_err) = self.stop() {
                    warn!(error = %stop_err, "failed to cancel speech after a failed utterance");
                }
                return Err(e);
            }
        }
        Ok(())
    }

    pub fn stop(&mut self) -> Result<(), SpeechError> {
        if self.state == PlaybackState::Idle {
            return Ok(());
        }
        self.state = PlaybackState::Idle;
        self.engine.cancel()
    }

    /// The engine finished the last queued utterance.
    pub fn playback_ended(&mut self) {
        self.state = PlaybackState::Idle;
    }
}

impl<E: SpeechEngine> Drop for SpeechSession<E> {
    fn drop(&mut self) {
        if let Err(e) = self.stop() {
            warn!(error = %e, "failed to stop speech on teardown");
        }
    }
}
