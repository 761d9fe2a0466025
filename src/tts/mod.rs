//! Speech synthesis integration.

pub mod client;
pub mod types;

pub use client::{ElevenLabsClient, SpeechSynthesizer};
pub use types::{SpeechRequest, TtsError, VoiceSettings};
