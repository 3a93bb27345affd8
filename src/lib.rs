//! subgen - AI subtitle generator
//!
//! Sends an audio/video file to a hosted Gemini model for transcription,
//! optionally translates the result, and produces SRT subtitles (with a
//! WebVTT preview track) or a plain-text transcript.

pub mod cli;
pub mod config;
pub mod credential;
pub mod error;
pub mod gemini;
pub mod languages;
pub mod media;
pub mod progress;
pub mod subtitle;
pub mod transcribe;
pub mod workflow;
