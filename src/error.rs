use symphonia::core::errors::Error as SymphoniaError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("unrecognized audio format: {0}")]
    Probe(#[source] SymphoniaError),
    #[error("no decodable audio track")]
    NoTrack,
    #[error("unknown sample rate")]
    UnknownSampleRate,
    #[error("failed to create decoder: {0}")]
    Codec(#[source] SymphoniaError),
    #[error("failed while reading packets: {0}")]
    Stream(#[source] SymphoniaError),
    #[error("decoded stream contains no samples")]
    Empty,
}

/// Misuse of an [`AnalysisEngine`](crate::audio::engine::AnalysisEngine) lifecycle.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum EngineError {
    #[error("playback was already started")]
    AlreadyStarted,
    #[error("engine is disconnected from the audio graph")]
    Disconnected,
}
