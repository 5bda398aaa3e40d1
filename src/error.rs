use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, MixError>;

#[derive(Error, Debug)]
pub enum MixError {
    #[error("IO Error")]
    Io(#[from] std::io::Error),
    #[error("Wav Error")]
    Wav(#[from] hound::Error),
    #[error("Directory walk error")]
    Walk(#[from] walkdir::Error),
    #[error("Config parse error")]
    ConfigParse(#[from] toml::de::Error),
    #[error("Recipe serialization error")]
    Recipe(#[from] ron::Error),
    #[error("Invalid config: {0}")]
    InvalidConfig(String),
    #[error("{path:?}: sample rate {found} Hz, expected {expected} Hz")]
    SampleRateMismatch {
        path: PathBuf,
        expected: u32,
        found: u32,
    },
    #[error("{path:?}: {channels} channels, expected mono")]
    NotMono { path: PathBuf, channels: u16 },
    #[error("{path:?}: file stem shorter than speaker id width {width}")]
    SpeakerIdTooShort { path: PathBuf, width: usize },
    #[error("{0:?}: file name is not valid UTF-8")]
    NonUtf8FileName(PathBuf),
    #[error("No utterances found under {0:?}")]
    EmptyIndex(PathBuf),
    #[error("Requested {requested} speakers but only {available} are available")]
    NotEnoughSpeakers { requested: usize, available: usize },
    #[error("{0:?}: utterance has no samples")]
    EmptyUtterance(PathBuf),
    #[error("{path:?}: requested {requested} frames from {start}, got {read}")]
    ShortRead {
        path: PathBuf,
        start: usize,
        requested: usize,
        read: usize,
    },
    #[error("Source {index} has {found} samples, expected {expected}")]
    LengthMismatch {
        index: usize,
        expected: usize,
        found: usize,
    },
    #[error("Got {gains} gains for {sources} sources")]
    GainCountMismatch { sources: usize, gains: usize },
}
