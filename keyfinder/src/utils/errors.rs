use std::path::PathBuf;

#[derive(thiserror::Error, Debug)]
pub enum DecodeError {
    #[error("Unable to open audio file {path:?} (file doesn't exist or unhandled format): {reason}")]
    FileOpen { path: PathBuf, reason: String },

    #[error("Unable to get stream info: {0}")]
    StreamInfo(String),

    #[error("File does not have any audio streams")]
    NoAudioStream,

    #[error("Unsupported audio stream: no decoder registered for codec {0}")]
    UnsupportedCodec(String),

    #[error("Unable to open the {codec} codec: {reason}")]
    CodecOpen { codec: String, reason: String },

    #[error("Unable to open the resample context: {0}")]
    ResamplerInit(String),

    #[error("Unable to resample audio into 16bit PCM data: {0}")]
    Resample(String),

    #[error("Too many bad packets: {count} malformed packets exceed the limit of {limit}")]
    TooManyBadPackets { count: usize, limit: usize },
}

#[derive(thiserror::Error, Debug, PartialEq)]
pub enum ProfileError {
    #[error("Tone profile must have {expected} values, got {actual}")]
    WrongLength { expected: usize, actual: usize },

    #[error("Tone profile value {index} is not a number: {value:?}")]
    NotANumber { index: usize, value: String },

    #[error("Tone profile value {index} must be finite and non-negative, got {value}")]
    OutOfRange { index: usize, value: f64 },

    #[error("Tone profile must not be all zeros")]
    AllZero,
}
