use std::{error::Error as StdError, num::ParseFloatError};

type BoxError = Box<dyn StdError + Send + Sync>;

/// Crate-wide result type for conversions.
pub type Result<T> = std::result::Result<T, Error>;

/// Blocking stage of the media pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Download,
    Transcode,
    Upload,
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Download => f.write_str("download"),
            Self::Transcode => f.write_str("transcode"),
            Self::Upload => f.write_str("upload"),
        }
    }
}

/// Which media rewrite failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConvertCase {
    VoiceToAudio,
    AnimatedImageToVideo,
}

impl std::fmt::Display for ConvertCase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::VoiceToAudio => f.write_str("voice message to m4a"),
            Self::AnimatedImageToVideo => f.write_str("gif to mp4"),
        }
    }
}

/// Why a `geo:` URI was rejected.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GeoUriError {
    #[error("uri doesn't have geo: prefix")]
    MissingPrefix,

    #[error("didn't find exactly two numbers separated by a comma")]
    CoordinateCount,

    #[error("latitude is not a number: {0}")]
    Latitude(#[source] ParseFloatError),

    #[error("longitude is not a number: {0}")]
    Longitude(#[source] ParseFloatError),
}

/// Conversion failures. All of them are fatal to the message being
/// converted; none leaves a partial envelope behind.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The inbound kind has no destination mapping.
    #[error("unsupported message type {kind}")]
    UnsupportedMessageType { kind: String },

    #[error("invalid geo URI: {0}")]
    InvalidGeoUri(#[from] GeoUriError),

    #[error("failed to download media: {source}")]
    MediaDownload {
        #[source]
        source: BoxError,
    },

    #[error("failed to convert {case}: {source}")]
    MediaConvert {
        case: ConvertCase,
        #[source]
        source: BoxError,
    },

    #[error("failed to upload media: {source}")]
    MediaUpload {
        #[source]
        source: BoxError,
    },

    #[error("conversion cancelled during {stage}")]
    Cancelled { stage: Stage },
}

impl Error {
    #[must_use]
    pub fn unsupported(kind: impl std::fmt::Display) -> Self {
        Self::UnsupportedMessageType {
            kind: kind.to_string(),
        }
    }

    #[must_use]
    pub fn media_download(source: impl Into<BoxError>) -> Self {
        Self::MediaDownload {
            source: source.into(),
        }
    }

    #[must_use]
    pub fn media_convert(case: ConvertCase, source: impl Into<BoxError>) -> Self {
        Self::MediaConvert {
            case,
            source: source.into(),
        }
    }

    #[must_use]
    pub fn media_upload(source: impl Into<BoxError>) -> Self {
        Self::MediaUpload {
            source: source.into(),
        }
    }

    /// Pipeline stage the error happened in, if it is a media error.
    #[must_use]
    pub fn stage(&self) -> Option<Stage> {
        match self {
            Self::MediaDownload { .. } => Some(Stage::Download),
            Self::MediaConvert { .. } => Some(Stage::Transcode),
            Self::MediaUpload { .. } => Some(Stage::Upload),
            Self::Cancelled { stage } => Some(*stage),
            Self::UnsupportedMessageType { .. } | Self::InvalidGeoUri(_) => None,
        }
    }
}
