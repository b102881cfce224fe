//! Outbound (destination-side) envelope model.
//!
//! An envelope carries exactly one [`Content`] variant plus optional reply
//! metadata. Media variants share a [`MediaTransport`] split into the group
//! receivers need to fetch and decrypt the blob ([`ContentIdentity`]) and
//! the group they need to render it ([`DisplayInfo`]).

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{jid::Jid, thumbnail::ThumbnailDimensions};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutboundEnvelope {
    pub content: Content,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reply: Option<ReplyMetadata>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Content {
    Text(MessageText),
    Image(ImageMessage),
    Video(VideoMessage),
    Audio(AudioMessage),
    Document(DocumentMessage),
    Sticker(StickerMessage),
    Location(LocationMessage),
}

impl Content {
    /// Variant name, for logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Text(_) => "text",
            Self::Image(_) => "image",
            Self::Video(_) => "video",
            Self::Audio(_) => "audio",
            Self::Document(_) => "document",
            Self::Sticker(_) => "sticker",
            Self::Location(_) => "location",
        }
    }
}

/// Plain text payload. An empty `text` is the explicit "no caption" value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageText {
    pub text: String,
}

impl MessageText {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageMessage {
    pub caption: MessageText,
    pub transport: MediaTransport,
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoMessage {
    pub caption: MessageText,
    pub transport: MediaTransport,
    pub width: u32,
    pub height: u32,
    pub seconds: u32,
    /// Loop silently like an animated image.
    pub gif_playback: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AudioMessage {
    /// Push-to-talk voice note.
    pub ptt: bool,
    pub transport: MediaTransport,
    pub seconds: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentMessage {
    pub file_name: String,
    pub transport: MediaTransport,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StickerMessage {
    pub transport: MediaTransport,
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationMessage {
    pub location: Location,
    pub address: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub degrees_latitude: f64,
    pub degrees_longitude: f64,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaTransport {
    pub identity: ContentIdentity,
    pub display: DisplayInfo,
}

/// Fields receivers need to fetch, decrypt and verify the blob.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentIdentity {
    #[serde(with = "b64")]
    pub file_sha256: Vec<u8>,
    #[serde(with = "b64")]
    pub file_enc_sha256: Vec<u8>,
    #[serde(with = "b64")]
    pub media_key: Vec<u8>,
    pub direct_path: String,
    /// Unix seconds.
    pub media_key_timestamp: i64,
}

impl fmt::Debug for ContentIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ContentIdentity")
            .field("direct_path", &self.direct_path)
            .field("media_key", &"[REDACTED]")
            .field("media_key_timestamp", &self.media_key_timestamp)
            .finish_non_exhaustive()
    }
}

/// Fields receivers need to render the message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplayInfo {
    pub file_length: u64,
    pub mime_type: String,
    pub thumbnail: ThumbnailDimensions,
    pub object_id: String,
}

/// Quoted-message metadata attached to replies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplyMetadata {
    pub stanza_id: String,
    pub remote_jid: Jid,
    pub participant: Jid,
}

mod b64 {
    use {
        base64::{Engine as _, engine::general_purpose::STANDARD},
        serde::{Deserialize, Deserializer, Serializer},
    };

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&STANDARD.encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let raw = String::deserialize(deserializer)?;
        STANDARD.decode(raw).map_err(serde::de::Error::custom)
    }
}
