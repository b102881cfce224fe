//! Inbound (source-side) message model.
//!
//! Only the fields the converter reads are modelled. The free-form side
//! channel of the source schema is replaced by [`Extensions`], a typed record
//! of the flags the conversion cares about.

use serde::{Deserialize, Serialize};

/// Source event type. Stickers arrive as their own event type rather than
/// as a message kind.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventType {
    #[default]
    Message,
    Sticker,
}

/// Source message kind (`msgtype`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum MessageKind {
    Text,
    Notice,
    Emote,
    Image,
    Video,
    Audio,
    File,
    Location,
    Sticker,
    /// Anything else; rejected by the converter.
    Other(String),
}

impl MessageKind {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Text => "m.text",
            Self::Notice => "m.notice",
            Self::Emote => "m.emote",
            Self::Image => "m.image",
            Self::Video => "m.video",
            Self::Audio => "m.audio",
            Self::File => "m.file",
            Self::Location => "m.location",
            Self::Sticker => "m.sticker",
            Self::Other(kind) => kind,
        }
    }
}

impl From<String> for MessageKind {
    fn from(value: String) -> Self {
        match value.as_str() {
            "m.text" => Self::Text,
            "m.notice" => Self::Notice,
            "m.emote" => Self::Emote,
            "m.image" => Self::Image,
            "m.video" => Self::Video,
            "m.audio" => Self::Audio,
            "m.file" => Self::File,
            "m.location" => Self::Location,
            "m.sticker" => Self::Sticker,
            _ => Self::Other(value),
        }
    }
}

impl From<MessageKind> for String {
    fn from(value: MessageKind) -> Self {
        match value {
            MessageKind::Other(kind) => kind,
            known => known.as_str().to_string(),
        }
    }
}

impl std::fmt::Display for MessageKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Reference to source media plus what the sender declared about it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaRef {
    /// Where the bytes live (`https://`, `file://` or a bare path).
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,
    #[serde(default)]
    pub width: u32,
    #[serde(default)]
    pub height: u32,
    /// Duration in milliseconds.
    #[serde(default)]
    pub duration_ms: u64,
}

/// The message being replied to, as known on the source side.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplyTarget {
    /// Destination stanza id of the quoted message.
    pub stanza_id: String,
    /// Upstream numeric id of the quoted message's sender.
    pub sender_id: i64,
}

/// Typed side channel.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Extensions {
    /// Present the audio as a push-to-talk voice note.
    pub voice: bool,
    /// Set by the converter when an animated image was re-encoded as video.
    pub animated_image_derived: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reply_to: Option<ReplyTarget>,
}

/// One inbound chat message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InboundMessage {
    #[serde(default)]
    pub event_type: EventType,
    #[serde(rename = "msgtype")]
    pub kind: MessageKind,
    #[serde(default)]
    pub body: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub formatted_body: Option<String>,
    /// Declared file name, distinct from the body when the body is a caption.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub media: Option<MediaRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub geo_uri: Option<String>,
    #[serde(default)]
    pub extensions: Extensions,
}

impl InboundMessage {
    /// Plain message of `kind` with `body` and nothing else.
    pub fn new(kind: MessageKind, body: impl Into<String>) -> Self {
        Self {
            event_type: EventType::Message,
            kind,
            body: body.into(),
            formatted_body: None,
            file_name: None,
            media: None,
            geo_uri: None,
            extensions: Extensions::default(),
        }
    }

    #[must_use]
    pub fn with_media(mut self, media: MediaRef) -> Self {
        self.media = Some(media);
        self
    }

    #[must_use]
    pub fn with_file_name(mut self, file_name: impl Into<String>) -> Self {
        self.file_name = Some(file_name.into());
        self
    }

    #[must_use]
    pub fn with_reply_to(mut self, stanza_id: impl Into<String>, sender_id: i64) -> Self {
        self.extensions.reply_to = Some(ReplyTarget {
            stanza_id: stanza_id.into(),
            sender_id,
        });
        self
    }

    /// Non-empty declared file name.
    pub fn declared_file_name(&self) -> Option<&str> {
        self.file_name.as_deref().filter(|name| !name.is_empty())
    }
}
