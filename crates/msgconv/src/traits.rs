//! Collaborator seams of the converter.
//!
//! The converter never talks to the network, ffmpeg or storage directly;
//! it goes through these traits. Adapters for the concrete collaborators in
//! `msgbridge-media` live at the bottom of this module.

use std::fmt;

use {
    async_trait::async_trait,
    msgbridge_media::{FfmpegTranscoder, LocalMediaStore, Profile, StoredMedia},
};

use crate::event::{InboundMessage, MediaRef, MessageKind, ReplyTarget};

/// Fetches the source bytes behind a media reference.
#[async_trait]
pub trait MediaSource: Send + Sync {
    async fn fetch(&self, media: &MediaRef) -> anyhow::Result<Vec<u8>>;
}

/// Re-encodes media into a container the destination accepts.
#[async_trait]
pub trait Transcoder: Send + Sync {
    async fn transcode(
        &self,
        data: Vec<u8>,
        input_mime: &str,
        profile: Profile,
    ) -> anyhow::Result<Vec<u8>>;
}

/// Pushes final bytes into the destination's encrypted object store.
#[async_trait]
pub trait MediaUploader: Send + Sync {
    async fn upload(&self, data: Vec<u8>, media_type: MediaType) -> anyhow::Result<UploadedMedia>;
}

/// Finds the message an inbound message replies to, if any.
#[async_trait]
pub trait ReplyResolver: Send + Sync {
    async fn resolve(&self, msg: &InboundMessage) -> Option<ReplyTarget>;
}

/// Reads the reply target the sender declared in the message extensions.
#[derive(Debug, Clone, Copy, Default)]
pub struct DeclaredReply;

#[async_trait]
impl ReplyResolver for DeclaredReply {
    async fn resolve(&self, msg: &InboundMessage) -> Option<ReplyTarget> {
        msg.extensions.reply_to.clone()
    }
}

/// Upload routing class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MediaType {
    Image,
    Video,
    Audio,
    Document,
}

impl MediaType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Image => "image",
            Self::Video => "video",
            Self::Audio => "audio",
            Self::Document => "document",
        }
    }
}

impl fmt::Display for MediaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&MessageKind> for MediaType {
    fn from(kind: &MessageKind) -> Self {
        match kind {
            MessageKind::Image | MessageKind::Sticker => Self::Image,
            MessageKind::Video => Self::Video,
            MessageKind::Audio => Self::Audio,
            _ => Self::Document,
        }
    }
}

/// Handle returned by an upload.
#[derive(Clone, PartialEq, Eq)]
pub struct UploadedMedia {
    pub file_sha256: Vec<u8>,
    pub file_enc_sha256: Vec<u8>,
    pub media_key: Vec<u8>,
    pub direct_path: String,
    pub object_id: String,
    pub file_length: u64,
    /// Unix seconds.
    pub media_key_timestamp: i64,
}

impl fmt::Debug for UploadedMedia {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UploadedMedia")
            .field("media_key", &"[REDACTED]")
            .field("direct_path", &self.direct_path)
            .field("object_id", &self.object_id)
            .field("file_length", &self.file_length)
            .finish_non_exhaustive()
    }
}

impl From<StoredMedia> for UploadedMedia {
    fn from(stored: StoredMedia) -> Self {
        Self {
            file_sha256: stored.file_sha256,
            file_enc_sha256: stored.file_enc_sha256,
            media_key: stored.media_key,
            direct_path: stored.direct_path,
            object_id: stored.object_id,
            file_length: stored.file_length,
            media_key_timestamp: stored.media_key_timestamp,
        }
    }
}

// ── Adapters ────────────────────────────────────────────────────────────────

/// Fetches `http(s)://`, `file://` and bare-path media with a size cap.
#[derive(Debug, Clone, Copy)]
pub struct UriMediaSource {
    pub max_bytes: u64,
}

#[async_trait]
impl MediaSource for UriMediaSource {
    async fn fetch(&self, media: &MediaRef) -> anyhow::Result<Vec<u8>> {
        Ok(msgbridge_media::fetch_bytes(&media.url, self.max_bytes).await?)
    }
}

#[async_trait]
impl Transcoder for FfmpegTranscoder {
    async fn transcode(
        &self,
        data: Vec<u8>,
        input_mime: &str,
        profile: Profile,
    ) -> anyhow::Result<Vec<u8>> {
        Ok(FfmpegTranscoder::transcode(self, &data, input_mime, profile).await?)
    }
}

#[async_trait]
impl MediaUploader for LocalMediaStore {
    async fn upload(&self, data: Vec<u8>, media_type: MediaType) -> anyhow::Result<UploadedMedia> {
        Ok(self.store(&data, media_type.as_str()).await?.into())
    }
}
