//! Wrapping re-uploaded media into a destination content variant.

use crate::{
    envelope::{
        AudioMessage, Content, ContentIdentity, DisplayInfo, DocumentMessage, ImageMessage,
        MediaTransport, MessageText, StickerMessage, VideoMessage,
    },
    event::MessageKind,
    pipeline::ReuploadedMedia,
};

/// Message kinds that carry media.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    Image,
    Video,
    Audio,
    Document,
    Sticker,
}

impl MediaKind {
    pub fn from_message(kind: &MessageKind) -> Option<Self> {
        match kind {
            MessageKind::Image => Some(Self::Image),
            MessageKind::Video => Some(Self::Video),
            MessageKind::Audio => Some(Self::Audio),
            MessageKind::File => Some(Self::Document),
            MessageKind::Sticker => Some(Self::Sticker),
            _ => None,
        }
    }
}

/// Message-level details the wrapper reads besides the uploaded media.
#[derive(Debug, Clone, Default)]
pub struct MediaDetails {
    pub caption: MessageText,
    pub duration_ms: u64,
    pub voice: bool,
    pub animated_image_derived: bool,
}

/// Build the content variant for `kind`.
///
/// Width and height in the variant are the media's pixel size; the clamped
/// size only goes into the transport's thumbnail.
pub fn wrap_media(kind: MediaKind, media: ReuploadedMedia, details: MediaDetails) -> Content {
    let ReuploadedMedia {
        uploaded,
        mime_type,
        file_name,
        width,
        height,
        thumbnail,
    } = media;
    let transport = MediaTransport {
        identity: ContentIdentity {
            file_sha256: uploaded.file_sha256,
            file_enc_sha256: uploaded.file_enc_sha256,
            media_key: uploaded.media_key,
            direct_path: uploaded.direct_path,
            media_key_timestamp: uploaded.media_key_timestamp,
        },
        display: DisplayInfo {
            file_length: uploaded.file_length,
            mime_type,
            thumbnail,
            object_id: uploaded.object_id,
        },
    };
    let seconds = whole_seconds(details.duration_ms);

    match kind {
        MediaKind::Image => Content::Image(ImageMessage {
            caption: details.caption,
            transport,
            width,
            height,
        }),
        MediaKind::Sticker => Content::Sticker(StickerMessage {
            transport,
            width,
            height,
        }),
        MediaKind::Video => Content::Video(VideoMessage {
            caption: details.caption,
            transport,
            width,
            height,
            seconds,
            gif_playback: details.animated_image_derived,
        }),
        MediaKind::Audio => Content::Audio(AudioMessage {
            ptt: details.voice,
            transport,
            seconds,
        }),
        MediaKind::Document => Content::Document(DocumentMessage {
            file_name,
            transport,
        }),
    }
}

fn whole_seconds(duration_ms: u64) -> u32 {
    u32::try_from(duration_ms / 1000).unwrap_or(u32::MAX)
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use {
        super::*,
        crate::{thumbnail::ThumbnailDimensions, traits::UploadedMedia},
        rstest::rstest,
    };

    fn media() -> ReuploadedMedia {
        ReuploadedMedia {
            uploaded: UploadedMedia {
                file_sha256: vec![1],
                file_enc_sha256: vec![2],
                media_key: vec![3],
                direct_path: "/video/obj.enc".into(),
                object_id: "obj".into(),
                file_length: 2048,
                media_key_timestamp: 1_700_000_000,
            },
            mime_type: "video/mp4".into(),
            file_name: "clip.mp4".into(),
            width: 1920,
            height: 1080,
            thumbnail: ThumbnailDimensions {
                width: 400,
                height: 225,
            },
        }
    }

    #[rstest]
    #[case(0, 0)]
    #[case(999, 0)]
    #[case(1000, 1)]
    #[case(59_999, 59)]
    fn seconds_truncate(#[case] ms: u64, #[case] expected: u32) {
        assert_eq!(whole_seconds(ms), expected);
    }

    #[test]
    fn video_keeps_pixel_size_and_gif_flag() {
        let content = wrap_media(MediaKind::Video, media(), MediaDetails {
            caption: MessageText::new("look"),
            duration_ms: 12_345,
            animated_image_derived: true,
            ..Default::default()
        });
        let Content::Video(video) = content else {
            panic!("expected video");
        };
        assert_eq!((video.width, video.height), (1920, 1080));
        assert_eq!(video.transport.display.thumbnail.width, 400);
        assert_eq!(video.seconds, 12);
        assert!(video.gif_playback);
        assert_eq!(video.caption.text, "look");
        assert_eq!(video.transport.display.file_length, 2048);
        assert_eq!(video.transport.identity.media_key_timestamp, 1_700_000_000);
    }

    #[test]
    fn audio_carries_voice_flag() {
        let content = wrap_media(MediaKind::Audio, media(), MediaDetails {
            duration_ms: 4_500,
            voice: true,
            ..Default::default()
        });
        assert!(matches!(
            content,
            Content::Audio(AudioMessage {
                ptt: true,
                seconds: 4,
                ..
            })
        ));
    }

    #[test]
    fn document_has_file_name_only() {
        let content = wrap_media(MediaKind::Document, media(), MediaDetails {
            caption: MessageText::new("ignored"),
            ..Default::default()
        });
        let Content::Document(doc) = content else {
            panic!("expected document");
        };
        assert_eq!(doc.file_name, "clip.mp4");
    }

    #[test]
    fn image_caption_defaults_to_empty_text() {
        let content = wrap_media(MediaKind::Image, media(), MediaDetails::default());
        let Content::Image(image) = content else {
            panic!("expected image");
        };
        assert!(image.caption.is_empty());
    }

    #[test]
    fn sticker_has_no_caption() {
        let content = wrap_media(MediaKind::Sticker, media(), MediaDetails {
            caption: MessageText::new("dropped"),
            ..Default::default()
        });
        let json = serde_json::to_value(&content).unwrap();
        assert!(json["sticker"].get("caption").is_none());
        assert_eq!(json["sticker"]["width"], 1920);
    }

    #[test]
    fn unmapped_kinds_are_not_media() {
        assert_eq!(MediaKind::from_message(&MessageKind::File), Some(MediaKind::Document));
        assert_eq!(MediaKind::from_message(&MessageKind::Location), None);
        assert_eq!(MediaKind::from_message(&MessageKind::Text), None);
    }
}
