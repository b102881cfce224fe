//! Media re-upload pipeline: acquire → transcode → measure → upload.
//!
//! Stages run strictly in sequence, each consuming the previous stage's
//! output. Every blocking stage is raced against the conversion's
//! cancellation token; losing the race drops the stage future (which kills
//! an in-flight ffmpeg child) and fails the whole conversion.

use {
    msgbridge_media::{Profile, mime::OCTET_STREAM, probe_dimensions, sniff_mime},
    tokio_util::sync::CancellationToken,
    tracing::debug,
};

use crate::{
    convert::ConvertContext,
    error::{ConvertCase, Error, Result, Stage},
    event::{InboundMessage, MessageKind},
    thumbnail::ThumbnailDimensions,
    traits::{MediaType, UploadedMedia},
};

const FALLBACK_FILE_NAME: &str = "file";

/// Source bytes plus what is known about them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaBlob {
    pub data: Vec<u8>,
    pub mime_type: String,
    pub file_name: String,
}

/// Output of the pipeline, ready for wrapping.
#[derive(Debug, Clone)]
pub struct ReuploadedMedia {
    pub uploaded: UploadedMedia,
    /// Final mime type, after any transcoding.
    pub mime_type: String,
    pub file_name: String,
    /// Pixel size, declared or decoded from the image header.
    pub width: u32,
    pub height: u32,
    pub thumbnail: ThumbnailDimensions,
}

/// Re-upload the message's media to the destination.
///
/// May reclassify `msg` from image to video (animated images) and records
/// that on `msg.extensions`. Callers pass a working copy; see
/// [`crate::to_destination`].
pub async fn reupload(msg: &mut InboundMessage, ctx: &ConvertContext) -> Result<ReuploadedMedia> {
    let blob = acquire(msg, ctx).await?;
    let blob = transcode_if_needed(msg, blob, ctx).await?;
    let (width, height) = measure(msg, &blob.data);
    let thumbnail = ThumbnailDimensions::resolve(width, height, msg.kind == MessageKind::Image);

    let media_type = MediaType::from(&msg.kind);
    let MediaBlob {
        data,
        mime_type,
        file_name,
    } = blob;
    let uploaded = run_stage(&ctx.cancel, Stage::Upload, async {
        ctx.uploader
            .upload(data, media_type)
            .await
            .map_err(Error::media_upload)
    })
    .await?;
    debug!(
        %media_type,
        mime = %mime_type,
        bytes = uploaded.file_length,
        object_id = %uploaded.object_id,
        "uploaded media"
    );

    Ok(ReuploadedMedia {
        uploaded,
        mime_type,
        file_name,
        width,
        height,
        thumbnail,
    })
}

/// Download the referenced media and settle its mime type and file name.
pub async fn acquire(msg: &InboundMessage, ctx: &ConvertContext) -> Result<MediaBlob> {
    let media = msg
        .media
        .as_ref()
        .ok_or_else(|| Error::media_download("message has no media reference"))?;

    let data = run_stage(&ctx.cancel, Stage::Download, async {
        ctx.source.fetch(media).await.map_err(Error::media_download)
    })
    .await?;

    let mime_type = media
        .mime_type
        .as_deref()
        .filter(|mime| !mime.is_empty())
        .or_else(|| sniff_mime(&data))
        .unwrap_or(OCTET_STREAM)
        .to_string();
    let file_name = msg
        .declared_file_name()
        .or_else(|| Some(msg.body.as_str()).filter(|body| !body.is_empty()))
        .unwrap_or(FALLBACK_FILE_NAME)
        .to_string();

    debug!(mime = %mime_type, bytes = data.len(), "downloaded media");
    Ok(MediaBlob {
        data,
        mime_type,
        file_name,
    })
}

/// Voice notes become AAC in MP4; GIF images become H.264 video.
async fn transcode_if_needed(
    msg: &mut InboundMessage,
    blob: MediaBlob,
    ctx: &ConvertContext,
) -> Result<MediaBlob> {
    let (profile, case) = if msg.extensions.voice {
        (Profile::VoiceNote, ConvertCase::VoiceToAudio)
    } else if blob.mime_type == "image/gif" && msg.kind == MessageKind::Image {
        (Profile::AnimatedImage, ConvertCase::AnimatedImageToVideo)
    } else {
        return Ok(blob);
    };

    let MediaBlob {
        data,
        mime_type,
        file_name,
    } = blob;
    let data = run_stage(&ctx.cancel, Stage::Transcode, async {
        ctx.transcoder
            .transcode(data, &mime_type, profile)
            .await
            .map_err(|e| Error::media_convert(case, e))
    })
    .await?;

    if profile == Profile::AnimatedImage {
        msg.kind = MessageKind::Video;
        msg.extensions.animated_image_derived = true;
    }
    debug!(%profile, from = %mime_type, bytes = data.len(), "transcoded media");

    Ok(MediaBlob {
        data,
        mime_type: profile.output_mime().to_string(),
        file_name: file_name + profile.extension(),
    })
}

/// Pixel size for the envelope. Still images with no declared width are
/// measured from their header; a header that cannot be read leaves 0×0.
fn measure(msg: &InboundMessage, data: &[u8]) -> (u32, u32) {
    let (width, height) = msg
        .media
        .as_ref()
        .map_or((0, 0), |media| (media.width, media.height));
    if msg.kind != MessageKind::Image || width != 0 {
        return (width, height);
    }
    match probe_dimensions(data) {
        Ok(meta) => (meta.width, meta.height),
        Err(e) => {
            debug!(error = %e, "could not read image dimensions");
            (width, height)
        },
    }
}

async fn run_stage<T, F>(cancel: &CancellationToken, stage: Stage, fut: F) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    tokio::select! {
        biased;
        () = cancel.cancelled() => Err(Error::Cancelled { stage }),
        result = fut => result,
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use {
        super::*,
        crate::{
            event::MediaRef,
            test_support::{FakeSource, FakeTranscoder, RecordingUploader, context, tiny_png},
        },
        std::sync::Arc,
    };

    fn image(mime: Option<&str>, width: u32, height: u32) -> InboundMessage {
        InboundMessage::new(MessageKind::Image, "cat.jpg").with_media(MediaRef {
            url: "mxc://example/cat".into(),
            mime_type: mime.map(str::to_string),
            width,
            height,
            duration_ms: 0,
        })
    }

    #[tokio::test]
    async fn sniffs_mime_and_measures_undeclared_image() {
        let uploader = Arc::new(RecordingUploader::default());
        let ctx = context(FakeSource::bytes(&tiny_png(2, 2)), uploader.clone());
        let mut msg = image(None, 0, 0);

        let out = reupload(&mut msg, &ctx).await.unwrap();

        assert_eq!(out.mime_type, "image/png");
        assert_eq!((out.width, out.height), (2, 2));
        assert_eq!(out.thumbnail, ThumbnailDimensions {
            width: 2,
            height: 2
        });
        assert_eq!(uploader.calls(), vec![MediaType::Image]);
    }

    #[tokio::test]
    async fn unreadable_image_gets_square_thumbnail() {
        let ctx = context(
            FakeSource::bytes(b"not an image"),
            Arc::new(RecordingUploader::default()),
        );
        let mut msg = image(Some("image/webp"), 0, 0);

        let out = reupload(&mut msg, &ctx).await.unwrap();

        assert_eq!((out.width, out.height), (0, 0));
        assert_eq!(out.thumbnail, ThumbnailDimensions {
            width: 400,
            height: 400
        });
        assert_eq!(out.mime_type, "image/webp");
    }

    #[tokio::test]
    async fn declared_dimensions_are_not_probed() {
        let ctx = context(
            FakeSource::bytes(&tiny_png(2, 2)),
            Arc::new(RecordingUploader::default()),
        );
        let mut msg = image(Some("image/png"), 1600, 1200);

        let out = reupload(&mut msg, &ctx).await.unwrap();

        assert_eq!((out.width, out.height), (1600, 1200));
        assert_eq!(out.thumbnail, ThumbnailDimensions {
            width: 400,
            height: 300
        });
    }

    #[tokio::test]
    async fn gif_image_becomes_video() {
        let uploader = Arc::new(RecordingUploader::default());
        let mut ctx = context(FakeSource::bytes(b"GIF89a..."), uploader.clone());
        ctx.transcoder = Arc::new(FakeTranscoder::output(b"mp4"));
        let mut msg = image(Some("image/gif"), 320, 240);

        let out = reupload(&mut msg, &ctx).await.unwrap();

        assert_eq!(msg.kind, MessageKind::Video);
        assert!(msg.extensions.animated_image_derived);
        assert_eq!(out.mime_type, "video/mp4");
        assert_eq!(out.file_name, "cat.jpg.mp4");
        assert_eq!(uploader.calls(), vec![MediaType::Video]);
    }

    #[tokio::test]
    async fn gif_file_is_left_alone() {
        let ctx = context(
            FakeSource::bytes(b"GIF89a..."),
            Arc::new(RecordingUploader::default()),
        );
        let mut msg = InboundMessage::new(MessageKind::File, "anim.gif").with_media(MediaRef {
            url: "mxc://example/anim".into(),
            mime_type: Some("image/gif".into()),
            ..Default::default()
        });

        let out = reupload(&mut msg, &ctx).await.unwrap();

        assert_eq!(msg.kind, MessageKind::File);
        assert_eq!(out.mime_type, "image/gif");
        assert_eq!(out.file_name, "anim.gif");
    }

    #[tokio::test]
    async fn voice_note_is_renamed_to_m4a() {
        let uploader = Arc::new(RecordingUploader::default());
        let mut ctx = context(FakeSource::bytes(b"OggS"), uploader.clone());
        ctx.transcoder = Arc::new(FakeTranscoder::output(b"aac"));
        let mut msg = InboundMessage::new(MessageKind::Audio, "voice.ogg").with_media(MediaRef {
            url: "mxc://example/voice".into(),
            mime_type: Some("audio/ogg".into()),
            ..Default::default()
        });
        msg.extensions.voice = true;

        let out = reupload(&mut msg, &ctx).await.unwrap();

        assert!(out.file_name.ends_with(".m4a"));
        assert_eq!(out.file_name, "voice.ogg.m4a");
        assert_eq!(out.mime_type, "audio/mp4");
        assert_eq!(msg.kind, MessageKind::Audio);
        assert_eq!(uploader.calls(), vec![MediaType::Audio]);
    }

    #[tokio::test]
    async fn transcode_failure_names_the_case() {
        let mut ctx = context(
            FakeSource::bytes(b"OggS"),
            Arc::new(RecordingUploader::default()),
        );
        ctx.transcoder = Arc::new(FakeTranscoder::failing("exit status 1"));
        let mut msg = InboundMessage::new(MessageKind::Audio, "voice").with_media(MediaRef {
            url: "mxc://example/voice".into(),
            mime_type: Some("audio/ogg".into()),
            ..Default::default()
        });
        msg.extensions.voice = true;

        let err = reupload(&mut msg, &ctx).await.unwrap_err();

        assert!(matches!(err, Error::MediaConvert {
            case: ConvertCase::VoiceToAudio,
            ..
        }));
    }

    #[tokio::test]
    async fn missing_media_is_a_download_error() {
        let ctx = context(FakeSource::bytes(b""), Arc::new(RecordingUploader::default()));
        let mut msg = InboundMessage::new(MessageKind::Video, "clip.mp4");

        let err = reupload(&mut msg, &ctx).await.unwrap_err();

        assert_eq!(err.stage(), Some(Stage::Download));
    }

    #[tokio::test]
    async fn file_name_falls_back_to_body_then_placeholder() {
        let ctx = context(FakeSource::bytes(b"x"), Arc::new(RecordingUploader::default()));
        let media = MediaRef {
            url: "mxc://example/x".into(),
            ..Default::default()
        };

        let named = InboundMessage::new(MessageKind::File, "body.txt")
            .with_file_name("report.pdf")
            .with_media(media.clone());
        assert_eq!(acquire(&named, &ctx).await.unwrap().file_name, "report.pdf");

        let unnamed = InboundMessage::new(MessageKind::File, "body.txt").with_media(media.clone());
        let blob = acquire(&unnamed, &ctx).await.unwrap();
        assert_eq!(blob.file_name, "body.txt");
        assert_eq!(blob.mime_type, OCTET_STREAM);

        let empty = InboundMessage::new(MessageKind::File, "").with_media(media);
        assert_eq!(acquire(&empty, &ctx).await.unwrap().file_name, "file");
    }

    #[tokio::test]
    async fn cancelled_token_stops_before_download() {
        let uploader = Arc::new(RecordingUploader::default());
        let ctx = context(FakeSource::bytes(&tiny_png(2, 2)), uploader.clone());
        ctx.cancel.cancel();
        let mut msg = image(Some("image/png"), 1, 1);

        let err = reupload(&mut msg, &ctx).await.unwrap_err();

        assert!(matches!(err, Error::Cancelled {
            stage: Stage::Download
        }));
        assert!(uploader.calls().is_empty());
    }
}
