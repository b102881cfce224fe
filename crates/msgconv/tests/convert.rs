#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::{io::Cursor, path::Path, sync::Arc};

use {
    msgbridge_media::{FfmpegTranscoder, LocalMediaStore},
    msgbridge_msgconv::{
        Content, ConvertContext, ConvertOptions, Error, InboundMessage, Jid, MediaRef,
        MessageKind, Stage, UriMediaSource, to_destination,
    },
    tokio_util::sync::CancellationToken,
};

fn write_png(dir: &Path, width: u32, height: u32) -> String {
    let mut buf = Cursor::new(Vec::new());
    image::RgbImage::new(width, height)
        .write_to(&mut buf, image::ImageFormat::Png)
        .unwrap();
    let path = dir.join("photo.png");
    std::fs::write(&path, buf.into_inner()).unwrap();
    format!("file://{}", path.display())
}

fn context(store: LocalMediaStore) -> ConvertContext {
    ConvertContext::new(
        Arc::new(UriMediaSource {
            max_bytes: 10 * 1024 * 1024,
        }),
        Arc::new(FfmpegTranscoder::default()),
        Arc::new(store),
        Jid::new("1234567890", "msgr"),
    )
}

#[tokio::test]
async fn image_round_trips_through_local_store() {
    let input = tempfile::tempdir().unwrap();
    let store_dir = tempfile::tempdir().unwrap();
    let store = LocalMediaStore::new(store_dir.path());
    let ctx = context(store.clone());

    let mut msg = InboundMessage::new(MessageKind::Image, "holiday snap")
        .with_file_name("photo.png")
        .with_media(MediaRef {
            url: write_png(input.path(), 1000, 500),
            ..Default::default()
        })
        .with_reply_to("mid.$earlier", 555);

    let envelope = to_destination(&mut msg, &ctx, ConvertOptions::default())
        .await
        .unwrap();

    let Content::Image(image) = envelope.content else {
        panic!("expected image content");
    };
    assert_eq!(image.caption.text, "holiday snap");
    assert_eq!((image.width, image.height), (1000, 500));

    let display = &image.transport.display;
    assert_eq!(display.mime_type, "image/png");
    assert_eq!((display.thumbnail.width, display.thumbnail.height), (400, 200));

    let identity = &image.transport.identity;
    assert!(identity.direct_path.starts_with("/image/"));
    assert!(identity.media_key_timestamp > 0);
    let plaintext = store
        .open(
            &identity.direct_path,
            &identity.media_key,
            &identity.file_enc_sha256,
        )
        .await
        .unwrap();
    assert_eq!(plaintext.len() as u64, display.file_length);

    let reply = envelope.reply.unwrap();
    assert_eq!(reply.participant.to_string(), "555@msgr");
    assert_eq!(reply.remote_jid.to_string(), "1234567890@msgr");
}

#[tokio::test]
async fn envelope_serializes_with_base64_keys() {
    let input = tempfile::tempdir().unwrap();
    let store_dir = tempfile::tempdir().unwrap();
    let path = input.path().join("notes.txt");
    std::fs::write(&path, "remember the milk").unwrap();

    let mut msg = InboundMessage::new(MessageKind::File, "notes.txt").with_media(MediaRef {
        url: path.display().to_string(),
        mime_type: Some("text/plain".into()),
        ..Default::default()
    });
    let envelope = to_destination(
        &mut msg,
        &context(LocalMediaStore::new(store_dir.path())),
        ConvertOptions::default(),
    )
    .await
    .unwrap();

    let json = serde_json::to_value(&envelope).unwrap();
    let doc = &json["content"]["document"];
    assert_eq!(doc["file_name"], "notes.txt");
    assert_eq!(doc["transport"]["display"]["file_length"], 17);
    let key = doc["transport"]["identity"]["media_key"].as_str().unwrap();
    assert_eq!(key.len(), 44);
}

#[tokio::test]
async fn missing_source_file_fails_download() {
    let store_dir = tempfile::tempdir().unwrap();
    let mut msg = InboundMessage::new(MessageKind::Video, "clip.mp4").with_media(MediaRef {
        url: "/definitely/not/here.mp4".into(),
        ..Default::default()
    });

    let err = to_destination(
        &mut msg,
        &context(LocalMediaStore::new(store_dir.path())),
        ConvertOptions::default(),
    )
    .await
    .unwrap_err();

    assert!(matches!(err, Error::MediaDownload { .. }));
}

#[tokio::test]
async fn cancelled_conversion_returns_no_envelope() {
    let input = tempfile::tempdir().unwrap();
    let store_dir = tempfile::tempdir().unwrap();
    let cancel = CancellationToken::new();
    cancel.cancel();
    let ctx = context(LocalMediaStore::new(store_dir.path())).with_cancel(cancel);
    let mut msg = InboundMessage::new(MessageKind::Image, "photo.png").with_media(MediaRef {
        url: write_png(input.path(), 4, 4),
        ..Default::default()
    });

    let err = to_destination(&mut msg, &ctx, ConvertOptions::default())
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Cancelled {
        stage: Stage::Download
    }));
    assert_eq!(std::fs::read_dir(store_dir.path()).unwrap().count(), 0);
}
