//! Fake collaborators shared by the unit tests.
#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::{
    io::Cursor,
    sync::{Arc, Mutex},
};

use {async_trait::async_trait, msgbridge_media::Profile};

use crate::{
    convert::ConvertContext,
    event::MediaRef,
    jid::Jid,
    traits::{MediaSource, MediaType, MediaUploader, Transcoder, UploadedMedia},
};

/// PNG of the given size, all black.
pub fn tiny_png(width: u32, height: u32) -> Vec<u8> {
    let mut out = Cursor::new(Vec::new());
    image::RgbImage::new(width, height)
        .write_to(&mut out, image::ImageFormat::Png)
        .unwrap();
    out.into_inner()
}

pub struct FakeSource {
    result: Result<Vec<u8>, String>,
}

impl FakeSource {
    pub fn bytes(data: &[u8]) -> Self {
        Self {
            result: Ok(data.to_vec()),
        }
    }

    pub fn failing(message: &str) -> Self {
        Self {
            result: Err(message.to_string()),
        }
    }
}

#[async_trait]
impl MediaSource for FakeSource {
    async fn fetch(&self, _media: &MediaRef) -> anyhow::Result<Vec<u8>> {
        self.result.clone().map_err(anyhow::Error::msg)
    }
}

pub enum FakeTranscoder {
    Output(Vec<u8>),
    Failing(String),
    /// Never completes.
    Pending,
}

impl FakeTranscoder {
    pub fn output(data: &[u8]) -> Self {
        Self::Output(data.to_vec())
    }

    pub fn failing(message: &str) -> Self {
        Self::Failing(message.to_string())
    }
}

#[async_trait]
impl Transcoder for FakeTranscoder {
    async fn transcode(
        &self,
        _data: Vec<u8>,
        _input_mime: &str,
        _profile: Profile,
    ) -> anyhow::Result<Vec<u8>> {
        match self {
            Self::Output(data) => Ok(data.clone()),
            Self::Failing(message) => Err(anyhow::anyhow!("{message}")),
            Self::Pending => std::future::pending().await,
        }
    }
}

/// Uploader that remembers what it was asked to store.
#[derive(Default)]
pub struct RecordingUploader {
    calls: Mutex<Vec<MediaType>>,
    fail_with: Option<String>,
}

impl RecordingUploader {
    pub fn failing(message: &str) -> Self {
        Self {
            calls: Mutex::default(),
            fail_with: Some(message.to_string()),
        }
    }

    pub fn calls(&self) -> Vec<MediaType> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl MediaUploader for RecordingUploader {
    async fn upload(&self, data: Vec<u8>, media_type: MediaType) -> anyhow::Result<UploadedMedia> {
        let n = {
            let mut calls = self.calls.lock().unwrap();
            calls.push(media_type);
            calls.len()
        };
        if let Some(message) = &self.fail_with {
            anyhow::bail!("{message}");
        }
        Ok(UploadedMedia {
            file_sha256: vec![0x11; 32],
            file_enc_sha256: vec![0x22; 32],
            media_key: vec![0x33; 32],
            direct_path: format!("/{media_type}/obj-{n}.enc"),
            object_id: format!("obj-{n}"),
            file_length: data.len() as u64,
            media_key_timestamp: 1_700_000_000,
        })
    }
}

/// Context in the `thread@msgr` conversation with a transcoder that
/// fails if anything reaches it.
pub fn context(source: FakeSource, uploader: Arc<RecordingUploader>) -> ConvertContext {
    ConvertContext::new(
        Arc::new(source),
        Arc::new(FakeTranscoder::failing("unexpected transcode")),
        uploader,
        Jid::new("thread", "msgr"),
    )
}
