//! Media collaborators: fetch, MIME sniffing, image header probing, ffmpeg
//! transcoding and the local encrypted object store.

pub mod error;
pub mod image_ops;
pub mod mime;
pub mod source;
pub mod store;
pub mod transcode;

pub use {
    error::{Error, Result},
    image_ops::{ImageMetadata, probe_dimensions},
    mime::sniff_mime,
    source::fetch_bytes,
    store::{LocalMediaStore, StoredMedia},
    transcode::{FfmpegTranscoder, Profile},
};
