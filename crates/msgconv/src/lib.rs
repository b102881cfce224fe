//! Source-event → destination-envelope message conversion.
//!
//! One inbound chat event goes in, one ready-to-send envelope comes out:
//! text is carried over verbatim, locations are parsed from `geo:` URIs,
//! and media is downloaded, transcoded when the destination needs a
//! different container, measured, re-uploaded encrypted and wrapped in the
//! matching content variant. Reply references become quoted-message
//! metadata.
//!
//! The conversion is a single pass with no shared state; run as many as
//! you like concurrently and keep per-conversation ordering yourself.

pub mod convert;
pub mod envelope;
pub mod error;
pub mod event;
pub mod geo;
pub mod jid;
pub mod pipeline;
pub mod reply;
pub mod text;
pub mod thumbnail;
pub mod traits;
pub mod wrap;

#[cfg(test)]
mod test_support;

pub use {
    convert::{ConvertContext, ConvertOptions, DEFAULT_DESTINATION_SERVER, to_destination},
    envelope::{Content, MediaTransport, OutboundEnvelope, ReplyMetadata},
    error::{ConvertCase, Error, GeoUriError, Result, Stage},
    event::{EventType, Extensions, InboundMessage, MediaRef, MessageKind, ReplyTarget},
    geo::parse_geo_uri,
    jid::Jid,
    thumbnail::ThumbnailDimensions,
    traits::{
        DeclaredReply, MediaSource, MediaType, MediaUploader, ReplyResolver, Transcoder,
        UploadedMedia, UriMediaSource,
    },
};
