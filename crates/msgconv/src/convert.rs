//! Conversion entry point.

use std::{fmt, sync::Arc};

use {tokio_util::sync::CancellationToken, tracing::debug};

use crate::{
    envelope::{Content, Location, LocationMessage, MessageText, OutboundEnvelope},
    error::{Error, Result},
    event::{EventType, InboundMessage, MessageKind},
    geo::parse_geo_uri,
    jid::Jid,
    pipeline,
    reply::build_reply,
    text::text_to_destination,
    traits::{DeclaredReply, MediaSource, MediaUploader, ReplyResolver, Transcoder},
    wrap::{MediaDetails, MediaKind, wrap_media},
};

/// Server part for synthesized participant addresses.
pub const DEFAULT_DESTINATION_SERVER: &str = "msgr";

/// Fixed address string on location messages.
const LOCATION_ADDRESS: &str = "Earth";

const EMOTE_PREFIX: &str = "/me ";

/// Collaborators and per-conversation context for a conversion.
#[derive(Clone)]
pub struct ConvertContext {
    pub source: Arc<dyn MediaSource>,
    pub transcoder: Arc<dyn Transcoder>,
    pub uploader: Arc<dyn MediaUploader>,
    pub reply_resolver: Arc<dyn ReplyResolver>,
    /// Destination conversation the message is sent to.
    pub conversation: Jid,
    pub destination_server: String,
    pub cancel: CancellationToken,
}

impl ConvertContext {
    pub fn new(
        source: Arc<dyn MediaSource>,
        transcoder: Arc<dyn Transcoder>,
        uploader: Arc<dyn MediaUploader>,
        conversation: Jid,
    ) -> Self {
        Self {
            source,
            transcoder,
            uploader,
            reply_resolver: Arc::new(DeclaredReply),
            conversation,
            destination_server: DEFAULT_DESTINATION_SERVER.to_string(),
            cancel: CancellationToken::new(),
        }
    }

    #[must_use]
    pub fn with_cancel(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    #[must_use]
    pub fn with_destination_server(mut self, server: impl Into<String>) -> Self {
        self.destination_server = server.into();
        self
    }

    #[must_use]
    pub fn with_reply_resolver(mut self, resolver: Arc<dyn ReplyResolver>) -> Self {
        self.reply_resolver = resolver;
        self
    }
}

impl fmt::Debug for ConvertContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConvertContext")
            .field("conversation", &self.conversation)
            .field("destination_server", &self.destination_server)
            .field("cancelled", &self.cancel.is_cancelled())
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ConvertOptions {
    /// The body was already formatted by a relay and must not be touched.
    pub relay_formatted: bool,
}

/// Convert one inbound message into a destination envelope.
///
/// The conversion works on a copy of `msg`. Only when it succeeds are the
/// normalized kind and extensions written back: sticker events become
/// sticker messages, and animated images become video with
/// `extensions.animated_image_derived` set. The body is never changed, so a
/// failed attempt can be retried with the same message.
pub async fn to_destination(
    msg: &mut InboundMessage,
    ctx: &ConvertContext,
    opts: ConvertOptions,
) -> Result<OutboundEnvelope> {
    let mut work = msg.clone();
    let envelope = convert_normalized(&mut work, ctx, opts).await?;
    msg.kind = work.kind;
    msg.extensions = work.extensions;
    Ok(envelope)
}

async fn convert_normalized(
    msg: &mut InboundMessage,
    ctx: &ConvertContext,
    opts: ConvertOptions,
) -> Result<OutboundEnvelope> {
    if msg.event_type == EventType::Sticker {
        msg.kind = MessageKind::Sticker;
    }
    if msg.kind == MessageKind::Emote && !opts.relay_formatted {
        msg.body.insert_str(0, EMOTE_PREFIX);
        if let Some(formatted) = msg.formatted_body.as_mut()
            && !formatted.is_empty()
        {
            formatted.insert_str(0, EMOTE_PREFIX);
        }
    }
    debug!(kind = %msg.kind, "converting message");

    let content = if MediaKind::from_message(&msg.kind).is_some() {
        media_content(msg, ctx).await?
    } else {
        match &msg.kind {
            MessageKind::Text | MessageKind::Notice | MessageKind::Emote => {
                Content::Text(text_to_destination(msg))
            },
            MessageKind::Location => location_content(msg)?,
            other => return Err(Error::unsupported(other)),
        }
    };

    let reply = ctx
        .reply_resolver
        .resolve(msg)
        .await
        .map(|target| build_reply(&target, &ctx.conversation, &ctx.destination_server));

    debug!(
        content = content.kind(),
        reply = reply.is_some(),
        conversation = %ctx.conversation,
        "converted message"
    );
    Ok(OutboundEnvelope { content, reply })
}

async fn media_content(msg: &mut InboundMessage, ctx: &ConvertContext) -> Result<Content> {
    let media = pipeline::reupload(msg, ctx).await?;

    // The pipeline may have turned an image into a video.
    let kind = MediaKind::from_message(&msg.kind)
        .ok_or_else(|| Error::unsupported(&msg.kind))?;
    let caption = if msg
        .declared_file_name()
        .is_some_and(|name| name != msg.body)
    {
        text_to_destination(msg)
    } else {
        MessageText::default()
    };
    let details = MediaDetails {
        caption,
        duration_ms: msg.media.as_ref().map_or(0, |media| media.duration_ms),
        voice: msg.extensions.voice,
        animated_image_derived: msg.extensions.animated_image_derived,
    };
    Ok(wrap_media(kind, media, details))
}

fn location_content(msg: &InboundMessage) -> Result<Content> {
    let (latitude, longitude) = parse_geo_uri(msg.geo_uri.as_deref().unwrap_or_default())?;
    Ok(Content::Location(LocationMessage {
        location: Location {
            degrees_latitude: latitude,
            degrees_longitude: longitude,
            name: msg.body.clone(),
        },
        address: LOCATION_ADDRESS.to_string(),
    }))
}
