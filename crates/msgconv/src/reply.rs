use crate::{envelope::ReplyMetadata, event::ReplyTarget, jid::Jid};

/// Quoted-message metadata for a reply in `conversation`.
///
/// The quoted sender is addressed as `<upstream id>@<server>`.
pub fn build_reply(target: &ReplyTarget, conversation: &Jid, server: &str) -> ReplyMetadata {
    ReplyMetadata {
        stanza_id: target.stanza_id.clone(),
        remote_jid: conversation.clone(),
        participant: Jid::new(target.sender_id.to_string(), server),
    }
}
