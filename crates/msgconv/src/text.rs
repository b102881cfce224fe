use crate::{envelope::MessageText, event::InboundMessage};

/// Carry the plain body over as destination text.
///
/// The formatted body is not translated; the destination has no rich text.
// TODO: map source mentions to destination mention spans once the
// destination's mention encoding is wired into `MessageText`.
pub fn text_to_destination(msg: &InboundMessage) -> MessageText {
    MessageText::new(msg.body.clone())
}
