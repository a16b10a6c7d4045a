use crate::models::{Message, QuotedParent, Sender, ThreadNode, ThreadView};

/// Maximum visual indentation depth. Replies nested deeper than this render
/// at the maximum indent instead of growing unbounded. Purely presentational:
/// no reply is ever dropped or reordered by the clamp.
pub const MAX_INDENT: usize = 3;

/// Character budget for the quoted-parent excerpt shown above a reply.
const EXCERPT_CHARS: usize = 80;

/// Placeholder shown when a sender record is missing or carries no name.
const UNKNOWN_SENDER: &str = "Unknown user";

/// render_thread
///
/// Flattens a top-level [`Message`] and its reply tree into the display
/// sequence the front end renders. Each reply is emitted strictly after its
/// parent, in the order supplied by the backend; timestamps are never used
/// for sorting.
///
/// Total over its input: malformed senders degrade to a placeholder name and
/// malformed dates pass through as raw strings, so rendering cannot fail.
pub fn render_thread(root: &Message) -> ThreadView {
    let mut messages = Vec::new();
    push_subtree(root, 0, &mut messages);
    ThreadView {
        id: root.id,
        messages,
    }
}

/// Depth-first emission of a message and its replies. `level` is the true
/// nesting level; clamping happens per node in [`render_node`].
fn push_subtree(message: &Message, level: usize, out: &mut Vec<ThreadNode>) {
    out.push(render_node(message, level));
    for reply in &message.replies {
        push_subtree(reply, level + 1, out);
    }
}

/// render_node
///
/// Renders a single message at the given nesting level. A message carrying a
/// `parent` back-reference gets a compact quoted preview of that parent.
fn render_node(message: &Message, level: usize) -> ThreadNode {
    let sender = message.sender.as_ref();
    ThreadNode {
        id: message.id,
        author: sender_display_name(sender),
        avatar_url: sender.and_then(|s| s.avatar.clone().or_else(|| s.profile_picture.clone())),
        posted_at: format_timestamp(&message.created_at),
        content: message.content.clone(),
        attachment: message.file.clone(),
        indent: level.min(MAX_INDENT),
        in_reply_to: message.parent.as_deref().map(quoted_preview),
    }
}

/// sender_display_name
///
/// Joins whatever name fields the sender carries, degrading to a placeholder
/// instead of failing the render on an incomplete record.
pub fn sender_display_name(sender: Option<&Sender>) -> String {
    let Some(sender) = sender else {
        return UNKNOWN_SENDER.to_string();
    };
    match (sender.first_name.as_deref(), sender.last_name.as_deref()) {
        (Some(first), Some(last)) => format!("{} {}", first, last),
        (Some(first), None) => first.to_string(),
        (None, Some(last)) => last.to_string(),
        (None, None) => UNKNOWN_SENDER.to_string(),
    }
}

/// quoted_preview
///
/// Builds the compact parent preview shown above a reply: the parent's
/// sender name and a short form of its content.
fn quoted_preview(parent: &Message) -> QuotedParent {
    QuotedParent {
        author: sender_display_name(parent.sender.as_ref()),
        excerpt: excerpt(&parent.content),
    }
}

/// excerpt
///
/// Truncates content to the excerpt budget on a character boundary,
/// appending an ellipsis only when something was cut.
pub fn excerpt(content: &str) -> String {
    let mut chars = content.char_indices();
    match chars.nth(EXCERPT_CHARS) {
        Some((byte_index, _)) => format!("{}…", &content[..byte_index]),
        None => content.to_string(),
    }
}

/// format_timestamp
///
/// Formats a backend RFC 3339 timestamp for display. An unparseable value is
/// returned verbatim so a bad date never aborts the render.
fn format_timestamp(raw: &str) -> String {
    match chrono::DateTime::parse_from_rfc3339(raw) {
        Ok(dt) => dt.format("%d %b %Y, %H:%M").to_string(),
        Err(_) => raw.to_string(),
    }
}
