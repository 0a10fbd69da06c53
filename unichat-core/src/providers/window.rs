//! Memory-window selection over a session's history
//!
//! Every generation call sends only a bounded suffix of the conversation to
//! the backend; the full history stays on the session. Backends with a
//! dedicated system channel pull the earliest system message out of the turn
//! list first.

use crate::protocol::{Message, Role};

/// The windowed turns for a backend with a dedicated system channel
#[derive(Debug)]
pub struct TurnWindow<'a> {
    /// Content of the earliest system message in the full history, if any
    pub system: Option<&'a str>,
    /// Most recent turns in original relative order, system turns excluded
    pub turns: Vec<&'a Message>,
}

/// Window for backends that keep system turns inline in the turn list.
///
/// Returns the most recent `memory_length + 1` messages in original order.
pub fn inline_window(messages: &[Message], memory_length: usize) -> Vec<&Message> {
    let keep = memory_length + 1;
    let start = messages.len().saturating_sub(keep);
    messages[start..].iter().collect()
}

/// Window for backends with a dedicated system channel.
///
/// The earliest system message is routed to the system channel and all
/// system turns are excluded from the turn list. A system slot that was
/// extracted is not counted against the window.
pub fn split_system_window(messages: &[Message], memory_length: usize) -> TurnWindow<'_> {
    let system = messages.iter().find_map(|m| match m {
        Message::System { content } => Some(content.as_str()),
        _ => None,
    });

    let turns: Vec<&Message> = messages
        .iter()
        .filter(|m| m.role() != Role::System)
        .collect();

    let keep = (memory_length + 1).saturating_sub(usize::from(system.is_some()));
    let start = turns.len().saturating_sub(keep);

    TurnWindow {
        system,
        turns: turns[start..].to_vec(),
    }
}
