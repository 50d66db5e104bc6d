// src/logtail/parser.rs
//
// Line classification: an ordered set of matchers over the text after the
// server-thread INFO marker. First match wins; anything unmatched is dropped
// by returning `None`. No cross-line state.

/// Structured event extracted from one server log line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogEvent {
    /// In-game chat: `<player> text`.
    Chat { player: String, text: String },
    /// Death or other server notice worth echoing.
    Notice { text: String },
}

const INFO_MARKER: &str = "[Server thread/INFO]: ";

/// Trailing verbs that mark a line as a death/event notice.
const NOTICE_VERBS: &[&str] = &["died", "was slain", "fell", "drowned", "burned", "was shot"];

pub fn classify(line: &str) -> Option<LogEvent> {
    let rest = line.split_once(INFO_MARKER)?.1;
    match_chat(rest).or_else(|| match_notice(rest))
}

fn match_chat(rest: &str) -> Option<LogEvent> {
    let after = rest.strip_prefix('<')?;
    let end = after.find('>')?;
    if end == 0 {
        return None;
    }
    let player = &after[..end];
    let text = after[end + 1..].strip_prefix(' ')?;
    Some(LogEvent::Chat {
        player: player.to_string(),
        // Verbatim, no content filtering.
        text: text.to_string(),
    })
}

fn match_notice(rest: &str) -> Option<LogEvent> {
    NOTICE_VERBS.iter().find_map(|verb| {
        let prefix = rest.strip_suffix(verb)?;
        // Require at least one word before the verb.
        if !prefix.ends_with(' ') || prefix.trim().is_empty() {
            return None;
        }
        Some(LogEvent::Notice {
            text: rest.to_string(),
        })
    })
}
