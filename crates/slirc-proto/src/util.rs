//! Small helpers shared by the codec and the client.

/// Characters that introduce a room (channel) name.
pub const ROOM_PREFIXES: [char; 2] = ['#', '&'];

/// Returns true if `target` names a room rather than a nick.
#[inline]
pub fn is_room_name(target: &str) -> bool {
    target.starts_with(ROOM_PREFIXES)
}

/// Cut `s` at its first CR or LF.
///
/// Outbound frames go through this so that a caller-supplied payload can
/// never smuggle a second command onto the wire.
///
/// ```
/// use slirc_proto::util::cut_newlines;
///
/// assert_eq!(cut_newlines("JOIN #x\r\nKICK y"), "JOIN #x");
/// assert_eq!(cut_newlines("plain"), "plain");
/// ```
#[inline]
pub fn cut_newlines(s: &str) -> &str {
    match s.find(['\r', '\n']) {
        Some(idx) => &s[..idx],
        None => s,
    }
}

/// RFC 1459 lowercase for a single character.
const fn irc_lower_char(c: char) -> char {
    match c {
        '[' => '{',
        ']' => '}',
        '\\' => '|',
        '~' => '^',
        'A'..='Z' => (c as u8 + 32) as char,
        _ => c,
    }
}

/// Match `text` against a glob `pattern` (`*` and `?`), case-insensitively
/// under RFC 1459 case mapping.
///
/// ```
/// use slirc_proto::util::wildcard_match;
///
/// assert!(wildcard_match("*!*@*.example.com", "nick!user@host.Example.com"));
/// assert!(!wildcard_match("*!admin@*", "nick!user@host"));
/// ```
pub fn wildcard_match(pattern: &str, text: &str) -> bool {
    let pattern: Vec<char> = pattern.chars().map(irc_lower_char).collect();
    let text: Vec<char> = text.chars().map(irc_lower_char).collect();

    let mut p = 0;
    let mut t = 0;
    // Position after the last '*' seen, and the text index it was matched at.
    let mut star: Option<(usize, usize)> = None;

    while t < text.len() {
        if p < pattern.len() && (pattern[p] == '?' || pattern[p] == text[t]) {
            p += 1;
            t += 1;
        } else if p < pattern.len() && pattern[p] == '*' {
            star = Some((p + 1, t));
            p += 1;
        } else if let Some((after_star, matched_at)) = star {
            p = after_star;
            t = matched_at + 1;
            star = Some((after_star, t));
        } else {
            return false;
        }
    }

    pattern[p..].iter().all(|&c| c == '*')
}

/// Extract the host from a host-form ban mask (`*!*@host`).
///
/// Returns `None` for any other mask shape.
pub fn ban_mask_host(mask: &str) -> Option<&str> {
    mask.strip_prefix("*!*@").filter(|host| !host.is_empty())
}
