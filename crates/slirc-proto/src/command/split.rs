//! Splitting of long message bodies.
//!
//! Servers truncate frames longer than 512 bytes, so message bodies are cut
//! into fragments before they are framed. Every fragment but the last ends
//! with [`ELLIPSIS`]; stripping that suffix and concatenating the fragments
//! gives back the original body.

/// Split length used when none (or a too-small one) is configured.
pub const DEFAULT_SPLIT_LEN: usize = 450;

/// Smallest split length honoured; anything below falls back to the default.
pub const MIN_SPLIT_LEN: usize = 13;

/// Suffix appended to every non-final fragment.
pub const ELLIPSIS: &str = "...";

/// Separators that end a sentence or clause, tried before a bare space.
const FRAGMENT_ENDS: [&str; 8] = [". ", ": ", "; ", ", ", "! ", "? ", "\" ", "' "];

/// Find where to cut `window`, preferring clause ends, then spaces.
///
/// Returns the byte index just past the separator, or `None` when the window
/// has neither (or only has one at index 0).
fn fragment_end(window: &str) -> Option<usize> {
    let clause = FRAGMENT_ENDS
        .iter()
        .filter_map(|sep| window.rfind(sep))
        .max()
        .filter(|&idx| idx > 0);
    if let Some(idx) = clause {
        return Some(idx + 2);
    }
    window.rfind(' ').filter(|&idx| idx > 0).map(|idx| idx + 1)
}

/// Largest char boundary of `s` that is `<= idx`.
fn floor_char_boundary(s: &str, mut idx: usize) -> usize {
    while idx > 0 && !s.is_char_boundary(idx) {
        idx -= 1;
    }
    idx
}

/// Split `msg` into fragments of at most `split_len` bytes.
///
/// A `split_len` below [`MIN_SPLIT_LEN`] is replaced by
/// [`DEFAULT_SPLIT_LEN`]. Each cut lands within the first `split_len - 3`
/// bytes, leaving room for the ellipsis.
///
/// ```
/// use slirc_proto::command::split_message;
///
/// let parts = split_message("foo bar baz blorp. woo woobly woo.", 23);
/// assert_eq!(parts, vec!["foo bar baz blorp. ...", "woo woobly woo."]);
/// ```
pub fn split_message(msg: &str, split_len: usize) -> Vec<String> {
    let split_len = if split_len < MIN_SPLIT_LEN {
        DEFAULT_SPLIT_LEN
    } else {
        split_len
    };
    let budget = split_len - ELLIPSIS.len();

    let mut fragments = Vec::new();
    let mut rest = msg;
    while rest.len() > split_len {
        let window = &rest[..floor_char_boundary(rest, budget)];
        let cut = fragment_end(window).unwrap_or(window.len());
        fragments.push(format!("{}{}", &rest[..cut], ELLIPSIS));
        rest = &rest[cut..];
    }
    fragments.push(rest.to_owned());
    fragments
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_message_untouched() {
        assert_eq!(split_message("hello", 450), vec!["hello"]);
        assert_eq!(split_message("", 450), vec![""]);
    }

    #[test]
    fn test_prefers_clause_end() {
        assert_eq!(
            split_message("foo bar baz blorp. woo woobly woo.", 23),
            vec!["foo bar baz blorp. ...", "woo woobly woo."]
        );
    }

    #[test]
    fn test_falls_back_to_space() {
        assert_eq!(
            split_message("abcdef ghijkl mnopqr", 13),
            vec!["abcdef ...", "ghijkl mnopqr"]
        );
    }

    #[test]
    fn test_hard_cut_without_separators() {
        let parts = split_message("abcdefghijklmnopqrstuvwxyz", 13);
        assert_eq!(parts, vec!["abcdefghij...", "klmnopqrst...", "uvwxyz"]);
    }

    #[test]
    fn test_coerces_small_split_len() {
        let msg = "x".repeat(449);
        assert_eq!(split_message(&msg, 5), vec![msg.clone()]);
        assert_eq!(split_message(&"x".repeat(451), 12).len(), 2);
    }

    #[test]
    fn test_multibyte_boundary() {
        // Two-byte chars only: an odd cut index must back off a byte.
        let msg = "éééééééééééé";
        let parts = split_message(msg, 14);
        for part in &parts {
            assert!(part.len() <= 14);
        }
        let joined: String = parts
            .iter()
            .map(|p| p.strip_suffix(ELLIPSIS).unwrap_or(p))
            .collect();
        assert_eq!(joined, msg);
    }

    #[test]
    fn test_separator_at_start_is_ignored() {
        // A clause end at index 0 does not count.
        let parts = split_message(". aaaaaaaaaaa bbbbbbbbb", 20);
        assert_eq!(parts[0], ". aaaaaaaaaaa ...");
    }
}
