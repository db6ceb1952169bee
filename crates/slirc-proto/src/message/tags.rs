//! IRCv3 message tags.

/// A single message tag: key and optional unescaped value.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Tag(pub String, pub Option<String>);

/// Split a raw tags section (without the leading `@`) into tags.
///
/// Empty keys are skipped. A key with `=` but nothing after it has no value.
pub fn parse_tags(raw: &str) -> Vec<Tag> {
    raw.split(';')
        .filter(|item| !item.is_empty())
        .filter_map(|item| {
            let (key, value) = match item.split_once('=') {
                Some((key, value)) => (key, Some(value)),
                None => (item, None),
            };
            if key.is_empty() {
                return None;
            }
            let value = value.filter(|v| !v.is_empty()).map(unescape_tag_value);
            Some(Tag(key.to_owned(), value))
        })
        .collect()
}

/// Unescape a tag value from wire format.
///
/// `\:` becomes `;`, `\s` a space, `\\` a backslash, `\r` and `\n` the
/// control characters. Any other escaped character stands for itself and a
/// lone trailing backslash is dropped.
pub fn unescape_tag_value(value: &str) -> String {
    let mut unescaped = String::with_capacity(value.len());
    let mut iter = value.chars();
    while let Some(c) = iter.next() {
        let r = if c == '\\' {
            match iter.next() {
                Some(':') => ';',
                Some('s') => ' ',
                Some('\\') => '\\',
                Some('r') => '\r',
                Some('n') => '\n',
                Some(c) => c,
                None => break,
            }
        } else {
            c
        };
        unescaped.push(r);
    }
    unescaped
}
