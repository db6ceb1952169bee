//! Mode string tokenizing.
//!
//! Turns `MODE` arguments into a list of [`ModeChange`]s without touching
//! any state. Applying the changes (and complaining about unknown flags or
//! nicks) is left to the caller, which knows the room and its members.

/// Whether a mode character is being set or cleared.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum PlusMinus {
    Plus,
    Minus,
}

impl PlusMinus {
    fn is_set(self) -> bool {
        self == PlusMinus::Plus
    }
}

/// One step of a mode string.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ModeChange {
    /// A plain flag character, known or not.
    Flag {
        /// Mode character.
        mode: char,
        /// `+` or `-`.
        set: bool,
    },
    /// `+k key` or `-k`.
    Key(Option<String>),
    /// `+l limit` or `-l`. A limit that does not parse is zero.
    Limit(Option<u32>),
    /// A privilege mode (`qaohv`) on a member.
    Privilege {
        /// Mode character.
        mode: char,
        /// Target nick, not yet checked against the room.
        nick: String,
        /// `+` or `-`.
        set: bool,
    },
    /// `+b mask` or `-b mask`.
    Ban {
        /// Ban mask as given.
        mask: String,
        /// `+` or `-`.
        set: bool,
    },
    /// A parameterised mode ran out of arguments. Only this character is
    /// skipped.
    MissingArgument {
        /// Mode character.
        mode: char,
        /// `+` or `-`.
        set: bool,
    },
}

/// Privilege mode characters, strongest first.
pub const PRIVILEGE_MODES: [char; 5] = ['q', 'a', 'o', 'h', 'v'];

/// Tokenize a room mode string and its arguments.
///
/// Characters before the first `+` or `-` count as being set. `k` and `l`
/// consume an argument only when set; privilege modes and `b` always do.
///
/// ```
/// use slirc_proto::mode::{parse_channel_modes, ModeChange};
///
/// let changes = parse_channel_modes("+kl-o", &["key", "5", "nick"]);
/// assert_eq!(changes, vec![
///     ModeChange::Key(Some("key".into())),
///     ModeChange::Limit(Some(5)),
///     ModeChange::Privilege { mode: 'o', nick: "nick".into(), set: false },
/// ]);
/// ```
pub fn parse_channel_modes<S: AsRef<str>>(modes: &str, args: &[S]) -> Vec<ModeChange> {
    use self::PlusMinus::*;

    let args: Vec<&str> = args.iter().map(|a| a.as_ref()).collect();
    let mut args = args.into_iter();
    let mut cur_mod = Plus;
    let mut res = Vec::with_capacity(modes.len());

    for c in modes.chars() {
        let set = cur_mod.is_set();
        let change = match c {
            '+' => {
                cur_mod = Plus;
                continue;
            }
            '-' => {
                cur_mod = Minus;
                continue;
            }
            'k' if !set => ModeChange::Key(None),
            'l' if !set => ModeChange::Limit(None),
            'k' => match args.next() {
                Some(key) => ModeChange::Key(Some(key.to_owned())),
                None => ModeChange::MissingArgument { mode: c, set },
            },
            'l' => match args.next() {
                Some(limit) => ModeChange::Limit(Some(limit.parse().unwrap_or(0))),
                None => ModeChange::MissingArgument { mode: c, set },
            },
            'b' => match args.next() {
                Some(mask) => ModeChange::Ban {
                    mask: mask.to_owned(),
                    set,
                },
                None => ModeChange::MissingArgument { mode: c, set },
            },
            c if PRIVILEGE_MODES.contains(&c) => match args.next() {
                Some(nick) => ModeChange::Privilege {
                    mode: c,
                    nick: nick.to_owned(),
                    set,
                },
                None => ModeChange::MissingArgument { mode: c, set },
            },
            _ => ModeChange::Flag { mode: c, set },
        };
        res.push(change);
    }

    res
}

/// Tokenize a user mode string. User modes never take arguments.
pub fn parse_user_modes(modes: &str) -> Vec<ModeChange> {
    let mut set = true;
    modes
        .chars()
        .filter_map(|c| match c {
            '+' => {
                set = true;
                None
            }
            '-' => {
                set = false;
                None
            }
            _ => Some(ModeChange::Flag { mode: c, set }),
        })
        .collect()
}
