use std::fmt;

use super::split::split_message;
use super::types::Command;
use crate::ctcp;
use crate::util::cut_newlines;

/// Write `VERB target :text`.
fn write_message(f: &mut dyn fmt::Write, verb: &str, target: &str, text: &str) -> fmt::Result {
    write!(f, "{verb} {target} :{text}")
}

/// Write `VERB a b ... [:trailing]`.
fn write_cmd(
    f: &mut dyn fmt::Write,
    verb: &str,
    args: &[&str],
    trailing: Option<&str>,
) -> fmt::Result {
    f.write_str(verb)?;
    for arg in args {
        write!(f, " {arg}")?;
    }
    if let Some(trailing) = trailing {
        write!(f, " :{trailing}")?;
    }
    Ok(())
}

impl Command {
    /// Write the unsplit, uncut frame.
    fn write_frame(&self, f: &mut dyn fmt::Write) -> fmt::Result {
        match self {
            Command::PASS(p) => write_cmd(f, "PASS", &[p], None),
            Command::NICK(n) => write_cmd(f, "NICK", &[n], None),
            Command::USER(ident, name) => write_cmd(f, "USER", &[ident, "12", "*"], Some(name.as_str())),
            Command::JOIN(c, Some(k)) => write_cmd(f, "JOIN", &[c, k], None),
            Command::JOIN(c, None) => write_cmd(f, "JOIN", &[c], None),
            Command::PART(c, m) => write_cmd(f, "PART", &[c], m.as_deref()),
            Command::KICK(c, n, m) => write_cmd(f, "KICK", &[c, n], m.as_deref()),
            Command::QUIT(m) => write_cmd(f, "QUIT", &[], m.as_deref()),
            Command::WHOIS(n) => write_cmd(f, "WHOIS", &[n], None),
            Command::WHO(n) => write_cmd(f, "WHO", &[n], None),
            Command::PRIVMSG(t, s) => write_message(f, "PRIVMSG", t, s),
            Command::NOTICE(t, s) => write_message(f, "NOTICE", t, s),
            Command::CTCP(t, sub, body) => {
                write_message(f, "PRIVMSG", t, &ctcp::wrap(sub, body.as_deref()))
            }
            Command::CTCPREPLY(t, sub, body) => {
                write_message(f, "NOTICE", t, &ctcp::wrap(sub, body.as_deref()))
            }
            Command::TOPIC(c, t) => write_cmd(f, "TOPIC", &[c], t.as_deref()),
            Command::MODE(t, modes) => {
                let mut args: Vec<&str> = Vec::with_capacity(modes.len() + 1);
                args.push(t);
                args.extend(modes.iter().map(String::as_str));
                write_cmd(f, "MODE", &args, None)
            }
            Command::AWAY(m) => write_cmd(f, "AWAY", &[], m.as_deref()),
            Command::INVITE(n, c) => write_cmd(f, "INVITE", &[n, c], None),
            Command::OPER(u, p) => write_cmd(f, "OPER", &[u, p], None),
            Command::VHOST(u, p) => write_cmd(f, "VHOST", &[u, p], None),
            Command::PING(m) => write_cmd(f, "PING", &[], Some(m.as_str())),
            Command::PONG(m) => write_cmd(f, "PONG", &[], Some(m.as_str())),
            Command::Raw(raw) => f.write_str(raw),
        }
    }

    /// Serialise into one or more frames, without terminators.
    ///
    /// PRIVMSG, NOTICE and CTCP bodies are split with
    /// [`split_message`](super::split_message); everything else yields a
    /// single frame. Each frame is cut at its first CR or LF.
    ///
    /// ```
    /// use slirc_proto::Command;
    ///
    /// let frames = Command::privmsg("#foo", "foo bar baz blorp. woo woobly woo.").frames(23);
    /// assert_eq!(frames, vec![
    ///     "PRIVMSG #foo :foo bar baz blorp. ...",
    ///     "PRIVMSG #foo :woo woobly woo.",
    /// ]);
    /// ```
    pub fn frames(&self, split_len: usize) -> Vec<String> {
        match self {
            Command::PRIVMSG(t, s) => split_frames("PRIVMSG", t, s, None, split_len),
            Command::NOTICE(t, s) => split_frames("NOTICE", t, s, None, split_len),
            Command::CTCP(t, sub, body) => {
                split_frames("PRIVMSG", t, body.as_deref().unwrap_or(""), Some(sub.as_str()), split_len)
            }
            Command::CTCPREPLY(t, sub, body) => {
                split_frames("NOTICE", t, body.as_deref().unwrap_or(""), Some(sub.as_str()), split_len)
            }
            _ => vec![self.to_string()],
        }
    }
}

/// Split `body` and frame each fragment as `VERB target :text`, wrapping the
/// text in a CTCP payload when `ctcp_sub` is set.
fn split_frames(
    verb: &str,
    target: &str,
    body: &str,
    ctcp_sub: Option<&str>,
    split_len: usize,
) -> Vec<String> {
    split_message(body, split_len)
        .into_iter()
        .map(|part| {
            let text = match ctcp_sub {
                Some(sub) => ctcp::wrap(sub, Some(&part)),
                None => part,
            };
            let mut frame = String::new();
            // Writing into a String cannot fail.
            let _ = write_message(&mut frame, verb, target, &text);
            cut_newlines(&frame).to_owned()
        })
        .collect()
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut frame = String::new();
        self.write_frame(&mut frame)?;
        f.write_str(cut_newlines(&frame))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame(cmd: Command) -> String {
        cmd.to_string()
    }

    #[test]
    fn test_registration_commands() {
        assert_eq!(frame(Command::PASS("password".into())), "PASS password");
        assert_eq!(frame(Command::NICK("test".into())), "NICK test");
        assert_eq!(
            frame(Command::USER("ident".into(), "Real Name".into())),
            "USER ident 12 * :Real Name"
        );
    }

    #[test]
    fn test_channel_commands() {
        assert_eq!(frame(Command::JOIN("#foo".into(), None)), "JOIN #foo");
        assert_eq!(
            frame(Command::JOIN("#foo".into(), Some("key".into()))),
            "JOIN #foo key"
        );
        assert_eq!(frame(Command::PART("#foo".into(), None)), "PART #foo");
        assert_eq!(
            frame(Command::PART("#foo".into(), Some("Screw you guys...".into()))),
            "PART #foo :Screw you guys..."
        );
        assert_eq!(
            frame(Command::KICK("#foo".into(), "bar".into(), Some("bye".into()))),
            "KICK #foo bar :bye"
        );
        assert_eq!(
            frame(Command::KICK("#foo".into(), "bar".into(), None)),
            "KICK #foo bar"
        );
        assert_eq!(
            frame(Command::TOPIC("#foo".into(), Some("la la la".into()))),
            "TOPIC #foo :la la la"
        );
        assert_eq!(frame(Command::TOPIC("#foo".into(), None)), "TOPIC #foo");
        assert_eq!(
            frame(Command::MODE("#foo".into(), vec!["+o".into(), "bar".into()])),
            "MODE #foo +o bar"
        );
        assert_eq!(frame(Command::MODE("#foo".into(), vec![])), "MODE #foo");
        assert_eq!(
            frame(Command::INVITE("bar".into(), "#foo".into())),
            "INVITE bar #foo"
        );
    }

    #[test]
    fn test_misc_commands() {
        assert_eq!(frame(Command::QUIT(Some("Bye".into()))), "QUIT :Bye");
        assert_eq!(frame(Command::QUIT(None)), "QUIT");
        assert_eq!(frame(Command::AWAY(Some("lunch".into()))), "AWAY :lunch");
        assert_eq!(frame(Command::AWAY(None)), "AWAY");
        assert_eq!(frame(Command::WHOIS("somebody".into())), "WHOIS somebody");
        assert_eq!(frame(Command::WHO("#chan".into())), "WHO #chan");
        assert_eq!(frame(Command::OPER("u".into(), "p".into())), "OPER u p");
        assert_eq!(frame(Command::VHOST("u".into(), "p".into())), "VHOST u p");
        assert_eq!(frame(Command::PING("1234".into())), "PING :1234");
        assert_eq!(frame(Command::PONG("1234".into())), "PONG :1234");
    }

    #[test]
    fn test_ctcp_commands() {
        assert_eq!(
            frame(Command::action("#foo", "waves")),
            "PRIVMSG #foo :\x01ACTION waves\x01"
        );
        assert_eq!(frame(Command::version("bob")), "PRIVMSG bob :\x01VERSION\x01");
        assert_eq!(
            frame(Command::CTCPREPLY("bob".into(), "ping".into(), Some("42".into()))),
            "NOTICE bob :\x01PING 42\x01"
        );
    }

    #[test]
    fn test_raw_is_cut_at_newline() {
        assert_eq!(frame(Command::Raw("JOIN #x\r\nKICK y".into())), "JOIN #x");
        assert_eq!(frame(Command::Raw("JOIN #x\nKICK y".into())), "JOIN #x");
        assert_eq!(
            Command::privmsg("#c", "one\ntwo").frames(450),
            vec!["PRIVMSG #c :one"]
        );
    }

    #[test]
    fn test_ctcp_frames_split_body() {
        let frames = Command::CTCP("#foo".into(), "action".into(), Some("a b c d e f g h".into()))
            .frames(13);
        assert_eq!(
            frames,
            vec![
                "PRIVMSG #foo :\x01ACTION a b c d e ...\x01",
                "PRIVMSG #foo :\x01ACTION f g h\x01",
            ]
        );
        assert_eq!(
            Command::version("bob").frames(450),
            vec!["PRIVMSG bob :\x01VERSION\x01"]
        );
    }

    #[test]
    fn test_non_message_frames_unsplit() {
        let long = "x".repeat(600);
        assert_eq!(Command::PING(long.clone()).frames(13), vec![format!("PING :{long}")]);
    }
}
