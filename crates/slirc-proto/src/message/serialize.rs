use std::fmt::{self, Display, Formatter};

use super::types::Message;

/// Whether the last parameter has to be sent in trailing (`:`) form.
fn needs_colon(arg: &str) -> bool {
    arg.is_empty() || arg.starts_with(':') || arg.contains(' ')
}

impl Display for Message {
    /// Wire form without the line terminator; the codec adds CRLF.
    ///
    /// The final parameter of PRIVMSG, NOTICE, PONG and QUIT is always sent
    /// with a leading colon, matching what servers send back.
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        if let Some(ref prefix) = self.prefix {
            write!(f, ":{} ", prefix)?;
        }

        f.write_str(&self.command)?;

        let always_trailing = matches!(
            self.command.as_str(),
            "PRIVMSG" | "NOTICE" | "PONG" | "QUIT"
        );

        if let Some((last, middle)) = self.args.split_last() {
            for arg in middle {
                write!(f, " {}", arg)?;
            }
            if always_trailing || needs_colon(last) {
                write!(f, " :{}", last)?;
            } else {
                write!(f, " {}", last)?;
            }
        }

        Ok(())
    }
}
