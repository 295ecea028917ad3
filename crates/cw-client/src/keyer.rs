//! Line-driven keyer: turns operator input into keying commands.
//!
//! The real irmc client read a straight key wired to a serial port.  This
//! client keys from stdin instead: one command per line, mapped to the two
//! engine operations.  A hardware key source would replace this module
//! without touching the session.

/// One operator command from the input stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyerCommand {
    /// Key down.
    Latch,
    /// Key up.
    Unlatch,
    /// Leave the channel and exit.
    Quit,
}

impl KeyerCommand {
    /// Parses one input line, case-insensitively.
    ///
    /// Accepted spellings: `latch`/`down`/`+` for key-down,
    /// `unlatch`/`up`/`-` for key-up, `quit`/`exit`/`q` to leave.
    /// Returns `None` for anything else, including blank lines.
    pub fn parse(line: &str) -> Option<Self> {
        match line.trim().to_ascii_lowercase().as_str() {
            "latch" | "down" | "+" => Some(Self::Latch),
            "unlatch" | "up" | "-" => Some(Self::Unlatch),
            "quit" | "exit" | "q" => Some(Self::Quit),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_accepts_all_spellings() {
        for (line, expected) in [
            ("latch", KeyerCommand::Latch),
            ("down", KeyerCommand::Latch),
            ("+", KeyerCommand::Latch),
            ("unlatch", KeyerCommand::Unlatch),
            ("up", KeyerCommand::Unlatch),
            ("-", KeyerCommand::Unlatch),
            ("quit", KeyerCommand::Quit),
            ("exit", KeyerCommand::Quit),
            ("q", KeyerCommand::Quit),
        ] {
            assert_eq!(KeyerCommand::parse(line), Some(expected), "line {line:?}");
        }
    }

    #[test]
    fn test_parse_is_case_insensitive_and_trims() {
        assert_eq!(KeyerCommand::parse("  LATCH \n"), Some(KeyerCommand::Latch));
        assert_eq!(KeyerCommand::parse("Up"), Some(KeyerCommand::Unlatch));
    }

    #[test]
    fn test_parse_rejects_unknown_and_blank_lines() {
        assert_eq!(KeyerCommand::parse(""), None);
        assert_eq!(KeyerCommand::parse("   "), None);
        assert_eq!(KeyerCommand::parse("morse"), None);
    }
}
