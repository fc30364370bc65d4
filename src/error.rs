use std::fmt::{Display, Formatter};

/// An error produced while tokenising or parsing selector text.
///
/// Message wording is part of the crate's contract: callers match on the
/// exact text, mirroring the grammar this engine implements.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError {
    message: String,
}

impl ParseError {
    pub(crate) fn new(message: String) -> Self {
        Self { message }
    }

    pub(crate) fn lex(byte: u8) -> Self {
        Self::new(format!(
            "Syntax error. Unexpected symbol '{}' in the query string",
            escape_byte(byte)
        ))
    }

    pub(crate) fn unexpected_token(lexeme: &str) -> Self {
        Self::new(format!(
            "Syntax error. Unexpected token '{}' in the query string",
            lexeme
        ))
    }

    pub(crate) fn unexpected_end() -> Self {
        Self::new("Syntax error. Unexpected end of the query string".to_string())
    }

    pub(crate) fn unknown_pseudo(name: &str) -> Self {
        Self::new(format!("Unknown pseudo-class ':{}'", name))
    }

    /// The message text, exactly as produced by the grammar's error contract.
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl Display for ParseError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for ParseError {}

/// Render a single byte the way the grammar's lex errors expect: printable
/// ASCII as itself, common control characters with their C-style escape,
/// anything else as `\xHH`.
fn escape_byte(byte: u8) -> String {
    match byte {
        b'\t' => "\\t".to_string(),
        b'\n' => "\\n".to_string(),
        b'\r' => "\\r".to_string(),
        0x20..=0x7e => (byte as char).to_string(),
        other => format!("\\x{:02x}", other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lex_error_escapes_control_bytes() {
        assert_eq!(
            ParseError::lex(b'#').message(),
            "Syntax error. Unexpected symbol '#' in the query string"
        );
        assert_eq!(
            ParseError::lex(b'\n').message(),
            "Syntax error. Unexpected symbol '\\n' in the query string"
        );
    }

    #[test]
    fn unknown_pseudo_message() {
        assert_eq!(
            ParseError::unknown_pseudo("bogus").message(),
            "Unknown pseudo-class ':bogus'"
        );
    }
}
