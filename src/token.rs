//! Hand-rolled byte-scanning tokeniser for selector text.
//!
//! The grammar is small and fixed, so unlike the crate's original
//! production-combinator framework this is a direct `&str` -> `Token` scan:
//! no generic lexeme patterns, no regex. It pulls tokens lazily, one at a
//! time, on demand from the parser.

use crate::ast::{ExprOp, Literal};
use crate::error::ParseError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum TokenKind {
    Identifier,
    String,
    Number,
    Dot,
    Star,
    Colon,
    Tilde,
    Gt,
    Comma,
    LParen,
    RParen,
    End,
}

/// A single lexical token.
///
/// `lexeme` carries the token's textual payload: the raw digits for a
/// `Number`, the unescaped contents for a `String`, the name for an
/// `Identifier`, and the literal punctuation character otherwise.
/// `ws_before` records whether whitespace (space or tab) separated this
/// token from the previous one — that is what makes the descendant
/// combinator significant.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Token {
    pub kind: TokenKind,
    pub lexeme: String,
    pub ws_before: bool,
}

impl Token {
    /// A short description used in "unexpected token" error messages.
    pub fn describe(&self) -> &str {
        &self.lexeme
    }
}

/// A cursor over selector source text producing [`Token`]s on demand.
pub(crate) struct Lexer<'s> {
    bytes: &'s [u8],
    pos: usize,
}

impl<'s> Lexer<'s> {
    pub fn new(src: &'s str) -> Self {
        Lexer {
            bytes: src.as_bytes(),
            pos: 0,
        }
    }

    fn peek_byte(&self) -> Option<u8> {
        self.bytes.get(self.pos).copied()
    }

    fn skip_ws(&mut self) -> bool {
        let start = self.pos;
        while matches!(self.peek_byte(), Some(b' ') | Some(b'\t')) {
            self.pos += 1;
        }
        self.pos != start
    }

    fn is_ident_start(b: u8) -> bool {
        b.is_ascii_alphabetic() || b == b'_'
    }

    fn is_ident_continue(b: u8) -> bool {
        b.is_ascii_alphanumeric() || b == b'_' || b == b'-'
    }

    /// Scan an identifier at the current position without consuming
    /// anything on failure. Used both by the main scanner and by the raw
    /// `:expr` argument scanner.
    fn scan_identifier(&mut self) -> Option<String> {
        let start = self.pos;
        if !matches!(self.peek_byte(), Some(b) if Self::is_ident_start(b)) {
            return None;
        }
        self.pos += 1;
        while matches!(self.peek_byte(), Some(b) if Self::is_ident_continue(b)) {
            self.pos += 1;
        }
        Some(String::from_utf8_lossy(&self.bytes[start..self.pos]).into_owned())
    }

    /// Scan a signed number (integer or decimal, with an optional
    /// exponent) without consuming anything on failure.
    fn scan_number(&mut self) -> Option<String> {
        let start = self.pos;
        if self.peek_byte() == Some(b'-') {
            self.pos += 1;
        }
        let digits_start = self.pos;
        while matches!(self.peek_byte(), Some(b'0'..=b'9')) {
            self.pos += 1;
        }
        if self.pos == digits_start {
            self.pos = start;
            return None;
        }
        if self.peek_byte() == Some(b'.') {
            let dot = self.pos;
            self.pos += 1;
            let frac_start = self.pos;
            while matches!(self.peek_byte(), Some(b'0'..=b'9')) {
                self.pos += 1;
            }
            if self.pos == frac_start {
                self.pos = dot;
            }
        }
        if matches!(self.peek_byte(), Some(b'e') | Some(b'E')) {
            let mark = self.pos;
            self.pos += 1;
            if matches!(self.peek_byte(), Some(b'+') | Some(b'-')) {
                self.pos += 1;
            }
            let exp_start = self.pos;
            while matches!(self.peek_byte(), Some(b'0'..=b'9')) {
                self.pos += 1;
            }
            if self.pos == exp_start {
                self.pos = mark;
            }
        }
        Some(String::from_utf8_lossy(&self.bytes[start..self.pos]).into_owned())
    }

    /// Scan a double-quoted string with standard JSON escapes, starting at
    /// the opening quote. Consumes through the closing quote.
    fn scan_string(&mut self) -> Result<String, ParseError> {
        debug_assert_eq!(self.peek_byte(), Some(b'"'));
        self.pos += 1;
        let mut out = String::new();
        loop {
            match self.peek_byte() {
                None => return Err(ParseError::unexpected_end()),
                Some(b'"') => {
                    self.pos += 1;
                    return Ok(out);
                }
                Some(b'\\') => {
                    self.pos += 1;
                    match self.peek_byte() {
                        Some(b'"') => {
                            out.push('"');
                            self.pos += 1;
                        }
                        Some(b'\\') => {
                            out.push('\\');
                            self.pos += 1;
                        }
                        Some(b'/') => {
                            out.push('/');
                            self.pos += 1;
                        }
                        Some(b'b') => {
                            out.push('\u{8}');
                            self.pos += 1;
                        }
                        Some(b'f') => {
                            out.push('\u{c}');
                            self.pos += 1;
                        }
                        Some(b'n') => {
                            out.push('\n');
                            self.pos += 1;
                        }
                        Some(b'r') => {
                            out.push('\r');
                            self.pos += 1;
                        }
                        Some(b't') => {
                            out.push('\t');
                            self.pos += 1;
                        }
                        Some(b'u') => {
                            self.pos += 1;
                            let cp = self.scan_hex4()?;
                            out.push(char::from_u32(cp).unwrap_or('\u{fffd}'));
                        }
                        Some(other) => return Err(ParseError::lex(other)),
                        None => return Err(ParseError::unexpected_end()),
                    }
                }
                Some(_) => {
                    // Reinterpret the remaining bytes as utf-8 to advance by
                    // whole characters rather than bytes.
                    let rest = std::str::from_utf8(&self.bytes[self.pos..])
                        .unwrap_or_default();
                    let ch = rest.chars().next().unwrap();
                    out.push(ch);
                    self.pos += ch.len_utf8();
                }
            }
        }
    }

    fn scan_hex4(&mut self) -> Result<u32, ParseError> {
        let start = self.pos;
        if self.pos + 4 > self.bytes.len() {
            return Err(ParseError::unexpected_end());
        }
        let text = std::str::from_utf8(&self.bytes[start..start + 4])
            .map_err(|_| ParseError::unexpected_end())?;
        let value = u32::from_str_radix(text, 16)
            .map_err(|_| ParseError::unexpected_token(text))?;
        self.pos += 4;
        Ok(value)
    }

    /// Produce the next structural token, or `End` once the source is
    /// exhausted.
    pub fn next_token(&mut self) -> Result<Token, ParseError> {
        let ws_before = self.skip_ws();
        let kind = match self.peek_byte() {
            None => {
                return Ok(Token {
                    kind: TokenKind::End,
                    lexeme: String::new(),
                    ws_before,
                })
            }
            Some(b'.') => {
                self.pos += 1;
                (TokenKind::Dot, ".".to_string())
            }
            Some(b'*') => {
                self.pos += 1;
                (TokenKind::Star, "*".to_string())
            }
            Some(b':') => {
                self.pos += 1;
                (TokenKind::Colon, ":".to_string())
            }
            Some(b'~') => {
                self.pos += 1;
                (TokenKind::Tilde, "~".to_string())
            }
            Some(b'>') => {
                self.pos += 1;
                (TokenKind::Gt, ">".to_string())
            }
            Some(b',') => {
                self.pos += 1;
                (TokenKind::Comma, ",".to_string())
            }
            Some(b'(') => {
                self.pos += 1;
                (TokenKind::LParen, "(".to_string())
            }
            Some(b')') => {
                self.pos += 1;
                (TokenKind::RParen, ")".to_string())
            }
            Some(b'"') => {
                let s = self.scan_string()?;
                (TokenKind::String, s)
            }
            Some(b) if b == b'-' || b.is_ascii_digit() => match self.scan_number() {
                Some(lexeme) => (TokenKind::Number, lexeme),
                // A lone '-' not followed by a digit is not a number after
                // all; report it as the unexpected symbol it is rather than
                // panicking.
                None => return Err(ParseError::lex(b)),
            },
            Some(b) if Self::is_ident_start(b) => {
                let lexeme = self.scan_identifier().expect("leading ident byte checked above");
                (TokenKind::Identifier, lexeme)
            }
            Some(other) => return Err(ParseError::lex(other)),
        };
        Ok(Token {
            kind: kind.0,
            lexeme: kind.1,
            ws_before,
        })
    }

    /// Raw-scan the operator and right-hand literal of an `:expr(...)`
    /// argument, once the parser has already consumed the left-hand `x`
    /// through the normal token stream. This bypasses the structural token
    /// set entirely: comparison operators like `<` and `==` are not valid
    /// top-level tokens anywhere else in the grammar, so they are scanned
    /// directly off the source bytes rather than through `next_token`.
    pub fn scan_expr_op(&mut self) -> Result<ExprOp, ParseError> {
        self.skip_ws();
        let op = match (self.bytes.get(self.pos), self.bytes.get(self.pos + 1)) {
            (Some(b'<'), Some(b'=')) => (ExprOp::Le, 2),
            (Some(b'>'), Some(b'=')) => (ExprOp::Ge, 2),
            (Some(b'='), Some(b'=')) => (ExprOp::Eq, 2),
            (Some(b'!'), Some(b'=')) => (ExprOp::Ne, 2),
            (Some(b'<'), _) => (ExprOp::Lt, 1),
            (Some(b'>'), _) => (ExprOp::Gt, 1),
            (Some(b), _) => return Err(ParseError::lex(*b)),
            (None, _) => return Err(ParseError::unexpected_end()),
        };
        self.pos += op.1;
        Ok(op.0)
    }

    pub fn scan_expr_literal(&mut self) -> Result<Literal, ParseError> {
        self.skip_ws();
        let lexeme = self.scan_number().ok_or_else(|| match self.peek_byte() {
            Some(b) => ParseError::lex(b),
            None => ParseError::unexpected_end(),
        })?;
        lexeme
            .parse::<f64>()
            .map(Literal::Num)
            .map_err(|_| ParseError::unexpected_token(&lexeme))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(src: &str) -> Vec<TokenKind> {
        let mut lexer = Lexer::new(src);
        let mut out = Vec::new();
        loop {
            let t = lexer.next_token().unwrap();
            let done = t.kind == TokenKind::End;
            out.push(t.kind);
            if done {
                break;
            }
        }
        out
    }

    #[test]
    fn tokenises_simple_chain() {
        use TokenKind::*;
        assert_eq!(kinds(".a > .b"), vec![Dot, Identifier, Gt, Dot, Identifier, End]);
    }

    #[test]
    fn tokenises_pseudo_with_args() {
        use TokenKind::*;
        assert_eq!(
            kinds(":nth-child(2)"),
            vec![Colon, Identifier, LParen, Number, RParen, End]
        );
    }

    #[test]
    fn whitespace_marks_descendant_boundary() {
        let mut lexer = Lexer::new(".a .b");
        let t1 = lexer.next_token().unwrap(); // Dot
        assert!(!t1.ws_before);
        let t2 = lexer.next_token().unwrap(); // Identifier "a"
        assert!(!t2.ws_before);
        let t3 = lexer.next_token().unwrap(); // Dot
        assert!(t3.ws_before);
    }

    #[test]
    fn unknown_symbol_is_lex_error() {
        let mut lexer = Lexer::new("#bad");
        let err = lexer.next_token().unwrap_err();
        assert_eq!(
            err.message(),
            "Syntax error. Unexpected symbol '#' in the query string"
        );
    }

    #[test]
    fn string_unescapes_standard_sequences() {
        let mut lexer = Lexer::new(r#"."a\tb""#);
        lexer.next_token().unwrap(); // Dot
        let t = lexer.next_token().unwrap();
        assert_eq!(t.lexeme, "a\tb");
    }

    #[test]
    fn lone_minus_is_lex_error_not_panic() {
        let mut lexer = Lexer::new("-");
        let err = lexer.next_token().unwrap_err();
        assert_eq!(
            err.message(),
            "Syntax error. Unexpected symbol '-' in the query string"
        );
    }

    #[test]
    fn expr_operator_scanning() {
        let mut lexer = Lexer::new("<160)");
        assert_eq!(lexer.scan_expr_op().unwrap(), ExprOp::Lt);
        let lit = lexer.scan_expr_literal().unwrap();
        assert_eq!(lit, Literal::Num(160.0));
    }
}
