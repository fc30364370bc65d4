//! Recursive-descent parser: token stream (`token`) -> selector AST (`ast`).
//!
//! Mirrors the grammar in the selector spec this engine implements (§4.2):
//! `group = compound ("," compound)*`, `compound = simple (combinator
//! simple)*`, `simple = atom+`. The parser never partially commits: on the
//! first offending token it returns an error and no partial plan.

use crate::ast::*;
use crate::error::ParseError;
use crate::token::{Lexer, Token, TokenKind};

pub(crate) struct Parser<'s> {
    lexer: Lexer<'s>,
    current: Token,
}

impl<'s> Parser<'s> {
    pub fn new(src: &'s str) -> Result<Self, ParseError> {
        let mut lexer = Lexer::new(src);
        let current = lexer.next_token()?;
        Ok(Parser { lexer, current })
    }

    fn bump(&mut self) -> Result<Token, ParseError> {
        let next = self.lexer.next_token()?;
        Ok(std::mem::replace(&mut self.current, next))
    }

    fn expect(&mut self, kind: TokenKind) -> Result<Token, ParseError> {
        if self.current.kind == kind {
            self.bump()
        } else {
            Err(self.err_unexpected())
        }
    }

    fn err_unexpected(&self) -> ParseError {
        if self.current.kind == TokenKind::End {
            ParseError::unexpected_end()
        } else {
            ParseError::unexpected_token(self.current.describe())
        }
    }

    /// Parse a full selector group and require the source to be fully
    /// consumed (no trailing garbage after the last compound).
    pub fn parse_full_group(&mut self) -> Result<Group, ParseError> {
        let group = self.parse_group()?;
        if self.current.kind != TokenKind::End {
            return Err(self.err_unexpected());
        }
        Ok(group)
    }

    /// Parse a selector group. Stops at whatever token ends it (`End` at the
    /// top level, `)` when nested inside `:has(...)`) without consuming it.
    pub fn parse_group(&mut self) -> Result<Group, ParseError> {
        let mut compounds = vec![self.parse_compound()?];
        while self.current.kind == TokenKind::Comma {
            self.bump()?;
            compounds.push(self.parse_compound()?);
        }
        Ok(Group { compounds })
    }

    fn parse_compound(&mut self) -> Result<CompoundSelector, ParseError> {
        let mut segments = vec![self.parse_simple()?];
        let mut combinators = Vec::new();
        loop {
            match self.current.kind {
                TokenKind::Gt => {
                    self.bump()?;
                    combinators.push(Combinator::Child);
                    segments.push(self.parse_simple()?);
                }
                TokenKind::Tilde => {
                    self.bump()?;
                    combinators.push(Combinator::Sibling);
                    segments.push(self.parse_simple()?);
                }
                TokenKind::Comma | TokenKind::RParen => break,
                TokenKind::End => {
                    if self.current.ws_before {
                        // Whitespace announced a descendant combinator with
                        // nothing following it.
                        return Err(ParseError::unexpected_end());
                    }
                    break;
                }
                _ if self.current.ws_before => {
                    combinators.push(Combinator::Descendant);
                    segments.push(self.parse_simple()?);
                }
                _ => break,
            }
        }
        Ok(CompoundSelector {
            segments,
            combinators,
        })
    }

    fn parse_simple(&mut self) -> Result<SimpleSelector, ParseError> {
        let mut atoms = Vec::new();
        loop {
            if !atoms.is_empty() && self.current.ws_before {
                break;
            }
            match self.atom_opt()? {
                Some(atom) => atoms.push(atom),
                None => break,
            }
        }
        if atoms.is_empty() {
            return Err(self.err_unexpected());
        }
        Ok(SimpleSelector { atoms })
    }

    fn atom_opt(&mut self) -> Result<Option<Atom>, ParseError> {
        match self.current.kind {
            TokenKind::Identifier => {
                if let Some(t) = TypeAtom::from_keyword(&self.current.lexeme) {
                    self.bump()?;
                    Ok(Some(Atom::Type(t)))
                } else {
                    Err(ParseError::unexpected_token(&self.current.lexeme))
                }
            }
            TokenKind::Star => {
                self.bump()?;
                Ok(Some(Atom::Universal))
            }
            TokenKind::Dot => {
                self.bump()?;
                let name = match self.current.kind {
                    TokenKind::Identifier | TokenKind::String => {
                        let lexeme = self.current.lexeme.clone();
                        self.bump()?;
                        lexeme
                    }
                    _ => return Err(self.err_unexpected()),
                };
                Ok(Some(Atom::Key(name)))
            }
            TokenKind::Colon => {
                self.bump()?;
                let pseudo = self.parse_pseudo()?;
                Ok(Some(Atom::Pseudo(pseudo)))
            }
            _ => Ok(None),
        }
    }

    fn parse_pseudo(&mut self) -> Result<Pseudo, ParseError> {
        let name_tok = self.expect(TokenKind::Identifier)?;
        let name = name_tok.lexeme;
        Ok(match name.as_str() {
            "root" => Pseudo::Root,
            "first-child" => Pseudo::FirstChild,
            "last-child" => Pseudo::LastChild,
            "only-child" => Pseudo::OnlyChild,
            "empty" => Pseudo::Empty,
            "nth-child" => {
                self.expect(TokenKind::LParen)?;
                let n = self.parse_positive_int()?;
                self.expect(TokenKind::RParen)?;
                Pseudo::NthChild(n)
            }
            "nth-last-child" => {
                self.expect(TokenKind::LParen)?;
                let n = self.parse_positive_int()?;
                self.expect(TokenKind::RParen)?;
                Pseudo::NthLastChild(n)
            }
            "val" => {
                self.expect(TokenKind::LParen)?;
                let lit = self.parse_literal()?;
                self.expect(TokenKind::RParen)?;
                Pseudo::Val(lit)
            }
            "contains" => {
                self.expect(TokenKind::LParen)?;
                let s = self.expect_string()?;
                self.expect(TokenKind::RParen)?;
                Pseudo::Contains(s)
            }
            "has" => {
                self.expect(TokenKind::LParen)?;
                let group = self.parse_group()?;
                self.expect(TokenKind::RParen)?;
                Pseudo::Has(group)
            }
            "expr" => {
                self.expect(TokenKind::LParen)?;
                let (op, lit) = self.parse_expr_body()?;
                self.expect(TokenKind::RParen)?;
                Pseudo::Expr(op, lit)
            }
            other => return Err(ParseError::unknown_pseudo(other)),
        })
    }

    fn parse_positive_int(&mut self) -> Result<u32, ParseError> {
        let tok = self.expect(TokenKind::Number)?;
        if tok.lexeme.contains(|c: char| matches!(c, '-' | '.' | 'e' | 'E')) {
            return Err(ParseError::unexpected_token(&tok.lexeme));
        }
        match tok.lexeme.parse::<u32>() {
            Ok(n) if n >= 1 => Ok(n),
            _ => Err(ParseError::unexpected_token(&tok.lexeme)),
        }
    }

    fn parse_literal(&mut self) -> Result<Literal, ParseError> {
        match self.current.kind {
            TokenKind::String => {
                let s = self.current.lexeme.clone();
                self.bump()?;
                Ok(Literal::Str(s))
            }
            TokenKind::Number => {
                let lexeme = self.current.lexeme.clone();
                self.bump()?;
                lexeme
                    .parse::<f64>()
                    .map(Literal::Num)
                    .map_err(|_| ParseError::unexpected_token(&lexeme))
            }
            TokenKind::Identifier if self.current.lexeme == "true" => {
                self.bump()?;
                Ok(Literal::Bool(true))
            }
            TokenKind::Identifier if self.current.lexeme == "false" => {
                self.bump()?;
                Ok(Literal::Bool(false))
            }
            _ => Err(self.err_unexpected()),
        }
    }

    fn expect_string(&mut self) -> Result<String, ParseError> {
        match self.current.kind {
            TokenKind::String => {
                let s = self.current.lexeme.clone();
                self.bump()?;
                Ok(s)
            }
            _ => Err(self.err_unexpected()),
        }
    }

    /// `:expr(x OP literal)`. The lookahead buffer already holds the
    /// prefetched `x` identifier (the only form the grammar allows as the
    /// left-hand operand); from there the comparison operator and literal
    /// are scanned directly off the lexer, bypassing the structural token
    /// set entirely since `<`/`>`/`==`/`!=` are not valid tokens anywhere
    /// else in the grammar.
    fn parse_expr_body(&mut self) -> Result<(ExprOp, Literal), ParseError> {
        if !(self.current.kind == TokenKind::Identifier && self.current.lexeme == "x") {
            return Err(self.err_unexpected());
        }
        let op = self.lexer.scan_expr_op()?;
        let lit = self.lexer.scan_expr_literal()?;
        self.current = self.lexer.next_token()?;
        Ok((op, lit))
    }
}

/// Parse selector source into an AST, requiring the whole input to be
/// consumed by a single selector group.
pub(crate) fn parse(src: &str) -> Result<Group, ParseError> {
    Parser::new(src)?.parse_full_group()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn group(src: &str) -> Group {
        parse(src).unwrap()
    }

    #[test]
    fn parses_universal() {
        let g = group("*");
        assert_eq!(g.compounds.len(), 1);
        assert_eq!(g.compounds[0].segments[0].atoms, vec![Atom::Universal]);
    }

    #[test]
    fn parses_descendant_and_child_chain() {
        let g = group(".a .b > .c");
        let c = &g.compounds[0];
        assert_eq!(c.segments.len(), 3);
        assert_eq!(
            c.combinators,
            vec![Combinator::Descendant, Combinator::Child]
        );
    }

    #[test]
    fn parses_group_disjunction() {
        let g = group("boolean, null");
        assert_eq!(g.compounds.len(), 2);
    }

    #[test]
    fn parses_nested_has() {
        let g = group(":has(:root > .preferred)");
        match &g.compounds[0].segments[0].atoms[0] {
            Atom::Pseudo(Pseudo::Has(inner)) => assert_eq!(inner.compounds.len(), 1),
            other => panic!("expected Has pseudo, got {:?}", other),
        }
    }

    #[test]
    fn parses_expr_pseudo() {
        let g = group(".weight:expr(x<160)");
        let atoms = &g.compounds[0].segments[0].atoms;
        assert!(matches!(
            atoms.last(),
            Some(Atom::Pseudo(Pseudo::Expr(ExprOp::Lt, Literal::Num(n)))) if *n == 160.0
        ));
    }

    #[test]
    fn unknown_identifier_is_unexpected_token() {
        let err = parse("fuzz.bazz").unwrap_err();
        assert_eq!(
            err.message(),
            "Syntax error. Unexpected token 'fuzz' in the query string"
        );
    }

    #[test]
    fn trailing_whitespace_is_unexpected_end() {
        let err = parse(".key ").unwrap_err();
        assert_eq!(
            err.message(),
            "Syntax error. Unexpected end of the query string"
        );
    }

    #[test]
    fn unknown_pseudo_errors() {
        let err = parse(":bogus").unwrap_err();
        assert_eq!(err.message(), "Unknown pseudo-class ':bogus'");
    }
}
