//! Single-token-lookahead recursive-descent parser for pattern tokens.

use crate::error::SyntaxError;
use crate::node::Value;

use super::lexer::{Group, Token, TokenKind};
use super::{LiteralValue, PatternNode};

pub(crate) fn parse(
    tokens: &[Token],
    source_len: usize,
    args: &[Value],
) -> Result<PatternNode, SyntaxError> {
    let mut parser = Parser {
        tokens,
        pos: 0,
        source_len,
        args,
    };
    if tokens.is_empty() {
        return Err(SyntaxError::malformed(0, "pattern is empty"));
    }
    let root = parser.parse_expr()?;
    if let Some(trailing) = parser.peek() {
        return Err(SyntaxError::malformed(
            trailing.offset,
            "unexpected token after the end of the pattern; wrap alternatives in '{...}' or '[...]'",
        ));
    }
    Ok(root)
}

struct Parser<'t> {
    tokens: &'t [Token],
    pos: usize,
    source_len: usize,
    args: &'t [Value],
}

impl<'t> Parser<'t> {
    fn peek(&self) -> Option<&'t Token> {
        self.tokens.get(self.pos)
    }

    fn next(&mut self) -> Option<&'t Token> {
        let token = self.tokens.get(self.pos)?;
        self.pos = self.pos.saturating_add(1);
        Some(token)
    }

    /// Whether the next token can begin an expression.
    fn at_expression_start(&self) -> bool {
        self.peek()
            .is_some_and(|token| !matches!(token.kind, TokenKind::Close(_)))
    }

    fn parse_expr(&mut self) -> Result<PatternNode, SyntaxError> {
        let Some(token) = self.next() else {
            return Err(SyntaxError::malformed(
                self.source_len,
                "unexpected end of pattern",
            ));
        };
        let offset = token.offset;
        match &token.kind {
            TokenKind::Open(group) => self.parse_group(*group, offset),
            TokenKind::Close(group) => Err(SyntaxError::malformed(
                offset,
                format!("unexpected '{}' without a matching '{}'", group.closer(), group.opener()),
            )),
            TokenKind::Dollar => Ok(PatternNode::Capture(self.parse_operand('$', offset)?)),
            TokenKind::Question => Ok(PatternNode::Optional(self.parse_operand('?', offset)?)),
            TokenKind::Caret => Ok(PatternNode::AncestorSearch(self.parse_operand('^', offset)?)),
            TokenKind::Bang if self.at_expression_start() => {
                Ok(PatternNode::Negation(Box::new(self.parse_expr()?)))
            }
            TokenKind::Bang => Ok(PatternNode::Literal(LiteralValue::Symbol("!".to_owned()))),
            TokenKind::Backslash => self.parse_backreference(offset),
            TokenKind::Wildcard => Ok(PatternNode::Wildcard),
            TokenKind::Ellipsis => Ok(PatternNode::AnyNonEmpty),
            TokenKind::Int(value) => Ok(PatternNode::Literal(LiteralValue::Int(*value))),
            TokenKind::Float(value) => Ok(PatternNode::Literal(LiteralValue::Float(*value))),
            TokenKind::Str(value) => Ok(PatternNode::Literal(LiteralValue::Str(value.clone()))),
            TokenKind::Symbol(name) => Ok(PatternNode::Literal(LiteralValue::Symbol(name.clone()))),
            TokenKind::Word(word) => Ok(PatternNode::Literal(resolve_word(word))),
            TokenKind::Arg(index) => self.resolve_arg(*index, offset),
        }
    }

    fn parse_operand(&mut self, marker: char, offset: usize) -> Result<Box<PatternNode>, SyntaxError> {
        if !self.at_expression_start() {
            return Err(SyntaxError::malformed(
                offset,
                format!("'{marker}' must be followed by an expression"),
            ));
        }
        self.parse_expr().map(Box::new)
    }

    fn parse_backreference(&mut self, offset: usize) -> Result<PatternNode, SyntaxError> {
        let index = match self.next().map(|token| &token.kind) {
            Some(TokenKind::Int(value)) => usize::try_from(*value).ok().filter(|index| *index > 0),
            _ => None,
        };
        index.map(PatternNode::Backreference).ok_or_else(|| {
            SyntaxError::malformed(offset, "'\\' must be followed by a capture number from 1")
        })
    }

    fn parse_group(&mut self, group: Group, offset: usize) -> Result<PatternNode, SyntaxError> {
        let mut members = Vec::new();
        loop {
            match self.peek().map(|token| (&token.kind, token.offset)) {
                None => return Err(SyntaxError::unterminated(group.opener(), offset)),
                Some((TokenKind::Close(closer), _)) if *closer == group => {
                    self.pos = self.pos.saturating_add(1);
                    break;
                }
                Some((TokenKind::Close(closer), at)) => {
                    return Err(SyntaxError::malformed(
                        at,
                        format!(
                            "expected '{}' to close '{}' at offset {offset}, found '{}'",
                            group.closer(),
                            group.opener(),
                            closer.closer()
                        ),
                    ));
                }
                Some(_) => members.push(self.parse_expr()?),
            }
        }
        Ok(match group {
            Group::Paren => PatternNode::Sequence(members),
            Group::Bracket => PatternNode::Intersection(members),
            Group::Brace => PatternNode::Union(members),
        })
    }

    fn resolve_arg(&self, index: usize, offset: usize) -> Result<PatternNode, SyntaxError> {
        let value = index
            .checked_sub(1)
            .and_then(|slot| self.args.get(slot))
            .ok_or_else(|| {
                SyntaxError::malformed(
                    offset,
                    format!("no argument bound to %{index}; {} supplied", self.args.len()),
                )
            })?;
        Ok(PatternNode::Literal(LiteralValue::Value(value.clone())))
    }
}

/// Resolves a bare word to a named constant or a symbol literal.
fn resolve_word(word: &str) -> LiteralValue {
    match word {
        "nil" => LiteralValue::Nil,
        other => LiteralValue::Symbol(other.to_owned()),
    }
}
