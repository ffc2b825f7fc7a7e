//! Tokenizer for the pattern language.
//!
//! Scans left to right, trying in order: operators, numbers, the wildcard,
//! the has-children marker, brackets, prefix markers, argument slots, string
//! literals, and finally word runs. Whitespace separates tokens and is
//! otherwise ignored.

use crate::error::SyntaxError;

/// Bracket families shared by openers and closers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Group {
    /// `(` `)`
    Paren,
    /// `[` `]`
    Bracket,
    /// `{` `}`
    Brace,
}

impl Group {
    pub(crate) const fn opener(self) -> char {
        match self {
            Self::Paren => '(',
            Self::Bracket => '[',
            Self::Brace => '{',
        }
    }

    pub(crate) const fn closer(self) -> char {
        match self {
            Self::Paren => ')',
            Self::Bracket => ']',
            Self::Brace => '}',
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum TokenKind {
    Open(Group),
    Close(Group),
    Dollar,
    Question,
    Caret,
    Bang,
    Backslash,
    Wildcard,
    Ellipsis,
    Int(i64),
    Float(f64),
    Str(String),
    /// A `:`-prefixed symbol; never resolves to a named constant.
    Symbol(String),
    /// A bare word or operator.
    Word(String),
    /// A `%N` argument slot.
    Arg(usize),
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Token {
    pub(crate) kind: TokenKind,
    pub(crate) offset: usize,
}

/// Operators recognised ahead of every other token, longest first.
const OPERATORS: [&str; 7] = ["===", "==", "!=", "+", "-", "*", "/"];

pub(crate) fn tokenize(source: &str) -> Result<Vec<Token>, SyntaxError> {
    let mut lexer = Lexer {
        source,
        pos: 0,
        tokens: Vec::new(),
    };
    lexer.run()?;
    Ok(lexer.tokens)
}

struct Lexer<'s> {
    source: &'s str,
    pos: usize,
    tokens: Vec<Token>,
}

impl<'s> Lexer<'s> {
    fn rest(&self) -> &'s str {
        self.source.get(self.pos..).unwrap_or_default()
    }

    fn advance(&mut self, bytes: usize) {
        self.pos = self.pos.saturating_add(bytes);
    }

    fn push(&mut self, kind: TokenKind, offset: usize) {
        self.tokens.push(Token { kind, offset });
    }

    fn run(&mut self) -> Result<(), SyntaxError> {
        while let Some(ch) = self.rest().chars().next() {
            if ch.is_whitespace() {
                self.advance(ch.len_utf8());
                continue;
            }
            self.lex_token(ch)?;
        }
        Ok(())
    }

    fn lex_token(&mut self, ch: char) -> Result<(), SyntaxError> {
        let start = self.pos;
        let rest = self.rest();

        if ch == '-' && rest.chars().nth(1).is_some_and(|c| c.is_ascii_digit()) {
            return self.lex_number(start);
        }
        if let Some(op) = OPERATORS.iter().find(|op| rest.starts_with(**op)) {
            self.advance(op.len());
            self.push(TokenKind::Word((*op).to_owned()), start);
            return Ok(());
        }
        if ch.is_ascii_digit() {
            return self.lex_number(start);
        }
        if rest.starts_with("...") {
            self.advance(3);
            self.push(TokenKind::Ellipsis, start);
            return Ok(());
        }
        if ch == '_' && !rest.chars().nth(1).is_some_and(is_word_char) {
            self.advance(1);
            self.push(TokenKind::Wildcard, start);
            return Ok(());
        }

        let single = match ch {
            '(' => Some(TokenKind::Open(Group::Paren)),
            ')' => Some(TokenKind::Close(Group::Paren)),
            '[' => Some(TokenKind::Open(Group::Bracket)),
            ']' => Some(TokenKind::Close(Group::Bracket)),
            '{' => Some(TokenKind::Open(Group::Brace)),
            '}' => Some(TokenKind::Close(Group::Brace)),
            '^' => Some(TokenKind::Caret),
            '?' => Some(TokenKind::Question),
            '$' => Some(TokenKind::Dollar),
            '!' => Some(TokenKind::Bang),
            '\\' => Some(TokenKind::Backslash),
            _ => None,
        };
        if let Some(kind) = single {
            self.advance(1);
            self.push(kind, start);
            return Ok(());
        }

        match ch {
            '%' => self.lex_arg(start),
            '"' => self.lex_string(start),
            ':' => self.lex_symbol(start),
            c if is_word_char(c) => {
                let word = self.take_word();
                self.push(TokenKind::Word(word.to_owned()), start);
                Ok(())
            }
            other => Err(SyntaxError::malformed(
                start,
                format!("unexpected character '{other}'"),
            )),
        }
    }

    fn lex_number(&mut self, start: usize) -> Result<(), SyntaxError> {
        let rest = self.rest();
        let sign = usize::from(rest.starts_with('-'));
        let digits_end = scan_digits(rest, sign);
        let is_float = rest.get(digits_end..).is_some_and(|tail| {
            let mut chars = tail.chars();
            chars.next() == Some('.') && chars.next().is_some_and(|c| c.is_ascii_digit())
        });
        let end = if is_float {
            scan_digits(rest, digits_end.saturating_add(1))
        } else {
            digits_end
        };
        let text = rest.get(..end).unwrap_or_default();
        let kind = if is_float {
            text.parse::<f64>().ok().map(TokenKind::Float)
        } else {
            text.parse::<i64>().ok().map(TokenKind::Int)
        };
        let Some(token) = kind else {
            return Err(SyntaxError::malformed(
                start,
                format!("numeric literal '{text}' is out of range"),
            ));
        };
        self.advance(end);
        self.push(token, start);
        Ok(())
    }

    fn lex_arg(&mut self, start: usize) -> Result<(), SyntaxError> {
        let rest = self.rest();
        let end = scan_digits(rest, 1);
        let index = rest
            .get(1..end)
            .and_then(|digits| digits.parse::<usize>().ok())
            .filter(|index| *index > 0)
            .ok_or_else(|| {
                SyntaxError::malformed(start, "'%' must be followed by an argument number from 1")
            })?;
        self.advance(end);
        self.push(TokenKind::Arg(index), start);
        Ok(())
    }

    fn lex_string(&mut self, start: usize) -> Result<(), SyntaxError> {
        let mut text = String::new();
        let mut chars = self.rest().char_indices().skip(1);
        while let Some((offset, ch)) = chars.next() {
            match ch {
                '"' => {
                    self.advance(offset.saturating_add(1));
                    self.push(TokenKind::Str(text), start);
                    return Ok(());
                }
                '\\' => match chars.next() {
                    Some((_, 'n')) => text.push('\n'),
                    Some((_, 't')) => text.push('\t'),
                    Some((_, escaped)) => text.push(escaped),
                    None => break,
                },
                other => text.push(other),
            }
        }
        Err(SyntaxError::malformed(start, "unterminated string literal"))
    }

    fn lex_symbol(&mut self, start: usize) -> Result<(), SyntaxError> {
        self.advance(1);
        let rest = self.rest();
        if let Some(op) = OPERATORS.iter().find(|op| rest.starts_with(**op)) {
            self.advance(op.len());
            self.push(TokenKind::Symbol((*op).to_owned()), start);
            return Ok(());
        }
        if !rest.chars().next().is_some_and(is_word_char) {
            return Err(SyntaxError::malformed(start, "':' must be followed by a name"));
        }
        let word = self.take_word();
        self.push(TokenKind::Symbol(word.to_owned()), start);
        Ok(())
    }

    /// Consumes a word run plus an optional `!`, `?` or `=` suffix.
    fn take_word(&mut self) -> &'s str {
        let rest = self.rest();
        let mut end = rest
            .char_indices()
            .find(|(_, c)| !is_word_char(*c))
            .map_or(rest.len(), |(index, _)| index);
        if rest
            .get(end..)
            .and_then(|tail| tail.chars().next())
            .is_some_and(|c| matches!(c, '!' | '?' | '='))
        {
            end = end.saturating_add(1);
        }
        self.advance(end);
        rest.get(..end).unwrap_or_default()
    }
}

fn is_word_char(ch: char) -> bool {
    ch.is_alphanumeric() || ch == '_'
}

/// Returns the offset of the first non-digit at or after `from`.
fn scan_digits(text: &str, from: usize) -> usize {
    text.get(from..).map_or(from, |tail| {
        tail.bytes()
            .position(|b| !b.is_ascii_digit())
            .map_or(text.len(), |index| from.saturating_add(index))
    })
}
