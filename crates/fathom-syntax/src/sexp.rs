//! S-expression front-end.
//!
//! Reads `(tag child*)` forms into [`SyntaxNode`] trees, recording the byte
//! span of every node and leaf. Children may be nested forms, integers,
//! floats, `nil`, symbols (`:name` or a bare word), or double-quoted strings.
//! A `;` starts a comment that runs to the end of the line.
//!
//! Several top-level forms are wrapped in a synthetic `begin` node spanning
//! from the first form to the last.

use crate::error::SyntaxError;
use crate::node::{Leaf, Scalar, Span, SyntaxNode, Value};

/// Tag of the node wrapping several top-level forms.
pub const BEGIN_TAG: &str = "begin";

/// Builds syntax trees from source text.
///
/// Implementations own the notation: the matcher and rewriter only see the
/// resulting [`SyntaxNode`] and its spans.
pub trait Frontend: Send + Sync {
    /// Parses `source` into a tree whose spans index into `source`.
    ///
    /// # Errors
    ///
    /// Returns [`SyntaxError::SourceParse`] when the text is not valid in
    /// this notation.
    fn parse(&self, source: &str) -> Result<SyntaxNode, SyntaxError>;
}

/// The S-expression front-end.
#[derive(Debug, Default, Clone, Copy)]
pub struct SexpFrontend;

impl Frontend for SexpFrontend {
    fn parse(&self, source: &str) -> Result<SyntaxNode, SyntaxError> {
        parse(source)
    }
}

/// Parses S-expression text into a syntax tree.
///
/// # Errors
///
/// Returns [`SyntaxError::SourceParse`] for empty input, unbalanced
/// parentheses, unterminated strings, malformed numbers, or atoms at the top
/// level.
pub fn parse(source: &str) -> Result<SyntaxNode, SyntaxError> {
    let mut reader = Reader { source, pos: 0 };
    let mut forms = Vec::new();
    loop {
        reader.skip_trivia();
        match reader.peek() {
            None => break,
            Some(b'(') => forms.push(reader.read_form()?),
            Some(b')') => return Err(SyntaxError::source_parse(reader.pos, "unexpected ')'")),
            Some(_) => {
                return Err(SyntaxError::source_parse(
                    reader.pos,
                    "expected '(' at top level",
                ));
            }
        }
    }

    if forms.len() > 1 {
        let start = forms.first().and_then(SyntaxNode::span).map_or(0, |s| s.start());
        let end = forms.last().and_then(SyntaxNode::span).map_or(0, |s| s.end());
        let children = forms.into_iter().map(Value::Node).collect();
        return Ok(SyntaxNode::new(BEGIN_TAG, children).with_span(Span::new(start, end)));
    }
    forms
        .pop()
        .ok_or_else(|| SyntaxError::source_parse(0, "empty input"))
}

struct Reader<'s> {
    source: &'s str,
    pos: usize,
}

impl<'s> Reader<'s> {
    fn peek(&self) -> Option<u8> {
        self.source.as_bytes().get(self.pos).copied()
    }

    fn bump(&mut self) {
        self.pos = self.pos.saturating_add(1);
    }

    fn skip_trivia(&mut self) {
        while let Some(byte) = self.peek() {
            match byte {
                b';' => {
                    while self.peek().is_some_and(|b| b != b'\n') {
                        self.bump();
                    }
                }
                b if b.is_ascii_whitespace() => self.bump(),
                _ => break,
            }
        }
    }

    fn read_form(&mut self) -> Result<SyntaxNode, SyntaxError> {
        let start = self.pos;
        self.bump();
        self.skip_trivia();
        let tag = self.read_tag()?;
        let mut children = Vec::new();
        loop {
            self.skip_trivia();
            match self.peek() {
                None => {
                    return Err(SyntaxError::source_parse(start, "unbalanced '(' is never closed"));
                }
                Some(b')') => {
                    self.bump();
                    return Ok(SyntaxNode::new(tag, children).with_span(Span::new(start, self.pos)));
                }
                Some(b'(') => children.push(Value::Node(self.read_form()?)),
                Some(b'"') => children.push(Value::Leaf(self.read_string()?)),
                Some(_) => children.push(Value::Leaf(self.read_atom()?)),
            }
        }
    }

    fn read_tag(&mut self) -> Result<String, SyntaxError> {
        let start = self.pos;
        let word = self.read_word();
        let tag = word.strip_prefix(':').unwrap_or(word);
        if tag.is_empty() {
            return Err(SyntaxError::source_parse(start, "expected a tag after '('"));
        }
        Ok(tag.to_owned())
    }

    fn read_word(&mut self) -> &'s str {
        let start = self.pos;
        while self
            .peek()
            .is_some_and(|b| !b.is_ascii_whitespace() && !matches!(b, b'(' | b')' | b'"' | b';'))
        {
            self.bump();
        }
        self.source.get(start..self.pos).unwrap_or_default()
    }

    fn read_atom(&mut self) -> Result<Leaf, SyntaxError> {
        let start = self.pos;
        let word = self.read_word().to_owned();
        let span = Span::new(start, self.pos);
        let scalar = classify_atom(&word).ok_or_else(|| {
            SyntaxError::source_parse(start, format!("invalid numeric literal '{word}'"))
        })?;
        Ok(Leaf::new(scalar).with_span(span))
    }

    fn read_string(&mut self) -> Result<Leaf, SyntaxError> {
        let start = self.pos;
        self.bump();
        let mut text = String::new();
        let rest = self.source.get(self.pos..).unwrap_or_default();
        let mut chars = rest.char_indices();
        while let Some((offset, ch)) = chars.next() {
            match ch {
                '"' => {
                    self.pos = self.pos.saturating_add(offset).saturating_add(1);
                    let span = Span::new(start, self.pos);
                    return Ok(Leaf::new(Scalar::Str(text)).with_span(span));
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
        Err(SyntaxError::source_parse(start, "unterminated string literal"))
    }
}

/// Resolves a bare word into a scalar, or `None` for a malformed number.
fn classify_atom(word: &str) -> Option<Scalar> {
    if word == "nil" {
        return Some(Scalar::Nil);
    }
    if let Some(symbol) = word.strip_prefix(':') {
        return Some(Scalar::Sym(symbol.to_owned()));
    }
    if !looks_numeric(word) {
        return Some(Scalar::Sym(word.to_owned()));
    }
    if let Ok(int) = word.parse::<i64>() {
        return Some(Scalar::Int(int));
    }
    word.parse::<f64>().ok().map(Scalar::Float)
}

fn looks_numeric(word: &str) -> bool {
    let digits = word.strip_prefix('-').unwrap_or(word);
    digits.bytes().next().is_some_and(|b| b.is_ascii_digit())
}
