use std::collections::BTreeMap;

use crate::html::TagRegistry;

use self::rules::NoParseRule;

pub mod rules;

/// Attributes of a start tag, keyed by attribute name.
/// The bare `[name="value"]` form is stored under the tag's own name.
pub type Attributes<'a> = BTreeMap<&'a str, &'a str>;

/// A single lexical unit of BBCode input.
///
/// `span` is always the exact slice of input the token was read from, which is also its text once demoted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token<'a> {
    pub span: &'a str,
    pub start: usize,
    pub kind: TokenKind<'a>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BBTag<'a> {
    pub tag: &'a str,
    pub attributes: Attributes<'a>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenKind<'a> {
    Text,
    StartTag(BBTag<'a>),
    EndTag(&'a str),
}

impl<'a> Token<'a> {
    pub fn is_text(&self) -> bool {
        matches!(self.kind, TokenKind::Text)
    }

    pub fn is_start(&self, name: &str) -> bool {
        matches!(&self.kind, TokenKind::StartTag(BBTag { tag, .. }) if *tag == name)
    }

    pub fn is_end(&self, name: &str) -> bool {
        matches!(self.kind, TokenKind::EndTag(tag) if tag == name)
    }

    /// Name of the tag this token opens or closes, `None` for text.
    pub fn tag_name(&self) -> Option<&'a str> {
        match self.kind {
            TokenKind::StartTag(BBTag { tag, .. }) | TokenKind::EndTag(tag) => Some(tag),
            TokenKind::Text => None,
        }
    }

    pub fn attributes(&self) -> Option<&Attributes<'a>> {
        match &self.kind {
            TokenKind::StartTag(BBTag { attributes, .. }) => Some(attributes),
            _ => None,
        }
    }

    /// Turn a tag token back into the literal text it was read from.
    pub fn demote(self) -> Token<'a> {
        Token {
            kind: TokenKind::Text,
            ..self
        }
    }

    fn end(&self) -> usize {
        self.start + self.span.len()
    }
}

/// Splits input into text and tag tokens purely by the markup grammar.
///
/// Tag names are not checked against anything here; see [`Tokenizer`] for that.
#[doc(alias = "lexer")]
pub struct BBParser<'a> {
    input: &'a str,
    loc: usize,
    peeked: Option<Token<'a>>,
}

impl<'a> BBParser<'a> {
    pub fn new(input: &'a str) -> BBParser<'a> {
        Self {
            input,
            loc: 0,
            peeked: None,
        }
    }

    /// Returns all input text left to parse
    pub fn remaining(&self) -> &'a str {
        &self.input[self.loc..]
    }
}

impl<'a> Iterator for BBParser<'a> {
    type Item = Token<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        if let Some(token) = self.peeked.take() {
            self.loc = token.end();
            return Some(token);
        }

        let rem = self.remaining();
        if rem.is_empty() {
            return None;
        }

        // A `[` that doesn't scan as a tag is plain text, keep looking past it.
        let mut search = 0;
        let text_end = loop {
            let Some(offset) = rem[search..].find('[') else {
                break rem.len();
            };
            let at = search + offset;

            if let Some((len, kind)) = scan_tag(&rem[at..]) {
                let token = Token {
                    span: &rem[at..(at + len)],
                    start: self.loc + at,
                    kind,
                };

                if at == 0 {
                    self.loc += len;
                    return Some(token);
                }

                self.peeked = Some(token);
                break at;
            }

            search = at + 1;
        };

        let token = Token {
            span: &rem[..text_end],
            start: self.loc,
            kind: TokenKind::Text,
        };
        self.loc += text_end;
        Some(token)
    }
}

/// Byte cursor over a candidate tag. Every delimiter in the grammar is ASCII, so byte offsets are char boundaries.
struct Cursor<'a> {
    src: &'a str,
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn eat(&mut self, byte: u8) -> bool {
        if self.src.as_bytes().get(self.pos) == Some(&byte) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn take_while(&mut self, pred: impl Fn(u8) -> bool) -> &'a str {
        let start = self.pos;
        while self.src.as_bytes().get(self.pos).copied().is_some_and(&pred) {
            self.pos += 1;
        }
        &self.src[start..self.pos]
    }

    /// `"value"`, with the value made of [`is_value_byte`] bytes.
    fn quoted_value(&mut self) -> Option<&'a str> {
        if !self.eat(b'"') {
            return None;
        }
        let value = self.take_while(is_value_byte);
        self.eat(b'"').then_some(value)
    }
}

fn is_name_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_'
}

fn is_attr_name_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b".-_:;/".contains(&b)
}

fn is_value_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric()
        || b".-_:;#/".contains(&b)
        || matches!(b, b' ' | b'\t' | b'\n' | b'\r' | 0x0B | 0x0C)
}

/// Try to read a tag at the start of `src`, returning its byte length and kind.
///
/// ```text
/// end   = "[/" name "]"
/// start = "[" name [ "=" quoted ] { " " [ attr-name ] "=" quoted } "]"
/// ```
/// A bare or nameless value binds to the tag name. Only the bare form may be empty.
fn scan_tag(src: &str) -> Option<(usize, TokenKind<'_>)> {
    let mut cursor = Cursor { src, pos: 0 };
    if !cursor.eat(b'[') {
        return None;
    }

    if cursor.eat(b'/') {
        let name = cursor.take_while(is_name_byte);
        return cursor.eat(b']').then(|| (cursor.pos, TokenKind::EndTag(name)));
    }

    let tag = cursor.take_while(is_name_byte);
    let mut attributes = Attributes::new();

    if cursor.eat(b'=') {
        let value = cursor.quoted_value()?;
        attributes.insert(tag, value);
    }

    while cursor.eat(b' ') {
        let name = cursor.take_while(is_attr_name_byte);
        if !cursor.eat(b'=') {
            return None;
        }
        let value = cursor.quoted_value()?;
        if value.is_empty() {
            return None;
        }
        attributes.insert(if name.is_empty() { tag } else { name }, value);
    }

    if !cursor.eat(b']') {
        return None;
    }

    Some((cursor.pos, TokenKind::StartTag(BBTag { tag, attributes })))
}

/// Registry-aware token stream.
///
/// Tags the registry doesn't know are demoted to text, and the body of a no-nesting tag
/// comes out as a single text token between its start and end tags.
pub struct Tokenizer<'a, 'r> {
    input: &'a str,
    inner: BBParser<'a>,
    registry: &'r TagRegistry,
    rule: Option<NoParseRule<'a>>,
    pending: Option<Token<'a>>,
}

impl<'a, 'r> Tokenizer<'a, 'r> {
    pub fn new(input: &'a str, registry: &'r TagRegistry) -> Self {
        Self {
            input,
            inner: BBParser::new(input),
            registry,
            rule: None,
            pending: None,
        }
    }
}

impl<'a, 'r> Iterator for Tokenizer<'a, 'r> {
    type Item = Token<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        if let Some(token) = self.pending.take() {
            return Some(token);
        }

        loop {
            let Some(token) = self.inner.next() else {
                if let Some(rule) = self.rule.take() {
                    log::trace!(
                        target: "bbhtml::parser",
                        "no-nesting tag `{}` never closed, dropping its body",
                        rule.tag_name()
                    );
                }
                return None;
            };

            if let Some(rule) = &self.rule {
                if !rule.check_should_release(&token) {
                    // Absorbed into the literal body.
                    continue;
                }

                let body = rule.release(self.input, token.start);
                self.rule = None;
                match body {
                    Some(body) => {
                        log::trace!(target: "bbhtml::parser", "literal body {:?}", body.span);
                        self.pending = Some(token);
                        return Some(body);
                    }
                    None => return Some(token),
                }
            }

            let Some(name) = token.tag_name() else {
                return Some(token);
            };

            let Some(descriptor) = self.registry.get(name) else {
                log::trace!(target: "bbhtml::parser", "unknown tag {:?} kept as text", token.span);
                return Some(token.demote());
            };

            if descriptor.no_nesting() && token.is_start(name) {
                self.rule = Some(NoParseRule::new(name, token.end()));
            }

            return Some(token);
        }
    }
}

/// Tokenize `input` against `registry`.
pub fn tokenize<'a>(input: &'a str, registry: &TagRegistry) -> Vec<Token<'a>> {
    Tokenizer::new(input, registry).collect()
}
