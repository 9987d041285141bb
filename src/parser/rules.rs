//! Rules that change how tokens are interpreted while they're active.
use super::{Token, TokenKind};

/// Disables parsing inside a no-nesting tag: every token up to the matching end tag is literal text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoParseRule<'a> {
    tag_name: &'a str,
    body_start: usize,
}

impl<'a> NoParseRule<'a> {
    /// `body_start` is the input offset right after the tag's start tag.
    pub fn new(tag_name: &'a str, body_start: usize) -> Self {
        Self {
            tag_name,
            body_start,
        }
    }

    pub fn tag_name(&self) -> &'a str {
        self.tag_name
    }

    /// Whether `next` ends the rule's domain. Anything else is swallowed into the body.
    pub fn check_should_release(&self, next: &Token<'_>) -> bool {
        matches!(next.kind, TokenKind::EndTag(tag) if tag == self.tag_name)
    }

    /// The literal body, up to the releasing end tag at `body_end`. `None` when the body is empty.
    ///
    /// Tokens are contiguous, so the body is exactly the concatenation of every swallowed token.
    pub fn release(&self, input: &'a str, body_end: usize) -> Option<Token<'a>> {
        (body_end > self.body_start).then(|| Token {
            span: &input[self.body_start..body_end],
            start: self.body_start,
            kind: TokenKind::Text,
        })
    }
}
