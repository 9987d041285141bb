//! Nested parse tree built from the token stream, with whole-document validity.
use crate::{
    html::TagRegistry,
    parser::{BBTag, Token, TokenKind, Tokenizer},
    Attributes,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseNode<'a> {
    Text(&'a str),
    Tag {
        name: &'a str,
        attributes: Attributes<'a>,
        children: Vec<ParseNode<'a>>,
    },
}

/// Top-level nodes of a document plus whether every tag in it was properly matched.
///
/// An invalid tree is still fully built, so it can be inspected, but it should not be rendered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseTree<'a> {
    sub_trees: Vec<ParseNode<'a>>,
    valid: bool,
}

/// An open tag on the builder stack. The root frame has no name.
struct Frame<'a> {
    name: Option<&'a str>,
    attributes: Attributes<'a>,
    children: Vec<ParseNode<'a>>,
    allows_nesting: bool,
}

impl<'a> Frame<'a> {
    fn root() -> Self {
        Self {
            name: None,
            attributes: Attributes::new(),
            children: vec![],
            allows_nesting: true,
        }
    }

    fn into_node(self) -> Option<ParseNode<'a>> {
        self.name.map(|name| ParseNode::Tag {
            name,
            attributes: self.attributes,
            children: self.children,
        })
    }
}

impl<'a> ParseTree<'a> {
    /// Tokenize `input` against `registry` and build its tree.
    pub fn build(input: &'a str, registry: &TagRegistry) -> ParseTree<'a> {
        Self::from_tokens(Tokenizer::new(input, registry), registry)
    }

    /// Build a tree from an already tokenized document.
    pub fn from_tokens<I>(tokens: I, registry: &TagRegistry) -> ParseTree<'a>
    where
        I: IntoIterator<Item = Token<'a>>,
    {
        let mut stack = vec![Frame::root()];
        let mut valid = true;

        for token in tokens {
            // The root frame is never popped.
            let Some(top) = stack.last_mut() else {
                break;
            };

            match token.kind {
                TokenKind::Text => top.children.push(ParseNode::Text(token.span)),
                TokenKind::StartTag(_) if !top.allows_nesting => {
                    top.children.push(ParseNode::Text(token.span))
                }
                TokenKind::StartTag(BBTag { tag, attributes }) => {
                    let allows_nesting = registry.get(tag).map_or(true, |d| d.allows_nesting());
                    stack.push(Frame {
                        name: Some(tag),
                        attributes,
                        children: vec![],
                        allows_nesting,
                    });
                }
                TokenKind::EndTag(tag) if top.name == Some(tag) => {
                    close_top(&mut stack);
                }
                TokenKind::EndTag(_) if !top.allows_nesting => {
                    top.children.push(ParseNode::Text(token.span))
                }
                TokenKind::EndTag(tag) => {
                    if valid {
                        log::debug!(
                            target: "bbhtml::tree",
                            "`[/{tag}]` at {} does not close {:?}, document is invalid",
                            token.start,
                            top.name
                        );
                    }
                    valid = false;
                    top.children.push(ParseNode::Text(token.span));
                }
            }
        }

        if stack.len() > 1 {
            if valid {
                log::debug!(
                    target: "bbhtml::tree",
                    "{} tag(s) left open, document is invalid",
                    stack.len() - 1
                );
            }
            valid = false;
            while stack.len() > 1 {
                close_top(&mut stack);
            }
        }

        let sub_trees = stack.pop().map(|root| root.children).unwrap_or_default();
        ParseTree { sub_trees, valid }
    }

    pub fn is_valid(&self) -> bool {
        self.valid
    }

    pub fn sub_trees(&self) -> &[ParseNode<'a>] {
        &self.sub_trees
    }

    pub fn into_sub_trees(mut self) -> Vec<ParseNode<'a>> {
        std::mem::take(&mut self.sub_trees)
    }
}

impl Drop for ParseTree<'_> {
    // Nesting can be as deep as the input is long; flatten instead of dropping recursively.
    fn drop(&mut self) {
        let mut pending = std::mem::take(&mut self.sub_trees);
        while let Some(node) = pending.pop() {
            if let ParseNode::Tag { mut children, .. } = node {
                pending.append(&mut children);
            }
        }
    }
}

/// Pop the top frame and attach it to its parent.
fn close_top(stack: &mut Vec<Frame<'_>>) {
    if stack.len() < 2 {
        return;
    }
    let node = stack.pop().and_then(Frame::into_node);
    if let (Some(node), Some(parent)) = (node, stack.last_mut()) {
        parent.children.push(node);
    }
}

#[cfg(test)]
mod tests;
