//! BBCode to HTML conversion for untrusted input: tokenize, build a validated tree, render.
//!
//! Documents with unmatched or misordered tags are returned verbatim instead of being partially rendered.

mod error;
mod parser;
mod tree;

pub mod html;

pub use error::RenderError;
pub use html::{
    escape_html, BBCodeParser, HtmlSerializer, MarkupGenerator, ParserConfig, ParserFeature,
    RenderOptions, TagDescriptor, TagFlags, TagRegistry,
};
pub use parser::{rules, tokenize, Attributes, BBParser, BBTag, Token, TokenKind, Tokenizer};
pub use tree::{ParseNode, ParseTree};

#[cfg(feature = "builtins")]
pub use html::builtins;
