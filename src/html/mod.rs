//! HTML rendering of a validated [ParseTree], and the [BBCodeParser] front door that ties the pipeline together.
//!  Rendering is all-or-nothing: a document with any unmatched tag comes back exactly as it was given.
use std::{borrow::Cow, slice};

use bitflags::bitflags;
use static_assertions::assert_impl_all;

use crate::{
    error::RenderError,
    tree::{ParseNode, ParseTree},
    Attributes,
};

pub use self::registry::{MarkupGenerator, TagDescriptor, TagFlags, TagRegistry};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParserConfig {
    pub feature_flags: ParserFeature,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            feature_flags: ParserFeature::ESCAPE_HTML,
        }
    }
}

bitflags! {
    /// Parser-wide features, fixed for the lifetime of a [BBCodeParser].
    #[derive(Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
    pub struct ParserFeature: u32 {
        /// Allow text to be HTML escaped. Per-call escaping via [RenderOptions::ESCAPE_TEXT] only applies when this is set.
        const ESCAPE_HTML = 1 << 0;

        /// All current and future feature flags.
        const ALL = u32::MAX;
    }
}

bitflags! {
    /// Per-call rendering switches.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
    pub struct RenderOptions: u32 {
        /// Emit only the content of tags, without their markup.
        const STRIP_TAGS = 1 << 0;

        /// Convert line terminators in top-level text to `<br>`.
        const INSERT_LINE_BREAKS = 1 << 1;

        /// Escape `&`, `<` and `>` in text.
        const ESCAPE_TEXT = 1 << 2;
    }
}

impl Default for RenderOptions {
    fn default() -> Self {
        RenderOptions::INSERT_LINE_BREAKS | RenderOptions::ESCAPE_TEXT
    }
}

/// Escape the three HTML metacharacters `&`, `<` and `>`. Nothing else is touched.
pub fn escape_html(text: &str) -> Cow<'_, str> {
    html_escape::encode_text(text)
}

/// Replace every `\r\n`, `\n` or `\r` with `<br>`.
fn insert_line_breaks(text: &str) -> Cow<'_, str> {
    if !text.contains(['\r', '\n']) {
        return Cow::Borrowed(text);
    }

    let mut out = String::with_capacity(text.len() + 8);
    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '\r' => {
                let _ = chars.next_if_eq(&'\n');
                out.push_str("<br>");
            }
            '\n' => out.push_str("<br>"),
            c => out.push(c),
        }
    }
    Cow::Owned(out)
}

/// A node whose children are being rendered. The root frame has no tag.
struct RenderFrame<'n, 'a> {
    tag: Option<(&'n TagDescriptor, &'n Attributes<'a>)>,
    children: slice::Iter<'n, ParseNode<'a>>,
    line_breaks: bool,
    /// Set by the previous sibling tag; skips line breaks in the next text node only.
    suppress: bool,
    out: String,
}

/// Renders parse nodes to HTML using the descriptors in a registry.
pub struct HtmlSerializer<'r> {
    registry: &'r TagRegistry,
    config: ParserConfig,
}

impl<'r> HtmlSerializer<'r> {
    pub fn new(registry: &'r TagRegistry, config: ParserConfig) -> Self {
        Self { registry, config }
    }

    /// Render `nodes` depth first. Tag content is rendered before the tag's own markup is generated around it.
    /// # Errors
    /// [RenderError::UnknownTag] if a tag node has no descriptor in this serializer's registry.
    pub fn render(
        &self,
        nodes: &[ParseNode<'_>],
        options: RenderOptions,
    ) -> Result<String, RenderError> {
        // Nesting depth comes from untrusted input, so open tags live on an explicit stack instead of the call stack.
        let mut stack = vec![RenderFrame {
            tag: None,
            children: nodes.iter(),
            line_breaks: options.contains(RenderOptions::INSERT_LINE_BREAKS),
            suppress: false,
            out: String::new(),
        }];

        loop {
            let Some(frame) = stack.last_mut() else {
                return Ok(String::new());
            };

            match frame.children.next() {
                Some(ParseNode::Text(text)) => {
                    let line_breaks = frame.line_breaks && !frame.suppress;
                    frame.out.push_str(&self.render_text(text, line_breaks, options));
                    frame.suppress = false;
                }
                Some(ParseNode::Tag {
                    name,
                    attributes,
                    children,
                }) => {
                    let descriptor =
                        self.registry
                            .get(name)
                            .ok_or_else(|| RenderError::UnknownTag {
                                name: name.to_string(),
                            })?;
                    stack.push(RenderFrame {
                        tag: Some((descriptor, attributes)),
                        children: children.iter(),
                        line_breaks: descriptor.insert_line_breaks(),
                        suppress: false,
                        out: String::new(),
                    });
                }
                None => {
                    let Some(done) = stack.pop() else {
                        return Ok(String::new());
                    };
                    let (Some((descriptor, attributes)), Some(parent)) = (done.tag, stack.last_mut())
                    else {
                        return Ok(done.out);
                    };

                    if options.contains(RenderOptions::STRIP_TAGS) {
                        parent.out.push_str(&done.out);
                    } else {
                        parent.out.push_str(&descriptor.generate_html(&done.out, attributes));
                    }
                    parent.suppress = descriptor.suppress_line_breaks();
                }
            }
        }
    }

    fn render_text<'t>(&self, text: &'t str, line_breaks: bool, options: RenderOptions) -> Cow<'t, str> {
        let escape = options.contains(RenderOptions::ESCAPE_TEXT)
            && self.config.feature_flags.contains(ParserFeature::ESCAPE_HTML);

        let text = if escape { escape_html(text) } else { Cow::Borrowed(text) };

        if !line_breaks {
            return text;
        }

        match text {
            Cow::Borrowed(text) => insert_line_breaks(text),
            Cow::Owned(text) => Cow::Owned(insert_line_breaks(&text).into_owned()),
        }
    }
}

/// Converts BBCode documents to HTML with a fixed set of tags.
///
/// ```
/// use bbhtml::{builtins, BBCodeParser};
///
/// let parser = BBCodeParser::new(builtins::default_tags());
/// assert_eq!(parser.parse_string("[b]bold[/b] & more"), "<b>bold</b> &amp; more");
/// // Unmatched tags leave the whole document untouched.
/// assert_eq!(parser.parse_string("[b]bold & more"), "[b]bold & more");
/// ```
#[derive(Debug)]
pub struct BBCodeParser {
    registry: TagRegistry,
    config: ParserConfig,
}

assert_impl_all!(BBCodeParser: Send, Sync);

impl BBCodeParser {
    pub fn new(registry: TagRegistry) -> Self {
        Self::with_config(registry, ParserConfig::default())
    }

    pub fn with_config(registry: TagRegistry, config: ParserConfig) -> Self {
        Self { registry, config }
    }

    pub fn registry(&self) -> &TagRegistry {
        &self.registry
    }

    pub fn config(&self) -> ParserConfig {
        self.config
    }

    pub fn build_tree<'a>(&self, input: &'a str) -> ParseTree<'a> {
        ParseTree::build(input, &self.registry)
    }

    pub fn serializer(&self) -> HtmlSerializer<'_> {
        HtmlSerializer::new(&self.registry, self.config)
    }

    /// Convert `input` with the [default options][RenderOptions::default].
    pub fn parse_string(&self, input: &str) -> String {
        self.parse_string_with(input, RenderOptions::default())
    }

    /// Convert `input` to HTML.
    ///
    /// If any tag in `input` is unmatched, or tags are closed out of order, `input` is returned verbatim,
    /// neither partially rendered nor escaped.
    pub fn parse_string_with(&self, input: &str, options: RenderOptions) -> String {
        let tree = self.build_tree(input);
        if !tree.is_valid() {
            log::debug!(target: "bbhtml::html", "invalid markup, returning input unchanged");
            return input.to_owned();
        }

        match self.serializer().render(tree.sub_trees(), options) {
            Ok(html) => html,
            Err(err) => {
                log::warn!(target: "bbhtml::html", "{err}, returning input unchanged");
                input.to_owned()
            }
        }
    }
}

#[cfg(feature = "builtins")]
impl Default for BBCodeParser {
    /// A parser with the [built-in tags][builtins::default_tags].
    fn default() -> Self {
        Self::new(builtins::default_tags())
    }
}

#[cfg(feature = "builtins")]
pub mod builtins;

mod registry;
