//! Tag descriptors and the name-keyed registry the parser and renderer consult.
use std::{collections::HashMap, fmt};

use bitflags::bitflags;
use static_assertions::assert_impl_all;

use crate::Attributes;

bitflags! {
    /// Behavioral switches for a single tag.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
    pub struct TagFlags: u32 {
        /// Other tags may be opened directly inside this one.
        /// Without it, nested tag syntax in the body is kept as text.
        const ALLOWS_NESTING = 1 << 0;

        /// The body is literal text, no tag inside it is parsed.
        const NO_NESTING = 1 << 1;

        /// Line terminators in the body are converted to `<br>`, regardless of the caller's setting.
        const INSERT_LINE_BREAKS = 1 << 2;

        /// The text directly following this tag (same level) does not get line breaks inserted.
        const SUPPRESS_LINE_BREAKS = 1 << 3;
    }
}

impl Default for TagFlags {
    fn default() -> Self {
        TagFlags::ALLOWS_NESTING | TagFlags::INSERT_LINE_BREAKS
    }
}

/// Produces the HTML for a tag from its descriptor, its already rendered content and its attributes.
pub type MarkupGenerator =
    Box<dyn Fn(&TagDescriptor, &str, &Attributes<'_>) -> String + Send + Sync>;

/// Describes how a single BBCode tag behaves and renders.
pub struct TagDescriptor {
    name: String,
    flags: TagFlags,
    generator: Option<MarkupGenerator>,
}

impl TagDescriptor {
    /// A tag with [default flags][TagFlags::default] that renders as `<name>content</name>`.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            flags: TagFlags::default(),
            generator: None,
        }
    }

    pub fn with_flags(mut self, flags: TagFlags) -> Self {
        self.flags = flags;
        self
    }

    pub fn with_generator<F>(mut self, generator: F) -> Self
    where
        F: Fn(&TagDescriptor, &str, &Attributes<'_>) -> String + Send + Sync + 'static,
    {
        self.generator = Some(Box::new(generator));
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn flags(&self) -> TagFlags {
        self.flags
    }

    pub fn allows_nesting(&self) -> bool {
        self.flags.contains(TagFlags::ALLOWS_NESTING)
    }

    pub fn no_nesting(&self) -> bool {
        self.flags.contains(TagFlags::NO_NESTING)
    }

    pub fn insert_line_breaks(&self) -> bool {
        self.flags.contains(TagFlags::INSERT_LINE_BREAKS)
    }

    pub fn suppress_line_breaks(&self) -> bool {
        self.flags.contains(TagFlags::SUPPRESS_LINE_BREAKS)
    }

    /// Wrap already rendered `content` in this tag's markup.
    pub fn generate_html(&self, content: &str, attributes: &Attributes<'_>) -> String {
        match &self.generator {
            Some(generator) => generator(self, content, attributes),
            None => format!("<{name}>{content}</{name}>", name = self.name),
        }
    }
}

impl fmt::Debug for TagDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TagDescriptor")
            .field("name", &self.name)
            .field("flags", &self.flags)
            .field("custom_generator", &self.generator.is_some())
            .finish()
    }
}

/// Known tags, keyed by their exact (case-sensitive) name.
#[derive(Debug, Default)]
pub struct TagRegistry {
    tags: HashMap<String, TagDescriptor>,
}

assert_impl_all!(TagRegistry: Send, Sync);

impl TagRegistry {
    /// An empty registry. Every tag in the input will be treated as text.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a tag, replacing any earlier descriptor with the same name.
    pub fn register(&mut self, tag: TagDescriptor) -> Option<TagDescriptor> {
        self.tags.insert(tag.name.clone(), tag)
    }

    pub fn get(&self, name: &str) -> Option<&TagDescriptor> {
        self.tags.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.tags.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.tags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }
}

impl Extend<TagDescriptor> for TagRegistry {
    fn extend<I: IntoIterator<Item = TagDescriptor>>(&mut self, iter: I) {
        for tag in iter {
            let _ = self.register(tag);
        }
    }
}

impl FromIterator<TagDescriptor> for TagRegistry {
    fn from_iter<I: IntoIterator<Item = TagDescriptor>>(iter: I) -> Self {
        let mut registry = Self::new();
        registry.extend(iter);
        registry
    }
}
