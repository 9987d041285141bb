//! Built-in descriptors for common BBCode tags.
//!
//! None of these are wired in implicitly; pass [default_tags] (or your own pick) to [BBCodeParser::new][super::BBCodeParser::new].
use std::borrow::Cow;

use super::{escape_html, TagDescriptor, TagFlags, TagRegistry};

/// Make a value safe to place between double quotes in an HTML attribute.
fn quoted(value: &str) -> Cow<'_, str> {
    if value.contains('"') {
        Cow::Owned(value.replace('"', "&quot;"))
    } else {
        Cow::Borrowed(value)
    }
}

/// `[b]` to `<b>`.
pub fn bold() -> TagDescriptor {
    TagDescriptor::new("b")
}

/// `[i]` to `<i>`.
pub fn italic() -> TagDescriptor {
    TagDescriptor::new("i")
}

/// `[u]` to `<u>`.
pub fn underline() -> TagDescriptor {
    TagDescriptor::new("u")
}

/// `[text]`: literal content with no wrapping markup.
pub fn text() -> TagDescriptor {
    TagDescriptor::new("text")
        .with_flags(TagFlags::default() | TagFlags::NO_NESTING)
        .with_generator(|_, content, _| content.to_owned())
}

/// `[img]src[/img]` to `<img src="src" />`.
pub fn image() -> TagDescriptor {
    TagDescriptor::new("img")
        .with_generator(|_, content, _| format!("<img src=\"{}\" />", quoted(content)))
}

/// `[url]` to an anchor opening in a new tab.
///
/// The link is the bare attribute (`[url="example.com"]text[/url]`) or else the content itself, and gets
/// an `http://` prefix unless it already has an http(s) scheme. Without an attribute the prefixed link is
/// also the anchor text; an empty attribute keeps the content as text.
pub fn url() -> TagDescriptor {
    TagDescriptor::new("url").with_generator(|tag, content, attributes| {
        // `[url=""]` falls back to the content for the link but still counts as an explicit attribute.
        let explicit = attributes.get(tag.name());
        let link = match explicit {
            Some(url) if !url.is_empty() => escape_html(url),
            _ => Cow::Borrowed(content),
        };

        let link = if link.starts_with("http://") || link.starts_with("https://") {
            link.into_owned()
        } else {
            format!("http://{link}")
        };
        let text = if explicit.is_some() { content } else { link.as_str() };

        format!("<a href=\"{}\" target=\"_blank\">{text}</a>", quoted(&link))
    })
}

/// `[code]` to `<code>`, with `[code lang="rust"]` becoming `<code class="rust">`. The body is literal.
pub fn code() -> TagDescriptor {
    TagDescriptor::new("code")
        .with_flags(TagFlags::default() | TagFlags::NO_NESTING)
        .with_generator(|_, content, attributes| match attributes.get("lang") {
            Some(lang) => format!("<code class=\"{}\">{content}</code>", quoted(&escape_html(lang))),
            None => format!("<code>{content}</code>"),
        })
}

/// Every built-in tag: `b`, `i`, `u`, `text`, `img`, `url` and `code`.
pub fn default_tags() -> TagRegistry {
    [bold(), italic(), underline(), text(), image(), url(), code()]
        .into_iter()
        .collect()
}
