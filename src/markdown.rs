//! Markdown rendering for post bodies, and plain-text excerpts for feeds.

use pulldown_cmark::{html, Event, Options, Parser, Tag};

/// Separates a post's summary from the rest of its body. When present, the
/// text before the marker becomes the post's excerpt.
pub const FOLD_TAG: &str = "<!-- more -->";

/// The maximum length (in characters) of an excerpt taken from a post without
/// a [`FOLD_TAG`].
pub const EXCERPT_LENGTH: usize = 140;

fn options() -> Options {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_FOOTNOTES);
    options.insert(Options::ENABLE_SMART_PUNCTUATION);
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_TASKLISTS);
    options
}

/// Converts markdown to HTML.
pub fn to_html(markdown: &str) -> String {
    let mut out = String::with_capacity(markdown.len() * 3 / 2);
    html::push_html(&mut out, Parser::new_ext(markdown, options()));
    out
}

/// Returns the plain-text excerpt for a post body: everything before the
/// [`FOLD_TAG`] if there is one, otherwise the first [`EXCERPT_LENGTH`]
/// characters of the body's text, cut at a word boundary.
pub fn excerpt(markdown: &str) -> String {
    match markdown.find(FOLD_TAG) {
        Some(i) => plain_text(&markdown[..i]),
        None => prune(&plain_text(markdown), EXCERPT_LENGTH),
    }
}

/// Strips all markup from `markdown`, leaving its text content with runs of
/// whitespace collapsed to single spaces.
fn plain_text(markdown: &str) -> String {
    let mut text = String::new();
    for ev in Parser::new_ext(markdown, options()) {
        match ev {
            Event::Text(s) | Event::Code(s) => text.push_str(&s),
            Event::SoftBreak
            | Event::HardBreak
            | Event::End(Tag::Paragraph)
            | Event::End(Tag::Heading(..))
            | Event::End(Tag::Item)
            | Event::End(Tag::CodeBlock(_))
            | Event::End(Tag::TableCell) => text.push(' '),
            _ => {}
        }
    }
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn prune(text: &str, length: usize) -> String {
    if text.chars().count() <= length {
        return text.to_owned();
    }

    let head: String = text.chars().take(length).collect();
    let head = match head.rfind(char::is_whitespace) {
        Some(i) => &head[..i],
        None => &head,
    };
    format!("{}…", head.trim_end())
}
