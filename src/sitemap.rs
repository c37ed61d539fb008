//! Support for creating sitemaps from the list of generated pages.
//!
//! [`build_sitemap`] maps page paths to prioritized [`SitemapEntry`] records
//! and [`write_sitemap`] serializes those records as a sitemaps.org `urlset`
//! document:
//!
//! ```xml
//! <?xml version="1.0" encoding="UTF-8"?>
//! <urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">
//!   <url>
//!     <loc>https://example.com/about/</loc>
//!     <priority>0.9</priority>
//!   </url>
//! </urlset>
//! ```

use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use serde::Deserialize;
use std::io::Write;
use thiserror::Error;

const SITEMAP_NS: &str = "http://www.sitemaps.org/schemas/sitemap/0.9";

/// An already-resolved output URL path for a generated page.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct PageRecord {
    pub path: String,
}

impl From<&str> for PageRecord {
    fn from(path: &str) -> PageRecord {
        PageRecord {
            path: path.to_owned(),
        }
    }
}

/// A single `<url>` in the sitemap.
#[derive(Clone, Debug, PartialEq)]
pub struct SitemapEntry {
    pub url: String,
    pub priority: f32,
}

/// A fixed sitemap entry which isn't derived from the page list (e.g., a
/// downloadable document or an archived page).
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct ExtraEntry {
    /// The path of the entry relative to the site's base URL.
    pub path: String,
    pub priority: f32,
}

/// Controls how pages are prioritized in the sitemap.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct SitemapConfig {
    /// Pages whose path starts with this prefix are blog posts.
    pub blog_prefix: String,

    /// The priority assigned to blog posts.
    pub blog_priority: f32,

    /// The priority assigned to every other page.
    pub default_priority: f32,

    /// Entries appended after all pages, in order.
    pub extras: Vec<ExtraEntry>,
}

impl Default for SitemapConfig {
    fn default() -> Self {
        SitemapConfig {
            blog_prefix: "/blog/".to_owned(),
            blog_priority: 0.7,
            default_priority: 0.9,
            extras: vec![
                ExtraEntry {
                    path: "/resume.pdf".to_owned(),
                    priority: 1.0,
                },
                ExtraEntry {
                    path: "/archived/2015-07-03/training".to_owned(),
                    priority: 0.2,
                },
            ],
        }
    }
}

impl SitemapConfig {
    /// Classifies a page path into its sitemap priority.
    pub fn priority(&self, path: &str) -> f32 {
        if path.starts_with(&self.blog_prefix) {
            self.blog_priority
        } else {
            self.default_priority
        }
    }

    /// Returns every configured priority value, for validation.
    pub(crate) fn priorities(&self) -> impl Iterator<Item = f32> + '_ {
        [self.blog_priority, self.default_priority]
            .into_iter()
            .chain(self.extras.iter().map(|e| e.priority))
    }
}

/// Builds the sitemap entries for `pages`. Every page appears exactly once
/// and in its original order, followed by the configured extra entries.
pub fn build_sitemap(base_url: &str, pages: &[PageRecord], config: &SitemapConfig) -> Vec<SitemapEntry> {
    let mut entries = Vec::with_capacity(pages.len() + config.extras.len());
    entries.extend(pages.iter().map(|page| SitemapEntry {
        url: format!("{}{}", base_url, page.path),
        priority: config.priority(&page.path),
    }));
    entries.extend(config.extras.iter().map(|extra| SitemapEntry {
        url: format!("{}{}", base_url, extra.path),
        priority: extra.priority,
    }));
    entries
}

/// Serializes `entries` as a sitemap XML document to `w`.
pub fn write_sitemap<W: Write>(entries: &[SitemapEntry], w: W) -> Result<()> {
    let mut writer = Writer::new_with_indent(w, b' ', 2);
    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
    writer.write_event(Event::Start(
        BytesStart::new("urlset").with_attributes([("xmlns", SITEMAP_NS)]),
    ))?;

    for entry in entries {
        writer.write_event(Event::Start(BytesStart::new("url")))?;
        write_text_element(&mut writer, "loc", &entry.url)?;
        write_text_element(&mut writer, "priority", &format!("{:.1}", entry.priority))?;
        writer.write_event(Event::End(BytesEnd::new("url")))?;
    }

    writer.write_event(Event::End(BytesEnd::new("urlset")))?;
    writer.into_inner().write_all(b"\n")?;
    Ok(())
}

fn write_text_element<W: Write>(writer: &mut Writer<W>, name: &str, text: &str) -> Result<()> {
    writer.write_event(Event::Start(BytesStart::new(name)))?;
    writer.write_event(Event::Text(BytesText::new(text)))?;
    writer.write_event(Event::End(BytesEnd::new(name)))?;
    Ok(())
}

type Result<T> = std::result::Result<T, Error>;

/// Represents a problem writing a sitemap.
#[derive(Debug, Error)]
pub enum Error {
    /// Returned when the underlying writer fails.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Returned when the XML writer rejects an event.
    #[error(transparent)]
    Xml(#[from] quick_xml::Error),
}
