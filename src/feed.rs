//! Support for creating RSS and Atom feeds from a list of posts.
//!
//! [`build_feed`] reshapes [`ContentRecord`]s into [`FeedEntry`]s with
//! absolute URLs; [`write_rss`] and [`write_atom`] serialize those entries.

use crate::config::{Author, SiteMetadata};
use atom_syndication::{
    ContentBuilder, EntryBuilder, Error as AtomError, FeedBuilder, LinkBuilder, Person,
    PersonBuilder, Text,
};
use chrono::{DateTime, FixedOffset, NaiveDate, NaiveTime, TimeZone, Utc};
use rss::validation::{Validate, ValidationError};
use rss::{ChannelBuilder, Error as RssError, GuidBuilder, ItemBuilder};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::io::Write;
use thiserror::Error;

const CONTENT_NS_PREFIX: &str = "content";
const CONTENT_NS: &str = "http://purl.org/rss/1.0/modules/content/";

/// A single blog post's rendered output.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct ContentRecord {
    pub title: String,
    pub publish_date: NaiveDate,
    pub excerpt_text: String,
    pub body_html: String,

    /// The site-relative path of the post's page (e.g.
    /// `/blog/2021-03-15/hello-world`).
    pub page_path: String,
}

/// A single feed item.
#[derive(Clone, Debug, PartialEq)]
pub struct FeedEntry {
    pub title: String,
    pub description: String,
    pub date: NaiveDate,

    /// The absolute URL of the post. Always identical to `guid`.
    pub url: String,
    pub guid: String,

    /// The full rendered body, for readers that show content inline.
    pub content_html: String,
}

/// Creates feed entries for `posts`. Posts are expected to arrive sorted by
/// publish date (most recent first); the output mirrors the input order
/// exactly.
pub fn build_feed(site: &SiteMetadata, posts: &[ContentRecord]) -> Vec<FeedEntry> {
    posts
        .iter()
        .map(|post| {
            let url = format!("{}{}", site.base_url, post.page_path);
            FeedEntry {
                title: post.title.clone(),
                description: post.excerpt_text.clone(),
                date: post.publish_date,
                guid: url.clone(),
                url,
                content_html: post.body_html.clone(),
            }
        })
        .collect()
}

/// Serializes `entries` as an RSS 2.0 channel described by `site` and writes
/// the result to `w`. The full post body of each entry is carried in a
/// `content:encoded` element.
pub fn write_rss<W: Write>(site: &SiteMetadata, entries: &[FeedEntry], w: W) -> Result<()> {
    let mut namespaces = BTreeMap::new();
    namespaces.insert(CONTENT_NS_PREFIX.to_owned(), CONTENT_NS.to_owned());

    let items: Vec<rss::Item> = entries
        .iter()
        .map(|entry| {
            ItemBuilder::default()
                .title(entry.title.clone())
                .link(entry.url.clone())
                .guid(
                    GuidBuilder::default()
                        .permalink(true)
                        .value(entry.guid.clone())
                        .build(),
                )
                .description(entry.description.clone())
                .pub_date(midnight_utc(entry.date).to_rfc2822())
                .content(entry.content_html.clone())
                .build()
        })
        .collect();

    let channel = ChannelBuilder::default()
        .title(site.title.clone())
        .link(site.base_url.clone())
        .description(site.description.clone())
        .namespaces(namespaces)
        .items(items)
        .build();

    channel.validate()?;
    channel.write_to(w)?;
    Ok(())
}

/// Serializes `entries` as an Atom feed described by `site` and writes the
/// result to `w`. The feed's `updated` timestamp is the date of the most
/// recent entry.
pub fn write_atom<W: Write>(site: &SiteMetadata, entries: &[FeedEntry], w: W) -> Result<()> {
    let authors = author_to_people(site.author.as_ref());
    let atom_entries: Vec<atom_syndication::Entry> = entries
        .iter()
        .map(|entry| {
            let date = midnight_utc(entry.date);
            EntryBuilder::default()
                .id(entry.guid.clone())
                .title(entry.title.clone())
                .updated(date)
                .published(Some(date))
                .authors(authors.clone())
                .links(vec![LinkBuilder::default()
                    .href(entry.url.clone())
                    .rel("alternate".to_owned())
                    .build()])
                .summary(Some(Text::plain(entry.description.clone())))
                .content(Some(
                    ContentBuilder::default()
                        .value(Some(entry.content_html.clone()))
                        .content_type(Some("html".to_owned()))
                        .build(),
                ))
                .build()
        })
        .collect();

    let updated = entries
        .iter()
        .map(|entry| entry.date)
        .max()
        .map(midnight_utc)
        .unwrap_or_else(|| Utc::now().fixed_offset());

    let feed = FeedBuilder::default()
        .title(site.title.clone())
        .id(site.base_url.clone())
        .updated(updated)
        .authors(authors)
        .links(vec![LinkBuilder::default()
            .href(site.base_url.clone())
            .rel("alternate".to_owned())
            .build()])
        .entries(atom_entries)
        .build();

    feed.write_to(w)?;
    Ok(())
}

// Feed formats want a full timestamp, but posts only carry a date, so every
// post is published at midnight UTC.
fn midnight_utc(date: NaiveDate) -> DateTime<FixedOffset> {
    Utc.from_utc_datetime(&date.and_time(NaiveTime::MIN))
        .fixed_offset()
}

fn author_to_people(author: Option<&Author>) -> Vec<Person> {
    match author {
        Some(author) => vec![PersonBuilder::default()
            .name(author.name.clone())
            .email(author.email.clone())
            .build()],
        None => Vec::new(),
    }
}

type Result<T> = std::result::Result<T, Error>;

/// Represents a problem writing a feed. Variants include I/O, RSS, Atom and
/// validation issues.
#[derive(Debug, Error)]
pub enum Error {
    /// Returned when there is a generic I/O error.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Returned when there is an RSS serialization error.
    #[error(transparent)]
    Rss(#[from] RssError),

    /// Returned when the RSS channel fails validation (e.g. a malformed link
    /// or date).
    #[error("RSS validation failed: {0}")]
    RssValidation(#[from] ValidationError),

    /// Returned when there is an Atom-related error.
    #[error(transparent)]
    Atom(#[from] AtomError),
}

#[cfg(test)]
mod test {
    use super::*;

    fn site() -> SiteMetadata {
        SiteMetadata {
            title: "jonfk".to_owned(),
            description: "A blog".to_owned(),
            base_url: "https://x.ca".to_owned(),
            author: Some(Author {
                name: "Jonathan Fok kan".to_owned(),
                email: None,
            }),
        }
    }

    fn record(title: &str, date: (i32, u32, u32), page_path: &str) -> ContentRecord {
        ContentRecord {
            title: title.to_owned(),
            publish_date: NaiveDate::from_ymd_opt(date.0, date.1, date.2).unwrap(),
            excerpt_text: format!("{} excerpt", title),
            body_html: format!("<p>{}</p>", title),
            page_path: page_path.to_owned(),
        }
    }

    fn sample_entries() -> Vec<FeedEntry> {
        build_feed(
            &site(),
            &[
                record("Newer", (2021, 3, 15), "/blog/2021-03-15/newer"),
                record("Older & Wiser", (2020, 1, 2), "/blog/2020-01-02/older"),
            ],
        )
    }

    #[test]
    fn test_build_feed_entry() {
        let post = ContentRecord {
            title: "T".to_owned(),
            publish_date: NaiveDate::from_ymd_opt(2021, 3, 15).unwrap(),
            excerpt_text: "E".to_owned(),
            body_html: "<p>H</p>".to_owned(),
            page_path: "/blog/2021-03-15/hello-world".to_owned(),
        };
        let entries = build_feed(&site(), &[post]);
        assert_eq!(
            vec![FeedEntry {
                title: "T".to_owned(),
                description: "E".to_owned(),
                date: NaiveDate::from_ymd_opt(2021, 3, 15).unwrap(),
                url: "https://x.ca/blog/2021-03-15/hello-world".to_owned(),
                guid: "https://x.ca/blog/2021-03-15/hello-world".to_owned(),
                content_html: "<p>H</p>".to_owned(),
            }],
            entries
        );
    }

    #[test]
    fn test_build_feed_preserves_input_order() {
        // Deliberately not sorted by date; the serializer must not reorder.
        let posts = vec![
            record("b", (2019, 1, 1), "/blog/2019-01-01/b"),
            record("a", (2021, 1, 1), "/blog/2021-01-01/a"),
            record("c", (2020, 1, 1), "/blog/2020-01-01/c"),
        ];
        let entries = build_feed(&site(), &posts);
        let titles: Vec<&str> = entries.iter().map(|e| e.title.as_str()).collect();
        assert_eq!(vec!["b", "a", "c"], titles);
        for entry in &entries {
            assert_eq!(entry.url, entry.guid);
        }
    }

    #[test]
    fn test_content_record_from_yaml() -> std::result::Result<(), serde_yaml::Error> {
        let yaml = "title: T\npublish_date: 2021-03-15\nexcerpt_text: E\n\
                    body_html: <p>H</p>\npage_path: /blog/2021-03-15/hello-world\n";
        let post: ContentRecord = serde_yaml::from_str(yaml)?;
        assert_eq!(NaiveDate::from_ymd_opt(2021, 3, 15).unwrap(), post.publish_date);
        assert_eq!("/blog/2021-03-15/hello-world", post.page_path);

        let missing = yaml.replace("body_html: <p>H</p>\n", "");
        let err = serde_yaml::from_str::<ContentRecord>(&missing).unwrap_err();
        assert!(err.to_string().contains("missing field `body_html`"));
        Ok(())
    }

    #[test]
    fn test_build_feed_empty() {
        assert!(build_feed(&site(), &[]).is_empty());
    }

    #[test]
    fn test_write_rss() -> Result<()> {
        let mut out = Vec::new();
        write_rss(&site(), &sample_entries(), &mut out)?;
        let xml = String::from_utf8(out).unwrap();

        assert!(xml.contains("<title>jonfk</title>"));
        assert!(xml.contains("<link>https://x.ca</link>"));
        assert!(xml.contains(&format!("xmlns:content=\"{}\"", CONTENT_NS)));
        assert_eq!(2, xml.matches("<item>").count());
        assert!(xml.contains("https://x.ca/blog/2021-03-15/newer</guid>"));
        assert!(!xml.contains("isPermaLink=\"false\""));
        assert!(xml.contains("<content:encoded>"));
        assert!(xml.contains("Mon, 15 Mar 2021 00:00:00"));
        assert!(xml.contains("Older &amp; Wiser"));
        assert!(xml.find("newer").unwrap() < xml.find("older").unwrap());
        Ok(())
    }

    #[test]
    fn test_write_rss_rejects_invalid_link() {
        let mut site = site();
        site.base_url = "not a url".to_owned();
        let entries = build_feed(&site, &[record("a", (2021, 1, 1), "/a")]);
        let result = write_rss(&site, &entries, Vec::new());
        assert!(matches!(result, Err(Error::RssValidation(_))));
    }

    #[test]
    fn test_write_atom() -> Result<()> {
        let mut out = Vec::new();
        write_atom(&site(), &sample_entries(), &mut out)?;
        let xml = String::from_utf8(out).unwrap();

        assert!(xml.contains("<id>https://x.ca</id>"));
        assert!(xml.contains("<id>https://x.ca/blog/2021-03-15/newer</id>"));
        assert!(xml.contains("<updated>2021-03-15T00:00:00+00:00</updated>"));
        assert!(xml.contains("<name>Jonathan Fok kan</name>"));
        assert_eq!(2, xml.matches("<entry>").count());
        Ok(())
    }

    #[test]
    fn test_author_to_people() {
        let author = Author {
            name: "Jonathan Fok kan".to_owned(),
            email: Some("jon@x.ca".to_owned()),
        };
        let people = author_to_people(Some(&author));
        assert_eq!(1, people.len());
        assert_eq!("Jonathan Fok kan", people[0].name);
        assert_eq!(Some("jon@x.ca"), people[0].email.as_deref());
        assert_eq!(None, people[0].uri);
        assert!(author_to_people(None).is_empty());
    }

    #[test]
    fn test_midnight_utc() {
        let date = NaiveDate::from_ymd_opt(2021, 3, 15).unwrap();
        assert_eq!("2021-03-15T00:00:00+00:00", midnight_utc(date).to_rfc3339());
    }
}
