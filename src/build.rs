//! Exports the [`build_site`] function which stitches together the high-level
//! steps of building the site's index files: parsing the posts
//! ([`crate::post`]), listing every page in the sitemap ([`crate::sitemap`]),
//! and generating the RSS (and optionally Atom) feed ([`crate::feed`]).

use crate::config::Config;
use crate::feed::{self, build_feed, write_atom, write_rss, ContentRecord};
use crate::post::{self, Parser as PostParser};
use crate::sitemap::{self, build_sitemap, write_sitemap, PageRecord};
use crate::util::create;
use log::info;
use std::io::Write;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Builds the sitemap and feeds from a [`Config`] object. Every post must
/// parse and every document must render before anything is written; a single
/// malformed post file name aborts the build.
pub fn build_site(config: &Config) -> Result<()> {
    let posts = PostParser::new(&config.blog_path).parse_posts(&config.posts_source_directory)?;
    info!(
        "parsed {} posts from `{}`",
        posts.len(),
        config.posts_source_directory.display()
    );

    let records: Vec<ContentRecord> = posts.into_iter().map(|p| p.record).collect();
    let pages = site_pages(&config.pages, &records);

    let sitemap_entries = build_sitemap(&config.site.base_url, &pages, &config.sitemap);
    let mut sitemap_xml = Vec::new();
    write_sitemap(&sitemap_entries, &mut sitemap_xml)?;

    let feed_entries = build_feed(&config.site, &records);
    let mut rss_xml = Vec::new();
    write_rss(&config.site, &feed_entries, &mut rss_xml)?;

    let atom = match &config.outputs.atom {
        Some(atom) => {
            let mut atom_xml = Vec::new();
            write_atom(&config.site, &feed_entries, &mut atom_xml)?;
            Some((atom, atom_xml))
        }
        None => None,
    };

    let sitemap_path = config.output_directory.join(&config.outputs.sitemap);
    write_file(&sitemap_path, &sitemap_xml)?;
    info!(
        "wrote {} sitemap entries to `{}`",
        sitemap_entries.len(),
        sitemap_path.display()
    );

    let rss_path = config.output_directory.join(&config.outputs.rss);
    write_file(&rss_path, &rss_xml)?;
    info!("wrote {} feed entries to `{}`", feed_entries.len(), rss_path.display());

    if let Some((atom, atom_xml)) = atom {
        let atom_path = config.output_directory.join(atom);
        write_file(&atom_path, &atom_xml)?;
        info!("wrote {} feed entries to `{}`", feed_entries.len(), atom_path.display());
    }

    Ok(())
}

/// Lists every generated page: the configured static pages followed by one
/// page per post.
fn site_pages(static_pages: &[PageRecord], posts: &[ContentRecord]) -> Vec<PageRecord> {
    static_pages
        .iter()
        .cloned()
        .chain(posts.iter().map(|post| PageRecord {
            path: post.page_path.clone(),
        }))
        .collect()
}

fn write_file(path: &Path, contents: &[u8]) -> Result<()> {
    create(path)
        .and_then(|mut file| file.write_all(contents))
        .map_err(|err| Error::Write {
            path: path.to_owned(),
            err,
        })
}

type Result<T> = std::result::Result<T, Error>;

/// The error type for building a site. Errors can be during parsing, rendering
/// the sitemap or feeds, or writing output files.
#[derive(Debug, Error)]
pub enum Error {
    /// Returned for errors during parsing.
    #[error(transparent)]
    Parse(#[from] post::Error),

    /// Returned for errors rendering the sitemap.
    #[error(transparent)]
    Sitemap(#[from] sitemap::Error),

    /// Returned for errors rendering the feed.
    #[error(transparent)]
    Feed(#[from] feed::Error),

    /// Returned for I/O problems while writing output files.
    #[error("Writing output file '{}': {err}", .path.display())]
    Write { path: PathBuf, err: std::io::Error },
}
