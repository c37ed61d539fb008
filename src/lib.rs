//! The library code for the `sitefeed` blog indexer. It derives each post's
//! URL from its file name and produces the crawler- and subscriber-facing
//! index files for the site. The architecture breaks down into three pure
//! transforms and one step which drives them:
//!
//! 1. Deriving a slug and publication date from a post's file name
//!    ([`crate::slug`])
//! 2. Mapping the site's pages to prioritized sitemap entries
//!    ([`crate::sitemap`])
//! 3. Mapping the site's posts to feed entries with absolute URLs
//!    ([`crate::feed`])
//!
//! The transforms take fully-formed inputs and return fully-formed outputs;
//! none of them reads global state or touches the disk. [`crate::build`]
//! parses posts from disk ([`crate::post`]), runs the transforms, and writes
//! `sitemap.xml` and `rss.xml` (plus an optional Atom feed) to the output
//! directory.

#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]

pub mod build;
pub mod config;
pub mod feed;
pub mod markdown;
pub mod post;
pub mod sitemap;
pub mod slug;
mod util;
