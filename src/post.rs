//! Defines the [`Post`], [`Parser`], and [`Error`] types. Also defines the
//! logic for parsing posts from the file system into memory.

use crate::feed::ContentRecord;
use crate::markdown;
use crate::slug::{self as slugs, derive_slug, SlugResult};
use chrono::NaiveDate;
use log::{debug, warn};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use walkdir::WalkDir;

const MARKDOWN_EXTENSION: &str = "md";

/// A parsed post: its rendered [`ContentRecord`] plus where it came from.
#[derive(Clone, Debug, PartialEq)]
pub struct Post {
    /// The source file, relative to the posts directory.
    pub source_path: PathBuf,

    /// The slug and date derived from the source file name.
    pub slug: SlugResult,

    pub record: ContentRecord,
}

/// Parses [`Post`] objects from source files.
pub struct Parser<'a> {
    /// `blog_path` is the path prefix for post pages (i.e., the page for a
    /// post is published at `{blog_path}{slug}`).
    blog_path: &'a str,
}

impl<'a> Parser<'a> {
    /// Constructs a new parser. See fields on [`Parser`] for argument
    /// descriptions.
    pub fn new(blog_path: &'a str) -> Parser<'a> {
        Parser { blog_path }
    }

    /// Parses a single [`Post`] from its file name and contents, annotating
    /// any error with the file name.
    pub fn parse_post(&self, relative_path: &Path, input: &str) -> Result<Post> {
        match self._parse_post(relative_path, input) {
            Ok(p) => Ok(p),
            Err(e) => Err(Error::Annotated(
                format!("parsing post `{}`", relative_path.display()),
                Box::new(e),
            )),
        }
    }

    fn _parse_post(&self, relative_path: &Path, input: &str) -> Result<Post> {
        fn frontmatter_indices(input: &str) -> Result<(usize, usize, usize)> {
            const FENCE: &str = "---";
            if !input.starts_with(FENCE) {
                return Err(Error::FrontmatterMissingStartFence);
            }
            match input[FENCE.len()..].find(FENCE) {
                None => Err(Error::FrontmatterMissingEndFence),
                Some(offset) => Ok((
                    FENCE.len(),                        // yaml_start
                    FENCE.len() + offset,               // yaml_stop
                    FENCE.len() + offset + FENCE.len(), // body_start
                )),
            }
        }

        let file_name = relative_path
            .file_name()
            .and_then(|s| s.to_str())
            .ok_or_else(|| Error::InvalidFileName(relative_path.to_owned()))?;
        let slug = derive_slug(file_name)?;

        let slug_text = slug.slug_text();
        if slug_text != ::slug::slugify(slug_text) {
            warn!(
                "post `{}` has slug text `{}` which is not URL-safe; it is used verbatim",
                relative_path.display(),
                slug_text
            );
        }

        let (yaml_start, yaml_stop, body_start) = frontmatter_indices(input)?;
        let frontmatter: Frontmatter = serde_yaml::from_str(&input[yaml_start..yaml_stop])?;
        let body = &input[body_start..];

        let publish_date = match frontmatter.date {
            Some(date) => {
                if date != slug.date {
                    warn!(
                        "post `{}` has frontmatter date {} but file name date {}",
                        relative_path.display(),
                        date,
                        slug.date
                    );
                }
                date
            }
            None => slug.date,
        };

        let page_path = slug.page_path(self.blog_path);
        debug!("parsed post `{}` -> {}", relative_path.display(), page_path);

        Ok(Post {
            source_path: relative_path.to_owned(),
            record: ContentRecord {
                title: frontmatter.title,
                publish_date,
                excerpt_text: markdown::excerpt(body),
                body_html: markdown::to_html(body),
                page_path,
            },
            slug,
        })
    }

    /// Searches `source_directory` (recursively) for post files (extension =
    /// `.md`) and returns a list of [`Post`] objects sorted by date (most
    /// recent first). Each post file must be named `YYYY-MM-DD-<slug>.md` and
    /// be structured as follows:
    ///
    /// 1. Initial frontmatter fence (`---`)
    /// 2. YAML frontmatter with field `title` and optionally `date`
    /// 3. Terminal frontmatter fence (`---`)
    /// 4. Post body
    ///
    /// For example:
    ///
    /// ```md
    /// ---
    /// title: Hello, world!
    /// date: 2021-04-16
    /// ---
    /// # Hello
    ///
    /// World
    /// ```
    ///
    /// Any post which fails to parse fails the whole operation.
    pub fn parse_posts(&self, source_directory: &Path) -> Result<Vec<Post>> {
        let mut posts = Vec::new();
        for result in WalkDir::new(source_directory).min_depth(1).sort_by_file_name() {
            let entry = result?;
            let is_markdown = entry
                .path()
                .extension()
                .map_or(false, |ext| ext == MARKDOWN_EXTENSION);
            if entry.file_type().is_file() && is_markdown {
                // strip_prefix() should never fail since WalkDir yields
                // descendants of `source_directory`
                let relative_path = entry
                    .path()
                    .strip_prefix(source_directory)
                    .unwrap_or_else(|_| entry.path());
                let input = fs::read_to_string(entry.path())?;
                posts.push(self.parse_post(relative_path, &input)?);
            }
        }

        posts.sort_by(|a, b| b.record.publish_date.cmp(&a.record.publish_date));
        Ok(posts)
    }
}

#[derive(Deserialize, Clone)]
struct Frontmatter {
    /// The title of the post.
    title: String,

    /// The date of the post. Defaults to the date in the file name.
    #[serde(default)]
    date: Option<NaiveDate>,
}

/// Represents the result of a [`Post`]-parse operation.
pub type Result<T> = std::result::Result<T, Error>;

/// Represents an error parsing a [`Post`] object.
#[derive(Debug, Error)]
pub enum Error {
    /// Returned when a post source file is missing its starting frontmatter
    /// fence (`---`).
    #[error("Post must begin with `---`")]
    FrontmatterMissingStartFence,

    /// Returned when a post source file is missing its terminal frontmatter
    /// fence (`---` i.e., the starting fence was found but the ending one was
    /// missing).
    #[error("Missing closing `---`")]
    FrontmatterMissingEndFence,

    /// Returned when there was an error parsing the frontmatter as YAML.
    #[error(transparent)]
    DeserializeYaml(#[from] serde_yaml::Error),

    /// Returned when the file name doesn't carry a valid date prefix.
    #[error(transparent)]
    Slug(#[from] slugs::Error),

    /// Returned for other I/O errors.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Returned for WalkDir I/O errors.
    #[error(transparent)]
    WalkDir(#[from] walkdir::Error),

    /// Returned when a source file name isn't valid UTF-8.
    #[error("invalid file name: {0:?}")]
    InvalidFileName(PathBuf),

    /// An error with an annotation.
    #[error("{0}: {1}")]
    Annotated(String, Box<Error>),
}

impl Error {
    /// Strips any annotations, returning the underlying error.
    pub fn root(&self) -> &Error {
        match self {
            Error::Annotated(_, err) => err.root(),
            err => err,
        }
    }
}
