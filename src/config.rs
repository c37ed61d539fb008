//! Loads the project configuration (`sitefeed.yaml`). The project file lives
//! at the root of the site's source tree; posts are read from
//! `{project_root}/posts` and generated files are written to
//! `{project_root}/public` unless another output directory is given.

use crate::sitemap::{PageRecord, SitemapConfig};
use anyhow::{anyhow, bail, Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use url::Url;

/// The name of the project file searched for by [`Config::from_directory`].
pub const PROJECT_FILE: &str = "sitefeed.yaml";

/// Global site metadata. This is passed explicitly to whichever function needs
/// it rather than read from ambient state.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct SiteMetadata {
    pub title: String,

    #[serde(default)]
    pub description: String,

    /// The site's base URL without a trailing slash (e.g.
    /// `https://www.jonfk.ca`). Page paths are appended to it verbatim.
    pub base_url: String,

    #[serde(default)]
    pub author: Option<Author>,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct Author {
    pub name: String,

    #[serde(default)]
    pub email: Option<String>,
}

/// The file names (relative to the output directory) of the generated files.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct Outputs {
    pub sitemap: PathBuf,
    pub rss: PathBuf,

    /// The Atom feed is only written when this is set.
    pub atom: Option<PathBuf>,
}

impl Default for Outputs {
    fn default() -> Self {
        Outputs {
            sitemap: PathBuf::from("sitemap.xml"),
            rss: PathBuf::from("rss.xml"),
            atom: None,
        }
    }
}

fn default_blog_path() -> String {
    String::from("/blog")
}

#[derive(Deserialize)]
struct Project {
    site: SiteMetadata,

    /// The path prefix under which post pages are published.
    #[serde(default = "default_blog_path")]
    blog_path: String,

    /// Non-post pages (e.g. `- path: /about/`) to list in the sitemap.
    #[serde(default)]
    pages: Vec<PageRecord>,

    #[serde(default)]
    sitemap: SitemapConfig,

    #[serde(default)]
    outputs: Outputs,
}

#[derive(Clone, Debug)]
pub struct Config {
    pub site: SiteMetadata,
    pub posts_source_directory: PathBuf,
    pub output_directory: PathBuf,
    pub blog_path: String,
    pub pages: Vec<PageRecord>,
    pub sitemap: SitemapConfig,
    pub outputs: Outputs,
}

impl Config {
    /// Searches `dir` and then each of its ancestors for a project file and
    /// loads the first one found. A relative `dir` (such as `.`) is resolved
    /// against the current directory first.
    pub fn from_directory(dir: &Path, output_directory: Option<&Path>) -> Result<Config> {
        let dir = dir
            .canonicalize()
            .with_context(|| format!("Resolving project directory '{}'", dir.display()))?;
        Config::search_ancestors(&dir, output_directory)
    }

    fn search_ancestors(dir: &Path, output_directory: Option<&Path>) -> Result<Config> {
        let path = dir.join(PROJECT_FILE);
        if path.exists() {
            match Config::from_project_file(&path, output_directory) {
                Ok(config) => Ok(config),
                Err(e) => Err(anyhow!("Loading configuration: {:?}", e)),
            }
        } else {
            match dir.parent() {
                Some(dir) => Config::search_ancestors(dir, output_directory),
                None => Err(anyhow!(
                    "Could not find `{}` in any parent directory",
                    PROJECT_FILE
                )),
            }
        }
    }

    pub fn from_project_file(path: &Path, output_directory: Option<&Path>) -> Result<Config> {
        use crate::util::open;
        let project: Project = serde_yaml::from_reader(open(path, "project")?)?;
        match path.parent() {
            None => Err(anyhow!(
                "Can't get parent directory for provided project file path '{:?}'",
                path
            )),
            Some(project_root) => Config::from_project(project, project_root, output_directory),
        }
    }

    fn from_project(
        project: Project,
        project_root: &Path,
        output_directory: Option<&Path>,
    ) -> Result<Config> {
        let mut site = project.site;
        if let Err(e) = Url::parse(&site.base_url) {
            bail!("Invalid `site.base_url` '{}': {}", site.base_url, e);
        }
        site.base_url = site.base_url.trim_end_matches('/').to_owned();

        for priority in project.sitemap.priorities() {
            if !(0.0..=1.0).contains(&priority) {
                bail!("Sitemap priority {} is outside of 0.0..=1.0", priority);
            }
        }

        let paths = project.pages.iter().map(|page| &page.path);
        for page in paths.chain(std::iter::once(&project.blog_path)) {
            if !page.starts_with('/') {
                bail!("Page path '{}' must begin with `/`", page);
            }
        }

        Ok(Config {
            site,
            posts_source_directory: project_root.join("posts"),
            output_directory: match output_directory {
                Some(dir) => dir.to_owned(),
                None => project_root.join("public"),
            },
            blog_path: project.blog_path,
            pages: project.pages,
            sitemap: project.sitemap,
            outputs: project.outputs,
        })
    }
}
