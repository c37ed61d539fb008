use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use log::LevelFilter;
use simple_logger::SimpleLogger;
use sitefeed::build::build_site;
use sitefeed::config::Config;
use sitefeed::slug::derive_slug;
use std::path::PathBuf;

/// Generates the sitemap and feeds for a blog.
#[derive(Parser)]
#[command(name = "sitefeed", version)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Enable verbose debugging
    #[arg(short = 'g', long, default_value_t = false)]
    debug: bool,
}

#[derive(Subcommand)]
enum Command {
    /// Build `sitemap.xml` and the feeds for a project
    #[command(alias = "b")]
    Build {
        /// The project directory, or any directory beneath it
        #[arg(short, long, value_name = "DIR", default_value = ".")]
        project: PathBuf,

        /// Where to write the generated files (defaults to `{project}/public`)
        #[arg(short, long, value_name = "DIR")]
        output: Option<PathBuf>,
    },

    /// Print the slug and date derived from post file names
    Slug {
        #[arg(required = true, value_name = "FILENAME")]
        filenames: Vec<String>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    SimpleLogger::new()
        .with_level(if cli.debug {
            LevelFilter::Debug
        } else {
            LevelFilter::Info
        })
        .init()?;

    match cli.command {
        Command::Build { project, output } => {
            let config = Config::from_directory(&project, output.as_deref())?;
            build_site(&config).with_context(|| {
                format!(
                    "Building site from `{}`",
                    config.posts_source_directory.display()
                )
            })
        }
        Command::Slug { filenames } => {
            for filename in &filenames {
                let result = derive_slug(filename)?;
                println!("{}\t{}", result.slug, result.date);
            }
            Ok(())
        }
    }
}
